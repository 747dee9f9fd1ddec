use std::fs;

use dcr_assist_config::ConfigManager;
use dcr_assist_config::constants::env;
use dcr_assist_config::loader::bootstrap::write_starter_config;
use serial_test::serial;
use tempfile::TempDir;

fn clear_overrides() {
    // SAFETY: serialized tests own the process environment.
    unsafe {
        std::env::remove_var(env::LOCAL_DCR_V6_PATH);
        std::env::remove_var(env::LOCAL_DCR_V55_PATH);
        std::env::remove_var(env::OUTPUT_DIR);
    }
}

#[test]
#[serial]
fn workspace_config_is_loaded() {
    clear_overrides();
    let workspace = TempDir::new().unwrap();
    fs::write(
        workspace.path().join("dcr-assist.toml"),
        r#"
[paths]
local_dcr_v6_path = "/opt/dcr/tng/"

[[accounts]]
account = "acme"
nickname = "prod"
session_command = ["snowsql", "-c", "acme"]

[[accounts]]
account = "globex"
"#,
    )
    .unwrap();

    let manager = ConfigManager::load_from_workspace(workspace.path()).unwrap();
    let config = manager.config();

    assert_eq!(config.paths.local_dcr_v6_path, "/opt/dcr/tng/");
    assert_eq!(config.paths.local_dcr_v55_path, "");
    assert_eq!(config.paths.output_dir, "output");
    assert_eq!(
        manager.config_path(),
        Some(workspace.path().join("dcr-assist.toml").as_path())
    );

    let registry = config.account_registry();
    assert_eq!(registry.len(), 2);
    let acme = registry.find("prod").unwrap();
    assert_eq!(acme.account, "ACME");
    assert_eq!(acme.session_command, ["snowsql", "-c", "acme"]);
}

#[test]
#[serial]
fn env_overrides_replace_file_values() {
    clear_overrides();
    let workspace = TempDir::new().unwrap();
    fs::write(
        workspace.path().join("dcr-assist.toml"),
        "[paths]\nlocal_dcr_v55_path = \"/from/file\"\n",
    )
    .unwrap();

    // SAFETY: serialized tests own the process environment.
    unsafe {
        std::env::set_var(env::LOCAL_DCR_V55_PATH, "/from/env");
        std::env::set_var(env::OUTPUT_DIR, "prepared");
    }

    let manager = ConfigManager::load_from_workspace(workspace.path()).unwrap();
    clear_overrides();

    assert_eq!(manager.config().paths.local_dcr_v55_path, "/from/env");
    assert_eq!(
        manager.config().paths.output_dir(workspace.path()),
        workspace.path().join("prepared")
    );
}

#[test]
#[serial]
fn malformed_config_reports_path() {
    clear_overrides();
    let workspace = TempDir::new().unwrap();
    let path = workspace.path().join("broken.toml");
    fs::write(&path, "[paths\nlocal_dcr_v6_path = 1").unwrap();

    let err = ConfigManager::load_from_file(&path, workspace.path()).unwrap_err();
    assert!(format!("{err:#}").contains("broken.toml"));
}

#[test]
fn starter_config_is_not_overwritten_without_force() {
    let workspace = TempDir::new().unwrap();
    let target = workspace.path().join("nested").join("dcr-assist.toml");

    write_starter_config(&target, false).unwrap();
    assert!(target.is_file());

    fs::write(&target, "# edited\n").unwrap();
    assert!(write_starter_config(&target, false).is_err());
    assert_eq!(fs::read_to_string(&target).unwrap(), "# edited\n");

    write_starter_config(&target, true).unwrap();
    assert!(fs::read_to_string(&target).unwrap().contains("[[accounts]]"));
}

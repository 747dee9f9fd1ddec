use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::constants::files;

const STARTER_CONFIG: &str = r#"# DCR setup assistant configuration

[paths]
# Leave blank to use ./data-clean-room-tng/ next to the workspace.
local_dcr_v6_path = ""
# Leave blank to use ./data-clean-room/ next to the workspace.
local_dcr_v55_path = ""
output_dir = "output"

# One entry per account that can act as provider or consumer.
# session_command starts one client per account and receives statements on
# stdin. The client must exit on error. sync_statement (optional) must print
# a line containing __dcr_sync__; the default is select '__dcr_' || 'sync__'.
[[accounts]]
account = ""
nickname = ""
session_command = [
    "snowsql", "-c", "account_1",
    "-o", "friendly=false", "-o", "quiet=true", "-o", "exit_on_error=true", "-o", "output_format=plain", "-o", "header=false", "-o", "timing=false",
]

[[accounts]]
account = ""
nickname = ""
session_command = [
    "snowsql", "-c", "account_2",
    "-o", "friendly=false", "-o", "quiet=true", "-o", "exit_on_error=true", "-o", "output_format=plain", "-o", "header=false", "-o", "timing=false",
]
"#;

/// Determine where a starter configuration should be written.
pub fn determine_bootstrap_target(workspace: &Path, use_home_dir: bool) -> PathBuf {
    if let (true, Some(home_config_path)) = (use_home_dir, home_config_path()) {
        return home_config_path;
    }

    workspace.join(files::CONFIG_FILE_NAME)
}

/// Writes the starter configuration, refusing to clobber an existing file
/// unless `force` is set.
pub fn write_starter_config(target: &Path, force: bool) -> Result<()> {
    if target.exists() && !force {
        bail!(
            "Configuration already exists at {} (use --force to overwrite)",
            target.display()
        );
    }

    ensure_parent_dir(target)?;
    fs::write(target, STARTER_CONFIG)
        .with_context(|| format!("Failed to write config file: {}", target.display()))?;
    tracing::info!(path = %target.display(), "wrote starter configuration");
    Ok(())
}

/// Ensures the parent directory for the provided path exists, creating it if
/// necessary.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if parent.as_os_str().is_empty() || parent.exists() {
            return Ok(());
        }

        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    Ok(())
}

/// `~/.dcr-assist/dcr-assist.toml`, when a home directory can be found.
pub fn home_config_path() -> Option<PathBuf> {
    default_home_dir().map(|home| home.join(files::HOME_CONFIG_DIR).join(files::CONFIG_FILE_NAME))
}

/// Attempts to resolve the current user's home directory using common
/// environment variables and the `dirs` crate fallback.
pub fn default_home_dir() -> Option<PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        return Some(PathBuf::from(home));
    }

    if let Ok(userprofile) = std::env::var("USERPROFILE") {
        return Some(PathBuf::from(userprofile));
    }

    dirs::home_dir()
}

mod common;

use std::fs;

use common::{CallLog, DEPLOY_V6_SCRIPTS, Fixture, RecordingSession};
use dcr_assist_core::{
    AccountType, DeployError, DeployOutcome, Naming, Party, PlanError, ProtocolVersion, RunMode,
};

#[tokio::test]
async fn deploy_v6_dry_run_prepares_every_script_in_order() {
    let fixture = Fixture::new();
    fixture.write_v6_templates(&DEPLOY_V6_SCRIPTS);
    let log = CallLog::default();
    let mut provider = RecordingSession::new("provider", &log);
    let mut consumer = RecordingSession::new("consumer", &log);

    let outcome = fixture
        .assistant()
        .deploy(
            RunMode::DryRun,
            ProtocolVersion::V6NativeApp,
            Party::with_session("ACME", &mut provider),
            Party::with_session("GLOBEX", &mut consumer),
            "",
        )
        .await
        .unwrap();

    let DeployOutcome::Completed(report) = outcome else {
        panic!("expected a completed run, got {outcome:?}");
    };
    let scripts: Vec<&str> = report.scripts.iter().map(|s| s.script.as_str()).collect();
    assert_eq!(scripts, DEPLOY_V6_SCRIPTS);
    assert!(report.scripts.iter().all(|script| !script.executed));
    assert_eq!(report.scripts[0].summary, "[1/6] Prepared provider_init");
    assert!(log.lock().unwrap().is_empty(), "dry run must not execute");

    let mut expected_files: Vec<String> = DEPLOY_V6_SCRIPTS
        .iter()
        .map(|script| format!("{script}-prepared.sql"))
        .collect();
    expected_files.sort();
    assert_eq!(fixture.output_files(), expected_files);

    let prepared = fixture.prepared("provider_templates");
    assert_eq!(
        prepared,
        "\nuse role accountadmin;\n\
         create database if not exists dcr_demo_app; \n\
         grant usage on database DCR_demo_APP to share ACME_share;\n\
         call dcr_demo_provider_db.admin.request('GLOBEX', 'https://example.com/GLOBEX');\n"
    );
}

#[tokio::test]
async fn custom_abbreviation_replaces_demo_token() {
    let fixture = Fixture::new();
    fixture.write_v6_templates(&DEPLOY_V6_SCRIPTS);

    fixture
        .assistant()
        .deploy(
            RunMode::DryRun,
            ProtocolVersion::V6NativeApp,
            Party::new("ACME"),
            Party::new("GLOBEX"),
            "beta",
        )
        .await
        .unwrap();

    let prepared = fixture.prepared("consumer_ml");
    assert!(prepared.contains("dcr_beta_app"));
    assert!(prepared.contains("DCR_beta_APP"));
    assert!(!prepared.contains("_demo_"));
}

#[tokio::test]
async fn v55_jinja_deploy_rewrites_template_calls() {
    let fixture = Fixture::new();
    let root = fixture.v55_root();
    fixture.write_template(&root, "provider_init", "create share dcr_samp_app_share; // PROVIDER_ACCT\n");
    fixture.write_template(
        &root,
        "provider_templates_jinja",
        "select dcr_samp_provider_db.cleanroom.get_sql_js(:1, :2);\n",
    );
    fixture.write_template(&root, "consumer_init", "set provider = 'provider_acct';\n");
    fixture.write_template(
        &root,
        "provider_enable_consumer",
        "grant to CONSUMER_ACCT;\n",
    );

    fixture
        .assistant()
        .deploy(
            RunMode::DryRun,
            ProtocolVersion::V55Jinja,
            Party::new("ACME"),
            Party::new("GLOBEX"),
            "",
        )
        .await
        .unwrap();

    assert_eq!(fixture.prepared("provider_init"), "create share dcr_samp_app_share; \n");
    assert_eq!(
        fixture.prepared("provider_templates_jinja"),
        "select dcr_samp_provider_db.templates.get_sql_jinja(:1, :2);\n"
    );
    assert_eq!(fixture.prepared("consumer_init"), "set provider = 'ACME';\n");
    assert_eq!(fixture.prepared("provider_enable_consumer"), "grant to GLOBEX;\n");
}

#[tokio::test]
async fn consumer_uninstall_with_suffix_targets_the_suffixed_app() {
    let fixture = Fixture::new();
    fixture.write_template(
        &fixture.v6_root(),
        "consumer_uninstall",
        "drop application if exists dcr_demo_app;\ndrop database DCR_DEMO_APP_SHARE;\n",
    );

    let outcome = fixture
        .assistant()
        .uninstall(
            RunMode::DryRun,
            ProtocolVersion::V6NativeApp,
            AccountType::Consumer,
            Party::new("GLOBEX"),
            "",
            Naming::new("", "beta"),
        )
        .await
        .unwrap();

    assert!(matches!(outcome, DeployOutcome::Completed(_)));
    assert_eq!(
        fixture.prepared("consumer_uninstall"),
        "drop application if exists dcr_demo_app_beta;\ndrop database DCR_demo_app_beta_SHARE;\n"
    );
}

#[tokio::test]
async fn output_directory_is_cleared_between_runs() {
    let fixture = Fixture::new();
    fixture.write_v6_templates(&["provider_uninstall"]);
    fs::create_dir_all(fixture.output_dir()).unwrap();
    fs::write(fixture.output_dir().join("stale-prepared.sql"), "old").unwrap();

    fixture
        .assistant()
        .uninstall(
            RunMode::DryRun,
            ProtocolVersion::V6NativeApp,
            AccountType::Provider,
            Party::new("ACME"),
            "GLOBEX",
            Naming::default(),
        )
        .await
        .unwrap();

    assert_eq!(fixture.output_files(), ["provider_uninstall-prepared.sql"]);
}

#[tokio::test]
async fn validation_errors_leave_the_output_untouched() {
    let fixture = Fixture::new();
    fixture.write_v6_templates(&DEPLOY_V6_SCRIPTS);
    fs::create_dir_all(fixture.output_dir()).unwrap();
    fs::write(fixture.output_dir().join("keep.sql"), "previous run").unwrap();

    let err = fixture
        .assistant()
        .deploy(
            RunMode::DryRun,
            ProtocolVersion::V6NativeApp,
            Party::new("ACME"),
            Party::new("ACME"),
            "",
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DeployError::Plan(PlanError::SameAccountConflict { .. })
    ));

    let err = fixture
        .assistant()
        .upgrade(
            RunMode::DryRun,
            Party::new("ACME"),
            Party::new("GLOBEX"),
            "samp",
            "samp",
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DeployError::Plan(PlanError::AbbreviationConflict { .. })
    ));

    assert_eq!(fixture.output_files(), ["keep.sql"]);
}

#[tokio::test]
async fn id_resolution_is_a_no_op() {
    let fixture = Fixture::new();

    let outcome = fixture
        .assistant()
        .deploy(
            RunMode::DryRun,
            ProtocolVersion::IdResolutionNativeApp,
            Party::new("ACME"),
            Party::new("GLOBEX"),
            "",
        )
        .await
        .unwrap();

    assert_eq!(
        outcome,
        DeployOutcome::NotAutomated {
            version: ProtocolVersion::IdResolutionNativeApp
        }
    );
    assert!(!fixture.output_dir().exists());
}

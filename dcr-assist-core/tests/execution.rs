mod common;

use common::{CallLog, DEPLOY_V6_SCRIPTS, Fixture, RecordingSession};
use dcr_assist_core::{
    AccountType, DeployError, DeployOutcome, Naming, Party, ProtocolVersion, RunError, RunMode,
    SessionError, SessionRole,
};

#[tokio::test]
async fn execute_runs_scripts_on_their_roles_in_plan_order() {
    let fixture = Fixture::new();
    fixture.write_v6_templates(&DEPLOY_V6_SCRIPTS);
    let log = CallLog::default();
    let mut provider = RecordingSession::new("provider", &log);
    let mut consumer = RecordingSession::new("consumer", &log);

    let outcome = fixture
        .assistant()
        .deploy(
            RunMode::Execute,
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
    assert!(report.scripts.iter().all(|script| script.executed));
    assert!(report.scripts.iter().all(|script| script.statements == 4));
    assert_eq!(
        report.scripts[2].summary,
        "[3/6] Ran consumer_init on consumer (4 statements)"
    );

    // Every template starts with `use role`, so each script boundary shows up
    // as a session switch in the shared log.
    let calls = log.lock().unwrap();
    let order: Vec<&str> = calls
        .iter()
        .filter(|(_, statement)| statement.starts_with("use role"))
        .map(|(label, _)| label.as_str())
        .collect();
    assert_eq!(
        order,
        ["provider", "provider", "consumer", "provider", "provider", "consumer"]
    );
    assert!(!calls.iter().any(|(_, statement)| statement.contains("SNOWCAT")));
    assert!(
        calls
            .iter()
            .any(|(_, statement)| statement.contains("'https://example.com/GLOBEX'"))
    );
}

#[tokio::test]
async fn first_failure_aborts_the_remaining_scripts() {
    let fixture = Fixture::new();
    fixture.write_v6_templates(&DEPLOY_V6_SCRIPTS);
    fixture.write_template(
        &fixture.v6_root(),
        "consumer_init",
        "use role accountadmin;\ncall broken_procedure();\nselect 1;\n",
    );
    let log = CallLog::default();
    let mut provider = RecordingSession::new("provider", &log);
    let mut consumer = RecordingSession::new("consumer", &log).failing_on("broken_procedure");

    let err = fixture
        .assistant()
        .deploy(
            RunMode::Execute,
            ProtocolVersion::V6NativeApp,
            Party::with_session("ACME", &mut provider),
            Party::with_session("GLOBEX", &mut consumer),
            "",
        )
        .await
        .unwrap_err();

    match err {
        DeployError::Run(RunError::ScriptExecutionFailed { script, source }) => {
            assert_eq!(script, "consumer_init");
            assert!(matches!(source, SessionError::Remote(message) if message.contains("broken_procedure")));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let calls = log.lock().unwrap();
    assert!(!calls.iter().any(|(_, statement)| statement.contains("select 1")));
    assert_eq!(calls.last().unwrap().0, "consumer");
    // Earlier scripts were prepared; later ones were never reached.
    assert!(fixture.output_dir().join("provider_templates-prepared.sql").exists());
    assert!(
        !fixture
            .output_dir()
            .join("provider_enable_consumer-prepared.sql")
            .exists()
    );
}

#[tokio::test]
async fn execute_without_a_session_reports_the_missing_role() {
    let fixture = Fixture::new();
    fixture.write_v6_templates(&DEPLOY_V6_SCRIPTS);
    let log = CallLog::default();
    let mut provider = RecordingSession::new("provider", &log);

    let err = fixture
        .assistant()
        .deploy(
            RunMode::Execute,
            ProtocolVersion::V6NativeApp,
            Party::with_session("ACME", &mut provider),
            Party::new("GLOBEX"),
            "",
        )
        .await
        .unwrap_err();

    match err {
        DeployError::Run(RunError::MissingSession { script, role }) => {
            assert_eq!(script, "consumer_init");
            assert_eq!(role, SessionRole::Consumer);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(log.lock().unwrap().len(), 8);
}

#[tokio::test]
async fn missing_template_stops_before_any_execution() {
    let fixture = Fixture::new();
    let log = CallLog::default();
    let mut account = RecordingSession::new("provider", &log);

    let err = fixture
        .assistant()
        .uninstall(
            RunMode::Execute,
            ProtocolVersion::V6NativeApp,
            AccountType::Provider,
            Party::with_session("ACME", &mut account),
            "GLOBEX",
            Naming::default(),
        )
        .await
        .unwrap_err();

    match err {
        DeployError::Run(RunError::ScriptNotFound { script, path }) => {
            assert_eq!(script, "provider_uninstall");
            assert_eq!(path, fixture.v6_root().join("provider_uninstall.sql"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn uninstall_runs_on_the_account_under_operation() {
    let fixture = Fixture::new();
    fixture.write_template(
        &fixture.v55_root(),
        "provider_uninstall",
        "drop share dcr_samp_app_share;\ndrop database dcr_samp_provider_db; // consumer_acct\n",
    );
    let log = CallLog::default();
    let mut account = RecordingSession::new("ACME", &log);

    fixture
        .assistant()
        .uninstall(
            RunMode::Execute,
            ProtocolVersion::V55SqlParam,
            AccountType::Provider,
            Party::with_session("ACME", &mut account),
            "GLOBEX",
            Naming::new("acme", ""),
        )
        .await
        .unwrap();

    let calls = log.lock().unwrap();
    let statements: Vec<&str> = calls.iter().map(|(_, sql)| sql.as_str()).collect();
    assert_eq!(
        statements,
        [
            "drop share dcr_acme_app_share",
            "drop database dcr_acme_provider_db"
        ]
    );
}

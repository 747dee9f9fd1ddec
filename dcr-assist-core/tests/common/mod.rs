#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use dcr_assist_core::session::split_statements;
use dcr_assist_core::{
    DcrAssistant, Planner, ScriptRunner, SessionError, SqlSession, StatementResult,
};
use futures::stream;
use tempfile::TempDir;

/// Statements seen by every [`RecordingSession`] sharing the log, in order.
pub type CallLog = Arc<Mutex<Vec<(String, String)>>>;

/// Session double that records statements and fails on a marker.
pub struct RecordingSession {
    label: String,
    log: CallLog,
    fail_on: Option<String>,
}

impl RecordingSession {
    pub fn new(label: &str, log: &CallLog) -> Self {
        Self {
            label: label.to_string(),
            log: Arc::clone(log),
            fail_on: None,
        }
    }

    pub fn failing_on(mut self, marker: &str) -> Self {
        self.fail_on = Some(marker.to_string());
        self
    }
}

impl SqlSession for RecordingSession {
    fn label(&self) -> &str {
        &self.label
    }

    fn execute_stream<'a>(
        &'a mut self,
        sql: &'a str,
    ) -> dcr_assist_core::session::StatementStream<'a> {
        let mut results = Vec::new();
        for statement in split_statements(sql) {
            if self
                .fail_on
                .as_deref()
                .is_some_and(|marker| statement.contains(marker))
            {
                results.push(Err(SessionError::Remote(format!(
                    "SQL compilation error in: {statement}"
                ))));
                break;
            }
            self.log
                .lock()
                .unwrap()
                .push((self.label.clone(), statement.clone()));
            results.push(Ok(StatementResult {
                query: statement,
                rows: vec!["Statement executed successfully.".to_string()],
            }));
        }
        Box::pin(stream::iter(results))
    }
}

/// Workspace with template roots and an output directory.
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("tng")).unwrap();
        fs::create_dir_all(dir.path().join("legacy")).unwrap();
        Self { dir }
    }

    pub fn v6_root(&self) -> PathBuf {
        self.dir.path().join("tng")
    }

    pub fn v55_root(&self) -> PathBuf {
        self.dir.path().join("legacy")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.dir.path().join("output")
    }

    pub fn write_template(&self, root: &Path, script: &str, body: &str) {
        fs::write(root.join(format!("{script}.sql")), body).unwrap();
    }

    /// Writes one template per script whose body names the script and
    /// carries the usual 6.0 placeholders.
    pub fn write_v6_templates(&self, scripts: &[&str]) {
        for script in scripts {
            let body = format!(
                "// {script}\nuse role accountadmin;\n\
                 create database if not exists dcr_demo_app; // app db\n\
                 grant usage on database DCR_DEMO_APP to share SNOWCAT2_share;\n\
                 call dcr_demo_provider_db.admin.request('snowcat', 'https://example.com/snowcat');\n"
            );
            self.write_template(&self.v6_root(), script, &body);
        }
    }

    pub fn assistant(&self) -> DcrAssistant {
        DcrAssistant::from_parts(
            Planner::with_roots(self.v6_root(), self.v55_root()),
            ScriptRunner::new(self.output_dir()),
        )
    }

    pub fn prepared(&self, script: &str) -> String {
        fs::read_to_string(self.output_dir().join(format!("{script}-prepared.sql"))).unwrap()
    }

    pub fn output_files(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.output_dir())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

pub const DEPLOY_V6_SCRIPTS: [&str; 6] = [
    "provider_init",
    "provider_templates",
    "consumer_init",
    "provider_enable_consumer",
    "provider_ml",
    "consumer_ml",
];

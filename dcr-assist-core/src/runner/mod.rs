//! Script preparation and sequential execution.

mod executor;
mod io;
mod prepare;
mod progress;

use std::path::{Path, PathBuf};

use tracing::info;

pub use prepare::{prepare_text, strip_line_comment};

use crate::error::RunError;
use crate::plan::{Plan, SessionRole};
use crate::session::SessionMap;
use executor::ScriptExecutor;
use progress::StepProgress;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Write prepared scripts without touching any session.
    DryRun,
    Execute,
}

impl RunMode {
    pub fn from_dry_run(dry_run: bool) -> Self {
        if dry_run {
            RunMode::DryRun
        } else {
            RunMode::Execute
        }
    }

    pub fn is_dry_run(self) -> bool {
        self == RunMode::DryRun
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedScript {
    pub script: String,
    pub role: SessionRole,
    pub path: PathBuf,
    pub executed: bool,
    pub statements: usize,
    /// Progress-annotated one-line summary, e.g. `[2/6] Prepared provider_templates`.
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub mode: RunMode,
    pub output_dir: PathBuf,
    pub scripts: Vec<PreparedScript>,
}

impl RunReport {
    pub fn prepared_paths(&self) -> Vec<&Path> {
        self.scripts.iter().map(|script| script.path.as_path()).collect()
    }
}

/// Prepares and runs plans, writing each prepared script to `output_dir`.
#[derive(Debug, Clone)]
pub struct ScriptRunner {
    output_dir: PathBuf,
}

impl ScriptRunner {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Runs `plan` step by step. The output directory is cleared first. In
    /// [`RunMode::Execute`] the first failing statement aborts the run;
    /// scripts that already ran are not rolled back.
    pub async fn run(
        &self,
        plan: &Plan,
        sessions: &mut SessionMap<'_>,
        mode: RunMode,
    ) -> Result<RunReport, RunError> {
        io::clear_output_dir(&self.output_dir).await?;

        let total = plan.scripts.len();
        let mut scripts = Vec::with_capacity(total);

        for (index, step) in plan.scripts.steps().iter().enumerate() {
            let progress = StepProgress::new(index, total, step.script);
            info!(script = step.script, role = %step.role, "starting {}", step.script);

            let source = io::read_script(&plan.root, step.script).await?;
            let prepared = prepare_text(&source, &plan.substitutions);
            let path = io::write_prepared(&self.output_dir, step.script, &prepared).await?;

            let (executed, statements, summary) = match mode {
                RunMode::DryRun => {
                    info!(
                        script = step.script,
                        "dry run: generated {} without running it",
                        path.display()
                    );
                    (false, 0, progress.prepared())
                }
                RunMode::Execute => {
                    let session =
                        sessions
                            .get_mut(step.role)
                            .ok_or_else(|| RunError::MissingSession {
                                script: step.script.to_string(),
                                role: step.role,
                            })?;
                    info!(script = step.script, "running statements");
                    let statements = ScriptExecutor::new(step.script)
                        .execute(session, &prepared)
                        .await?;
                    (true, statements, progress.ran(step.role, statements))
                }
            };

            scripts.push(PreparedScript {
                script: step.script.to_string(),
                role: step.role,
                path,
                executed,
                statements,
                summary,
            });
        }

        Ok(RunReport {
            mode,
            output_dir: self.output_dir.clone(),
            scripts,
        })
    }
}

use futures::StreamExt;
use tracing::{debug, info};

use crate::error::RunError;
use crate::session::SqlSession;

/// Streams one prepared script through a session.
pub(super) struct ScriptExecutor<'a> {
    script: &'a str,
}

impl<'a> ScriptExecutor<'a> {
    pub(super) fn new(script: &'a str) -> Self {
        Self { script }
    }

    /// Runs every statement, draining each result fully. Returns the number
    /// of statements executed.
    pub(super) async fn execute(
        &self,
        session: &mut dyn SqlSession,
        prepared: &str,
    ) -> Result<usize, RunError> {
        let label = session.label().to_string();
        let mut stream = session.execute_stream(prepared);
        let mut statements = 0;

        while let Some(result) = stream.next().await {
            let cursor = result.map_err(|source| RunError::ScriptExecutionFailed {
                script: self.script.to_string(),
                source,
            })?;
            statements += 1;
            info!(script = self.script, session = %label, "{}", cursor.query);
            for row in &cursor.rows {
                debug!(script = self.script, "{row}");
            }
        }

        Ok(statements)
    }
}

use std::io;
use std::process::Stdio;

use async_stream::stream;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::task::JoinHandle;

use super::{SessionError, SqlSession, StatementResult, StatementStream, split_statements};

/// Line printed by the client once a statement has finished.
pub const SYNC_MARKER: &str = "__dcr_sync__";

/// Statement sent after every user statement so the client prints
/// [`SYNC_MARKER`]. The literal is split so neither an echoed query nor a
/// column header contains the marker, only the result row.
pub const DEFAULT_SYNC_STATEMENT: &str = "select '__dcr_' || 'sync__'";

/// Session backed by a long-running external SQL client such as `snowsql`.
///
/// The client is started on the first statement and kept alive for the
/// lifetime of the session, so `use role`, `use database` and session
/// variables carry over between statements and scripts. Statements are
/// written to its stdin, each followed by the sync statement; stdout lines up
/// to the sync marker are the statement's rows.
///
/// The client must exit on error (`snowsql -o exit_on_error=true`). Exiting
/// before the marker fails the statement with the exit status and stderr.
#[derive(Debug)]
pub struct CommandSession {
    label: String,
    program: String,
    args: Vec<String>,
    sync_statement: String,
    client: Option<ClientProcess>,
}

#[derive(Debug)]
struct ClientProcess {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    stderr: JoinHandle<String>,
}

impl CommandSession {
    pub fn new(label: impl Into<String>, command: &[String]) -> Result<Self, SessionError> {
        let label = label.into();
        let (program, args) = command
            .split_first()
            .ok_or_else(|| SessionError::NotConfigured {
                label: label.clone(),
            })?;

        Ok(Self {
            label,
            program: program.clone(),
            args: args.to_vec(),
            sync_statement: DEFAULT_SYNC_STATEMENT.to_string(),
            client: None,
        })
    }

    /// Replaces the statement that makes the client print [`SYNC_MARKER`].
    /// Blank values keep the default.
    pub fn with_sync_statement(mut self, statement: impl Into<String>) -> Self {
        let statement = statement.into();
        if !statement.trim().is_empty() {
            self.sync_statement = statement.trim().trim_end_matches(';').to_string();
        }
        self
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn io_error(&self, action: &'static str, source: io::Error) -> SessionError {
        SessionError::Io {
            action,
            command: self.command_line(),
            source,
        }
    }

    fn spawn(&self) -> Result<ClientProcess, SessionError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SessionError::Spawn {
                command: self.command_line(),
                source,
            })?;
        tracing::debug!(session = %self.label, command = %self.command_line(), "started client");

        let missing = |stream: &str| io::Error::other(format!("{stream} was not captured"));
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| self.io_error("attach to", missing("stdin")))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| self.io_error("attach to", missing("stdout")))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| self.io_error("attach to", missing("stderr")))?;

        // Drained in the background so a chatty client never blocks on it.
        let stderr = tokio::spawn(async move {
            let mut buffer = Vec::new();
            let _ = stderr.read_to_end(&mut buffer).await;
            String::from_utf8_lossy(&buffer).into_owned()
        });

        Ok(ClientProcess {
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
            stderr,
        })
    }

    async fn run_statement(&mut self, statement: &str) -> Result<StatementResult, SessionError> {
        let mut client = match self.client.take() {
            Some(client) => client,
            None => self.spawn()?,
        };

        let input = format!("{statement};\n{};\n", self.sync_statement);
        let ClientProcess { stdin, stdout, .. } = &mut client;
        // Write and read together: a client echoing a large statement fills
        // its stdout pipe before it has consumed all of stdin.
        let (written, rows) = tokio::join!(
            async {
                stdin.write_all(input.as_bytes()).await?;
                stdin.flush().await
            },
            read_until_sync(stdout),
        );

        match rows.map_err(|source| self.io_error("read output of", source))? {
            Some(rows) => {
                written.map_err(|source| self.io_error("write statement to", source))?;
                self.client = Some(client);
                Ok(StatementResult {
                    query: statement.to_string(),
                    rows,
                })
            }
            None => {
                let (status, stderr) = client.finish().await;
                tracing::debug!(session = %self.label, status = %status, "client exited");
                Err(SessionError::StatementFailed {
                    query: statement.to_string(),
                    status,
                    stderr,
                })
            }
        }
    }
}

impl ClientProcess {
    /// Collects the exit status and stderr of a client that closed stdout.
    async fn finish(self) -> (String, String) {
        let ClientProcess {
            mut child,
            stdin,
            stderr,
            ..
        } = self;
        drop(stdin);

        let status = child
            .wait()
            .await
            .map_or_else(
                |err| format!("unknown status: {err}"),
                |status| status.to_string(),
            );
        let stderr = stderr.await.unwrap_or_default();
        (status, stderr.trim().to_string())
    }
}

/// Reads non-empty stdout lines until the sync marker. `None` means the
/// client closed stdout first.
async fn read_until_sync(
    stdout: &mut Lines<BufReader<ChildStdout>>,
) -> io::Result<Option<Vec<String>>> {
    let mut rows = Vec::new();
    while let Some(line) = stdout.next_line().await? {
        if line.contains(SYNC_MARKER) {
            return Ok(Some(rows));
        }
        let line = line.trim_end();
        if !line.is_empty() {
            rows.push(line.to_string());
        }
    }
    Ok(None)
}

impl SqlSession for CommandSession {
    fn label(&self) -> &str {
        &self.label
    }

    fn execute_stream<'a>(&'a mut self, sql: &'a str) -> StatementStream<'a> {
        Box::pin(stream! {
            for statement in split_statements(sql) {
                let result = self.run_statement(&statement).await;
                let failed = result.is_err();
                yield result;
                if failed {
                    break;
                }
            }
        })
    }
}

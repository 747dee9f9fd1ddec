use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::RunError;

/// Removes every file left in `dir` by a previous run, creating the
/// directory when it does not exist yet.
pub(super) async fn clear_output_dir(dir: &Path) -> Result<(), RunError> {
    fs::create_dir_all(dir).await.map_err(|err| RunError::Io {
        action: "create directory",
        path: dir.to_path_buf(),
        source: err,
    })?;

    let mut entries = fs::read_dir(dir).await.map_err(|err| RunError::Io {
        action: "list",
        path: dir.to_path_buf(),
        source: err,
    })?;

    while let Some(entry) = entries.next_entry().await.map_err(|err| RunError::Io {
        action: "list",
        path: dir.to_path_buf(),
        source: err,
    })? {
        let path = entry.path();
        let file_type = entry.file_type().await.map_err(|err| RunError::Io {
            action: "inspect",
            path: path.clone(),
            source: err,
        })?;
        if file_type.is_dir() {
            tracing::warn!(path = %path.display(), "leaving directory in output folder");
            continue;
        }

        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => {
                return Err(RunError::Io {
                    action: "delete",
                    path,
                    source: err,
                });
            }
        }
    }

    Ok(())
}

pub(super) async fn read_script(root: &Path, script: &str) -> Result<String, RunError> {
    let path = root.join(format!("{script}.sql"));
    fs::read_to_string(&path).await.map_err(|err| {
        if err.kind() == ErrorKind::NotFound {
            RunError::ScriptNotFound {
                script: script.to_string(),
                path: path.clone(),
            }
        } else {
            RunError::Io {
                action: "read",
                path: path.clone(),
                source: err,
            }
        }
    })
}

pub(super) async fn write_prepared(
    output_dir: &Path,
    script: &str,
    prepared: &str,
) -> Result<PathBuf, RunError> {
    let path = output_dir.join(format!("{script}-prepared.sql"));
    fs::write(&path, prepared)
        .await
        .map_err(|err| RunError::Io {
            action: "write",
            path: path.clone(),
            source: err,
        })?;
    Ok(path)
}

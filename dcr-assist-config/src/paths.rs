use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::defaults;

/// Script roots and the prepared-script output location.
///
/// Empty override strings mean "use the directory next to the workspace",
/// which is how checked-out template repositories are usually laid out.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct PathsConfig {
    /// Override root for the 6.0 native app templates.
    #[serde(default)]
    pub local_dcr_v6_path: String,

    /// Override root for the 5.5 templates (Jinja and SQL param).
    #[serde(default)]
    pub local_dcr_v55_path: String,

    /// Directory that receives `{script}-prepared.sql` files.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            local_dcr_v6_path: String::new(),
            local_dcr_v55_path: String::new(),
            output_dir: default_output_dir(),
        }
    }
}

impl PathsConfig {
    pub fn v6_root(&self, workspace: &Path) -> PathBuf {
        resolve_root(&self.local_dcr_v6_path, workspace, defaults::DCR_V6_DIR)
    }

    pub fn v55_root(&self, workspace: &Path) -> PathBuf {
        resolve_root(&self.local_dcr_v55_path, workspace, defaults::DCR_V55_DIR)
    }

    pub fn output_dir(&self, workspace: &Path) -> PathBuf {
        let configured = Path::new(&self.output_dir);
        if self.output_dir.is_empty() {
            workspace.join(defaults::OUTPUT_DIR)
        } else if configured.is_absolute() {
            configured.to_path_buf()
        } else {
            workspace.join(configured)
        }
    }
}

fn resolve_root(configured: &str, workspace: &Path, fallback: &str) -> PathBuf {
    if configured.is_empty() {
        workspace.join(fallback)
    } else {
        PathBuf::from(configured)
    }
}

fn default_output_dir() -> String {
    defaults::OUTPUT_DIR.to_string()
}

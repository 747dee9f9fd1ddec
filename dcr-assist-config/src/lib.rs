pub mod accounts;
pub mod constants;
pub mod loader;
pub mod paths;

pub use accounts::{AccountConfig, AccountRegistry};
pub use loader::{ConfigManager, DcrAssistConfig};
pub use paths::PathsConfig;

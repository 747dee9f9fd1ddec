pub mod files {
    /// Configuration file looked up in the workspace and the home directory.
    pub const CONFIG_FILE_NAME: &str = "dcr-assist.toml";
    /// Per-user directory that holds a fallback configuration.
    pub const HOME_CONFIG_DIR: &str = ".dcr-assist";
}

pub mod defaults {
    pub const DCR_V6_DIR: &str = "data-clean-room-tng";
    pub const DCR_V55_DIR: &str = "data-clean-room";
    pub const OUTPUT_DIR: &str = "output";
}

pub mod env {
    pub const LOCAL_DCR_V6_PATH: &str = "DCR_ASSIST_LOCAL_DCR_V6_PATH";
    pub const LOCAL_DCR_V55_PATH: &str = "DCR_ASSIST_LOCAL_DCR_V55_PATH";
    pub const OUTPUT_DIR: &str = "DCR_ASSIST_OUTPUT_DIR";
}

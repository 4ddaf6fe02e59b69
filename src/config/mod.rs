// src/config/mod.rs
pub mod settings;

pub use settings::{DataSourceConfig, LogzIoConfig, Settings, ENV_CONFIG_PATH};

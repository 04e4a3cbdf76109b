pub mod config;
pub mod paths;

pub use config::{Config, LoggingConfig, SerializdConfig, default_data_keys, default_probe_endpoints};
pub use paths::PathManager;

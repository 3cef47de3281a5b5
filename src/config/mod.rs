pub mod app_config;
pub mod loader;

// Re-export commonly used types
pub use app_config::{AppConfig, ContainerConfig, LoggingSettings};
pub use loader::ConfigLoader;

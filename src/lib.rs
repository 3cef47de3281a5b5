//! A small service locator.
//!
//! [`ServiceContainer`] holds plain values, factories and pre-built objects
//! under string keys. Factories are resolved lazily on first access and
//! memoized; factories wrapped with [`ServiceContainer::force_new`] are
//! invoked again on every access.
//!
//! ```
//! use svc_locator::{Factory, ServiceContainer};
//!
//! let container = ServiceContainer::new();
//! container.set_value("greeting", "Hello World!").unwrap();
//! container.set_factory("shout", |c: &ServiceContainer| {
//!     c.get_as::<&str>("greeting").map(|g| g.to_uppercase()).unwrap_or_default()
//! }).unwrap();
//!
//! assert_eq!(*container.get_as::<String>("shout").unwrap(), "HELLO WORLD!");
//! assert!(container.set_value("shout", "again").is_err());
//!
//! container.set("fresh", container.force_new(Factory::new(|_| Vec::<u8>::new())).unwrap()).unwrap();
//! let a = container.get("fresh").unwrap();
//! let b = container.get("fresh").unwrap();
//! assert!(!std::sync::Arc::ptr_eq(&a, &b));
//! ```

pub mod config;
pub mod errors;
pub mod infrastructure;
pub mod logging;

// Re-export commonly used items for convenience
pub use config::{AppConfig, ContainerConfig};
pub use errors::{BoxError, ConfigError, ContainerError};
pub use infrastructure::container::{
    ContainerStats, EntryStatus, Factory, Registration, Service, ServiceContainer,
};

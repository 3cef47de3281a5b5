//! Service container module

pub mod entry;
pub mod factory;
pub mod registry;
pub mod stats;

mod resolution;

pub use entry::EntryStatus;
pub use factory::{Factory, Registration, Service};
pub use registry::ServiceContainer;
pub use stats::ContainerStats;

//! Group Module
//!
//! Named cache namespaces, their loaders, and the registry that resolves them.

mod loader;
mod namespace;
mod registry;
mod singleflight;

pub use loader::{Loader, LoaderFn};
pub use namespace::{Group, GroupBuilder};
pub use registry::GroupRegistry;
pub use singleflight::Flight;

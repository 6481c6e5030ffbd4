#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
// The ultimate strictness: catches things like missing documentation or overflow risks
#![warn(clippy::restriction)]
pub mod core;

pub use crate::core::alerts::engine::{AlertEngine, Resolution, ResolveFailure};
pub use crate::core::alerts::factories::{AlertContext, AlertFactory, FactoryError, FactoryRegistry};
pub use crate::core::alerts::model::{Alert, Priority, ResolvedAlert};
pub use crate::core::catalog::{CatalogEntry, CatalogError, EventCatalog};
pub use crate::core::events::model::{Channel, EventId};
pub use crate::core::events::tracker::EventTracker;
pub use crate::core::events::wire::ExternalEventRecord;

//! Core types and engine wiring for the odvoz waste schedule aggregator.

/// Grouping of pickup records into calendar marker entries.
pub mod aggregate;
/// Waste category vocabulary and display classification.
pub mod classify;
/// Domain models and identifiers shared by all providers.
pub mod model;
/// Splitting of pickup records into today/upcoming/past views.
pub mod partition;
/// Traits describing the provider and settings interfaces.
pub mod ports;
/// Session state machine holding the current batch and its derived views.
pub mod session;

pub use aggregate::*;
pub use classify::*;
pub use model::*;
pub use partition::*;
pub use ports::*;
pub use session::*;

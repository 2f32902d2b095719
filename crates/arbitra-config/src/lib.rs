//! arbitra-config
//!
//! Term-indexed court configuration. `ConfigStore` resolves the record in
//! effect at any term; `ConfigScheduler` is the only writer, accepting
//! governor-signed changes for terms far enough in the future.

pub mod query;
pub mod scheduler;
pub mod store;

pub use query::ConfigQuery;
pub use scheduler::ConfigScheduler;
pub use store::ConfigStore;

//! Run module
//!
//! Persisted records of agent and crew invocations.

mod file_store;
mod model;
mod repository;

pub use file_store::FileRunStore;
pub use model::*;
pub use repository::RunRepository;

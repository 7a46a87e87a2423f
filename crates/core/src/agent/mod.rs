//! Agent module
//!
//! Agent definitions: the personas a run can invoke.

mod file_store;
mod model;
mod repository;

pub use file_store::FileAgentStore;
pub use model::*;
pub use repository::AgentRepository;

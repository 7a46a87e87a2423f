//! Core library for the Crew API
//!
//! This crate contains the durable records of the service:
//! - Agent definitions
//! - Run attempts and their status lifecycle

pub mod agent;
pub mod error;
pub mod run;
mod store;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;

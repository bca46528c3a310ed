//! Connect to a MongoDB deployment, insert one document, read the collection
//! back and disconnect.

pub mod cli;
pub mod document;
pub mod error;
pub mod mongo;
pub mod pipeline;

pub use error::{Result, RoundtripError};

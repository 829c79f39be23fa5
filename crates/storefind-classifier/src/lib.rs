//! Product-to-category classification backed by a chat-completions LLM.
//!
//! The store search asks the model for the single Google Places category or
//! keyword that best finds shops selling a product. Any failure is reported as
//! a [`ClassifierError`]; callers fall back to the raw product text.

pub mod client;
pub mod error;
mod types;

pub use client::CategoryClassifier;
pub use error::ClassifierError;

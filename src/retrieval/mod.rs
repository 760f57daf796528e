//! Namespace-scoped similarity retrieval and context assembly.

mod context;
mod service;

pub use service::{ContextProvider, NoopContextProvider, RetrievalError, RetrievalService};

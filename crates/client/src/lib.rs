//! Backend access for the AskDocs client.
//!
//! The conversation view only sees the traits in [`api`]; [`HttpBackend`]
//! talks to the REST service and [`MockBackend`] serves scripted data for
//! tests and offline runs.

pub mod api;
pub mod http;
pub mod mock;

pub use api::{Backend, DocumentStore, MessageExchange, ProjectDirectory, UploadReceipt};
pub use askdocs_core::{Error, Result};
pub use http::HttpBackend;
pub use mock::{MockBackend, MockReply, ReplyGate};

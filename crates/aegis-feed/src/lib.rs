//! Feed layer: pulls complete read-model snapshots over HTTP and sorts ingested files by kind.

mod ingest;
pub use ingest::IngestKind;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{FeedClient, FeedError};

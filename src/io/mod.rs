//! Delimited-text input and output for the analytical table.

/// CSV export of the analytical table.
pub mod export;
/// CSV ingestion and shape validation.
pub mod ingest;

pub mod cache;
pub mod ingest;
pub mod service;

#[cfg(test)]
mod testing;

pub use cache::OrderCache;
pub use ingest::{IngestOutcome, OrderIngestor};
pub use service::{Lookup, LookupSource, OrderService};

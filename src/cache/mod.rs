//! Result caching in front of the batch engines.

mod ttl;

pub use ttl::TtlCache;

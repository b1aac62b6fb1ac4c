//! Gecko profile synthesis
//!
//! Turns the merged sample streams into the Firefox Profiler interchange
//! document: per-thread sample lists over deduplicated frame/stack/string
//! tables, serialized as compact JSON and gzipped. The whole pass is
//! single-threaded and order-sensitive; byte-exact output for
//! identical input is a hard requirement.
//!
//! - [`builder`]: partition, symbolicate, deduplicate, normalize
//! - [`schema`]: serde types for the output document
//! - [`arena`]: append-only keyed tables backing the deduplication
//! - [`writer`]: compact JSON → gzip → atomic rename

pub mod arena;
pub mod builder;
pub mod schema;
pub mod writer;

pub use builder::synthesize;
pub use schema::GeckoProfile;
pub use writer::{write_gzipped, write_profile};

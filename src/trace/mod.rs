//! Trace container access
//!
//! An Instruments `.trace` container is read exclusively through `xctrace
//! export`: one invocation for the table of contents (the manifest), then
//! one invocation per table query. Each query is independent and slow, so
//! callers fan them out concurrently against a shared read-only handle.
//!
//! - [`container`]: open/validate a container, derive run capabilities
//! - [`xctrace`]: the `xctrace export` subprocess boundary
//! - [`rows`]: XML row decoding with id/ref back-reference resolution
//! - [`schema`]: table schema ids and column tags

pub mod container;
pub mod rows;
pub mod schema;
pub mod xctrace;

pub use container::XctraceContainer;

use std::future::Future;

use crate::domain::{ConvertError, TimeProfilerSettings};

/// Read-only handle to one run of an opened trace container.
///
/// `export_table` is safe to call concurrently with itself; the trait is
/// the seam where tests substitute canned table XML for the real
/// subprocess.
pub trait ContainerReader: Sync {
    /// Capability flags derived from the container manifest at open time.
    fn settings(&self) -> TimeProfilerSettings;

    /// Export one table of the selected run as raw XML.
    fn export_table(
        &self,
        schema: &str,
    ) -> impl Future<Output = Result<String, ConvertError>> + Send;
}

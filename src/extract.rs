//! Per-track sample extraction
//!
//! One extraction operation per track; CPU stacks are always present, the
//! other three run only when the container manifest advertises them. Each
//! operation is a single table query followed by row decoding, so the
//! caller can fan all present tracks out concurrently against the shared
//! read-only container handle and join them before synthesis. The first
//! failing track aborts the whole conversion; sibling results are
//! discarded.

use std::future::Future;

use log::debug;

use crate::domain::{ConvertError, Sample};
use crate::trace::rows::decode_sample_rows;
use crate::trace::schema::{self, TableSchema};
use crate::trace::ContainerReader;

/// CPU stack samples; always recorded.
pub async fn extract_cpu_samples<R: ContainerReader>(
    reader: &R,
) -> Result<Vec<Sample>, ConvertError> {
    extract_track(reader, &schema::TIME_PROFILE).await
}

/// Thread-state intervals (blocked/runnable/...), when recorded.
pub async fn extract_thread_state_samples<R: ContainerReader>(
    reader: &R,
) -> Result<Vec<Sample>, ConvertError> {
    extract_track(reader, &schema::THREAD_STATE).await
}

/// Virtual-memory events (page faults, zero fills, ...), when recorded.
pub async fn extract_virtual_memory_samples<R: ContainerReader>(
    reader: &R,
) -> Result<Vec<Sample>, ConvertError> {
    extract_track(reader, &schema::VIRTUAL_MEMORY).await
}

/// Syscall intervals, when recorded.
pub async fn extract_syscall_samples<R: ContainerReader>(
    reader: &R,
) -> Result<Vec<Sample>, ConvertError> {
    extract_track(reader, &schema::SYSCALL).await
}

/// Gate an optional track on its capability flag.
///
/// The track future is only polled when the flag is set, so an absent
/// track never issues its container query.
pub async fn if_present<F>(present: bool, track: F) -> Result<Vec<Sample>, ConvertError>
where
    F: Future<Output = Result<Vec<Sample>, ConvertError>>,
{
    if present {
        track.await
    } else {
        Ok(Vec::new())
    }
}

async fn extract_track<R: ContainerReader>(
    reader: &R,
    table: &TableSchema,
) -> Result<Vec<Sample>, ConvertError> {
    let xml = reader.export_table(table.schema).await?;
    let samples = decode_sample_rows(&xml, table)?;
    debug!("{}: extracted {} samples", table.schema, samples.len());
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TimeProfilerSettings;

    /// Reader double that fails every query; used to prove gating never
    /// polls an absent track.
    struct RefusingReader;

    impl ContainerReader for RefusingReader {
        fn settings(&self) -> TimeProfilerSettings {
            TimeProfilerSettings::default()
        }

        async fn export_table(&self, schema: &str) -> Result<String, ConvertError> {
            Err(ConvertError::Exporter(format!("unexpected query for {schema}")))
        }
    }

    #[tokio::test]
    async fn test_absent_track_is_never_queried() {
        let reader = RefusingReader;
        let samples = if_present(false, extract_syscall_samples(&reader)).await.unwrap();
        assert!(samples.is_empty());
    }

    #[tokio::test]
    async fn test_present_track_failure_propagates() {
        let reader = RefusingReader;
        let err = if_present(true, extract_syscall_samples(&reader)).await.unwrap_err();
        assert!(err.to_string().contains("syscall"));
    }
}

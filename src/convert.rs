//! End-to-end conversion orchestration.
//!
//! Open the container, fan the per-track extractions and the image-table
//! query out concurrently against the shared read-only handle, join, then
//! run the single-threaded synthesis pass and write the compressed output.
//! The extraction phase is the only concurrent portion; everything after
//! the join is deterministic, order-sensitive computation.

use std::path::Path;
use std::time::Instant;

use log::info;

use crate::domain::ConvertError;
use crate::extract;
use crate::gecko::{self, GeckoProfile};
use crate::symbolization::ImageTable;
use crate::trace::{ContainerReader, XctraceContainer};

/// Convert one opened run into a Gecko profile.
///
/// The extraction queries can be quite slow, so all present tracks and the
/// image table load in parallel; the first failure aborts the conversion
/// and sibling results are discarded.
pub async fn convert<R: ContainerReader>(
    reader: &R,
    app_label: Option<&str>,
) -> Result<GeckoProfile, ConvertError> {
    let settings = reader.settings();

    let started = Instant::now();
    let (syscalls, thread_states, virtual_memory, cpu, images) = tokio::try_join!(
        extract::if_present(settings.has_syscalls, extract::extract_syscall_samples(reader)),
        extract::if_present(
            settings.has_thread_states,
            extract::extract_thread_state_samples(reader)
        ),
        extract::if_present(
            settings.has_virtual_memory,
            extract::extract_virtual_memory_samples(reader)
        ),
        extract::extract_cpu_samples(reader),
        ImageTable::build(reader),
    )?;
    info!("loaded symbols, samples and load addresses in {:.2?}", started.elapsed());

    // Fixed track priority: the concatenation order decides per-thread
    // sample order in the output and must not change.
    let mut samples =
        Vec::with_capacity(syscalls.len() + thread_states.len() + virtual_memory.len() + cpu.len());
    samples.extend(syscalls);
    samples.extend(thread_states);
    samples.extend(virtual_memory);
    samples.extend(cpu);

    let started = Instant::now();
    let profile = gecko::synthesize(app_label, &samples, &images, settings);
    info!("converted to Gecko format in {:.2?}", started.elapsed());

    Ok(profile)
}

/// Convert `(container, run)` and write the gzipped profile to `output`.
pub async fn convert_trace(
    input: &Path,
    run: u32,
    app_label: Option<&str>,
    output: &Path,
) -> Result<(), ConvertError> {
    let reader = XctraceContainer::open(input, run).await?;
    let profile = convert(&reader, app_label).await?;

    let started = Instant::now();
    gecko::write_profile(&profile, output)?;
    info!("gzipped and wrote {} in {:.2?}", output.display(), started.elapsed());

    Ok(())
}

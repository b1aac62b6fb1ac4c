//! Core data types for trace samples, loaded images and run capabilities.

/// Which track a sample was recorded on.
///
/// The variant order matters downstream: samples are concatenated in the
/// fixed priority `Syscall`, `ThreadState`, `VirtualMemory`, `Cpu` before
/// per-thread partitioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleCategory {
    Cpu,
    ThreadState,
    VirtualMemory,
    Syscall,
}

impl SampleCategory {
    /// Stable label used in the output profile and in log messages.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SampleCategory::Cpu => "cpu",
            SampleCategory::ThreadState => "thread-state",
            SampleCategory::VirtualMemory => "virtual-memory",
            SampleCategory::Syscall => "syscall",
        }
    }
}

/// Thread identity as reported by the trace container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadInfo {
    pub tid: u64,
    /// Display name from the container's formatted thread column, when the
    /// run recorded one.
    pub name: Option<String>,
}

/// One observed event from any track.
///
/// Immutable once extracted; the synthesizer consumes each sample exactly
/// once. Stack addresses are leaf-first, exactly as the container exports
/// them.
#[derive(Debug, Clone)]
pub struct Sample {
    /// Run-relative monotonic timestamp in nanoseconds.
    pub timestamp_ns: u64,
    pub thread: ThreadInfo,
    pub category: SampleCategory,
    /// Raw return addresses, leaf-first. May be empty (e.g. thread-state
    /// rows carry no backtrace).
    pub stack: Vec<u64>,
    /// Duration or magnitude in nanoseconds; for CPU samples this is the
    /// sampling weight column.
    pub weight_ns: u64,
    /// Category-specific payload: syscall name, VM operation, thread state.
    pub label: Option<String>,
}

/// A loaded binary image from the container's image table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Library {
    pub load_address_start: u64,
    pub load_address_end: u64,
    pub name: String,
    pub path: String,
    /// Build UUID of the image.
    pub identifier: String,
}

impl Library {
    /// Whether `addr` falls inside this image's load range.
    #[must_use]
    pub fn contains(&self, addr: u64) -> bool {
        addr >= self.load_address_start && addr < self.load_address_end
    }
}

/// Capability flags for one recorded run.
///
/// Produced once from the container manifest and read-only thereafter;
/// drives which track extractions are attempted at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeProfilerSettings {
    pub has_thread_states: bool,
    pub has_virtual_memory: bool,
    pub has_syscalls: bool,
    /// Whether the run recorded display names for threads. When false,
    /// threads are rendered as `Thread <tid>` even if rows carry a
    /// formatted name.
    pub thread_names: bool,
}

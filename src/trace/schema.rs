//! Table schemas understood by the converter.
//!
//! Each recorded run advertises a set of tables in the container manifest;
//! the schema id doubles as the `xctrace export` XPath selector and as the
//! key for the capability flags. Every sample table shares the same row
//! shape (time, thread, weight, optional backtrace) but differs in which
//! column tags carry them.

use crate::domain::SampleCategory;

pub const TIME_PROFILE_SCHEMA: &str = "time-profile";
pub const THREAD_STATE_SCHEMA: &str = "thread-state";
pub const VIRTUAL_MEMORY_SCHEMA: &str = "virtual-memory";
pub const SYSCALL_SCHEMA: &str = "syscall";
/// Loaded binary image table; queried by the image resolver, not the
/// sample extractor.
pub const BINARY_IMAGE_SCHEMA: &str = "binary-load-info";
/// Auxiliary table whose presence means the run recorded thread names.
pub const THREAD_NAMES_SCHEMA: &str = "thread-names";

pub const SAMPLE_TIME_TAG: &str = "sample-time";
pub const START_TIME_TAG: &str = "start-time";
pub const WEIGHT_TAG: &str = "weight";
pub const DURATION_TAG: &str = "duration";

/// How to decode one sample table's rows into the common sample shape.
#[derive(Debug, Clone, Copy)]
pub struct TableSchema {
    pub schema: &'static str,
    pub category: SampleCategory,
    /// Column tag holding the run-relative timestamp.
    pub time_tag: &'static str,
    /// Column tag holding the duration/magnitude.
    pub weight_tag: &'static str,
    /// Column tag holding the category payload (syscall name, VM
    /// operation, thread state); `None` for CPU samples.
    pub label_tag: Option<&'static str>,
}

pub const TIME_PROFILE: TableSchema = TableSchema {
    schema: TIME_PROFILE_SCHEMA,
    category: SampleCategory::Cpu,
    time_tag: SAMPLE_TIME_TAG,
    weight_tag: WEIGHT_TAG,
    label_tag: None,
};

pub const THREAD_STATE: TableSchema = TableSchema {
    schema: THREAD_STATE_SCHEMA,
    category: SampleCategory::ThreadState,
    time_tag: START_TIME_TAG,
    weight_tag: DURATION_TAG,
    label_tag: Some("state"),
};

pub const VIRTUAL_MEMORY: TableSchema = TableSchema {
    schema: VIRTUAL_MEMORY_SCHEMA,
    category: SampleCategory::VirtualMemory,
    time_tag: START_TIME_TAG,
    weight_tag: DURATION_TAG,
    label_tag: Some("operation"),
};

pub const SYSCALL: TableSchema = TableSchema {
    schema: SYSCALL_SCHEMA,
    category: SampleCategory::Syscall,
    time_tag: START_TIME_TAG,
    weight_tag: DURATION_TAG,
    label_tag: Some("syscall"),
};

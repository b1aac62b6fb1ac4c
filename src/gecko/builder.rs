//! Profile synthesis: partition, symbolicate, deduplicate, normalize.
//!
//! The input is the single concatenated sample sequence in track priority
//! order (syscalls, thread states, virtual memory, CPU). Samples are
//! partitioned per thread in first-seen order and kept in their
//! concatenated order within a thread; there is no secondary sort by
//! timestamp. Stacks arrive leaf-first and are interned root-first so that
//! shared call-path prefixes collapse onto shared stack-table nodes.

// Nanosecond-to-millisecond conversions intentionally go through f64.
#![allow(clippy::cast_precision_loss)]

use std::collections::HashMap;

use crate::domain::{Sample, SampleCategory, TimeProfilerSettings};
use crate::gecko::arena::{KeyedTable, StringTable};
use crate::gecko::schema::{
    GeckoFrame, GeckoProfile, GeckoSample, GeckoStack, ProfileMeta, ThreadProfile,
};
use crate::symbolization::ImageTable;

const PRODUCT: &str = "tracefox";
const PROFILE_VERSION: u32 = 1;
/// Nominal Instruments time-profile sampling interval, milliseconds.
const SAMPLING_INTERVAL_MS: f64 = 1.0;

fn ns_to_ms(ns: u64) -> f64 {
    ns as f64 / 1_000_000.0
}

/// Frame identity within one thread's frame table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum FrameKey {
    /// Resolved into a loaded image: identified by the image's load start
    /// and the offset within it.
    Image { image_start: u64, offset: u64 },
    /// Address outside every loaded image.
    Raw(u64),
    /// Synthetic payload frame (syscall name, VM operation, thread state).
    Label(String),
}

struct ThreadBuilder {
    tid: u64,
    name: Option<String>,
    frames: KeyedTable<FrameKey, GeckoFrame>,
    stacks: KeyedTable<(u32, Option<u32>), GeckoStack>,
    strings: StringTable,
    samples: Vec<GeckoSample>,
}

impl ThreadBuilder {
    fn new(tid: u64) -> Self {
        Self {
            tid,
            name: None,
            frames: KeyedTable::default(),
            stacks: KeyedTable::default(),
            strings: StringTable::default(),
            samples: Vec::new(),
        }
    }

    fn add_sample(&mut self, sample: &Sample, images: &ImageTable, min_timestamp_ns: u64) {
        if self.name.is_none() {
            self.name.clone_from(&sample.thread.name);
        }

        // Stacks are captured leaf-first; intern root-first so shared
        // prefixes share stack-table nodes.
        let mut parent: Option<u32> = None;
        for &addr in sample.stack.iter().rev() {
            let frame = self.intern_address_frame(addr, images);
            parent = Some(self.intern_stack(frame, parent));
        }

        // Non-CPU tracks contribute a synthetic leaf naming the event, so
        // syscalls, VM events and thread states show up as their own
        // timeline rows in the viewer.
        if sample.category != SampleCategory::Cpu {
            if let Some(label) = sample.label.as_deref() {
                let frame = self.intern_label_frame(label);
                parent = Some(self.intern_stack(frame, parent));
            }
        }

        let category = self.strings.intern(sample.category.as_str());
        self.samples.push(GeckoSample {
            stack_id: parent,
            time: ns_to_ms(sample.timestamp_ns - min_timestamp_ns),
            weight: ns_to_ms(sample.weight_ns),
            category,
        });
    }

    fn intern_address_frame(&mut self, addr: u64, images: &ImageTable) -> u32 {
        match images.resolve(addr) {
            Some((lib, offset)) => {
                let strings = &mut self.strings;
                self.frames.intern(
                    FrameKey::Image { image_start: lib.load_address_start, offset },
                    || {
                        let location = strings.intern(&format!("{} +0x{offset:x}", lib.name));
                        let library = strings.intern(&lib.name);
                        GeckoFrame {
                            location,
                            library: Some(library),
                            offset: Some(offset),
                            raw_address: Some(addr),
                        }
                    },
                )
            }
            None => {
                let strings = &mut self.strings;
                self.frames.intern(FrameKey::Raw(addr), || GeckoFrame {
                    location: strings.intern(&format!("0x{addr:x}")),
                    library: None,
                    offset: None,
                    raw_address: Some(addr),
                })
            }
        }
    }

    fn intern_label_frame(&mut self, label: &str) -> u32 {
        let strings = &mut self.strings;
        self.frames.intern(FrameKey::Label(label.to_string()), || GeckoFrame {
            location: strings.intern(label),
            library: None,
            offset: None,
            raw_address: None,
        })
    }

    fn intern_stack(&mut self, frame_id: u32, parent_stack_id: Option<u32>) -> u32 {
        self.stacks.intern((frame_id, parent_stack_id), || GeckoStack {
            frame_id,
            parent_stack_id,
        })
    }

    fn finish(self, settings: TimeProfilerSettings) -> ThreadProfile {
        let name = if settings.thread_names { self.name } else { None };
        ThreadProfile {
            name: name.unwrap_or_else(|| format!("Thread {}", self.tid)),
            thread_id: self.tid,
            samples: self.samples,
            stack_table: self.stacks.into_values(),
            frame_table: self.frames.into_values(),
            string_table: self.strings.into_vec(),
        }
    }
}

/// Build the output profile from the concatenated sample sequence.
///
/// Zero samples is valid and yields an empty-but-well-formed profile.
#[must_use]
pub fn synthesize(
    app_label: Option<&str>,
    samples: &[Sample],
    images: &ImageTable,
    settings: TimeProfilerSettings,
) -> GeckoProfile {
    let min_timestamp_ns = samples.iter().map(|s| s.timestamp_ns).min();

    let mut thread_index: HashMap<u64, usize> = HashMap::new();
    let mut builders: Vec<ThreadBuilder> = Vec::new();

    if let Some(min_ts) = min_timestamp_ns {
        for sample in samples {
            let tid = sample.thread.tid;
            let idx = *thread_index.entry(tid).or_insert_with(|| {
                builders.push(ThreadBuilder::new(tid));
                builders.len() - 1
            });
            builders[idx].add_sample(sample, images, min_ts);
        }
    }

    GeckoProfile {
        meta: ProfileMeta {
            app_label: app_label.map(str::to_string),
            run_start_time: min_timestamp_ns.map_or(0.0, ns_to_ms),
            interval: SAMPLING_INTERVAL_MS,
            product: PRODUCT.to_string(),
            version: PROFILE_VERSION,
        },
        threads: builders.into_iter().map(|b| b.finish(settings)).collect(),
    }
}

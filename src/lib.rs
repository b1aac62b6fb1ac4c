//! # tracefox - Instruments trace to Gecko profile converter
//!
//! tracefox ingests an Apple Instruments `.trace` container (as recorded
//! with the Time Profiler template) and produces a gzipped Gecko-format
//! JSON profile for the Firefox Profiler UI.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                 Instruments .trace container                 │
//! └──────────────────────────┬───────────────────────────────────┘
//!                            │ xctrace export (one call per table)
//!                            ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    tracefox (This Crate)                     │
//! │                                                              │
//! │  ┌───────────┐   ┌────────────┐   ┌───────────────────────┐  │
//! │  │   trace   │──▶│  extract   │──▶│         gecko         │  │
//! │  │ (reader)  │   │ (4 tracks, │   │ (dedup tables, JSON,  │  │
//! │  │           │   │ concurrent)│   │  gzip, atomic write)  │  │
//! │  └───────────┘   └────────────┘   └───────────▲───────────┘  │
//! │        │                                      │              │
//! │        │         ┌────────────────┐           │              │
//! │        └────────▶│ symbolization  │───────────┘              │
//! │                  │ (image ranges) │                          │
//! │                  └────────────────┘                          │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`trace`]: read-only container access: TOC/capability parsing and
//!   per-table row queries via `xctrace export`, including the id/ref
//!   back-reference resolution the export format uses to intern values
//! - [`extract`]: per-track extraction into the common [`domain::Sample`]
//!   shape; optional tracks are gated on the run's capability flags and
//!   all present tracks are queried concurrently
//! - [`symbolization`]: sorted loaded-image table with binary-search
//!   address-to-(library, offset) resolution; unresolved addresses are
//!   rendered raw, never fatal
//! - [`gecko`]: single-threaded, deterministic profile synthesis:
//!   per-thread partitioning, frame/stack/string deduplication, compact
//!   JSON serialization, gzip, atomic rename
//! - [`convert`]: end-to-end orchestration and phase timing
//! - [`cli`], [`domain`]: argument parsing and shared types/errors
//!
//! ## Determinism
//!
//! Converting the same container twice must produce byte-identical output:
//! all tables are Vec-ordered (never map iteration order), samples keep
//! their fixed track-priority concatenation order, and the gzip header
//! carries no timestamp.

pub mod cli;
pub mod convert;
pub mod domain;
pub mod extract;
pub mod gecko;
pub mod symbolization;
pub mod trace;

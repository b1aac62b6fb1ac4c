//! Shared test support: an in-memory container double and XML row builders
//! mirroring the `xctrace export` table format.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Mutex;

use tracefox::domain::{ConvertError, TimeProfilerSettings};
use tracefox::trace::ContainerReader;

/// In-memory stand-in for an opened trace container. Records every table
/// query so tests can assert which extractions actually ran.
pub struct FakeContainer {
    settings: TimeProfilerSettings,
    tables: HashMap<String, String>,
    queries: Mutex<Vec<String>>,
}

impl FakeContainer {
    pub fn new(settings: TimeProfilerSettings) -> Self {
        Self { settings, tables: HashMap::new(), queries: Mutex::new(Vec::new()) }
    }

    #[must_use]
    pub fn with_table(mut self, schema: &str, xml: impl Into<String>) -> Self {
        self.tables.insert(schema.to_string(), xml.into());
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().expect("queries lock").clone()
    }
}

impl ContainerReader for FakeContainer {
    fn settings(&self) -> TimeProfilerSettings {
        self.settings
    }

    async fn export_table(&self, schema: &str) -> Result<String, ConvertError> {
        self.queries.lock().expect("queries lock").push(schema.to_string());
        self.tables
            .get(schema)
            .cloned()
            .ok_or_else(|| ConvertError::Exporter(format!("no such table: {schema}")))
    }
}

/// Wrap rows into a table export document.
pub fn table(rows: &[String]) -> String {
    format!("<trace-query-result><node>{}</node></trace-query-result>", rows.concat())
}

/// One sample row. `stack` is leaf-first, like the real export.
pub fn sample_row(
    time_tag: &str,
    time_ns: u64,
    tid: u64,
    thread_name: &str,
    weight_tag: &str,
    weight_ns: u64,
    stack: &[u64],
    label: Option<(&str, &str)>,
) -> String {
    let mut row = String::new();
    let _ = write!(row, "<row><{time_tag}>{time_ns}</{time_tag}>");
    let _ = write!(row, "<thread fmt=\"{thread_name}\"><tid>{tid}</tid></thread>");
    let _ = write!(row, "<{weight_tag}>{weight_ns}</{weight_tag}>");
    if !stack.is_empty() {
        row.push_str("<backtrace>");
        for addr in stack {
            let _ = write!(row, "<frame addr=\"0x{addr:x}\"/>");
        }
        row.push_str("</backtrace>");
    }
    if let Some((tag, value)) = label {
        let _ = write!(row, "<{tag} fmt=\"{value}\"/>");
    }
    row.push_str("</row>");
    row
}

pub fn binary_row(name: &str, load_addr: u64, text_size: u64) -> String {
    format!(
        "<row><binary name=\"{name}\" UUID=\"{name}-uuid\" load-addr=\"0x{load_addr:x}\" \
         text-size=\"{text_size}\" path=\"/usr/lib/{name}.dylib\"/></row>"
    )
}

pub fn empty_table() -> String {
    table(&[])
}

pub fn gunzip(bytes: &[u8]) -> String {
    use std::io::Read;
    let mut out = String::new();
    flate2::read::GzDecoder::new(bytes).read_to_string(&mut out).expect("valid gzip");
    out
}

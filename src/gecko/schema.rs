//! Serde types for the emitted Gecko profile document.
//!
//! The per-thread field names `samples`, `stackTable`, `frameTable` and
//! `stringTable` are a wire contract with profile viewers; the entry
//! shapes inside them are our own. All cross-references are indices:
//! samples point into the stack table, stacks into the frame table, frames
//! and categories into the string table.

use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeckoProfile {
    pub meta: ProfileMeta,
    pub threads: Vec<ThreadProfile>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileMeta {
    pub app_label: Option<String>,
    /// Run-relative time of the earliest sample, in milliseconds; sample
    /// times are normalized against it.
    pub run_start_time: f64,
    /// Nominal sampling interval in milliseconds.
    pub interval: f64,
    pub product: String,
    pub version: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadProfile {
    pub name: String,
    pub thread_id: u64,
    pub samples: Vec<GeckoSample>,
    pub stack_table: Vec<GeckoStack>,
    pub frame_table: Vec<GeckoFrame>,
    pub string_table: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeckoSample {
    /// Leaf stack node; `None` for a sample with no captured stack.
    pub stack_id: Option<u32>,
    /// Milliseconds since the profile's earliest sample.
    pub time: f64,
    /// Duration/magnitude in milliseconds.
    pub weight: f64,
    /// String-table index of the track label.
    pub category: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeckoStack {
    pub frame_id: u32,
    pub parent_stack_id: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeckoFrame {
    /// String-table index of the display label.
    pub location: u32,
    /// String-table index of the containing library name, when resolved.
    pub library: Option<u32>,
    /// Offset into the containing library, when resolved.
    pub offset: Option<u64>,
    /// Original address for address-derived frames; `None` for synthetic
    /// payload frames (syscall names, VM operations, thread states).
    pub raw_address: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_block_field_names_are_wire_contract() {
        let thread = ThreadProfile {
            name: "Main Thread".to_string(),
            thread_id: 7,
            samples: vec![GeckoSample { stack_id: Some(0), time: 0.0, weight: 1.0, category: 2 }],
            stack_table: vec![GeckoStack { frame_id: 0, parent_stack_id: None }],
            frame_table: vec![GeckoFrame {
                location: 0,
                library: Some(1),
                offset: Some(0x10),
                raw_address: Some(0x1010),
            }],
            string_table: vec!["libfoo +0x10".to_string(), "libfoo".to_string(), "cpu".to_string()],
        };

        let json: serde_json::Value = serde_json::to_value(&thread).unwrap();
        for key in ["samples", "stackTable", "frameTable", "stringTable", "threadId"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json["samples"][0]["stackId"], 0);
        assert_eq!(json["stackTable"][0]["parentStackId"], serde_json::Value::Null);
        assert_eq!(json["frameTable"][0]["rawAddress"], 0x1010);
    }
}

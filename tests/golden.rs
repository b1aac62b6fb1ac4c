//! Golden-file acceptance test: fixture table exports driven through the
//! real decode → extract → symbolicate → synthesize pipeline, compared
//! against a checked-in reference profile.

mod common;

use common::{gunzip, FakeContainer};
use tracefox::convert::convert;
use tracefox::domain::TimeProfilerSettings;
use tracefox::gecko::write_gzipped;
use tracefox::trace::schema::{
    BINARY_IMAGE_SCHEMA, SYSCALL_SCHEMA, THREAD_STATE_SCHEMA, TIME_PROFILE_SCHEMA,
    VIRTUAL_MEMORY_SCHEMA,
};

fn golden_container() -> FakeContainer {
    let settings = TimeProfilerSettings {
        has_thread_states: true,
        has_virtual_memory: true,
        has_syscalls: true,
        thread_names: true,
    };
    FakeContainer::new(settings)
        .with_table(TIME_PROFILE_SCHEMA, include_str!("fixtures/time_profile.xml"))
        .with_table(THREAD_STATE_SCHEMA, include_str!("fixtures/thread_state.xml"))
        .with_table(VIRTUAL_MEMORY_SCHEMA, include_str!("fixtures/virtual_memory.xml"))
        .with_table(SYSCALL_SCHEMA, include_str!("fixtures/syscall.xml"))
        .with_table(BINARY_IMAGE_SCHEMA, include_str!("fixtures/binary_load_info.xml"))
}

async fn convert_to_bytes() -> Vec<u8> {
    let profile = convert(&golden_container(), Some("DemoApp")).await.expect("conversion");
    let mut bytes = Vec::new();
    write_gzipped(&profile, &mut bytes).expect("gzip");
    bytes
}

#[tokio::test]
async fn test_matches_golden_profile() {
    let bytes = convert_to_bytes().await;

    let produced: serde_json::Value = serde_json::from_str(&gunzip(&bytes)).expect("valid JSON");
    let golden: serde_json::Value =
        serde_json::from_str(include_str!("fixtures/golden.json")).expect("valid golden");

    assert_eq!(produced, golden);
}

#[tokio::test]
async fn test_golden_conversion_is_byte_stable() {
    let first = convert_to_bytes().await;
    let second = convert_to_bytes().await;
    assert_eq!(first, second);
}

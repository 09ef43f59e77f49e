#![no_main]

use depviz_core::Snapshot;
use depviz_core::snapshot::lint;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(snapshot) = serde_json::from_slice::<Snapshot>(data) else {
        return;
    };
    let _ = lint(&snapshot);
    let _ = snapshot.content_hash();
});

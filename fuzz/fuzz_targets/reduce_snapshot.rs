#![no_main]

use depviz_core::{ReduceSettings, Snapshot, ViewOptions, reduce};
use libfuzzer_sys::fuzz_target;

// First byte selects the visibility switches; the rest is the snapshot text.
fuzz_target!(|data: &[u8]| {
    let Some((&mask, rest)) = data.split_first() else {
        return;
    };
    let Ok(text) = std::str::from_utf8(rest) else {
        return;
    };
    let Ok(snapshot) = Snapshot::from_json_str(text) else {
        return;
    };

    let options = ViewOptions {
        show_issues: mask & 0x01 != 0,
        show_all_issues: mask & 0x02 != 0,
        show_review_requests: mask & 0x04 != 0,
        show_refs: mask & 0x08 != 0,
        show_merged_refs: mask & 0x10 != 0,
        show_conflicts: mask & 0x20 != 0,
        hide_orphans: mask & 0x40 != 0,
    };
    let settings = ReduceSettings { depth_cap: 8 };
    let reduction = reduce(&snapshot, &options, &settings);

    for edge in reduction.graph.edges() {
        assert!(reduction.graph.contains(&edge.source));
        assert!(reduction.graph.contains(&edge.target));
    }
    let _ = serde_json::to_string(&reduction.report);
});

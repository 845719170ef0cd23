#![no_main]

use libfuzzer_sys::fuzz_target;
use rootdata::{ReaderConfig, RootFile};

fuzz_target!(|data: &[u8]| {
    let config = ReaderConfig { max_object_bytes: 1 << 20, ..Default::default() };
    let Ok(f) = RootFile::from_bytes_with_config(data.to_vec(), config) else {
        return;
    };
    for name in f.list_histograms() {
        if let Some((path, cycle)) = name.rsplit_once(';') {
            let _ = f.read_histogram(path, cycle.parse().unwrap_or(1));
        }
    }
    for tree in f.list_trees() {
        for leaf in f.list_leaves(&tree) {
            let _ = f.list_entries::<f64>(&tree, &leaf.branch, &leaf.leaf, 0, 1000);
        }
    }
});

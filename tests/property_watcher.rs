// tests/property_watcher.rs

use std::collections::BTreeSet;
use std::sync::Arc;

use proptest::prelude::*;
use testwatch::fs::mock::MockFileSystem;
use testwatch::watch::DirectoryWatcher;

// Small name pool so that consecutive snapshots overlap a lot.
fn snapshot_strategy() -> impl Strategy<Value = BTreeSet<String>> {
    proptest::collection::btree_set(
        (0..3usize, 0..6usize).prop_map(|(root, n)| {
            let root = ["lib", "app", "lib/nested"][root];
            format!("{root}/file_{n}.rb")
        }),
        0..12,
    )
}

fn load(fs: &MockFileSystem, files: &BTreeSet<String>) {
    for file in files {
        fs.add_file(file.clone(), 1);
    }
}

fn clear(fs: &MockFileSystem, files: &BTreeSet<String>) {
    for file in files {
        fs.remove(file);
    }
}

proptest! {
    #[test]
    fn diff_new_is_set_difference(
        first in snapshot_strategy(),
        second in snapshot_strategy(),
    ) {
        let fs = MockFileSystem::new();
        let mut watcher = DirectoryWatcher::new(Arc::new(fs.clone()), ["lib", "app"]);

        load(&fs, &first);
        let initial: BTreeSet<String> = watcher.diff_new().into_iter().collect();
        prop_assert_eq!(&initial, &first);

        clear(&fs, &first);
        load(&fs, &second);
        let new_files: BTreeSet<String> = watcher.diff_new().into_iter().collect();
        let expected: BTreeSet<String> = second.difference(&first).cloned().collect();
        prop_assert_eq!(new_files, expected);
    }

    #[test]
    fn diff_changed_reports_each_distinct_timestamp_once(
        stamps in proptest::collection::vec(0..4u64, 1..10),
    ) {
        let fs = MockFileSystem::new();
        fs.add_file("lib/a.rb", 100);
        let mut watcher = DirectoryWatcher::new(Arc::new(fs.clone()), ["lib"]);
        watcher.enumerate();
        watcher.track("lib/a.rb");

        let mut last = 100;
        for stamp in stamps {
            fs.add_file("lib/a.rb", stamp);
            let changed = watcher.diff_changed();
            if stamp == last {
                prop_assert!(changed.is_empty());
            } else {
                prop_assert_eq!(changed, vec!["lib/a.rb".to_string()]);
            }
            prop_assert!(watcher.diff_changed().is_empty());
            last = stamp;
        }
    }
}

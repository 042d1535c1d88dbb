// tests/change_filter.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::event::{AccessKind, CreateKind, DataChange, ModifyKind, RemoveKind};
use notify::EventKind;

use devloop::fs::mock::MockFileSystem;
use devloop::types::ChangeDetection;
use devloop::watch::{ChangeFilter, FilterRules, Verdict};

fn write_event() -> EventKind {
    EventKind::Modify(ModifyKind::Data(DataChange::Content))
}

fn filter_with(fs: &MockFileSystem, rules: FilterRules) -> ChangeFilter {
    ChangeFilter::new(Arc::new(fs.clone()), rules).expect("valid rules")
}

fn default_filter(fs: &MockFileSystem) -> ChangeFilter {
    filter_with(fs, FilterRules::default())
}

#[test]
fn first_write_is_accepted_and_repeat_is_duplicate() {
    let fs = MockFileSystem::new();
    fs.add_file("/proj/main.go", "package main");
    let mut filter = default_filter(&fs);
    let path = Path::new("/proj/main.go");

    assert_eq!(filter.check(path, &write_event()), Verdict::Accept);
    // Same write reported again by the backend: stamp unchanged.
    assert_eq!(filter.check(path, &write_event()), Verdict::Duplicate);
    assert!(!Verdict::Duplicate.is_relevant());
}

#[test]
fn new_modification_time_is_accepted_again() {
    let fs = MockFileSystem::new();
    fs.add_file("/proj/main.go", "package main");
    let mut filter = default_filter(&fs);
    let path = Path::new("/proj/main.go");

    assert_eq!(filter.check(path, &write_event()), Verdict::Accept);
    fs.add_file("/proj/main.go", "package main // edited");
    assert_eq!(filter.check(path, &write_event()), Verdict::Accept);
}

#[test]
fn temp_files_are_rejected_case_insensitively() {
    let fs = MockFileSystem::new();
    fs.add_file("/proj/x.tmp", "");
    fs.add_file("/proj/X.TMP", "");
    let mut filter = default_filter(&fs);

    assert_eq!(
        filter.check(Path::new("/proj/x.tmp"), &write_event()),
        Verdict::TempFile
    );
    assert_eq!(
        filter.check(Path::new("/proj/X.TMP"), &write_event()),
        Verdict::TempFile
    );
    assert!(filter.ledger().is_empty());
}

#[test]
fn temp_suffix_wins_over_allowed_extension() {
    let fs = MockFileSystem::new();
    let mut filter = default_filter(&fs);

    assert_eq!(
        filter.check(Path::new("/proj/main.go.tmp"), &write_event()),
        Verdict::TempFile
    );
}

#[test]
fn extra_temp_patterns_are_honoured() {
    let fs = MockFileSystem::new();
    let rules = FilterRules {
        temp_patterns: vec!["*.tmp".into(), "*.swp".into(), ".#*".into()],
        ..FilterRules::default()
    };
    let mut filter = filter_with(&fs, rules);

    assert!(filter.is_temp_file(Path::new("/proj/.main.go.swp")));
    assert!(filter.is_temp_file(Path::new("/proj/.#main.go")));
    assert!(!filter.is_temp_file(Path::new("/proj/main.go")));
    assert_eq!(
        filter.check(Path::new("/proj/.main.go.swp"), &write_event()),
        Verdict::TempFile
    );
}

#[test]
fn unlisted_extension_is_rejected_without_touching_ledger() {
    let fs = MockFileSystem::new();
    fs.add_file("/proj/README.md", "# hi");
    let mut filter = default_filter(&fs);

    assert_eq!(
        filter.check(Path::new("/proj/README.md"), &write_event()),
        Verdict::Extension
    );
    assert!(filter.ledger().is_empty());
}

#[test]
fn extension_is_a_suffix_match_on_the_file_name() {
    let fs = MockFileSystem::new();
    fs.add_file("/proj/page.tmpl", "{{.}}");
    let rules = FilterRules {
        extensions: vec![".go".into(), ".tmpl".into()],
        ..FilterRules::default()
    };
    let mut filter = filter_with(&fs, rules);

    assert_eq!(
        filter.check(Path::new("/proj/page.tmpl"), &write_event()),
        Verdict::Accept
    );
    assert_eq!(
        filter.check(Path::new("/proj/page.gohtml"), &write_event()),
        Verdict::Extension
    );
}

#[test]
fn excluded_prefix_matches_whole_components_only() {
    let fs = MockFileSystem::new();
    fs.add_file("/proj/vendor/lib.go", "package lib");
    fs.add_file("/proj/vendorx/lib.go", "package lib");
    let rules = FilterRules {
        exclusions: vec![PathBuf::from("/proj/vendor")],
        ..FilterRules::default()
    };
    let mut filter = filter_with(&fs, rules);

    assert_eq!(
        filter.check(Path::new("/proj/vendor/lib.go"), &write_event()),
        Verdict::Excluded
    );
    assert_eq!(
        filter.check(Path::new("/proj/vendorx/lib.go"), &write_event()),
        Verdict::Accept
    );
}

#[test]
fn access_events_are_ignored() {
    let fs = MockFileSystem::new();
    fs.add_file("/proj/main.go", "package main");
    let mut filter = default_filter(&fs);

    assert_eq!(
        filter.check(Path::new("/proj/main.go"), &EventKind::Access(AccessKind::Any)),
        Verdict::AccessOnly
    );
    // The later real write is still the first one the ledger sees.
    assert_eq!(
        filter.check(Path::new("/proj/main.go"), &EventKind::Create(CreateKind::File)),
        Verdict::Accept
    );
}

#[test]
fn deleted_file_is_stamped_now_and_accepted() {
    let fs = MockFileSystem::new();
    fs.add_file("/proj/old.go", "package main");
    let mut filter = default_filter(&fs);
    let path = Path::new("/proj/old.go");

    assert_eq!(filter.check(path, &write_event()), Verdict::Accept);
    fs.remove(path);
    assert_eq!(
        filter.check(path, &EventKind::Remove(RemoveKind::File)),
        Verdict::Accept
    );
}

#[test]
fn ledger_is_updated_on_duplicate_path_too() {
    let fs = MockFileSystem::new();
    fs.add_file("/proj/a.go", "package a");
    fs.add_file("/proj/b.go", "package b");
    let mut filter = default_filter(&fs);

    filter.check(Path::new("/proj/a.go"), &write_event());
    filter.check(Path::new("/proj/a.go"), &write_event());
    filter.check(Path::new("/proj/b.go"), &write_event());

    assert_eq!(filter.ledger().len(), 2);
    assert!(filter.ledger().get(Path::new("/proj/a.go")).is_some());
}

#[test]
fn content_hash_detection_ignores_touch_without_change() {
    let fs = MockFileSystem::new();
    fs.add_file("/proj/main.go", "package main");
    let rules = FilterRules {
        detection: ChangeDetection::Hash,
        ..FilterRules::default()
    };
    let mut filter = filter_with(&fs, rules);
    let path = Path::new("/proj/main.go");

    assert_eq!(filter.check(path, &write_event()), Verdict::Accept);

    // Rewritten with identical content: new mtime, same hash.
    fs.add_file("/proj/main.go", "package main");
    assert_eq!(filter.check(path, &write_event()), Verdict::Duplicate);

    fs.add_file("/proj/main.go", "package main\n\nfunc main() {}");
    assert_eq!(filter.check(path, &write_event()), Verdict::Accept);
}

#[test]
fn invalid_temp_pattern_is_rejected() {
    let fs = MockFileSystem::new();
    let rules = FilterRules {
        temp_patterns: vec!["[".into()],
        ..FilterRules::default()
    };

    assert!(ChangeFilter::new(Arc::new(fs), rules).is_err());
}

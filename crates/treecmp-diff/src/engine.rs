//! The comparison run: enumerate both roots, join on relative path, classify.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info, warn};
use treecmp_fs::{FileEntry, FileSystem, RelativePath};

use crate::classification::{Classification, ContentCheck, MetadataDelta, PathComparison};
use crate::content::ContentComparer;
use crate::enumerate::{enumerate, TreeListing};
use crate::error::{CompareError, CompareResult};
use crate::options::CompareOptions;
use crate::result::ComparisonResult;

/// Compare two directory trees.
///
/// Fails only if either root is unusable or the options are invalid. Every
/// other problem lands in the result as a per-path `ReadError`.
pub fn compare(
    fs: &dyn FileSystem,
    left: &Path,
    right: &Path,
    options: &CompareOptions,
) -> CompareResult<ComparisonResult> {
    options.validate()?;

    let started = Instant::now();
    info!(left = %left.display(), right = %right.display(), "scanning directories");
    // Both roots are validated before either tree is walked.
    let left_walk = enumerate(fs, left)?;
    let right_walk = enumerate(fs, right)?;
    let left_tree = TreeListing::collect(left_walk);
    let right_tree = TreeListing::collect(right_walk);
    info!(
        left_entries = left_tree.len(),
        right_entries = right_tree.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "scan finished"
    );

    let unreadable = merge_unreadable(&left_tree.unreadable, &right_tree.unreadable);
    let mut result = ComparisonResult::new();
    for (path, message) in &unreadable {
        result.insert(PathComparison::read_error(path.clone(), message.clone()));
    }

    let mut pairs = Vec::new();
    for (path, entry) in &left_tree.entries {
        if is_covered(&unreadable, path) {
            continue;
        }
        match right_tree.entries.get(path) {
            Some(other) => pairs.push((entry, other)),
            None => {
                result.insert(PathComparison::new(path.clone(), Classification::OnlyInLeft));
            }
        }
    }
    for path in right_tree.entries.keys() {
        if !left_tree.entries.contains_key(path) && !is_covered(&unreadable, path) {
            result.insert(PathComparison::new(path.clone(), Classification::OnlyInRight));
        }
    }

    debug!(pairs = pairs.len(), workers = options.workers, "comparing paths present in both trees");
    for comparison in compare_pairs(fs, left, right, &pairs, options)? {
        result.insert(comparison);
    }

    info!(
        paths = result.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "comparison finished"
    );
    Ok(result)
}

/// Combine both sides' unreadable locations, keeping only the outermost.
///
/// When both sides fail at the same path the left message is kept.
fn merge_unreadable(
    left: &BTreeMap<RelativePath, String>,
    right: &BTreeMap<RelativePath, String>,
) -> BTreeMap<RelativePath, String> {
    let mut merged = right.clone();
    for (path, message) in left {
        merged.insert(path.clone(), message.clone());
    }
    let nested: Vec<RelativePath> = merged
        .keys()
        .filter(|p| p.ancestors().any(|a| merged.contains_key(&a)))
        .cloned()
        .collect();
    for path in nested {
        merged.remove(&path);
    }
    merged
}

/// `true` if `path` or one of its ancestors is unreadable on either side.
fn is_covered(unreadable: &BTreeMap<RelativePath, String>, path: &RelativePath) -> bool {
    if unreadable.is_empty() {
        return false;
    }
    unreadable.contains_key(path) || path.ancestors().any(|a| unreadable.contains_key(&a))
}

fn compare_pairs(
    fs: &dyn FileSystem,
    left_root: &Path,
    right_root: &Path,
    pairs: &[(&FileEntry, &FileEntry)],
    options: &CompareOptions,
) -> CompareResult<Vec<PathComparison>> {
    if !options.is_parallel() {
        let mut comparer = ContentComparer::new(options.buffer_size);
        return Ok(pairs
            .iter()
            .map(|(l, r)| compare_pair(fs, left_root, right_root, l, r, &mut comparer))
            .collect());
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.workers)
        .thread_name(|i| format!("treecmp-worker-{i}"))
        .build()
        .map_err(|e| CompareError::ThreadPool(e.to_string()))?;

    Ok(pool.install(|| {
        pairs
            .par_iter()
            .map_init(
                || ContentComparer::new(options.buffer_size),
                |comparer, (l, r)| compare_pair(fs, left_root, right_root, l, r, comparer),
            )
            .collect()
    }))
}

/// Classify one path present under both roots.
fn compare_pair(
    fs: &dyn FileSystem,
    left_root: &Path,
    right_root: &Path,
    left: &FileEntry,
    right: &FileEntry,
    comparer: &mut ContentComparer,
) -> PathComparison {
    let path = left.path.clone();
    let mut delta = MetadataDelta::between(left, right);

    if !delta.kinds_match() {
        return PathComparison::new(path, Classification::Different).with_delta(delta);
    }
    if !left.is_file() {
        // Links and special files: presence on both sides is all that is checked.
        return PathComparison::new(path, Classification::Identical).with_delta(delta);
    }
    if delta.size != Ordering::Equal {
        return PathComparison::new(path, Classification::Different).with_delta(delta);
    }

    debug!(path = %path, "comparing content");
    let left_file = path.resolve(left_root);
    let right_file = path.resolve(right_root);
    let classification = match comparer.same_content(fs, &left_file, &right_file) {
        Ok(true) => {
            delta.content = ContentCheck::Same;
            if delta.mtime == Ordering::Equal {
                Classification::Identical
            } else {
                Classification::DifferentMetadataSameContent
            }
        }
        Ok(false) => {
            delta.content = ContentCheck::Differ;
            Classification::Different
        }
        Err(e) => {
            warn!(path = %path, error = %e, "content comparison failed");
            Classification::ReadError {
                message: e.to_string(),
            }
        }
    };
    debug!(path = %path, outcome = %classification, "classified");
    PathComparison::new(path, classification).with_delta(delta)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::{Duration, SystemTime};

    use proptest::prelude::*;
    use treecmp_fs::{InMemoryFileSystem, LocalFileSystem};

    use super::*;

    fn t(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn run(fs: &InMemoryFileSystem) -> ComparisonResult {
        compare(fs, Path::new("/left"), Path::new("/right"), &CompareOptions::default()).unwrap()
    }

    fn class(result: &ComparisonResult, path: &str) -> Classification {
        result
            .classification(&RelativePath::from(path))
            .cloned()
            .unwrap_or_else(|| panic!("{path} missing from result"))
    }

    /// Same file on both sides with the same mtime.
    fn mirror(fs: &InMemoryFileSystem, rel: &str, contents: &[u8]) {
        fs.add_file(format!("/left/{rel}"), contents, t(1000));
        fs.add_file(format!("/right/{rel}"), contents, t(1000));
    }

    #[test]
    fn tree_against_itself_is_identical() {
        let fs = InMemoryFileSystem::new();
        fs.add_file("/left/a.txt", b"alpha", t(1));
        fs.add_file("/left/sub/b.bin", &[0, 1, 2], t(2));
        fs.add_symlink("/left/link", "/left/a.txt");

        let result = compare(
            &fs,
            Path::new("/left"),
            Path::new("/left"),
            &CompareOptions::default(),
        )
        .unwrap();
        assert_eq!(result.len(), 3);
        assert!(result.is_identical());
    }

    #[test]
    fn same_size_different_bytes_is_different() {
        let fs = InMemoryFileSystem::new();
        mirror(&fs, "keep.txt", b"unchanged");
        fs.add_file("/left/data.bin", b"abcdef", t(1000));
        fs.add_file("/right/data.bin", b"abcxef", t(1000));

        let result = run(&fs);
        assert_eq!(class(&result, "data.bin"), Classification::Different);
        assert_eq!(class(&result, "keep.txt"), Classification::Identical);
        let delta = result.get(&"data.bin".into()).unwrap().delta.unwrap();
        assert_eq!(delta.content, ContentCheck::Differ);
    }

    #[test]
    fn size_difference_skips_content() {
        let fs = InMemoryFileSystem::new();
        fs.add_file("/left/grown.log", b"short", t(1000));
        fs.add_file("/right/grown.log", b"much longer", t(1000));

        let result = run(&fs);
        assert_eq!(class(&result, "grown.log"), Classification::Different);
        assert_eq!(fs.open_count(), 0, "content must not be read when sizes differ");
        let delta = result.get(&"grown.log".into()).unwrap().delta.unwrap();
        assert_eq!(delta.size, Ordering::Less);
        assert_eq!(delta.content, ContentCheck::Skipped);
    }

    #[test]
    fn mtime_only_difference_is_metadata_only() {
        let fs = InMemoryFileSystem::new();
        mirror(&fs, "photo.jpg", b"jpegdata");
        fs.set_mtime("/left/photo.jpg", t(2000));

        let result = run(&fs);
        assert_eq!(class(&result, "photo.jpg"), Classification::DifferentMetadataSameContent);
        let delta = result.get(&"photo.jpg".into()).unwrap().delta.unwrap();
        assert_eq!(delta.mtime, Ordering::Greater);
        assert_eq!(fs.open_count(), 2);
    }

    #[test]
    fn mtime_difference_with_different_content_is_different() {
        let fs = InMemoryFileSystem::new();
        fs.add_file("/left/f", b"aaaa", t(1));
        fs.add_file("/right/f", b"bbbb", t(2));
        assert_eq!(class(&run(&fs), "f"), Classification::Different);
    }

    #[test]
    fn one_sided_paths() {
        let fs = InMemoryFileSystem::new();
        fs.add_file("/left/gone.txt", b"x", t(1));
        fs.add_file("/right/new.txt", b"y", t(1));

        let result = run(&fs);
        assert_eq!(class(&result, "gone.txt"), Classification::OnlyInLeft);
        assert_eq!(class(&result, "new.txt"), Classification::OnlyInRight);
        assert!(result.get(&"gone.txt".into()).unwrap().delta.is_none());
    }

    #[test]
    fn abc_scenario() {
        let fs = InMemoryFileSystem::new();
        fs.add_file("/left/a.txt", b"0123456789", t(5));
        fs.add_file("/left/b.txt", b"bbbbb", t(5));
        fs.add_file("/right/a.txt", b"0123456789", t(5));
        fs.add_file("/right/c.txt", b"ccccc", t(5));

        let result = run(&fs);
        assert_eq!(result.len(), 3);
        assert_eq!(class(&result, "a.txt"), Classification::Identical);
        assert_eq!(class(&result, "b.txt"), Classification::OnlyInLeft);
        assert_eq!(class(&result, "c.txt"), Classification::OnlyInRight);
        assert!(!result.is_identical());
    }

    #[test]
    fn unreadable_file_on_right_is_read_error() {
        let fs = InMemoryFileSystem::new();
        mirror(&fs, "fine.txt", b"fine");
        mirror(&fs, "secret.txt", b"secret");
        fs.add_file("/left/extra.txt", b"e", t(1));
        fs.deny("/right/secret.txt");

        let result = run(&fs);
        assert!(matches!(class(&result, "secret.txt"), Classification::ReadError { .. }));
        assert_eq!(class(&result, "fine.txt"), Classification::Identical);
        assert_eq!(class(&result, "extra.txt"), Classification::OnlyInLeft);
        assert!(result.has_errors());
        assert!(!result.is_identical());
    }

    #[test]
    fn failing_read_mid_comparison_is_read_error() {
        let fs = InMemoryFileSystem::new();
        mirror(&fs, "disk.img", b"sectors");
        fs.fail_reads("/left/disk.img");
        let result = run(&fs);
        match class(&result, "disk.img") {
            Classification::ReadError { message } => assert!(message.contains("/left/disk.img")),
            other => panic!("expected ReadError, got {other:?}"),
        }
    }

    #[test]
    fn unreadable_subtree_is_one_read_error() {
        let fs = InMemoryFileSystem::new();
        mirror(&fs, "docs/readme", b"r");
        fs.add_file("/left/private/a", b"a", t(1));
        fs.add_file("/left/private/deeper/b", b"b", t(1));
        fs.add_file("/right/private/a", b"a", t(1));
        fs.add_file("/right/private/only-right", b"o", t(1));
        fs.deny("/left/private");

        let result = run(&fs);
        assert!(matches!(class(&result, "private"), Classification::ReadError { .. }));
        assert!(result.get(&"private/a".into()).is_none());
        assert!(result.get(&"private/only-right".into()).is_none());
        assert_eq!(class(&result, "docs/readme"), Classification::Identical);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn nested_unreadable_folds_into_outermost() {
        let fs = InMemoryFileSystem::new();
        fs.add_file("/left/x/y/f", b"1", t(1));
        fs.add_file("/right/x/y/f", b"1", t(1));
        fs.deny("/left/x");
        fs.deny("/right/x/y");

        let result = run(&fs);
        assert_eq!(result.len(), 1);
        assert!(matches!(class(&result, "x"), Classification::ReadError { .. }));
    }

    #[test]
    fn symlinks_and_kind_mismatch() {
        let fs = InMemoryFileSystem::new();
        fs.add_symlink("/left/current", "/left/v1");
        fs.add_symlink("/right/current", "/right/v2");
        fs.add_file("/left/swap", b"file", t(1));
        fs.add_symlink("/right/swap", "/elsewhere");
        fs.add_special("/left/fifo");
        fs.add_special("/right/fifo");

        let result = run(&fs);
        assert_eq!(class(&result, "current"), Classification::Identical);
        assert_eq!(class(&result, "fifo"), Classification::Identical);
        assert_eq!(class(&result, "swap"), Classification::Different);
        let delta = result.get(&"swap".into()).unwrap().delta.unwrap();
        assert!(!delta.kinds_match());
        assert_eq!(fs.open_count(), 0);
    }

    #[test]
    fn file_versus_directory_is_two_one_sided_paths() {
        let fs = InMemoryFileSystem::new();
        fs.add_file("/left/node", b"file", t(1));
        fs.add_file("/right/node/child", b"c", t(1));

        let result = run(&fs);
        assert_eq!(class(&result, "node"), Classification::OnlyInLeft);
        assert_eq!(class(&result, "node/child"), Classification::OnlyInRight);
    }

    #[test]
    fn empty_directories_are_ignored() {
        let fs = InMemoryFileSystem::new();
        fs.add_dir("/left/empty");
        fs.add_dir("/right");
        let result = run(&fs);
        assert!(result.is_empty());
        assert!(result.is_identical());
    }

    #[test]
    fn bad_roots_abort() {
        let fs = InMemoryFileSystem::new();
        fs.add_dir("/left");
        let err = run_err(&fs, "/left", "/missing");
        assert!(matches!(err, CompareError::RootNotFound(_)));

        fs.add_file("/file", b"", t(1));
        let err = run_err(&fs, "/file", "/left");
        assert!(matches!(err, CompareError::RootNotDirectory(_)));
    }

    #[test]
    fn symlinked_root_compares_like_its_target() {
        let fs = InMemoryFileSystem::new();
        fs.add_file("/snapshots/monday/a.txt", b"a", t(7));
        fs.add_file("/snapshots/monday/sub/b.txt", b"b", t(7));
        fs.add_symlink("/left", "/snapshots/monday");
        fs.add_file("/right/a.txt", b"a", t(7));
        fs.add_file("/right/sub/b.txt", b"b", t(7));

        let result = run(&fs);
        assert_eq!(result.len(), 2);
        assert!(result.is_identical(), "{result:?}");
        let opened = fs.opened_paths();
        assert!(opened.contains(&PathBuf::from("/left/sub/b.txt")), "{opened:?}");
    }

    #[test]
    fn both_roots_checked_before_scanning() {
        let fs = InMemoryFileSystem::new();
        for i in 0..10 {
            fs.add_file(format!("/left/dir{i}/f"), b"x", t(1));
        }
        let err = run_err(&fs, "/left", "/mistyped");
        assert!(matches!(err, CompareError::RootNotFound(p) if p == Path::new("/mistyped")));
        assert_eq!(fs.list_count(), 1, "only the left root check may list");
    }

    fn run_err(fs: &InMemoryFileSystem, left: &str, right: &str) -> CompareError {
        compare(fs, Path::new(left), Path::new(right), &CompareOptions::default()).unwrap_err()
    }

    #[test]
    fn invalid_options_abort() {
        let fs = InMemoryFileSystem::new();
        fs.add_dir("/left");
        fs.add_dir("/right");
        let opts = CompareOptions::default().with_buffer_size(0);
        assert!(matches!(
            compare(&fs, Path::new("/left"), Path::new("/right"), &opts),
            Err(CompareError::InvalidOptions(_))
        ));
    }

    #[test]
    fn parallel_matches_sequential() {
        let fs = InMemoryFileSystem::new();
        for i in 0..50u32 {
            let body = format!("file number {i}");
            fs.add_file(format!("/left/d{}/f{i}", i % 7), body.as_bytes(), t(10));
            let right_body = if i % 5 == 0 { body.replace("number", "NUMBER") } else { body };
            fs.add_file(
                format!("/right/d{}/f{i}", i % 7),
                right_body.as_bytes(),
                t(10 + (i % 3) as u64),
            );
        }

        let seq = run(&fs);
        let par = compare(
            &fs,
            Path::new("/left"),
            Path::new("/right"),
            &CompareOptions::default().with_workers(4).with_buffer_size(3),
        )
        .unwrap();
        assert_eq!(seq, par);
        assert_eq!(seq.len(), 50);
    }

    #[test]
    fn local_trees_with_preserved_mtimes() {
        let left = tempfile::tempdir().unwrap();
        let right = tempfile::tempdir().unwrap();
        let stamp = t(1_600_000_000);
        for root in [left.path(), right.path()] {
            std::fs::create_dir_all(root.join("nested")).unwrap();
            for (rel, body) in [("one.txt", "same"), ("nested/two.txt", "also same")] {
                let p = root.join(rel);
                std::fs::write(&p, body).unwrap();
                std::fs::File::options().write(true).open(&p).unwrap().set_modified(stamp).unwrap();
            }
        }

        let result = compare_local(left.path(), right.path());
        assert_eq!(result.len(), 2);
        assert!(result.is_identical(), "{result:?}");

        let touched = right.path().join("one.txt");
        std::fs::File::options()
            .write(true)
            .open(&touched)
            .unwrap()
            .set_modified(t(1_700_000_000))
            .unwrap();
        let result = compare_local(left.path(), right.path());
        assert_eq!(class(&result, "one.txt"), Classification::DifferentMetadataSameContent);
        assert_eq!(class(&result, "nested/two.txt"), Classification::Identical);
    }

    fn compare_local(left: &Path, right: &Path) -> ComparisonResult {
        compare(&LocalFileSystem, left, right, &CompareOptions::default()).unwrap()
    }

    fn tree_strategy() -> impl Strategy<Value = BTreeMap<String, (Vec<u8>, u64)>> {
        prop::collection::btree_map(
            "[a-c]{1,2}(/[a-c]{1,2}){0,2}",
            (prop::collection::vec(0u8..3, 0..6), 0u64..3),
            0..12,
        )
    }

    /// Drop keys that are a strict path-prefix of another key, since a
    /// path cannot be both a file and a directory in one tree.
    fn populate(
        fs: &InMemoryFileSystem,
        root: &str,
        tree: &BTreeMap<String, (Vec<u8>, u64)>,
    ) -> Vec<String> {
        let mut added = Vec::new();
        for (rel, (body, secs)) in tree {
            let is_dir_elsewhere = tree.keys().any(|k| k.starts_with(&format!("{rel}/")));
            let under_file = added.iter().any(|a: &String| rel.starts_with(&format!("{a}/")));
            if is_dir_elsewhere || under_file {
                continue;
            }
            fs.add_file(format!("{root}/{rel}"), body, t(*secs));
            added.push(rel.clone());
        }
        added
    }

    proptest! {
        #[test]
        fn every_path_classified_exactly_once(left in tree_strategy(), right in tree_strategy()) {
            let fs = InMemoryFileSystem::new();
            fs.add_dir("/left");
            fs.add_dir("/right");
            let l = populate(&fs, "/left", &left);
            let r = populate(&fs, "/right", &right);

            let result = run(&fs);
            let mut expected: Vec<String> = l.into_iter().chain(r).collect();
            expected.sort();
            expected.dedup();
            let mut got: Vec<String> = result.iter().map(|c| c.path.to_string()).collect();
            got.sort();
            prop_assert_eq!(got, expected);

            let parallel = compare(
                &fs,
                Path::new("/left"),
                Path::new("/right"),
                &CompareOptions::default().with_workers(3).with_buffer_size(2),
            ).unwrap();
            prop_assert_eq!(&parallel, &result);
        }

        #[test]
        fn self_comparison_is_identical(tree in tree_strategy()) {
            let fs = InMemoryFileSystem::new();
            fs.add_dir("/left");
            populate(&fs, "/left", &tree);
            let result = compare(
            &fs,
            Path::new("/left"),
            Path::new("/left"),
            &CompareOptions::default(),
        )
        .unwrap();
            prop_assert!(result.is_identical());
        }
    }
}

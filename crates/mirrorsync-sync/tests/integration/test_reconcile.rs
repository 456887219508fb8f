//! Integration tests for TreeReconciler
//!
//! Verifies against real directory trees:
//! - Copy, delete, create and subtree removal decisions
//! - Pre-order ordering of reported actions
//! - The up-to-date skip (same name, replica not older, equal bytes)
//! - Idempotence and completeness
//! - Symbolic links in either tree are never followed or mirrored
//! - Error propagation

use std::sync::Arc;

use mirrorsync_core::domain::action::ActionKind;
use mirrorsync_core::ports::{IActionReporter, ILocalFileSystem};
use mirrorsync_sync::{LocalFileSystemAdapter, TreeReconciler};

use crate::common::{
    assert_trees_match, hours_ago, make_dir, relative_paths, set_mtime, write_file,
    FaultyFileSystem, RecordingReporter, Sandbox,
};

fn reconciler_with(
    filesystem: Arc<dyn ILocalFileSystem>,
) -> (TreeReconciler, Arc<RecordingReporter>) {
    let reporter = RecordingReporter::new();
    let reconciler = TreeReconciler::new(filesystem, reporter.clone() as Arc<dyn IActionReporter>);
    (reconciler, reporter)
}

fn reconciler() -> (TreeReconciler, Arc<RecordingReporter>) {
    reconciler_with(Arc::new(LocalFileSystemAdapter::new()))
}

#[tokio::test]
async fn test_fresh_replica_receives_files_and_directories_in_order() {
    let sandbox = Sandbox::new();
    write_file(&sandbox.source, "a.txt", b"X");
    write_file(&sandbox.source, "sub/b.txt", b"B");
    let (reconciler, reporter) = reconciler();

    let summary = reconciler
        .reconcile(&sandbox.source, &sandbox.replica)
        .await
        .unwrap();

    assert_eq!(std::fs::read(sandbox.replica.join("a.txt")).unwrap(), b"X");
    assert_eq!(std::fs::read(sandbox.replica.join("sub/b.txt")).unwrap(), b"B");
    assert_eq!(summary.files_copied, 2);
    assert_eq!(summary.dirs_created, 1);

    assert_eq!(
        reporter.messages().await,
        vec![
            format!(
                "Copied: {} -> {}",
                sandbox.source.join("a.txt").display(),
                sandbox.replica.join("a.txt").display()
            ),
            format!("Created directory: {}", sandbox.replica.join("sub").display()),
            format!(
                "Copied: {} -> {}",
                sandbox.source.join("sub").join("b.txt").display(),
                sandbox.replica.join("sub").join("b.txt").display()
            ),
        ]
    );
}

#[tokio::test]
async fn test_current_replica_file_is_skipped_and_extra_file_deleted() {
    let sandbox = Sandbox::new();
    let source_a = write_file(&sandbox.source, "a.txt", b"identical");
    set_mtime(&source_a, hours_ago(2));
    write_file(&sandbox.replica, "a.txt", b"identical");
    write_file(&sandbox.replica, "c.txt", b"stale");
    let (reconciler, reporter) = reconciler();

    let summary = reconciler
        .reconcile(&sandbox.source, &sandbox.replica)
        .await
        .unwrap();

    assert_eq!(summary.files_copied, 0);
    assert_eq!(summary.files_unchanged, 1);
    assert_eq!(summary.files_deleted, 1);
    assert_eq!(
        reporter.messages().await,
        vec![format!("Deleted: {}", sandbox.replica.join("c.txt").display())]
    );
    assert!(!sandbox.replica.join("c.txt").exists());
}

#[tokio::test]
async fn test_older_replica_file_is_copied_even_if_equal() {
    let sandbox = Sandbox::new();
    write_file(&sandbox.source, "a.txt", b"same");
    let replica_a = write_file(&sandbox.replica, "a.txt", b"same");
    set_mtime(&replica_a, hours_ago(5));
    let (reconciler, reporter) = reconciler();

    let summary = reconciler
        .reconcile(&sandbox.source, &sandbox.replica)
        .await
        .unwrap();

    assert_eq!(summary.files_copied, 1);
    assert_eq!(reporter.kinds().await, vec![ActionKind::FileCopied]);
}

#[tokio::test]
async fn test_same_size_different_content_is_copied() {
    let sandbox = Sandbox::new();
    let source_a = write_file(&sandbox.source, "a.txt", b"AAAA");
    set_mtime(&source_a, hours_ago(3));
    write_file(&sandbox.replica, "a.txt", b"BBBB");
    let (reconciler, _reporter) = reconciler();

    let summary = reconciler
        .reconcile(&sandbox.source, &sandbox.replica)
        .await
        .unwrap();

    assert_eq!(summary.files_copied, 1);
    assert_eq!(std::fs::read(sandbox.replica.join("a.txt")).unwrap(), b"AAAA");
}

#[tokio::test]
async fn test_copied_file_keeps_source_mtime() {
    let sandbox = Sandbox::new();
    let source_a = write_file(&sandbox.source, "a.txt", b"content");
    set_mtime(&source_a, hours_ago(10));
    let (reconciler, _reporter) = reconciler();

    reconciler
        .reconcile(&sandbox.source, &sandbox.replica)
        .await
        .unwrap();

    let source_mtime = std::fs::metadata(&source_a).unwrap().modified().unwrap();
    let replica_mtime = std::fs::metadata(sandbox.replica.join("a.txt"))
        .unwrap()
        .modified()
        .unwrap();
    assert_eq!(source_mtime, replica_mtime);
}

#[tokio::test]
async fn test_second_pass_reports_nothing() {
    let sandbox = Sandbox::new();
    write_file(&sandbox.source, "top.txt", b"top");
    write_file(&sandbox.source, "one/two/three.txt", b"deep");
    make_dir(&sandbox.source, "empty");
    write_file(&sandbox.replica, "junk.bin", b"junk");
    let (reconciler, reporter) = reconciler();

    reconciler
        .reconcile(&sandbox.source, &sandbox.replica)
        .await
        .unwrap();
    reporter.clear().await;

    let summary = reconciler
        .reconcile(&sandbox.source, &sandbox.replica)
        .await
        .unwrap();

    assert!(summary.is_noop(), "{summary:?}");
    assert!(reporter.records().await.is_empty());
}

#[tokio::test]
async fn test_replica_matches_source_after_reconcile() {
    let sandbox = Sandbox::new();
    write_file(&sandbox.source, "a.txt", b"alpha");
    write_file(&sandbox.source, "docs/readme.md", b"# readme");
    write_file(&sandbox.source, "docs/img/logo.png", &[0u8, 1, 2, 3, 255]);
    make_dir(&sandbox.source, "docs/empty");
    write_file(&sandbox.replica, "a.txt", b"an older alpha");
    write_file(&sandbox.replica, "docs/old.md", b"old");
    write_file(&sandbox.replica, "trash/deep/file", b"trash");
    let (reconciler, _reporter) = reconciler();

    reconciler
        .reconcile(&sandbox.source, &sandbox.replica)
        .await
        .unwrap();

    assert_trees_match(&sandbox.source, &sandbox.replica);
}

#[tokio::test]
async fn test_replica_only_subtree_is_removed_with_one_report() {
    let sandbox = Sandbox::new();
    write_file(&sandbox.replica, "old/a/b/c.txt", b"c");
    write_file(&sandbox.replica, "old/d.txt", b"d");
    let (reconciler, reporter) = reconciler();

    let summary = reconciler
        .reconcile(&sandbox.source, &sandbox.replica)
        .await
        .unwrap();

    assert_eq!(summary.dirs_deleted, 1);
    assert_eq!(summary.files_deleted, 0);
    assert_eq!(
        reporter.messages().await,
        vec![format!("Deleted directory: {}", sandbox.replica.join("old").display())]
    );
    assert!(relative_paths(&sandbox.replica).is_empty());
}

#[tokio::test]
async fn test_directories_are_recursed_before_replica_only_ones_are_deleted() {
    let sandbox = Sandbox::new();
    write_file(&sandbox.source, "x/f.txt", b"f");
    make_dir(&sandbox.replica, "y");
    let (reconciler, reporter) = reconciler();

    reconciler
        .reconcile(&sandbox.source, &sandbox.replica)
        .await
        .unwrap();

    assert_eq!(
        reporter.kinds().await,
        vec![
            ActionKind::DirectoryCreated,
            ActionKind::FileCopied,
            ActionKind::DirectoryDeleted
        ]
    );
}

#[tokio::test]
async fn test_existing_directory_is_reconciled_without_creation_report() {
    let sandbox = Sandbox::new();
    write_file(&sandbox.source, "shared/new.txt", b"new");
    write_file(&sandbox.replica, "shared/gone.txt", b"gone");
    let (reconciler, reporter) = reconciler();

    reconciler
        .reconcile(&sandbox.source, &sandbox.replica)
        .await
        .unwrap();

    assert_eq!(
        reporter.kinds().await,
        vec![ActionKind::FileCopied, ActionKind::FileDeleted]
    );
    assert_trees_match(&sandbox.source, &sandbox.replica);
}

#[tokio::test]
async fn test_kind_mismatches_are_resolved() {
    let sandbox = Sandbox::new();
    write_file(&sandbox.source, "was_file/inner.txt", b"inner");
    write_file(&sandbox.replica, "was_file", b"file");
    write_file(&sandbox.source, "was_dir", b"now a file");
    write_file(&sandbox.replica, "was_dir/inner.txt", b"inner");
    let (reconciler, _reporter) = reconciler();

    reconciler
        .reconcile(&sandbox.source, &sandbox.replica)
        .await
        .unwrap();

    assert_trees_match(&sandbox.source, &sandbox.replica);
}

#[tokio::test]
async fn test_unreadable_file_aborts_the_pass() {
    let sandbox = Sandbox::new();
    write_file(&sandbox.source, "bad.txt", b"secret");
    let (reconciler, reporter) = reconciler_with(FaultyFileSystem::poisoning("bad.txt"));

    let err = reconciler
        .reconcile(&sandbox.source, &sandbox.replica)
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("bad.txt"));
    assert!(!sandbox.replica.join("bad.txt").exists());
    assert!(reporter.records().await.is_empty());
}

#[tokio::test]
async fn test_poisoned_file_fails_during_equality_check() {
    let sandbox = Sandbox::new();
    let source_bad = write_file(&sandbox.source, "bad.txt", b"data");
    set_mtime(&source_bad, hours_ago(1));
    write_file(&sandbox.replica, "bad.txt", b"data");
    let (reconciler, _reporter) = reconciler_with(FaultyFileSystem::poisoning("bad.txt"));

    let result = reconciler
        .reconcile(&sandbox.source, &sandbox.replica)
        .await;

    assert!(result.is_err());
}

#[cfg(unix)]
#[tokio::test]
async fn test_replica_symlink_is_replaced_without_touching_its_target() {
    let sandbox = Sandbox::new();
    let outside = write_file(sandbox.source.parent().unwrap(), "outside.txt", b"keep me");
    write_file(&sandbox.source, "a.txt", b"source content");
    let link = sandbox.replica.join("a.txt");
    std::os::unix::fs::symlink("../outside.txt", &link).unwrap();
    let (reconciler, reporter) = reconciler();

    let summary = reconciler
        .reconcile(&sandbox.source, &sandbox.replica)
        .await
        .unwrap();

    assert_eq!(std::fs::read(&outside).unwrap(), b"keep me");
    assert!(std::fs::symlink_metadata(&link).unwrap().file_type().is_file());
    assert_eq!(std::fs::read(&link).unwrap(), b"source content");
    assert_eq!(summary.files_deleted, 1);
    assert_eq!(summary.files_copied, 1);
    assert_eq!(
        reporter.messages().await,
        vec![
            format!("Deleted: {}", link.display()),
            format!(
                "Copied: {} -> {}",
                sandbox.source.join("a.txt").display(),
                link.display()
            ),
        ]
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_replica_only_symlinks_are_deleted_and_reported() {
    let sandbox = Sandbox::new();
    let outside = write_file(sandbox.source.parent().unwrap(), "outside.txt", b"keep me");
    let extra = sandbox.replica.join("extra");
    let dangling = sandbox.replica.join("nested/dangling");
    make_dir(&sandbox.source, "nested");
    make_dir(&sandbox.replica, "nested");
    std::os::unix::fs::symlink(&outside, &extra).unwrap();
    std::os::unix::fs::symlink("/no/such/target", &dangling).unwrap();
    let (reconciler, reporter) = reconciler();

    let summary = reconciler
        .reconcile(&sandbox.source, &sandbox.replica)
        .await
        .unwrap();

    assert!(std::fs::symlink_metadata(&extra).is_err());
    assert!(std::fs::symlink_metadata(&dangling).is_err());
    assert!(outside.exists());
    assert_eq!(summary.files_deleted, 2);
    assert_eq!(
        reporter.messages().await,
        vec![
            format!("Deleted: {}", extra.display()),
            format!("Deleted: {}", dangling.display()),
        ]
    );
    assert_trees_match(&sandbox.source, &sandbox.replica);
}

#[cfg(unix)]
#[tokio::test]
async fn test_replica_symlink_in_place_of_source_directory_is_replaced() {
    let sandbox = Sandbox::new();
    let outside = make_dir(sandbox.source.parent().unwrap(), "outside");
    write_file(&sandbox.source, "sub/b.txt", b"B");
    std::os::unix::fs::symlink(&outside, sandbox.replica.join("sub")).unwrap();
    let (reconciler, reporter) = reconciler();

    reconciler
        .reconcile(&sandbox.source, &sandbox.replica)
        .await
        .unwrap();

    assert!(!outside.join("b.txt").exists());
    assert!(std::fs::symlink_metadata(sandbox.replica.join("sub"))
        .unwrap()
        .file_type()
        .is_dir());
    assert_eq!(
        reporter.kinds().await,
        vec![
            ActionKind::FileDeleted,
            ActionKind::DirectoryCreated,
            ActionKind::FileCopied
        ]
    );
    assert_trees_match(&sandbox.source, &sandbox.replica);
}

#[cfg(unix)]
#[tokio::test]
async fn test_source_symlinks_are_not_mirrored() {
    let sandbox = Sandbox::new();
    let outside = write_file(sandbox.source.parent().unwrap(), "outside.txt", b"elsewhere");
    write_file(&sandbox.source, "real.txt", b"real");
    std::os::unix::fs::symlink(&outside, sandbox.source.join("link.txt")).unwrap();
    std::os::unix::fs::symlink(sandbox.source.parent().unwrap(), sandbox.source.join("loop"))
        .unwrap();
    let (reconciler, reporter) = reconciler();

    let summary = reconciler
        .reconcile(&sandbox.source, &sandbox.replica)
        .await
        .unwrap();

    assert_eq!(summary.files_copied, 1);
    assert_eq!(summary.dirs_created, 0);
    assert_eq!(reporter.kinds().await, vec![ActionKind::FileCopied]);
    assert_eq!(
        relative_paths(&sandbox.replica),
        std::collections::BTreeSet::from(["real.txt".to_string()])
    );
}

//! Deferred replacement, verified by the filesystem state after the
//! pending operations have run ("after boot").

use crate::tests::CapturedLog;
use crate::{
    CoreError, DeferredOperation, DeferredReplace, MarkerFileReplacer, PendingMarker,
    ServiceLogger, pending_marker_path, replacer_for,
};

use std::fs;
use std::path::{Path, PathBuf};

use log::{Level, LevelFilter};
use su_config::ReplacerKind;
use tempfile::TempDir;

use googletest::prelude::*;

fn install(dir: &TempDir) -> (PathBuf, PathBuf) {
    let original = dir.path().join("su-service");
    let staged = dir.path().join("su-service_new");
    fs::write(&original, b"old binary").unwrap();
    (original, staged)
}

fn kinds(path: &Path) -> Vec<DeferredOperation> {
    PendingMarker::load(&pending_marker_path(path))
        .unwrap()
        .entries
        .into_iter()
        .map(|entry| entry.operation)
        .collect()
}

#[test]
fn given_scheduled_replacement_when_pending_applied_then_only_new_binary_remains() {
    let dir = TempDir::new().unwrap();
    let (original, staged) = install(&dir);
    fs::write(&staged, b"new binary").unwrap();
    let replacer = MarkerFileReplacer::new(ServiceLogger::discard());

    replacer.schedule(&original, &staged).unwrap();

    // Nothing moves before the restart
    assert_that!(fs::read(&original).unwrap(), eq(b"old binary"));
    assert_that!(staged.exists(), eq(true));

    let report = replacer.apply_pending(&original).unwrap();

    assert_that!(fs::read(&original).unwrap(), eq(b"new binary"));
    assert_that!(staged.exists(), eq(false));
    assert_that!(pending_marker_path(&original).exists(), eq(false));
    assert_that!(report.replaced, eq(true));
    assert_that!(report.applied, eq(2));
    assert_that!(report.failed, eq(0));
}

#[test]
fn given_scheduled_replacement_when_marker_read_then_chain_in_registration_order() {
    let dir = TempDir::new().unwrap();
    let (original, staged) = install(&dir);
    let replacer = MarkerFileReplacer::new(ServiceLogger::discard());

    replacer.schedule(&original, &staged).unwrap();

    let expected = DeferredOperation::replacement_chain(&original, &staged).to_vec();
    assert_that!(kinds(&original), eq(&expected));
}

#[test]
fn given_same_pair_scheduled_twice_when_applied_then_latest_upload_installed() {
    let dir = TempDir::new().unwrap();
    let (original, staged) = install(&dir);
    let replacer = MarkerFileReplacer::new(ServiceLogger::discard());

    fs::write(&staged, b"first upload").unwrap();
    replacer.schedule(&original, &staged).unwrap();
    fs::write(&staged, b"second upload").unwrap();
    replacer.schedule(&original, &staged).unwrap();

    assert_that!(kinds(&original).len(), eq(2));

    let report = replacer.apply_pending(&original).unwrap();

    assert_that!(fs::read(&original).unwrap(), eq(b"second upload"));
    assert_that!(staged.exists(), eq(false));
    assert_that!(report.failed, eq(0));
}

/// Runs every operation in order and keeps going on failure, the way the
/// boot-time move list is processed.
fn run_boot_list(operations: &[DeferredOperation]) -> usize {
    operations
        .iter()
        .filter(|operation| operation.apply().is_err())
        .count()
}

#[test]
fn given_chain_registered_twice_when_boot_list_runs_then_new_binary_at_original() {
    let dir = TempDir::new().unwrap();
    let (original, staged) = install(&dir);
    fs::write(&staged, b"new binary").unwrap();

    // An upload, a service restart without reboot, and a second upload
    // of the same pair leave two copies of the chain in the boot list
    let chain = DeferredOperation::replacement_chain(&original, &staged);
    let boot_list: Vec<DeferredOperation> = chain.iter().chain(chain.iter()).cloned().collect();

    let failed = run_boot_list(&boot_list);

    assert_that!(fs::read(&original).unwrap(), eq(b"new binary"));
    assert_that!(staged.exists(), eq(false));
    // Only the repeated move has nothing left to move
    assert_that!(failed, eq(1));
}

#[test]
fn given_chains_for_two_staged_names_when_boot_list_runs_then_latest_upload_installed() {
    let dir = TempDir::new().unwrap();
    let (original, _) = install(&dir);
    let first = dir.path().join("first_new");
    let second = dir.path().join("second_new");
    fs::write(&first, b"first upload").unwrap();
    fs::write(&second, b"second upload").unwrap();

    let boot_list: Vec<DeferredOperation> = DeferredOperation::replacement_chain(&original, &first)
        .into_iter()
        .chain(DeferredOperation::replacement_chain(&original, &second))
        .collect();

    let failed = run_boot_list(&boot_list);

    assert_that!(fs::read(&original).unwrap(), eq(b"second upload"));
    assert_that!(first.exists(), eq(false));
    assert_that!(second.exists(), eq(false));
    assert_that!(failed, eq(0));
}

#[test]
fn given_marker_holding_chain_twice_when_applied_then_new_binary_kept() {
    let dir = TempDir::new().unwrap();
    let (original, staged) = install(&dir);
    fs::write(&staged, b"new binary").unwrap();

    let mut marker = PendingMarker::default();
    for _ in 0..2 {
        for operation in DeferredOperation::replacement_chain(&original, &staged) {
            marker.push(operation);
        }
    }
    marker.save(&pending_marker_path(&original)).unwrap();

    let report = MarkerFileReplacer::new(ServiceLogger::discard())
        .apply_pending(&original)
        .unwrap();

    assert_that!(fs::read(&original).unwrap(), eq(b"new binary"));
    assert_that!(staged.exists(), eq(false));
    assert_that!(report.replaced, eq(true));
    assert_that!(report.failed, eq(1));
}

#[test]
fn given_earlier_upload_under_other_name_when_applied_then_stale_file_cleaned_up() {
    let dir = TempDir::new().unwrap();
    let (original, staged) = install(&dir);
    let stale = dir.path().join("older-build_new");
    let replacer = MarkerFileReplacer::new(ServiceLogger::discard());

    fs::write(&stale, b"older").unwrap();
    replacer.schedule(&original, &stale).unwrap();
    fs::write(&staged, b"newer").unwrap();
    replacer.schedule(&original, &staged).unwrap();

    replacer.apply_pending(&original).unwrap();

    assert_that!(fs::read(&original).unwrap(), eq(b"newer"));
    assert_that!(stale.exists(), eq(false));
    assert_that!(staged.exists(), eq(false));
}

#[test]
fn given_staged_file_lost_when_applied_then_current_binary_kept() {
    let dir = TempDir::new().unwrap();
    let (original, staged) = install(&dir);
    let (log, captured) = CapturedLog::logger(LevelFilter::Info);
    let replacer = MarkerFileReplacer::new(log);

    fs::write(&staged, b"new binary").unwrap();
    replacer.schedule(&original, &staged).unwrap();
    fs::remove_file(&staged).unwrap();

    let report = replacer.apply_pending(&original).unwrap();

    assert_that!(fs::read(&original).unwrap(), eq(b"old binary"));
    assert_that!(report.replaced, eq(false));
    assert_that!(report.applied, eq(1));
    assert_that!(report.failed, eq(1));
    assert_that!(captured.count(Level::Error), eq(1));
}

#[test]
fn given_no_marker_when_applied_then_nothing_happens() {
    let dir = TempDir::new().unwrap();
    let (original, _) = install(&dir);
    let replacer = MarkerFileReplacer::new(ServiceLogger::discard());

    let report = replacer.apply_pending(&original).unwrap();

    assert_that!(report.applied, eq(0));
    assert_that!(report.replaced, eq(false));
    assert_that!(fs::read(&original).unwrap(), eq(b"old binary"));
}

#[test]
fn given_malformed_marker_when_applied_then_error_and_marker_removed() {
    let dir = TempDir::new().unwrap();
    let (original, _) = install(&dir);
    let marker = pending_marker_path(&original);
    fs::write(&marker, "not json").unwrap();
    let replacer = MarkerFileReplacer::new(ServiceLogger::discard());

    let result = replacer.apply_pending(&original);

    assert!(matches!(result, Err(CoreError::Marker { .. })));
    assert_that!(marker.exists(), eq(false));
    assert_that!(fs::read(&original).unwrap(), eq(b"old binary"));
}

#[test]
fn given_unwritable_marker_location_when_scheduled_then_every_step_logged_and_reported() {
    let dir = TempDir::new().unwrap();
    let original = dir.path().join("missing-dir").join("su-service");
    let staged = dir.path().join("missing-dir").join("su-service_new");
    let (log, captured) = CapturedLog::logger(LevelFilter::Info);
    let replacer = MarkerFileReplacer::new(log);

    let result = replacer.schedule(&original, &staged);

    match result {
        Err(CoreError::DeferredSchedule { failed, total, .. }) => {
            assert_that!(failed, eq(2));
            assert_that!(total, eq(2));
        }
        other => panic!("expected DeferredSchedule error, got {other:?}"),
    }
    assert_that!(captured.count(Level::Error), eq(2));
}

#[test]
fn given_missing_path_when_delete_applied_then_success() {
    let dir = TempDir::new().unwrap();
    let operation = DeferredOperation::Delete {
        path: dir.path().join("gone"),
    };

    assert_that!(operation.apply().is_ok(), eq(true));
}

#[test]
fn given_operations_when_displayed_then_readable() {
    let delete = DeferredOperation::Delete {
        path: PathBuf::from("a"),
    };
    let rename = DeferredOperation::Rename {
        from: PathBuf::from("a_new"),
        to: PathBuf::from("a"),
    };

    assert_that!(delete.to_string(), eq("delete a"));
    assert_that!(rename.to_string(), eq("rename a_new -> a"));
}

#[test]
fn given_original_path_when_marker_path_built_then_suffix_appended() {
    let marker = pending_marker_path(Path::new("/opt/su/su-service"));

    assert_that!(marker, eq(&PathBuf::from("/opt/su/su-service.pending")));
}

#[test]
fn given_marker_kind_when_replacer_built_then_marker_backend() {
    let replacer = replacer_for(ReplacerKind::Marker, ServiceLogger::discard()).unwrap();

    assert_that!(replacer.name(), eq("marker"));
}

#[cfg(not(windows))]
#[test]
fn given_native_kind_off_windows_when_replacer_built_then_unsupported() {
    let result = replacer_for(ReplacerKind::Native, ServiceLogger::discard());

    assert!(matches!(result, Err(CoreError::Unsupported { .. })));
}

#[cfg(not(windows))]
#[test]
fn given_auto_kind_off_windows_when_replacer_built_then_marker_backend() {
    let replacer = replacer_for(ReplacerKind::Auto, ServiceLogger::discard()).unwrap();

    assert_that!(replacer.name(), eq("marker"));
}

#[cfg(windows)]
#[test]
fn given_auto_kind_on_windows_when_replacer_built_then_boot_move_backend() {
    let replacer = replacer_for(ReplacerKind::Auto, ServiceLogger::discard()).unwrap();

    assert_that!(replacer.name(), eq("boot-move"));
}

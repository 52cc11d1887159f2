use chrono::NaiveDate;
use daily_folder::{run_maintenance_pass, today_name, ExemptionList, FileExemptions};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
}

fn empty_folder(root: &Path, name: &str) -> PathBuf {
    let folder = root.join(name);
    fs::create_dir_all(&folder).unwrap();
    folder
}

fn filled_folder(root: &Path, name: &str) -> PathBuf {
    let folder = empty_folder(root, name);
    fs::write(folder.join("file.txt"), "unit-test").unwrap();
    folder
}

fn exemptions(fragments: &[&str]) -> ExemptionList {
    fragments.iter().map(|f| f.to_string()).collect()
}

#[test]
fn test_prunes_empty_and_keeps_filled() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    let first = empty_folder(root, "2024-01-01");
    let second = empty_folder(root, "2024-01-02");
    let third = filled_folder(root, "2024-01-03");
    fs::write(root.join("notes.txt"), "keep me").unwrap();

    let result = run_maintenance_pass(root, &ExemptionList::default(), today());

    assert!(!first.exists());
    assert!(!second.exists());
    assert!(third.exists());
    assert_eq!(result.pruned, BTreeSet::from([first, second]));
    assert_eq!(result.needs_review, BTreeSet::from([third]));
    assert_eq!(fs::read_to_string(root.join("notes.txt")).unwrap(), "keep me");

    assert!(result.created_today);
    assert!(root.join(today_name(today())).is_dir());
}

#[test]
fn test_non_daily_folders_untouched() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    let projects = empty_folder(root, "projects");
    let short = empty_folder(root, "2024-1-01");
    let nested = empty_folder(root, "archive/2024-01-01");

    let result = run_maintenance_pass(root, &ExemptionList::default(), today());

    assert!(projects.exists());
    assert!(short.exists());
    assert!(nested.exists());
    assert!(result.pruned.is_empty());
    assert!(result.needs_review.is_empty());
}

#[test]
fn test_counts_daily_folders_by_pattern_only() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    let odd = filled_folder(root, "2099-99-99");

    let result = run_maintenance_pass(root, &ExemptionList::default(), today());

    assert_eq!(result.needs_review, BTreeSet::from([odd]));
}

#[test]
fn test_exempt_folder_deleted_when_review_needed() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    let a = filled_folder(root, "2024-01-10");
    let b = filled_folder(root, "2024-01-11");

    let result = run_maintenance_pass(root, &exemptions(&["2024-01-11"]), today());

    assert_eq!(result.needs_review, BTreeSet::from([a.clone()]));
    assert_eq!(result.auto_deleted_exempt, BTreeSet::from([b.clone()]));
    assert!(result.auto_deleted_exempt_failed.is_empty());
    assert!(!b.exists());
    assert!(a.exists());
}

#[test]
fn test_exempt_folder_kept_when_nothing_to_review() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    let b = filled_folder(root, "2024-01-11");

    let result = run_maintenance_pass(root, &exemptions(&["2024-01-11"]), today());

    assert!(result.needs_review.is_empty());
    assert!(result.auto_deleted_exempt.is_empty());
    assert!(b.join("file.txt").exists());
}

#[test]
fn test_missing_exemption_cannot_suppress_review() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    let a = filled_folder(root, "2024-01-10");

    let result = run_maintenance_pass(root, &exemptions(&["2024-01-12", "elsewhere"]), today());

    assert_eq!(result.needs_review, BTreeSet::from([a]));
    assert!(result.auto_deleted_exempt.is_empty());
    assert!(result.auto_deleted_exempt_failed.is_empty());
}

#[test]
fn test_exemption_outside_daily_folders_is_ignored() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    let a = filled_folder(root, "2024-01-10");
    let other = filled_folder(root, "downloads");

    let result = run_maintenance_pass(root, &exemptions(&["downloads"]), today());

    assert_eq!(result.needs_review, BTreeSet::from([a]));
    assert!(other.exists());
}

#[test]
fn test_exemption_file_on_disk() {
    let dir = tempdir().unwrap();
    let config = tempdir().unwrap();
    let root = dir.path();
    let a = filled_folder(root, "2024-01-10");
    let b = filled_folder(root, "2024-01-11");
    let c = filled_folder(root, "2024-01-12");

    let file = config.path().join("exemptions.toml");
    fs::write(
        &file,
        "fileToDelete.1 = \"2024-01-11\"\nfileToDelete.3 = \"2024-01-12\"\n",
    )
    .unwrap();

    let result = run_maintenance_pass(root, &FileExemptions(file), today());

    // the gap after 1 drops entry 3
    assert_eq!(result.needs_review, BTreeSet::from([a, c]));
    assert_eq!(result.auto_deleted_exempt, BTreeSet::from([b]));
}

#[test]
fn test_missing_exemption_file_is_not_fatal() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    let a = filled_folder(root, "2024-01-10");

    let result = run_maintenance_pass(
        root,
        &FileExemptions(root.join("missing.toml")),
        today(),
    );

    assert_eq!(result.needs_review, BTreeSet::from([a]));
    assert!(result.created_today);
}

#[test]
fn test_missing_root_still_attempts_today() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("desktop");

    let result = run_maintenance_pass(&root, &ExemptionList::default(), today());

    assert!(result.pruned.is_empty());
    assert!(result.needs_review.is_empty());
    assert!(result.created_today);
    assert!(root.join("2024-02-01").is_dir());
}

#[test]
fn test_existing_today_folder_with_content_is_kept() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    let today_folder = filled_folder(root, "2024-02-01");

    let result = run_maintenance_pass(root, &ExemptionList::default(), today());

    assert!(result.created_today);
    assert!(today_folder.join("file.txt").exists());
    assert!(!result.needs_review.contains(&today_folder));
    assert!(result.needs_review.is_empty());
}

#[test]
fn test_today_folder_never_offered_for_review() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    let older = filled_folder(root, "2024-01-31");
    let today_folder = filled_folder(root, "2024-02-01");

    let result = run_maintenance_pass(root, &ExemptionList::default(), today());

    assert_eq!(result.needs_review, BTreeSet::from([older]));
    assert!(today_folder.join("file.txt").exists());
}

#[cfg(unix)]
#[test]
fn test_empty_but_undeletable_folder_needs_review() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let root = dir.path().join("desktop");
    let stuck = empty_folder(&root, "2024-01-05");
    fs::set_permissions(&root, fs::Permissions::from_mode(0o555)).unwrap();

    // Privileged users ignore directory permissions
    let write_check = root.join(".write-check");
    if fs::write(&write_check, "").is_ok() {
        fs::remove_file(&write_check).unwrap();
        fs::set_permissions(&root, fs::Permissions::from_mode(0o755)).unwrap();
        println!("Skipping: permissions are not enforced for this user");
        return;
    }

    let result = run_maintenance_pass(&root, &ExemptionList::default(), today());
    fs::set_permissions(&root, fs::Permissions::from_mode(0o755)).unwrap();

    assert!(stuck.exists());
    assert!(result.pruned.is_empty());
    assert_eq!(result.needs_review, BTreeSet::from([stuck]));
    // today's folder could not be created in a read-only root
    assert!(!result.created_today);
}

//! The daily maintenance pass.

use crate::date::today_name;
use crate::exemptions::{ExemptionList, ExemptionSource};
use crate::tree::{create_today_folder, delete_recursive, is_empty, list_daily_folders};

use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Outcome of one maintenance pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaintenanceResult {
    /// The folder for the pass date
    pub today_folder: PathBuf,
    /// Whether `today_folder` exists after the pass
    pub created_today: bool,
    /// Empty daily folders that were removed
    pub pruned: BTreeSet<PathBuf>,
    /// Exempt survivors that were deleted
    pub auto_deleted_exempt: BTreeSet<PathBuf>,
    /// Exempt survivors whose deletion failed
    pub auto_deleted_exempt_failed: BTreeSet<PathBuf>,
    /// Survivors a human has to decide about
    pub needs_review: BTreeSet<PathBuf>,
}

/// Run the maintenance pass for `today` against `root`.
///
/// 1. Resolve the exemption list against `root`. A list that cannot be loaded
///    counts as empty.
/// 2. Delete empty daily folders. Non-empty folders, and empty ones that
///    could not be deleted, survive. The folder for `today` is left alone.
/// 3. Create the folder for `today`.
/// 4. Split survivors into exempt ones and ones that need review.
/// 5. Only if something needs review, delete the exempt survivors.
///
/// Nothing in here fails; every filesystem problem degrades into the result.
pub fn run_maintenance_pass(
    root: &Path,
    source: &dyn ExemptionSource,
    today: NaiveDate,
) -> MaintenanceResult {
    run_pass_with(root, source, today, &delete_recursive)
}

/// The maintenance pass with folder deletion supplied by the caller
fn run_pass_with(
    root: &Path,
    source: &dyn ExemptionSource,
    today: NaiveDate,
    delete: &dyn Fn(&Path) -> bool,
) -> MaintenanceResult {
    let exemptions = source.load().unwrap_or_else(|err| {
        warn!("Exemption list unavailable, continuing without: {:#}", err);
        ExemptionList::default()
    });
    let exempt_paths = exemptions.resolve(root);
    debug!(
        "{} of {} exemption entries present under {}",
        exempt_paths.len(),
        exemptions.entries().len(),
        root.display()
    );

    let name = today_name(today);
    let today_folder = root.join(&name);

    let (pruned, survivors) = prune_empty_folders(root, &today_folder, delete);

    let created_today = create_today_folder(root, &name);

    let (exempt_and_present, needs_review): (BTreeSet<PathBuf>, BTreeSet<PathBuf>) = survivors
        .into_iter()
        .partition(|folder| exempt_paths.contains(folder));

    let mut auto_deleted_exempt = BTreeSet::new();
    let mut auto_deleted_exempt_failed = BTreeSet::new();
    if needs_review.is_empty() {
        if !exempt_and_present.is_empty() {
            debug!(
                "Nothing to review, keeping {} exempt folders",
                exempt_and_present.len()
            );
        }
    } else {
        for folder in exempt_and_present {
            if delete(&folder) {
                auto_deleted_exempt.insert(folder);
            } else {
                warn!("Unable to delete exempt folder: {}", folder.display());
                auto_deleted_exempt_failed.insert(folder);
            }
        }
    }

    MaintenanceResult {
        today_folder,
        created_today,
        pruned,
        auto_deleted_exempt,
        auto_deleted_exempt_failed,
        needs_review,
    }
}

/// Delete empty daily folders other than `today_folder`, returning
/// `(pruned, survivors)`
fn prune_empty_folders(
    root: &Path,
    today_folder: &Path,
    delete: &dyn Fn(&Path) -> bool,
) -> (BTreeSet<PathBuf>, BTreeSet<PathBuf>) {
    let mut pruned = BTreeSet::new();
    let mut survivors = BTreeSet::new();

    for folder in list_daily_folders(root) {
        if folder == today_folder {
            continue;
        }

        if is_empty(&folder) && delete(&folder) {
            pruned.insert(folder);
        } else {
            debug!("Kept: {}", folder.display());
            survivors.insert(folder);
        }
    }

    (pruned, survivors)
}

//! Daily Folder - one dated folder per day
//!
//! Each run tidies a root directory (usually the desktop) full of `YYYY-MM-DD`
//! folders: empty daily folders are removed, a folder for today is created,
//! and whatever could not be removed is handed to a human for review. Folders
//! named in the exemption list (exemptions.toml) are deleted without asking,
//! but only when a review is about to happen anyway.
//!
//! ## Layout
//!
//! - `date`: recognizing and rendering daily folder names
//! - `tree`: filesystem primitives that report failures as values
//! - `exemptions`: the ordinal-keyed exemption list
//! - `policy`: the maintenance pass itself
//! - `desktop`: finding the default root
//! - `review`: the human decision on leftover folders

pub mod date;
pub mod desktop;
pub mod exemptions;
pub mod policy;
pub mod review;
pub mod tree;

// Re-export commonly used items
pub use date::{is_daily_folder_name, local_today, parse_date, today_name};
pub use desktop::{check_root, locate_desktop, DesktopLookup};
pub use exemptions::{
    EmbeddedExemptions, ExemptionEntry, ExemptionList, ExemptionSource, FileExemptions,
};
pub use policy::{run_maintenance_pass, MaintenanceResult};
pub use review::{
    open_in_file_manager, run_review, FolderOpener, ReviewGateway, ReviewOptions, ReviewOutcome,
    TerminalReview,
};
pub use tree::{
    create_today_folder, delete_many_recursive, delete_recursive, is_empty, list_daily_folders,
};

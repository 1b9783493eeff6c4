//! Download listings: settings in, demand out, results to the view.

mod controller;
mod demand;
mod settings;
mod storage_pages;

pub use controller::{DownloadListingController, ListingView, RequestContext};
pub use demand::DownloadDemand;
pub use settings::{
    int_explode, int_val, ListingSettings, SETTING_AUTHOR_IDS, SETTING_CATEGORIES_LIST,
    SETTING_LIST_PID, SETTING_LIST_SELECTED_DOWNLOADS, SETTING_RECURSION_DEPTH,
};
pub use storage_pages::{StoragePageResolver, DEFAULT_MAX_RECURSION_DEPTH};

/// Cache tag of every rendered listing, purged when download records change.
pub const DOWNLOAD_CACHE_TAG: &str = "tx_download";

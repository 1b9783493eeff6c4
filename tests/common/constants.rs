//! Shared constants for end-to-end tests
//!
//! Ids of the records in the test fixture. When the fixture changes, update
//! only this file and `fixtures.rs`.

// ============================================================================
// Pages
// ============================================================================

pub const HOME_PAGE_ID: u32 = 1;

/// Storage folder of the listing plugins, child of the home page
pub const DOWNLOADS_PAGE_ID: u32 = 10;

/// Child of the downloads page
pub const REPORTS_PAGE_ID: u32 = 101;

/// Hidden child of the downloads page
pub const HIDDEN_PAGE_ID: u32 = 103;

/// Second child of the home page
pub const OTHER_PAGE_ID: u32 = 20;

// ============================================================================
// Downloads
// ============================================================================

/// On the downloads page, category "Misc", by Ada
pub const PRICE_LIST_ID: u32 = 501;

/// On the reports page, category "Reports", by Ada
pub const ANNUAL_REPORT_ID: u32 = 502;

/// On the forms page, category "Forms", by Brian
pub const ORDER_FORM_ID: u32 = 503;

/// Two levels below the downloads page, category "Reports", by Brian
pub const OLD_REPORT_ID: u32 = 504;

/// Hidden, on the reports page
pub const HIDDEN_REPORT_ID: u32 = 505;

/// On the other page, category "Reports", by Ada
pub const OTHER_FILE_ID: u32 = 506;

// ============================================================================
// Authors and categories
// ============================================================================

pub const AUTHOR_ADA_ID: u32 = 1;
pub const AUTHOR_BRIAN_ID: u32 = 2;

pub const CATEGORY_REPORTS_ID: u32 = 3;
pub const CATEGORY_FORMS_ID: u32 = 4;

// ============================================================================
// Content elements
// ============================================================================

/// `list` plugin on the downloads page: listPid=10, recursion_depth=1, categoriesList=3,4
pub const LIST_ELEMENT_ID: u32 = 900;

/// `list_selected` plugin on the downloads page: 503, 501 and an unknown id
pub const SELECTED_ELEMENT_ID: u32 = 901;

/// Hidden `list` plugin on the other page
pub const HIDDEN_ELEMENT_ID: u32 = 902;

// ============================================================================
// Server
// ============================================================================

pub const CONTENT_CACHE_AGE_SEC: usize = 60;

pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 10;

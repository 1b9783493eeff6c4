//! Download listing server library
//!
//! Exposes the listing core, the content database and the HTTP surface for
//! the binaries and the integration tests.

pub mod config;
pub mod content_import;
pub mod content_store;
pub mod listing;
pub mod server;
pub mod sqlite_persistence;

pub use content_store::{
    open_content_db, SqliteContentElementStore, SqliteDownloadRepository, SqlitePageTree,
};
pub use listing::{DownloadDemand, DownloadListingController, ListingSettings};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};

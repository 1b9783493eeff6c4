use axum::extract::FromRef;

use crate::content_store::{ContentElementStore, PageTreeService};
use crate::listing::DownloadListingController;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedListingController = Arc<DownloadListingController>;
pub type GuardedPageTree = Arc<dyn PageTreeService>;
pub type GuardedContentElementStore = Arc<dyn ContentElementStore>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub listing_controller: GuardedListingController,
    pub page_tree: GuardedPageTree,
    pub content_elements: GuardedContentElementStore,
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}

impl FromRef<ServerState> for GuardedListingController {
    fn from_ref(input: &ServerState) -> Self {
        input.listing_controller.clone()
    }
}

impl FromRef<ServerState> for GuardedPageTree {
    fn from_ref(input: &ServerState) -> Self {
        input.page_tree.clone()
    }
}

impl FromRef<ServerState> for GuardedContentElementStore {
    fn from_ref(input: &ServerState) -> Self {
        input.content_elements.clone()
    }
}

use super::settings::{int_explode, int_val, ListingSettings, SETTING_LIST_PID, SETTING_RECURSION_DEPTH};
use crate::content_store::PageTreeService;
use anyhow::Result;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Levels below a storage page that a listing may reach.
pub const DEFAULT_MAX_RECURSION_DEPTH: u32 = 250;

/// Turns the configured storage pages into the page scope of a listing.
///
/// `recursion_depth` counts levels: 0 keeps the listed pages only, 1 adds
/// their direct children, and so on.
#[derive(Clone)]
pub struct StoragePageResolver {
    page_tree: Arc<dyn PageTreeService>,
    max_recursion_depth: u32,
}

impl StoragePageResolver {
    pub fn new(page_tree: Arc<dyn PageTreeService>, max_recursion_depth: u32) -> Self {
        Self {
            page_tree,
            max_recursion_depth,
        }
    }

    /// Resolve the scope from the `listPid` and `recursion_depth` settings.
    pub fn resolve_from_settings(&self, settings: &ListingSettings) -> Result<Vec<u32>> {
        let root_pages = settings.get(SETTING_LIST_PID).unwrap_or_default();
        let depth = settings
            .get(SETTING_RECURSION_DEPTH)
            .map(int_val)
            .unwrap_or(0);
        self.resolve(root_pages, depth)
    }

    pub fn resolve(&self, root_pages: &str, recursion_depth: u32) -> Result<Vec<u32>> {
        if root_pages.trim().is_empty() {
            return Ok(Vec::new());
        }
        let roots = dedup(int_explode(root_pages));
        let depth = recursion_depth.min(self.max_recursion_depth);

        if depth == 0 {
            return Ok(roots);
        }

        let pages = dedup(self.page_tree.resolve_storage_pages(&roots, depth)?);
        debug!(
            "Resolved storage pages {:?} with depth {} to {} pages",
            roots,
            depth,
            pages.len()
        );
        Ok(pages)
    }
}

fn dedup(ids: Vec<u32>) -> Vec<u32> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

use super::demand::DownloadDemand;
use super::settings::{
    int_explode, ListingSettings, SETTING_AUTHOR_IDS, SETTING_CATEGORIES_LIST,
    SETTING_LIST_SELECTED_DOWNLOADS,
};
use super::storage_pages::StoragePageResolver;
use super::DOWNLOAD_CACHE_TAG;
use crate::content_store::{
    ContentElement, Download, DownloadRepository, Page, PageTreeService,
};
use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Page and content element a listing is rendered for.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub page: Option<Page>,
    pub content_object: Option<ContentElement>,
}

/// Variables handed to the view, plus the cache tags of the rendered output.
#[derive(Debug, Clone, Serialize)]
pub struct ListingView {
    pub downloads: Vec<Download>,
    #[serde(rename = "pageData")]
    pub page_data: Option<Page>,
    #[serde(rename = "contentObjectData")]
    pub content_object_data: Option<ContentElement>,
    #[serde(skip)]
    pub cache_tags: Vec<&'static str>,
}

impl ListingView {
    fn new(downloads: Vec<Download>, context: &RequestContext) -> Self {
        Self {
            downloads,
            page_data: context.page.clone(),
            content_object_data: context.content_object.clone(),
            cache_tags: vec![DOWNLOAD_CACHE_TAG],
        }
    }
}

/// Builds demands from listing settings and runs them against the repository.
#[derive(Clone)]
pub struct DownloadListingController {
    downloads: Arc<dyn DownloadRepository>,
    storage_pages: StoragePageResolver,
}

impl DownloadListingController {
    pub fn new(
        downloads: Arc<dyn DownloadRepository>,
        page_tree: Arc<dyn PageTreeService>,
        max_recursion_depth: u32,
    ) -> Self {
        Self {
            downloads,
            storage_pages: StoragePageResolver::new(page_tree, max_recursion_depth),
        }
    }

    /// All downloads in the page scope matching the author and category filters.
    pub fn list_all(
        &self,
        settings: &ListingSettings,
        context: &RequestContext,
    ) -> Result<ListingView> {
        let demand = self.create_demand(settings)?;
        let downloads = self.downloads.find_demanded(&demand)?;
        Ok(ListingView::new(downloads, context))
    }

    /// Only the downloads picked in `listSelectedDownloads`, in that order.
    pub fn list_selected(
        &self,
        settings: &ListingSettings,
        context: &RequestContext,
    ) -> Result<ListingView> {
        let demand = self.create_demand(settings)?;
        let downloads = self.downloads.find_by_ids(demand.download_ids())?;
        Ok(ListingView::new(downloads, context))
    }

    pub fn create_demand(&self, settings: &ListingSettings) -> Result<DownloadDemand> {
        let mut demand =
            DownloadDemand::default().with_page_ids(self.storage_pages.resolve_from_settings(settings)?);

        if let Some(ids) = settings.filter_value(SETTING_LIST_SELECTED_DOWNLOADS) {
            demand = demand.with_download_ids(int_explode(ids));
        }
        if let Some(ids) = settings.filter_value(SETTING_AUTHOR_IDS) {
            demand = demand.with_author_ids(int_explode(ids));
        }
        if let Some(ids) = settings.filter_value(SETTING_CATEGORIES_LIST) {
            demand = demand.with_category_ids(int_explode(ids));
        }

        debug!("Created {:?}", demand);
        Ok(demand)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content_store::ListingPlugin;
    use crate::listing::DEFAULT_MAX_RECURSION_DEPTH;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingRepository {
        demands: Mutex<Vec<DownloadDemand>>,
        selections: Mutex<Vec<Vec<u32>>>,
        fail: bool,
    }

    fn download(uid: u32) -> Download {
        Download {
            uid,
            pid: 10,
            title: format!("Download {}", uid),
            description: None,
            file_path: None,
            file_size: None,
            author: None,
            categories: Vec::new(),
            created_at: 0,
        }
    }

    impl DownloadRepository for RecordingRepository {
        fn find_demanded(&self, demand: &DownloadDemand) -> Result<Vec<Download>> {
            if self.fail {
                anyhow::bail!("database is locked");
            }
            self.demands.lock().unwrap().push(demand.clone());
            Ok(vec![download(1), download(2)])
        }

        fn find_by_ids(&self, ids: &[u32]) -> Result<Vec<Download>> {
            if self.fail {
                anyhow::bail!("database is locked");
            }
            self.selections.lock().unwrap().push(ids.to_vec());
            Ok(ids.iter().copied().map(download).collect())
        }
    }

    /// Every page has the two children `uid * 10 + 1` and `uid * 10 + 2`.
    struct DecimalPageTree;

    impl PageTreeService for DecimalPageTree {
        fn resolve_storage_pages(&self, root_ids: &[u32], depth: u32) -> Result<Vec<u32>> {
            let mut pages = root_ids.to_vec();
            let mut level = root_ids.to_vec();
            for _ in 0..depth {
                level = level.iter().flat_map(|p| [p * 10 + 1, p * 10 + 2]).collect();
                pages.extend_from_slice(&level);
            }
            Ok(pages)
        }

        fn get_page(&self, _uid: u32) -> Result<Option<Page>> {
            Ok(None)
        }
    }

    fn controller(repository: Arc<RecordingRepository>) -> DownloadListingController {
        DownloadListingController::new(
            repository,
            Arc::new(DecimalPageTree),
            DEFAULT_MAX_RECURSION_DEPTH,
        )
    }

    fn settings(pairs: &[(&str, &str)]) -> ListingSettings {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_demand_from_settings() {
        let repository = Arc::new(RecordingRepository::default());
        let demand = controller(repository)
            .create_demand(&settings(&[
                ("listPid", "10"),
                ("recursion_depth", "1"),
                ("categoriesList", "3,4"),
            ]))
            .unwrap();

        assert_eq!(demand.page_ids(), &[10, 101, 102]);
        assert_eq!(demand.category_ids(), &[3, 4]);
        assert!(demand.download_ids().is_empty());
        assert!(demand.author_ids().is_empty());
    }

    #[test]
    fn test_missing_and_empty_settings_do_not_restrict() {
        let repository = Arc::new(RecordingRepository::default());
        let demand = controller(repository)
            .create_demand(&settings(&[("authorIds", ""), ("listSelectedDownloads", "0")]))
            .unwrap();
        assert_eq!(demand, DownloadDemand::default());
    }

    #[test]
    fn test_malformed_ids_become_zero() {
        let repository = Arc::new(RecordingRepository::default());
        let demand = controller(repository)
            .create_demand(&settings(&[("authorIds", "7,seven,8")]))
            .unwrap();
        assert_eq!(demand.author_ids(), &[7, 0, 8]);
    }

    #[test]
    fn test_list_all_passes_every_filter() {
        let repository = Arc::new(RecordingRepository::default());
        let view = controller(repository.clone())
            .list_all(
                &settings(&[
                    ("listPid", "5"),
                    ("authorIds", "1"),
                    ("categoriesList", "2"),
                    ("listSelectedDownloads", "9"),
                ]),
                &RequestContext::default(),
            )
            .unwrap();

        let demands = repository.demands.lock().unwrap();
        assert_eq!(demands.len(), 1);
        assert_eq!(demands[0].page_ids(), &[5]);
        assert_eq!(demands[0].author_ids(), &[1]);
        assert_eq!(demands[0].category_ids(), &[2]);
        assert_eq!(demands[0].download_ids(), &[9]);
        assert!(repository.selections.lock().unwrap().is_empty());

        assert_eq!(view.downloads.len(), 2);
        assert_eq!(view.cache_tags, vec![DOWNLOAD_CACHE_TAG]);
    }

    #[test]
    fn test_list_selected_ignores_scope_filters() {
        let repository = Arc::new(RecordingRepository::default());
        let view = controller(repository.clone())
            .list_selected(
                &settings(&[
                    ("listPid", "5"),
                    ("recursion_depth", "3"),
                    ("authorIds", "1"),
                    ("categoriesList", "2"),
                    ("listSelectedDownloads", "4,3"),
                ]),
                &RequestContext::default(),
            )
            .unwrap();

        assert!(repository.demands.lock().unwrap().is_empty());
        assert_eq!(*repository.selections.lock().unwrap(), vec![vec![4, 3]]);
        let uids: Vec<u32> = view.downloads.iter().map(|d| d.uid).collect();
        assert_eq!(uids, vec![4, 3]);
        assert_eq!(view.cache_tags, vec![DOWNLOAD_CACHE_TAG]);
    }

    #[test]
    fn test_view_carries_context() {
        let repository = Arc::new(RecordingRepository::default());
        let page = Page {
            uid: 5,
            pid: 1,
            title: "Downloads".to_string(),
        };
        let element = ContentElement {
            uid: 77,
            pid: 5,
            plugin: ListingPlugin::List,
            header: Some("All files".to_string()),
            settings: settings(&[("listPid", "5")]),
        };
        let context = RequestContext {
            page: Some(page.clone()),
            content_object: Some(element.clone()),
        };

        let view = controller(repository)
            .list_all(&element.settings, &context)
            .unwrap();
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["pageData"]["title"], "Downloads");
        assert_eq!(json["contentObjectData"]["uid"], 77);
        assert_eq!(json["contentObjectData"]["settings"]["listPid"], "5");
        assert_eq!(json["downloads"].as_array().unwrap().len(), 2);
        assert!(json.get("cache_tags").is_none());
    }

    #[test]
    fn test_repository_errors_propagate() {
        let repository = Arc::new(RecordingRepository {
            fail: true,
            ..Default::default()
        });
        let controller = controller(repository);

        let err = controller
            .list_all(&ListingSettings::new(), &RequestContext::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "database is locked");

        let err = controller
            .list_selected(
                &settings(&[("listSelectedDownloads", "1")]),
                &RequestContext::default(),
            )
            .unwrap_err();
        assert_eq!(err.to_string(), "database is locked");
    }
}

use serde::Serialize;

/// Filter criteria of one listing query.
///
/// Every empty criterion means "no restriction". A demand is assembled once
/// per request by the builder methods and only read afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DownloadDemand {
    page_ids: Vec<u32>,
    download_ids: Vec<u32>,
    author_ids: Vec<u32>,
    category_ids: Vec<u32>,
}

impl DownloadDemand {
    pub fn with_page_ids(mut self, page_ids: Vec<u32>) -> Self {
        self.page_ids = page_ids;
        self
    }

    pub fn with_download_ids(mut self, download_ids: Vec<u32>) -> Self {
        self.download_ids = download_ids;
        self
    }

    pub fn with_author_ids(mut self, author_ids: Vec<u32>) -> Self {
        self.author_ids = author_ids;
        self
    }

    pub fn with_category_ids(mut self, category_ids: Vec<u32>) -> Self {
        self.category_ids = category_ids;
        self
    }

    /// Page tree scope.
    pub fn page_ids(&self) -> &[u32] {
        &self.page_ids
    }

    /// Explicit allow-list of download uids.
    pub fn download_ids(&self) -> &[u32] {
        &self.download_ids
    }

    pub fn author_ids(&self) -> &[u32] {
        &self.author_ids
    }

    pub fn category_ids(&self) -> &[u32] {
        &self.category_ids
    }
}

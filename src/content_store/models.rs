//! Records served by the content database.

use crate::listing::ListingSettings;
use serde::{Deserialize, Serialize};

/// A downloadable file record, with its author and categories resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Download {
    pub uid: u32,
    pub pid: u32,
    pub title: String,
    pub description: Option<String>,
    pub file_path: Option<String>,
    pub file_size: Option<i64>,
    pub author: Option<Author>,
    pub categories: Vec<Category>,
    /// Unix timestamp, seconds.
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub uid: u32,
    pub name: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub uid: u32,
    pub title: String,
    /// Parent category uid, 0 for top level categories.
    pub parent: u32,
}

/// A node of the page tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub uid: u32,
    /// Parent page uid, 0 for root pages.
    pub pid: u32,
    pub title: String,
}

/// Which listing action a content element renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingPlugin {
    List,
    ListSelected,
}

impl ListingPlugin {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingPlugin::List => "list",
            ListingPlugin::ListSelected => "list_selected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "list" => Some(ListingPlugin::List),
            "list_selected" => Some(ListingPlugin::ListSelected),
            _ => None,
        }
    }
}

/// A listing plugin placed on a page, carrying its own settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentElement {
    pub uid: u32,
    pub pid: u32,
    pub plugin: ListingPlugin,
    pub header: Option<String>,
    pub settings: ListingSettings,
}

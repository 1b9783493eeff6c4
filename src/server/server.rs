use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Path, Query, State},
    http::{header::HeaderName, HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info};

use super::{http_cache, log_requests, metrics, state::*, ServerConfig};
use crate::content_store::{ContentElementStore, DownloadRepository, ListingPlugin, PageTreeService};
use crate::listing::{DownloadListingController, ListingSettings, ListingView, RequestContext};

/// Response header carrying the cache tags of a rendered listing.
pub const CACHE_TAG_HEADER: &str = "cache-tag";

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Debug, Error)]
pub enum ListingRouteError {
    #[error("Page {0} not found")]
    PageNotFound(u32),

    #[error("Content element {content_id} not found on page {page_id}")]
    ContentElementNotFound { page_id: u32, content_id: u32 },

    #[error("Listing failed")]
    Listing(#[from] anyhow::Error),
}

impl IntoResponse for ListingRouteError {
    fn into_response(self) -> Response {
        let status = match &self {
            ListingRouteError::PageNotFound(_)
            | ListingRouteError::ContentElementNotFound { .. } => StatusCode::NOT_FOUND,
            ListingRouteError::Listing(err) => {
                error!("Listing failed: {:#}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, self.to_string()).into_response()
    }
}

fn render_listing(
    plugin: ListingPlugin,
    result: Result<ListingView>,
) -> Result<Response, ListingRouteError> {
    let view = match result {
        Ok(view) => view,
        Err(err) => {
            metrics::record_listing(plugin.as_str(), None);
            return Err(err.into());
        }
    };
    metrics::record_listing(plugin.as_str(), Some(view.downloads.len()));

    let mut response = Json(&view).into_response();
    if let Ok(tags) = HeaderValue::from_str(&view.cache_tags.join(",")) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(CACHE_TAG_HEADER), tags);
    }
    Ok(response)
}

fn run_listing(
    controller: &DownloadListingController,
    plugin: ListingPlugin,
    settings: &ListingSettings,
    context: &RequestContext,
) -> Result<ListingView> {
    match plugin {
        ListingPlugin::List => controller.list_all(settings, context),
        ListingPlugin::ListSelected => controller.list_selected(settings, context),
    }
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    Json(ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
    })
}

async fn list_downloads(
    State(config): State<ServerConfig>,
    State(controller): State<GuardedListingController>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Response, ListingRouteError> {
    let settings = config
        .listing_defaults
        .overlay(&query.into_iter().collect());
    debug!("Listing all downloads with {:?}", settings);
    let result = run_listing(
        &controller,
        ListingPlugin::List,
        &settings,
        &RequestContext::default(),
    );
    render_listing(ListingPlugin::List, result)
}

async fn list_selected_downloads(
    State(config): State<ServerConfig>,
    State(controller): State<GuardedListingController>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Response, ListingRouteError> {
    let settings = config
        .listing_defaults
        .overlay(&query.into_iter().collect());
    debug!("Listing selected downloads with {:?}", settings);
    let result = run_listing(
        &controller,
        ListingPlugin::ListSelected,
        &settings,
        &RequestContext::default(),
    );
    render_listing(ListingPlugin::ListSelected, result)
}

async fn render_content_element(
    State(state): State<ServerState>,
    Path((page_id, content_id)): Path<(u32, u32)>,
) -> Result<Response, ListingRouteError> {
    let page = state
        .page_tree
        .get_page(page_id)?
        .ok_or(ListingRouteError::PageNotFound(page_id))?;

    let element = state
        .content_elements
        .get_content_element(content_id)?
        .filter(|element| element.pid == page.uid)
        .ok_or(ListingRouteError::ContentElementNotFound {
            page_id,
            content_id,
        })?;

    let plugin = element.plugin;
    let settings = state.config.listing_defaults.overlay(&element.settings);
    debug!(
        "Rendering content element {} ({}) on page {}",
        content_id,
        plugin.as_str(),
        page_id
    );

    let context = RequestContext {
        page: Some(page),
        content_object: Some(element),
    };
    let result = run_listing(&state.listing_controller, plugin, &settings, &context);
    render_listing(plugin, result)
}

pub fn make_app(
    config: ServerConfig,
    downloads: Arc<dyn DownloadRepository>,
    page_tree: Arc<dyn PageTreeService>,
    content_elements: Arc<dyn ContentElementStore>,
) -> Result<Router> {
    let listing_controller = Arc::new(DownloadListingController::new(
        downloads,
        page_tree.clone(),
        config.max_recursion_depth,
    ));
    let state = ServerState {
        config: config.clone(),
        start_time: Instant::now(),
        listing_controller,
        page_tree,
        content_elements,
    };

    let listing_routes: Router = Router::new()
        .route("/downloads", get(list_downloads))
        .route("/downloads/selected", get(list_selected_downloads))
        .route(
            "/pages/{page_id}/content/{content_id}",
            get(render_content_element),
        )
        .layer(middleware::from_fn_with_state(
            config.content_cache_age_sec,
            http_cache,
        ))
        .with_state(state.clone());

    let app: Router = Router::new()
        .route("/", get(home))
        .with_state(state.clone())
        .nest("/v1", listing_routes)
        .layer(middleware::from_fn_with_state(state, log_requests));

    Ok(app)
}

fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics::metrics_handler))
}

pub async fn run_server(
    config: ServerConfig,
    downloads: Arc<dyn DownloadRepository>,
    page_tree: Arc<dyn PageTreeService>,
    content_elements: Arc<dyn ContentElementStore>,
) -> Result<()> {
    metrics::init_metrics();

    let port = config.port;
    let metrics_port = config.metrics_port;
    let app = make_app(config, downloads, page_tree, content_elements)?;

    let metrics_listener =
        tokio::net::TcpListener::bind(format!("0.0.0.0:{}", metrics_port)).await?;
    info!("Metrics available at port {}", metrics_port);
    tokio::spawn(async move {
        if let Err(e) = axum::serve(metrics_listener, make_metrics_app()).await {
            error!("Metrics server stopped: {}", e);
        }
    });

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("Ready to serve at port {}", port);
    Ok(axum::serve(listener, app).await?)
}

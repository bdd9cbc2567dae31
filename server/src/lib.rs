use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::StatusCode, routing::{get, post}, Json, Router};
use catalog::{BooksClient, BooksConfig};
use feed::recommend::{recommend, RECOMMENDATIONS_FAILED};
use feed::{
    CatalogItem, CatalogSource, Category, Feed, FeedError, FeedSnapshot, KvStore, SearchHistory, SessionKey,
    SledStore, SortMode, ViewedBook, ViewedHistory,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub const DEFAULT_FAVORITES: [&str; 3] = ["Fiction", "Non-Fiction", "Mystery"];
const DASHBOARD_SEARCHES: usize = 6;
const DASHBOARD_VIEWED: usize = 10;
/// The dashboard builds recommendations from this many recent searches.
const RECOMMENDATION_HISTORY: usize = 3;

pub struct AppConfig {
    /// Directory holding the local key/value store.
    pub data_dir: PathBuf,
    pub books: BooksConfig,
    pub favorites: Vec<String>,
    /// Comma-separated list; `None` or empty allows any origin.
    pub cors_allow_origin: Option<String>,
}

impl AppConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            books: BooksConfig::default(),
            favorites: DEFAULT_FAVORITES.iter().map(|s| s.to_string()).collect(),
            cors_allow_origin: None,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub feed: Arc<Feed<BooksClient>>,
    pub searches: Arc<Mutex<SearchHistory>>,
    pub viewed: Arc<Mutex<ViewedHistory>>,
    pub favorites: Arc<Vec<String>>,
}

#[derive(Deserialize)]
pub struct FeedParams {
    pub search: Option<String>,
    pub category: Option<String>,
    pub sort: Option<String>,
}

#[derive(Deserialize)]
pub struct SentinelBody {
    pub visible: bool,
}

#[derive(Serialize)]
pub struct SentinelResponse {
    pub advanced: bool,
    #[serde(flatten)]
    pub feed: FeedSnapshot,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDetails {
    #[serde(flatten)]
    pub item: CatalogItem,
    pub description_text: String,
}

#[derive(Deserialize)]
pub struct RecommendationParams {
    /// Comma-separated category labels.
    pub favorites: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub recent_searches: Vec<String>,
    pub recommendations: Vec<CatalogItem>,
    pub recommendations_error: Option<String>,
    pub recently_viewed: Vec<ViewedBook>,
}

type ApiError = (StatusCode, Json<serde_json::Value>);

pub fn build_app(config: AppConfig) -> Result<Router> {
    // Local storage and histories are loaded once at startup
    let store: Arc<dyn KvStore> = Arc::new(SledStore::open(&config.data_dir)?);
    let mut searches = SearchHistory::searches(store.clone());
    searches.load();
    let mut viewed = ViewedHistory::viewed(store);
    viewed.load();
    let searches = Arc::new(Mutex::new(searches));

    let catalog = Arc::new(BooksClient::new(config.books)?);
    let feed = Arc::new(Feed::new(catalog, searches.clone()));
    let app_state = AppState {
        feed,
        searches,
        viewed: Arc::new(Mutex::new(viewed)),
        favorites: Arc::new(config.favorites),
    };

    let cors = match config.cors_allow_origin.as_deref() {
        Some(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        None => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/feed", get(feed_handler))
        .route("/feed/sentinel", post(sentinel_handler))
        .route("/book/:id", get(book_handler))
        .route("/history/searches", get(searches_handler).delete(clear_searches))
        .route("/history/viewed", get(viewed_handler).delete(clear_viewed))
        .route("/recommendations", get(recommendations_handler))
        .route("/dashboard", get(dashboard_handler))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);
    Ok(app)
}

/// Missing parameters keep the current session's value; `search` pre-populates the feed.
pub async fn feed_handler(State(state): State<AppState>, Query(params): Query<FeedParams>) -> Json<FeedSnapshot> {
    let current = state.feed.with_pager(|p| p.session().clone());
    let key = SessionKey {
        search: params.search.map(|s| s.trim().to_string()).unwrap_or(current.search),
        category: params.category.as_deref().map(Category::from_label).unwrap_or(current.category),
        sort: params.sort.as_deref().map(SortMode::from_param).unwrap_or(current.sort),
    };
    Json(state.feed.set_session(key).await)
}

pub async fn sentinel_handler(State(state): State<AppState>, Json(body): Json<SentinelBody>) -> Json<SentinelResponse> {
    let advanced = state.feed.sentinel(body.visible).await;
    Json(SentinelResponse { advanced, feed: state.feed.snapshot() })
}

pub async fn book_handler(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<BookDetails>, ApiError> {
    let raw = state.feed.source().lookup(&id).await.map_err(api_error)?;
    let item = raw.normalize();
    state.viewed.lock().add_viewed_book(&item.id, &item.title);
    let description_text = item.description_text();
    Ok(Json(BookDetails { item, description_text }))
}

async fn searches_handler(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.searches.lock().entries().to_vec())
}

async fn clear_searches(State(state): State<AppState>) -> StatusCode {
    state.searches.lock().clear();
    StatusCode::NO_CONTENT
}

async fn viewed_handler(State(state): State<AppState>) -> Json<Vec<ViewedBook>> {
    Json(state.viewed.lock().entries().to_vec())
}

async fn clear_viewed(State(state): State<AppState>) -> StatusCode {
    state.viewed.lock().clear();
    StatusCode::NO_CONTENT
}

pub async fn recommendations_handler(State(state): State<AppState>, Query(params): Query<RecommendationParams>) -> Result<Json<Vec<CatalogItem>>, ApiError> {
    let favorites = match params.favorites {
        Some(list) => list.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect(),
        None => state.favorites.as_ref().clone(),
    };
    let history = state.searches.lock().entries().to_vec();
    let items = recommend(state.feed.source().as_ref(), &history, &favorites).await.map_err(api_error)?;
    Ok(Json(items))
}

pub async fn dashboard_handler(State(state): State<AppState>) -> Json<Dashboard> {
    let (recent_searches, history) = {
        let searches = state.searches.lock();
        (searches.recent(DASHBOARD_SEARCHES).to_vec(), searches.recent(RECOMMENDATION_HISTORY).to_vec())
    };
    let recently_viewed = state.viewed.lock().recent(DASHBOARD_VIEWED).to_vec();
    // a failed recommendation request only blanks its own section
    let (recommendations, recommendations_error) = match recommend(state.feed.source().as_ref(), &history, &state.favorites).await {
        Ok(items) => (items, None),
        Err(e) => {
            tracing::warn!(error = %e, "recommendations unavailable");
            (Vec::new(), Some(RECOMMENDATIONS_FAILED.to_string()))
        }
    };
    Json(Dashboard { recent_searches, recommendations, recommendations_error, recently_viewed })
}

fn api_error(e: FeedError) -> ApiError {
    let status = match e {
        FeedError::NotFound(_) => StatusCode::NOT_FOUND,
        FeedError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        FeedError::FetchFailed(_) => StatusCode::BAD_GATEWAY,
        FeedError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    tracing::debug!(%status, error = %e, "request failed");
    (status, Json(serde_json::json!({ "error": e.user_message() })))
}

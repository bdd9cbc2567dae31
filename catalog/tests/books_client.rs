use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use catalog::{BooksClient, BooksConfig};
use feed::{CatalogQuery, CatalogSource, FeedError, SortMode};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

type Seen = Arc<Mutex<Vec<HashMap<String, String>>>>;

async fn volumes(State(seen): State<Seen>, Query(params): Query<HashMap<String, String>>) -> Result<Json<serde_json::Value>, StatusCode> {
    seen.lock().push(params.clone());
    let q = params.get("q").cloned().unwrap_or_default();
    if q == "busy" { return Err(StatusCode::TOO_MANY_REQUESTS); }
    if q == "broken" { return Err(StatusCode::INTERNAL_SERVER_ERROR); }
    if q == "nothing" { return Ok(Json(serde_json::json!({ "kind": "books#volumes", "totalItems": 0 }))); }
    let max: usize = params.get("maxResults").and_then(|m| m.parse().ok()).unwrap_or(10);
    let start: usize = params.get("startIndex").and_then(|m| m.parse().ok()).unwrap_or(0);
    let items: Vec<_> = (start..start + max.min(3))
        .map(|i| serde_json::json!({ "id": format!("v{i}"), "volumeInfo": { "title": format!("{q} {i}") } }))
        .collect();
    Ok(Json(serde_json::json!({ "totalItems": 999, "items": items })))
}

async fn volume(Path(id): Path<String>) -> Result<Json<serde_json::Value>, StatusCode> {
    match id.as_str() {
        "abc123" => Ok(Json(serde_json::json!({
            "id": "abc123",
            "volumeInfo": { "title": "Dune", "publisher": "Chilton", "imageLinks": { "thumbnail": "http://img/dune" } }
        }))),
        "busy" => Err(StatusCode::TOO_MANY_REQUESTS),
        _ => Err(StatusCode::NOT_FOUND),
    }
}

async fn fake_catalog() -> (String, Seen) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/books/v1/volumes", get(volumes))
        .route("/books/v1/volumes/:id", get(volume))
        .with_state(seen.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    (format!("http://{addr}/books/v1"), seen)
}

fn client(base: String, key: Option<&str>) -> BooksClient {
    BooksClient::new(BooksConfig {
        api_base: base,
        api_key: key.map(str::to_string),
        request_delay: Duration::ZERO,
        ..Default::default()
    })
    .unwrap()
}

fn query(text: &str) -> CatalogQuery {
    CatalogQuery { text: text.into(), subject: Some("fiction".into()), sort: SortMode::Newest, offset: 40, limit: 40 }
}

#[tokio::test]
async fn search_sends_paging_parameters() {
    let (base, seen) = fake_catalog().await;
    let c = client(base, Some("secret"));
    let items = c.search(&query("dune")).await.unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].id, "v40");

    let params = seen.lock()[0].clone();
    assert_eq!(params["q"], "dune+subject:fiction");
    assert_eq!(params["startIndex"], "40");
    assert_eq!(params["maxResults"], "40");
    assert_eq!(params["orderBy"], "newest");
    assert_eq!(params["key"], "secret");
}

#[tokio::test]
async fn missing_items_means_empty_page() {
    let (base, seen) = fake_catalog().await;
    let items = client(base, None).search(&query("nothing")).await.unwrap();
    assert!(items.is_empty());
    assert!(!seen.lock()[0].contains_key("key"));
}

#[tokio::test]
async fn status_codes_map_to_errors() {
    let (base, _) = fake_catalog().await;
    let c = client(base, None);
    assert_eq!(c.search(&query("busy")).await.unwrap_err(), FeedError::RateLimited);
    assert!(matches!(c.search(&query("broken")).await, Err(FeedError::FetchFailed(_))));
    assert_eq!(c.lookup("busy").await.unwrap_err(), FeedError::RateLimited);
    assert_eq!(c.lookup("nope").await.unwrap_err(), FeedError::NotFound("nope".into()));
}

#[tokio::test]
async fn lookup_returns_one_volume() {
    let (base, _) = fake_catalog().await;
    let item = client(base, None).lookup("abc123").await.unwrap().normalize();
    assert_eq!(item.title, "Dune");
    assert_eq!(item.publisher.as_deref(), Some("Chilton"));
    assert_eq!(item.thumbnail.as_deref(), Some("https://img/dune"));
}

#[tokio::test]
async fn unreachable_catalog_is_a_fetch_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let c = client(format!("http://{addr}/books/v1"), None);
    assert!(matches!(c.search(&query("dune")).await, Err(FeedError::FetchFailed(_))));
}

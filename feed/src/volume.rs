//! Raw catalog records as returned by the Google Books `volumes` endpoints,
//! and their normalization into [`CatalogItem`].

use crate::model::CatalogItem;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VolumeList {
    #[serde(default)]
    pub items: Vec<RawVolume>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawVolume {
    pub id: String,
    #[serde(default, rename = "volumeInfo")]
    pub volume_info: VolumeInfo,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    pub title: Option<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    pub description: Option<String>,
    pub image_links: Option<ImageLinks>,
    pub published_date: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub average_rating: Option<f32>,
    pub ratings_count: Option<u32>,
    pub page_count: Option<u32>,
    pub language: Option<String>,
    pub preview_link: Option<String>,
    pub info_link: Option<String>,
    pub publisher: Option<String>,
    #[serde(default)]
    pub industry_identifiers: Vec<IndustryIdentifier>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageLinks {
    pub small_thumbnail: Option<String>,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndustryIdentifier {
    #[serde(rename = "type")]
    pub kind: String,
    pub identifier: String,
}

impl RawVolume {
    pub fn normalize(self) -> CatalogItem {
        let info = self.volume_info;
        let thumbnail = info.image_links.and_then(|l| l.thumbnail).and_then(non_empty).map(|u| secure_uri(&u));
        CatalogItem {
            id: self.id,
            title: info.title.and_then(non_empty).unwrap_or_else(|| "Unknown".to_string()),
            authors: info.authors,
            description: info.description.unwrap_or_default(),
            thumbnail,
            published_date: info.published_date.unwrap_or_default(),
            categories: info.categories,
            // the catalog reports 0 for "no rating"
            average_rating: info.average_rating.filter(|r| *r > 0.0).map(|r| r.clamp(0.0, 5.0)),
            ratings_count: info.ratings_count.unwrap_or(0),
            page_count: info.page_count.unwrap_or(0),
            language: info.language.and_then(non_empty),
            preview_link: info.preview_link.and_then(non_empty),
            info_link: info.info_link.and_then(non_empty),
            publisher: info.publisher.and_then(non_empty),
            isbn: info.industry_identifiers.into_iter().next().map(|i| i.identifier).and_then(non_empty),
        }
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() { None } else { Some(s) }
}

/// Upgrades an `http://` URI to `https://`; other schemes pass through.
pub fn secure_uri(uri: &str) -> String {
    match uri.strip_prefix("http://") {
        Some(rest) => format!("https://{rest}"),
        None => uri.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_sparse_volume() {
        let raw: RawVolume = serde_json::from_str(r#"{"id":"x1"}"#).unwrap();
        let item = raw.normalize();
        assert_eq!(item.id, "x1");
        assert_eq!(item.title, "Unknown");
        assert!(item.authors.is_empty());
        assert!(item.thumbnail.is_none());
        assert!(item.average_rating.is_none());
        assert_eq!(item.page_count, 0);
        assert!(item.isbn.is_none());
    }

    #[test]
    fn normalizes_full_volume() {
        let raw: RawVolume = serde_json::from_value(serde_json::json!({
            "id": "abc123",
            "volumeInfo": {
                "title": "Dune",
                "authors": ["Frank Herbert"],
                "description": "<p>Spice</p>",
                "imageLinks": { "thumbnail": "http://books.google.com/books/content?id=abc123" },
                "publishedDate": "1965",
                "categories": ["Fiction"],
                "averageRating": 4.5,
                "ratingsCount": 1200,
                "pageCount": 412,
                "language": "en",
                "publisher": "Chilton",
                "industryIdentifiers": [
                    { "type": "ISBN_13", "identifier": "9780441013593" },
                    { "type": "ISBN_10", "identifier": "0441013597" }
                ]
            }
        }))
        .unwrap();
        let item = raw.normalize();
        assert_eq!(item.thumbnail.as_deref(), Some("https://books.google.com/books/content?id=abc123"));
        assert_eq!(item.average_rating, Some(4.5));
        assert_eq!(item.ratings_count, 1200);
        assert_eq!(item.language.as_deref(), Some("en"));
        assert_eq!(item.isbn.as_deref(), Some("9780441013593"));
        assert_eq!(item.publisher.as_deref(), Some("Chilton"));
    }

    #[test]
    fn secure_uri_leaves_https_alone() {
        assert_eq!(secure_uri("https://a/b"), "https://a/b");
        assert_eq!(secure_uri("http://a/b"), "https://a/b");
    }
}

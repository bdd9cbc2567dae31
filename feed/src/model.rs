use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of items requested per feed page.
pub const PAGE_SIZE: usize = 40;
/// Number of items requested for a recommendation list.
pub const RECOMMENDATION_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    Relevance,
    Newest,
}

impl SortMode {
    /// Lenient parse used for URL input: anything but `newest` means relevance.
    pub fn from_param(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("newest") { SortMode::Newest } else { SortMode::Relevance }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Relevance => "relevance",
            SortMode::Newest => "newest",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Genre filter offered by the feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[default]
    All,
    Romance,
    Fiction,
    #[serde(rename = "Non-Fiction")]
    NonFiction,
    Mystery,
    Poetry,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::All,
        Category::Romance,
        Category::Fiction,
        Category::NonFiction,
        Category::Mystery,
        Category::Poetry,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::All => "All",
            Category::Romance => "Romance",
            Category::Fiction => "Fiction",
            Category::NonFiction => "Non-Fiction",
            Category::Mystery => "Mystery",
            Category::Poetry => "Poetry",
        }
    }

    /// Catalog subject slug, `None` for `All`.
    pub fn subject(&self) -> Option<&'static str> {
        match self {
            Category::All => None,
            Category::Romance => Some("romance"),
            Category::Fiction => Some("fiction"),
            Category::NonFiction => Some("non-fiction"),
            Category::Mystery => Some("mystery"),
            Category::Poetry => Some("poetry"),
        }
    }

    /// Matches a label or slug case-insensitively; unknown or empty input is `All`.
    pub fn from_label(s: &str) -> Self {
        let s = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(s) || c.subject().is_some_and(|slug| slug.eq_ignore_ascii_case(s)))
            .unwrap_or_default()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

/// The (search text, category, sort) triple identifying a browsing context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub search: String,
    pub category: Category,
    pub sort: SortMode,
}

impl SessionKey {
    pub fn new(search: impl Into<String>, category: Category, sort: SortMode) -> Self {
        Self { search: search.into(), category, sort }
    }

    pub fn page(&self, page: usize) -> PageKey { PageKey { session: self.clone(), page } }
}

/// Cache addressing unit: a session key plus a zero-based page index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageKey {
    pub session: SessionKey,
    pub page: usize,
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}|{}", self.session.search, self.session.category, self.session.sort, self.page)
    }
}

/// One request against the remote catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    pub text: String,
    /// Raw `subject:` filter value.
    pub subject: Option<String>,
    pub sort: SortMode,
    pub offset: usize,
    pub limit: usize,
}

impl CatalogQuery {
    pub fn for_page(key: &PageKey) -> Self {
        Self {
            text: key.session.search.clone(),
            subject: key.session.category.subject().map(str::to_string),
            sort: key.session.sort,
            offset: key.page * PAGE_SIZE,
            limit: PAGE_SIZE,
        }
    }

    /// Value of the catalog's `q` parameter: the non-empty parts joined with `+`.
    pub fn q(&self) -> String {
        let subject = self.subject.as_deref().filter(|s| !s.is_empty()).map(|s| format!("subject:{s}"));
        [Some(self.text.clone()), subject]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("+")
    }
}

/// A normalized catalog hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    /// HTML as delivered by the catalog; may be empty.
    pub description: String,
    pub thumbnail: Option<String>,
    pub published_date: String,
    pub categories: Vec<String>,
    pub average_rating: Option<f32>,
    pub ratings_count: u32,
    pub page_count: u32,
    pub language: Option<String>,
    pub preview_link: Option<String>,
    pub info_link: Option<String>,
    pub publisher: Option<String>,
    pub isbn: Option<String>,
}

impl CatalogItem {
    /// Description with markup removed and whitespace collapsed.
    pub fn description_text(&self) -> String { crate::text::html_to_text(&self.description) }
}

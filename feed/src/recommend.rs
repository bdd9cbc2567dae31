use crate::error::FeedResult;
use crate::model::{CatalogItem, CatalogQuery, SortMode, RECOMMENDATION_LIMIT};
use crate::source::CatalogSource;
use crate::volume::RawVolume;

/// Message shown in place of recommendations when their request fails.
pub const RECOMMENDATIONS_FAILED: &str = "Failed to fetch recommendations";

/// Build the single recommendation query from most-recent-first search
/// history and the user's favorite categories. `None` when both are empty.
pub fn recommendation_query(history: &[String], favorites: &[String]) -> Option<CatalogQuery> {
    let favorite = favorites.iter().map(|f| f.trim()).find(|f| !f.is_empty());
    let primary = history.first().map(|h| h.trim()).filter(|h| !h.is_empty()).or(favorite)?;
    Some(CatalogQuery {
        text: primary.to_string(),
        subject: favorite.map(str::to_string),
        sort: SortMode::Relevance,
        offset: 0,
        limit: RECOMMENDATION_LIMIT,
    })
}

/// One uncached catalog request for the recommendation list.
pub async fn recommend<S: CatalogSource>(source: &S, history: &[String], favorites: &[String]) -> FeedResult<Vec<CatalogItem>> {
    let Some(query) = recommendation_query(history, favorites) else {
        return Ok(Vec::new());
    };
    tracing::debug!(q = %query.q(), "fetching recommendations");
    let raw = source.search(&query).await?;
    Ok(raw.into_iter().map(RawVolume::normalize).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &[&str]) -> Vec<String> { v.iter().map(|x| x.to_string()).collect() }

    #[test]
    fn most_recent_search_wins() {
        let q = recommendation_query(&s(&["dune", "emma"]), &s(&["Fiction", "Mystery"])).unwrap();
        assert_eq!(q.q(), "dune+subject:Fiction");
        assert_eq!(q.limit, 10);
        assert_eq!(q.sort, SortMode::Relevance);
    }

    #[test]
    fn falls_back_to_first_favorite() {
        let q = recommendation_query(&[], &s(&["Poetry"])).unwrap();
        assert_eq!(q.q(), "Poetry+subject:Poetry");
    }

    #[test]
    fn history_without_favorites() {
        let q = recommendation_query(&s(&["emma"]), &[]).unwrap();
        assert_eq!(q.q(), "emma");
    }

    #[test]
    fn nothing_to_go_on() {
        assert_eq!(recommendation_query(&[], &[]), None);
    }
}

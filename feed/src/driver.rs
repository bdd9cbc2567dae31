use crate::history::SearchHistory;
use crate::model::SessionKey;
use crate::pager::{Completion, FeedSnapshot, LoadStep, Pager};
use crate::scroll::ScrollTrigger;
use crate::source::CatalogSource;
use parking_lot::Mutex;
use std::sync::Arc;

/// Async driver around a [`Pager`]: owns the pager and the scroll trigger,
/// talks to the catalog, and records initial searches in the query history.
///
/// Locks are never held across a catalog request, so loads for different
/// pages may overlap; the pager's in-flight set keeps same-page loads apart.
pub struct Feed<S> {
    source: Arc<S>,
    pager: Mutex<Pager>,
    trigger: Mutex<ScrollTrigger>,
    searches: Arc<Mutex<SearchHistory>>,
}

impl<S: CatalogSource> Feed<S> {
    pub fn new(source: Arc<S>, searches: Arc<Mutex<SearchHistory>>) -> Self {
        Self { source, pager: Mutex::new(Pager::new()), trigger: Mutex::new(ScrollTrigger::new()), searches }
    }

    pub fn source(&self) -> &Arc<S> { &self.source }

    /// Apply a session key; on change, or after an error, the results reset and page 0 loads.
    pub async fn set_session(&self, key: SessionKey) -> FeedSnapshot {
        let step = self.pager.lock().set_session(key);
        if let Some(step) = step {
            self.trigger.lock().rearm();
            self.run(step, true).await;
        }
        self.snapshot()
    }

    pub async fn load_page(&self, page: usize, initial: bool) -> LoadStep {
        let step = self.pager.lock().begin_load(page, initial);
        self.run(step.clone(), initial).await;
        step
    }

    /// Load the next page if the pager's gate is open.
    pub async fn advance(&self) -> Option<LoadStep> {
        let step = self.pager.lock().advance();
        if let Some(step) = step.clone() {
            self.run(step, false).await;
        }
        step
    }

    /// Feed a sentinel visibility observation. Returns whether it advanced.
    pub async fn sentinel(&self, visible: bool) -> bool {
        let fire = {
            let pager = self.pager.lock();
            self.trigger.lock().observe(visible, pager.can_advance())
        };
        fire && self.advance().await.is_some()
    }

    pub fn snapshot(&self) -> FeedSnapshot { self.pager.lock().snapshot() }

    /// Run `f` against the pager under its lock.
    pub fn with_pager<R>(&self, f: impl FnOnce(&Pager) -> R) -> R { f(&*self.pager.lock()) }

    async fn run(&self, step: LoadStep, initial: bool) {
        match step {
            LoadStep::Cached { .. } => {
                if initial { self.record_search(); }
                self.trigger.lock().rearm();
            }
            LoadStep::Fetch(ticket) => {
                if ticket.initial { self.searches.lock().add_query(&ticket.key.session.search); }
                let query = ticket.query();
                tracing::debug!(q = %query.q(), offset = query.offset, limit = query.limit, "fetching page");
                let result = self.source.search(&query).await;
                let outcome = self.pager.lock().complete(ticket, result);
                if outcome != Completion::Stale {
                    self.trigger.lock().rearm();
                }
            }
            LoadStep::Skipped | LoadStep::InFlight => {}
        }
    }

    fn record_search(&self) {
        let search = self.pager.lock().session().search.clone();
        self.searches.lock().add_query(&search);
    }
}

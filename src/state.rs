use std::collections::HashSet;
use log::{debug, info, warn};
use crate::catalog::{Catalog, Section};
use crate::executor::LaunchAction;
use crate::matcher::FuzzyMatcher;
use crate::model::CatalogEntry;
use crate::recency::RecencyTracker;

pub const RECENT_TITLE: &str = "Recent";

/// The query text plus a counter bumped on every change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryState {
    pub text: String,
    pub generation: u64,
}

/// What the launcher should currently show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    /// No query: recently used entries, then the rest by category.
    Idle {
        recent: Vec<CatalogEntry>,
        sections: Vec<Section>,
    },
    /// Ranked matches for a query.
    Results {
        query: String,
        entries: Vec<CatalogEntry>,
    },
}

impl Default for View {
    fn default() -> Self {
        View::Idle { recent: Vec::new(), sections: Vec::new() }
    }
}

impl View {
    /// Entries in display order.
    pub fn visible(&self) -> Vec<&CatalogEntry> {
        match self {
            View::Idle { recent, sections } => recent
                .iter()
                .chain(sections.iter().flat_map(|s| s.entries.iter()))
                .collect(),
            View::Results { entries, .. } => entries.iter().collect(),
        }
    }

    /// Titled sections in display order; a search view is one untitled block.
    pub fn sections(&self) -> Vec<(&str, &[CatalogEntry])> {
        match self {
            View::Idle { recent, sections } => {
                let mut out: Vec<(&str, &[CatalogEntry])> = Vec::new();
                if !recent.is_empty() {
                    out.push((RECENT_TITLE, recent.as_slice()));
                }
                out.extend(sections.iter().map(|s| (s.title.as_str(), s.entries.as_slice())));
                out
            }
            View::Results { entries, .. } => vec![("", entries.as_slice())],
        }
    }
}

type Listener = Box<dyn FnMut(&View)>;

/// Owns the query, catalog and recency list, and publishes views.
///
/// Searches are two-step: `set_query` hands back a generation for the
/// caller to schedule, and `run_search` only publishes if that generation
/// is still current.
pub struct QueryPipeline {
    catalog: Catalog,
    query: QueryState,
    published_generation: u64,
    recency: RecencyTracker,
    launcher: Box<dyn LaunchAction>,
    view: View,
    selected_index: usize,
    listeners: Vec<Listener>,
}

impl QueryPipeline {
    pub fn new(recency: RecencyTracker, launcher: Box<dyn LaunchAction>) -> Self {
        let mut pipeline = Self {
            catalog: Catalog::default(),
            query: QueryState::default(),
            published_generation: 0,
            recency,
            launcher,
            view: View::default(),
            selected_index: 0,
            listeners: Vec::new(),
        };
        pipeline.view = pipeline.idle_view();
        pipeline
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn current_results(&self) -> &View {
        &self.view
    }

    pub fn on_results_changed(&mut self, listener: impl FnMut(&View) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// True while a scheduled search for the current text has not run yet.
    pub fn search_pending(&self) -> bool {
        !self.query.text.is_empty() && self.published_generation != self.query.generation
    }

    pub fn set_entries(&mut self, entries: Vec<CatalogEntry>) {
        self.catalog = Catalog::new(entries);
        if self.catalog.is_empty() {
            warn!("QueryPipeline: catalog refreshed with no entries");
        } else {
            info!("QueryPipeline: catalog refreshed, {} entries", self.catalog.len());
        }

        if self.query.text.is_empty() {
            self.publish(self.idle_view());
        } else if !self.search_pending() {
            // Results are current for this text; re-rank against the new catalog.
            // A pending search will pick up the new catalog when it fires.
            self.publish(self.search_view());
        }
    }

    /// Updates the query text.
    ///
    /// Returns the generation to schedule a search for. `None` means there
    /// is nothing to schedule: the text is unchanged, or it became empty and
    /// the idle view was published right away.
    pub fn set_query(&mut self, text: &str) -> Option<u64> {
        if text == self.query.text {
            return None;
        }
        self.query.text = text.to_string();
        self.query.generation += 1;
        debug!("QueryPipeline: query={:?} generation={}", self.query.text, self.query.generation);

        if self.query.text.is_empty() {
            self.published_generation = self.query.generation;
            self.publish(self.idle_view());
            None
        } else {
            Some(self.query.generation)
        }
    }

    /// Runs a scheduled search. Stale generations publish nothing.
    pub fn run_search(&mut self, generation: u64) -> bool {
        if generation != self.query.generation || self.query.text.is_empty() {
            debug!(
                "QueryPipeline: discarding stale search {} (current {})",
                generation, self.query.generation
            );
            return false;
        }
        self.published_generation = generation;
        self.publish(self.search_view());
        true
    }

    /// Launches `id`, records it as recent and returns to the idle view.
    pub fn select(&mut self, id: &str) -> bool {
        if self.catalog.get(id).is_none() {
            warn!("QueryPipeline: ignoring selection of unknown id {:?}", id);
            return false;
        }

        if let Err(e) = self.launcher.invoke(id) {
            log::error!("Launch of {:?} failed: {}", id, e);
        }
        self.recency.record_use(id);

        let was_idle = self.query.text.is_empty();
        self.set_query("");
        if was_idle {
            // set_query was a no-op, but the recent list changed
            self.publish(self.idle_view());
        }
        true
    }

    /// Activates the highlighted entry, which is the first one unless moved.
    pub fn confirm(&mut self) -> bool {
        match self.selected().map(|entry| entry.id.clone()) {
            Some(id) => self.select(&id),
            None => false,
        }
    }

    pub fn move_selection(&mut self, delta: i32) {
        let len = self.view.visible().len();
        if len == 0 {
            self.selected_index = 0;
            return;
        }

        let len = len as i64;
        self.selected_index = (self.selected_index as i64 + delta as i64).rem_euclid(len) as usize;
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn selected(&self) -> Option<&CatalogEntry> {
        self.view.visible().get(self.selected_index).copied()
    }

    fn idle_view(&self) -> View {
        let recent: Vec<CatalogEntry> = self.recency
            .current_list()
            .iter()
            .filter_map(|id| self.catalog.get(id).cloned())
            .collect();

        let exclude: HashSet<&str> = recent.iter().map(|e| e.id.as_str()).collect();
        let sections = self.catalog.group_by_category(&exclude);

        View::Idle { recent, sections }
    }

    fn search_view(&self) -> View {
        let entries = FuzzyMatcher::rank(&self.query.text, &self.catalog)
            .into_iter()
            .map(|result| result.entry)
            .collect();

        View::Results {
            query: self.query.text.clone(),
            entries,
        }
    }

    fn publish(&mut self, view: View) {
        info!("QueryPipeline: query={:?}, visible_count={}", self.query.text, view.visible().len());
        self.view = view;
        self.selected_index = 0;
        for listener in self.listeners.iter_mut() {
            listener(&self.view);
        }
    }
}

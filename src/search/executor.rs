use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Instant, SystemTime};
use parking_lot::RwLock;
use crate::core::config::{Config, QueryConfig, SourceMode};
use crate::core::error::Result;
use crate::core::stats::EngineStats;
use crate::core::types::Record;
use crate::query::ast::Query;
use crate::query::cache::{CacheStats, QueryCache, QueryKey};
use crate::query::matcher::RecordMatcher;
use crate::reader::loader::Dataset;
use crate::reader::source::{RecordSource, ScanScope};
use crate::reader::streaming::ChunkedSource;
use crate::scoring::ranker::RankerRegistry;
use crate::search::facets::{FacetIndexer, FilterOptions};
use crate::search::results::{Pagination, ResultPage};
use crate::search::selector::TopKSelector;
use crate::search::summary::PageSummary;

/// Answers table queries over a record source, with a result cache
pub struct QueryEngine {
    source: Arc<dyn RecordSource>,
    config: QueryConfig,
    selector: TopKSelector,
    rankers: RankerRegistry,
    cache: QueryCache,
    filter_options: RwLock<Option<Arc<FilterOptions>>>,
    queries_served: AtomicU64,
    start_time: SystemTime,
    started: Instant,
}

impl QueryEngine {
    pub fn new(source: Arc<dyn RecordSource>, config: &Config) -> Self {
        QueryEngine {
            source,
            config: config.query.clone(),
            selector: TopKSelector::new(config.selection.clone()),
            rankers: RankerRegistry::default(),
            cache: QueryCache::new(config.query.cache_capacity),
            filter_options: RwLock::new(None),
            queries_served: AtomicU64::new(0),
            start_time: SystemTime::now(),
            started: Instant::now(),
        }
    }

    /// Open the configured data directory in the configured mode.
    pub fn open(config: &Config) -> Result<Self> {
        let source: Arc<dyn RecordSource> = match config.data.mode {
            SourceMode::InMemory => Arc::new(Dataset::load(&config.data)?),
            SourceMode::Streaming => Arc::new(ChunkedSource::open(&config.data)?),
        };
        Ok(Self::new(source, config))
    }

    pub fn with_rankers(mut self, rankers: RankerRegistry) -> Self {
        self.rankers = rankers;
        self
    }

    pub fn source(&self) -> &Arc<dyn RecordSource> {
        &self.source
    }

    pub fn query(&self, query: &Query) -> Result<ResultPage> {
        self.queries_served.fetch_add(1, Ordering::Relaxed);

        let query = query.clone().clamped(self.config.max_page_size);
        let key = QueryKey::from_query(&query)?;
        if let Some(page) = self.cache.get(&key) {
            tracing::debug!(key = key.as_str(), "query cache hit");
            return Ok(page);
        }

        let started = Instant::now();
        let page = self.execute(&query)?;
        tracing::debug!(
            total = page.pagination.total_items,
            returned = page.len(),
            capped = page.capped,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "query executed"
        );

        if let Some(evicted) = self.cache.put(key, page.clone()) {
            tracing::trace!(key = evicted.as_str(), "query cache eviction");
        }
        Ok(page)
    }

    /// Totals over the page the query selects.
    pub fn summary(&self, query: &Query) -> Result<PageSummary> {
        let page = self.query(query)?;
        Ok(PageSummary::from_records(page.data.iter().map(Arc::as_ref)))
    }

    fn execute(&self, query: &Query) -> Result<ResultPage> {
        let matcher = RecordMatcher::new(query);
        let budget = match self.source.mode() {
            SourceMode::Streaming => Some(query.page_size.saturating_mul(self.config.result_budget_factor)),
            SourceMode::InMemory => None,
        };

        let mut matched: Vec<Arc<Record>> = Vec::new();
        let flow = self.source.scan(ScanScope::All, &mut |record| {
            if matcher.matches(&record) {
                // Stop on the first match past the budget, so a break means more matches exist.
                if budget.is_some_and(|limit| matched.len() >= limit) {
                    return ControlFlow::Break(());
                }
                matched.push(record);
            }
            ControlFlow::Continue(())
        })?;

        let total = matched.len();
        let window = query.window();
        let comparator = self.rankers.comparator(query.sort_by, query.sort_order);

        let data = if comparator.is_ordered() {
            let selection = self
                .selector
                .select_window(&matched, window, |a, b| comparator.compare(a, b));
            tracing::trace!(path = ?selection.path, sort = comparator.name(), "window selected");
            selection.items
        } else {
            let end = window.end.min(total);
            let start = window.start.min(end);
            matched[start..end].to_vec()
        };

        let mut page = ResultPage::new(data, Pagination::new(query.page, query.page_size, total));
        page.capped = flow.is_break();
        Ok(page)
    }

    /// Distinct values for the filter menus, computed once.
    pub fn filter_options(&self) -> Result<Arc<FilterOptions>> {
        if let Some(options) = self.filter_options.read().as_ref() {
            return Ok(Arc::clone(options));
        }

        let mut slot = self.filter_options.write();
        if let Some(options) = slot.as_ref() {
            return Ok(Arc::clone(options));
        }

        let mut indexer = FacetIndexer::new();
        self.source.scan(ScanScope::Preview, &mut |record| {
            indexer.add(&record);
            ControlFlow::Continue(())
        })?;
        tracing::info!(records = indexer.records_seen(), "filter options indexed");

        let options = Arc::new(indexer.finish());
        *slot = Some(Arc::clone(&options));
        Ok(options)
    }

    /// Drop cached pages and filter options.
    pub fn invalidate(&self) {
        self.cache.clear();
        *self.filter_options.write() = None;
        tracing::info!("engine caches invalidated");
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            uptime_secs: self.started.elapsed().as_secs(),
            start_time: self.start_time,
            source_mode: self.source.mode(),
            source_files: self.source.files().len(),
            total_records: self.source.len_hint(),
            queries_served: self.queries_served.load(Ordering::Relaxed),
            cache_stats: self.cache.stats(),
            filter_options_cached: self.filter_options.read().is_some(),
        }
    }
}

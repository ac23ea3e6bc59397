use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use crate::core::types::Record;
use crate::query::ast::{SortKey, SortOrder};

/// Ranker trait: an ascending order over records for one sort key
pub trait Ranker: Send + Sync {
    fn compare(&self, a: &Record, b: &Record) -> Ordering;

    fn name(&self) -> &str;

    /// False when every pair compares equal, so sorting can be skipped.
    fn is_ordered(&self) -> bool {
        true
    }
}

/// Orders by the parsed Date column; unparseable dates come first.
pub struct DateRanker;

impl Ranker for DateRanker {
    fn compare(&self, a: &Record, b: &Record) -> Ordering {
        let left = a.date_millis().unwrap_or(i64::MIN);
        let right = b.date_millis().unwrap_or(i64::MIN);
        left.cmp(&right)
    }

    fn name(&self) -> &str {
        "date"
    }
}

/// Orders by Quantity, garbled quantities count as 0.
pub struct QuantityRanker;

impl Ranker for QuantityRanker {
    fn compare(&self, a: &Record, b: &Record) -> Ordering {
        a.quantity().cmp(&b.quantity())
    }

    fn name(&self) -> &str {
        "quantity"
    }
}

/// Customer name order ignoring case and accents.
///
/// Not locale-aware: folded names compare by code point, and names that fold
/// to the same key fall back to the lowercased spelling.
pub struct CustomerNameRanker;

impl Ranker for CustomerNameRanker {
    fn compare(&self, a: &Record, b: &Record) -> Ordering {
        a.name_collation()
            .cmp(b.name_collation())
            .then_with(|| a.name_key().cmp(b.name_key()))
    }

    fn name(&self) -> &str {
        "customerName"
    }
}

/// Every record ties; results keep source order.
pub struct UnorderedRanker;

impl Ranker for UnorderedRanker {
    fn compare(&self, _a: &Record, _b: &Record) -> Ordering {
        Ordering::Equal
    }

    fn name(&self) -> &str {
        "none"
    }

    fn is_ordered(&self) -> bool {
        false
    }
}

/// Sort key → ranker lookup table
pub struct RankerRegistry {
    rankers: HashMap<SortKey, Arc<dyn Ranker>>,
    fallback: Arc<dyn Ranker>,
}

impl RankerRegistry {
    pub fn empty() -> Self {
        RankerRegistry {
            rankers: HashMap::new(),
            fallback: Arc::new(UnorderedRanker),
        }
    }

    pub fn register(&mut self, key: SortKey, ranker: Arc<dyn Ranker>) {
        self.rankers.insert(key, ranker);
    }

    pub fn get(&self, key: SortKey) -> Option<&Arc<dyn Ranker>> {
        self.rankers.get(&key)
    }

    /// Comparator for a key and direction; unregistered keys leave records unordered.
    pub fn comparator(&self, key: SortKey, order: SortOrder) -> Comparator {
        let ranker = self.rankers.get(&key).unwrap_or(&self.fallback).clone();
        Comparator { ranker, order }
    }
}

impl Default for RankerRegistry {
    fn default() -> Self {
        let mut registry = RankerRegistry::empty();
        registry.register(SortKey::Date, Arc::new(DateRanker));
        registry.register(SortKey::Quantity, Arc::new(QuantityRanker));
        registry.register(SortKey::CustomerName, Arc::new(CustomerNameRanker));
        registry.register(SortKey::None, Arc::new(UnorderedRanker));
        registry
    }
}

/// A ranker bound to a direction.
///
/// Ties are broken by ingestion position (always ascending), which makes the
/// order total: a full sort and a partial selection agree element for element.
#[derive(Clone)]
pub struct Comparator {
    ranker: Arc<dyn Ranker>,
    order: SortOrder,
}

impl Comparator {
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        let primary = match self.order {
            SortOrder::Asc => self.ranker.compare(a, b),
            SortOrder::Desc => self.ranker.compare(a, b).reverse(),
        };
        primary.then_with(|| a.id().cmp(&b.id()))
    }

    pub fn is_ordered(&self) -> bool {
        self.ranker.is_ordered()
    }

    pub fn name(&self) -> &str {
        self.ranker.name()
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }
}

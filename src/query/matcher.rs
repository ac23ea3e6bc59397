use std::collections::HashSet;
use crate::core::types::Record;
use crate::core::utils::normalize_key;
use crate::query::ast::{AgeBucket, FilterSpec, Query};
use crate::schema::schema::{SalesField, CATEGORICAL_FIELDS};

/// Free-text search over customer name and phone number
#[derive(Debug, Clone)]
pub struct SearchMatcher {
    raw: String,
    lowered: String,
}

impl SearchMatcher {
    pub fn new(term: &str) -> Self {
        SearchMatcher {
            raw: term.to_string(),
            lowered: term.to_lowercase(),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.raw.is_empty()
    }

    /// Name match ignores case; phone numbers are compared as written.
    pub fn matches(&self, record: &Record) -> bool {
        if self.raw.is_empty() {
            return true;
        }
        record.name_key().contains(&self.lowered) || record.phone_number().contains(&self.raw)
    }
}

#[derive(Debug, Clone)]
struct CategoricalConstraint {
    field: SalesField,
    accepted: HashSet<String>,
}

/// Compiled per-field constraints
#[derive(Debug, Clone, Default)]
pub struct Constraints {
    categorical: Vec<CategoricalConstraint>,
    ages: Vec<AgeBucket>,
    years: Option<HashSet<i32>>,
}

/// A filter specification compiled into a single predicate
#[derive(Debug, Clone)]
pub enum FilterPredicate {
    MatchAll,
    Constrained(Box<Constraints>),
}

impl FilterPredicate {
    pub fn compile(spec: &FilterSpec) -> Self {
        let mut constraints = Constraints::default();

        for field in CATEGORICAL_FIELDS {
            let accepted: HashSet<String> = spec
                .categorical(field)
                .iter()
                .map(|v| normalize_key(v))
                .filter(|v| !v.is_empty())
                .collect();
            if !accepted.is_empty() {
                constraints.categorical.push(CategoricalConstraint { field, accepted });
            }
        }

        constraints.ages = spec.age_range.clone();

        if !spec.date_range.is_empty() {
            // Tokens that are not years stay in the filter and match nothing.
            let years = spec
                .date_range
                .iter()
                .filter_map(|y| y.trim().parse::<i32>().ok())
                .collect();
            constraints.years = Some(years);
        }

        if constraints.categorical.is_empty() && constraints.ages.is_empty() && constraints.years.is_none() {
            FilterPredicate::MatchAll
        } else {
            FilterPredicate::Constrained(Box::new(constraints))
        }
    }

    pub fn is_match_all(&self) -> bool {
        matches!(self, FilterPredicate::MatchAll)
    }

    pub fn matches(&self, record: &Record) -> bool {
        let constraints = match self {
            FilterPredicate::MatchAll => return true,
            FilterPredicate::Constrained(c) => c,
        };

        for constraint in &constraints.categorical {
            let key = record.categorical_key(constraint.field).unwrap_or("");
            if key.is_empty() || !constraint.accepted.contains(key) {
                return false;
            }
        }

        if !constraints.ages.is_empty() {
            match record.age() {
                Some(age) if constraints.ages.iter().any(|b| b.contains(age)) => {}
                _ => return false,
            }
        }

        if let Some(years) = &constraints.years {
            match record.year() {
                Some(year) if years.contains(&year) => {}
                _ => return false,
            }
        }

        true
    }
}

/// Search and filters combined, evaluated in one pass
#[derive(Debug, Clone)]
pub struct RecordMatcher {
    pub search: SearchMatcher,
    pub filter: FilterPredicate,
}

impl RecordMatcher {
    pub fn new(query: &Query) -> Self {
        RecordMatcher {
            search: SearchMatcher::new(&query.search),
            filter: FilterPredicate::compile(&query.filters),
        }
    }

    pub fn is_match_all(&self) -> bool {
        self.search.is_identity() && self.filter.is_match_all()
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.search.matches(record) && self.filter.matches(record)
    }
}

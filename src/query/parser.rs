use std::collections::HashMap;
use crate::core::config::QueryConfig;
use crate::core::utils::parse_leading_int;
use crate::query::ast::{AgeBucket, FilterSpec, Query, SortKey, SortOrder};
use crate::schema::schema::SalesField;

/// Query-string parameter of each categorical filter
const CATEGORICAL_PARAMS: [(&str, SalesField); 7] = [
    ("customerRegion", SalesField::CustomerRegion),
    ("gender", SalesField::Gender),
    ("productCategory", SalesField::ProductCategory),
    ("tags", SalesField::Tags),
    ("paymentMethod", SalesField::PaymentMethod),
    ("orderStatus", SalesField::OrderStatus),
    ("storeLocation", SalesField::StoreLocation),
];

/// Turns request parameters into a `Query`.
///
/// Parsing never fails: malformed numbers and unknown tokens fall back to
/// defaults or are dropped.
pub struct QueryParser {
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl QueryParser {
    pub fn new(config: &QueryConfig) -> Self {
        QueryParser {
            default_page_size: config.default_page_size,
            max_page_size: config.max_page_size,
        }
    }

    pub fn parse_map(&self, params: &HashMap<String, String>) -> Query {
        self.parse(|name| params.get(name).map(String::as_str))
    }

    pub fn parse<'a, F>(&self, param: F) -> Query
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        let mut filters = FilterSpec::new();
        for (name, field) in CATEGORICAL_PARAMS {
            if let Some(value) = param(name) {
                filters = filters.with_values(field, split_list(value));
            }
        }

        if let Some(value) = param("ageRange") {
            let buckets: Vec<AgeBucket> = split_list(value)
                .iter()
                .filter_map(|token| AgeBucket::parse(token))
                .collect();
            filters = filters.with_age(&buckets);
        }
        if let Some(value) = param("dateRange") {
            filters = filters.with_years(split_list(value));
        }

        // An unrecognized sort key disables sorting; an absent one sorts by date.
        let sort_by = match param("sortBy").map(str::trim) {
            None | Some("") => SortKey::Date,
            Some(key) => SortKey::parse(key).unwrap_or(SortKey::None),
        };
        let sort_order = param("sortOrder")
            .and_then(SortOrder::parse)
            .unwrap_or(SortOrder::Desc);

        let page = param("page")
            .and_then(parse_leading_int)
            .map(|p| p.max(1) as usize)
            .unwrap_or(1);
        let page_size = param("pageSize")
            .and_then(parse_leading_int)
            .map(|s| s.clamp(1, self.max_page_size.max(1) as i64) as usize)
            .unwrap_or(self.default_page_size);

        Query::new()
            .with_search(param("search").map(str::trim).unwrap_or_default())
            .with_filters(filters)
            .with_sort(sort_by, sort_order)
            .with_page(page, page_size)
            .clamped(self.max_page_size)
    }
}

impl Default for QueryParser {
    fn default() -> Self {
        Self::new(&QueryConfig::default())
    }
}

/// Comma-separated list, items trimmed, empty items dropped
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

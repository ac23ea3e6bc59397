use std::ops::Range;
use serde::{Serialize, Deserialize};
use crate::schema::schema::SalesField;

/// Sort key for query results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    Date,
    Quantity,
    CustomerName,
    None,
}

impl SortKey {
    pub fn parse(value: &str) -> Option<SortKey> {
        match value.trim() {
            "date" => Some(SortKey::Date),
            "quantity" => Some(SortKey::Quantity),
            "customerName" => Some(SortKey::CustomerName),
            "none" => Some(SortKey::None),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Date => "date",
            SortKey::Quantity => "quantity",
            SortKey::CustomerName => "customerName",
            SortKey::None => "none",
        }
    }
}

/// Sort order for query results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,   // Ascending: 0 → 9, A → Z
    Desc,  // Descending: 9 → 0, Z → A
}

impl SortOrder {
    pub fn parse(value: &str) -> Option<SortOrder> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }
}

/// Age bucket tokens accepted by the `ageRange` filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeBucket {
    #[serde(rename = "below18")]
    Below18,
    #[serde(rename = "18-25")]
    From18To25,
    #[serde(rename = "26-35")]
    From26To35,
    #[serde(rename = "36-45")]
    From36To45,
    #[serde(rename = "46-60")]
    From46To60,
    #[serde(rename = "60+")]
    From60,
}

impl AgeBucket {
    pub fn parse(token: &str) -> Option<AgeBucket> {
        match token.trim() {
            "below18" => Some(AgeBucket::Below18),
            "18-25" => Some(AgeBucket::From18To25),
            "26-35" => Some(AgeBucket::From26To35),
            "36-45" => Some(AgeBucket::From36To45),
            "46-60" => Some(AgeBucket::From46To60),
            "60+" => Some(AgeBucket::From60),
            _ => None,
        }
    }

    /// Inclusive bounds; `below18` is [0, 17], `60+` is unbounded above
    pub fn bounds(&self) -> (i64, Option<i64>) {
        match self {
            AgeBucket::Below18 => (0, Some(17)),
            AgeBucket::From18To25 => (18, Some(25)),
            AgeBucket::From26To35 => (26, Some(35)),
            AgeBucket::From36To45 => (36, Some(45)),
            AgeBucket::From46To60 => (46, Some(60)),
            AgeBucket::From60 => (60, None),
        }
    }

    pub fn contains(&self, age: i64) -> bool {
        let (low, high) = self.bounds();
        age >= low && high.is_none_or(|high| age <= high)
    }
}

/// Filter constraints. An empty list is no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSpec {
    pub customer_region: Vec<String>,
    pub gender: Vec<String>,
    pub age_range: Vec<AgeBucket>,
    pub product_category: Vec<String>,
    pub tags: Vec<String>,
    pub payment_method: Vec<String>,
    pub order_status: Vec<String>,
    pub store_location: Vec<String>,
    /// Calendar years, e.g. "2022"
    pub date_range: Vec<String>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.customer_region.is_empty()
            && self.gender.is_empty()
            && self.age_range.is_empty()
            && self.product_category.is_empty()
            && self.tags.is_empty()
            && self.payment_method.is_empty()
            && self.order_status.is_empty()
            && self.store_location.is_empty()
            && self.date_range.is_empty()
    }

    /// Accepted values for a categorical column; empty for other columns
    pub fn categorical(&self, field: SalesField) -> &[String] {
        match field {
            SalesField::CustomerRegion => &self.customer_region,
            SalesField::Gender => &self.gender,
            SalesField::ProductCategory => &self.product_category,
            SalesField::Tags => &self.tags,
            SalesField::PaymentMethod => &self.payment_method,
            SalesField::OrderStatus => &self.order_status,
            SalesField::StoreLocation => &self.store_location,
            _ => &[],
        }
    }

    fn categorical_mut(&mut self, field: SalesField) -> Option<&mut Vec<String>> {
        match field {
            SalesField::CustomerRegion => Some(&mut self.customer_region),
            SalesField::Gender => Some(&mut self.gender),
            SalesField::ProductCategory => Some(&mut self.product_category),
            SalesField::Tags => Some(&mut self.tags),
            SalesField::PaymentMethod => Some(&mut self.payment_method),
            SalesField::OrderStatus => Some(&mut self.order_status),
            SalesField::StoreLocation => Some(&mut self.store_location),
            _ => None,
        }
    }

    /// Add accepted values for a categorical column; other columns are ignored.
    pub fn with_values<I, S>(mut self, field: SalesField, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(list) = self.categorical_mut(field) {
            list.extend(values.into_iter().map(Into::into));
        }
        self
    }

    pub fn with_age(mut self, buckets: &[AgeBucket]) -> Self {
        self.age_range.extend_from_slice(buckets);
        self
    }

    pub fn with_years<I, S>(mut self, years: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.date_range.extend(years.into_iter().map(Into::into));
        self
    }
}

/// A complete table query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    pub search: String,
    pub filters: FilterSpec,
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
    pub page: usize,
    pub page_size: usize,
}

impl Default for Query {
    fn default() -> Self {
        Query {
            search: String::new(),
            filters: FilterSpec::default(),
            sort_by: SortKey::Date,
            sort_order: SortOrder::Desc,
            page: 1,
            page_size: 10,
        }
    }
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_filters(mut self, filters: FilterSpec) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_sort(mut self, sort_by: SortKey, sort_order: SortOrder) -> Self {
        self.sort_by = sort_by;
        self.sort_order = sort_order;
        self
    }

    pub fn with_page(mut self, page: usize, page_size: usize) -> Self {
        self.page = page;
        self.page_size = page_size;
        self
    }

    /// Page at least 1, page size within [1, max_page_size]
    pub fn clamped(mut self, max_page_size: usize) -> Self {
        self.page = self.page.max(1);
        self.page_size = self.page_size.clamp(1, max_page_size.max(1));
        self
    }

    /// Positions [start, end) of the requested page in the ordered result
    pub fn window(&self) -> Range<usize> {
        let start = self.page.saturating_sub(1).saturating_mul(self.page_size);
        start..start.saturating_add(self.page_size)
    }
}

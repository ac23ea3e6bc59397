use std::sync::Arc;
use serde::{Serialize, Deserialize};
use crate::core::types::Record;

/// Pagination envelope of a result page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(current_page: usize, page_size: usize, total_items: usize) -> Self {
        let page_size = page_size.max(1);
        Pagination {
            current_page,
            page_size,
            total_items,
            total_pages: total_items.div_ceil(page_size),
            has_next: current_page.saturating_mul(page_size) < total_items,
            has_prev: current_page > 1,
        }
    }
}

/// One page of query results
#[derive(Debug, Clone, Serialize)]
pub struct ResultPage {
    pub data: Vec<Arc<Record>>,
    pub pagination: Pagination,
    /// Totals stop at the streaming result budget
    #[serde(skip)]
    pub capped: bool,
}

impl ResultPage {
    pub fn new(data: Vec<Arc<Record>>, pagination: Pagination) -> Self {
        ResultPage { data, pagination, capped: false }
    }

    pub fn empty(pagination: Pagination) -> Self {
        ResultPage::new(Vec::new(), pagination)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

use std::collections::HashMap;
use serde::{Serialize, Deserialize};
use crate::core::types::Record;
use crate::schema::schema::SalesField;

/// Distinct values offered by each filter menu
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub customer_regions: Vec<String>,
    pub genders: Vec<String>,
    pub product_categories: Vec<String>,
    pub tags: Vec<String>,
    pub payment_methods: Vec<String>,
    pub store_locations: Vec<String>,
}

/// Columns that get a filter menu, in output order
pub const FACET_FIELDS: [SalesField; 6] = [
    SalesField::CustomerRegion,
    SalesField::Gender,
    SalesField::ProductCategory,
    SalesField::Tags,
    SalesField::PaymentMethod,
    SalesField::StoreLocation,
];

/// Collects distinct values per facet column.
///
/// Values are trimmed and deduplicated case-insensitively; the first casing
/// seen is the one reported.
pub struct FacetIndexer {
    // normalized key → first-seen trimmed value
    seen: [HashMap<String, String>; FACET_FIELDS.len()],
    records: usize,
}

impl FacetIndexer {
    pub fn new() -> Self {
        FacetIndexer {
            seen: Default::default(),
            records: 0,
        }
    }

    pub fn build<'a, I>(records: I) -> FilterOptions
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let mut indexer = FacetIndexer::new();
        for record in records {
            indexer.add(record);
        }
        indexer.finish()
    }

    pub fn add(&mut self, record: &Record) {
        self.records += 1;
        for (slot, field) in FACET_FIELDS.iter().enumerate() {
            let key = match record.categorical_key(*field) {
                Some(key) if !key.is_empty() => key,
                _ => continue,
            };
            if !self.seen[slot].contains_key(key) {
                let display = record.value(*field).trim().to_string();
                self.seen[slot].insert(key.to_string(), display);
            }
        }
    }

    pub fn records_seen(&self) -> usize {
        self.records
    }

    pub fn finish(self) -> FilterOptions {
        let [regions, genders, categories, tags, payments, locations] = self.seen.map(sorted_values);
        FilterOptions {
            customer_regions: regions,
            genders,
            product_categories: categories,
            tags,
            payment_methods: payments,
            store_locations: locations,
        }
    }
}

impl Default for FacetIndexer {
    fn default() -> Self {
        Self::new()
    }
}

fn sorted_values(map: HashMap<String, String>) -> Vec<String> {
    let mut values: Vec<String> = map.into_values().collect();
    values.sort();
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{RecordFields, RecordId};

    fn record(region: &str, gender: &str, tags: &str) -> Record {
        let fields = RecordFields::default()
            .with(SalesField::CustomerRegion, region)
            .with(SalesField::Gender, gender)
            .with(SalesField::Tags, tags);
        Record::new(RecordId(0), fields)
    }

    #[test]
    fn dedupes_case_insensitively_keeping_first_casing() {
        let records = [
            record(" North", "Male", "organic"),
            record("north ", "male", "Organic"),
            record("East", "Female", ""),
            record("NORTH", "  ", "fashion"),
        ];
        let options = FacetIndexer::build(records.iter());
        assert_eq!(options.customer_regions, vec!["East", "North"]);
        assert_eq!(options.genders, vec!["Female", "Male"]);
        assert_eq!(options.tags, vec!["fashion", "organic"]);
        assert!(options.payment_methods.is_empty());
    }

    #[test]
    fn no_data_gives_empty_lists() {
        let options = FacetIndexer::build(std::iter::empty::<&Record>());
        assert_eq!(options, FilterOptions::default());

        let json = serde_json::to_value(&options).unwrap();
        for key in ["customerRegions", "genders", "productCategories", "tags", "paymentMethods", "storeLocations"] {
            assert_eq!(json[key], serde_json::json!([]));
        }
    }

    #[test]
    fn counts_records() {
        let mut indexer = FacetIndexer::new();
        indexer.add(&record("a", "b", "c"));
        indexer.add(&record("a", "b", "c"));
        assert_eq!(indexer.records_seen(), 2);
        assert_eq!(indexer.finish().customer_regions, vec!["a"]);
    }
}

use serde::{Serialize, Serializer, Deserialize};
use chrono::Datelike;
use crate::core::utils::{collation_key, normalize_key, parse_date, parse_float, parse_leading_int};
use crate::schema::schema::{SalesField, CATEGORICAL_FIELDS};

/// Ingestion position of a record across all source files
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(pub u64);

impl RecordId {
    pub fn new(id: u64) -> Self {
        RecordId(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        RecordId(id)
    }
}

/// Raw column values exactly as read from the CSV
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordFields {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Customer Name")]
    pub customer_name: String,
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "Phone Number")]
    pub phone_number: String,
    #[serde(rename = "Product Name")]
    pub product_name: String,
    #[serde(rename = "Product Category")]
    pub product_category: String,
    #[serde(rename = "Quantity")]
    pub quantity: String,
    #[serde(rename = "Price per Unit")]
    pub price_per_unit: String,
    #[serde(rename = "Discount Percentage")]
    pub discount_percentage: String,
    #[serde(rename = "Final Amount")]
    pub final_amount: String,
    #[serde(rename = "Payment Method")]
    pub payment_method: String,
    #[serde(rename = "Order Status")]
    pub order_status: String,
    #[serde(rename = "Customer Region")]
    pub customer_region: String,
    #[serde(rename = "Store Location")]
    pub store_location: String,
    #[serde(rename = "Tags")]
    pub tags: String,
    #[serde(rename = "Age")]
    pub age: String,
}

impl RecordFields {
    pub fn get(&self, field: SalesField) -> &str {
        match field {
            SalesField::Date => &self.date,
            SalesField::CustomerName => &self.customer_name,
            SalesField::Gender => &self.gender,
            SalesField::PhoneNumber => &self.phone_number,
            SalesField::ProductName => &self.product_name,
            SalesField::ProductCategory => &self.product_category,
            SalesField::Quantity => &self.quantity,
            SalesField::PricePerUnit => &self.price_per_unit,
            SalesField::DiscountPercentage => &self.discount_percentage,
            SalesField::FinalAmount => &self.final_amount,
            SalesField::PaymentMethod => &self.payment_method,
            SalesField::OrderStatus => &self.order_status,
            SalesField::CustomerRegion => &self.customer_region,
            SalesField::StoreLocation => &self.store_location,
            SalesField::Tags => &self.tags,
            SalesField::Age => &self.age,
        }
    }

    pub fn set(&mut self, field: SalesField, value: impl Into<String>) {
        let value = value.into();
        match field {
            SalesField::Date => self.date = value,
            SalesField::CustomerName => self.customer_name = value,
            SalesField::Gender => self.gender = value,
            SalesField::PhoneNumber => self.phone_number = value,
            SalesField::ProductName => self.product_name = value,
            SalesField::ProductCategory => self.product_category = value,
            SalesField::Quantity => self.quantity = value,
            SalesField::PricePerUnit => self.price_per_unit = value,
            SalesField::DiscountPercentage => self.discount_percentage = value,
            SalesField::FinalAmount => self.final_amount = value,
            SalesField::PaymentMethod => self.payment_method = value,
            SalesField::OrderStatus => self.order_status = value,
            SalesField::CustomerRegion => self.customer_region = value,
            SalesField::StoreLocation => self.store_location = value,
            SalesField::Tags => self.tags = value,
            SalesField::Age => self.age = value,
        }
    }

    pub fn with(mut self, field: SalesField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }
}

/// Values derived from the raw columns once, at ingestion
#[derive(Debug, Clone, PartialEq)]
struct RecordKeys {
    date_millis: Option<i64>,
    year: Option<i32>,
    quantity: i64,
    age: Option<i64>,
    name: String,
    collation: String,
    categorical: [String; CATEGORICAL_FIELDS.len()],
}

impl RecordKeys {
    fn derive(fields: &RecordFields) -> Self {
        let date = parse_date(&fields.date);
        RecordKeys {
            date_millis: date.map(|d| d.timestamp_millis()),
            year: date.map(|d| d.year()),
            quantity: parse_leading_int(&fields.quantity).unwrap_or(0),
            age: parse_leading_int(&fields.age),
            name: fields.customer_name.to_lowercase(),
            collation: collation_key(&fields.customer_name),
            categorical: CATEGORICAL_FIELDS.map(|f| normalize_key(fields.get(f))),
        }
    }
}

/// One immutable sales row
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    id: RecordId,
    fields: RecordFields,
    keys: RecordKeys,
}

impl Record {
    pub fn new(id: RecordId, fields: RecordFields) -> Self {
        let keys = RecordKeys::derive(&fields);
        Record { id, fields, keys }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn fields(&self) -> &RecordFields {
        &self.fields
    }

    pub fn value(&self, field: SalesField) -> &str {
        self.fields.get(field)
    }

    pub fn customer_name(&self) -> &str {
        &self.fields.customer_name
    }

    pub fn phone_number(&self) -> &str {
        &self.fields.phone_number
    }

    /// Lowercased customer name
    pub fn name_key(&self) -> &str {
        &self.keys.name
    }

    /// Customer name with case and accents folded
    pub fn name_collation(&self) -> &str {
        &self.keys.collation
    }

    /// Epoch millis of the Date column; None when it does not parse
    pub fn date_millis(&self) -> Option<i64> {
        self.keys.date_millis
    }

    pub fn year(&self) -> Option<i32> {
        self.keys.year
    }

    /// Quantity, 0 when missing or garbled
    pub fn quantity(&self) -> i64 {
        self.keys.quantity
    }

    pub fn age(&self) -> Option<i64> {
        self.keys.age
    }

    /// Trimmed lowercase value of a categorical column
    pub fn categorical_key(&self, field: SalesField) -> Option<&str> {
        field
            .categorical_slot()
            .map(|slot| self.keys.categorical[slot].as_str())
    }

    pub fn price_per_unit(&self) -> f64 {
        parse_float(&self.fields.price_per_unit).unwrap_or(0.0)
    }

    pub fn discount_percentage(&self) -> f64 {
        parse_float(&self.fields.discount_percentage).unwrap_or(0.0)
    }

    pub fn final_amount(&self) -> f64 {
        parse_float(&self.fields.final_amount).unwrap_or(0.0)
    }
}

// A record serializes as its raw columns, keyed by the CSV header names.
impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

use serde::{Serialize, Deserialize};

/// How a column is interpreted at ingestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    Text,
    Number,
    Date,
    Categorical,
}

/// The fixed set of columns of the sales dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SalesField {
    Date,
    CustomerName,
    Gender,
    PhoneNumber,
    ProductName,
    ProductCategory,
    Quantity,
    PricePerUnit,
    DiscountPercentage,
    FinalAmount,
    PaymentMethod,
    OrderStatus,
    CustomerRegion,
    StoreLocation,
    Tags,
    Age,
}

/// Categorical columns, in the order filters are evaluated.
pub const CATEGORICAL_FIELDS: [SalesField; 7] = [
    SalesField::CustomerRegion,
    SalesField::Gender,
    SalesField::ProductCategory,
    SalesField::Tags,
    SalesField::PaymentMethod,
    SalesField::OrderStatus,
    SalesField::StoreLocation,
];

impl SalesField {
    pub const ALL: [SalesField; 16] = [
        SalesField::Date,
        SalesField::CustomerName,
        SalesField::Gender,
        SalesField::PhoneNumber,
        SalesField::ProductName,
        SalesField::ProductCategory,
        SalesField::Quantity,
        SalesField::PricePerUnit,
        SalesField::DiscountPercentage,
        SalesField::FinalAmount,
        SalesField::PaymentMethod,
        SalesField::OrderStatus,
        SalesField::CustomerRegion,
        SalesField::StoreLocation,
        SalesField::Tags,
        SalesField::Age,
    ];

    /// Column name as it appears in the CSV header
    pub fn header(&self) -> &'static str {
        match self {
            SalesField::Date => "Date",
            SalesField::CustomerName => "Customer Name",
            SalesField::Gender => "Gender",
            SalesField::PhoneNumber => "Phone Number",
            SalesField::ProductName => "Product Name",
            SalesField::ProductCategory => "Product Category",
            SalesField::Quantity => "Quantity",
            SalesField::PricePerUnit => "Price per Unit",
            SalesField::DiscountPercentage => "Discount Percentage",
            SalesField::FinalAmount => "Final Amount",
            SalesField::PaymentMethod => "Payment Method",
            SalesField::OrderStatus => "Order Status",
            SalesField::CustomerRegion => "Customer Region",
            SalesField::StoreLocation => "Store Location",
            SalesField::Tags => "Tags",
            SalesField::Age => "Age",
        }
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            SalesField::Date => FieldType::Date,
            SalesField::Quantity
            | SalesField::PricePerUnit
            | SalesField::DiscountPercentage
            | SalesField::FinalAmount
            | SalesField::Age => FieldType::Number,
            SalesField::CustomerName | SalesField::PhoneNumber | SalesField::ProductName => FieldType::Text,
            _ => FieldType::Categorical,
        }
    }

    pub fn from_header(name: &str) -> Option<SalesField> {
        let name = name.trim();
        SalesField::ALL.iter().copied().find(|f| f.header() == name)
    }

    /// Position in the categorical key table of a record
    pub fn categorical_slot(&self) -> Option<usize> {
        CATEGORICAL_FIELDS.iter().position(|f| f == self)
    }
}

/// Header inspection result for a CSV file
#[derive(Debug, Clone, Serialize)]
pub struct HeaderReport {
    pub recognized: Vec<SalesField>,
    pub missing: Vec<SalesField>,
    pub unknown: Vec<String>,
}

impl HeaderReport {
    pub fn from_headers<'a, I>(headers: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut recognized = Vec::new();
        let mut unknown = Vec::new();

        for name in headers {
            match SalesField::from_header(name) {
                Some(field) => recognized.push(field),
                None => unknown.push(name.to_string()),
            }
        }

        let missing = SalesField::ALL
            .iter()
            .copied()
            .filter(|f| !recognized.contains(f))
            .collect();

        HeaderReport { recognized, missing, unknown }
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use salesgrid::core::config::Config;
use salesgrid::core::types::RecordFields;
use salesgrid::reader::Dataset;
use salesgrid::schema::schema::SalesField;
use salesgrid::search::executor::QueryEngine;

pub fn row(name: &str, date: &str, quantity: &str) -> RecordFields {
    RecordFields::default()
        .with(SalesField::CustomerName, name)
        .with(SalesField::Date, date)
        .with(SalesField::Quantity, quantity)
}

/// Twelve rows covering every filter column
pub fn sample_rows() -> Vec<RecordFields> {
    let regions = ["North", " mumbai ", "South", "East"];
    let genders = ["Male", "Female"];
    let categories = ["Electronics", "Clothing", "Beauty"];
    let payments = ["UPI", "Cash", "Credit Card"];
    let ages = ["17", "22", "30", "41", "59", "60", "61", "35", "abc", "45", "18", "70"];

    (0..12)
        .map(|i| {
            row(
                &format!("Customer {:02}", i),
                &format!("{}-{:02}-15", 2021 + (i % 3), 1 + i % 12),
                &(1 + i % 5).to_string(),
            )
            .with(SalesField::PhoneNumber, format!("98765{:05}", i))
            .with(SalesField::CustomerRegion, regions[i % regions.len()])
            .with(SalesField::Gender, genders[i % genders.len()])
            .with(SalesField::ProductCategory, categories[i % categories.len()])
            .with(SalesField::PaymentMethod, payments[i % payments.len()])
            .with(SalesField::Tags, if i % 2 == 0 { "organic" } else { "gadgets" })
            .with(SalesField::OrderStatus, "Completed")
            .with(SalesField::StoreLocation, if i < 6 { "Delhi" } else { "Pune" })
            .with(SalesField::Age, ages[i])
            .with(SalesField::PricePerUnit, "100")
            .with(SalesField::DiscountPercentage, "10")
            .with(SalesField::FinalAmount, format!("{}", 90 * (1 + i % 5)))
        })
        .collect()
}

pub fn engine_with(rows: Vec<RecordFields>, config: &Config) -> QueryEngine {
    QueryEngine::new(Arc::new(Dataset::from_fields(rows)), config)
}

pub fn engine(rows: Vec<RecordFields>) -> QueryEngine {
    engine_with(rows, &Config::default())
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Write rows as a CSV file with the full header.
pub fn write_csv(path: &Path, rows: &[RecordFields]) -> PathBuf {
    let header: Vec<&str> = SalesField::ALL.iter().map(|field| field.header()).collect();
    let mut body = header.join(",");
    body.push('\n');
    for fields in rows {
        let line: Vec<String> = SalesField::ALL
            .iter()
            .map(|field| csv_field(fields.get(*field)))
            .collect();
        body.push_str(&line.join(","));
        body.push('\n');
    }
    fs::write(path, body).unwrap();
    path.to_path_buf()
}

pub fn names(page: &salesgrid::search::results::ResultPage) -> Vec<String> {
    page.data.iter().map(|r| r.customer_name().to_string()).collect()
}

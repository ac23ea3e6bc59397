use serde::{Serialize, Deserialize};
use crate::core::types::Record;

/// Totals shown above the results table
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSummary {
    pub total_units: i64,
    pub total_sales: f64,
    pub total_discount: f64,
}

impl PageSummary {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a Record>,
    {
        records.into_iter().fold(PageSummary::default(), |mut acc, record| {
            let quantity = record.quantity();
            acc.total_units = acc.total_units.saturating_add(quantity);
            acc.total_sales += record.final_amount();
            acc.total_discount +=
                record.price_per_unit() * quantity as f64 * record.discount_percentage() / 100.0;
            acc
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{RecordFields, RecordId};
    use crate::schema::schema::SalesField;

    fn sale(quantity: &str, price: &str, discount: &str, amount: &str) -> Record {
        let fields = RecordFields::default()
            .with(SalesField::Quantity, quantity)
            .with(SalesField::PricePerUnit, price)
            .with(SalesField::DiscountPercentage, discount)
            .with(SalesField::FinalAmount, amount);
        Record::new(RecordId(0), fields)
    }

    #[test]
    fn sums_units_sales_and_discount() {
        let records = [sale("2", "100", "10", "180"), sale("1", "50", "0", "50")];
        let summary = PageSummary::from_records(records.iter());
        assert_eq!(summary.total_units, 3);
        assert!((summary.total_sales - 230.0).abs() < 1e-9);
        assert!((summary.total_discount - 20.0).abs() < 1e-9);
    }

    #[test]
    fn garbled_numbers_count_as_zero() {
        let records = [sale("x", "?", "", "n/a")];
        assert_eq!(PageSummary::from_records(records.iter()), PageSummary::default());
        assert_eq!(PageSummary::from_records(std::iter::empty::<&Record>()), PageSummary::default());
    }

    #[test]
    fn huge_quantities_saturate() {
        let huge = "99999999999999999999";
        let records = [sale(huge, "0", "0", "0"), sale(huge, "0", "0", "0"), sale("5", "0", "0", "0")];
        let summary = PageSummary::from_records(records.iter());
        assert_eq!(summary.total_units, i64::MAX);
    }
}

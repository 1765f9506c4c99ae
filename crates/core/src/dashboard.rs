//! Client-side dashboard aggregation.
//!
//! The backend exposes a combined snapshot endpoint, but the individual
//! charts are also derivable locally from plain entity lists; both paths
//! use the shapes below.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::invoice::Invoice;
use crate::domain::lead::{Lead, OpportunitySummary};
use crate::domain::product::Product;

const UNKNOWN_BUCKET: &str = "unknown";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSlice {
    pub source: String,
    pub value: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySlice {
    pub category: String,
    pub value: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSlice {
    pub stage: String,
    pub value: u64,
}

/// Mirror of the dashboard endpoint payload.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardSnapshot {
    pub total_leads: u64,
    pub total_opportunities: u64,
    pub total_customers: u64,
    pub total_sales: Decimal,
    pub average_order_value: Decimal,
    pub leads_by_source: Vec<SourceSlice>,
    pub products_by_category: Vec<CategorySlice>,
    pub opportunities_by_stage: Vec<StageSlice>,
    pub customer_growth: f64,
    pub lead_growth: f64,
    pub sales_growth: f64,
}

fn count_buckets<'a, I>(keys: I) -> Vec<(String, u64)>
where
    I: Iterator<Item = Option<&'a str>>,
{
    // BTreeMap keeps chart ordering stable between refreshes.
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for key in keys {
        let bucket = key.map(str::trim).filter(|key| !key.is_empty()).unwrap_or(UNKNOWN_BUCKET);
        *counts.entry(bucket.to_string()).or_default() += 1;
    }
    counts.into_iter().collect()
}

pub fn leads_by_source(leads: &[Lead]) -> Vec<SourceSlice> {
    count_buckets(leads.iter().map(|lead| lead.source.as_deref()))
        .into_iter()
        .map(|(source, value)| SourceSlice { source, value })
        .collect()
}

pub fn products_by_category(products: &[Product]) -> Vec<CategorySlice> {
    count_buckets(products.iter().map(|product| product.category.as_deref()))
        .into_iter()
        .map(|(category, value)| CategorySlice { category, value })
        .collect()
}

pub fn opportunities_by_stage(opportunities: &[OpportunitySummary]) -> Vec<StageSlice> {
    count_buckets(opportunities.iter().map(|opportunity| opportunity.stage.as_deref()))
        .into_iter()
        .map(|(stage, value)| StageSlice { stage, value })
        .collect()
}

pub fn total_sales(invoices: &[Invoice]) -> Decimal {
    invoices.iter().map(|invoice| invoice.total).sum()
}

pub fn average_order_value(invoices: &[Invoice]) -> Decimal {
    if invoices.is_empty() {
        return Decimal::ZERO;
    }
    total_sales(invoices) / Decimal::from(invoices.len() as u64)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::domain::invoice::Invoice;
    use crate::domain::lead::{Lead, OpportunitySummary};

    use super::{
        average_order_value, leads_by_source, opportunities_by_stage, total_sales, SourceSlice,
        StageSlice,
    };

    fn lead(source: Option<&str>) -> Lead {
        Lead { id: None, name: None, source: source.map(str::to_string) }
    }

    fn invoice(total: i64) -> Invoice {
        Invoice {
            id: None,
            invoice_number: "INV-001".to_string(),
            title: "Invoice".to_string(),
            customer_name: None,
            employee_name: None,
            status: None,
            created_at: None,
            updated_at: None,
            invoice_date: None,
            due_date: None,
            amount: Decimal::new(total, 0),
            subtotal: Decimal::new(total, 0),
            discount: Decimal::ZERO,
            tax_rate: Decimal::ZERO,
            tax_amount: Decimal::ZERO,
            total: Decimal::new(total, 0),
            items: Vec::new(),
            opportunity_id: None,
            customer_id: None,
            quotation_id: None,
        }
    }

    #[test]
    fn leads_group_by_source_with_unknown_bucket() {
        let leads = vec![
            lead(Some("web")),
            lead(Some("referral")),
            lead(Some("web")),
            lead(None),
            lead(Some("  ")),
        ];

        assert_eq!(
            leads_by_source(&leads),
            vec![
                SourceSlice { source: "referral".to_string(), value: 1 },
                SourceSlice { source: "unknown".to_string(), value: 2 },
                SourceSlice { source: "web".to_string(), value: 2 },
            ]
        );
    }

    #[test]
    fn opportunity_stages_are_counted_in_stable_order() {
        let opportunities = vec![
            OpportunitySummary { id: None, stage: Some("WON".to_string()) },
            OpportunitySummary { id: None, stage: Some("OPEN".to_string()) },
            OpportunitySummary { id: None, stage: Some("WON".to_string()) },
        ];

        assert_eq!(
            opportunities_by_stage(&opportunities),
            vec![
                StageSlice { stage: "OPEN".to_string(), value: 1 },
                StageSlice { stage: "WON".to_string(), value: 2 },
            ]
        );
    }

    #[test]
    fn sales_totals_and_average() {
        let invoices = vec![invoice(100), invoice(300)];
        assert_eq!(total_sales(&invoices), Decimal::new(400, 0));
        assert_eq!(average_order_value(&invoices), Decimal::new(200, 0));
    }

    #[test]
    fn average_of_no_invoices_is_zero() {
        assert_eq!(average_order_value(&[]), Decimal::ZERO);
    }
}

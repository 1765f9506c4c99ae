use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::customer::CustomerId;
use crate::domain::product::Product;
use crate::domain::quotation::{OpportunityId, QuotationId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvoiceId(pub u64);

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub product: Option<Product>,
    pub quantity: Option<u32>,
    pub discount_percent: Option<Decimal>,
    pub description: Option<String>,
    pub rate: Option<Decimal>,
    pub amount: Option<Decimal>,
}

/// Invoice as returned by the billing endpoints. Produced by the backend
/// from an accepted quotation; never constructed locally.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Option<InvoiceId>,
    pub invoice_number: String,
    pub title: String,
    pub customer_name: Option<String>,
    pub employee_name: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub invoice_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub amount: Decimal,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
    pub items: Vec<InvoiceLine>,
    pub opportunity_id: Option<OpportunityId>,
    pub customer_id: Option<CustomerId>,
    pub quotation_id: Option<QuotationId>,
}

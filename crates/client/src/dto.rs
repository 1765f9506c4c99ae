//! Wire shapes for the REST backend.
//!
//! The backend payloads are loosely typed JSON; these DTOs pin down the
//! contract at the boundary. Absent optional values fall back through the
//! documented pricing defaults, while corrupt values (negative prices,
//! unparseable dates, unknown stages) are decode failures rather than
//! something to silently paper over deep in view code.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use dealdesk_core::domain::customer::CustomerId;
use dealdesk_core::domain::invoice::{Invoice, InvoiceId, InvoiceLine};
use dealdesk_core::domain::product::{Product, ProductId};
use dealdesk_core::domain::quotation::{
    OpportunityId, Quotation, QuotationId, QuotationLine, QuotationStage,
};
use dealdesk_core::source::SourceError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProductDto {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub status: Option<String>,
}

impl ProductDto {
    fn into_domain(self) -> Result<Product, SourceError> {
        let name = self
            .name
            .ok_or_else(|| SourceError::Decode("product is missing a name".to_string()))?;
        // Absent price prices the line at zero; a negative one is corrupt.
        let price = self.price.unwrap_or(Decimal::ZERO);
        if price < Decimal::ZERO {
            return Err(SourceError::Decode(format!(
                "product `{name}` has a negative price"
            )));
        }

        Ok(Product {
            id: self.id.map(ProductId),
            name,
            description: self.description,
            price,
            category: self.category,
            status: self.status,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuotationLineDto {
    pub product: Option<ProductDto>,
    pub product_id: Option<u64>,
    pub quantity: Option<u32>,
    pub discount: Option<Decimal>,
}

impl QuotationLineDto {
    fn into_domain(self) -> Result<QuotationLine, SourceError> {
        Ok(QuotationLine {
            product: self.product.map(ProductDto::into_domain).transpose()?,
            product_id: self.product_id.map(ProductId),
            quantity: self.quantity,
            discount_percent: self.discount,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuotationDto {
    pub id: Option<u64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub valid_until: Option<String>,
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub items: Vec<QuotationLineDto>,
    pub stage: Option<QuotationStage>,
    pub opportunity_id: Option<u64>,
}

impl QuotationDto {
    pub(crate) fn into_domain(self) -> Result<Quotation, SourceError> {
        let title = self
            .title
            .ok_or_else(|| SourceError::Decode("quotation is missing a title".to_string()))?;
        let valid_until = self.valid_until.as_deref().map(parse_wire_date).transpose()?;
        let items = self
            .items
            .into_iter()
            .map(QuotationLineDto::into_domain)
            .collect::<Result<Vec<_>, _>>()?;

        let mut quotation = Quotation {
            id: self.id.map(QuotationId),
            title,
            description: self.description,
            created_at: self.created_at,
            valid_until,
            amount: Decimal::ZERO,
            items,
            stage: self.stage.unwrap_or_default(),
            opportunity_id: self.opportunity_id.map(OpportunityId),
        };
        // The amount is derived; the wire value is informational only.
        quotation.recompute_amount();
        if let Some(wire_amount) = self.amount {
            if wire_amount != quotation.amount {
                warn!(
                    quotation_id = ?quotation.id,
                    %wire_amount,
                    recomputed = %quotation.amount,
                    "backend amount disagrees with line subtotals, using recomputed value"
                );
            }
        }

        Ok(quotation)
    }
}

/// Dates arrive either as a plain ISO date or a full timestamp.
fn parse_wire_date(value: &str) -> Result<NaiveDate, SourceError> {
    if let Ok(date) = value.parse::<NaiveDate>() {
        return Ok(date);
    }
    if let Ok(datetime) = value.parse::<DateTime<Utc>>() {
        return Ok(datetime.date_naive());
    }
    Err(SourceError::Decode(format!("unparseable date `{value}`")))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProductPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<u64>,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QuotationLinePayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    product: Option<ProductPayload<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    product_id: Option<u64>,
    quantity: u32,
    discount: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuotationPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<u64>,
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    valid_until: Option<NaiveDate>,
    amount: Decimal,
    items: Vec<QuotationLinePayload<'a>>,
    stage: QuotationStage,
    #[serde(skip_serializing_if = "Option::is_none")]
    opportunity_id: Option<u64>,
}

impl<'a> From<&'a Quotation> for QuotationPayload<'a> {
    fn from(quotation: &'a Quotation) -> Self {
        let items = quotation
            .items
            .iter()
            .map(|line| QuotationLinePayload {
                product: line.product.as_ref().map(|product| ProductPayload {
                    id: product.id.map(|ProductId(id)| id),
                    name: &product.name,
                    description: product.description.as_deref(),
                    price: product.price,
                    category: product.category.as_deref(),
                    status: product.status.as_deref(),
                }),
                product_id: line.product_id.map(|ProductId(id)| id),
                quantity: dealdesk_core::pricing::effective_quantity(line),
                discount: dealdesk_core::pricing::effective_discount_percent(line),
            })
            .collect();

        Self {
            id: quotation.id.map(|QuotationId(id)| id),
            title: &quotation.title,
            description: quotation.description.as_deref(),
            valid_until: quotation.valid_until,
            amount: quotation.amount,
            items,
            stage: quotation.stage,
            opportunity_id: quotation.opportunity_id.map(|OpportunityId(id)| id),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InvoiceLineDto {
    pub product: Option<ProductDto>,
    pub quantity: Option<u32>,
    pub discount: Option<Decimal>,
    pub description: Option<String>,
    pub rate: Option<Decimal>,
    pub amount: Option<Decimal>,
}

impl InvoiceLineDto {
    fn into_domain(self) -> Result<InvoiceLine, SourceError> {
        Ok(InvoiceLine {
            product: self.product.map(ProductDto::into_domain).transpose()?,
            quantity: self.quantity,
            discount_percent: self.discount,
            description: self.description,
            rate: self.rate,
            amount: self.amount,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InvoiceDto {
    pub id: Option<u64>,
    pub invoice_number: Option<String>,
    pub title: Option<String>,
    pub customer_name: Option<String>,
    pub employee_name: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub invoice_date: Option<String>,
    pub due_date: Option<String>,
    pub amount: Option<Decimal>,
    pub subtotal: Option<Decimal>,
    pub discount: Option<Decimal>,
    pub tax_rate: Option<Decimal>,
    pub tax_amount: Option<Decimal>,
    pub total: Option<Decimal>,
    #[serde(default)]
    pub items: Vec<InvoiceLineDto>,
    pub opportunity_id: Option<u64>,
    pub customer_id: Option<u64>,
    pub quotation_id: Option<u64>,
}

impl InvoiceDto {
    pub(crate) fn into_domain(self) -> Result<Invoice, SourceError> {
        let invoice_number = self.invoice_number.ok_or_else(|| {
            SourceError::Decode("invoice is missing an invoice number".to_string())
        })?;
        let items = self
            .items
            .into_iter()
            .map(InvoiceLineDto::into_domain)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Invoice {
            id: self.id.map(InvoiceId),
            invoice_number,
            title: self.title.unwrap_or_default(),
            customer_name: self.customer_name,
            employee_name: self.employee_name,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
            invoice_date: self.invoice_date.as_deref().map(parse_wire_date).transpose()?,
            due_date: self.due_date.as_deref().map(parse_wire_date).transpose()?,
            amount: self.amount.unwrap_or(Decimal::ZERO),
            subtotal: self.subtotal.unwrap_or(Decimal::ZERO),
            discount: self.discount.unwrap_or(Decimal::ZERO),
            tax_rate: self.tax_rate.unwrap_or(Decimal::ZERO),
            tax_amount: self.tax_amount.unwrap_or(Decimal::ZERO),
            total: self.total.unwrap_or(Decimal::ZERO),
            items,
            opportunity_id: self.opportunity_id.map(OpportunityId),
            customer_id: self.customer_id.map(CustomerId),
            quotation_id: self.quotation_id.map(QuotationId),
        })
    }
}

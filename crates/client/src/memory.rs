//! In-memory stand-in for the REST backend.
//!
//! Used by integration tests and the demo CLI mode. It enforces the same
//! stage rules the real backend does, reporting violations as HTTP-shaped
//! `Status` errors so callers exercise the exact failure paths they would
//! see over the wire.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use dealdesk_core::dashboard::DashboardSnapshot;
use dealdesk_core::domain::customer::CustomerId;
use dealdesk_core::domain::invoice::{Invoice, InvoiceId, InvoiceLine};
use dealdesk_core::domain::quotation::{OpportunityId, Quotation, QuotationId};
use dealdesk_core::pricing;
use dealdesk_core::source::{DashboardSource, InvoiceSource, QuotationSource, SourceError};

const STATUS_NOT_FOUND: u16 = 404;
const STATUS_CONFLICT: u16 = 409;

#[derive(Clone)]
struct StoredQuotation {
    quotation: Quotation,
    customer_email: Option<String>,
    customer_id: Option<CustomerId>,
}

#[derive(Default)]
struct State {
    next_quotation_id: u64,
    next_invoice_seq: u64,
    quotations: HashMap<QuotationId, StoredQuotation>,
    snapshot: Option<DashboardSnapshot>,
}

#[derive(Default)]
pub struct InMemorySource {
    state: RwLock<State>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a quotation under the given customer keys, assigning an id
    /// if it does not carry one.
    pub async fn seed_quotation(
        &self,
        mut quotation: Quotation,
        customer_email: Option<&str>,
        customer_id: Option<CustomerId>,
    ) -> QuotationId {
        let mut state = self.state.write().await;
        let id = match quotation.id {
            Some(id) => id,
            None => {
                state.next_quotation_id += 1;
                QuotationId(state.next_quotation_id)
            }
        };
        quotation.id = Some(id);
        state.quotations.insert(
            id,
            StoredQuotation {
                quotation,
                customer_email: customer_email.map(str::to_string),
                customer_id,
            },
        );
        id
    }

    pub async fn set_snapshot(&self, snapshot: DashboardSnapshot) {
        self.state.write().await.snapshot = Some(snapshot);
    }

    async fn mutate_stage<F>(&self, id: QuotationId, apply: F) -> Result<Quotation, SourceError>
    where
        F: FnOnce(&mut Quotation) -> Result<(), dealdesk_core::errors::DomainError>,
    {
        let mut state = self.state.write().await;
        let stored = state
            .quotations
            .get_mut(&id)
            .ok_or(SourceError::Status { status: STATUS_NOT_FOUND })?;
        apply(&mut stored.quotation)
            .map_err(|_| SourceError::Status { status: STATUS_CONFLICT })?;
        Ok(stored.quotation.clone())
    }
}

#[async_trait]
impl QuotationSource for InMemorySource {
    async fn list_by_email(&self, email: &str) -> Result<Vec<Quotation>, SourceError> {
        let state = self.state.read().await;
        Ok(state
            .quotations
            .values()
            .filter(|stored| {
                stored
                    .customer_email
                    .as_deref()
                    .is_some_and(|stored_email| stored_email.eq_ignore_ascii_case(email))
            })
            .map(|stored| stored.quotation.clone())
            .collect())
    }

    async fn list_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Quotation>, SourceError> {
        let state = self.state.read().await;
        Ok(state
            .quotations
            .values()
            .filter(|stored| stored.customer_id == Some(customer_id))
            .map(|stored| stored.quotation.clone())
            .collect())
    }

    async fn fetch_for_opportunity(
        &self,
        opportunity_id: OpportunityId,
    ) -> Result<Option<Quotation>, SourceError> {
        let state = self.state.read().await;
        Ok(state
            .quotations
            .values()
            .find(|stored| stored.quotation.opportunity_id == Some(opportunity_id))
            .map(|stored| stored.quotation.clone()))
    }

    async fn create(
        &self,
        opportunity_id: OpportunityId,
        mut quotation: Quotation,
    ) -> Result<Quotation, SourceError> {
        let mut state = self.state.write().await;
        state.next_quotation_id += 1;
        let id = QuotationId(state.next_quotation_id);

        quotation.id = Some(id);
        quotation.opportunity_id = Some(opportunity_id);
        quotation.created_at = Some(Utc::now());
        quotation.recompute_amount();

        let stored =
            StoredQuotation { quotation: quotation.clone(), customer_email: None, customer_id: None };
        state.quotations.insert(id, stored);
        Ok(quotation)
    }

    async fn update(
        &self,
        id: QuotationId,
        mut quotation: Quotation,
    ) -> Result<Quotation, SourceError> {
        let mut state = self.state.write().await;
        let stored = state
            .quotations
            .get_mut(&id)
            .ok_or(SourceError::Status { status: STATUS_NOT_FOUND })?;

        quotation.id = Some(id);
        if quotation.created_at.is_none() {
            quotation.created_at = stored.quotation.created_at;
        }
        quotation.recompute_amount();

        stored.quotation = quotation.clone();
        Ok(quotation)
    }

    async fn send(&self, id: QuotationId) -> Result<Quotation, SourceError> {
        self.mutate_stage(id, Quotation::send).await
    }

    async fn accept(&self, id: QuotationId) -> Result<Quotation, SourceError> {
        self.mutate_stage(id, Quotation::accept).await
    }

    async fn reject(&self, id: QuotationId) -> Result<Quotation, SourceError> {
        self.mutate_stage(id, Quotation::reject).await
    }
}

#[async_trait]
impl InvoiceSource for InMemorySource {
    async fn generate_from_quotation(&self, id: QuotationId) -> Result<Invoice, SourceError> {
        let mut state = self.state.write().await;
        let stored = state
            .quotations
            .get(&id)
            .ok_or(SourceError::Status { status: STATUS_NOT_FOUND })?
            .clone();

        stored
            .quotation
            .ensure_invoice_eligible()
            .map_err(|_| SourceError::Status { status: STATUS_CONFLICT })?;

        let items: Vec<InvoiceLine> = stored
            .quotation
            .items
            .iter()
            .map(|line| {
                let quantity = pricing::effective_quantity(line);
                let discount = pricing::effective_discount_percent(line);
                let rate = pricing::effective_unit_price(line)
                    * (Decimal::ONE - discount / Decimal::ONE_HUNDRED);
                InvoiceLine {
                    product: line.product.clone(),
                    quantity: Some(quantity),
                    discount_percent: Some(discount),
                    description: line.product.as_ref().map(|product| product.name.clone()),
                    rate: Some(rate),
                    amount: Some(pricing::line_item_amount(quantity, rate)),
                }
            })
            .collect();

        let totals = pricing::invoice_totals(&items, Decimal::ZERO, Decimal::ZERO);

        state.next_invoice_seq += 1;
        let seq = state.next_invoice_seq;

        Ok(Invoice {
            id: Some(InvoiceId(seq)),
            invoice_number: format!("INV-{seq:04}"),
            title: stored.quotation.title.clone(),
            customer_name: None,
            employee_name: None,
            status: Some("DRAFT".to_string()),
            created_at: Some(Utc::now()),
            updated_at: None,
            invoice_date: Some(Utc::now().date_naive()),
            due_date: stored.quotation.valid_until,
            amount: totals.total,
            subtotal: totals.subtotal,
            discount: Decimal::ZERO,
            tax_rate: Decimal::ZERO,
            tax_amount: totals.tax_amount,
            total: totals.total,
            items,
            opportunity_id: stored.quotation.opportunity_id,
            customer_id: stored.customer_id,
            quotation_id: Some(id),
        })
    }
}

#[async_trait]
impl DashboardSource for InMemorySource {
    async fn fetch_snapshot(&self) -> Result<DashboardSnapshot, SourceError> {
        let state = self.state.read().await;
        Ok(state.snapshot.clone().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use dealdesk_core::domain::customer::CustomerId;
    use dealdesk_core::domain::product::{Product, ProductId};
    use dealdesk_core::domain::quotation::{
        OpportunityId, Quotation, QuotationLine, QuotationStage,
    };
    use dealdesk_core::source::{InvoiceSource, QuotationSource, SourceError};

    use super::InMemorySource;

    fn quotation(title: &str) -> Quotation {
        Quotation {
            id: None,
            title: title.to_string(),
            description: None,
            created_at: None,
            valid_until: None,
            amount: Decimal::ZERO,
            items: vec![QuotationLine {
                product: Some(Product {
                    id: Some(ProductId(1)),
                    name: "CRM Seat".to_string(),
                    description: None,
                    price: Decimal::new(100, 0),
                    category: None,
                    status: None,
                }),
                product_id: Some(ProductId(1)),
                quantity: Some(2),
                discount_percent: Some(Decimal::new(10, 0)),
            }],
            stage: QuotationStage::Draft,
            opportunity_id: None,
        }
    }

    #[tokio::test]
    async fn lookups_filter_on_the_seeded_keys() {
        let source = InMemorySource::new();
        source
            .seed_quotation(quotation("Renewal"), Some("ada@example.com"), Some(CustomerId(42)))
            .await;
        source.seed_quotation(quotation("Other"), Some("bob@example.com"), None).await;

        let by_email = source.list_by_email("ADA@example.com").await.expect("lookup");
        assert_eq!(by_email.len(), 1);
        assert_eq!(by_email[0].title, "Renewal");

        let by_customer = source.list_by_customer(CustomerId(42)).await.expect("lookup");
        assert_eq!(by_customer.len(), 1);

        assert!(source.list_by_customer(CustomerId(7)).await.expect("lookup").is_empty());
    }

    #[tokio::test]
    async fn create_assigns_id_and_recomputes_amount() {
        let source = InMemorySource::new();
        let mut draft = quotation("New Deal");
        draft.amount = Decimal::new(999, 0);

        let saved = source.create(OpportunityId(5), draft).await.expect("create");
        assert!(saved.id.is_some());
        assert_eq!(saved.opportunity_id, Some(OpportunityId(5)));
        assert_eq!(saved.amount, Decimal::new(180, 0));

        let fetched = source
            .fetch_for_opportunity(OpportunityId(5))
            .await
            .expect("fetch")
            .expect("present");
        assert_eq!(fetched.id, saved.id);
        assert!(source.fetch_for_opportunity(OpportunityId(6)).await.expect("fetch").is_none());
    }

    #[tokio::test]
    async fn stage_violations_surface_as_conflicts() {
        let source = InMemorySource::new();
        let id = source.seed_quotation(quotation("Renewal"), None, None).await;

        source.send(id).await.expect("draft can be sent");
        let error = source.send(id).await.expect_err("second send must fail");
        assert_eq!(error, SourceError::Status { status: 409 });

        let accepted = source.accept(id).await.expect("sent can be accepted");
        assert_eq!(accepted.stage, QuotationStage::Accepted);
    }

    #[tokio::test]
    async fn unknown_ids_report_not_found() {
        let source = InMemorySource::new();
        let error = source
            .send(dealdesk_core::domain::quotation::QuotationId(99))
            .await
            .expect_err("nothing stored");
        assert_eq!(error, SourceError::Status { status: 404 });
    }

    #[tokio::test]
    async fn invoice_generation_requires_acceptance() {
        let source = InMemorySource::new();
        let id = source.seed_quotation(quotation("Renewal"), Some("ada@example.com"), None).await;

        let error = source.generate_from_quotation(id).await.expect_err("draft is not invoiceable");
        assert_eq!(error, SourceError::Status { status: 409 });

        source.send(id).await.expect("send");
        source.accept(id).await.expect("accept");

        let invoice = source.generate_from_quotation(id).await.expect("generate");
        assert_eq!(invoice.invoice_number, "INV-0001");
        assert_eq!(invoice.subtotal, Decimal::new(180, 0));
        assert_eq!(invoice.total, Decimal::new(180, 0));
        assert_eq!(invoice.quotation_id, Some(id));
        assert_eq!(invoice.items[0].amount, Some(Decimal::new(180, 0)));
    }
}

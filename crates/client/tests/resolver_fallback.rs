//! End-to-end flows against the in-memory backend: multi-key quotation
//! resolution with a degraded email index, and the full draft-to-invoice
//! lifecycle.

use async_trait::async_trait;
use rust_decimal::Decimal;

use dealdesk_client::InMemorySource;
use dealdesk_core::domain::customer::{CustomerId, CustomerKeys};
use dealdesk_core::domain::product::{Product, ProductId};
use dealdesk_core::domain::quotation::{
    OpportunityId, Quotation, QuotationId, QuotationLine, QuotationStage,
};
use dealdesk_core::resolver::{resolve_customer_quotations, LookupKey, Resolution};
use dealdesk_core::source::{InvoiceSource, QuotationSource, SourceError};

fn draft(title: &str) -> Quotation {
    let mut quotation = Quotation {
        id: None,
        title: title.to_string(),
        description: Some("Annual contract".to_string()),
        created_at: None,
        valid_until: None,
        amount: Decimal::ZERO,
        items: vec![
            QuotationLine {
                product: Some(Product {
                    id: Some(ProductId(1)),
                    name: "CRM Seat".to_string(),
                    description: None,
                    price: Decimal::new(100, 0),
                    category: Some("Software".to_string()),
                    status: None,
                }),
                product_id: Some(ProductId(1)),
                quantity: Some(2),
                discount_percent: Some(Decimal::new(10, 0)),
            },
            QuotationLine {
                product: Some(Product {
                    id: Some(ProductId(2)),
                    name: "Onboarding".to_string(),
                    description: None,
                    price: Decimal::new(50, 0),
                    category: Some("Services".to_string()),
                    status: None,
                }),
                product_id: Some(ProductId(2)),
                quantity: Some(1),
                discount_percent: None,
            },
        ],
        stage: QuotationStage::Draft,
        opportunity_id: None,
    };
    quotation.recompute_amount();
    quotation
}

/// Wraps a source and fails every email lookup, leaving the rest intact.
struct BrokenEmailIndex<S> {
    inner: S,
}

#[async_trait]
impl<S: QuotationSource> QuotationSource for BrokenEmailIndex<S> {
    async fn list_by_email(&self, _email: &str) -> Result<Vec<Quotation>, SourceError> {
        Err(SourceError::Status { status: 502 })
    }

    async fn list_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Quotation>, SourceError> {
        self.inner.list_by_customer(customer_id).await
    }

    async fn fetch_for_opportunity(
        &self,
        opportunity_id: OpportunityId,
    ) -> Result<Option<Quotation>, SourceError> {
        self.inner.fetch_for_opportunity(opportunity_id).await
    }

    async fn create(
        &self,
        opportunity_id: OpportunityId,
        quotation: Quotation,
    ) -> Result<Quotation, SourceError> {
        self.inner.create(opportunity_id, quotation).await
    }

    async fn update(&self, id: QuotationId, quotation: Quotation) -> Result<Quotation, SourceError> {
        self.inner.update(id, quotation).await
    }

    async fn send(&self, id: QuotationId) -> Result<Quotation, SourceError> {
        self.inner.send(id).await
    }

    async fn accept(&self, id: QuotationId) -> Result<Quotation, SourceError> {
        self.inner.accept(id).await
    }

    async fn reject(&self, id: QuotationId) -> Result<Quotation, SourceError> {
        self.inner.reject(id).await
    }
}

#[tokio::test]
async fn resolution_prefers_the_email_index() {
    let source = InMemorySource::new();
    source
        .seed_quotation(draft("Renewal"), Some("ada@example.com"), Some(CustomerId(42)))
        .await;

    let keys = CustomerKeys {
        email: Some("ada@example.com".to_string()),
        customer_id: Some(CustomerId(42)),
    };
    let resolution = resolve_customer_quotations(&source, &keys).await.expect("resolves");

    match resolution {
        Resolution::Found { quotations, matched_by } => {
            assert_eq!(matched_by, LookupKey::Email);
            assert_eq!(quotations.len(), 1);
            assert_eq!(quotations[0].title, "Renewal");
        }
        Resolution::NoRecords => panic!("seeded quotation must be found"),
    }
}

#[tokio::test]
async fn broken_email_index_falls_back_to_customer_id() {
    let inner = InMemorySource::new();
    inner
        .seed_quotation(draft("Renewal"), Some("ada@example.com"), Some(CustomerId(42)))
        .await;
    let source = BrokenEmailIndex { inner };

    let keys = CustomerKeys {
        email: Some("ada@example.com".to_string()),
        customer_id: Some(CustomerId(42)),
    };
    let resolution = resolve_customer_quotations(&source, &keys).await.expect("id fallback");

    assert!(matches!(resolution, Resolution::Found { matched_by: LookupKey::CustomerId, .. }));
}

#[tokio::test]
async fn broken_email_index_without_id_surfaces_the_failure() {
    let source = BrokenEmailIndex { inner: InMemorySource::new() };
    let keys = CustomerKeys::by_email("ada@example.com");

    let error = resolve_customer_quotations(&source, &keys)
        .await
        .expect_err("no fallback key remains");
    assert_eq!(
        error,
        dealdesk_core::resolver::ResolveError::Source(SourceError::Status { status: 502 })
    );
}

#[tokio::test]
async fn draft_to_invoice_lifecycle() {
    let source = InMemorySource::new();

    let saved = source.create(OpportunityId(7), draft("New Deal")).await.expect("create");
    let id = saved.id.expect("store assigns an id");
    assert_eq!(saved.amount, Decimal::new(230, 0));
    assert_eq!(saved.stage, QuotationStage::Draft);

    let sent = source.send(id).await.expect("draft can be sent");
    assert_eq!(sent.stage, QuotationStage::Sent);

    let resend = source.send(id).await.expect_err("sent quotation cannot be re-sent");
    assert_eq!(resend, SourceError::Status { status: 409 });

    let premature = source
        .generate_from_quotation(id)
        .await
        .expect_err("invoices require acceptance");
    assert_eq!(premature, SourceError::Status { status: 409 });

    let accepted = source.accept(id).await.expect("sent can be accepted");
    assert_eq!(accepted.stage, QuotationStage::Accepted);

    let invoice = source.generate_from_quotation(id).await.expect("invoice");
    assert_eq!(invoice.invoice_number, "INV-0001");
    assert_eq!(invoice.subtotal, Decimal::new(230, 0));
    assert_eq!(invoice.total, Decimal::new(230, 0));
    assert_eq!(invoice.quotation_id, Some(id));
    assert_eq!(invoice.opportunity_id, Some(OpportunityId(7)));
}

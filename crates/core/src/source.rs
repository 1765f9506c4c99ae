//! The data-source capability set provided by the REST backend.
//!
//! Implementations live outside this crate; the domain only sees these
//! traits and the transport-failure taxonomy below.

use async_trait::async_trait;
use thiserror::Error;

use crate::dashboard::DashboardSnapshot;
use crate::domain::customer::CustomerId;
use crate::domain::invoice::Invoice;
use crate::domain::quotation::{OpportunityId, Quotation, QuotationId};

/// A request that could not complete. Empty result sets are not errors
/// and never appear here; they are ordinary values.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("unexpected status {status}")]
    Status { status: u16 },
    #[error("malformed response payload: {0}")]
    Decode(String),
}

#[async_trait]
pub trait QuotationSource: Send + Sync {
    async fn list_by_email(&self, email: &str) -> Result<Vec<Quotation>, SourceError>;

    async fn list_by_customer(&self, customer_id: CustomerId)
        -> Result<Vec<Quotation>, SourceError>;

    async fn fetch_for_opportunity(
        &self,
        opportunity_id: OpportunityId,
    ) -> Result<Option<Quotation>, SourceError>;

    async fn create(
        &self,
        opportunity_id: OpportunityId,
        quotation: Quotation,
    ) -> Result<Quotation, SourceError>;

    async fn update(
        &self,
        id: QuotationId,
        quotation: Quotation,
    ) -> Result<Quotation, SourceError>;

    /// Transitions DRAFT -> SENT on the backend.
    async fn send(&self, id: QuotationId) -> Result<Quotation, SourceError>;

    /// Transitions SENT -> ACCEPTED on the backend.
    async fn accept(&self, id: QuotationId) -> Result<Quotation, SourceError>;

    /// Transitions SENT -> REJECTED on the backend.
    async fn reject(&self, id: QuotationId) -> Result<Quotation, SourceError>;
}

#[async_trait]
pub trait InvoiceSource: Send + Sync {
    async fn generate_from_quotation(&self, id: QuotationId) -> Result<Invoice, SourceError>;
}

#[async_trait]
pub trait DashboardSource: Send + Sync {
    async fn fetch_snapshot(&self) -> Result<DashboardSnapshot, SourceError>;
}

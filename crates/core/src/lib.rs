pub mod config;
pub mod dashboard;
pub mod domain;
pub mod editor;
pub mod errors;
pub mod pricing;
pub mod resolver;
pub mod source;

pub use dashboard::{CategorySlice, DashboardSnapshot, SourceSlice, StageSlice};
pub use domain::customer::{CustomerId, CustomerKeys};
pub use domain::invoice::{Invoice, InvoiceId, InvoiceLine};
pub use domain::lead::{Lead, OpportunitySummary};
pub use domain::product::{Product, ProductId};
pub use domain::quotation::{
    OpportunityId, Quotation, QuotationId, QuotationLine, QuotationStage, StageAction,
};
pub use editor::{QuotationEditor, SubmissionGuard, SubmitError};
pub use errors::DomainError;
pub use resolver::{resolve_customer_quotations, LookupKey, Resolution, ResolveError};
pub use source::{DashboardSource, InvoiceSource, QuotationSource, SourceError};

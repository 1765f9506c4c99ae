use thiserror::Error;

use crate::domain::quotation::QuotationStage;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid stage transition from {from:?} to {to:?}")]
    InvalidStageTransition { from: QuotationStage, to: QuotationStage },
    #[error("quotation has not been persisted yet")]
    NotPersisted,
    #[error("invoice generation requires an accepted quotation, current stage is {stage:?}")]
    InvoiceNotAvailable { stage: QuotationStage },
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("a submission for this form is already in flight")]
    SubmissionInFlight,
}

//! Multi-key customer quotation resolution.
//!
//! A customer is addressable by email and by numeric id, and the two
//! indexes are not guaranteed to agree. Resolution walks an ordered list
//! of lookup strategies and gives every attempt a uniform outcome:
//! a non-empty hit is final, an empty result falls through to the next
//! key, and a failure only surfaces when no fallback key remains.

use thiserror::Error;
use tracing::warn;

use crate::domain::customer::{CustomerId, CustomerKeys};
use crate::domain::quotation::Quotation;
use crate::source::{QuotationSource, SourceError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LookupKey {
    Email,
    CustomerId,
}

/// Outcome of a successful resolution. `NoRecords` is the soft
/// "nothing matched" signal, deliberately distinct from an error.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolution {
    Found { quotations: Vec<Quotation>, matched_by: LookupKey },
    NoRecords,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("no identifying key available for customer quotation lookup")]
    NoIdentifyingKey,
    #[error(transparent)]
    Source(#[from] SourceError),
}

enum LookupStep {
    Email(String),
    CustomerId(CustomerId),
}

impl LookupStep {
    fn key(&self) -> LookupKey {
        match self {
            Self::Email(_) => LookupKey::Email,
            Self::CustomerId(_) => LookupKey::CustomerId,
        }
    }
}

/// Read-only and idempotent; safe to retry.
pub async fn resolve_customer_quotations<S>(
    source: &S,
    keys: &CustomerKeys,
) -> Result<Resolution, ResolveError>
where
    S: QuotationSource + ?Sized,
{
    let mut plan = Vec::with_capacity(2);
    if let Some(email) = keys.email_key() {
        plan.push(LookupStep::Email(email.to_owned()));
    }
    if let Some(customer_id) = keys.customer_id {
        plan.push(LookupStep::CustomerId(customer_id));
    }
    if plan.is_empty() {
        return Err(ResolveError::NoIdentifyingKey);
    }

    let last = plan.len() - 1;
    for (index, step) in plan.into_iter().enumerate() {
        let key = step.key();
        let attempt = match &step {
            LookupStep::Email(email) => source.list_by_email(email).await,
            LookupStep::CustomerId(customer_id) => source.list_by_customer(*customer_id).await,
        };

        match attempt {
            Ok(quotations) if !quotations.is_empty() => {
                return Ok(Resolution::Found { quotations, matched_by: key });
            }
            Ok(_) => {}
            Err(error) if index == last => return Err(error.into()),
            Err(error) => {
                warn!(lookup = ?key, %error, "quotation lookup failed, falling back to next key");
            }
        }
    }

    // The final strategy completed and came back empty.
    Ok(Resolution::NoRecords)
}

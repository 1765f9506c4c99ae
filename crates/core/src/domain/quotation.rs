use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::{Product, ProductId};
use crate::errors::DomainError;
use crate::pricing;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuotationId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpportunityId(pub u64);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuotationStage {
    #[default]
    Draft,
    Sent,
    Accepted,
    Rejected,
}

impl QuotationStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected)
    }
}

/// One priced line of a quotation. Every field mirrors what the backend
/// may omit on the wire; pricing resolves effective values instead of
/// failing on gaps.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QuotationLine {
    pub product: Option<Product>,
    pub product_id: Option<ProductId>,
    pub quantity: Option<u32>,
    pub discount_percent: Option<Decimal>,
}

impl QuotationLine {
    pub fn subtotal(&self) -> Decimal {
        pricing::line_subtotal(self)
    }
}

/// Actions a view may offer for a quotation in its current stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageAction {
    Edit,
    Send,
    Accept,
    Reject,
    GenerateInvoice,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quotation {
    /// Assigned by the data store; `None` until persisted.
    pub id: Option<QuotationId>,
    pub title: String,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub valid_until: Option<NaiveDate>,
    /// Derived field: always the sum of current line subtotals.
    pub amount: Decimal,
    pub items: Vec<QuotationLine>,
    pub stage: QuotationStage,
    pub opportunity_id: Option<OpportunityId>,
}

impl Quotation {
    pub fn can_transition_to(&self, next: QuotationStage) -> bool {
        use QuotationStage::{Accepted, Draft, Rejected, Sent};
        matches!((self.stage, next), (Draft, Sent) | (Sent, Accepted) | (Sent, Rejected))
    }

    pub fn transition_to(&mut self, next: QuotationStage) -> Result<(), DomainError> {
        if self.can_transition_to(next) {
            self.stage = next;
            return Ok(());
        }

        Err(DomainError::InvalidStageTransition { from: self.stage, to: next })
    }

    /// Send requires a persisted quotation; drafts that were never saved
    /// have nothing the customer could act on.
    pub fn send(&mut self) -> Result<(), DomainError> {
        if self.id.is_none() {
            return Err(DomainError::NotPersisted);
        }
        self.transition_to(QuotationStage::Sent)
    }

    pub fn accept(&mut self) -> Result<(), DomainError> {
        self.transition_to(QuotationStage::Accepted)
    }

    pub fn reject(&mut self) -> Result<(), DomainError> {
        self.transition_to(QuotationStage::Rejected)
    }

    /// Restores the amount invariant after any change to `items`.
    pub fn recompute_amount(&mut self) {
        self.amount = pricing::quotation_total(&self.items);
    }

    pub fn amount_consistent(&self) -> bool {
        self.amount == pricing::quotation_total(&self.items)
    }

    pub fn ensure_invoice_eligible(&self) -> Result<(), DomainError> {
        if self.id.is_none() {
            return Err(DomainError::NotPersisted);
        }
        if self.stage != QuotationStage::Accepted {
            return Err(DomainError::InvoiceNotAvailable { stage: self.stage });
        }
        Ok(())
    }

    /// Edit stays available in every stage; the product owner never asked
    /// for a guard and the observed behavior permits it.
    pub fn available_actions(&self) -> Vec<StageAction> {
        let mut actions = vec![StageAction::Edit];
        match self.stage {
            QuotationStage::Draft if self.id.is_some() => actions.push(StageAction::Send),
            QuotationStage::Sent => {
                actions.push(StageAction::Accept);
                actions.push(StageAction::Reject);
            }
            QuotationStage::Accepted => actions.push(StageAction::GenerateInvoice),
            _ => {}
        }
        actions
    }
}

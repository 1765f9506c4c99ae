//! Quotation form view-model.
//!
//! The UI controller owns one editor per form instance and feeds every
//! mutation through it; the derived amount is recomputed eagerly via the
//! pure pricing functions so it can never drift from the item list.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::quotation::{
    OpportunityId, Quotation, QuotationId, QuotationLine, QuotationStage,
};
use crate::errors::DomainError;
use crate::pricing;
use crate::source::{QuotationSource, SourceError};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// One create-or-update submission at a time per form instance. The
/// permit is released on drop, including on the failure paths.
#[derive(Debug, Default)]
pub struct SubmissionGuard {
    in_flight: AtomicBool,
}

impl SubmissionGuard {
    pub fn begin(&self) -> Option<SubmissionPermit<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SubmissionPermit { guard: self })
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
pub struct SubmissionPermit<'a> {
    guard: &'a SubmissionGuard,
}

impl Drop for SubmissionPermit<'_> {
    fn drop(&mut self) {
        self.guard.in_flight.store(false, Ordering::Release);
    }
}

#[derive(Debug)]
pub struct QuotationEditor {
    quotation_id: Option<QuotationId>,
    stage: QuotationStage,
    opportunity_id: OpportunityId,
    pub title: String,
    pub description: Option<String>,
    pub valid_until: Option<NaiveDate>,
    items: Vec<QuotationLine>,
    amount: Decimal,
    guard: SubmissionGuard,
}

impl QuotationEditor {
    pub fn new(opportunity_id: OpportunityId) -> Self {
        Self {
            quotation_id: None,
            stage: QuotationStage::Draft,
            opportunity_id,
            title: String::new(),
            description: None,
            valid_until: None,
            items: Vec::new(),
            amount: Decimal::ZERO,
            guard: SubmissionGuard::default(),
        }
    }

    /// Opens an existing quotation for editing. The stored amount is not
    /// trusted; it is recomputed from the items.
    pub fn from_quotation(quotation: &Quotation, opportunity_id: OpportunityId) -> Self {
        let mut editor = Self::new(opportunity_id);
        editor.quotation_id = quotation.id;
        editor.stage = quotation.stage;
        editor.title = quotation.title.clone();
        editor.description = quotation.description.clone();
        editor.valid_until = quotation.valid_until;
        editor.items = quotation.items.clone();
        editor.recompute();
        editor
    }

    pub fn quotation_id(&self) -> Option<QuotationId> {
        self.quotation_id
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn items(&self) -> &[QuotationLine] {
        &self.items
    }

    pub fn add_item(&mut self, line: QuotationLine) {
        self.items.push(line);
        self.recompute();
    }

    pub fn remove_item(&mut self, index: usize) -> Option<QuotationLine> {
        if index >= self.items.len() {
            return None;
        }
        let removed = self.items.remove(index);
        self.recompute();
        Some(removed)
    }

    pub fn set_quantity(&mut self, index: usize, quantity: u32) {
        if let Some(line) = self.items.get_mut(index) {
            line.quantity = Some(quantity);
            self.recompute();
        }
    }

    pub fn set_discount(&mut self, index: usize, discount_percent: Decimal) {
        if let Some(line) = self.items.get_mut(index) {
            line.discount_percent = Some(discount_percent);
            self.recompute();
        }
    }

    fn recompute(&mut self) {
        self.amount = pricing::quotation_total(&self.items);
    }

    /// Client-side validation before dispatch: required fields only.
    pub fn build(&self) -> Result<Quotation, DomainError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(DomainError::Validation("title is required".to_string()));
        }
        let valid_until = self
            .valid_until
            .ok_or_else(|| DomainError::Validation("valid-until date is required".to_string()))?;

        Ok(Quotation {
            id: self.quotation_id,
            title: title.to_string(),
            description: self.description.clone(),
            created_at: None,
            valid_until: Some(valid_until),
            amount: self.amount,
            items: self.items.clone(),
            stage: self.stage,
            opportunity_id: Some(self.opportunity_id),
        })
    }

    /// Create-or-update dispatch: update when the quotation already has
    /// an id, create against the opportunity otherwise. Rejects overlap
    /// with an in-flight submission for this form.
    pub async fn submit<S>(&mut self, source: &S) -> Result<Quotation, SubmitError>
    where
        S: QuotationSource + ?Sized,
    {
        let quotation = self.build()?;
        let permit = self.guard.begin().ok_or(DomainError::SubmissionInFlight)?;

        let saved = match quotation.id {
            Some(id) => source.update(id, quotation).await?,
            None => source.create(self.opportunity_id, quotation).await?,
        };
        drop(permit);

        self.quotation_id = saved.id;
        self.stage = saved.stage;
        Ok(saved)
    }
}

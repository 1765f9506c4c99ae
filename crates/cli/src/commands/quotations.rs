use serde_json::{json, Value};

use dealdesk_core::domain::customer::{CustomerId, CustomerKeys};
use dealdesk_core::domain::quotation::{OpportunityId, Quotation, QuotationId};
use dealdesk_core::resolver::{resolve_customer_quotations, LookupKey, Resolution, ResolveError};
use dealdesk_core::source::QuotationSource;

use super::{source_failure, CommandResult};

pub async fn resolve<S>(
    source: &S,
    email: Option<String>,
    customer_id: Option<u64>,
) -> CommandResult
where
    S: QuotationSource + ?Sized,
{
    let keys = CustomerKeys { email, customer_id: customer_id.map(CustomerId) };

    match resolve_customer_quotations(source, &keys).await {
        Ok(Resolution::Found { quotations, matched_by }) => {
            let matched_by = match matched_by {
                LookupKey::Email => "email",
                LookupKey::CustomerId => "customer_id",
            };
            let data = json!({
                "matchedBy": matched_by,
                "quotations": quotations.iter().map(summary).collect::<Vec<_>>(),
            });
            CommandResult::with_data(
                "quotations.resolve",
                format!("{} quotation(s) matched by {matched_by}", quotations.len()),
                Some(data),
            )
        }
        Ok(Resolution::NoRecords) => {
            CommandResult::success("quotations.resolve", "no quotation records for this customer")
        }
        Err(ResolveError::NoIdentifyingKey) => CommandResult::failure(
            "quotations.resolve",
            "missing_key",
            "provide --email and/or --customer-id",
            2,
        ),
        Err(ResolveError::Source(error)) => source_failure("quotations.resolve", &error),
    }
}

pub async fn show<S>(source: &S, opportunity_id: u64) -> CommandResult
where
    S: QuotationSource + ?Sized,
{
    match source.fetch_for_opportunity(OpportunityId(opportunity_id)).await {
        Ok(Some(quotation)) => CommandResult::with_data(
            "quotations.show",
            format!("quotation found for opportunity {opportunity_id}"),
            Some(summary(&quotation)),
        ),
        Ok(None) => CommandResult::success(
            "quotations.show",
            format!("no quotation for opportunity {opportunity_id}"),
        ),
        Err(error) => source_failure("quotations.show", &error),
    }
}

pub async fn send<S>(source: &S, id: u64) -> CommandResult
where
    S: QuotationSource + ?Sized,
{
    transition(source, id, Transition::Send).await
}

pub async fn accept<S>(source: &S, id: u64) -> CommandResult
where
    S: QuotationSource + ?Sized,
{
    transition(source, id, Transition::Accept).await
}

pub async fn reject<S>(source: &S, id: u64) -> CommandResult
where
    S: QuotationSource + ?Sized,
{
    transition(source, id, Transition::Reject).await
}

#[derive(Clone, Copy)]
enum Transition {
    Send,
    Accept,
    Reject,
}

impl Transition {
    fn command(self) -> &'static str {
        match self {
            Self::Send => "quotations.send",
            Self::Accept => "quotations.accept",
            Self::Reject => "quotations.reject",
        }
    }
}

async fn transition<S>(source: &S, id: u64, transition: Transition) -> CommandResult
where
    S: QuotationSource + ?Sized,
{
    let id = QuotationId(id);
    let attempt = match transition {
        Transition::Send => source.send(id).await,
        Transition::Accept => source.accept(id).await,
        Transition::Reject => source.reject(id).await,
    };

    match attempt {
        Ok(quotation) => CommandResult::with_data(
            transition.command(),
            format!("quotation {} is now {:?}", id.0, quotation.stage),
            Some(summary(&quotation)),
        ),
        Err(error) => source_failure(transition.command(), &error),
    }
}

fn summary(quotation: &Quotation) -> Value {
    json!({
        "id": quotation.id.map(|id| id.0),
        "title": quotation.title,
        "stage": quotation.stage,
        "amount": quotation.amount,
        "items": quotation.items.len(),
    })
}

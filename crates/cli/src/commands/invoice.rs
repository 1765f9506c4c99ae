use serde_json::json;

use dealdesk_core::domain::quotation::QuotationId;
use dealdesk_core::source::InvoiceSource;

use super::{source_failure, CommandResult};

pub async fn from_quotation<S>(source: &S, id: u64) -> CommandResult
where
    S: InvoiceSource + ?Sized,
{
    match source.generate_from_quotation(QuotationId(id)).await {
        Ok(invoice) => {
            let data = json!({
                "invoiceNumber": invoice.invoice_number,
                "title": invoice.title,
                "subtotal": invoice.subtotal,
                "taxAmount": invoice.tax_amount,
                "total": invoice.total,
                "items": invoice.items.len(),
            });
            CommandResult::with_data(
                "invoice.from-quotation",
                format!("generated {}", invoice.invoice_number),
                Some(data),
            )
        }
        Err(error) => source_failure("invoice.from-quotation", &error),
    }
}

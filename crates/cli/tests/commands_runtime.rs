use std::env;
use std::sync::{Mutex, OnceLock};

use rust_decimal::Decimal;
use serde_json::Value;

use dealdesk_cli::commands::{config, invoice, quotations};
use dealdesk_client::InMemorySource;
use dealdesk_core::domain::customer::CustomerId;
use dealdesk_core::domain::product::{Product, ProductId};
use dealdesk_core::domain::quotation::{Quotation, QuotationLine, QuotationStage};

fn draft(title: &str) -> Quotation {
    let mut quotation = Quotation {
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
    };
    quotation.recompute_amount();
    quotation
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output is valid JSON")
}

#[tokio::test]
async fn resolve_reports_the_matching_key() {
    let source = InMemorySource::new();
    source
        .seed_quotation(draft("Renewal"), Some("ada@example.com"), Some(CustomerId(42)))
        .await;

    let result =
        quotations::resolve(&source, Some("ada@example.com".to_string()), Some(42)).await;
    assert_eq!(result.exit_code, 0);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["command"], "quotations.resolve");
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["data"]["matchedBy"], "email");
    assert_eq!(payload["data"]["quotations"][0]["title"], "Renewal");
}

#[tokio::test]
async fn resolve_without_keys_is_a_usage_error() {
    let source = InMemorySource::new();

    let result = quotations::resolve(&source, None, None).await;
    assert_eq!(result.exit_code, 2);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["status"], "error");
    assert_eq!(payload["error_class"], "missing_key");
}

#[tokio::test]
async fn resolve_with_no_matches_is_still_ok() {
    let source = InMemorySource::new();

    let result =
        quotations::resolve(&source, Some("nobody@example.com".to_string()), None).await;
    assert_eq!(result.exit_code, 0);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["status"], "ok");
    assert!(payload.get("data").is_none());
}

#[tokio::test]
async fn repeated_send_maps_to_a_stage_conflict() {
    let source = InMemorySource::new();
    let id = source.seed_quotation(draft("Renewal"), None, None).await;

    let first = quotations::send(&source, id.0).await;
    assert_eq!(first.exit_code, 0);
    let payload = parse_payload(&first.output);
    assert_eq!(payload["data"]["stage"], "SENT");

    let second = quotations::send(&source, id.0).await;
    assert_eq!(second.exit_code, 1);
    let payload = parse_payload(&second.output);
    assert_eq!(payload["error_class"], "stage_conflict");
}

#[tokio::test]
async fn invoice_generation_round_trip() {
    let source = InMemorySource::new();
    let id = source.seed_quotation(draft("Renewal"), None, None).await;
    quotations::send(&source, id.0).await;
    quotations::accept(&source, id.0).await;

    let result = invoice::from_quotation(&source, id.0).await;
    assert_eq!(result.exit_code, 0);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["command"], "invoice.from-quotation");
    assert_eq!(payload["data"]["invoiceNumber"], "INV-0001");
}

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn with_env(vars: &[(&str, &str)], run: impl FnOnce()) {
    let _guard = ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env lock");
    for (key, value) in vars {
        env::set_var(key, value);
    }
    run();
    for (key, _) in vars {
        env::remove_var(key);
    }
}

#[test]
fn config_output_attributes_env_sources_and_redacts_the_token() {
    with_env(
        &[
            ("DEALDESK_API_BASE_URL", "https://crm.example.com"),
            ("DEALDESK_API_AUTH_TOKEN", "ddk-0123456789"),
        ],
        || {
            let output = config::run(None);

            assert!(output.contains("api.base_url = https://crm.example.com"));
            assert!(output.contains("env (DEALDESK_API_BASE_URL)"));
            assert!(output.contains("api.auth_token = ddk-***"));
            assert!(!output.contains("0123456789"));
        },
    );
}

#[test]
fn config_output_falls_back_to_defaults() {
    with_env(&[], || {
        let output = config::run(None);
        assert!(output.contains("api.timeout_secs = 10"));
        assert!(output.contains("dashboard.retry_delay_ms = 1000"));
    });
}

//! REST implementation of the data-source traits.
//!
//! One `reqwest::Client` per instance with the fixed overall timeout from
//! config; every call gets a correlation id so failures can be traced
//! back through the logs. Requests are not cancellable and there is no
//! retry here; the dashboard loader owns its single delayed retry.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use uuid::Uuid;

use dealdesk_core::config::ApiConfig;
use dealdesk_core::dashboard::DashboardSnapshot;
use dealdesk_core::domain::customer::CustomerId;
use dealdesk_core::domain::invoice::Invoice;
use dealdesk_core::domain::quotation::{OpportunityId, Quotation, QuotationId};
use dealdesk_core::source::{DashboardSource, InvoiceSource, QuotationSource, SourceError};

use crate::dto::{InvoiceDto, QuotationDto, QuotationPayload};

pub struct RestClient {
    http: Client,
    base_url: String,
    auth_token: Option<SecretString>,
}

impl RestClient {
    pub fn from_config(config: &ApiConfig) -> Result<Self, SourceError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| SourceError::Network(error.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self.http.request(method, self.url(path));
        if let Some(token) = &self.auth_token {
            builder = builder.bearer_auth(token.expose_secret());
        }
        builder
    }

    async fn execute<T>(&self, builder: RequestBuilder, path: &str) -> Result<T, SourceError>
    where
        T: DeserializeOwned,
    {
        let correlation_id = Uuid::new_v4();
        debug!(%correlation_id, path, "dispatching api request");

        let response = builder.send().await.map_err(|error| {
            let mapped = if error.is_timeout() {
                SourceError::Timeout
            } else {
                SourceError::Network(error.to_string())
            };
            warn!(%correlation_id, path, %mapped, "api request failed");
            mapped
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%correlation_id, path, status = status.as_u16(), "api returned error status");
            return Err(SourceError::Status { status: status.as_u16() });
        }

        let body = response
            .bytes()
            .await
            .map_err(|error| SourceError::Network(error.to_string()))?;
        serde_json::from_slice(&body).map_err(|error| {
            warn!(%correlation_id, path, %error, "api response failed contract validation");
            SourceError::Decode(error.to_string())
        })
    }

    async fn get_quotations(&self, path: &str) -> Result<Vec<Quotation>, SourceError> {
        let dtos: Vec<QuotationDto> = self.execute(self.request(Method::GET, path), path).await?;
        dtos.into_iter().map(QuotationDto::into_domain).collect()
    }

    async fn quotation_action(&self, path: &str) -> Result<Quotation, SourceError> {
        let dto: QuotationDto = self.execute(self.request(Method::POST, path), path).await?;
        dto.into_domain()
    }
}

#[async_trait]
impl QuotationSource for RestClient {
    async fn list_by_email(&self, email: &str) -> Result<Vec<Quotation>, SourceError> {
        self.get_quotations(&format!("/api/quotations/customer/email/{email}")).await
    }

    async fn list_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Quotation>, SourceError> {
        self.get_quotations(&format!("/api/quotations/customer/{}", customer_id.0)).await
    }

    async fn fetch_for_opportunity(
        &self,
        opportunity_id: OpportunityId,
    ) -> Result<Option<Quotation>, SourceError> {
        let path = format!("/api/quotations/opportunity/{}", opportunity_id.0);
        match self.execute::<QuotationDto>(self.request(Method::GET, &path), &path).await {
            Ok(dto) => Ok(Some(dto.into_domain()?)),
            Err(SourceError::Status { status }) if status == StatusCode::NOT_FOUND.as_u16() => {
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }

    async fn create(
        &self,
        opportunity_id: OpportunityId,
        quotation: Quotation,
    ) -> Result<Quotation, SourceError> {
        let path = format!("/api/quotations/opportunity/{}", opportunity_id.0);
        let builder =
            self.request(Method::POST, &path).json(&QuotationPayload::from(&quotation));
        let dto: QuotationDto = self.execute(builder, &path).await?;
        dto.into_domain()
    }

    async fn update(&self, id: QuotationId, quotation: Quotation) -> Result<Quotation, SourceError> {
        let path = format!("/api/quotations/{}", id.0);
        let builder = self.request(Method::PUT, &path).json(&QuotationPayload::from(&quotation));
        let dto: QuotationDto = self.execute(builder, &path).await?;
        dto.into_domain()
    }

    async fn send(&self, id: QuotationId) -> Result<Quotation, SourceError> {
        self.quotation_action(&format!("/api/quotations/{}/send", id.0)).await
    }

    async fn accept(&self, id: QuotationId) -> Result<Quotation, SourceError> {
        self.quotation_action(&format!("/api/quotations/{}/accept", id.0)).await
    }

    async fn reject(&self, id: QuotationId) -> Result<Quotation, SourceError> {
        self.quotation_action(&format!("/api/quotations/{}/reject", id.0)).await
    }
}

#[async_trait]
impl InvoiceSource for RestClient {
    async fn generate_from_quotation(&self, id: QuotationId) -> Result<Invoice, SourceError> {
        let path = format!("/api/invoices/from-quotation/{}", id.0);
        let dto: InvoiceDto = self.execute(self.request(Method::POST, &path), &path).await?;
        dto.into_domain()
    }
}

#[async_trait]
impl DashboardSource for RestClient {
    async fn fetch_snapshot(&self) -> Result<DashboardSnapshot, SourceError> {
        let path = "/api/dashboard";
        self.execute(self.request(Method::GET, path), path).await
    }
}

#[cfg(test)]
mod tests {
    use dealdesk_core::config::ApiConfig;

    use super::RestClient;

    #[test]
    fn trailing_slash_in_base_url_is_normalized() {
        let client = RestClient::from_config(&ApiConfig {
            base_url: "http://localhost:8080/".to_string(),
            timeout_secs: 10,
            auth_token: None,
        })
        .expect("client builds");

        assert_eq!(client.url("/api/dashboard"), "http://localhost:8080/api/dashboard");
    }
}

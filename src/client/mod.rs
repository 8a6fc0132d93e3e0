//! Typed access to the car and customer APIs through a recovering relay.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::relay::{ForwardBody, ForwardRequest, ForwardResponse, RecoveringRelay, RecoveryOutcome};
use crate::types::{Car, CarPage, CreateCar, CreateCustomer, Customer, MessageResponse, UpdateCar, UpdateCustomer};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{message} (status {status})")]
    Downstream { status: u16, message: String },

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("failed to encode request body: {0}")]
    Encode(String),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Downstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Client side of the relay: every call goes through the coordinator, so an
/// expired credential is refreshed once before the caller sees a failure.
#[derive(Clone)]
pub struct RelayClient {
    relay: Arc<dyn RecoveringRelay>,
    logged_out: Arc<AtomicBool>,
}

impl RelayClient {
    pub fn new(relay: impl RecoveringRelay + 'static) -> Self {
        Self {
            relay: Arc::new(relay),
            logged_out: Arc::new(AtomicBool::new(false)),
        }
    }

    /// True once any call ended with a failed refresh and a forced logout.
    pub fn logged_out(&self) -> bool {
        self.logged_out.load(Ordering::Acquire)
    }

    pub fn cars(&self) -> CarsApi<'_> {
        CarsApi { client: self }
    }

    pub fn customers(&self) -> CustomersApi<'_> {
        CustomersApi { client: self }
    }

    /// Run a request and return the raw forward response.
    pub async fn send(&self, request: &ForwardRequest) -> ForwardResponse {
        let (response, outcome) = self.relay.execute_with_outcome(request).await;
        if outcome == RecoveryOutcome::LoggedOut {
            self.logged_out.store(true, Ordering::Release);
        }
        response
    }

    /// Run a request and decode a 2xx body into `T`.
    pub async fn send_json<T: DeserializeOwned>(&self, request: &ForwardRequest) -> Result<T, ClientError> {
        decode(self.send(request).await)
    }
}

fn decode<T: DeserializeOwned>(response: ForwardResponse) -> Result<T, ClientError> {
    if !response.is_success() {
        let message = match &response.body {
            ForwardBody::Json(_) => response.message().unwrap_or("request failed").to_string(),
            ForwardBody::Raw(text) if !text.trim().is_empty() => text.trim().to_string(),
            ForwardBody::Raw(_) => "request failed".to_string(),
        };
        return Err(ClientError::Downstream {
            status: response.status.as_u16(),
            message,
        });
    }

    match response.body {
        ForwardBody::Json(value) => Ok(serde_json::from_value(value)?),
        // Some services answer JSON without saying so
        ForwardBody::Raw(text) => Ok(serde_json::from_str(&text)?),
    }
}

/// `cars` resource of the inventory service
pub struct CarsApi<'a> {
    client: &'a RelayClient,
}

impl CarsApi<'_> {
    pub async fn list(&self, page: CarPage) -> Result<Vec<Car>, ClientError> {
        let request = ForwardRequest::get("cars").with_query(Some(page.query()));
        self.client.send_json(&request).await
    }

    pub async fn get(&self, id: &str) -> Result<Car, ClientError> {
        self.client.send_json(&ForwardRequest::get(&format!("cars/{}", id))).await
    }

    pub async fn create(&self, car: &CreateCar) -> Result<Car, ClientError> {
        let request = ForwardRequest::post_json("cars", car).map_err(|e| ClientError::Encode(e.to_string()))?;
        self.client.send_json(&request).await
    }

    pub async fn update(&self, id: &str, car: &UpdateCar) -> Result<Car, ClientError> {
        let request = ForwardRequest::put_json(&format!("cars/{}", id), car)
            .map_err(|e| ClientError::Encode(e.to_string()))?;
        self.client.send_json(&request).await
    }

    pub async fn delete(&self, id: &str) -> Result<MessageResponse, ClientError> {
        let response = self.client.send(&ForwardRequest::delete(&format!("cars/{}", id))).await;
        // An empty 2xx body is a successful delete
        if response.is_success() && matches!(&response.body, ForwardBody::Raw(text) if text.trim().is_empty()) {
            return Ok(MessageResponse::default());
        }
        decode(response)
    }
}

/// `customers` resource of the banking service
pub struct CustomersApi<'a> {
    client: &'a RelayClient,
}

impl CustomersApi<'_> {
    pub async fn list(&self) -> Result<Vec<Customer>, ClientError> {
        self.client.send_json(&ForwardRequest::get("customers")).await
    }

    pub async fn create(&self, customer: &CreateCustomer) -> Result<Customer, ClientError> {
        let request =
            ForwardRequest::post_json("customers", customer).map_err(|e| ClientError::Encode(e.to_string()))?;
        self.client.send_json(&request).await
    }

    /// Customers are addressed by phone number.
    pub async fn update(&self, phone: &str, updates: &UpdateCustomer) -> Result<Customer, ClientError> {
        let request = ForwardRequest::put_json(&format!("customers/{}", phone), updates)
            .map_err(|e| ClientError::Encode(e.to_string()))?;
        self.client.send_json(&request).await
    }
}

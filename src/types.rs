/// Shared types for the car and customer APIs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Car as returned by the inventory service. Fields the service adds
/// (id, timestamps, seller) are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    #[serde(default)]
    pub make: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub year: i32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCar {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub price: f64,
    pub mileage: i64,
    pub description: String,
    pub color: String,
    pub fuel_type: String,
    pub transmission: String,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateCar {
    #[serde(flatten)]
    pub car: CreateCar,
    pub is_sold: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub full_name: String,
    pub dob: String,
    pub customer_segment: String,
    pub email: String,
    pub gender: String,
    pub phone: String,
    #[serde(default)]
    pub remark: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomer {
    pub full_name: String,
    pub dob: String,
    pub customer_segment: String,
    pub email: String,
    pub gender: String,
    pub phone: String,
    #[serde(default)]
    pub remark: String,
}

/// Partial customer update; only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_segment: Option<String>,
}

/// Paging for the car list: `cars?skip=<page>&limit=<limit>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarPage {
    pub page: u32,
    pub limit: u32,
}

impl Default for CarPage {
    fn default() -> Self {
        Self { page: 0, limit: 10 }
    }
}

impl CarPage {
    pub fn query(&self) -> String {
        format!("skip={}&limit={}", self.page, self.limit)
    }
}

/// `{ "message": ... }` bodies, e.g. from a delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

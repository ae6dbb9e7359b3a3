//! API response envelope
//!
//! Every endpoint answers `{"data": ..., "errors": ...}`. Validation failures
//! put a field-keyed map under `errors`.

use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: Option<T>,
    pub errors: Option<Value>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            errors: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn failure(errors: Value) -> Self {
        Self {
            data: None,
            errors: Some(errors),
        }
    }
}

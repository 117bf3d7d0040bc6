//! Calculator endpoints. Both require a valid bearer token.

use crate::api::client::AmsterdamClient;
use crate::api::models::{Calculation, CalculationHistory, CalculationRequest, Operation};
use crate::error::Result;

impl AmsterdamClient {
    /// POST /calculator
    pub async fn calculate(&self, num1: f64, num2: f64, operation: Operation) -> Result<Calculation> {
        let request = CalculationRequest {
            num1,
            num2,
            operation,
        };
        self.post_json("/calculator", &request).await
    }

    /// GET /calculator/history, the caller's calculations plus aggregate
    /// statistics.
    pub async fn calculation_history(&self) -> Result<CalculationHistory> {
        self.get_json("/calculator/history").await
    }
}

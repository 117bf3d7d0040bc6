//! Wire models for the Amsterdam API.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// The authenticated user's profile as the API returns it.
///
/// Endpoints disagree on field names and completeness: the profile endpoint
/// calls the age field `age`, login calls it `user_age`, and the
/// register/verify payloads omit several fields entirely. Everything the
/// server may leave out defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, alias = "age")]
    pub user_age: Option<u32>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub google_id: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyEmailRequest {
    pub user_id: i64,
    pub verification_code: String,
}

/// Login and verify-email success payload.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub user: User,
}

/// Register success payload.
///
/// The server either logs the user in immediately (token plus full profile)
/// or returns just the id of a user pending email verification.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    pub user: RegisteredUser,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RegisteredUser {
    Full(User),
    Pending { id: i64 },
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileResponse {
    pub user: User,
}

/// Arithmetic operations the calculator endpoint accepts, serialized as
/// their symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
}

impl Operation {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operation::Add => "+",
            Operation::Subtract => "-",
            Operation::Multiply => "*",
            Operation::Divide => "/",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "+" | "add" => Ok(Operation::Add),
            "-" | "sub" => Ok(Operation::Subtract),
            "*" | "x" | "mul" => Ok(Operation::Multiply),
            "/" | "div" => Ok(Operation::Divide),
            other => Err(format!("unknown operation: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CalculationRequest {
    pub num1: f64,
    pub num2: f64,
    pub operation: Operation,
}

/// POST /calculator success payload.
#[derive(Debug, Clone, Deserialize)]
pub struct Calculation {
    pub result: f64,
    pub expression: String,
    pub calculation_id: i64,
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalculationRecord {
    pub id: i64,
    pub expression: String,
    pub result: f64,
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalculationStatistics {
    pub total: u64,
    /// Count per operation symbol, e.g. `"+": 3`.
    #[serde(default)]
    pub operations: HashMap<String, u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalculationHistory {
    pub calculations: Vec<CalculationRecord>,
    pub statistics: CalculationStatistics,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryFact {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryContent {
    pub facts: Vec<HistoryFact>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FishSpecies {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WaterContent {
    pub intro: String,
    pub fish_species: Vec<FishSpecies>,
    pub ecosystem_facts: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminUser {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub google_id: Option<String>,
    #[serde(default)]
    pub calculations_count: u64,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminUsers {
    pub users: Vec<AdminUser>,
    pub total_users: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminStats {
    pub total_users: u64,
    pub total_calculations: u64,
    pub verified_users: u64,
    pub google_users: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Health {
    pub status: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_accepts_age_alias() {
        // The profile endpoint says `age`, login says `user_age`.
        let from_profile: User =
            serde_json::from_value(json!({"id": 1, "email": "a@b.com", "age": 30})).unwrap();
        let from_login: User =
            serde_json::from_value(json!({"id": 1, "email": "a@b.com", "user_age": 30})).unwrap();

        assert_eq!(from_profile.user_age, Some(30));
        assert_eq!(from_login.user_age, Some(30));
    }

    #[test]
    fn user_defaults_missing_fields() {
        let user: User = serde_json::from_value(json!({"id": 1, "email": "a@b.com"})).unwrap();

        assert_eq!(user.first_name, "");
        assert_eq!(user.user_age, None);
        assert!(!user.is_admin);
        assert!(!user.email_verified);
        assert_eq!(user.google_id, None);
    }

    #[test]
    fn register_response_immediate_login_shape() {
        let response: RegisterResponse = serde_json::from_value(json!({
            "message": "Registration successful!",
            "access_token": "tok1",
            "user": {"id": 1, "email": "a@b.com", "first_name": "A", "last_name": "B", "is_admin": false}
        }))
        .unwrap();

        assert_eq!(response.access_token.as_deref(), Some("tok1"));
        assert!(matches!(response.user, RegisteredUser::Full(ref user) if user.id == 1));
    }

    #[test]
    fn register_response_pending_shape() {
        let response: RegisterResponse =
            serde_json::from_value(json!({"user": {"id": 42}})).unwrap();

        assert_eq!(response.access_token, None);
        assert!(matches!(response.user, RegisteredUser::Pending { id: 42 }));
    }

    #[test]
    fn operation_serializes_as_symbol() {
        assert_eq!(serde_json::to_string(&Operation::Add).unwrap(), "\"+\"");
        assert_eq!(serde_json::to_string(&Operation::Divide).unwrap(), "\"/\"");

        let op: Operation = serde_json::from_str("\"*\"").unwrap();
        assert_eq!(op, Operation::Multiply);
    }

    #[test]
    fn operation_from_str_accepts_words_and_symbols() {
        assert_eq!("+".parse::<Operation>().unwrap(), Operation::Add);
        assert_eq!("div".parse::<Operation>().unwrap(), Operation::Divide);
        assert!("%".parse::<Operation>().is_err());
    }

    #[test]
    fn calculation_parses_isoformat_timestamp() {
        let calculation: Calculation = serde_json::from_value(json!({
            "result": 8.0,
            "expression": "5.0 + 3.0 = 8.0",
            "calculation_id": 7,
            "timestamp": "2026-08-29T12:34:56.789012"
        }))
        .unwrap();

        assert_eq!(calculation.result, 8.0);
        assert_eq!(calculation.calculation_id, 7);
    }
}

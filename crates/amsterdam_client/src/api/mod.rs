pub mod admin;
pub mod auth;
pub mod calculator;
pub mod client;
pub mod content;
pub mod models;

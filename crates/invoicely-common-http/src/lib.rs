//! HTTP client utilities shared by the outbound provider adapters.

pub mod client;
pub mod response;

pub use client::{build_client, HttpClient, HttpConfig, HttpError};
pub use response::{parse_json, ResponseError};

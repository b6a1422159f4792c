//! HTTP handlers, one module per API area.

pub mod activity;
pub mod dashboard;
pub mod i18n;
pub mod internal;
pub mod notifications;
pub mod upload;

//! Request extractors and parameter types.

mod locale;
mod params;

pub use locale::RequestLocale;
pub use params::{client_ip, TranslateParams};

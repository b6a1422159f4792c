use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// Syntax check for an email address. Deliverability is not checked.
pub fn is_valid_email(address: &str) -> bool {
    EMAIL_RE.is_match(address)
}

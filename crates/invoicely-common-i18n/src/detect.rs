//! Locale detection and negotiation.

use super::Locale;
use std::env;

/// Pick the best supported locale from an `Accept-Language` header value.
///
/// Entries are ranked by their `q` weight (default 1.0); ties keep header
/// order. Entries with `q=0` are ignored.
pub fn negotiate_accept_language(header: &str) -> Option<Locale> {
    let mut candidates: Vec<(f32, usize, Locale)> = header
        .split(',')
        .enumerate()
        .filter_map(|(position, part)| {
            let mut pieces = part.trim().split(';');
            let tag = pieces.next()?.trim();
            let weight = pieces
                .find_map(|p| p.trim().strip_prefix("q="))
                .and_then(|q| q.trim().parse::<f32>().ok())
                .unwrap_or(1.0);
            if weight <= 0.0 {
                return None;
            }
            Locale::parse(tag).map(|locale| (weight, position, locale))
        })
        .collect();

    candidates.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
    candidates.first().map(|(_, _, locale)| *locale)
}

/// Detect the process locale with an optional explicit override.
pub fn detect_locale_with_override(user_locale: Option<&str>) -> Locale {
    user_locale
        .and_then(Locale::parse)
        .unwrap_or_else(detect_locale)
}

/// Detect the process locale from the environment.
///
/// Priority: `INVOICELY_LOCALE` > `LC_ALL` > `LC_MESSAGES` > `LANG` > default.
pub fn detect_locale() -> Locale {
    ["INVOICELY_LOCALE", "LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .find_map(|var| from_env(var))
        .unwrap_or_default()
}

fn from_env(var: &str) -> Option<Locale> {
    env::var(var).ok().and_then(|v| Locale::parse(&v))
}

/// Locales consulted, in order, when translating for `locale`.
pub fn locale_fallback_chain(locale: Locale, default_locale: Locale) -> Vec<Locale> {
    let mut chain = vec![locale];
    if locale != default_locale {
        chain.push(default_locale);
    }
    chain
}

//! Internationalization support for Invoicely.
//!
//! Catalogs are nested JSON objects addressed by dotted keys
//! (`"invoices.status.paid"`). A lookup walks the selected locale, then the
//! default locale, and finally returns the key itself so a missing
//! translation stays visible instead of failing.
//!
//! The selected locale is never global: callers hold a [`LocaleContext`] and
//! pass it to [`I18n::translate`].
//!
//! ```
//! use invoicely_common_i18n::{I18n, Locale, LocaleContext};
//!
//! let i18n = I18n::with_embedded();
//! let ctx = LocaleContext::new(Locale::Es);
//! assert_eq!(i18n.translate(&ctx, "nav.invoices"), "Facturas");
//! assert_eq!(i18n.translate(&ctx, "nav.paymentGateways"), "Payment Gateways");
//! assert_eq!(i18n.translate(&ctx, "no.such.key"), "no.such.key");
//! ```

pub mod detect;
pub mod loader;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// Supported locales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Es,
    Fr,
    De,
}

impl Locale {
    /// Parse from a locale tag (e.g. `"en-US"`, `"fr_FR"`, `"ES"`).
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase().replace('-', "_");
        let lang = s.split(['_', '.']).next()?;

        match lang {
            "en" => Some(Self::En),
            "es" => Some(Self::Es),
            "fr" => Some(Self::Fr),
            "de" => Some(Self::De),
            _ => None,
        }
    }

    /// Language code used in file names and URLs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Es => "es",
            Self::Fr => "fr",
            Self::De => "de",
        }
    }

    /// Native display name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Es => "Español",
            Self::Fr => "Français",
            Self::De => "Deutsch",
        }
    }

    /// Every supported locale, default first.
    pub fn all() -> [Locale; 4] {
        [Self::En, Self::Es, Self::Fr, Self::De]
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Locale {
    type Err = I18nError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| I18nError::InvalidLocale(s.to_string()))
    }
}

/// Message catalog for one locale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    root: Map<String, Value>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a catalog from JSON text. The top level must be an object.
    pub fn from_json_str(json: &str) -> Result<Self, I18nError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| I18nError::LoadError(e.to_string()))?;
        Self::from_value(value)
    }

    /// Wrap an already parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self, I18nError> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            other => Err(I18nError::LoadError(format!(
                "catalog root must be an object, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// Look up a dotted key. Missing segments and non-string leaves are misses.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        let mut segments = key.split('.');
        let mut current = self.root.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        current.as_str()
    }

    /// Insert a string at a dotted key, creating intermediate objects.
    ///
    /// A non-object value sitting on the path is replaced.
    pub fn insert(&mut self, key: &str, message: impl Into<String>) {
        let mut segments: Vec<&str> = key.split('.').collect();
        let Some(leaf) = segments.pop() else { return };

        let mut node = &mut self.root;
        for segment in segments {
            let entry = node
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            node = match entry {
                Value::Object(map) => map,
                _ => unreachable!("entry was just made an object"),
            };
        }
        node.insert(leaf.to_string(), Value::String(message.into()));
    }

    /// Deep-merge `overlay` into this catalog; overlay strings win.
    pub fn merge(&mut self, overlay: Catalog) {
        merge_maps(&mut self.root, overlay.root);
    }

    /// All dotted keys that resolve to strings, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        collect_keys(&self.root, String::new(), &mut keys);
        keys.sort();
        keys
    }

    /// Number of translatable strings.
    pub fn len(&self) -> usize {
        self.keys().len()
    }

    /// Whether the catalog holds no strings.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The catalog as a JSON object, for shipping to a front end.
    pub fn to_value(&self) -> Value {
        Value::Object(self.root.clone())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn merge_maps(base: &mut Map<String, Value>, overlay: Map<String, Value>) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                merge_maps(existing, incoming)
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

fn collect_keys(map: &Map<String, Value>, prefix: String, out: &mut Vec<String>) {
    for (key, value) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::String(_) => out.push(path),
            Value::Object(child) => collect_keys(child, path, out),
            _ => {}
        }
    }
}

/// The locale selected for one caller (request, session, job).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LocaleContext {
    locale: Locale,
}

impl LocaleContext {
    /// Create a context for a locale.
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    /// Select a different locale.
    pub fn set_locale(&mut self, locale: Locale) {
        self.locale = locale;
    }

    /// Currently selected locale.
    pub fn locale(&self) -> Locale {
        self.locale
    }
}

/// Catalog set plus the default locale used for fallback.
#[derive(Debug, Clone, Default)]
pub struct I18n {
    default_locale: Locale,
    catalogs: HashMap<Locale, Catalog>,
}

impl I18n {
    /// Create an instance with no catalogs.
    pub fn new(default_locale: Locale) -> Self {
        Self {
            default_locale,
            catalogs: HashMap::new(),
        }
    }

    /// Create an instance holding the catalogs compiled into the crate.
    pub fn with_embedded() -> Self {
        let mut i18n = Self::new(Locale::En);
        for (locale, catalog) in loader::embedded_catalogs() {
            i18n.insert_catalog(locale, catalog);
        }
        i18n
    }

    /// Add or replace a catalog for a locale.
    pub fn insert_catalog(&mut self, locale: Locale, catalog: Catalog) {
        self.catalogs.insert(locale, catalog);
    }

    /// Merge a catalog over whatever is loaded for `locale`.
    pub fn merge_catalog(&mut self, locale: Locale, overlay: Catalog) {
        self.catalogs.entry(locale).or_default().merge(overlay);
    }

    /// Catalog for a locale, if loaded.
    pub fn catalog(&self, locale: Locale) -> Option<&Catalog> {
        self.catalogs.get(&locale)
    }

    /// Locale used when a key is missing from the selected one.
    pub fn default_locale(&self) -> Locale {
        self.default_locale
    }

    /// A fresh context pointing at the default locale.
    pub fn context(&self) -> LocaleContext {
        LocaleContext::new(self.default_locale)
    }

    /// Locales with a loaded catalog, default first.
    pub fn list_locales(&self) -> Vec<Locale> {
        let mut locales = vec![self.default_locale];
        locales.extend(
            Locale::all()
                .into_iter()
                .filter(|l| *l != self.default_locale && self.catalogs.contains_key(l)),
        );
        locales
    }

    /// Find a message, walking the fallback chain. Returns `None` on a full miss.
    pub fn lookup(&self, locale: Locale, key: &str) -> Option<&str> {
        detect::locale_fallback_chain(locale, self.default_locale)
            .into_iter()
            .find_map(|l| self.catalogs.get(&l).and_then(|c| c.lookup(key)))
    }

    /// Translate a key for the context's locale; a full miss returns the key.
    pub fn translate(&self, ctx: &LocaleContext, key: &str) -> String {
        match self.lookup(ctx.locale(), key) {
            Some(message) => message.to_string(),
            None => {
                tracing::trace!(key = key, locale = %ctx.locale(), "translation missing");
                key.to_string()
            }
        }
    }

    /// Translate and substitute `{name}` placeholders.
    pub fn translate_with<I, K, V>(&self, ctx: &LocaleContext, key: &str, vars: I) -> String
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: fmt::Display,
    {
        interpolate(&self.translate(ctx, key), vars)
    }
}

/// Replace each `{name}` token with its value. Unknown tokens are left alone.
pub fn interpolate<I, K, V>(template: &str, vars: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: fmt::Display,
{
    vars.into_iter().fold(template.to_string(), |msg, (name, value)| {
        msg.replace(&format!("{{{}}}", name.as_ref()), &value.to_string())
    })
}

/// i18n errors.
#[derive(Debug, thiserror::Error)]
pub enum I18nError {
    #[error("failed to load catalog: {0}")]
    LoadError(String),

    #[error("invalid locale: {0}")]
    InvalidLocale(String),

    #[error("i/o error reading catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Translation macro.
///
/// `t!(i18n, ctx, "key")` or `t!(i18n, ctx, "key", name = value, ...)`.
#[macro_export]
macro_rules! t {
    ($i18n:expr, $ctx:expr, $key:expr) => {
        $i18n.translate($ctx, $key)
    };
    ($i18n:expr, $ctx:expr, $key:expr, $($name:ident = $value:expr),+ $(,)?) => {
        $i18n.translate_with(
            $ctx,
            $key,
            [$((stringify!($name), $value.to_string())),+],
        )
    };
}

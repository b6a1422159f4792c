//! Catalog loading.
//!
//! English, Spanish, French and German catalogs ship inside the binary.
//! Deployments can drop `<code>.json` files into a directory to extend or
//! override them without rebuilding.

use super::{Catalog, I18n, I18nError, Locale};
use std::fs;
use std::path::{Path, PathBuf};

const EMBEDDED: [(Locale, &str); 4] = [
    (Locale::En, include_str!("../locales/en.json")),
    (Locale::Es, include_str!("../locales/es.json")),
    (Locale::Fr, include_str!("../locales/fr.json")),
    (Locale::De, include_str!("../locales/de.json")),
];

/// Catalog loader configuration.
#[derive(Debug, Clone, Default)]
pub struct LoaderConfig {
    /// Directory containing `<code>.json` override files.
    pub locale_dir: Option<PathBuf>,
    /// Locale used for fallback.
    pub default_locale: Locale,
}

/// Catalogs compiled into the crate.
pub fn embedded_catalogs() -> Vec<(Locale, Catalog)> {
    EMBEDDED
        .iter()
        .filter_map(|(locale, json)| match Catalog::from_json_str(json) {
            Ok(catalog) => Some((*locale, catalog)),
            Err(e) => {
                tracing::error!(locale = %locale, error = %e, "embedded catalog is invalid");
                None
            }
        })
        .collect()
}

/// Load a single catalog file.
pub fn load_catalog_file(path: &Path) -> Result<Catalog, I18nError> {
    let content = fs::read_to_string(path).map_err(|source| I18nError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Catalog::from_json_str(&content)
}

/// Load every `<code>.json` present in `dir`. Missing files are skipped.
pub fn load_dir(dir: &Path) -> Result<Vec<(Locale, Catalog)>, I18nError> {
    let mut catalogs = Vec::new();
    for locale in Locale::all() {
        let path = dir.join(format!("{}.json", locale.code()));
        if !path.is_file() {
            continue;
        }
        let catalog = load_catalog_file(&path)?;
        tracing::debug!(locale = %locale, path = %path.display(), keys = catalog.len(), "loaded catalog override");
        catalogs.push((locale, catalog));
    }
    Ok(catalogs)
}

/// Build an [`I18n`] from the embedded catalogs plus any directory overrides.
pub fn build(config: &LoaderConfig) -> Result<I18n, I18nError> {
    let mut i18n = I18n::new(config.default_locale);
    for (locale, catalog) in embedded_catalogs() {
        i18n.insert_catalog(locale, catalog);
    }

    if let Some(dir) = &config.locale_dir {
        if dir.is_dir() {
            for (locale, overlay) in load_dir(dir)? {
                i18n.merge_catalog(locale, overlay);
            }
        } else {
            tracing::warn!(dir = %dir.display(), "locale directory not found, using embedded catalogs");
        }
    }

    Ok(i18n)
}

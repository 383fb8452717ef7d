//! Locale handling and translation lookup.
//!
//! Locale tables are plain JSON files (`en.json`, `ru.json`) loaded once at
//! startup and injected into the HTTP façade, replacing any per-request
//! file loading. Lookups fall back from the requested locale to English,
//! and misses are never an error: callers receive the key (or the engine's
//! own text) instead.

use std::collections::HashMap;
use std::path::Path;

use log::debug;
use serde::Deserialize;

use crate::error_handling::InitializationError;

/// Supported display locales.
///
/// Unrecognized codes silently fall back to [`Locale::Ru`], the service
/// default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    En,
    Ru,
}

impl Locale {
    /// Resolves the `lang` query parameter. Missing or unknown values fall
    /// back to Russian.
    pub fn from_param(param: Option<&str>) -> Locale {
        match param {
            Some("en") => Locale::En,
            Some("ru") | None => Locale::Ru,
            Some(other) => {
                debug!("Unknown lang '{other}', falling back to ru");
                Locale::Ru
            }
        }
    }

    /// Two-letter locale code.
    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ru => "ru",
        }
    }
}

/// Localized title/description pair for one issue identifier.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueText {
    /// Short display title.
    pub title: String,
    /// Longer explanation, when the table carries one.
    #[serde(default)]
    pub description: Option<String>,
}

/// One locale's translation table.
#[derive(Debug, Default, Deserialize)]
pub struct LocaleTable {
    /// Criterion identifier → display name.
    #[serde(default)]
    pub criteria: HashMap<String, String>,
    /// Issue identifier → localized text.
    #[serde(default)]
    pub issues: HashMap<String, IssueText>,
    /// Error key → localized error message.
    #[serde(default)]
    pub errors: HashMap<String, String>,
}

/// Pre-validated translation tables for all supported locales.
///
/// Constructed once at startup; handlers receive it behind an `Arc`.
#[derive(Debug)]
pub struct Translations {
    en: LocaleTable,
    ru: LocaleTable,
}

impl Translations {
    /// Loads `en.json` and `ru.json` from `dir`.
    ///
    /// Both files must exist and parse; a service with half its locales
    /// missing would fail at request time in harder-to-debug ways.
    pub fn load(dir: &Path) -> Result<Self, InitializationError> {
        Ok(Translations {
            en: Self::load_table(dir, "en")?,
            ru: Self::load_table(dir, "ru")?,
        })
    }

    /// Builds a `Translations` from in-memory tables. Used by tests.
    pub fn from_tables(en: LocaleTable, ru: LocaleTable) -> Self {
        Translations { en, ru }
    }

    fn load_table(dir: &Path, locale: &str) -> Result<LocaleTable, InitializationError> {
        let path = dir.join(format!("{locale}.json"));
        let raw = std::fs::read_to_string(&path).map_err(|e| {
            InitializationError::TranslationError {
                locale: locale.to_string(),
                message: format!("{}: {e}", path.display()),
            }
        })?;
        serde_json::from_str(&raw).map_err(|e| InitializationError::TranslationError {
            locale: locale.to_string(),
            message: format!("{}: {e}", path.display()),
        })
    }

    fn table(&self, locale: Locale) -> &LocaleTable {
        match locale {
            Locale::En => &self.en,
            Locale::Ru => &self.ru,
        }
    }

    /// Display name for a criterion identifier. Falls back to English, then
    /// to the identifier itself.
    pub fn criterion(&self, locale: Locale, key: &str) -> String {
        self.table(locale)
            .criteria
            .get(key)
            .or_else(|| self.en.criteria.get(key))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    /// Localized text for an issue identifier. Falls back to English;
    /// returns `None` when neither table knows the key, so callers can use
    /// engine-provided text instead.
    pub fn issue(&self, locale: Locale, key: &str) -> Option<IssueText> {
        self.table(locale)
            .issues
            .get(key)
            .or_else(|| self.en.issues.get(key))
            .cloned()
    }

    /// Localized error message for an error key. Falls back to English,
    /// then to the key itself.
    pub fn error_message(&self, locale: Locale, key: &str) -> String {
        self.table(locale)
            .errors
            .get(key)
            .or_else(|| self.en.errors.get(key))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

#![forbid(unsafe_code)]

//! Key-based string catalog with locale fallback and interpolation.
//!
//! # Lookup order
//!
//! For `get(locale, key)`:
//!
//! 1. The exact locale (`"en-US"`).
//! 2. Its language part (`"en"`), when the locale has a region suffix.
//! 3. Each locale of the fallback chain, in order.
//!
//! # Interpolation
//!
//! `{name}` tokens are replaced by the matching argument. Replacement is a
//! single pass: substituted values are never re-expanded, and tokens with no
//! matching argument are kept verbatim.

use std::collections::HashMap;
use std::fmt;

/// Keys of the strings the layer panel needs.
pub mod keys {
    /// Tooltip of the drag handle on sortable rows.
    pub const SORT_HELP: &str = "layers.sort.help";
    /// Title of a layer with neither a label nor a source element.
    pub const LAYER_NO_TITLE: &str = "layer.no_title";
    /// Message shown when the panel has no layers at all.
    pub const LAYERS_EMPTY: &str = "layers.empty";
}

/// Strings of one locale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocaleStrings {
    strings: HashMap<String, String>,
}

impl LocaleStrings {
    /// Create an empty string table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a string.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.strings.insert(key.into(), value.into());
    }

    /// Look up a string.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.strings.get(key).map(String::as_str)
    }

    /// Number of strings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

/// Errors from strict catalog lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum I18nError {
    /// Neither the locale nor any fallback locale is registered.
    MissingLocale(String),
    /// The key is absent from the locale and every fallback.
    MissingKey {
        /// Requested locale.
        locale: String,
        /// Requested key.
        key: String,
    },
}

impl fmt::Display for I18nError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingLocale(locale) => write!(f, "no strings registered for locale {locale}"),
            Self::MissingKey { locale, key } => {
                write!(f, "missing string {key} for locale {locale}")
            }
        }
    }
}

impl std::error::Error for I18nError {}

/// Catalog of localized strings.
#[derive(Debug, Clone, Default)]
pub struct StringCatalog {
    locales: HashMap<String, LocaleStrings>,
    fallback_chain: Vec<String>,
}

impl StringCatalog {
    /// Create an empty catalog with no fallback.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding the English panel strings, with `en` as fallback.
    #[must_use]
    pub fn with_panel_defaults() -> Self {
        let mut en = LocaleStrings::new();
        en.insert(keys::SORT_HELP, "Drag to reorder layers");
        en.insert(keys::LAYER_NO_TITLE, "Untitled layer");
        en.insert(keys::LAYERS_EMPTY, "No layers");

        let mut catalog = Self::new();
        catalog.add_locale("en", en);
        catalog.set_fallback_chain(vec!["en".into()]);
        catalog
    }

    /// Register (or replace) the strings of a locale.
    pub fn add_locale(&mut self, locale: impl Into<String>, strings: LocaleStrings) {
        self.locales.insert(locale.into(), strings);
    }

    /// Set the locales tried, in order, when a lookup misses.
    pub fn set_fallback_chain(&mut self, chain: Vec<String>) {
        self.fallback_chain = chain;
    }

    /// Whether strings are registered for `locale`.
    #[must_use]
    pub fn has_locale(&self, locale: &str) -> bool {
        self.locales.contains_key(locale)
    }

    fn candidates<'a>(&'a self, locale: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        let language = locale
            .split_once(['-', '_'])
            .map(|(language, _)| language);
        std::iter::once(locale)
            .chain(language)
            .chain(self.fallback_chain.iter().map(String::as_str))
    }

    /// Look up `key` for `locale`, following the fallback order.
    #[must_use]
    pub fn get(&self, locale: &str, key: &str) -> Option<&str> {
        self.candidates(locale)
            .filter_map(|candidate| self.locales.get(candidate))
            .find_map(|strings| strings.get(key))
    }

    /// Look up `key` and interpolate `{name}` tokens from `args`.
    #[must_use]
    pub fn format(&self, locale: &str, key: &str, args: &[(&str, &str)]) -> Option<String> {
        self.get(locale, key)
            .map(|template| interpolate(template, args))
    }

    /// Strict lookup reporting why a string is missing.
    ///
    /// # Errors
    ///
    /// [`I18nError::MissingLocale`] when no candidate locale is registered,
    /// [`I18nError::MissingKey`] otherwise.
    pub fn require(&self, locale: &str, key: &str) -> Result<&str, I18nError> {
        if let Some(value) = self.get(locale, key) {
            return Ok(value);
        }
        if self.candidates(locale).any(|candidate| self.has_locale(candidate)) {
            Err(I18nError::MissingKey {
                locale: locale.to_owned(),
                key: key.to_owned(),
            })
        } else {
            Err(I18nError::MissingLocale(locale.to_owned()))
        }
    }

    /// Look up `key`, falling back to the key itself when missing.
    #[must_use]
    pub fn text<'a>(&'a self, locale: &str, key: &'a str) -> &'a str {
        self.get(locale, key).unwrap_or(key)
    }
}

fn interpolate(template: &str, args: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];
        let Some(close) = after_open.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };
        let name = &after_open[..close];
        match args.iter().find(|(arg, _)| *arg == name) {
            Some((_, value)) => out.push_str(value),
            None => {
                out.push('{');
                out.push_str(name);
                out.push('}');
            }
        }
        rest = &after_open[close + 1..];
    }
    out.push_str(rest);
    out
}

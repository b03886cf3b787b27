#![forbid(unsafe_code)]

//! Internationalization (i18n) for maplayers.
//!
//! Provides externalized string storage with key-based lookup, locale
//! fallback chains, and `{name}` variable interpolation.
//!
//! # How it fits in the system
//! The layer panel resolves its fixed strings (drag help, untitled layer,
//! empty panel) through a [`StringCatalog`] before building rows. This crate
//! does not depend on the runtime or the widgets, keeping lookup testable on
//! its own.

pub mod catalog;

pub use catalog::{I18nError, LocaleStrings, StringCatalog, keys};

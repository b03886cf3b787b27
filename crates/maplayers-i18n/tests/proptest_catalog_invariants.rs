//! Property-based invariant tests for the string catalog.
//!
//! 1. Interpolation with no placeholders is identity
//! 2. Interpolation is not recursive
//! 3. Missing args leave placeholder tokens intact
//! 4. Missing key always returns None
//! 5. Lookup never panics on arbitrary locale strings
//! 6. Panel defaults resolve every panel key for any locale

use maplayers_i18n::catalog::{LocaleStrings, StringCatalog, keys};
use proptest::prelude::*;

fn single(template: &str) -> StringCatalog {
    let mut catalog = StringCatalog::new();
    let mut en = LocaleStrings::new();
    en.insert("test", template);
    catalog.add_locale("en", en);
    catalog
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Interpolation with no placeholders is identity
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn interpolation_no_placeholders_identity(text in "[a-zA-Z0-9 .,!?]*") {
        let result = single(&text).format("en", "test", &[("name", "x")]);
        prop_assert_eq!(result.as_deref(), Some(text.as_str()));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Interpolation is not recursive
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn interpolation_not_recursive() {
    let catalog = single("Layer {name}!");
    let result = catalog.format("en", "test", &[("name", "{name}")]);
    assert_eq!(result, Some("Layer {name}!".into()));
    let result = catalog.format("en", "test", &[("name", "{other}")]);
    assert_eq!(result, Some("Layer {other}!".into()));
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Missing args leave placeholder tokens intact
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn missing_args_preserve_tokens(name in "[a-z]{1,10}") {
        let template = format!("Value: {{{name}}}");
        let result = single(&template).format("en", "test", &[]);
        prop_assert_eq!(result, Some(template));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Missing key always returns None
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn missing_key_returns_none(key in "[a-z.]{1,20}") {
        let catalog = StringCatalog::new();
        prop_assert_eq!(catalog.get("en", &key), None);
        prop_assert_eq!(catalog.format("en", &key, &[]), None);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5 + 6. Arbitrary locales never panic; defaults always resolve
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn panel_defaults_resolve_for_any_locale(locale in "\\PC{0,12}") {
        let catalog = StringCatalog::with_panel_defaults();
        for key in [keys::SORT_HELP, keys::LAYER_NO_TITLE, keys::LAYERS_EMPTY] {
            prop_assert!(catalog.get(&locale, key).is_some(), "{} unresolved for {:?}", key, locale);
        }
    }
}

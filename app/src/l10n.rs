//! Localization of UI strings.
//!
//! A [`Localizer`] is built once at bootstrap from the locale, the string
//! catalog and the plural rule embedded in the page, then handed to every view
//! that renders translatable text. Lookups fall back to the msgid so a missing
//! translation renders English rather than nothing.

extern crate alloc;
use alloc::collections::BTreeMap;
use alloc::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod plural;

pub use plural::{PluralParseError, PluralRule};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum L10nError {
    #[error("invalid plural expression {expression:?}: {source}")]
    PluralExpression {
        expression: String,
        source: PluralParseError,
    },
}

/// A translation: either a single string or one string per plural form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CatalogEntry {
    Single(String),
    Plural(Vec<String>),
}

pub type StringCatalog = BTreeMap<String, CatalogEntry>;

#[derive(Debug)]
struct Inner {
    locale: String,
    catalog: StringCatalog,
    plural: PluralRule,
}

/// Translates UI strings for one locale. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Localizer {
    inner: Arc<Inner>,
}

impl Localizer {
    /// Builds a localizer from the page's locale data.
    ///
    /// # Errors
    ///
    /// Returns [`L10nError::PluralExpression`] if `plural_expression` does not
    /// parse.
    pub fn new(
        locale: impl Into<String>,
        catalog: StringCatalog,
        plural_expression: &str,
    ) -> Result<Self, L10nError> {
        let plural =
            PluralRule::parse(plural_expression).map_err(|source| L10nError::PluralExpression {
                expression: plural_expression.to_owned(),
                source,
            })?;
        Ok(Self::with_rule(locale, catalog, plural))
    }

    pub fn with_rule(locale: impl Into<String>, catalog: StringCatalog, plural: PluralRule) -> Self {
        Self {
            inner: Arc::new(Inner {
                locale: locale.into(),
                catalog,
                plural,
            }),
        }
    }

    /// An English localizer with an empty catalog.
    #[must_use]
    pub fn untranslated() -> Self {
        Self::with_rule("en-US", StringCatalog::new(), PluralRule::germanic())
    }

    #[must_use]
    pub fn locale(&self) -> &str {
        &self.inner.locale
    }

    #[must_use]
    pub fn gettext(&self, msgid: &str) -> String {
        match self.inner.catalog.get(msgid) {
            Some(CatalogEntry::Single(text)) => text.clone(),
            Some(CatalogEntry::Plural(forms)) => {
                forms.first().cloned().unwrap_or_else(|| msgid.to_owned())
            }
            None => msgid.to_owned(),
        }
    }

    /// Picks the plural form of `singular` for `n`.
    ///
    /// Without a catalog entry the English forms are used.
    #[must_use]
    pub fn ngettext(&self, singular: &str, plural: &str, n: u64) -> String {
        let index = self.inner.plural.index(n);
        match self.inner.catalog.get(singular) {
            Some(CatalogEntry::Plural(forms)) if index < forms.len() => forms[index].clone(),
            Some(CatalogEntry::Single(text)) => text.clone(),
            _ if n == 1 => singular.to_owned(),
            _ => plural.to_owned(),
        }
    }

    /// Replaces `%(name)s` placeholders with the given values.
    ///
    /// Unknown placeholders are left as-is.
    #[must_use]
    pub fn interpolate(format: &str, values: &[(&str, &str)]) -> String {
        let mut out = String::with_capacity(format.len());
        let mut rest = format;
        while let Some(start) = rest.find("%(") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let replacement = after.find(")s").and_then(|end| {
                let name = &after[..end];
                values
                    .iter()
                    .find(|(key, _)| *key == name)
                    .map(|(_, value)| (*value, end + 2))
            });
            match replacement {
                Some((value, consumed)) => {
                    out.push_str(value);
                    rest = &after[consumed..];
                }
                None => {
                    out.push_str("%(");
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }
}

impl Default for Localizer {
    fn default() -> Self {
        Self::untranslated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn french() -> Localizer {
        let catalog: StringCatalog = serde_json::from_value(serde_json::json!({
            "Sign in": "Connexion",
            "%(count)s result": ["%(count)s résultat", "%(count)s résultats"],
        }))
        .unwrap();
        Localizer::new("fr", catalog, "(n > 1)").unwrap()
    }

    #[test]
    fn translates_known_strings() {
        let l10n = french();

        assert_eq!(l10n.locale(), "fr");
        assert_eq!(l10n.gettext("Sign in"), "Connexion");
    }

    #[test]
    fn falls_back_to_msgid() {
        let l10n = french();

        assert_eq!(l10n.gettext("Sign out"), "Sign out");
        assert_eq!(Localizer::untranslated().gettext("Sign in"), "Sign in");
    }

    #[test]
    fn selects_plural_forms_with_locale_rule() {
        let l10n = french();

        assert_eq!(
            l10n.ngettext("%(count)s result", "%(count)s results", 0),
            "%(count)s résultat"
        );
        assert_eq!(
            l10n.ngettext("%(count)s result", "%(count)s results", 2),
            "%(count)s résultats"
        );
    }

    #[test]
    fn plural_fallback_uses_english_forms() {
        let l10n = Localizer::untranslated();

        assert_eq!(l10n.ngettext("page", "pages", 1), "page");
        assert_eq!(l10n.ngettext("page", "pages", 3), "pages");
    }

    #[test]
    fn interpolates_named_placeholders() {
        assert_eq!(
            Localizer::interpolate("%(count)s results for %(query)s", &[
                ("count", "3"),
                ("query", "grid")
            ]),
            "3 results for grid"
        );
        assert_eq!(
            Localizer::interpolate("100%(missing)s", &[]),
            "100%(missing)s"
        );
    }

    #[test]
    fn rejects_invalid_plural_expression() {
        let err = Localizer::new("xx", StringCatalog::new(), "n +").unwrap_err();

        assert_matches!(err, L10nError::PluralExpression { ref expression, .. } if expression == "n +");
    }
}

use serde::{Deserialize, Serialize};

use crate::l10n::StringCatalog;

/// Data embedded by the server in the page that loads the front end.
///
/// It is handed to the bootstrap exactly once and dropped after the UI tree
/// has been built from it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MountData {
    pub url: String,
    #[serde(default)]
    pub document_data: Option<DocumentData>,
    pub locale: String,
    #[serde(default)]
    pub string_catalog: StringCatalog,
    /// Gettext plural expression for `locale`.
    #[serde(default = "default_plural_function")]
    pub plural_function: String,
}

fn default_plural_function() -> String {
    "(n != 1)".to_owned()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Link {
    pub url: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Translation {
    pub locale: String,
    pub url: String,
    pub title: String,
}

/// The server-rendered document the single page app starts on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentData {
    pub locale: String,
    pub slug: String,
    pub title: String,
    pub summary: String,
    #[serde(rename = "bodyHTML")]
    pub body_html: String,
    #[serde(rename = "tocHTML")]
    pub toc_html: String,
    pub parents: Vec<Link>,
    pub translations: Vec<Translation>,
    pub last_modified: Option<String>,
}

//! Fragments - immutable template nodes describing target code.
//!
//! A format is an ordered list of fragments. Fragments never touch story
//! nodes directly; resolution goes through a resolution context.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One node of a code template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fragment {
    /// Text emitted verbatim.
    Literal { text: String },

    /// A named attribute looked up through the scope chain.
    Reference { name: String },

    /// Repeats `format` once per item of the `data` collection.
    Series {
        data: String,
        #[serde(default)]
        separator: String,
        #[serde(default)]
        unique: bool,
        /// Keep only items whose name contains this text.
        #[serde(default)]
        filter: Option<String>,
        format: Vec<Fragment>,
    },

    /// Resolves `format` against a single related item.
    Scope {
        data: String,
        #[serde(default)]
        name_ref: Option<String>,
        format: Vec<Fragment>,
    },

    /// Resolves `format` only when `condition` holds (or fails, if negated).
    Conditional {
        condition: String,
        #[serde(default)]
        negate: bool,
        format: Vec<Fragment>,
    },

    /// Current indent, the contents, then a line break.
    Line { fragments: Vec<Fragment> },

    /// Contents resolved one indent level deeper.
    Indent { fragments: Vec<Fragment> },

    /// Inlines a named format from the format library.
    FormatRef { format: String },
}

impl Fragment {
    pub fn literal(text: impl Into<String>) -> Self {
        Fragment::Literal { text: text.into() }
    }

    pub fn reference(name: impl Into<String>) -> Self {
        Fragment::Reference { name: name.into() }
    }

    pub fn series(data: impl Into<String>, separator: impl Into<String>, format: Vec<Fragment>) -> Self {
        Fragment::Series {
            data: data.into(),
            separator: separator.into(),
            unique: false,
            filter: None,
            format,
        }
    }

    pub fn scope(data: impl Into<String>, format: Vec<Fragment>) -> Self {
        Fragment::Scope {
            data: data.into(),
            name_ref: None,
            format,
        }
    }

    pub fn conditional(condition: impl Into<String>, format: Vec<Fragment>) -> Self {
        Fragment::Conditional {
            condition: condition.into(),
            negate: false,
            format,
        }
    }

    pub fn line(fragments: Vec<Fragment>) -> Self {
        Fragment::Line { fragments }
    }

    pub fn indent(fragments: Vec<Fragment>) -> Self {
        Fragment::Indent { fragments }
    }

    pub fn format_ref(format: impl Into<String>) -> Self {
        Fragment::FormatRef {
            format: format.into(),
        }
    }
}

/// Named formats of a translator, keyed case-insensitively.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormatLibrary {
    formats: HashMap<String, Vec<Fragment>>,
}

impl FormatLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a format, replacing any existing one with the same keyword.
    pub fn insert(&mut self, keyword: impl AsRef<str>, format: Vec<Fragment>) {
        self.formats.insert(normalize(keyword.as_ref()), format);
    }

    pub fn get(&self, keyword: &str) -> Option<&[Fragment]> {
        self.formats.get(&normalize(keyword)).map(Vec::as_slice)
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.formats.contains_key(&normalize(keyword))
    }

    pub fn len(&self) -> usize {
        self.formats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }
}

impl FromIterator<(String, Vec<Fragment>)> for FormatLibrary {
    fn from_iter<I: IntoIterator<Item = (String, Vec<Fragment>)>>(iter: I) -> Self {
        let mut library = FormatLibrary::new();
        for (keyword, format) in iter {
            library.insert(keyword, format);
        }
        library
    }
}

fn normalize(keyword: &str) -> String {
    keyword.to_ascii_lowercase()
}

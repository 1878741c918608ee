use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Kind of product referenced from the feed. Each one is archived in its own directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Warning text (`*web.txt`)
    #[serde(rename = "text")]
    Text,
    /// Warning graphic (`*.gif`)
    #[serde(rename = "gif")]
    Graphic,
    /// Prognostic reasoning (`*prog.txt`)
    #[serde(rename = "prog")]
    Prognostic,
    /// JMV 3.0 track data (`*.tcw`)
    #[serde(rename = "jmv")]
    StructuredData,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Text,
        Category::Graphic,
        Category::Prognostic,
        Category::StructuredData,
    ];

    pub fn dir_name(self) -> &'static str {
        match self {
            Category::Text => "text",
            Category::Graphic => "gif",
            Category::Prognostic => "prog",
            Category::StructuredData => "jmv",
        }
    }

    pub fn from_dir_name(name: &str) -> Option<Category> {
        Category::ALL
            .into_iter()
            .find(|category| category.dir_name().eq_ignore_ascii_case(name))
    }

    /// Built-in pattern. Group 1 captures the file name; the URL may not
    /// cross whitespace, quotes or tag delimiters.
    pub fn default_pattern(self) -> &'static str {
        match self {
            Category::Text => r#"(?i)https://[^\s"'<>]*/([^/\s"'<>]+web\.txt)"#,
            Category::Graphic => r#"(?i)https://[^\s"'<>]*/([^/\s"'<>]+\.gif)"#,
            Category::Prognostic => r#"(?i)https://[^\s"'<>]*/([^/\s"'<>]+prog\.txt)"#,
            Category::StructuredData => r#"(?i)https://[^\s"'<>]*/([^/\s"'<>]+\.tcw)"#,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductReference {
    pub category: Category,
    pub source_url: String,
    pub derived_filename: String,
}

#[derive(Debug, Clone)]
pub struct ProductMatcher {
    category: Category,
    pattern: Regex,
}

impl ProductMatcher {
    pub fn new(category: Category, pattern: &str) -> Result<Self, regex::Error> {
        Ok(ProductMatcher {
            category,
            pattern: Regex::new(pattern)?,
        })
    }

    pub fn default_for(category: Category) -> Self {
        ProductMatcher {
            category,
            pattern: Regex::new(category.default_pattern()).expect("built-in pattern is valid"),
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

/// Scan the raw feed text for product URLs, in document order.
///
/// Duplicate URLs are yielded once per occurrence; the archiver's content
/// check is what keeps them from being stored twice.
pub fn extract<'a>(
    matcher: &'a ProductMatcher,
    text: &'a str,
) -> impl Iterator<Item = ProductReference> + 'a {
    matcher.pattern.captures_iter(text).filter_map(move |caps| {
        let url = caps.get(0)?.as_str();
        let name = match caps.get(1) {
            Some(name) => name.as_str(),
            None => url.rsplit('/').next().unwrap_or(url),
        };
        if name.is_empty() {
            return None;
        }

        Some(ProductReference {
            category: matcher.category,
            source_url: url.to_string(),
            derived_filename: sanitize_filename(name),
        })
    })
}

/// Replace a leading character that could break a path with `_`.
/// Only the first character is inspected.
pub fn sanitize_filename(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if !(first.is_ascii_alphanumeric() || first == '-' || first == '.') => {
            format!("_{}", chars.as_str())
        }
        _ => name.to_string(),
    }
}

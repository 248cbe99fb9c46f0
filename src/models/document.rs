//! The site document: every piece of editable site content lives in one JSON
//! object keyed by section name (`site`, `hero`, `portfolio`, ...).
//!
//! Sections are independent. Replacing one never touches its siblings, and
//! because the map preserves insertion order, untouched sections serialize
//! back exactly as they were read.

use serde_json::{Map, Value};
use thiserror::Error;

use super::sections::SectionKind;

/// Sections created when the content file does not exist yet.
const DEFAULT_LAYOUT: [(&str, fn() -> Value); 7] = [
    ("site", empty_object),
    ("hero", empty_object),
    ("about", empty_object),
    ("portfolio", empty_array),
    ("blog", empty_array),
    ("social", empty_array),
    ("contact", empty_object),
];

fn empty_object() -> Value {
    Value::Object(Map::new())
}

fn empty_array() -> Value {
    Value::Array(Vec::new())
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("stored content is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("stored content must be a JSON object at the top level")]
    NotAnObject,
    #[error("section name must not be empty")]
    EmptySection,
    #[error("section `{section}` does not match its schema: {reason}")]
    Schema { section: String, reason: String },
    #[error("failed to serialize content: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// The whole content store, held as an ordered map of section name to value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteDocument {
    sections: Map<String, Value>,
}

impl SiteDocument {
    /// Parse stored bytes. Blank content is treated as an empty document.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DocumentError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        match serde_json::from_slice::<Value>(bytes).map_err(DocumentError::Parse)? {
            Value::Object(sections) => Ok(Self { sections }),
            _ => Err(DocumentError::NotAnObject),
        }
    }

    /// The layout used when no content file exists on the branch yet.
    pub fn default_layout() -> Self {
        let sections = DEFAULT_LAYOUT
            .iter()
            .map(|(name, init)| (name.to_string(), init()))
            .collect();
        Self { sections }
    }

    /// Replace a section wholesale, returning the previous value.
    ///
    /// This is not a deep merge: fields absent from `data` are gone afterwards.
    /// An existing section keeps its position; a new one is appended.
    pub fn replace_section(&mut self, name: &str, data: Value) -> Option<Value> {
        self.sections.insert(name.to_string(), data)
    }

    /// Sections whose stored shape does not match their schema.
    pub fn schema_problems(&self) -> Vec<DocumentError> {
        self.sections
            .iter()
            .filter_map(|(name, value)| SectionKind::of(name).validate(name, value).err())
            .collect()
    }

    /// Two-space pretty JSON, no trailing newline.
    pub fn to_pretty_bytes(&self) -> Result<Vec<u8>, DocumentError> {
        serde_json::to_vec_pretty(&self.sections).map_err(DocumentError::Serialize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> SiteDocument {
        SiteDocument::from_slice(value.to_string().as_bytes()).unwrap()
    }

    #[test]
    fn blank_content_is_an_empty_document() {
        assert!(SiteDocument::from_slice(b"").unwrap().sections.is_empty());
        assert!(SiteDocument::from_slice(b"  \n").unwrap().sections.is_empty());
    }

    #[test]
    fn top_level_must_be_an_object() {
        assert!(matches!(
            SiteDocument::from_slice(b"[1, 2]"),
            Err(DocumentError::NotAnObject)
        ));
        assert!(matches!(
            SiteDocument::from_slice(b"{not json"),
            Err(DocumentError::Parse(_))
        ));
    }

    #[test]
    fn default_layout_has_every_known_section() {
        let layout = SiteDocument::default_layout();
        let names: Vec<_> = layout.sections.keys().map(String::as_str).collect();
        assert_eq!(
            names,
            ["site", "hero", "about", "portfolio", "blog", "social", "contact"]
        );
        assert_eq!(layout.sections.get("blog"), Some(&json!([])));
        assert_eq!(layout.sections.get("hero"), Some(&json!({})));
    }

    #[test]
    fn replace_is_wholesale_not_merge() {
        let mut document = doc(json!({ "contact": { "phone": "1" } }));
        let previous = document.replace_section("contact", json!({ "email": "a@b.com" }));

        assert_eq!(previous, Some(json!({ "phone": "1" })));
        assert_eq!(
            document.sections.get("contact"),
            Some(&json!({ "email": "a@b.com" }))
        );
    }

    #[test]
    fn replacing_keeps_sibling_order_and_bytes() {
        let original = br#"{
  "site": {
    "title": "Studio"
  },
  "hero": {
    "name": "Ana"
  },
  "blog": []
}"#;
        let mut document = SiteDocument::from_slice(original).unwrap();
        document.replace_section("hero", json!({ "name": "Bea" }));

        let written = String::from_utf8(document.to_pretty_bytes().unwrap()).unwrap();
        assert_eq!(
            written,
            "{\n  \"site\": {\n    \"title\": \"Studio\"\n  },\n  \"hero\": {\n    \"name\": \"Bea\"\n  },\n  \"blog\": []\n}"
        );
    }

    #[test]
    fn new_sections_are_appended() {
        let mut document = doc(json!({ "site": {} }));
        assert!(document.replace_section("pages", json!({ "home": {} })).is_none());
        let names: Vec<_> = document.sections.keys().map(String::as_str).collect();
        assert_eq!(names, ["site", "pages"]);
    }

    #[test]
    fn schema_problems_name_the_bad_section() {
        let document = doc(json!({ "portfolio": "oops", "hero": {} }));
        let problems = document.schema_problems();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].to_string().contains("portfolio"));
    }
}

//! Typed shapes for the well-known sections of the site document.
//!
//! The records below only describe the shape the public site renders from.
//! A mismatch is reported, never enforced: the stored JSON is never rewritten
//! through these types and unknown fields pass through untouched.
//!
//! `portfolio` and `blog` come in two layouts. The flat one is a list of items;
//! the per-page one is an object carrying the page copy plus its own lists.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Number, Value};

use super::document::DocumentError;

/// A value rendered as text that editors may also enter as a number (`12`, `"12+"`).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(Number),
    Text(String),
}

#[derive(Debug, Deserialize)]
pub struct SiteMeta {
    pub title: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub copyright: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Hero {
    pub title: Option<String>,
    pub name: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AboutStats {
    pub projects: Option<Scalar>,
    pub exhibitions: Option<Scalar>,
    pub years: Option<Scalar>,
}

#[derive(Debug, Deserialize)]
pub struct About {
    pub description: Option<String>,
    pub image: Option<String>,
    pub stats: Option<AboutStats>,
}

#[derive(Debug, Deserialize)]
pub struct Contact {
    pub email: Option<String>,
    pub phone: Option<Scalar>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PortfolioItem {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BlogPost {
    pub title: Option<String>,
    pub date: Option<String>,
    pub excerpt: Option<String>,
    pub image: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SocialLink {
    pub name: Option<String>,
    pub url: Option<String>,
    pub icon: Option<String>,
}

/// Per-page layout of `portfolio`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioPage {
    pub page_title: Option<String>,
    pub title: Option<String>,
    pub categories: Option<Vec<Value>>,
    pub series: Option<Vec<Value>>,
}

/// Per-page layout of `blog`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPage {
    pub page_title: Option<String>,
    pub title: Option<String>,
    pub posts: Option<Vec<BlogPost>>,
}

/// Which schema applies to a section name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Site,
    Hero,
    About,
    Contact,
    Portfolio,
    Blog,
    Social,
    /// Any other key, e.g. per-page records; only has to be valid JSON.
    Custom,
}

impl SectionKind {
    pub fn of(name: &str) -> Self {
        match name {
            "site" => Self::Site,
            "hero" => Self::Hero,
            "about" => Self::About,
            "contact" => Self::Contact,
            "portfolio" => Self::Portfolio,
            "blog" => Self::Blog,
            "social" => Self::Social,
            _ => Self::Custom,
        }
    }

    /// Check `value` against this section's schema.
    pub fn validate(self, name: &str, value: &Value) -> Result<(), DocumentError> {
        let checked = match self {
            Self::Site => check_record::<SiteMeta>(value),
            Self::Hero => check_record::<Hero>(value),
            Self::About => check_record::<About>(value),
            Self::Contact => check_record::<Contact>(value),
            Self::Portfolio => check_list_or_page::<PortfolioItem, PortfolioPage>(value),
            Self::Blog => check_list_or_page::<BlogPost, BlogPage>(value),
            Self::Social => check_list::<SocialLink>(value),
            Self::Custom => Ok(()),
        };

        checked.map_err(|reason| DocumentError::Schema {
            section: name.to_string(),
            reason,
        })
    }
}

// serde will happily build a struct from a positional array, so the JSON kind
// is checked before deserializing.
fn check_record<T: DeserializeOwned>(value: &Value) -> Result<(), String> {
    if !value.is_object() {
        return Err("expected a JSON object".into());
    }
    T::deserialize(value).map(drop).map_err(|err| err.to_string())
}

fn check_list<T: DeserializeOwned>(value: &Value) -> Result<(), String> {
    let items = value.as_array().ok_or("expected a JSON array")?;
    for (index, item) in items.iter().enumerate() {
        check_record::<T>(item).map_err(|reason| format!("item {index}: {reason}"))?;
    }
    Ok(())
}

fn check_list_or_page<T: DeserializeOwned, P: DeserializeOwned>(
    value: &Value,
) -> Result<(), String> {
    match value {
        Value::Array(_) => check_list::<T>(value),
        Value::Object(_) => check_record::<P>(value),
        _ => Err("expected a JSON array or a page object".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn known_names_map_to_their_kind() {
        assert_eq!(SectionKind::of("portfolio"), SectionKind::Portfolio);
        assert_eq!(SectionKind::of("contact"), SectionKind::Contact);
        assert_eq!(SectionKind::of("navigation"), SectionKind::Custom);
    }

    #[test]
    fn object_sections_reject_lists() {
        let err = SectionKind::Hero
            .validate("hero", &json!([{ "title": "x" }]))
            .unwrap_err();
        assert!(matches!(err, DocumentError::Schema { ref section, .. } if section == "hero"));
    }

    #[test]
    fn list_sections_accept_the_per_page_layout() {
        let page = json!({ "pageTitle": "Portafolio", "categories": [], "series": [] });
        assert!(SectionKind::Portfolio.validate("portfolio", &page).is_ok());
        assert!(
            SectionKind::Blog
                .validate("blog", &json!({ "pageTitle": "Blog", "posts": [{ "title": "A", "visible": true }] }))
                .is_ok()
        );
        assert!(
            SectionKind::Portfolio
                .validate("portfolio", &json!({ "series": "none" }))
                .is_err()
        );
        assert!(SectionKind::Social.validate("social", &json!({ "url": "x" })).is_err());
        assert!(
            SectionKind::Social
                .validate("social", &json!([{ "url": "https://x", "icon": "fab fa-x" }]))
                .is_ok()
        );
    }

    #[test]
    fn field_types_are_enforced_but_extra_fields_pass() {
        assert!(
            SectionKind::Blog
                .validate("blog", &json!([{ "title": 7 }]))
                .is_err()
        );
        assert!(
            SectionKind::Blog
                .validate("blog", &json!([{ "title": "Post", "tags": ["a"], "id": 3 }]))
                .is_ok()
        );
    }

    #[test]
    fn positional_arrays_are_not_records() {
        assert!(
            SectionKind::Contact
                .validate("contact", &json!(["a@b.com", "1", "street"]))
                .is_err()
        );
    }

    #[test]
    fn stats_accept_text_or_numbers() {
        let about = json!({ "stats": { "projects": 50, "exhibitions": "12+", "years": null } });
        assert!(SectionKind::About.validate("about", &about).is_ok());
    }

    #[test]
    fn custom_sections_take_any_json() {
        assert!(SectionKind::Custom.validate("pages", &json!(42)).is_ok());
    }
}

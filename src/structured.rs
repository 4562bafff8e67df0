// JSON-LD structured data for blog articles.
// Emits a schema.org BlogPosting with nested Person and WebPage objects.

use chrono::{DateTime, Utc};
use serde::Serialize;

const SCHEMA_CONTEXT: &str = "https://schema.org";

/// Metadata for one published article.
#[derive(Debug, Clone)]
pub struct ArticleMeta {
    pub title: String,
    pub url: String,
    pub author_name: String,
    pub author_url: String,
    pub published: DateTime<Utc>,
    pub modified: Option<DateTime<Utc>>,
    pub keywords: Vec<String>,
    pub image: Option<String>,
}

/// schema.org Person.
#[derive(Debug, Clone, Serialize)]
pub struct Person {
    #[serde(rename = "@context")]
    pub context: &'static str,
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub name: String,
    pub url: String,
}

/// schema.org WebPage reference.
#[derive(Debug, Clone, Serialize)]
pub struct WebPage {
    #[serde(rename = "@context")]
    pub context: &'static str,
    #[serde(rename = "@type")]
    pub kind: &'static str,
    #[serde(rename = "@id")]
    pub id: String,
}

/// schema.org BlogPosting.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPosting {
    #[serde(rename = "@context")]
    pub context: &'static str,
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub headline: String,
    pub url: String,
    pub author: Person,
    pub date_published: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_modified: Option<DateTime<Utc>>,
    pub keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub main_entity_of_page: WebPage,
}

/// Build the structured-data object for one article.
pub fn blog_posting(meta: &ArticleMeta) -> BlogPosting {
    BlogPosting {
        context: SCHEMA_CONTEXT,
        kind: "BlogPosting",
        headline: meta.title.clone(),
        url: meta.url.clone(),
        author: Person {
            context: SCHEMA_CONTEXT,
            kind: "Person",
            name: meta.author_name.clone(),
            url: meta.author_url.clone(),
        },
        date_published: meta.published,
        date_modified: meta.modified,
        keywords: meta.keywords.clone(),
        image: meta.image.clone(),
        main_entity_of_page: WebPage {
            context: SCHEMA_CONTEXT,
            kind: "WebPage",
            id: meta.url.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn article() -> ArticleMeta {
        ArticleMeta {
            title: "Writing a Minecraft datapack generator".to_string(),
            url: "https://ayfri.com/articles/kore".to_string(),
            author_name: "Pierre".to_string(),
            author_url: "https://ayfri.com".to_string(),
            published: Utc.with_ymd_and_hms(2024, 2, 10, 9, 0, 0).unwrap(),
            modified: None,
            keywords: vec!["kotlin".to_string(), "minecraft".to_string()],
            image: None,
        }
    }

    #[test]
    fn every_object_carries_context_and_type() {
        let value = serde_json::to_value(blog_posting(&article())).unwrap();

        assert_eq!(value["@context"], "https://schema.org");
        assert_eq!(value["@type"], "BlogPosting");
        assert_eq!(value["author"]["@context"], "https://schema.org");
        assert_eq!(value["author"]["@type"], "Person");
        assert_eq!(value["mainEntityOfPage"]["@type"], "WebPage");
        assert_eq!(
            value["mainEntityOfPage"]["@id"],
            "https://ayfri.com/articles/kore"
        );
    }

    #[test]
    fn optional_members_are_omitted_when_absent() {
        let value = serde_json::to_value(blog_posting(&article())).unwrap();
        let members = value.as_object().unwrap();

        assert!(!members.contains_key("dateModified"));
        assert!(!members.contains_key("image"));
        assert_eq!(value["keywords"][1], "minecraft");
        assert!(members.contains_key("datePublished"));
    }

    #[test]
    fn optional_members_serialize_when_present() {
        let mut meta = article();
        meta.modified = Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
        meta.image = Some("https://ayfri.com/images/kore.png".to_string());

        let value = serde_json::to_value(blog_posting(&meta)).unwrap();
        assert!(value["dateModified"].is_string());
        assert_eq!(value["image"], "https://ayfri.com/images/kore.png");
    }
}

//! Page metadata derived from a post: `<head>` tags for search engines and
//! social previews, plus the schema.org `BlogPosting` document.

use std::fmt::Write;

use htmlescape::encode_minimal;
use serde::Serialize;

use crate::config::SiteConfig;
use crate::models::Post;
use crate::store::ContentStore;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub canonical_url: String,
    pub open_graph: OpenGraph,
    pub twitter: TwitterCard,
    pub structured_data: BlogPosting,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct OpenGraph {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub published_time: String,
    pub url: String,
    pub images: Vec<OgImage>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct OgImage {
    pub url: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TwitterCard {
    pub card: &'static str,
    pub title: String,
    pub description: String,
    pub images: Vec<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BlogPosting {
    #[serde(rename = "@context")]
    pub context: &'static str,
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub headline: String,
    pub date_published: String,
    pub date_modified: String,
    pub description: String,
    pub image: String,
    pub url: String,
    pub author: Author,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Author {
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub name: String,
}

pub fn canonical_url(site: &SiteConfig, slug: &str) -> String {
    site.absolute_url(&format!("/blog/{slug}"))
}

/// The post's own image, or the generated `/og` card for its title.
pub fn preview_image(site: &SiteConfig, post: &Post) -> String {
    match &post.metadata.image {
        Some(image) => site.absolute_url(image),
        None => site.absolute_url(&format!("/og?title={}", post.metadata.title)),
    }
}

pub fn project_metadata(site: &SiteConfig, post: &Post) -> PageMetadata {
    let meta = &post.metadata;
    let url = canonical_url(site, &post.slug);
    let image = preview_image(site, post);

    PageMetadata {
        title: meta.title.clone(),
        description: meta.summary.clone(),
        canonical_url: url.clone(),
        open_graph: OpenGraph {
            title: meta.title.clone(),
            description: meta.summary.clone(),
            kind: "article",
            published_time: meta.published_at.clone(),
            url: url.clone(),
            images: vec![OgImage { url: image.clone() }],
        },
        twitter: TwitterCard {
            card: "summary_large_image",
            title: meta.title.clone(),
            description: meta.summary.clone(),
            images: vec![image.clone()],
        },
        structured_data: BlogPosting {
            context: "https://schema.org",
            kind: "BlogPosting",
            headline: meta.title.clone(),
            date_published: meta.published_at.clone(),
            date_modified: meta.published_at.clone(),
            description: meta.summary.clone(),
            image,
            url,
            author: Author {
                kind: "Person",
                name: site.person.name.clone(),
            },
        },
    }
}

/// Metadata for a route, or `None` when the route has no post.
pub fn generate_metadata(
    store: &ContentStore,
    site: &SiteConfig,
    locale: &str,
    slug: &str,
) -> Option<PageMetadata> {
    store
        .find_post(locale, slug)
        .ok()
        .map(|post| project_metadata(site, post))
}

impl PageMetadata {
    pub fn head_html(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "<title>{}</title>", encode_minimal(&self.title));
        meta_name(&mut out, "description", &self.description);
        let _ = writeln!(
            out,
            "<link rel=\"canonical\" href=\"{}\">",
            encode_minimal(&self.canonical_url)
        );

        let og = &self.open_graph;
        meta_property(&mut out, "og:title", &og.title);
        meta_property(&mut out, "og:description", &og.description);
        meta_property(&mut out, "og:type", og.kind);
        meta_property(&mut out, "article:published_time", &og.published_time);
        meta_property(&mut out, "og:url", &og.url);
        for image in &og.images {
            meta_property(&mut out, "og:image", &image.url);
        }

        let tw = &self.twitter;
        meta_name(&mut out, "twitter:card", tw.card);
        meta_name(&mut out, "twitter:title", &tw.title);
        meta_name(&mut out, "twitter:description", &tw.description);
        for image in &tw.images {
            meta_name(&mut out, "twitter:image", image);
        }
        out
    }
}

fn meta_name(out: &mut String, name: &str, content: &str) {
    let _ = writeln!(
        out,
        "<meta name=\"{name}\" content=\"{}\">",
        encode_minimal(content)
    );
}

fn meta_property(out: &mut String, property: &str, content: &str) {
    let _ = writeln!(
        out,
        "<meta property=\"{property}\" content=\"{}\">",
        encode_minimal(content)
    );
}

impl BlogPosting {
    /// JSON-LD `<script>` element. `</` is escaped so post text cannot
    /// close the script early.
    pub fn script_tag(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string());
        format!(
            "<script type=\"application/ld+json\">{}</script>",
            json.replace("</", "<\\/")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Person;
    use crate::store::tests::{post, sample_store};

    fn site() -> SiteConfig {
        SiteConfig {
            base_url: "example.com".to_string(),
            person: Person {
                name: "Ada Lovelace".to_string(),
                avatar: None,
            },
            locales: vec!["en".to_string(), "id".to_string()],
            default_locale: "en".to_string(),
        }
    }

    #[test]
    fn projects_hello_world() {
        let meta = generate_metadata(&sample_store(), &site(), "en", "hello-world").unwrap();
        assert_eq!(meta.title, "Hello World");
        assert_eq!(meta.description, "About Hello World");
        assert_eq!(meta.canonical_url, "https://example.com/blog/hello-world");
        assert_eq!(meta.open_graph.url, meta.canonical_url);
        assert_eq!(meta.open_graph.kind, "article");
        assert_eq!(meta.twitter.card, "summary_large_image");
        assert_eq!(meta.structured_data.author.name, "Ada Lovelace");
    }

    #[test]
    fn missing_post_has_no_metadata() {
        assert_eq!(generate_metadata(&sample_store(), &site(), "en", "does-not-exist"), None);
        assert_eq!(generate_metadata(&sample_store(), &site(), "fr", "hello-world"), None);
    }

    #[test]
    fn fallback_image_carries_the_title() {
        let image = preview_image(&site(), &post("en", "hello-world", "Hello World"));
        assert_eq!(image, "https://example.com/og?title=Hello World");
        assert!(image.contains("Hello World"));

        let meta = project_metadata(&site(), &post("en", "hello-world", "Hello World"));
        assert_eq!(meta.open_graph.images[0].url, image);
        assert_eq!(meta.structured_data.image, image);
    }

    #[test]
    fn fallback_image_is_escaped_in_head_tags() {
        let meta = project_metadata(&site(), &post("en", "x", "Rust & \"Friends\""));
        let head = meta.head_html();
        assert!(head.contains(
            "<meta property=\"og:image\" content=\"https://example.com/og?title=Rust &amp; &quot;Friends&quot;\">"
        ));
    }

    #[test]
    fn own_image_is_resolved_against_base_url() {
        let mut with_image = post("en", "x", "X");
        with_image.metadata.image = Some("/images/cover.png".to_string());
        let meta = project_metadata(&site(), &with_image);
        assert_eq!(meta.open_graph.images[0].url, "https://example.com/images/cover.png");
        assert_eq!(meta.twitter.images, vec!["https://example.com/images/cover.png"]);
        assert_eq!(meta.structured_data.image, "https://example.com/images/cover.png");
    }

    #[test]
    fn publish_and_modify_dates_match() {
        let meta = project_metadata(&site(), &post("en", "x", "X"));
        let ld = &meta.structured_data;
        assert_eq!(ld.date_published, "2024-04-08");
        assert_eq!(ld.date_published, ld.date_modified);
        assert_eq!(meta.open_graph.published_time, ld.date_published);
    }

    #[test]
    fn structured_data_uses_schema_org_keys() {
        let meta = project_metadata(&site(), &post("en", "x", "X"));
        let value = serde_json::to_value(&meta.structured_data).unwrap();
        assert_eq!(value["@context"], "https://schema.org");
        assert_eq!(value["@type"], "BlogPosting");
        assert_eq!(value["datePublished"], "2024-04-08");
        assert_eq!(value["author"]["@type"], "Person");
    }

    #[test]
    fn script_tag_cannot_be_closed_by_content() {
        let meta = project_metadata(&site(), &post("en", "x", "</script><b>"));
        let tag = meta.structured_data.script_tag();
        assert_eq!(tag.matches("</script>").count(), 1);
    }

    #[test]
    fn head_tags_are_escaped() {
        let meta = project_metadata(&site(), &post("en", "x", "\"Quotes\" <here>"));
        let head = meta.head_html();
        assert!(head.contains("<title>&quot;Quotes&quot; &lt;here&gt;</title>"));
        assert!(head.contains("<meta property=\"og:url\" content=\"https://example.com/blog/x\">"));
        assert!(!head.contains("<here>"));
    }
}

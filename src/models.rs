use serde::{Deserialize, Serialize};

#[derive(Deserialize, Debug, Clone)]
pub struct FrontMatter {
    pub title: String,
    #[serde(rename = "publishedAt")]
    pub published_at: String,
    #[serde(default)]
    pub summary: String,
    pub image: Option<String>,
    pub slug: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PostMetadata {
    pub title: String,
    pub published_at: String,
    pub summary: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub slug: String,
    pub locale: String,
    pub metadata: PostMetadata,
    /// Raw Markdown body, front matter stripped.
    pub content: String,
}

/// One pre-renderable route.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct StaticParam {
    pub slug: String,
    pub locale: String,
}

impl From<FrontMatter> for PostMetadata {
    fn from(fm: FrontMatter) -> Self {
        Self {
            title: fm.title,
            published_at: fm.published_at,
            summary: fm.summary,
            image: fm.image,
        }
    }
}

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use gray_matter::{engine::YAML, Matter};
use tokio::fs;
use tracing::{debug, info};

use crate::error::ContentError;
use crate::models::{FrontMatter, Post};

#[derive(Debug, Clone)]
pub struct Templates {
    pub layout_html: String,
    pub banner_html: String,
    pub not_found_html: String, // supports {{slug}} placeholder
}

pub fn posts_dir(content_dir: &Path, locale: &str) -> PathBuf {
    content_dir.join("posts").join(locale)
}

async fn read(path: &Path) -> Result<String, ContentError> {
    fs::read_to_string(path)
        .await
        .map_err(|source| ContentError::Io {
            path: path.to_path_buf(),
            source,
        })
}

pub async fn load_templates(content_dir: &Path) -> Result<Templates, ContentError> {
    Ok(Templates {
        layout_html: read(&content_dir.join("layout.html")).await?,
        banner_html: read(&content_dir.join("banner.html")).await?,
        not_found_html: read(&content_dir.join("not_found.html")).await?,
    })
}

/// Loads every Markdown post of one locale, ordered by file name.
///
/// A missing directory is an empty locale. Duplicate slugs are rejected
/// so lookups never depend on which file happened to sort first.
pub async fn load_posts(dir: &Path, locale: &str) -> Result<Vec<Post>, ContentError> {
    let io_err = |source| ContentError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(locale, dir = %dir.display(), "no posts directory");
            return Ok(Vec::new());
        }
        Err(e) => return Err(io_err(e)),
    };

    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "md") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut seen = HashSet::new();
    let mut posts = Vec::with_capacity(paths.len());
    for path in paths {
        let post = parse_post(&path, locale, &read(&path).await?)?;
        if !seen.insert(post.slug.clone()) {
            return Err(ContentError::DuplicateSlug {
                slug: post.slug,
                locale: locale.to_string(),
                path,
            });
        }
        posts.push(post);
    }

    info!(locale, count = posts.len(), "loaded posts");
    Ok(posts)
}

pub fn parse_post(path: &Path, locale: &str, file_content: &str) -> Result<Post, ContentError> {
    let matter = Matter::<YAML>::new();
    let parsed = matter
        .parse::<FrontMatter>(file_content)
        .map_err(|e| ContentError::FrontMatter {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    let front_matter = parsed.data.ok_or_else(|| ContentError::MissingFrontMatter {
        path: path.to_path_buf(),
    })?;

    let slug = match front_matter.slug.clone() {
        Some(slug) if !slug.is_empty() => slug,
        _ => path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default()
            .to_string(),
    };

    Ok(Post {
        slug,
        locale: locale.to_string(),
        metadata: front_matter.into(),
        content: parsed.content,
    })
}

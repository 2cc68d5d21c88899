use std::collections::HashMap;
use std::path::Path;

use futures::future::try_join_all;
use tracing::info;

use crate::content_loader::{load_posts, posts_dir};
use crate::error::{ContentError, LookupError};
use crate::models::{Post, StaticParam};

/// Per-locale post collections, loaded once and shared until the next
/// reload.
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    locales: Vec<String>,
    posts: HashMap<String, Vec<Post>>,
}

impl ContentStore {
    pub async fn load(content_dir: &Path, locales: &[String]) -> Result<Self, ContentError> {
        let collections = try_join_all(locales.iter().map(|locale| async move {
            let posts = load_posts(&posts_dir(content_dir, locale), locale).await?;
            Ok::<_, ContentError>((locale.clone(), posts))
        }))
        .await?;

        let store = Self::from_collections(collections);
        info!(
            locales = store.locales().len(),
            posts = store.posts.values().map(Vec::len).sum::<usize>(),
            "content store ready"
        );
        Ok(store)
    }

    /// Builds a store from already loaded collections, in locale order.
    pub fn from_collections(collections: Vec<(String, Vec<Post>)>) -> Self {
        let mut store = Self::default();
        for (locale, posts) in collections {
            store.locales.push(locale.clone());
            store.posts.insert(locale, posts);
        }
        store
    }

    pub fn locales(&self) -> &[String] {
        &self.locales
    }

    pub fn posts(&self, locale: &str) -> &[Post] {
        self.posts.get(locale).map(Vec::as_slice).unwrap_or_default()
    }

    /// First post of `locale` whose slug equals `slug`.
    pub fn find_post(&self, locale: &str, slug: &str) -> Result<&Post, LookupError> {
        let posts = self
            .posts
            .get(locale)
            .ok_or_else(|| LookupError::UnsupportedLocale(locale.to_string()))?;

        posts
            .iter()
            .find(|post| post.slug == slug)
            .ok_or_else(|| LookupError::PostNotFound {
                locale: locale.to_string(),
                slug: slug.to_string(),
            })
    }

    pub fn generate_static_params(&self) -> Vec<StaticParam> {
        self.locales
            .iter()
            .flat_map(|locale| {
                self.posts(locale).iter().map(move |post| StaticParam {
                    slug: post.slug.clone(),
                    locale: locale.clone(),
                })
            })
            .collect()
    }
}

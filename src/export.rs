//! Pre-renders every page listed by the static params to plain HTML files.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};

use crate::error::ExportError;
use crate::i18n::RequestLocale;
use crate::page::{render_index_page, render_post_page};
use crate::state::AppState;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub posts: usize,
    pub indexes: usize,
}

async fn write_page(out_dir: &Path, route: &str, html: &str) -> Result<PathBuf, ExportError> {
    let dir = out_dir.join(route.trim_start_matches('/'));
    let path = dir.join("index.html");
    let write_err = |source| ExportError::Write {
        path: path.clone(),
        source,
    };
    fs::create_dir_all(&dir).await.map_err(write_err)?;
    fs::write(&path, html).await.map_err(write_err)?;
    debug!(path = %path.display(), "wrote page");
    Ok(path)
}

pub async fn export_site(state: &AppState, out_dir: &Path) -> Result<ExportReport, ExportError> {
    let params = state.store.read().await.generate_static_params();
    let mut report = ExportReport::default();

    for param in &params {
        let html = render_post_page(state, &param.locale, &param.slug, false)
            .await
            .map_err(|source| ExportError::Render {
                locale: param.locale.clone(),
                slug: param.slug.clone(),
                source,
            })?;

        write_page(out_dir, &format!("/{}/blog/{}", param.locale, param.slug), &html).await?;
        if param.locale == state.site.default_locale {
            write_page(out_dir, &format!("/blog/{}", param.slug), &html).await?;
        }
        report.posts += 1;
    }

    for locale in &state.site.locales {
        let html = render_index_page(state, locale, false)
            .await
            .map_err(|source| ExportError::Render {
                locale: locale.clone(),
                slug: String::new(),
                source,
            })?;
        write_page(out_dir, &format!("/{locale}/blog"), &html).await?;
        if let Ok(request_locale) = RequestLocale::register(&state.site, locale) {
            let localized = request_locale.blog_path();
            if localized != format!("/{locale}/blog") {
                write_page(out_dir, &localized, &html).await?;
            }
        }
        report.indexes += 1;
    }

    info!(
        posts = report.posts,
        indexes = report.indexes,
        out = %out_dir.display(),
        "static export finished"
    );
    Ok(report)
}

use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid site config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("site config lists no locales")]
    NoLocales,

    #[error("default locale `{0}` is not one of the configured locales")]
    UnknownDefaultLocale(String),
}

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse front matter in {path}: {message}")]
    FrontMatter { path: PathBuf, message: String },

    #[error("{path} has no front matter")]
    MissingFrontMatter { path: PathBuf },

    #[error("duplicate slug `{slug}` in locale `{locale}` ({path})")]
    DuplicateSlug {
        slug: String,
        locale: String,
        path: PathBuf,
    },
}

/// Why a `(locale, slug)` pair did not resolve to a post.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("unsupported locale `{0}`")]
    UnsupportedLocale(String),

    #[error("no post `{slug}` in locale `{locale}`")]
    PostNotFound { locale: String, slug: String },
}

#[derive(Error, Debug)]
pub enum PageError {
    #[error(transparent)]
    NotFound(#[from] LookupError),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to render {locale}/{slug}: {source}")]
    Render {
        locale: String,
        slug: String,
        source: PageError,
    },
}

/// A rendered not-found page, served with a 404 status.
pub struct NotFoundPage(pub String);

impl IntoResponse for NotFoundPage {
    fn into_response(self) -> Response {
        (StatusCode::NOT_FOUND, Html(self.0)).into_response()
    }
}

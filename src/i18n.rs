use chrono::{DateTime, Datelike, NaiveDate};

use crate::config::SiteConfig;
use crate::error::LookupError;

const EN_MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

const ID_MONTHS: [&str; 12] = [
    "Januari", "Februari", "Maret", "April", "Mei", "Juni", "Juli", "Agustus", "September",
    "Oktober", "November", "Desember",
];

/// Translated strings used by the blog pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Messages {
    pub posts: &'static str,
    pub not_found: &'static str,
}

const EN_MESSAGES: Messages = Messages {
    posts: "Posts",
    not_found: "Page not found",
};

const ID_MESSAGES: Messages = Messages {
    posts: "Tulisan",
    not_found: "Halaman tidak ditemukan",
};

/// The locale a request is rendered in. Obtained once per request,
/// before any post lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLocale {
    code: String,
    is_default: bool,
}

impl RequestLocale {
    pub fn register(site: &SiteConfig, locale: &str) -> Result<Self, LookupError> {
        if !site.supports(locale) {
            return Err(LookupError::UnsupportedLocale(locale.to_string()));
        }
        Ok(Self {
            code: locale.to_string(),
            is_default: locale == site.default_locale,
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn messages(&self) -> Messages {
        match self.code.as_str() {
            "id" => ID_MESSAGES,
            _ => EN_MESSAGES,
        }
    }

    pub fn blog_path(&self) -> String {
        if self.is_default {
            "/blog".to_string()
        } else {
            format!("/{}/blog", self.code)
        }
    }

    pub fn post_path(&self, slug: &str) -> String {
        format!("{}/{}", self.blog_path(), slug)
    }

    /// Formats a `publishedAt` value for display. Input that is neither a
    /// plain date nor RFC 3339 is returned as-is.
    pub fn format_date(&self, published_at: &str) -> String {
        let Some(date) = parse_date(published_at) else {
            return published_at.to_string();
        };
        let month0 = date.month0() as usize;
        match self.code.as_str() {
            "id" => format!("{} {} {}", date.day(), ID_MONTHS[month0], date.year()),
            _ => format!("{} {}, {}", EN_MONTHS[month0], date.day(), date.year()),
        }
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

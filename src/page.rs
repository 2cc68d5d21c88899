use std::fmt::Write;

use htmlescape::encode_minimal;
use tracing::debug;

use crate::config::SiteConfig;
use crate::content_loader::Templates;
use crate::error::PageError;
use crate::i18n::RequestLocale;
use crate::markdown::render_markdown_to_html;
use crate::metadata::project_metadata;
use crate::models::Post;
use crate::state::AppState;

const HOT_RELOAD_SCRIPT: &str = r#"
<script>
    const socket = new WebSocket("ws://" + window.location.host + "/ws");
    socket.onmessage = (event) => {
        if (event.data === "reload") {
            window.location.reload();
        }
    };
</script>
"#;

/// The pieces that fill one layout.
pub struct PageParts<'a> {
    pub lang: &'a str,
    pub head: &'a str,
    pub content: &'a str,
    pub posts: &'a str,
}

pub fn assemble(templates: &Templates, parts: &PageParts<'_>, live_reload: bool) -> String {
    let mut page = templates
        .layout_html
        .replace("{{ lang }}", parts.lang)
        .replace("{{ head }}", parts.head)
        .replace("{{ banner }}", &templates.banner_html)
        .replace("{{ posts }}", parts.posts)
        .replace("{{ content }}", parts.content);

    if live_reload {
        page = page.replace("</body>", &format!("{}</body>", HOT_RELOAD_SCRIPT));
    }

    page
}

/// Sidebar list of the locale's posts.
pub fn post_list(locale: &RequestLocale, posts: &[Post]) -> String {
    let mut list_items = String::new();
    for post in posts {
        let _ = write!(
            list_items,
            "<li><a href=\"{}\" class=\"text-blue no-underline\">{}</a></li>",
            encode_minimal(&locale.post_path(&post.slug)),
            encode_minimal(&post.metadata.title)
        );
    }
    list_items
}

pub fn render_post_body(site: &SiteConfig, locale: &RequestLocale, post: &Post) -> String {
    let metadata = project_metadata(site, post);
    let messages = locale.messages();

    let mut body = String::new();
    body.push_str("<section class=\"post\">\n");
    body.push_str(&metadata.structured_data.script_tag());
    let _ = write!(
        body,
        "\n<a href=\"{}\" class=\"back-link\">&lsaquo; {}</a>\n",
        encode_minimal(&locale.blog_path()),
        messages.posts
    );
    let _ = writeln!(body, "<h1>{}</h1>", encode_minimal(&post.metadata.title));

    body.push_str("<div class=\"byline\">");
    if let Some(avatar) = &site.person.avatar {
        let _ = write!(
            body,
            "<img class=\"avatar\" src=\"{}\" alt=\"{}\">",
            encode_minimal(avatar),
            encode_minimal(&site.person.name)
        );
    }
    let _ = write!(
        body,
        "<time datetime=\"{}\">{}</time>",
        encode_minimal(&post.metadata.published_at),
        encode_minimal(&locale.format_date(&post.metadata.published_at))
    );
    body.push_str("</div>\n");

    body.push_str("<article>\n");
    body.push_str(&render_markdown_to_html(&post.content));
    body.push_str("</article>\n</section>");
    body
}

pub fn render_blog_index(locale: &RequestLocale, posts: &[Post]) -> String {
    let mut body = String::new();
    let _ = writeln!(body, "<h1>{}</h1>", locale.messages().posts);
    body.push_str("<ul class=\"post-index\">\n");
    for post in posts {
        let _ = writeln!(
            body,
            "<li><a href=\"{}\">{}</a> <time datetime=\"{}\">{}</time><p>{}</p></li>",
            encode_minimal(&locale.post_path(&post.slug)),
            encode_minimal(&post.metadata.title),
            encode_minimal(&post.metadata.published_at),
            encode_minimal(&locale.format_date(&post.metadata.published_at)),
            encode_minimal(&post.metadata.summary)
        );
    }
    body.push_str("</ul>");
    body
}

/// Full HTML for `/{locale}/blog/{slug}`. `live_reload` injects the
/// hot-reload script and is never set for exported pages.
pub async fn render_post_page(
    state: &AppState,
    locale: &str,
    slug: &str,
    live_reload: bool,
) -> Result<String, PageError> {
    let locale = RequestLocale::register(&state.site, locale)?;
    let store = state.store.read().await;
    let post = store.find_post(locale.code(), slug)?;
    debug!(locale = locale.code(), slug, "rendering post");

    let head = project_metadata(&state.site, post).head_html();
    let content = render_post_body(&state.site, &locale, post);
    let posts = post_list(&locale, store.posts(locale.code()));

    let templates = state.templates.read().await;
    Ok(assemble(
        &templates,
        &PageParts {
            lang: locale.code(),
            head: &head,
            content: &content,
            posts: &posts,
        },
        live_reload,
    ))
}

pub async fn render_index_page(
    state: &AppState,
    locale: &str,
    live_reload: bool,
) -> Result<String, PageError> {
    let locale = RequestLocale::register(&state.site, locale)?;
    let store = state.store.read().await;
    let posts = store.posts(locale.code());

    let head = format!(
        "<title>{} | {}</title>\n<link rel=\"canonical\" href=\"{}\">\n",
        locale.messages().posts,
        encode_minimal(&state.site.person.name),
        encode_minimal(&state.site.absolute_url(&locale.blog_path()))
    );
    let content = render_blog_index(&locale, posts);
    let list = post_list(&locale, posts);

    let templates = state.templates.read().await;
    Ok(assemble(
        &templates,
        &PageParts {
            lang: locale.code(),
            head: &head,
            content: &content,
            posts: &list,
        },
        live_reload,
    ))
}

/// The not-found page. Falls back to the default locale when the
/// requested one is not supported.
pub async fn render_not_found(state: &AppState, locale: &str, slug: &str) -> String {
    let locale = RequestLocale::register(&state.site, locale)
        .or_else(|_| RequestLocale::register(&state.site, &state.site.default_locale));
    let (lang, title, posts) = match &locale {
        Ok(locale) => {
            let store = state.store.read().await;
            (
                locale.code().to_string(),
                locale.messages().not_found,
                post_list(locale, store.posts(locale.code())),
            )
        }
        Err(_) => (state.site.default_locale.clone(), "Page not found", String::new()),
    };

    let templates = state.templates.read().await;
    let content = templates.not_found_html.replace("{{slug}}", &encode_minimal(slug));
    let head = format!("<title>{title}</title>\n<meta name=\"robots\" content=\"noindex\">\n");
    assemble(
        &templates,
        &PageParts {
            lang: &lang,
            head: &head,
            content: &content,
            posts: &posts,
        },
        state.is_development,
    )
}

#[cfg(test)]
pub(crate) mod tests {
    use std::path::PathBuf;

    use scraper::{Html, Selector};

    use super::*;
    use crate::config::Person;
    use crate::error::LookupError;
    use crate::store::tests::sample_store;

    pub(crate) fn test_site() -> SiteConfig {
        SiteConfig {
            base_url: "example.com".to_string(),
            person: Person {
                name: "Ada Lovelace".to_string(),
                avatar: Some("/images/avatar.png".to_string()),
            },
            locales: vec!["en".to_string(), "id".to_string()],
            default_locale: "en".to_string(),
        }
    }

    pub(crate) fn test_templates() -> Templates {
        Templates {
            layout_html: "<html lang=\"{{ lang }}\"><head>{{ head }}</head><body>{{ banner }}<nav><ul>{{ posts }}</ul></nav><main>{{ content }}</main></body></html>".to_string(),
            banner_html: "<header>banner</header>".to_string(),
            not_found_html: "<p class=\"missing\">No post named {{slug}}</p>".to_string(),
        }
    }

    pub(crate) fn test_state(is_development: bool) -> AppState {
        AppState::new(
            test_site(),
            PathBuf::from("content"),
            test_templates(),
            sample_store(),
            is_development,
        )
    }

    fn select_text(doc: &Html, selector: &str) -> Option<String> {
        let selector = Selector::parse(selector).unwrap();
        doc.select(&selector).next().map(|el| el.text().collect())
    }

    #[tokio::test]
    async fn post_page_has_heading_byline_and_structured_data() {
        let page = render_post_page(&test_state(false), "en", "hello-world", false).await.unwrap();
        let doc = Html::parse_document(&page);

        assert_eq!(select_text(&doc, "main h1").as_deref(), Some("Hello World"));
        assert_eq!(select_text(&doc, "title").as_deref(), Some("Hello World"));
        assert_eq!(select_text(&doc, ".byline time").as_deref(), Some("April 8, 2024"));
        assert_eq!(select_text(&doc, "a.back-link").map(|t| t.contains("Posts")), Some(true));

        let ld = select_text(&doc, "script[type=\"application/ld+json\"]").unwrap();
        let value: serde_json::Value = serde_json::from_str(&ld).unwrap();
        assert_eq!(value["@type"], "BlogPosting");
        assert_eq!(value["url"], "https://example.com/blog/hello-world");

        let avatar = Selector::parse("img.avatar").unwrap();
        assert_eq!(
            doc.select(&avatar).next().and_then(|el| el.value().attr("src")),
            Some("/images/avatar.png")
        );
        assert!(page.contains("<html lang=\"en\">"));
        assert!(!page.contains("WebSocket"));
    }

    #[tokio::test]
    async fn post_page_signals_not_found() {
        let err = render_post_page(&test_state(false), "en", "does-not-exist", false).await.unwrap_err();
        assert!(matches!(
            err,
            PageError::NotFound(LookupError::PostNotFound { ref slug, .. }) if slug == "does-not-exist"
        ));

        let err = render_post_page(&test_state(false), "fr", "hello-world", false).await.unwrap_err();
        assert!(matches!(err, PageError::NotFound(LookupError::UnsupportedLocale(_))));
    }

    #[tokio::test]
    async fn development_pages_get_reload_script() {
        let state = test_state(true);
        let page = render_post_page(&state, "en", "hello-world", state.is_development).await.unwrap();
        assert!(page.contains("WebSocket"));

        let page = render_post_page(&state, "en", "hello-world", false).await.unwrap();
        assert!(!page.contains("WebSocket"));
    }

    #[tokio::test]
    async fn index_lists_locale_posts() {
        let page = render_index_page(&test_state(false), "en", false).await.unwrap();
        let doc = Html::parse_document(&page);
        let links = Selector::parse("ul.post-index a").unwrap();
        let hrefs: Vec<_> = doc
            .select(&links)
            .filter_map(|el| el.value().attr("href"))
            .collect();
        assert_eq!(hrefs, vec!["/blog/hello-world", "/blog/second"]);

        let empty = render_index_page(&test_state(false), "id", false).await.unwrap();
        assert!(empty.contains("<h1>Tulisan</h1>"));
        assert!(!empty.contains("hello-world"));
    }

    #[tokio::test]
    async fn not_found_page_escapes_slug() {
        let page = render_not_found(&test_state(false), "xx", "<script>").await;
        assert!(page.contains("No post named &lt;script&gt;"));
        assert!(page.contains("<html lang=\"en\">"));
    }
}

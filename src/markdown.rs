use std::collections::HashSet;

use htmlescape::encode_minimal;
use pulldown_cmark::{html, CowStr, Event, LinkType, Options, Parser, Tag, TagEnd};
use slug::slugify;

fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
    options.insert(Options::ENABLE_MATH);
    options
}

/// Renders a post body. Headings get anchor ids, external links open in
/// a new tab and math is rendered with KaTeX.
pub fn render_markdown_to_html(markdown: &str) -> String {
    let normalized_markdown = normalize_latex_delimiters(markdown);
    let mut events: Vec<Event> = Parser::new_ext(&normalized_markdown, markdown_options())
        .map(|event| match event {
            Event::InlineMath(math) => Event::Html(boxed(render_math_html(&math, false))),
            Event::DisplayMath(math) => Event::Html(boxed(render_math_html(&math, true))),
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            }) if link_type != LinkType::Email => Event::Html(boxed(open_link(&dest_url, &title))),
            Event::End(TagEnd::Link) => Event::Html(CowStr::Borrowed("</a>")),
            other => other,
        })
        .collect();

    assign_heading_ids(&mut events);

    let mut html_out = String::new();
    html::push_html(&mut html_out, events.into_iter());
    html_out
}

fn boxed(html: String) -> CowStr<'static> {
    CowStr::Boxed(html.into_boxed_str())
}

fn is_external(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://") || url.starts_with("//")
}

fn open_link(dest_url: &str, title: &str) -> String {
    let mut tag = format!("<a href=\"{}\"", encode_minimal(dest_url));
    if !title.is_empty() {
        tag.push_str(&format!(" title=\"{}\"", encode_minimal(title)));
    }
    if is_external(dest_url) {
        tag.push_str(" target=\"_blank\" rel=\"noopener noreferrer\"");
    }
    tag.push('>');
    tag
}

/// Gives every heading without an explicit `{#id}` an id slugified from
/// its text. Ids already taken, explicit ones included, get `-1`, `-2`...
/// suffixes.
fn assign_heading_ids(events: &mut [Event]) {
    let mut used: HashSet<String> = events
        .iter()
        .filter_map(|e| match e {
            Event::Start(Tag::Heading { id: Some(id), .. }) => Some(id.to_string()),
            _ => None,
        })
        .collect();

    for i in 0..events.len() {
        let needs_id = matches!(&events[i], Event::Start(Tag::Heading { id: None, .. }));
        if !needs_id {
            continue;
        }

        let text: String = events[i + 1..]
            .iter()
            .take_while(|e| !matches!(e, Event::End(TagEnd::Heading(_))))
            .filter_map(|e| match e {
                Event::Text(t) | Event::Code(t) => Some(t.as_ref()),
                _ => None,
            })
            .collect();

        let base = slugify(&text);
        if base.is_empty() {
            continue;
        }
        let mut anchor = base.clone();
        let mut n = 0;
        while used.contains(&anchor) {
            n += 1;
            anchor = format!("{base}-{n}");
        }
        used.insert(anchor.clone());

        if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
            *id = Some(CowStr::from(anchor));
        }
    }
}

fn normalize_latex_delimiters(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut i = 0;

    while i < input.len() {
        if let Some((open, close, display_mode)) = delimiter_at(input, i) {
            let content_start = i + open.len();
            if let Some(close_at) = input[content_start..].find(close) {
                let content_end = content_start + close_at;
                let content = &input[content_start..content_end];
                let fence = if display_mode || content.contains('\n') { "$$" } else { "$" };
                out.push_str(fence);
                out.push_str(content);
                out.push_str(fence);
                i = content_end + close.len();
                continue;
            }
        }

        match input[i..].chars().next() {
            Some(ch) => {
                out.push(ch);
                i += ch.len_utf8();
            }
            None => break,
        }
    }

    out
}

fn delimiter_at(input: &str, index: usize) -> Option<(&'static str, &'static str, bool)> {
    let tail = &input[index..];
    if tail.starts_with("\\(") {
        Some(("\\(", "\\)", false))
    } else if tail.starts_with("\\[") {
        Some(("\\[", "\\]", true))
    } else {
        None
    }
}

fn render_math_html(source: &str, display_mode: bool) -> String {
    let mut opts = katex::Opts::builder();
    opts.display_mode(display_mode);

    let rendered = match opts.build() {
        Ok(opts) => katex::render_with_opts(source, opts),
        Err(_) => return fallback_math_html(source, display_mode),
    };

    rendered.unwrap_or_else(|_| fallback_math_html(source, display_mode))
}

fn fallback_math_html(source: &str, display_mode: bool) -> String {
    let class_name = if display_mode { "math math-display" } else { "math math-inline" };
    format!("<span class=\"{class_name}\">{}</span>", encode_minimal(source))
}

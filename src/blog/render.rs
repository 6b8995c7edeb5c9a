use crate::blog::detail::detail_rows;
use crate::blog::manager::ResolvedEntry;
use pulldown_cmark::{Options, Parser, html};
use pulldown_cmark_escape::escape_html;

/// Markdown in, HTML out. Implementations never fail.
pub trait Renderer {
    fn render(&self, markdown: &str) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer;

impl Renderer for MarkdownRenderer {
    fn render(&self, markdown: &str) -> String {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_TASKLISTS);

        let parser = Parser::new_ext(markdown, options);
        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, parser);
        out
    }
}

/// What a presentation layer shows for one selected entry.
#[derive(Debug, Clone)]
pub struct RenderedEntry {
    pub rows: Vec<(String, String)>,
    pub html: String,
}

pub fn render_entry(entry: &ResolvedEntry, renderer: &dyn Renderer) -> RenderedEntry {
    RenderedEntry {
        rows: detail_rows(entry),
        html: renderer.render(&entry.content),
    }
}

pub fn standalone_document(title: &str, body: &str) -> String {
    let mut escaped = String::with_capacity(title.len());
    // Writing into a String cannot fail.
    let _ = escape_html(&mut escaped, title);
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{escaped}</title>\n</head>\n<body>\n{body}</body>\n</html>\n"
    )
}

//! HTML building blocks: escaped text, anchors and list containers.

use std::fmt;

/// CSS classes emitted by the sitemap renderers.
pub mod class {
    pub const WRAPPER: &str = "sitemap";
    pub const PAGES_TITLE: &str = "sitemap-pages-title";
    pub const PAGES_LIST: &str = "sitemap-pages-list";
    pub const POSTS_TITLE: &str = "sitemap-posts-title";
    pub const POSTS_LIST: &str = "sitemap-posts-list";
    pub const CATEGORY_TITLE: &str = "sitemap-category-title";
    pub const POST: &str = "sitemap-post";
}

/// `rel` value telling crawlers not to follow a link.
pub const NOFOLLOW: &str = "nofollow";

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// An anchor element composed from its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link<'a> {
    pub href: &'a str,
    pub label: &'a str,
    pub nofollow: bool,
}

impl<'a> Link<'a> {
    pub fn new(href: &'a str, label: &'a str) -> Self {
        Self {
            href,
            label,
            nofollow: false,
        }
    }

    pub fn nofollow(mut self, nofollow: bool) -> Self {
        self.nofollow = nofollow;
        self
    }
}

impl fmt::Display for Link<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<a ")?;
        if self.nofollow {
            write!(f, r#"rel="{NOFOLLOW}" "#)?;
        }
        write!(
            f,
            r#"href="{}">{}</a>"#,
            escape_html(self.href),
            escape_html(self.label)
        )
    }
}

/// `<ul class="…">inner</ul>`
pub fn list(class: &str, inner: &str) -> String {
    format!(r#"<ul class="{class}">{inner}</ul>"#)
}

/// `<li>inner</li>`, with a class attribute when `class` is given.
pub fn list_item(class: Option<&str>, inner: &str) -> String {
    match class {
        Some(class) => format!(r#"<li class="{class}">{inner}</li>"#),
        None => format!("<li>{inner}</li>"),
    }
}

/// `<div class="…">inner</div>`
pub fn block(class: &str, inner: &str) -> String {
    format!(r#"<div class="{class}">{inner}</div>"#)
}

/// `<h2 class="…">escaped text</h2>`
pub fn heading(class: &str, text: &str) -> String {
    format!(r#"<h2 class="{class}">{}</h2>"#, escape_html(text))
}

//! Page list section: title, list container and link decoration.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::domain::markup::{class, heading, list, NOFOLLOW};

/// Opening anchor tag with optional attributes.
static ANCHOR_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<a(\s[^>]*)?>").unwrap());

/// `rel` attribute inside an anchor tag, double or single quoted.
static REL_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(\srel\s*=\s*)(?:"([^"]*)"|'([^']*)')"#).unwrap()
});

/// Wraps externally rendered page-list markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageListFormatter;

impl PageListFormatter {
    /// Heading plus `<ul>` around `flat_page_markup`.
    ///
    /// Empty markup yields an empty string (no heading for an empty list).
    /// An empty `title` omits the heading.
    pub fn format(&self, flat_page_markup: &str, title: &str, add_nofollow: bool) -> String {
        if flat_page_markup.is_empty() {
            return String::new();
        }

        let markup = if add_nofollow {
            add_nofollow_to_links(flat_page_markup)
        } else {
            flat_page_markup.to_string()
        };

        let mut html = String::new();
        if !title.is_empty() {
            html.push_str(&heading(class::PAGES_TITLE, title));
        }
        html.push_str(&list(class::PAGES_LIST, &markup));
        html
    }
}

/// Mark every anchor tag in `markup` as `rel="nofollow"`.
///
/// Works on whole tags, so attribute order does not matter. Existing `rel`
/// values keep their tokens and gain `nofollow` unless it is already there.
pub fn add_nofollow_to_links(markup: &str) -> String {
    ANCHOR_TAG
        .replace_all(markup, |caps: &Captures| {
            let attrs = caps.get(1).map_or("", |m| m.as_str());
            format!("<a{}>", decorate_attrs(attrs))
        })
        .into_owned()
}

fn decorate_attrs(attrs: &str) -> String {
    let Some(rel) = REL_ATTR.captures(attrs) else {
        return format!(r#" rel="{NOFOLLOW}"{attrs}"#);
    };

    let value = rel
        .get(2)
        .or_else(|| rel.get(3))
        .map_or("", |m| m.as_str());
    if value
        .split_whitespace()
        .any(|token| token.eq_ignore_ascii_case(NOFOLLOW))
    {
        return attrs.to_string();
    }

    let merged = if value.trim().is_empty() {
        NOFOLLOW.to_string()
    } else {
        format!("{} {NOFOLLOW}", value.trim())
    };
    let whole = rel.get(0).map_or(0..0, |m| m.range());
    format!(
        r#"{}{}"{merged}"{}"#,
        &attrs[..whole.start],
        &rel[1],
        &attrs[whole.end..]
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const PAGES: &str = r#"<li class="page_item"><a href="/about">About</a></li>"#;

    #[test]
    fn given_empty_markup_when_formatting_then_empty_even_with_title() {
        assert_eq!(PageListFormatter.format("", "Pages", true), "");
    }

    #[test]
    fn given_markup_when_formatting_then_adds_heading_and_list() {
        let html = PageListFormatter.format(PAGES, "Pages", false);
        assert_eq!(
            html,
            format!(
                r#"<h2 class="sitemap-pages-title">Pages</h2><ul class="sitemap-pages-list">{PAGES}</ul>"#
            )
        );
    }

    #[test]
    fn given_empty_title_when_formatting_then_heading_omitted() {
        let html = PageListFormatter.format(PAGES, "", false);
        assert!(html.starts_with("<ul"));
    }

    #[test]
    fn given_nofollow_when_formatting_then_links_are_marked() {
        let html = PageListFormatter.format(PAGES, "Pages", true);
        assert!(html.contains(r#"<a rel="nofollow" href="/about">About</a>"#));
    }

    #[rstest]
    #[case(r#"<a href="/x">x</a>"#, r#"<a rel="nofollow" href="/x">x</a>"#)]
    #[case(r#"<a class="c" href="/x">x</a>"#, r#"<a rel="nofollow" class="c" href="/x">x</a>"#)]
    #[case(r#"<a href="/x" rel="nofollow">x</a>"#, r#"<a href="/x" rel="nofollow">x</a>"#)]
    #[case(r#"<a href="/x" rel="noopener">x</a>"#, r#"<a href="/x" rel="noopener nofollow">x</a>"#)]
    #[case(r#"<a href='/x' rel='external'>x</a>"#, r#"<a href='/x' rel="external nofollow">x</a>"#)]
    #[case(r#"<A HREF="/x">x</A>"#, r#"<a rel="nofollow" HREF="/x">x</A>"#)]
    #[case(r#"<abbr>t</abbr>"#, r#"<abbr>t</abbr>"#)]
    #[case("<a>bare</a>", r#"<a rel="nofollow">bare</a>"#)]
    fn given_anchor_when_decorating_then_rel_contains_nofollow_once(
        #[case] input: &str,
        #[case] want: &str,
    ) {
        assert_eq!(add_nofollow_to_links(input), want);
    }

    #[test]
    fn given_many_links_when_decorating_then_all_marked() {
        let markup = r#"<li><a href="/a">a</a><ul class="children"><li><a href="/b">b</a></li></ul></li>"#;
        let html = add_nofollow_to_links(markup);
        assert_eq!(html.matches(r#"rel="nofollow""#).count(), 2);
    }
}

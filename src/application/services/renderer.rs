//! Nested list markup for a category forest.

use tracing::instrument;

use crate::application::services::leaves::LeafCollector;
use crate::domain::markup::{block, class, escape_html, list, list_item, Link};
use crate::domain::{CategoryNode, Labels, PostRecord, RenderOptions};

/// Renders category forests into nested `<ul>` markup.
///
/// Each category becomes one `<li>` holding its header and, when there is
/// anything below it, one `<ul>` with its posts followed by its
/// subcategories. The renderer keeps no state between calls.
#[derive(Clone)]
pub struct TreeRenderer {
    leaves: LeafCollector,
    category_label: String,
}

impl TreeRenderer {
    pub fn new(leaves: LeafCollector, labels: &Labels) -> Self {
        Self {
            leaves,
            category_label: labels.category.clone(),
        }
    }

    /// Render with the label flag from `options`, wrapped in a list.
    #[instrument(level = "debug", skip_all, fields(roots = forest.len()))]
    pub fn render_forest(&self, forest: &[CategoryNode], options: &RenderOptions) -> String {
        self.render(forest, options, options.display_category_label, true)
    }

    /// Render `forest`; returns an empty string for an empty forest.
    pub fn render(
        &self,
        forest: &[CategoryNode],
        options: &RenderOptions,
        display_category_label: bool,
        use_wrapping_list: bool,
    ) -> String {
        if forest.is_empty() {
            return String::new();
        }

        let mut items = String::new();
        for node in forest {
            let header = self.category_header(node, options, display_category_label);

            let posts = self.leaves.posts_for_category(node.record.id, options);
            let leaf_html: String = posts
                .iter()
                .map(|p| post_item(p, options.add_nofollow))
                .collect();

            let nested = self.render(
                &node.children,
                options,
                display_category_label,
                use_wrapping_list,
            );

            let mut inner = header;
            if !leaf_html.is_empty() || !nested.is_empty() {
                inner.push_str(&list(class::POSTS_LIST, &(leaf_html + &nested)));
            }
            items.push_str(&list_item(None, &inner));
        }

        if use_wrapping_list {
            list(class::POSTS_LIST, &items)
        } else {
            items
        }
    }

    fn category_header(
        &self,
        node: &CategoryNode,
        options: &RenderOptions,
        display_category_label: bool,
    ) -> String {
        let label = if display_category_label {
            escape_html(&format!(
                "{}{}",
                self.category_label, options.category_label_separator
            ))
        } else {
            String::new()
        };
        let link = Link::new(&node.record.link, &node.record.name).nofollow(options.add_nofollow);
        block(class::CATEGORY_TITLE, &format!("{label}{link}"))
    }
}

fn post_item(post: &PostRecord, nofollow: bool) -> String {
    let link = Link::new(&post.permalink, &post.title).nofollow(nofollow);
    list_item(Some(class::POST), &link.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use pretty_assertions::assert_eq;
    use regex::Regex;

    use crate::domain::{build_forest, TreeNode};
    use crate::util::testing::{category, init_test_setup, StaticSource};

    fn renderer(source: StaticSource) -> TreeRenderer {
        init_test_setup();
        TreeRenderer::new(LeafCollector::new(Arc::new(source)), &Labels::default())
    }

    fn two_level_source() -> StaticSource {
        StaticSource::new(vec![category(1, "News", 0), category(2, "Local", 1)])
            .with_post(10, "Parade", &[2, 1])
            .with_post(11, "Election", &[1])
    }

    #[test]
    fn given_empty_forest_when_rendering_then_empty_string() {
        let r = renderer(StaticSource::default());
        assert_eq!(r.render(&[], &RenderOptions::default(), true, true), "");
        assert_eq!(r.render_forest(&[], &RenderOptions::default()), "");
    }

    #[test]
    fn given_two_level_tree_when_rendering_then_nests_posts_and_children() {
        let source = two_level_source();
        let forest = build_forest(&source.categories.clone(), 0).unwrap();
        let r = renderer(source);

        let html = r.render_forest(&forest, &RenderOptions::default());

        let expected = concat!(
            r#"<ul class="sitemap-posts-list">"#,
            r#"<li><div class="sitemap-category-title">Category: <a href="https://example.com/?cat=1">News</a></div>"#,
            r#"<ul class="sitemap-posts-list">"#,
            r#"<li class="sitemap-post"><a href="https://example.com/?p=11">Election</a></li>"#,
            r#"<ul class="sitemap-posts-list">"#,
            r#"<li><div class="sitemap-category-title">Category: <a href="https://example.com/?cat=2">Local</a></div>"#,
            r#"<ul class="sitemap-posts-list"><li class="sitemap-post"><a href="https://example.com/?p=10">Parade</a></li></ul>"#,
            r#"</li></ul>"#,
            r#"</ul></li></ul>"#,
        );
        assert_eq!(html, expected);
    }

    #[test]
    fn given_post_in_child_when_rendering_parent_alone_then_post_absent() {
        let source = two_level_source();
        let r = renderer(source);
        let parent_only = vec![TreeNode::new(category(1, "News", 0))];
        let child_only = vec![TreeNode::new(category(2, "Local", 1))];

        let parent_html = r.render_forest(&parent_only, &RenderOptions::default());
        let child_html = r.render_forest(&child_only, &RenderOptions::default());

        assert!(!parent_html.contains("Parade"));
        assert!(parent_html.contains("Election"));
        assert!(child_html.contains("Parade"));
    }

    #[test]
    fn given_category_without_content_when_rendering_then_no_inner_list() {
        let r = renderer(StaticSource::new(vec![category(1, "Empty", 0)]));
        let forest = vec![TreeNode::new(category(1, "Empty", 0))];

        let html = r.render(&forest, &RenderOptions::default(), false, false);

        assert_eq!(
            html,
            r#"<li><div class="sitemap-category-title"><a href="https://example.com/?cat=1">Empty</a></div></li>"#
        );
    }

    #[test]
    fn given_custom_separator_when_rendering_then_label_uses_it() {
        let r = renderer(StaticSource::default());
        let forest = vec![TreeNode::new(category(1, "News", 0))];
        let options = RenderOptions {
            category_label_separator: " - ".into(),
            ..RenderOptions::default()
        };

        let html = r.render_forest(&forest, &options);

        assert!(html.contains("Category - <a"));
    }

    #[test]
    fn given_label_with_markup_when_rendering_then_label_is_escaped() {
        let labels = Labels {
            category: "R&D <x>".into(),
            ..Labels::default()
        };
        let r = TreeRenderer::new(
            LeafCollector::new(Arc::new(StaticSource::new(vec![category(1, "News", 0)]))),
            &labels,
        );
        let forest = vec![TreeNode::new(category(1, "News", 0))];
        let options = RenderOptions {
            category_label_separator: " > ".into(),
            ..RenderOptions::default()
        };

        let html = r.render_forest(&forest, &options);

        assert!(html.contains("R&amp;D &lt;x&gt; &gt; <a"), "{html}");
        assert!(!html.contains("<x>"));
    }

    #[test]
    fn given_nofollow_flag_when_rendering_then_every_anchor_is_marked() {
        let source = two_level_source();
        let forest = build_forest(&source.categories.clone(), 0).unwrap();
        let r = renderer(source);
        let anchor = Regex::new(r"<a [^>]*>").unwrap();

        let on = RenderOptions {
            add_nofollow: true,
            ..RenderOptions::default()
        };
        let html_on = r.render_forest(&forest, &on);
        let html_off = r.render_forest(&forest, &RenderOptions::default());

        let tags_on: Vec<_> = anchor.find_iter(&html_on).collect();
        assert_eq!(tags_on.len(), 4);
        assert!(tags_on.iter().all(|m| m.as_str().contains(r#"rel="nofollow""#)));
        assert!(anchor
            .find_iter(&html_off)
            .all(|m| !m.as_str().contains("nofollow")));
    }

    #[test]
    fn given_same_input_when_rendering_twice_then_identical_output() {
        let source = two_level_source();
        let forest = build_forest(&source.categories.clone(), 0).unwrap();
        let r = renderer(source);

        let first = r.render_forest(&forest, &RenderOptions::default());
        let second = r.render_forest(&forest, &RenderOptions::default());

        assert_eq!(first, second);
    }

    #[test]
    fn given_siblings_when_rendering_then_input_order_is_kept() {
        let cats = vec![category(3, "Zed", 0), category(1, "Alpha", 0), category(2, "Mid", 0)];
        let forest = build_forest(&cats, 0).unwrap();
        let r = renderer(StaticSource::new(cats));

        let html = r.render_forest(&forest, &RenderOptions::default());

        let zed = html.find("Zed").unwrap();
        let alpha = html.find("Alpha").unwrap();
        let mid = html.find("Mid").unwrap();
        assert!(zed < alpha && alpha < mid);
    }
}

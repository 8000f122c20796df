//! Application services
//!
//! Concrete services that turn content source records into sitemap markup.
//! They depend on the `ContentSource` boundary trait but are themselves
//! concrete structs.

mod leaves;
mod pages;
mod renderer;
mod sitemap;

pub use leaves::LeafCollector;
pub use pages::{add_nofollow_to_links, PageListFormatter};
pub use renderer::TreeRenderer;
pub use sitemap::{CategoryForest, SitemapRequest, SitemapService};

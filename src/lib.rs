//! sitemap-tree: render a site's category, post and page hierarchy as nested
//! HTML lists.
//!
//! Layers (inner to outer):
//! - `domain`: records, generic forest building, markup primitives
//! - `application`: sitemap services over the `ContentSource` boundary
//! - `infrastructure`: JSON snapshot source and service wiring
//! - `cli`: argument parsing and command handlers

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

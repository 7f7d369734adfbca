//! The library code for the `quire` blog builder. A build has two halves:
//!
//! 1. Rendering each configured post into a standalone HTML page
//!    ([`crate::render`])
//! 2. Assembling the index page that lists every post ([`crate::build`])
//!
//! The index is itself a Markdown document ([`crate::index`]) rendered the
//! same way as the posts. Each post contributes one listing line built from a
//! title and date that are scraped from its source by line matching
//! ([`crate::frontmatter`]) rather than by parsing its front matter.
//!
//! Which posts exist, and in what order, comes from the project file
//! ([`crate::config`]) rather than from the contents of the posts directory.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod frontmatter;
pub mod index;
pub mod post;
pub mod render;

//! Exports the [`build_site`] function, which renders every configured post
//! and assembles the index page that links to them.
//!
//! Posts are visited newest first (the reverse of the configured order). For
//! each post the page is rendered, its title and date are scanned from the
//! source, a listing line is appended to the index document, and the index is
//! staged and re-rendered. The index on disk therefore always reflects every
//! post processed so far, and a build with no posts writes no index at all.

use crate::config::Config;
use crate::frontmatter::{Field, FrontMatter, Markers};
use crate::index::IndexDocument;
use crate::post::Post;
use crate::render::{Error as RenderError, RenderJob, Renderer, Template};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What a successful build produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildSummary {
    /// The number of post pages rendered.
    pub posts: usize,

    /// The index page, if one was rendered.
    pub index: Option<PathBuf>,
}

/// Builds the site described by `config` with its configured renderer.
pub fn build(config: &Config) -> Result<BuildSummary> {
    build_site(config, config.renderer())
}

/// Builds the site described by `config`, rendering pages with `renderer`.
/// Stops at the first error; pages rendered before it are left in place.
pub fn build_site(config: &Config, renderer: &dyn Renderer) -> Result<BuildSummary> {
    std::fs::create_dir_all(&config.posts_output_directory).map_err(|err| Error::Io {
        path: config.posts_output_directory.clone(),
        err,
    })?;
    if let Some(staging_dir) = config.staging_file.parent() {
        std::fs::create_dir_all(staging_dir).map_err(|err| Error::Io {
            path: staging_dir.to_owned(),
            err,
        })?;
    }

    let assembler = Assembler {
        renderer,
        markers: config.markers,
        post_stylesheet: &config.stylesheets.post,
        index_stylesheet: &config.stylesheets.index,
        staging_file: &config.staging_file,
        index_file: config.output_directory.join("index.html"),
    };
    let mut index = IndexDocument::new(
        &config.site_title,
        &config.home_page,
        config.intro.as_deref(),
    );
    assembler.assemble(&config.posts, &mut index)
}

struct Assembler<'a> {
    renderer: &'a dyn Renderer,
    markers: Markers,
    post_stylesheet: &'a str,
    index_stylesheet: &'a str,
    staging_file: &'a Path,
    index_file: PathBuf,
}

impl Assembler<'_> {
    fn assemble(&self, posts: &[Post], index: &mut IndexDocument) -> Result<BuildSummary> {
        let mut summary = BuildSummary {
            posts: 0,
            index: None,
        };

        for post in posts.iter().rev() {
            self.add_post(post, index)?;
            summary.posts += 1;
            summary.index = Some(self.index_file.clone());
        }

        if summary.index.is_none() {
            info!("No posts configured; not writing an index");
        }
        Ok(summary)
    }

    fn add_post(&self, post: &Post, index: &mut IndexDocument) -> Result<()> {
        if !post.source_path.is_file() {
            return Err(Error::MissingPost(post.source_path.clone()));
        }

        info!(
            "Converting {} to {}",
            post.source_path.display(),
            post.output_path.display()
        );
        self.renderer
            .render(&RenderJob {
                template: Template::Post,
                stylesheet: self.post_stylesheet,
                source: &post.source_path,
                destination: &post.output_path,
            })
            .map_err(|err| Error::RenderPost {
                post: post.source_path.clone(),
                err,
            })?;

        let source = std::fs::read_to_string(&post.source_path).map_err(|err| Error::Io {
            path: post.source_path.clone(),
            err,
        })?;
        let frontmatter =
            FrontMatter::scan(&source, self.markers).map_err(|field| Error::MissingField {
                post: post.source_path.clone(),
                field,
            })?;

        index.push(&frontmatter.date, &frontmatter.title, &post.link);

        debug!(path = %self.staging_file.display(), "staging index");
        std::fs::write(self.staging_file, index.as_str()).map_err(|err| Error::Io {
            path: self.staging_file.to_owned(),
            err,
        })?;

        debug!(path = %self.index_file.display(), "rendering index");
        self.renderer
            .render(&RenderJob {
                template: Template::Index,
                stylesheet: self.index_stylesheet,
                source: self.staging_file,
                destination: &self.index_file,
            })
            .map_err(|err| Error::RenderIndex {
                post: post.source_path.clone(),
                err,
            })
    }
}

/// Represents the result of a build.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Every error is fatal: the build stops
/// at the post that caused it.
#[derive(Debug)]
pub enum Error {
    /// Returned when a post's source has no recognizable title or date line.
    MissingField { post: PathBuf, field: Field },

    /// Returned when a configured post's source file doesn't exist.
    MissingPost(PathBuf),

    /// Returned when rendering a post's page fails.
    RenderPost { post: PathBuf, err: RenderError },

    /// Returned when re-rendering the index after adding `post` to it fails.
    RenderIndex { post: PathBuf, err: RenderError },

    /// Returned for other I/O errors.
    Io { path: PathBuf, err: std::io::Error },
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingField { post, field } => {
                write!(f, "failed to find {} for post: {}", field, post.display())
            }
            Error::MissingPost(path) => {
                write!(f, "configured post not found: {}", path.display())
            }
            Error::RenderPost { post, err: _ } => {
                write!(f, "rendering post {}", post.display())
            }
            Error::RenderIndex { post, err: _ } => {
                write!(f, "rendering index after adding post {}", post.display())
            }
            Error::Io { path, err } => write!(f, "'{}': {}", path.display(), err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MissingField { .. } => None,
            Error::MissingPost(_) => None,
            Error::RenderPost { post: _, err } => Some(err),
            Error::RenderIndex { post: _, err } => Some(err),
            Error::Io { path: _, err } => Some(err),
        }
    }
}

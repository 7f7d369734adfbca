//! Defines the [`Post`] type: a configured source file together with the
//! locations its rendered HTML is written to and linked from.

use std::fmt;
use std::path::{Path, PathBuf};

pub const MARKDOWN_EXTENSION: &str = "md";
pub const ORG_EXTENSION: &str = "org";
pub const HTML_EXTENSION: &str = "html";

/// The markup language of a post's source file, derived from its extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Markdown,
    Org,
}

/// A single configured post. Posts are never discovered from the file system;
/// they come from the ordered `posts` list in the project file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Post {
    /// The file name as it appears in the configuration (e.g.,
    /// `2021-11-27_hello.md`).
    pub file_name: String,

    /// The markup language of the source file.
    pub format: Format,

    /// `{posts_directory}/{file_name}`.
    pub source_path: PathBuf,

    /// `{output_posts_directory}/{stem}.html`.
    pub output_path: PathBuf,

    /// The link target used in the index, relative to the output root (e.g.,
    /// `posts/2021-11-27_hello.html`).
    pub link: String,
}

impl Post {
    /// Resolves a configured file name into a [`Post`]. Fails if the file name
    /// doesn't carry a `.md` or `.org` extension.
    pub fn new(
        file_name: &str,
        posts_directory: &Path,
        output_posts_directory: &Path,
        posts_subdirectory: &str,
    ) -> Result<Post, InvalidFileNameError> {
        let (stem, format) = split_extension(file_name)
            .ok_or_else(|| InvalidFileNameError(file_name.to_owned()))?;
        let html_name = format!("{}.{}", stem, HTML_EXTENSION);
        let link = match posts_subdirectory.trim_matches('/') {
            "" => html_name.clone(),
            dir => format!("{}/{}", dir, html_name),
        };

        Ok(Post {
            file_name: file_name.to_owned(),
            format,
            source_path: posts_directory.join(file_name),
            output_path: output_posts_directory.join(&html_name),
            link,
        })
    }
}

fn split_extension(file_name: &str) -> Option<(&str, Format)> {
    let (stem, extension) = file_name.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    match extension {
        MARKDOWN_EXTENSION => Some((stem, Format::Markdown)),
        ORG_EXTENSION => Some((stem, Format::Org)),
        _ => None,
    }
}

/// Returned when a configured post file name isn't a `.md` or `.org` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidFileNameError(pub String);

impl fmt::Display for InvalidFileNameError {
    /// Displays an [`InvalidFileNameError`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "invalid post file name `{}`: expected a `.{}` or `.{}` file",
            &self.0, MARKDOWN_EXTENSION, ORG_EXTENSION
        )
    }
}

impl std::error::Error for InvalidFileNameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_new_markdown_post() -> Result<(), InvalidFileNameError> {
        let post = Post::new(
            "2021-11-27_how-to-parse-eve-chat-log.md",
            Path::new("./posts"),
            Path::new("./docs/posts"),
            "posts",
        )?;

        assert_eq!(Format::Markdown, post.format);
        assert_eq!(
            PathBuf::from("./posts/2021-11-27_how-to-parse-eve-chat-log.md"),
            post.source_path
        );
        assert_eq!(
            PathBuf::from("./docs/posts/2021-11-27_how-to-parse-eve-chat-log.html"),
            post.output_path
        );
        assert_eq!("posts/2021-11-27_how-to-parse-eve-chat-log.html", post.link);
        Ok(())
    }

    #[test]
    fn test_new_org_post() -> Result<(), InvalidFileNameError> {
        let post = Post::new(
            "effects.v2.org",
            Path::new("posts"),
            Path::new("docs/posts"),
            "posts/",
        )?;
        assert_eq!(Format::Org, post.format);
        assert_eq!(PathBuf::from("docs/posts/effects.v2.html"), post.output_path);
        assert_eq!("posts/effects.v2.html", post.link);
        Ok(())
    }

    #[test]
    fn test_new_empty_subdirectory_links_from_root() -> Result<(), InvalidFileNameError> {
        let post = Post::new("hello.md", Path::new("posts"), Path::new("docs"), "")?;
        assert_eq!("hello.html", post.link);
        Ok(())
    }

    #[test]
    fn test_new_rejects_other_extensions() {
        for name in &["notes.txt", "README", ".md", "post.MD"] {
            assert_eq!(
                Err(InvalidFileNameError((*name).to_owned())),
                Post::new(name, Path::new("posts"), Path::new("docs/posts"), "posts"),
            );
        }
    }
}

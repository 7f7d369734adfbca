//! Converts source documents into standalone HTML files. The [`Renderer`]
//! trait is the seam between the build and whatever does the converting:
//! [`Pandoc`] shells out to `pandoc`, and [`Builtin`] renders Markdown
//! in-process with [`pulldown_cmark`] and [`gtmpl`].

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use tracing::{debug, trace};

/// Which page template to render a document with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Template {
    Post,
    Index,
}

impl Template {
    pub fn name(self) -> &'static str {
        match self {
            Template::Post => "post",
            Template::Index => "index",
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single conversion: render `source` with `template` into `destination`,
/// linking `stylesheet`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderJob<'a> {
    pub template: Template,
    pub stylesheet: &'a str,
    pub source: &'a Path,
    pub destination: &'a Path,
}

/// Produces a standalone HTML document from a [`RenderJob`]. Implementations
/// block until the destination file has been written.
pub trait Renderer {
    fn render(&self, job: &RenderJob) -> Result<()>;
}

/// Renders documents by running `pandoc` once per job.
#[derive(Clone, Debug)]
pub struct Pandoc {
    /// The program to run, usually just `pandoc`.
    pub program: PathBuf,

    /// The pandoc data directory. Templates are looked up as
    /// `{data_dir}/templates/{template}.html`.
    pub data_dir: PathBuf,
}

impl Pandoc {
    fn command(&self, job: &RenderJob) -> Command {
        let template = self
            .data_dir
            .join("templates")
            .join(format!("{}.html", job.template.name()));

        let mut command = Command::new(&self.program);
        command
            .arg(format!("--data-dir={}", self.data_dir.display()))
            .arg(format!("--template={}", template.display()))
            .arg(format!("--css={}", job.stylesheet))
            .arg("--standalone")
            .arg("-o")
            .arg(job.destination)
            .arg(job.source);
        command
    }
}

impl Renderer for Pandoc {
    fn render(&self, job: &RenderJob) -> Result<()> {
        let mut command = self.command(job);
        trace!(?command, "running converter");

        let output = command.output().map_err(|err| Error::Spawn {
            program: self.program.clone(),
            err,
        })?;
        if !output.status.success() {
            return Err(Error::Failed {
                program: self.program.clone(),
                source_path: job.source.to_owned(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        Ok(())
    }
}

/// Renders Markdown documents in-process. Org sources aren't supported.
#[derive(Clone, Debug, Default)]
pub struct Builtin {
    /// A directory holding `post.html` and `index.html` templates. Templates
    /// that aren't found there (or all of them, if this is `None`) fall back
    /// to [`DEFAULT_POST_TEMPLATE`] and [`DEFAULT_INDEX_TEMPLATE`].
    pub templates_directory: Option<PathBuf>,
}

pub const DEFAULT_POST_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{{ .title }}</title>
<link rel="stylesheet" href="{{ .css }}">
</head>
<body>
<header>
<h1>{{ .title }}</h1>
<p class="date">{{ .date }}</p>
</header>
<main>
{{ .body }}
</main>
</body>
</html>
"#;

pub const DEFAULT_INDEX_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{{ .title }}</title>
<link rel="stylesheet" href="{{ .css }}">
</head>
<body>
<header>
<h1>{{ .title }}</h1>
</header>
<main>
{{ .body }}
</main>
</body>
</html>
"#;

#[derive(Deserialize, Default)]
struct Metadata {
    #[serde(default)]
    title: Option<String>,

    #[serde(default)]
    date: Option<String>,
}

impl Builtin {
    fn template_text(&self, template: Template) -> Result<String> {
        if let Some(dir) = &self.templates_directory {
            let path = dir.join(format!("{}.html", template.name()));
            match std::fs::read_to_string(&path) {
                Ok(text) => return Ok(text),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!(path = %path.display(), "template not found, using default");
                }
                Err(err) => return Err(Error::Io { path, err }),
            }
        }
        Ok(match template {
            Template::Post => DEFAULT_POST_TEMPLATE,
            Template::Index => DEFAULT_INDEX_TEMPLATE,
        }
        .to_owned())
    }
}

impl Renderer for Builtin {
    fn render(&self, job: &RenderJob) -> Result<()> {
        // The staged index is always Markdown, whatever it's named.
        let is_markdown = job.template == Template::Index
            || job
                .source
                .extension()
                .map_or(false, |ext| ext == crate::post::MARKDOWN_EXTENSION);
        if !is_markdown {
            return Err(Error::UnsupportedFormat(job.source.to_owned()));
        }

        let input = std::fs::read_to_string(job.source).map_err(|err| Error::Io {
            path: job.source.to_owned(),
            err,
        })?;
        let (metadata, body) = split_frontmatter(&input).map_err(|err| Error::Frontmatter {
            path: job.source.to_owned(),
            err,
        })?;

        let mut m: HashMap<String, gtmpl::Value> = HashMap::new();
        m.insert("title".to_owned(), escape(&metadata.title.unwrap_or_default()).into());
        m.insert("date".to_owned(), escape(&metadata.date.unwrap_or_default()).into());
        m.insert("css".to_owned(), escape(job.stylesheet).into());
        m.insert("body".to_owned(), markdown_to_html(body).into());

        let html = gtmpl::template(&self.template_text(job.template)?, gtmpl::Value::Object(m))
            .map_err(|e| Error::Template {
                template: job.template,
                message: e.to_string(),
            })?;
        std::fs::write(job.destination, html).map_err(|err| Error::Io {
            path: job.destination.to_owned(),
            err,
        })
    }
}

// Splits a leading `---`-fenced YAML block off of `input`. Leading blank lines
// are allowed before the opening fence. Documents without a fence have no
// metadata.
fn split_frontmatter(input: &str) -> std::result::Result<(Metadata, &str), serde_yaml::Error> {
    const FENCE: &str = "---";
    let trimmed = input.trim_start();
    if !trimmed.starts_with(FENCE) {
        return Ok((Metadata::default(), input));
    }
    let yaml_start = FENCE.len();
    match trimmed[yaml_start..].find(FENCE) {
        None => Ok((Metadata::default(), input)),
        Some(offset) => {
            let yaml = &trimmed[yaml_start..yaml_start + offset];
            let body = &trimmed[yaml_start + offset + FENCE.len()..];
            let metadata = match yaml.trim() {
                "" => Metadata::default(),
                yaml => serde_yaml::from_str(yaml)?,
            };
            Ok((metadata, body))
        }
    }
}

// gtmpl doesn't escape what it interpolates.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let _ = pulldown_cmark::escape::escape_html(&mut out, text);
    out
}

fn markdown_to_html(markdown: &str) -> String {
    use pulldown_cmark::{html, Options, Parser};

    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut out = String::new();
    html::push_html(&mut out, Parser::new_ext(markdown, options));
    out
}

/// Represents the result of a render.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error rendering a document.
#[derive(Debug)]
pub enum Error {
    /// Returned when the converter program couldn't be started.
    Spawn {
        program: PathBuf,
        err: std::io::Error,
    },

    /// Returned when the converter program exited unsuccessfully.
    Failed {
        program: PathBuf,
        source_path: PathBuf,
        status: ExitStatus,
        stderr: String,
    },

    /// Returned when the builtin renderer is given a non-Markdown source.
    UnsupportedFormat(PathBuf),

    /// Returned when a source's YAML front matter block isn't valid YAML.
    Frontmatter {
        path: PathBuf,
        err: serde_yaml::Error,
    },

    /// Returned when a template fails to parse or execute.
    Template { template: Template, message: String },

    /// Returned for I/O problems reading sources and templates or writing
    /// output.
    Io { path: PathBuf, err: std::io::Error },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Spawn { program, err } => {
                write!(f, "Running `{}`: {}", program.display(), err)
            }
            Error::Failed {
                program,
                source_path,
                status,
                stderr,
            } => {
                write!(
                    f,
                    "`{}` failed converting '{}' ({})",
                    program.display(),
                    source_path.display(),
                    status
                )?;
                if !stderr.is_empty() {
                    write!(f, ": {}", stderr)?;
                }
                Ok(())
            }
            Error::UnsupportedFormat(path) => write!(
                f,
                "The builtin renderer only supports Markdown; can't render '{}'",
                path.display()
            ),
            Error::Frontmatter { path, err } => {
                write!(f, "Parsing front matter in '{}': {}", path.display(), err)
            }
            Error::Template { template, message } => {
                write!(f, "Rendering {} template: {}", template, message)
            }
            Error::Io { path, err } => write!(f, "'{}': {}", path.display(), err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Spawn { program: _, err } => Some(err),
            Error::Failed { .. } => None,
            Error::UnsupportedFormat(_) => None,
            Error::Frontmatter { path: _, err } => Some(err),
            Error::Template { .. } => None,
            Error::Io { path: _, err } => Some(err),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::ffi::OsString;

    #[test]
    fn test_pandoc_command_line() {
        let pandoc = Pandoc {
            program: PathBuf::from("pandoc"),
            data_dir: PathBuf::from("_pandoc"),
        };
        let command = pandoc.command(&RenderJob {
            template: Template::Post,
            stylesheet: "/style.css",
            source: Path::new("posts/hello.md"),
            destination: Path::new("docs/posts/hello.html"),
        });

        assert_eq!("pandoc", command.get_program());
        let args: Vec<OsString> = command.get_args().map(|a| a.to_owned()).collect();
        let wanted: Vec<OsString> = vec![
            "--data-dir=_pandoc".into(),
            format!(
                "--template={}",
                Path::new("_pandoc").join("templates").join("post.html").display()
            )
            .into(),
            "--css=/style.css".into(),
            "--standalone".into(),
            "-o".into(),
            "docs/posts/hello.html".into(),
            "posts/hello.md".into(),
        ];
        assert_eq!(wanted, args);
    }

    #[test]
    fn test_pandoc_missing_program() {
        let dir = tempfile::tempdir().unwrap();
        let pandoc = Pandoc {
            program: dir.path().join("no-such-pandoc"),
            data_dir: PathBuf::from("_pandoc"),
        };
        let result = pandoc.render(&RenderJob {
            template: Template::Index,
            stylesheet: "style.css",
            source: &dir.path().join("index.md"),
            destination: &dir.path().join("index.html"),
        });
        match result {
            Err(Error::Spawn { .. }) => {}
            other => panic!("wanted Error::Spawn, got {:?}", other),
        }
    }

    #[test]
    fn test_split_frontmatter() {
        let (metadata, body) =
            split_frontmatter("\n---\ntitle: \"Blog\"\ndate: 2021-01-01\n---\n\nHello\n")
                .unwrap();
        assert_eq!(Some("Blog".to_owned()), metadata.title);
        assert_eq!(Some("2021-01-01".to_owned()), metadata.date);
        assert_eq!("\n\nHello\n", body);
    }

    #[test]
    fn test_split_frontmatter_without_fence() {
        let (metadata, body) = split_frontmatter("# Hello\n").unwrap();
        assert_eq!(None, metadata.title);
        assert_eq!("# Hello\n", body);
    }

    #[test]
    fn test_builtin_renders_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("hello.md");
        let destination = dir.path().join("hello.html");
        std::fs::write(
            &source,
            "---\ntitle: Hello\ndate: 2021-01-01\n---\n\nSome *text*.\n",
        )
        .unwrap();

        Builtin::default()
            .render(&RenderJob {
                template: Template::Post,
                stylesheet: "/style.css",
                source: &source,
                destination: &destination,
            })
            .unwrap();

        let html = std::fs::read_to_string(&destination).unwrap();
        assert!(html.contains("<title>Hello</title>"));
        assert!(html.contains(r#"<link rel="stylesheet" href="/style.css">"#));
        assert!(html.contains(r#"<p class="date">2021-01-01</p>"#));
        assert!(html.contains("<p>Some <em>text</em>.</p>"));
    }

    #[test]
    fn test_builtin_uses_templates_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("index.html"),
            "[{{ .title }}|{{ .css }}]{{ .body }}",
        )
        .unwrap();
        let source = dir.path().join("index.md");
        let destination = dir.path().join("out.html");
        std::fs::write(&source, "---\ntitle: Blog\n---\n- one\n").unwrap();

        Builtin {
            templates_directory: Some(dir.path().to_owned()),
        }
        .render(&RenderJob {
            template: Template::Index,
            stylesheet: "style.css",
            source: &source,
            destination: &destination,
        })
        .unwrap();

        let html = std::fs::read_to_string(&destination).unwrap();
        assert!(html.starts_with("[Blog|style.css]<ul>"));
    }

    #[test]
    fn test_builtin_rejects_org() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("effects.org");
        std::fs::write(&source, "#+TITLE: Effects\n").unwrap();

        let result = Builtin::default().render(&RenderJob {
            template: Template::Post,
            stylesheet: "/style.css",
            source: &source,
            destination: &dir.path().join("effects.html"),
        });
        match result {
            Err(Error::UnsupportedFormat(path)) => assert_eq!(source, path),
            other => panic!("wanted Error::UnsupportedFormat, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_pandoc_nonzero_exit() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("hello.md");
        std::fs::write(&source, "title: Hello\n").unwrap();
        // `sh` starts, complains about `--data-dir=...` on stderr, and exits
        // non-zero.
        let pandoc = Pandoc {
            program: PathBuf::from("sh"),
            data_dir: PathBuf::from("_pandoc"),
        };

        let result = pandoc.render(&RenderJob {
            template: Template::Post,
            stylesheet: "/style.css",
            source: &source,
            destination: &dir.path().join("hello.html"),
        });
        match result {
            Err(Error::Failed {
                program,
                source_path,
                status,
                stderr,
            }) => {
                assert_eq!(PathBuf::from("sh"), program);
                assert_eq!(source, source_path);
                assert!(!status.success());
                assert!(!stderr.is_empty());
            }
            other => panic!("wanted Error::Failed, got {:?}", other),
        }
    }

    #[test]
    fn test_builtin_renders_index_regardless_of_extension() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("index.txt");
        let destination = dir.path().join("index.html");
        std::fs::write(&source, "---\ntitle: Blog\n---\n\n## Posts\n").unwrap();

        Builtin::default()
            .render(&RenderJob {
                template: Template::Index,
                stylesheet: "style.css",
                source: &source,
                destination: &destination,
            })
            .unwrap();

        let html = std::fs::read_to_string(&destination).unwrap();
        assert!(html.contains("<title>Blog</title>"));
        assert!(html.contains("<h2>Posts</h2>"));
    }

    #[test]
    fn test_builtin_escapes_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("cmp.md");
        let destination = dir.path().join("cmp.html");
        std::fs::write(
            &source,
            "---\ntitle: 'a < b & \"c\"'\ndate: <today>\n---\n\nBody.\n",
        )
        .unwrap();

        Builtin::default()
            .render(&RenderJob {
                template: Template::Post,
                stylesheet: "/style.css",
                source: &source,
                destination: &destination,
            })
            .unwrap();

        let html = std::fs::read_to_string(&destination).unwrap();
        assert!(html.contains("<title>a &lt; b &amp; &quot;c&quot;</title>"));
        assert!(html.contains("<h1>a &lt; b &amp; &quot;c&quot;</h1>"));
        assert!(html.contains(r#"<p class="date">&lt;today&gt;</p>"#));
    }
}

//! Loads the project file (`quire.yaml`) and resolves it into a [`Config`].

use crate::frontmatter::Markers;
use crate::post::Post;
use crate::render::{Builtin, Pandoc, Renderer};
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

pub const PROJECT_FILE_NAME: &str = "quire.yaml";

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Project {
    site: Site,

    #[serde(default = "default_posts_directory")]
    posts_directory: PathBuf,

    #[serde(default = "default_output_directory")]
    output_directory: PathBuf,

    #[serde(default = "default_posts_subdirectory")]
    posts_subdirectory: String,

    #[serde(default)]
    staging_file: Option<PathBuf>,

    #[serde(default)]
    stylesheets: Stylesheets,

    #[serde(default = "default_org_fallback")]
    org_fallback: bool,

    #[serde(default)]
    renderer: RendererKind,

    #[serde(default)]
    pandoc: PandocSettings,

    #[serde(default)]
    builtin: BuiltinSettings,

    #[serde(default)]
    posts: Vec<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Site {
    title: String,
    home_page: Url,

    #[serde(default)]
    intro: Option<String>,
}

/// The stylesheet references handed to the renderer for each kind of page.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Stylesheets {
    #[serde(default = "default_post_stylesheet")]
    pub post: String,

    #[serde(default = "default_index_stylesheet")]
    pub index: String,
}

impl Default for Stylesheets {
    fn default() -> Self {
        Stylesheets {
            post: default_post_stylesheet(),
            index: default_index_stylesheet(),
        }
    }
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    Pandoc,
    Builtin,
}

impl Default for RendererKind {
    fn default() -> Self {
        RendererKind::Pandoc
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PandocSettings {
    #[serde(default = "default_pandoc_program")]
    program: PathBuf,

    #[serde(default = "default_pandoc_data_dir")]
    data_dir: PathBuf,
}

impl Default for PandocSettings {
    fn default() -> Self {
        PandocSettings {
            program: default_pandoc_program(),
            data_dir: default_pandoc_data_dir(),
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct BuiltinSettings {
    #[serde(default)]
    templates_directory: Option<PathBuf>,
}

fn default_posts_directory() -> PathBuf {
    PathBuf::from("posts")
}

fn default_output_directory() -> PathBuf {
    PathBuf::from("docs")
}

fn default_posts_subdirectory() -> String {
    String::from("posts")
}

fn default_org_fallback() -> bool {
    true
}

fn default_post_stylesheet() -> String {
    String::from("/style.css")
}

fn default_index_stylesheet() -> String {
    String::from("style.css")
}

fn default_pandoc_program() -> PathBuf {
    PathBuf::from("pandoc")
}

fn default_pandoc_data_dir() -> PathBuf {
    PathBuf::from("_pandoc")
}

/// Everything a build needs, with all paths resolved against the project
/// directory.
#[derive(Clone, Debug)]
pub struct Config {
    /// Placed in the index page's YAML header.
    pub site_title: String,

    /// Linked from the index page's intro blurb.
    pub home_page: Url,

    /// Replaces the default intro blurb when set.
    pub intro: Option<String>,

    /// The directory holding post sources.
    pub posts_source_directory: PathBuf,

    /// The output root. `index.html` is written here.
    pub output_directory: PathBuf,

    /// `{output_directory}/{posts_subdirectory}`. Post pages are written here.
    pub posts_output_directory: PathBuf,

    /// Where the in-progress index Markdown is written before each index
    /// render.
    pub staging_file: PathBuf,

    pub stylesheets: Stylesheets,

    /// Which marker passes the front matter scanner runs.
    pub markers: Markers,

    pub renderer: RendererKind,
    pub pandoc: Pandoc,
    pub builtin: Builtin,

    /// Configured posts, oldest first.
    pub posts: Vec<Post>,
}

impl Config {
    /// Looks for `quire.yaml` in `dir` and then in each of its ancestors, and
    /// loads the first one found.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let path = dir.join(PROJECT_FILE_NAME);
        if path.exists() {
            Config::from_project_file(&path)
                .with_context(|| format!("Loading configuration from `{}`", path.display()))
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent),
                None => Err(anyhow!(
                    "Could not find `{}` in any parent directory",
                    PROJECT_FILE_NAME
                )),
            }
        }
    }

    /// Loads a specific project file. Relative paths inside it are resolved
    /// against the directory that contains it.
    pub fn from_project_file(path: &Path) -> Result<Config> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Opening project file `{}`", path.display()))?;
        let project: Project = serde_yaml::from_str(&text)?;
        let project_root = match path.parent() {
            Some(parent) if parent.as_os_str().is_empty() => Path::new("."),
            Some(parent) => parent,
            None => {
                return Err(anyhow!(
                    "Can't get parent directory for provided project file path '{:?}'",
                    path
                ))
            }
        };
        Config::from_project(project, project_root)
    }

    fn from_project(project: Project, project_root: &Path) -> Result<Config> {
        let posts_source_directory = project_root.join(&project.posts_directory);
        let output_directory = project_root.join(&project.output_directory);
        let posts_output_directory = output_directory.join(&project.posts_subdirectory);

        let posts = project
            .posts
            .iter()
            .map(|file_name| {
                Post::new(
                    file_name,
                    &posts_source_directory,
                    &posts_output_directory,
                    &project.posts_subdirectory,
                )
            })
            .collect::<std::result::Result<Vec<Post>, _>>()?;

        Ok(Config {
            site_title: project.site.title,
            home_page: project.site.home_page,
            intro: project.site.intro,
            staging_file: match project.staging_file {
                Some(staging_file) => project_root.join(staging_file),
                None => std::env::temp_dir().join("BLOG_index.md"),
            },
            stylesheets: project.stylesheets,
            markers: if project.org_fallback {
                Markers::YamlThenOrg
            } else {
                Markers::Yaml
            },
            renderer: project.renderer,
            pandoc: Pandoc {
                program: resolve_program(project_root, project.pandoc.program),
                data_dir: project_root.join(project.pandoc.data_dir),
            },
            builtin: Builtin {
                templates_directory: project
                    .builtin
                    .templates_directory
                    .map(|dir| project_root.join(dir)),
            },
            posts_source_directory,
            output_directory,
            posts_output_directory,
            posts,
        })
    }

    /// Returns the renderer selected by the `renderer` setting.
    pub fn renderer(&self) -> &dyn Renderer {
        match self.renderer {
            RendererKind::Pandoc => &self.pandoc,
            RendererKind::Builtin => &self.builtin,
        }
    }
}

// A bare program name is looked up on `PATH`; anything with a directory
// component is relative to the project.
fn resolve_program(project_root: &Path, program: PathBuf) -> PathBuf {
    if program.components().count() > 1 {
        project_root.join(program)
    } else {
        program
    }
}

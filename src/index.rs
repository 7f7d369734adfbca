//! Defines [`IndexDocument`], the Markdown source of the site's index page.

use url::Url;

/// The Markdown source for the index page. It starts out as a fixed preamble
/// and grows by one listing line per post.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexDocument {
    text: String,
}

impl IndexDocument {
    /// Creates a document holding only the preamble: a YAML header carrying
    /// the site title, the intro blurb, and a `## Posts` heading. If `intro`
    /// is `None`, the blurb points at `home_page`.
    pub fn new(site_title: &str, home_page: &Url, intro: Option<&str>) -> IndexDocument {
        let intro = match intro {
            Some(intro) => intro.trim().to_owned(),
            None => default_intro(home_page),
        };
        IndexDocument {
            text: format!(
                "\n---\ntitle: \"{}\"\n---\n\n{}\n\n## Posts\n\n",
                yaml_escape(site_title),
                intro,
            ),
        }
    }

    /// Appends the listing line for a post. The trailing space before the
    /// newline is part of the format.
    pub fn push(&mut self, date: &str, title: &str, link: &str) {
        self.text.push_str(&listing_line(date, title, link));
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Formats a single index entry: `- {date} - [{title}]({link}) \n`.
pub fn listing_line(date: &str, title: &str, link: &str) -> String {
    format!("- {} - [{}]({}) \n", date, title, link)
}

fn default_intro(home_page: &Url) -> String {
    let text = home_page.host_str().unwrap_or_else(|| home_page.as_str());
    format!("Visit my home page at [{}]({}).", text, link_target(home_page))
}

// `Url` always renders a bare origin with a trailing slash; drop it so the
// link reads the way it was configured.
fn link_target(url: &Url) -> &str {
    match url.path() {
        "/" if url.query().is_none() && url.fragment().is_none() => {
            url.as_str().trim_end_matches('/')
        }
        _ => url.as_str(),
    }
}

fn yaml_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

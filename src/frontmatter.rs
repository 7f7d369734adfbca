//! Pulls a post's title and date out of its raw source text.
//!
//! This is deliberately not a front matter parser. Each field is found by
//! scanning lines for a marker substring (`title:` for YAML-style headers,
//! `#+TITLE:` for Org headers), stripping the first occurrence of the marker
//! and trimming what remains. The YAML marker is tried over the whole file
//! first; the Org marker is only tried if that finds nothing. Quotes are kept
//! as-is, and a body line that happens to contain a marker counts as a match.

use std::fmt;

/// The title and date of a post, as written in its source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrontMatter {
    pub title: String,
    pub date: String,
}

/// A front matter field that the scanner looks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Title,
    Date,
}

impl Field {
    /// The field's name as reported in errors.
    pub fn name(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Date => "date",
        }
    }

    fn yaml_marker(self) -> &'static str {
        match self {
            Field::Title => "title:",
            Field::Date => "date:",
        }
    }

    fn org_marker(self) -> &'static str {
        match self {
            Field::Title => "#+TITLE:",
            Field::Date => "#+DATE:",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Selects which marker passes run for each field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Markers {
    /// Only `title:` and `date:`.
    Yaml,

    /// `title:`/`date:` first, then `#+TITLE:`/`#+DATE:` if the first pass
    /// found nothing.
    YamlThenOrg,
}

impl Default for Markers {
    fn default() -> Self {
        Markers::YamlThenOrg
    }
}

impl FrontMatter {
    /// Scans `source` for a title and a date. Returns the first [`Field`] that
    /// couldn't be found, checking the title before the date.
    pub fn scan(source: &str, markers: Markers) -> Result<FrontMatter, Field> {
        Ok(FrontMatter {
            title: scan_field(source, Field::Title, markers).ok_or(Field::Title)?,
            date: scan_field(source, Field::Date, markers).ok_or(Field::Date)?,
        })
    }
}

fn scan_field(source: &str, field: Field, markers: Markers) -> Option<String> {
    let found = find_marker(source, field.yaml_marker());
    match markers {
        Markers::Yaml => found,
        Markers::YamlThenOrg => found.or_else(|| find_marker(source, field.org_marker())),
    }
}

// Returns the trimmed remainder of the first line containing `marker`, with
// the first occurrence of `marker` removed.
fn find_marker(source: &str, marker: &str) -> Option<String> {
    source
        .lines()
        .find(|line| line.contains(marker))
        .map(|line| line.replacen(marker, "", 1).trim().to_owned())
}

//! The parsed page and its metadata.

use crate::control::{RootControl, Script, Template};
use crate::control_info::QualifiedName;
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use smol_str::SmolStr;
use source_location::Location;
use thiserror::Error;

/// A problem found in the page markup.
///
/// Displays as the plain message; the location is kept alongside.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct PageError {
    pub message: String,
    pub location: Location,
}

impl PageError {
    pub fn new(message: impl Into<String>, location: Location) -> Self {
        Self {
            message: message.into(),
            location,
        }
    }
}

/// A `<%@ ... %>` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDirective {
    /// `Page`, `Control`, `Master`, `Register`, `Import`, ...
    pub name: SmolStr,
    /// Attribute values by name, in source order.
    pub attributes: IndexMap<SmolStr, String>,
    pub location: Location,
}

impl PageDirective {
    /// Whether the directive has the given name, ignoring ASCII case.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Looks up an attribute value, ignoring ASCII case of the name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// The result of parsing one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPage {
    /// The page path, as given to the parser.
    pub path: Utf8PathBuf,
    /// The resolved `MasterPageFile` of the main directive.
    pub master_page: Option<Utf8PathBuf>,
    /// The first `Page`, `Control` or `Master` directive.
    pub directive: Option<PageDirective>,
    /// Every directive, in source order.
    pub directives: Vec<PageDirective>,
    pub root: RootControl,
    /// Every problem found, in source order.
    pub errors: Vec<PageError>,
    pub templates: Vec<Template>,
    pub scripts: Vec<Script>,
    /// IDs of the `ContentPlaceHolder`s the page defines.
    pub content_placeholders: Vec<String>,
    /// Files the page depends on: the master page and registered user controls.
    pub additional_files: Vec<Utf8PathBuf>,
}

impl ParsedPage {
    /// Whether any error was found.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns the page with `path` appended to its dependencies.
    pub fn with_additional_file(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        let path = path.into();
        if !self.additional_files.contains(&path) {
            self.additional_files.push(path);
        }
        self
    }

    /// Sets `master_page` from the main directive and records it as a dependency.
    pub(crate) fn with_master_page(mut self) -> Self {
        let master_page = self
            .directive
            .as_ref()
            .and_then(|directive| directive.attribute("MasterPageFile"))
            .filter(|file| !file.trim().is_empty())
            .map(|file| resolve_virtual_path(&self.path, file));
        match master_page {
            Some(master_page) => {
                self.master_page = Some(master_page.clone());
                self.with_additional_file(master_page)
            }
            None => self,
        }
    }
}

/// Resolves a page-relative or application-relative (`~/`) reference.
///
/// Application-relative paths resolve against the application root and come back
/// relative to it. Other paths resolve against the directory of `page`. `.` and
/// `..` segments are normalised; `..` never climbs above the root.
pub fn resolve_virtual_path(page: &Utf8Path, reference: &str) -> Utf8PathBuf {
    let reference = reference.trim().replace('\\', "/");
    let (base, relative) = if let Some(rest) = reference.strip_prefix("~/") {
        (String::new(), rest.to_string())
    } else if reference == "~" {
        (String::new(), String::new())
    } else if let Some(rest) = reference.strip_prefix('/') {
        (String::new(), rest.to_string())
    } else {
        let directory = page.parent().map_or(String::new(), |p| p.as_str().replace('\\', "/"));
        (directory, reference)
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in base.split('/').chain(relative.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            segment => segments.push(segment),
        }
    }

    let mut path = Utf8PathBuf::new();
    for segment in segments {
        path.push(segment);
    }
    path
}

/// The compiled type name of a user control: `ASP.` followed by the lowercased file
/// name with dots replaced by `_` (`Header.ascx` → `ASP.header_ascx`).
pub fn user_control_type(path: &Utf8Path) -> QualifiedName {
    let file_name = path.file_name().unwrap_or(path.as_str());
    QualifiedName::new("ASP", file_name.to_ascii_lowercase().replace('.', "_"))
}

//! Resolution of `groupId`/`artifactId`/`version` triples under a given element.

use crate::error::{PomError, Result};
use crate::types::{Coordinate, DeclaredCoordinate};
use pom_xml::{XmlDocument, XmlPath};

const GROUP_ID: &str = "groupId";
const ARTIFACT_ID: &str = "artifactId";
const VERSION: &str = "version";

/// Query paths for the three coordinate fields under one element.
#[derive(Debug, Clone)]
pub struct CoordinatePaths {
    root: XmlPath,
    group_id: XmlPath,
    artifact_id: XmlPath,
    version: XmlPath,
}

impl CoordinatePaths {
    /// # Errors
    ///
    /// Returns `XmlError::InvalidPath` if a field path cannot be built
    /// under `root`.
    pub fn new(root: XmlPath) -> pom_xml::Result<Self> {
        Ok(Self {
            group_id: root.join(&XmlPath::parse(GROUP_ID)?),
            artifact_id: root.join(&XmlPath::parse(ARTIFACT_ID)?),
            version: root.join(&XmlPath::parse(VERSION)?),
            root,
        })
    }

    /// The element holding the coordinate, e.g. `project/parent`.
    pub fn root(&self) -> &XmlPath {
        &self.root
    }
}

/// Resolves a complete coordinate, e.g. under `project/parent`.
///
/// # Errors
///
/// Returns `PomError::MissingField` if any of the three children is absent
/// or blank.
pub fn resolve_coordinate(
    doc: &XmlDocument,
    paths: &CoordinatePaths,
    document: &str,
) -> Result<Coordinate> {
    let lookup = FieldLookup {
        doc,
        paths,
        document,
    };
    Ok(Coordinate {
        group_id: lookup.required(GROUP_ID, &paths.group_id)?,
        artifact_id: lookup.required(ARTIFACT_ID, &paths.artifact_id)?,
        version: lookup.required(VERSION, &paths.version)?,
    })
}

/// Resolves the coordinate a module declares for itself.
///
/// Only `artifactId` is mandatory: `groupId` and `version` may be inherited
/// from a parent and are left `None` when not declared.
///
/// # Errors
///
/// Returns `PomError::MissingField` if `artifactId` is absent or blank.
pub fn resolve_declared(
    doc: &XmlDocument,
    paths: &CoordinatePaths,
    document: &str,
) -> Result<DeclaredCoordinate> {
    let lookup = FieldLookup {
        doc,
        paths,
        document,
    };
    Ok(DeclaredCoordinate {
        group_id: lookup.optional(&paths.group_id),
        artifact_id: lookup.required(ARTIFACT_ID, &paths.artifact_id)?,
        version: lookup.optional(&paths.version),
    })
}

struct FieldLookup<'a> {
    doc: &'a XmlDocument,
    paths: &'a CoordinatePaths,
    document: &'a str,
}

impl FieldLookup<'_> {
    fn optional(&self, path: &XmlPath) -> Option<String> {
        self.doc
            .select_text(path)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
    }

    fn required(&self, field: &'static str, path: &XmlPath) -> Result<String> {
        self.optional(path).ok_or_else(|| PomError::MissingField {
            field,
            path: self.paths.root.to_string(),
            document: self.document.to_string(),
        })
    }
}

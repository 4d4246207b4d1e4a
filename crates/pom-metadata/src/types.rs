//! Value types produced by extraction.

use crate::error::{PomError, Result};
use serde::Serialize;
use std::fmt;

/// A fully specified Maven GAV triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl Coordinate {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

/// The coordinate a module declares for itself.
///
/// `groupId` and `version` may be inherited from the parent, so they are
/// optional here; `artifactId` never is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclaredCoordinate {
    pub group_id: Option<String>,
    pub artifact_id: String,
    pub version: Option<String>,
}

/// One `<dependency>` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyRecord {
    /// Empty when the declaration has no `<groupId>`.
    pub group_id: String,
    /// Empty when the declaration has no `<artifactId>`.
    pub artifact_id: String,
    pub version: Option<String>,
    pub scope: Option<String>,
}

impl DependencyRecord {
    /// Canonical identifier: "{groupId}:{artifactId}"
    pub fn name(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }
}

/// Metadata extracted from a single pom.xml.
///
/// Built once by the extractor and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetadata {
    identity: DeclaredCoordinate,
    parent_identity: Option<Coordinate>,
    dependencies: Vec<DependencyRecord>,
    min_line_coverage: Option<f32>,
    min_branch_coverage: Option<f32>,
    analysis_exclude_pattern: Option<String>,
    allowed_dependency_coordinates: Vec<String>,
}

/// Field set handed to [`ProjectMetadata::new`] by the extractor.
pub(crate) struct MetadataParts {
    pub(crate) identity: DeclaredCoordinate,
    pub(crate) parent_identity: Option<Coordinate>,
    pub(crate) dependencies: Vec<DependencyRecord>,
    pub(crate) min_line_coverage: Option<f32>,
    pub(crate) min_branch_coverage: Option<f32>,
    pub(crate) analysis_exclude_pattern: Option<String>,
    pub(crate) allowed_dependency_coordinates: Vec<String>,
}

impl ProjectMetadata {
    pub(crate) fn new(parts: MetadataParts) -> Self {
        Self {
            identity: parts.identity,
            parent_identity: parts.parent_identity,
            dependencies: parts.dependencies,
            min_line_coverage: parts.min_line_coverage,
            min_branch_coverage: parts.min_branch_coverage,
            analysis_exclude_pattern: parts.analysis_exclude_pattern,
            allowed_dependency_coordinates: parts.allowed_dependency_coordinates,
        }
    }

    /// The coordinate exactly as declared under `<project>`.
    pub fn identity(&self) -> &DeclaredCoordinate {
        &self.identity
    }

    pub fn parent_identity(&self) -> Option<&Coordinate> {
        self.parent_identity.as_ref()
    }

    pub fn artifact_id(&self) -> &str {
        &self.identity.artifact_id
    }

    /// The module's groupId, falling back to the parent's.
    ///
    /// # Errors
    ///
    /// Returns `PomError::NoIdentityAvailable` if the module declares no
    /// groupId and has no parent.
    pub fn effective_group_id(&self) -> Result<&str> {
        self.identity
            .group_id
            .as_deref()
            .or_else(|| self.parent_identity.as_ref().map(|p| p.group_id.as_str()))
            .ok_or(PomError::NoIdentityAvailable { field: "groupId" })
    }

    /// The module's version, falling back to the parent's.
    ///
    /// # Errors
    ///
    /// Returns `PomError::NoIdentityAvailable` if the module declares no
    /// version and has no parent.
    pub fn effective_version(&self) -> Result<&str> {
        self.identity
            .version
            .as_deref()
            .or_else(|| self.parent_identity.as_ref().map(|p| p.version.as_str()))
            .ok_or(PomError::NoIdentityAvailable { field: "version" })
    }

    /// The full effective GAV of the module.
    ///
    /// # Errors
    ///
    /// Fails like [`effective_group_id`](Self::effective_group_id) and
    /// [`effective_version`](Self::effective_version).
    pub fn effective_coordinate(&self) -> Result<Coordinate> {
        Ok(Coordinate::new(
            self.effective_group_id()?,
            self.artifact_id(),
            self.effective_version()?,
        ))
    }

    /// Declared dependencies in document order.
    pub fn dependencies(&self) -> &[DependencyRecord] {
        &self.dependencies
    }

    pub fn min_line_coverage(&self) -> Option<f32> {
        self.min_line_coverage
    }

    pub fn min_branch_coverage(&self) -> Option<f32> {
        self.min_branch_coverage
    }

    /// Raw `<excludes>` text of the Checkstyle plugin, whitespace included.
    pub fn analysis_exclude_pattern(&self) -> Option<&str> {
        self.analysis_exclude_pattern.as_deref()
    }

    /// Trimmed `<include>` entries of the enforcer's banned-dependencies rule.
    pub fn allowed_dependency_coordinates(&self) -> &[String] {
        &self.allowed_dependency_coordinates
    }
}

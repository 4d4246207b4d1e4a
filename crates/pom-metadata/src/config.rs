//! Extractor configuration.
//!
//! Names the plugins and properties the extractor looks for. The defaults are
//! the standard Maven plugin artifactIds and JaCoCo property keys; a caller
//! can override them from JSON.

use crate::error::{PomError, Result};
use pom_xml::XmlPath;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ExtractorConfig {
    /// artifactId of the plugin whose `configuration/excludes` is read.
    pub checkstyle_plugin: String,
    /// artifactId of the plugin whose banned-dependency includes are read.
    pub enforcer_plugin: String,
    /// `<properties>` child holding the minimum line coverage.
    pub line_coverage_property: String,
    /// `<properties>` child holding the minimum branch coverage.
    pub branch_coverage_property: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            checkstyle_plugin: "maven-checkstyle-plugin".into(),
            enforcer_plugin: "maven-enforcer-plugin".into(),
            line_coverage_property: "jacoco.min.linecoverage".into(),
            branch_coverage_property: "jacoco.min.branchcoverage".into(),
        }
    }
}

impl ExtractorConfig {
    /// Parses a JSON object; omitted keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `PomError::Config` on malformed JSON, unknown keys, or values
    /// that fail [`validate`](Self::validate).
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| PomError::config("json", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns `PomError::Config` if the file cannot be read or parsed.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let origin = path.display().to_string();
        let json = std::fs::read_to_string(path).map_err(|e| PomError::config(&origin, e))?;
        let config: Self =
            serde_json::from_str(&json).map_err(|e| PomError::config(&origin, e))?;
        config.validate()?;
        tracing::debug!("loaded extractor configuration from {}: {:?}", origin, config);
        Ok(config)
    }

    /// Checks that every configured name is usable as a single path step.
    ///
    /// # Errors
    ///
    /// Returns `PomError::Config` naming the offending key.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("checkstylePlugin", &self.checkstyle_plugin),
            ("enforcerPlugin", &self.enforcer_plugin),
            ("lineCoverageProperty", &self.line_coverage_property),
            ("branchCoverageProperty", &self.branch_coverage_property),
        ];
        for (key, value) in fields {
            if value.trim().is_empty() {
                return Err(PomError::config(key, "value must not be empty"));
            }
        }
        // Property keys become element names in a path query
        for (key, value) in &fields[2..] {
            let path = XmlPath::parse(value).map_err(|e| PomError::config(*key, e))?;
            if path.len() != 1 {
                return Err(PomError::config(*key, "expected a single element name"));
            }
        }
        Ok(())
    }
}

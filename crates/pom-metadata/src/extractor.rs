//! Metadata extraction from a loaded pom.xml tree.
//!
//! Every field is read independently from the same tree. Absent optional
//! fields become `None` or an empty list; a missing module artifactId or an
//! unparseable coverage threshold aborts the whole extraction, so callers
//! never observe a partially populated [`ProjectMetadata`].

use crate::config::ExtractorConfig;
use crate::coordinate::{CoordinatePaths, resolve_coordinate, resolve_declared};
use crate::error::{PomError, Result};
use crate::types::{DependencyRecord, MetadataParts, ProjectMetadata};
use pom_xml::{Node, XmlDocument, XmlPath};
use std::io::Read;
use std::path::Path;

/// Name used in error messages when the caller does not name the document.
const UNNAMED_DOCUMENT: &str = "<pom.xml>";

/// Extracts metadata from `doc` using the default configuration.
///
/// # Errors
///
/// See [`Extractor::extract`].
pub fn extract(doc: &XmlDocument) -> Result<ProjectMetadata> {
    Extractor::new(ExtractorConfig::default())?.extract(doc, UNNAMED_DOCUMENT)
}

/// Path queries compiled once from an [`ExtractorConfig`].
#[derive(Debug)]
struct QueryPaths {
    project: CoordinatePaths,
    parent: CoordinatePaths,
    line_coverage: XmlPath,
    branch_coverage: XmlPath,
    plugins: XmlPath,
    dependencies: XmlPath,
    // Relative to a <plugin>
    artifact_id: XmlPath,
    excludes: XmlPath,
    includes: XmlPath,
    // Relative to a <dependency>
    group_id: XmlPath,
    version: XmlPath,
    scope: XmlPath,
}

impl QueryPaths {
    fn new(config: &ExtractorConfig) -> pom_xml::Result<Self> {
        let properties = XmlPath::parse("project/properties")?;
        Ok(Self {
            project: CoordinatePaths::new(XmlPath::parse("project")?)?,
            parent: CoordinatePaths::new(XmlPath::parse("project/parent")?)?,
            line_coverage: properties.child(&config.line_coverage_property)?,
            branch_coverage: properties.child(&config.branch_coverage_property)?,
            plugins: XmlPath::parse("project/build/plugins/plugin")?,
            dependencies: XmlPath::parse("project/dependencies/dependency")?,
            artifact_id: XmlPath::parse("artifactId")?,
            excludes: XmlPath::parse("configuration/excludes")?,
            includes: XmlPath::parse(
                "configuration/rules/bannedDependencies/includes/include",
            )?,
            group_id: XmlPath::parse("groupId")?,
            version: XmlPath::parse("version")?,
            scope: XmlPath::parse("scope")?,
        })
    }
}

/// Reusable, configured metadata extractor.
///
/// Holds no per-document state; one instance can serve any number of
/// documents, from any number of threads.
#[derive(Debug)]
pub struct Extractor {
    config: ExtractorConfig,
    paths: QueryPaths,
}

impl Extractor {
    /// # Errors
    ///
    /// Returns `PomError::Config` if the configuration does not validate.
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        config.validate()?;
        let paths = QueryPaths::new(&config).map_err(|e| PomError::config("query paths", e))?;
        Ok(Self { config, paths })
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extracts metadata from a parsed document.
    ///
    /// `document` names the input in error messages.
    ///
    /// # Errors
    ///
    /// - `PomError::MissingField` if the module's artifactId or any part of
    ///   a declared parent coordinate is missing
    /// - `PomError::NumericParse` if a coverage threshold is not a finite number
    pub fn extract(&self, doc: &XmlDocument, document: &str) -> Result<ProjectMetadata> {
        let identity = resolve_declared(doc, &self.paths.project, document)?;

        let parent_identity = if doc.exists(self.paths.parent.root()) {
            Some(resolve_coordinate(doc, &self.paths.parent, document)?)
        } else {
            None
        };

        let min_line_coverage = self.coverage(
            doc,
            &self.paths.line_coverage,
            &self.config.line_coverage_property,
            document,
        )?;
        let min_branch_coverage = self.coverage(
            doc,
            &self.paths.branch_coverage,
            &self.config.branch_coverage_property,
            document,
        )?;

        let analysis_exclude_pattern = self.analysis_excludes(doc);
        let dependencies = self.dependencies(doc);
        let allowed_dependency_coordinates = self.allowed_dependencies(doc);

        tracing::debug!(
            document,
            artifact_id = %identity.artifact_id,
            has_parent = parent_identity.is_some(),
            dependencies = dependencies.len(),
            allowed = allowed_dependency_coordinates.len(),
            "extracted POM metadata"
        );

        Ok(ProjectMetadata::new(MetadataParts {
            identity,
            parent_identity,
            dependencies,
            min_line_coverage,
            min_branch_coverage,
            analysis_exclude_pattern,
            allowed_dependency_coordinates,
        }))
    }

    /// Parses `bytes` and extracts metadata.
    ///
    /// # Errors
    ///
    /// Returns `PomError::DocumentLoad` if the bytes are not a well-formed XML
    /// document, otherwise fails like [`extract`](Self::extract).
    pub fn extract_slice(&self, bytes: &[u8], document: &str) -> Result<ProjectMetadata> {
        let doc = XmlDocument::parse(bytes).map_err(|e| PomError::load(document, e))?;
        self.extract(&doc, document)
    }

    /// Reads `reader` to the end, then behaves like
    /// [`extract_slice`](Self::extract_slice).
    ///
    /// # Errors
    ///
    /// Read failures are reported as `PomError::DocumentLoad`.
    pub fn extract_reader(&self, mut reader: impl Read, document: &str) -> Result<ProjectMetadata> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| PomError::load(document, e))?;
        self.extract_slice(&bytes, document)
    }

    /// Reads the file at `path` and extracts metadata from it.
    ///
    /// # Errors
    ///
    /// Read failures are reported as `PomError::DocumentLoad`.
    pub fn extract_path(&self, path: &Path) -> Result<ProjectMetadata> {
        let document = path.display().to_string();
        let bytes = std::fs::read(path).map_err(|e| PomError::load(&document, e))?;
        self.extract_slice(&bytes, &document)
    }

    fn coverage(
        &self,
        doc: &XmlDocument,
        path: &XmlPath,
        property: &str,
        document: &str,
    ) -> Result<Option<f32>> {
        let Some(value) = doc.select_text(path) else {
            return Ok(None);
        };
        parse_threshold(&value)
            .map(Some)
            .map_err(|source| PomError::NumericParse {
                property: property.to_string(),
                value,
                document: document.to_string(),
                source,
            })
    }

    /// First `<plugin>` whose `<artifactId>` is `artifact_id`.
    fn find_plugin<'d>(&self, doc: &'d XmlDocument, artifact_id: &str) -> Option<Node<'d>> {
        let mut matches = doc.select_nodes(&self.paths.plugins).into_iter().filter(|plugin| {
            plugin
                .select_text(&self.paths.artifact_id)
                .is_some_and(|text| text.trim() == artifact_id)
        });
        let first = matches.next();
        if first.is_some() && matches.next().is_some() {
            tracing::debug!("plugin '{}' declared more than once, using the first", artifact_id);
        }
        first
    }

    fn analysis_excludes(&self, doc: &XmlDocument) -> Option<String> {
        self.find_plugin(doc, &self.config.checkstyle_plugin)?
            .select_text(&self.paths.excludes)
    }

    fn dependencies(&self, doc: &XmlDocument) -> Vec<DependencyRecord> {
        doc.select_nodes(&self.paths.dependencies)
            .iter()
            .map(|dep| {
                let record = DependencyRecord {
                    group_id: child_value(dep, &self.paths.group_id).unwrap_or_default(),
                    artifact_id: child_value(dep, &self.paths.artifact_id).unwrap_or_default(),
                    version: child_value(dep, &self.paths.version),
                    scope: child_value(dep, &self.paths.scope),
                };
                if record.group_id.is_empty() || record.artifact_id.is_empty() {
                    tracing::warn!("dependency '{}' is missing groupId or artifactId", record.name());
                }
                record
            })
            .collect()
    }

    fn allowed_dependencies(&self, doc: &XmlDocument) -> Vec<String> {
        let Some(plugin) = self.find_plugin(doc, &self.config.enforcer_plugin) else {
            return Vec::new();
        };
        plugin
            .select_nodes(&self.paths.includes)
            .iter()
            .map(|include| include.text_content().trim().to_string())
            .collect()
    }
}

/// Parses a coverage threshold.
///
/// Surrounding whitespace and a trailing `f`/`d` type suffix are accepted, as
/// Maven writes them. Infinities and NaN are rejected.
fn parse_threshold(text: &str) -> std::result::Result<f32, Box<dyn std::error::Error + Send + Sync>> {
    let text = text.trim();
    let digits = text.strip_suffix(['f', 'F', 'd', 'D']).unwrap_or(text);
    let value = digits.parse::<f32>()?;
    if !value.is_finite() {
        return Err("threshold must be a finite number".into());
    }
    Ok(value)
}

/// Trimmed text of a child element; blank counts as absent.
fn child_value(node: &Node<'_>, path: &XmlPath) -> Option<String> {
    node.select_text(path)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

impl ProjectMetadata {
    /// Parses and extracts with the default configuration.
    ///
    /// # Errors
    ///
    /// See [`Extractor::extract_slice`].
    pub fn from_slice(bytes: &[u8], document: &str) -> Result<Self> {
        Extractor::new(ExtractorConfig::default())?.extract_slice(bytes, document)
    }

    /// Reads and extracts with the default configuration.
    ///
    /// # Errors
    ///
    /// See [`Extractor::extract_reader`].
    pub fn from_reader(reader: impl Read, document: &str) -> Result<Self> {
        Extractor::new(ExtractorConfig::default())?.extract_reader(reader, document)
    }

    /// Loads a pom.xml from disk with the default configuration.
    ///
    /// # Errors
    ///
    /// See [`Extractor::extract_path`].
    pub fn from_path(path: &Path) -> Result<Self> {
        Extractor::new(ExtractorConfig::default())?.extract_path(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract_str(xml: &str) -> Result<ProjectMetadata> {
        ProjectMetadata::from_slice(xml.as_bytes(), "pom.xml")
    }

    const GAV: &str = "<groupId>com.example</groupId><artifactId>lib</artifactId><version>1.0.0</version>";

    fn project(body: &str) -> String {
        format!("<project>{GAV}{body}</project>")
    }

    #[test]
    fn test_explicit_identity_without_parent() {
        let meta = extract_str(&project("")).unwrap();
        assert_eq!(meta.effective_group_id().unwrap(), "com.example");
        assert_eq!(meta.artifact_id(), "lib");
        assert_eq!(meta.effective_version().unwrap(), "1.0.0");
        assert!(meta.parent_identity().is_none());
    }

    #[test]
    fn test_identity_inherited_from_parent() {
        let meta = extract_str(
            r"<project>
  <parent>
    <groupId>G</groupId>
    <artifactId>parent</artifactId>
    <version>V</version>
  </parent>
  <artifactId>child</artifactId>
</project>",
        )
        .unwrap();
        assert_eq!(meta.effective_group_id().unwrap(), "G");
        assert_eq!(meta.effective_version().unwrap(), "V");
        assert_eq!(meta.artifact_id(), "child");
        assert_eq!(meta.parent_identity().unwrap().artifact_id, "parent");
    }

    #[test]
    fn test_missing_artifact_id_is_fatal() {
        let result = extract_str("<project><groupId>g</groupId><version>1</version></project>");
        assert!(matches!(
            result,
            Err(PomError::MissingField { field: "artifactId", .. })
        ));
    }

    #[test]
    fn test_incomplete_parent_is_fatal() {
        let result = extract_str(&project("<parent><groupId>g</groupId></parent>"));
        assert!(matches!(result, Err(PomError::MissingField { .. })));
    }

    #[test]
    fn test_no_group_anywhere() {
        let meta = extract_str("<project><artifactId>solo</artifactId></project>").unwrap();
        assert!(matches!(
            meta.effective_group_id(),
            Err(PomError::NoIdentityAvailable { .. })
        ));
    }

    #[test]
    fn test_dependencies_in_document_order() {
        let meta = extract_str(&project(
            r"<dependencies>
  <dependency><groupId>z</groupId><artifactId>last-alpha</artifactId><version>1</version></dependency>
  <dependency><groupId>a</groupId><artifactId>first-alpha</artifactId><scope>test</scope></dependency>
  <dependency><groupId>m</groupId><artifactId>middle</artifactId><version>2</version><scope>provided</scope></dependency>
</dependencies>",
        ))
        .unwrap();

        let names: Vec<_> = meta.dependencies().iter().map(DependencyRecord::name).collect();
        assert_eq!(names, vec!["z:last-alpha", "a:first-alpha", "m:middle"]);

        let first = &meta.dependencies()[0];
        assert_eq!(first.version.as_deref(), Some("1"));
        assert!(first.scope.is_none());

        let second = &meta.dependencies()[1];
        assert!(second.version.is_none());
        assert_eq!(second.scope.as_deref(), Some("test"));
    }

    #[test]
    fn test_dependency_missing_coordinates_is_lenient() {
        let meta = extract_str(&project(
            "<dependencies><dependency><version>1</version></dependency></dependencies>",
        ))
        .unwrap();
        let dep = &meta.dependencies()[0];
        assert_eq!(dep.group_id, "");
        assert_eq!(dep.artifact_id, "");
        assert_eq!(dep.version.as_deref(), Some("1"));
    }

    #[test]
    fn test_dependency_management_ignored() {
        let meta = extract_str(&project(
            "<dependencyManagement><dependencies><dependency><groupId>bom</groupId><artifactId>bom</artifactId></dependency></dependencies></dependencyManagement>",
        ))
        .unwrap();
        assert!(meta.dependencies().is_empty());
    }

    #[test]
    fn test_coverage_absent() {
        let meta = extract_str(&project("<properties><java.version>17</java.version></properties>"))
            .unwrap();
        assert!(meta.min_line_coverage().is_none());
        assert!(meta.min_branch_coverage().is_none());
    }

    #[test]
    fn test_coverage_present() {
        let meta = extract_str(&project(
            "<properties><jacoco.min.linecoverage> 0.75 </jacoco.min.linecoverage><jacoco.min.branchcoverage>0.5</jacoco.min.branchcoverage></properties>",
        ))
        .unwrap();
        assert_eq!(meta.min_line_coverage(), Some(0.75));
        assert_eq!(meta.min_branch_coverage(), Some(0.5));
    }

    #[test]
    fn test_coverage_malformed() {
        let result = extract_str(&project(
            "<properties><jacoco.min.linecoverage>abc</jacoco.min.linecoverage></properties>",
        ));
        match result {
            Err(PomError::NumericParse {
                property,
                value,
                document,
                ..
            }) => {
                assert_eq!(property, "jacoco.min.linecoverage");
                assert_eq!(value, "abc");
                assert_eq!(document, "pom.xml");
            }
            other => panic!("expected NumericParse, got {other:?}"),
        }
    }

    #[test]
    fn test_coverage_rejects_non_finite() {
        for raw in ["inf", "infinity", "-Infinity", "NaN"] {
            let result = extract_str(&project(&format!(
                "<properties><jacoco.min.linecoverage>{raw}</jacoco.min.linecoverage></properties>"
            )));
            assert!(
                matches!(result, Err(PomError::NumericParse { ref value, .. }) if value == raw),
                "expected '{raw}' to be rejected"
            );
        }
    }

    #[test]
    fn test_coverage_type_suffix() {
        let meta = extract_str(&project(
            "<properties><jacoco.min.linecoverage>0.5f</jacoco.min.linecoverage><jacoco.min.branchcoverage> 0.25D </jacoco.min.branchcoverage></properties>",
        ))
        .unwrap();
        assert_eq!(meta.min_line_coverage(), Some(0.5));
        assert_eq!(meta.min_branch_coverage(), Some(0.25));
    }

    #[test]
    fn test_parse_threshold() {
        assert_eq!(parse_threshold("1").unwrap(), 1.0);
        assert_eq!(parse_threshold("\t.8\n").unwrap(), 0.8);
        assert!(parse_threshold("f").is_err());
        assert!(parse_threshold("0.5ff").is_err());
        assert!(parse_threshold("NaNf").is_err());
    }

    #[test]
    fn test_coverage_empty_value_is_error() {
        let result = extract_str(&project(
            "<properties><jacoco.min.branchcoverage/></properties>",
        ));
        assert!(matches!(result, Err(PomError::NumericParse { .. })));
    }

    #[test]
    fn test_excludes_absent() {
        let meta = extract_str(&project(
            "<build><plugins><plugin><artifactId>maven-compiler-plugin</artifactId></plugin></plugins></build>",
        ))
        .unwrap();
        assert!(meta.analysis_exclude_pattern().is_none());
    }

    #[test]
    fn test_excludes_verbatim() {
        let meta = extract_str(&project(
            r"<build><plugins>
  <plugin><artifactId>maven-compiler-plugin</artifactId><configuration><excludes>wrong</excludes></configuration></plugin>
  <plugin>
    <groupId>org.apache.maven.plugins</groupId>
    <artifactId>maven-checkstyle-plugin</artifactId>
    <configuration><excludes> **/generated/** </excludes></configuration>
  </plugin>
</plugins></build>",
        ))
        .unwrap();
        assert_eq!(meta.analysis_exclude_pattern(), Some(" **/generated/** "));
    }

    #[test]
    fn test_excludes_plugin_without_configuration() {
        let meta = extract_str(&project(
            "<build><plugins><plugin><artifactId>maven-checkstyle-plugin</artifactId></plugin></plugins></build>",
        ))
        .unwrap();
        assert!(meta.analysis_exclude_pattern().is_none());
    }

    #[test]
    fn test_first_matching_plugin_wins() {
        let meta = extract_str(&project(
            r"<build><plugins>
  <plugin><artifactId>maven-checkstyle-plugin</artifactId><configuration><excludes>first</excludes></configuration></plugin>
  <plugin><artifactId>maven-checkstyle-plugin</artifactId><configuration><excludes>second</excludes></configuration></plugin>
</plugins></build>",
        ))
        .unwrap();
        assert_eq!(meta.analysis_exclude_pattern(), Some("first"));
    }

    #[test]
    fn test_allow_list_absent_is_empty() {
        let meta = extract_str(&project("")).unwrap();
        assert!(meta.allowed_dependency_coordinates().is_empty());
    }

    #[test]
    fn test_allow_list_trimmed() {
        let meta = extract_str(&project(
            r"<build><plugins>
  <plugin>
    <groupId>org.apache.maven.plugins</groupId>
    <artifactId>maven-enforcer-plugin</artifactId>
    <configuration>
      <rules>
        <bannedDependencies>
          <includes>
            <include>  com.azure:azure-core:[1.45.0] </include>
            <include>
              io.netty:netty-handler:[4.1.100.Final]
            </include>
            <include>com.fasterxml.jackson.core:jackson-databind:[2.13.5]</include>
          </includes>
        </bannedDependencies>
      </rules>
    </configuration>
  </plugin>
</plugins></build>",
        ))
        .unwrap();
        assert_eq!(
            meta.allowed_dependency_coordinates(),
            [
                "com.azure:azure-core:[1.45.0]",
                "io.netty:netty-handler:[4.1.100.Final]",
                "com.fasterxml.jackson.core:jackson-databind:[2.13.5]",
            ]
        );
    }

    #[test]
    fn test_allow_list_plugin_without_rules() {
        let meta = extract_str(&project(
            "<build><plugins><plugin><artifactId>maven-enforcer-plugin</artifactId><configuration/></plugin></plugins></build>",
        ))
        .unwrap();
        assert!(meta.allowed_dependency_coordinates().is_empty());
    }

    #[test]
    fn test_malformed_xml_is_load_error() {
        let result = extract_str("<project><artifactId>broken</project>");
        assert!(matches!(result, Err(PomError::DocumentLoad { .. })));

        let result = extract_str("not xml at all");
        assert!(matches!(result, Err(PomError::DocumentLoad { .. })));
    }

    #[test]
    fn test_malformed_attributes_are_load_errors() {
        for xml in [
            "<project><artifactId a=b>lib</artifactId></project>",
            r#"<project a="1" a="2"><artifactId>lib</artifactId></project>"#,
            "<project foo><artifactId>lib</artifactId></project>",
            "<project><artifactId>lib</artifactId><1abc>z</1abc></project>",
        ] {
            assert!(
                matches!(extract_str(xml), Err(PomError::DocumentLoad { .. })),
                "expected load error for {xml}"
            );
        }
    }

    #[test]
    fn test_reader_failure_is_load_error() {
        struct FailingReader;
        impl Read for FailingReader {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("stream closed"))
            }
        }
        let result = ProjectMetadata::from_reader(FailingReader, "stream");
        assert!(matches!(result, Err(PomError::DocumentLoad { .. })));
    }

    #[test]
    fn test_custom_config() {
        let config = ExtractorConfig {
            checkstyle_plugin: "custom-checkstyle".into(),
            line_coverage_property: "coverage.lines".into(),
            ..ExtractorConfig::default()
        };
        let extractor = Extractor::new(config).unwrap();
        let xml = project(
            "<properties><coverage.lines>0.25</coverage.lines></properties><build><plugins><plugin><artifactId>custom-checkstyle</artifactId><configuration><excludes>x</excludes></configuration></plugin></plugins></build>",
        );
        let meta = extractor.extract_slice(xml.as_bytes(), "custom.xml").unwrap();
        assert_eq!(meta.min_line_coverage(), Some(0.25));
        assert_eq!(meta.analysis_exclude_pattern(), Some("x"));
    }

    #[test]
    fn test_extract_from_tree() {
        let doc = XmlDocument::parse_str(&project("")).unwrap();
        let meta = extract(&doc).unwrap();
        assert_eq!(meta.artifact_id(), "lib");
    }

    #[test]
    fn test_extract_error_names_default_document() {
        let doc = XmlDocument::parse_str("<project/>").unwrap();
        let err = extract(&doc).unwrap_err();
        assert_eq!(err.document(), Some(UNNAMED_DOCUMENT));
    }
}

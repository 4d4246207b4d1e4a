//! Project metadata extraction from Maven pom.xml documents.
//!
//! Reads a POM once into an element tree and pulls out the fields an API
//! review needs: the module and parent coordinates, declared dependencies,
//! JaCoCo coverage thresholds, Checkstyle excludes, and the enforcer plugin's
//! banned-dependency allow-list.
//!
//! ```
//! use pom_metadata::ProjectMetadata;
//!
//! let pom = r#"<project>
//!   <parent>
//!     <groupId>com.example</groupId>
//!     <artifactId>parent</artifactId>
//!     <version>1.0.0</version>
//!   </parent>
//!   <artifactId>child</artifactId>
//! </project>"#;
//!
//! let metadata = ProjectMetadata::from_slice(pom.as_bytes(), "pom.xml").unwrap();
//! assert_eq!(metadata.artifact_id(), "child");
//! assert_eq!(metadata.effective_group_id().unwrap(), "com.example");
//! ```

pub mod config;
pub mod coordinate;
pub mod error;
pub mod extractor;
pub mod types;

pub use config::ExtractorConfig;
pub use coordinate::{CoordinatePaths, resolve_coordinate, resolve_declared};
pub use error::{PomError, Result};
pub use extractor::{Extractor, extract};
pub use types::{Coordinate, DeclaredCoordinate, DependencyRecord, ProjectMetadata};

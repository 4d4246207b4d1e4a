//! Slash-separated child-axis path expressions.
//!
//! Supports the subset of XPath that manifest extraction needs: a sequence of
//! element names, each step selecting child elements by local name.
//! Predicates, wildcards, attributes and the descendant axis are not supported.

use crate::error::{Result, XmlError};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct XmlPath {
    steps: Vec<String>,
}

impl XmlPath {
    /// Parses `project/build/plugins`. A single leading `/` is accepted.
    ///
    /// # Errors
    ///
    /// Returns `XmlError::InvalidPath` for empty expressions, empty steps
    /// (`a//b`), and steps using unsupported syntax (`*`, `@`, `[`, `..`).
    pub fn parse(expression: &str) -> Result<Self> {
        let trimmed = expression.trim();
        let body = trimmed.strip_prefix('/').unwrap_or(trimmed);
        if body.is_empty() {
            return Err(invalid(expression, "empty expression"));
        }

        let steps = body
            .split('/')
            .map(|step| validate_step(expression, step).map(str::to_owned))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { steps })
    }

    pub fn steps(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Appends `other`'s steps to this path.
    pub fn join(&self, other: &XmlPath) -> XmlPath {
        let mut steps = self.steps.clone();
        steps.extend(other.steps.iter().cloned());
        XmlPath { steps }
    }

    /// Appends a single step.
    ///
    /// # Errors
    ///
    /// Returns `XmlError::InvalidPath` if `name` is not a valid step.
    pub fn child(&self, name: &str) -> Result<XmlPath> {
        let step = validate_step(name, name)?;
        let mut steps = self.steps.clone();
        steps.push(step.to_owned());
        Ok(XmlPath { steps })
    }
}

fn validate_step<'s>(expression: &str, step: &'s str) -> Result<&'s str> {
    if step.is_empty() {
        return Err(invalid(expression, "empty step"));
    }
    if step == "." || step == ".." {
        return Err(invalid(expression, "relative steps are not supported"));
    }
    if let Some(c) = step
        .chars()
        .find(|c| c.is_whitespace() || matches!(c, '*' | '@' | '[' | ']' | '(' | ')' | '/'))
    {
        return Err(invalid(
            expression,
            &format!("unsupported character '{c}' in step '{step}'"),
        ));
    }
    Ok(step)
}

fn invalid(expression: &str, reason: &str) -> XmlError {
    XmlError::InvalidPath {
        path: expression.to_string(),
        reason: reason.to_string(),
    }
}

impl FromStr for XmlPath {
    type Err = XmlError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for XmlPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.steps.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_steps() {
        let path = XmlPath::parse("project/build/plugins/plugin").unwrap();
        let steps: Vec<_> = path.steps().collect();
        assert_eq!(steps, vec!["project", "build", "plugins", "plugin"]);
        assert_eq!(path.len(), 4);
        assert!(!path.is_empty());
    }

    #[test]
    fn test_leading_slash() {
        let absolute = XmlPath::parse("/project/parent").unwrap();
        let relative = XmlPath::parse("project/parent").unwrap();
        assert_eq!(absolute, relative);
        assert_eq!(absolute.to_string(), "project/parent");
    }

    #[test]
    fn test_dotted_names() {
        let path: XmlPath = "project/properties/jacoco.min.linecoverage".parse().unwrap();
        assert_eq!(path.steps().last(), Some("jacoco.min.linecoverage"));
    }

    #[test]
    fn test_invalid_paths() {
        for expr in ["", "/", "a//b", "a/", "a/*", "a/@id", "a/b[1]", "a/../b", "a/b c"] {
            assert!(
                matches!(XmlPath::parse(expr), Err(XmlError::InvalidPath { .. })),
                "expected '{expr}' to be rejected"
            );
        }
    }

    #[test]
    fn test_join_and_child() {
        let root = XmlPath::parse("project/parent").unwrap();
        let joined = root.join(&XmlPath::parse("groupId").unwrap());
        assert_eq!(joined.to_string(), "project/parent/groupId");

        let child = root.child("version").unwrap();
        assert_eq!(child.to_string(), "project/parent/version");
        assert!(root.child("a/b").is_err());
        assert!(root.child("").is_err());
    }
}

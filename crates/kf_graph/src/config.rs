//! Annotation-tool configuration.
//!
//! Extracting a pairing list from 3D coordinates is an external
//! collaborator that shells out to an annotation tool. Which tool it
//! invokes is explicit configuration handed to the pipeline boundary,
//! never process-wide state. Configuration files are JSON and merge in
//! priority order, so a user-level file can override a site-level one.

use std::io::Read;

use serde::Deserialize;
use serde::Serialize;

/// Supported PDB annotation tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AnnotationTool {
    #[serde(rename = "MC-Annotate")]
    #[default]
    McAnnotate,
    #[serde(rename = "DSSR")]
    Dssr,
    #[serde(rename = "builtin")]
    Builtin,
}

/// Pipeline-boundary configuration for the external annotation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AnnotationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdb_annotation_tool: Option<AnnotationTool>,
}

impl AnnotationConfig {
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(reader)
    }

    /// Overlay a higher-priority layer; its set fields win.
    pub fn merge(mut self, higher: AnnotationConfig) -> Self {
        if higher.pdb_annotation_tool.is_some() {
            self.pdb_annotation_tool = higher.pdb_annotation_tool;
        }
        self
    }

    /// The tool to invoke, falling back to the default.
    pub fn tool(&self) -> AnnotationTool {
        self.pdb_annotation_tool.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode() {
        let config = AnnotationConfig::from_json_str(r#"{"pdb_annotation_tool": "DSSR"}"#).unwrap();
        assert_eq!(config.tool(), AnnotationTool::Dssr);
    }

    #[test]
    fn test_empty_defaults() {
        let config = AnnotationConfig::from_json_str("{}").unwrap();
        assert_eq!(config.pdb_annotation_tool, None);
        assert_eq!(config.tool(), AnnotationTool::McAnnotate);
    }

    #[test]
    fn test_unknown_tool_rejected() {
        assert!(AnnotationConfig::from_json_str(r#"{"pdb_annotation_tool": "x3dna"}"#).is_err());
    }

    #[test]
    fn test_merge_priority() {
        let site = AnnotationConfig {
            pdb_annotation_tool: Some(AnnotationTool::McAnnotate),
        };
        let user = AnnotationConfig {
            pdb_annotation_tool: Some(AnnotationTool::Builtin),
        };
        assert_eq!(
            site.clone().merge(user).tool(),
            AnnotationTool::Builtin
        );
        assert_eq!(
            site.merge(AnnotationConfig::default()).tool(),
            AnnotationTool::McAnnotate
        );
    }

    #[test]
    fn test_serialize_uses_tool_names() {
        let config = AnnotationConfig {
            pdb_annotation_tool: Some(AnnotationTool::Dssr),
        };
        assert_eq!(
            serde_json::to_string(&config).unwrap(),
            r#"{"pdb_annotation_tool":"DSSR"}"#
        );
    }
}

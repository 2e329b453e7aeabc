use crate::domain::{Component, Sbom};
use serde::Deserialize;
use std::io::Read;
use thiserror::Error;
use uuid::Uuid;

/// Errors produced while ingesting a CycloneDX document.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to decode CycloneDX JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid BOM format: expected 'CycloneDX', got '{found}'")]
    InvalidFormat { found: String },
}

/// Parser for CycloneDX JSON documents (spec version 1.4 and later).
///
/// Only the fields the analysis engine consumes are modelled; unknown
/// fields in the source document are ignored, which keeps the parser
/// forward-compatible with newer spec versions.
#[derive(Debug, Default)]
pub struct CycloneDxParser;

#[derive(Debug, Deserialize)]
struct CycloneDxDocument {
    #[serde(rename = "bomFormat", default)]
    bom_format: String,
    #[serde(rename = "specVersion", default)]
    spec_version: String,
    #[serde(rename = "serialNumber", default)]
    serial_number: String,
    #[serde(default)]
    metadata: Option<CycloneDxMetadata>,
    #[serde(default)]
    components: Vec<CycloneDxComponent>,
    #[serde(default)]
    properties: Vec<CycloneDxProperty>,
}

#[derive(Debug, Deserialize)]
struct CycloneDxMetadata {
    #[serde(default)]
    timestamp: String,
    #[serde(default)]
    component: Option<CycloneDxComponent>,
}

#[derive(Debug, Deserialize)]
struct CycloneDxComponent {
    #[serde(default)]
    name: String,
    #[serde(default)]
    version: String,
    #[serde(default)]
    purl: String,
    #[serde(default)]
    licenses: Vec<CycloneDxLicenseEntry>,
}

#[derive(Debug, Deserialize)]
struct CycloneDxLicenseEntry {
    #[serde(default)]
    license: Option<CycloneDxLicenseChoice>,
}

#[derive(Debug, Deserialize)]
struct CycloneDxLicenseChoice {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct CycloneDxProperty {
    name: String,
    #[serde(default)]
    value: String,
}

impl CycloneDxParser {
    pub fn new() -> Self {
        Self
    }

    /// Reads a CycloneDX JSON document and converts it to the domain model.
    ///
    /// Documents whose `bomFormat` is not exactly `"CycloneDX"` are
    /// rejected. No schema-version check is performed beyond that.
    pub fn parse<R: Read>(&self, reader: R) -> Result<Sbom, ParseError> {
        let doc: CycloneDxDocument = serde_json::from_reader(reader)?;

        if doc.bom_format != "CycloneDX" {
            return Err(ParseError::InvalidFormat {
                found: doc.bom_format,
            });
        }

        let id = if doc.serial_number.is_empty() {
            format!("urn:uuid:{}", Uuid::new_v4())
        } else {
            doc.serial_number
        };

        let name = doc
            .metadata
            .as_ref()
            .and_then(|m| m.component.as_ref())
            .map(|c| c.name.clone())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Unnamed SBOM".to_string());

        let mut sbom = Sbom::new(id, name);

        sbom.metadata
            .insert("bomFormat".to_string(), "CycloneDX".to_string());
        sbom.metadata
            .insert("specVersion".to_string(), doc.spec_version);
        if let Some(metadata) = &doc.metadata {
            if !metadata.timestamp.is_empty() {
                sbom.metadata
                    .insert("timestamp".to_string(), metadata.timestamp.clone());
            }
        }
        for property in doc.properties {
            sbom.metadata.insert(property.name, property.value);
        }

        sbom.components = doc
            .components
            .into_iter()
            .map(|component| {
                let license = component
                    .licenses
                    .first()
                    .and_then(|entry| entry.license.as_ref())
                    .map(|choice| {
                        if !choice.id.is_empty() {
                            choice.id.clone()
                        } else {
                            choice.name.clone()
                        }
                    })
                    .unwrap_or_default();

                Component {
                    name: component.name,
                    version: component.version,
                    purl: component.purl,
                    license,
                }
            })
            .collect();

        Ok(sbom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<Sbom, ParseError> {
        CycloneDxParser::new().parse(json.as_bytes())
    }

    #[test]
    fn test_parse_minimal_document() {
        let sbom = parse(
            r#"{
                "bomFormat": "CycloneDX",
                "specVersion": "1.5",
                "serialNumber": "urn:uuid:3e671687-395b-41f5-a30f-a58921a69b79",
                "components": []
            }"#,
        )
        .unwrap();

        assert_eq!(sbom.id, "urn:uuid:3e671687-395b-41f5-a30f-a58921a69b79");
        assert_eq!(sbom.name, "Unnamed SBOM");
        assert!(sbom.components.is_empty());
        assert_eq!(sbom.metadata.get("bomFormat").unwrap(), "CycloneDX");
        assert_eq!(sbom.metadata.get("specVersion").unwrap(), "1.5");
    }

    #[test]
    fn test_parse_rejects_non_cyclonedx_format() {
        let err = parse(r#"{"bomFormat": "SPDX", "specVersion": "2.3"}"#).unwrap_err();
        match err {
            ParseError::InvalidFormat { found } => assert_eq!(found, "SPDX"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_rejects_missing_bom_format() {
        let err = parse(r#"{"specVersion": "1.4"}"#).unwrap_err();
        assert!(matches!(err, ParseError::InvalidFormat { .. }));
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        let err = parse("{not json").unwrap_err();
        assert!(matches!(err, ParseError::Json(_)));
    }

    #[test]
    fn test_parse_generates_id_when_serial_number_missing() {
        let sbom = parse(r#"{"bomFormat": "CycloneDX", "specVersion": "1.4"}"#).unwrap();
        assert!(sbom.id.starts_with("urn:uuid:"));
        assert!(Uuid::parse_str(sbom.id.trim_start_matches("urn:uuid:")).is_ok());
    }

    #[test]
    fn test_parse_takes_name_from_metadata_component() {
        let sbom = parse(
            r#"{
                "bomFormat": "CycloneDX",
                "specVersion": "1.5",
                "metadata": {
                    "timestamp": "2024-06-01T12:00:00Z",
                    "component": {"name": "acme-app", "version": "1.0.0"}
                }
            }"#,
        )
        .unwrap();

        assert_eq!(sbom.name, "acme-app");
        assert_eq!(sbom.metadata.get("timestamp").unwrap(), "2024-06-01T12:00:00Z");
    }

    #[test]
    fn test_parse_carries_top_level_properties_verbatim() {
        let sbom = parse(
            r#"{
                "bomFormat": "CycloneDX",
                "specVersion": "1.5",
                "properties": [
                    {"name": "build-id", "value": "ci-4711"},
                    {"name": "team", "value": "platform"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(sbom.metadata.get("build-id").unwrap(), "ci-4711");
        assert_eq!(sbom.metadata.get("team").unwrap(), "platform");
    }

    #[test]
    fn test_parse_component_fields_verbatim() {
        let sbom = parse(
            r#"{
                "bomFormat": "CycloneDX",
                "specVersion": "1.5",
                "components": [
                    {
                        "type": "library",
                        "name": "express",
                        "version": "4.18.2",
                        "purl": "pkg:npm/express@4.18.2",
                        "licenses": [{"license": {"id": "MIT"}}]
                    },
                    {
                        "type": "library",
                        "name": "mystery-lib"
                    }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(sbom.components.len(), 2);
        let express = &sbom.components[0];
        assert_eq!(express.name, "express");
        assert_eq!(express.version, "4.18.2");
        assert_eq!(express.purl, "pkg:npm/express@4.18.2");
        assert_eq!(express.license, "MIT");

        let mystery = &sbom.components[1];
        assert_eq!(mystery.version, "");
        assert_eq!(mystery.purl, "");
        assert_eq!(mystery.license, "");
    }

    #[test]
    fn test_parse_license_falls_back_to_name() {
        let sbom = parse(
            r#"{
                "bomFormat": "CycloneDX",
                "specVersion": "1.5",
                "components": [
                    {"name": "legacy", "version": "0.1.0",
                     "licenses": [{"license": {"name": "Custom Corp License"}}]}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(sbom.components[0].license, "Custom Corp License");
    }

    #[test]
    fn test_parse_preserves_component_order() {
        let sbom = parse(
            r#"{
                "bomFormat": "CycloneDX",
                "specVersion": "1.5",
                "components": [
                    {"name": "zulu", "version": "1.0.0"},
                    {"name": "alpha", "version": "2.0.0"},
                    {"name": "mike", "version": "3.0.0"}
                ]
            }"#,
        )
        .unwrap();

        let names: Vec<&str> = sbom.components.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["zulu", "alpha", "mike"]);
    }
}

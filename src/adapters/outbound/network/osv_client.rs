use crate::adapters::outbound::network::map_transport_error;
use crate::ports::outbound::{UpstreamError, VulnerabilityDatabase, VulnerabilityRecord};
use crate::shared::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// OSV API client for fetching vulnerability data.
///
/// Issues one query per package version against the OSV.dev Query API.
/// Fails fast: no retries, 10 second timeout per request.
pub struct OsvClient {
    client: reqwest::Client,
    api_url: String,
}

impl OsvClient {
    const TIMEOUT_SECONDS: u64 = 10;

    pub fn new(api_url: impl Into<String>) -> Result<Self> {
        let version = env!("CARGO_PKG_VERSION");
        let user_agent = format!("sbom-sentinel/{}", version);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(Self::TIMEOUT_SECONDS))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.into(),
        })
    }
}

// OSV API request/response structures

#[derive(Debug, Serialize)]
struct OsvQuery<'a> {
    version: &'a str,
    package: OsvPackage<'a>,
}

#[derive(Debug, Serialize)]
struct OsvPackage<'a> {
    name: &'a str,
    ecosystem: &'a str,
}

#[derive(Debug, Deserialize)]
struct OsvQueryResponse {
    #[serde(default)]
    vulns: Vec<OsvVulnerability>,
}

#[derive(Debug, Deserialize)]
struct OsvVulnerability {
    id: String,
    #[serde(default)]
    aliases: Vec<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    severity: Vec<OsvSeverity>,
}

#[derive(Debug, Deserialize)]
struct OsvSeverity {
    #[serde(rename = "type")]
    #[allow(dead_code)]
    severity_type: String, // "CVSS_V3"
    score: String, // e.g. "CVSS:3.1/AV:N/AC:L/..."
}

impl From<OsvVulnerability> for VulnerabilityRecord {
    fn from(vuln: OsvVulnerability) -> Self {
        VulnerabilityRecord {
            id: vuln.id,
            aliases: vuln.aliases,
            summary: vuln.summary,
            cvss_vectors: vuln.severity.into_iter().map(|s| s.score).collect(),
        }
    }
}

#[async_trait]
impl VulnerabilityDatabase for OsvClient {
    async fn query(
        &self,
        cancel: &CancellationToken,
        ecosystem: &str,
        name: &str,
        version: &str,
    ) -> std::result::Result<Vec<VulnerabilityRecord>, UpstreamError> {
        let query = OsvQuery {
            version,
            package: OsvPackage { name, ecosystem },
        };

        let send = self.client.post(&self.api_url).json(&query).send();
        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(UpstreamError::Cancelled),
            result = send => result.map_err(map_transport_error)?,
        };

        if !response.status().is_success() {
            return Err(UpstreamError::Status(response.status().as_u16()));
        }

        let body: OsvQueryResponse = tokio::select! {
            _ = cancel.cancelled() => return Err(UpstreamError::Cancelled),
            result = response.json() => result.map_err(map_transport_error)?,
        };

        Ok(body.vulns.into_iter().map(VulnerabilityRecord::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_osv_client_creation() {
        let client = OsvClient::new("https://api.osv.dev/v1/query");
        assert!(client.is_ok());
    }

    #[test]
    fn test_query_serialization() {
        let query = OsvQuery {
            version: "4.17.15",
            package: OsvPackage {
                name: "lodash",
                ecosystem: "npm",
            },
        };

        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json["version"], "4.17.15");
        assert_eq!(json["package"]["name"], "lodash");
        assert_eq!(json["package"]["ecosystem"], "npm");
    }

    #[test]
    fn test_response_deserialization_empty() {
        let body: OsvQueryResponse = serde_json::from_str("{}").unwrap();
        assert!(body.vulns.is_empty());

        let body: OsvQueryResponse = serde_json::from_str(r#"{"vulns":[]}"#).unwrap();
        assert!(body.vulns.is_empty());
    }

    #[test]
    fn test_response_deserialization_with_vulns() {
        let body: OsvQueryResponse = serde_json::from_str(
            r#"{
                "vulns": [
                    {
                        "id": "GHSA-p6mc-m468-83gw",
                        "aliases": ["CVE-2020-8203"],
                        "summary": "Prototype pollution in lodash",
                        "severity": [
                            {"type": "CVSS_V3",
                             "score": "CVSS:3.1/AV:N/AC:H/PR:N/UI:N/S:U/C:N/I:H/A:H"}
                        ]
                    },
                    {
                        "id": "GHSA-x5rq-j2xg-h7qm"
                    }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(body.vulns.len(), 2);

        let record = VulnerabilityRecord::from(body.vulns.into_iter().next().unwrap());
        assert_eq!(record.id, "GHSA-p6mc-m468-83gw");
        assert_eq!(record.aliases, vec!["CVE-2020-8203"]);
        assert_eq!(record.summary.as_deref(), Some("Prototype pollution in lodash"));
        assert_eq!(
            record.cvss_vectors,
            vec!["CVSS:3.1/AV:N/AC:H/PR:N/UI:N/S:U/C:N/I:H/A:H"]
        );
    }

    // Integration test - requires network access
    // Uncomment to run against the real OSV API
    // #[tokio::test]
    // async fn test_query_real() {
    //     let client = OsvClient::new("https://api.osv.dev/v1/query").unwrap();
    //     let records = client
    //         .query(&CancellationToken::new(), "PyPI", "jinja2", "2.4.1")
    //         .await
    //         .unwrap();
    //     assert!(!records.is_empty());
    // }
}

// src/registry.rs

//! AUR RPC client
//!
//! This module provides the two read-only registry queries the tool needs:
//! - substring search across package names
//! - exact-name info lookup for the current version
//!
//! Search degrades to an empty result on transport or parse failures; the
//! version lookup distinguishes "not in the registry" from "query failed"
//! so callers can log them differently.

use crate::error::{Error, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// AUR RPC endpoint (protocol v5)
pub const AUR_RPC_URL: &str = "https://aur.archlinux.org/rpc/";

/// Timeout for HTTP requests (30 seconds)
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Sentinel for packages whose metadata omits a field
const UNKNOWN: &str = "Unknown";
const NO_DESCRIPTION: &str = "No description available";

/// One package as reported by the registry
#[derive(Debug, Clone)]
pub struct RegistryPackage {
    pub name: String,
    pub version: String,
    pub description: String,
}

/// Raw RPC response envelope
#[derive(Debug, Deserialize)]
struct RpcResponse {
    resultcount: i64,
    #[serde(default)]
    results: Vec<RpcPackage>,
}

/// Raw package object within an RPC response; every field is optional
#[derive(Debug, Deserialize)]
struct RpcPackage {
    #[serde(rename = "Name")]
    name: Option<String>,
    #[serde(rename = "Version")]
    version: Option<String>,
    #[serde(rename = "Description")]
    description: Option<String>,
}

impl RpcPackage {
    fn into_package(self) -> RegistryPackage {
        RegistryPackage {
            name: self.name.unwrap_or_else(|| UNKNOWN.to_string()),
            version: self.version.unwrap_or_else(|| UNKNOWN.to_string()),
            description: self
                .description
                .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
        }
    }
}

/// Read-only view of the package registry
pub trait Registry {
    /// Substring search. Transport and parse failures degrade to an empty
    /// result with a warning; they are never surfaced to the caller.
    fn search(&self, query: &str) -> Vec<RegistryPackage>;

    /// Exact-name lookup of the current version. `Ok(None)` means the
    /// registry has no record for this name; `Err` means the query itself
    /// failed. Either way the caller cannot determine drift.
    fn current_version(&self, name: &str) -> Result<Option<String>>;
}

/// HTTP client for the AUR RPC endpoint
pub struct AurClient {
    client: Client,
    base_url: String,
}

impl AurClient {
    /// Create a client against the public AUR endpoint
    pub fn new() -> Result<Self> {
        Self::with_base_url(AUR_RPC_URL.to_string())
    }

    /// Create a client against an explicit endpoint
    pub fn with_base_url(base_url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::Init(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    /// Perform one RPC query of the given type and decode the response
    fn query(&self, query_type: &str, arg: &str) -> Result<RpcResponse> {
        debug!("Querying registry: type={} arg={}", query_type, arg);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("v", "5"), ("type", query_type), ("arg", arg)])
            .send()
            .map_err(|e| Error::Transport(format!("request to {} failed: {}", self.base_url, e)))?;

        if !response.status().is_success() {
            return Err(Error::Transport(format!(
                "HTTP {} from {}",
                response.status(),
                self.base_url
            )));
        }

        let body = response
            .text()
            .map_err(|e| Error::Transport(format!("failed to read response body: {}", e)))?;

        parse_response(&body)
    }
}

impl Registry for AurClient {
    fn search(&self, query: &str) -> Vec<RegistryPackage> {
        match self.query("search", query) {
            Ok(response) => {
                if response.resultcount <= 0 {
                    info!("Registry returned no results for {:?}", query);
                    return Vec::new();
                }
                response
                    .results
                    .into_iter()
                    .map(RpcPackage::into_package)
                    .collect()
            }
            Err(err) => {
                warn!("Registry search for {:?} failed: {}", query, err);
                Vec::new()
            }
        }
    }

    fn current_version(&self, name: &str) -> Result<Option<String>> {
        let response = self.query("info", name)?;

        if response.resultcount <= 0 {
            return Ok(None);
        }

        // First result is authoritative for an exact-name info query
        let version = response
            .results
            .into_iter()
            .next()
            .map(|pkg| pkg.version.unwrap_or_else(|| UNKNOWN.to_string()));

        Ok(version)
    }
}

/// Decode an RPC response body
fn parse_response(body: &str) -> Result<RpcResponse> {
    serde_json::from_str(body)
        .map_err(|e| Error::Transport(format!("malformed registry response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_response() {
        let body = r#"{
            "resultcount": 2,
            "results": [
                {"Name": "ripgrep-git", "Version": "14.1.0-1", "Description": "Line-oriented search"},
                {"Name": "paru", "Version": "2.0.3-1", "Description": "AUR helper"}
            ]
        }"#;

        let response = parse_response(body).unwrap();
        assert_eq!(response.resultcount, 2);
        assert_eq!(response.results.len(), 2);

        let pkg = response.results.into_iter().next().unwrap().into_package();
        assert_eq!(pkg.name, "ripgrep-git");
        assert_eq!(pkg.version, "14.1.0-1");
    }

    #[test]
    fn test_parse_zero_results() {
        let response = parse_response(r#"{"resultcount": 0, "results": []}"#).unwrap();
        assert_eq!(response.resultcount, 0);
        assert!(response.results.is_empty());
    }

    #[test]
    fn test_missing_results_array_defaults_empty() {
        let response = parse_response(r#"{"resultcount": 0}"#).unwrap();
        assert!(response.results.is_empty());
    }

    #[test]
    fn test_missing_fields_get_sentinels() {
        let body = r#"{"resultcount": 1, "results": [{"Name": "mystery"}]}"#;

        let response = parse_response(body).unwrap();
        let pkg = response.results.into_iter().next().unwrap().into_package();

        assert_eq!(pkg.name, "mystery");
        assert_eq!(pkg.version, "Unknown");
        assert_eq!(pkg.description, "No description available");
    }

    #[test]
    fn test_malformed_body_is_transport_error() {
        let result = parse_response("not json at all");
        assert!(matches!(result.unwrap_err(), Error::Transport(_)));
    }
}

use crate::core::types::Source;
use crate::error::{AllpacError, Result};
use crate::project_identity;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// One package entry from the AUR RPC interface (v5)
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AurPackage {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    results: Vec<AurPackage>,
}

/// Thin client for `/rpc/?v=5`
pub struct AurRpc {
    client: Client,
    base_url: String,
}

impl AurRpc {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(project_identity::USER_AGENT)
            .build()
            .map_err(|e| AllpacError::backend(Source::Aur, format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn search(&self, query: &str) -> Result<Vec<AurPackage>> {
        self.call("search", query)
    }

    /// `None` when the AUR has no package with exactly this name
    pub fn info(&self, name: &str) -> Result<Option<AurPackage>> {
        Ok(self
            .call("info", name)?
            .into_iter()
            .find(|pkg| pkg.name == name))
    }

    fn call(&self, kind: &str, arg: &str) -> Result<Vec<AurPackage>> {
        let url = format!("{}/rpc/", self.base_url);
        debug!(%url, kind, arg, "AUR RPC request");

        let response = self
            .client
            .get(&url)
            .query(&[("v", "5"), ("type", kind), ("arg", arg)])
            .send()
            .map_err(|e| AllpacError::backend(Source::Aur, format!("request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| AllpacError::backend(Source::Aur, format!("reading response: {}", e)))?;
        if !status.is_success() {
            return Err(AllpacError::backend(
                Source::Aur,
                format!("RPC returned HTTP {}", status),
            ));
        }

        parse_response(&body)
    }
}

fn parse_response(body: &str) -> Result<Vec<AurPackage>> {
    let response: RpcResponse = serde_json::from_str(body)
        .map_err(|e| AllpacError::backend(Source::Aur, format!("malformed RPC response: {}", e)))?;

    if response.kind == "error" {
        return Err(AllpacError::backend(
            Source::Aur,
            response
                .error
                .unwrap_or_else(|| "RPC reported an unspecified error".to_string()),
        ));
    }
    Ok(response.results)
}

//! Configuration loading for server, client, and LLM settings

use crate::error::{ConfigError, Result};
use crate::mcp::client::McpClientConfig;
use crate::mcp::schema::ArgumentPolicy;
use crate::mcp::server::McpServerConfig;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level settings, loadable from a file plus `TICKET_MCP_*` environment
/// overrides (e.g. `TICKET_MCP_SERVER__PORT=9000`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub client: ClientSettings,

    #[serde(default)]
    pub llm: LlmSettings,
}

/// MCP server bind settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub description: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        let defaults = McpServerConfig::default();
        Self {
            host: defaults.host,
            port: defaults.port,
            name: defaults.name,
            description: defaults.description,
        }
    }
}

/// Invocation client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Base URL of the MCP server
    pub server_url: String,
    /// Per-invocation timeout in seconds
    pub timeout_secs: u64,
    /// Discovery cache TTL in seconds
    pub cache_ttl_secs: u64,
    /// Ceiling on concurrently in-flight invocations
    pub max_concurrency: usize,
    /// Reject invocations carrying unknown argument fields
    pub strict_arguments: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8000".to_string(),
            timeout_secs: 30,
            cache_ttl_secs: 300,
            max_concurrency: 8,
            strict_arguments: false,
        }
    }
}

/// LLM provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    OpenAi,
    Azure,
}

/// Chat-completion service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub provider: LlmProvider,
    pub api_key: String,
    /// Base URL override for OpenAI-compatible endpoints
    pub base_url: Option<String>,
    /// Azure resource endpoint
    pub endpoint: Option<String>,
    /// Azure deployment name
    pub deployment: Option<String>,
    /// Azure API version
    pub api_version: Option<String>,
    pub model: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: LlmProvider::OpenAi,
            api_key: String::new(),
            base_url: None,
            endpoint: None,
            deployment: None,
            api_version: None,
            model: "gpt-4o-mini".to_string(),
            max_tokens: Some(2048),
            temperature: Some(0.7),
        }
    }
}

impl Settings {
    /// Load settings from the given file (or `ticket-mcp.toml` when present),
    /// layered under environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        builder = match path {
            Some(path) => builder.add_source(File::from(path)),
            None => builder.add_source(File::with_name("ticket-mcp").required(false)),
        };
        builder = builder.add_source(Environment::with_prefix("TICKET_MCP").separator("__"));

        let settings: Settings = builder
            .build()
            .map_err(ConfigError::Load)?
            .try_deserialize()
            .map_err(ConfigError::Load)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.client.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "client.timeout_secs".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        if self.client.max_concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                field: "client.max_concurrency".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// LLM settings must be complete before the chat loop can start
    pub fn validate_llm(&self) -> Result<()> {
        if self.llm.api_key.is_empty() {
            return Err(ConfigError::MissingField {
                field: "llm.api_key".to_string(),
            }
            .into());
        }
        if self.llm.provider == LlmProvider::Azure {
            if self.llm.endpoint.is_none() {
                return Err(ConfigError::MissingField {
                    field: "llm.endpoint".to_string(),
                }
                .into());
            }
            if self.llm.deployment.is_none() {
                return Err(ConfigError::MissingField {
                    field: "llm.deployment".to_string(),
                }
                .into());
            }
        }
        Ok(())
    }

    pub fn server_config(&self) -> McpServerConfig {
        McpServerConfig {
            host: self.server.host.clone(),
            port: self.server.port,
            name: self.server.name.clone(),
            description: self.server.description.clone(),
        }
    }

    pub fn client_config(&self) -> McpClientConfig {
        McpClientConfig {
            timeout: Duration::from_secs(self.client.timeout_secs),
            cache_ttl: Duration::from_secs(self.client.cache_ttl_secs),
            max_concurrency: self.client.max_concurrency,
        }
    }

    pub fn argument_policy(&self) -> ArgumentPolicy {
        if self.client.strict_arguments {
            ArgumentPolicy::Reject
        } else {
            ArgumentPolicy::Drop
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_sensible() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.client.server_url, "http://127.0.0.1:8000");
        assert_eq!(settings.client_config().timeout, Duration::from_secs(30));
        assert_eq!(settings.argument_policy(), ArgumentPolicy::Drop);
    }

    #[test]
    fn loads_from_toml_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9100

[client]
timeout_secs = 5
strict_arguments = true

[llm]
provider = "azure"
api_key = "test-key"
endpoint = "https://example.openai.azure.com"
deployment = "gpt-4o"
"#
        )
        .unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.server.port, 9100);
        assert_eq!(settings.client.timeout_secs, 5);
        assert_eq!(settings.argument_policy(), ArgumentPolicy::Reject);
        assert_eq!(settings.llm.provider, LlmProvider::Azure);
        settings.validate_llm().unwrap();
    }

    #[test]
    fn llm_validation_requires_azure_fields() {
        let mut settings = Settings::default();
        settings.llm.api_key = "key".to_string();
        settings.llm.provider = LlmProvider::Azure;

        let err = settings.validate_llm().unwrap_err();
        assert!(err.to_string().contains("llm.endpoint"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(file, "[client]\ntimeout_secs = 0").unwrap();

        let err = Settings::load(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }
}

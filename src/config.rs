use crate::backend::OAuthCredentials;
use crate::backend::auth::DEFAULT_TOKEN_URL;
use crate::backend::http::DEFAULT_API_BASE_URL;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

const DEFAULT_HTTP_PORT: u16 = 8079;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Stdio,
    #[value(alias = "stream-http", alias = "stream_http")]
    #[serde(alias = "stream-http", alias = "stream_http")]
    Http,
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportKind::Stdio => write!(f, "stdio"),
            TransportKind::Http => write!(f, "http"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub transport: TransportKind,
    pub http_bind_address: SocketAddr,
    pub enabled_tools: Option<HashSet<String>>,
    pub api_base_url: String,
    pub token_url: String,
    pub credentials: OAuthCredentials,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: TransportKind::Stdio,
            http_bind_address: default_http_bind(),
            enabled_tools: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            credentials: OAuthCredentials::default(),
        }
    }
}

fn default_http_bind() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_HTTP_PORT))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ServerConfig {
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let CliArgs {
            config,
            transport: cli_transport,
            http_bind: cli_http_bind,
            enabled_tools: cli_enabled_tools,
            api_base_url: cli_api_base_url,
            token_url: cli_token_url,
            client_id,
            client_secret,
            redirect_uri,
            refresh_token,
        } = args;

        let file_config = if let Some(path) = config.as_ref() {
            load_config_file(path)?
        } else {
            PartialConfig::default()
        };

        let PartialConfig {
            transport: file_transport,
            http_bind: file_http_bind,
            enabled_tools: file_enabled_tools,
            api_base_url: file_api_base_url,
            token_url: file_token_url,
        } = file_config;

        let transport = cli_transport
            .or(file_transport)
            .unwrap_or(TransportKind::Stdio);

        let http_bind_address = cli_http_bind
            .or(file_http_bind)
            .unwrap_or_else(default_http_bind);

        let enabled_tools = cli_enabled_tools
            .or(file_enabled_tools)
            .map(|tools| {
                tools
                    .into_iter()
                    .map(|tool| tool.trim().to_ascii_lowercase())
                    .filter(|tool| !tool.is_empty())
                    .collect::<HashSet<_>>()
            })
            .filter(|set| !set.is_empty());

        let api_base_url = non_blank(cli_api_base_url.or(file_api_base_url))
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let token_url = non_blank(cli_token_url.or(file_token_url))
            .unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string());

        let credentials = OAuthCredentials {
            client_id: non_blank(client_id),
            client_secret: non_blank(client_secret),
            redirect_uri: non_blank(redirect_uri),
            refresh_token: non_blank(refresh_token),
        };

        Ok(Self {
            transport,
            http_bind_address,
            enabled_tools,
            api_base_url,
            token_url,
            credentials,
        })
    }

    pub fn is_tool_enabled(&self, tool: &str) -> bool {
        match &self.enabled_tools {
            Some(set) => set.contains(&tool.to_ascii_lowercase()),
            None => true,
        }
    }
}

#[derive(Parser, Debug, Default, Clone)]
#[command(name = "sheets-mcp", about = "Google Sheets MCP server", version)]
pub struct CliArgs {
    #[arg(
        long,
        value_name = "FILE",
        help = "Path to a configuration file (YAML or JSON)"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        env = "SHEETS_MCP_TRANSPORT",
        value_enum,
        value_name = "TRANSPORT",
        help = "Transport to expose (stdio or http)"
    )]
    pub transport: Option<TransportKind>,

    #[arg(
        long,
        env = "SHEETS_MCP_HTTP_BIND",
        value_name = "ADDR",
        help = "HTTP bind address when using http transport"
    )]
    pub http_bind: Option<SocketAddr>,

    #[arg(
        long,
        env = "SHEETS_MCP_ENABLED_TOOLS",
        value_name = "TOOL",
        value_delimiter = ',',
        help = "Restrict execution to the provided tool names"
    )]
    pub enabled_tools: Option<Vec<String>>,

    #[arg(
        long,
        env = "SHEETS_MCP_API_BASE_URL",
        value_name = "URL",
        help = "Base URL of the Sheets v4 REST API"
    )]
    pub api_base_url: Option<String>,

    #[arg(
        long,
        env = "SHEETS_MCP_TOKEN_URL",
        value_name = "URL",
        help = "OAuth token endpoint used to refresh access tokens"
    )]
    pub token_url: Option<String>,

    #[arg(long, env = "CLIENT_ID", hide_env_values = true)]
    pub client_id: Option<String>,

    #[arg(long, env = "CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    #[arg(long, env = "REDIRECT_URI", hide_env_values = true)]
    pub redirect_uri: Option<String>,

    #[arg(long, env = "REFRESH_TOKEN", hide_env_values = true)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    transport: Option<TransportKind>,
    http_bind: Option<SocketAddr>,
    enabled_tools: Option<Vec<String>>,
    api_base_url: Option<String>,
    token_url: Option<String>,
}

fn load_config_file(path: &Path) -> Result<PartialConfig> {
    if !path.exists() {
        anyhow::bail!("config file {:?} does not exist", path);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {:?}", path))?;
    let ext = path
        .extension()
        .and_then(|os| os.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse YAML config {:?}", path))?,
        "json" => serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse JSON config {:?}", path))?,
        other => anyhow::bail!("unsupported config extension: {other}"),
    };
    Ok(parsed)
}

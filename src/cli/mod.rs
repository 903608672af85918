use clap::{Parser, Subcommand};
use std::process::ExitCode;

use crate::clients::rednote::RednoteRemote;
use crate::core::content::OutputBlock;
use crate::infra::config::AppConfig;
use crate::tools::search::handler::SearchHandler;

#[derive(Parser)]
#[command(name = "rednote-mcp-gateway")]
#[command(about = "Xiaohongshu (Red Note) MCP server and admin CLI")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the MCP server (default); MODE=stdio selects the stdio transport
    Serve,
    /// Health check the service
    Health {
        /// Service URL to check
        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,
    },
    /// Validate configuration without starting the service
    Config,
    /// Show service status
    Status {
        /// Service URL to check
        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,
    },
    /// Run one search against the extraction service and print the result
    Search {
        /// Search keywords
        #[arg(short, long)]
        query: String,
        /// Number of notes to request
        #[arg(short, long, default_value_t = crate::domain::DEFAULT_COUNT)]
        count: u32,
        /// Extraction service URL (defaults to REDNOTE_BASE_URL / config file)
        #[arg(short, long)]
        url: Option<String>,
    },
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();

    run_commands(cli.command.unwrap_or(Commands::Serve)).await
}

pub async fn run_commands(command: Commands) -> ExitCode {
    match command {
        Commands::Serve => match crate::infra::boot::run_server().await {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!(error = %e, "server failed");
                eprintln!("❌ Server failed: {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Health { url } => match health_check(&url).await {
            Ok(_) => {
                println!("✅ Service is healthy");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Health check failed: {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Config => match validate_config() {
            Ok(_) => {
                println!("✅ Configuration is valid");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Configuration validation failed: {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Status { url } => match show_status(&url).await {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("❌ Status check failed: {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Search { query, count, url } => match search(url, &query, count).await {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("❌ Search failed: {}", e);
                ExitCode::FAILURE
            }
        },
    }
}

async fn health_check(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/healthz", url))
        .timeout(std::time::Duration::from_millis(500))
        .send()
        .await?;

    if response.status().is_success() {
        Ok(())
    } else {
        Err(format!("HTTP {}", response.status()).into())
    }
}

fn validate_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    let mode = std::env::var("MODE").unwrap_or_else(|_| "server".into());
    if !matches!(mode.as_str(), "server" | "stdio") {
        return Err(format!("Invalid MODE: {}. Must be 'server' or 'stdio'", mode).into());
    }

    if mode == "server" {
        let cfg = crate::infra::config::Config::from_env();
        if cfg.port == 0 {
            return Err("PORT cannot be 0".into());
        }
    }

    let app_cfg = AppConfig::from_env_and_toml().map_err(|e| e.to_string())?;
    if let Some(base) = app_cfg.base_url() {
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(format!("Invalid fetcher base_url: {}", base).into());
        }
    }
    if app_cfg.fetcher.timeout_ms == 0 {
        return Err("fetcher timeout_ms cannot be 0".into());
    }
    Ok(app_cfg)
}

async fn show_status(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = reqwest::Client::new();

    let health_response = client
        .get(format!("{}/healthz", url))
        .timeout(std::time::Duration::from_secs(5))
        .send()
        .await?;

    println!(
        "🏥 Health Status: {}",
        if health_response.status().is_success() {
            "✅ Healthy"
        } else {
            "❌ Unhealthy"
        }
    );

    // Try to get tools list
    let tools_response = client
        .post(format!("{}/mcp", url))
        .header("content-type", "application/json")
        .header("accept", "application/json, text/event-stream")
        .json(&serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/list",
            "params": {}
        }))
        .timeout(std::time::Duration::from_millis(500))
        .send()
        .await;

    match tools_response {
        Ok(resp) if resp.status().is_success() => {
            println!("🔧 Tools: ✅ Available");
        }
        Ok(resp) => {
            println!("🔧 Tools: ❌ HTTP {}", resp.status());
        }
        Err(_) => {
            println!("🔧 Tools: ❌ Unavailable");
        }
    }

    println!("\n📋 Configuration:");
    println!(
        "  Mode: {}",
        std::env::var("MODE").unwrap_or_else(|_| "server".into())
    );
    println!(
        "  Port: {}",
        std::env::var("PORT").unwrap_or_else(|_| "8080".into())
    );
    println!(
        "  Log Level: {}",
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into())
    );

    match AppConfig::from_env_and_toml() {
        Ok(cfg) => {
            println!("  Server: {} {}", cfg.server.name, cfg.server.version);
            match (cfg.base_url(), extraction_health(&cfg).await) {
                (Some(base), Some(true)) => println!("  Extraction Service: {} ✅ Healthy", base),
                (Some(base), _) => println!("  Extraction Service: {} ❌ Unhealthy", base),
                (None, _) => println!("  Extraction Service: Not configured"),
            }
        }
        Err(e) => println!("  Config: ❌ {}", e),
    }

    Ok(())
}

/// Check the extraction service's `/health`; `None` when no URL is configured.
async fn extraction_health(cfg: &AppConfig) -> Option<bool> {
    let base = cfg.base_url()?;
    match RednoteRemote::from_config(base, &cfg.fetcher) {
        Ok(remote) => Some(remote.health().await),
        Err(e) => {
            tracing::warn!(error = %e, "cannot build extraction client");
            Some(false)
        }
    }
}

async fn search(url: Option<String>, query: &str, count: u32) -> Result<(), Box<dyn std::error::Error>> {
    let app_cfg = AppConfig::from_env_and_toml().map_err(|e| e.to_string())?;
    let base = url
        .or_else(|| app_cfg.base_url().map(str::to_owned))
        .ok_or("No extraction service URL provided")?;

    let remote = RednoteRemote::from_config(base, &app_cfg.fetcher)?;
    let handler = SearchHandler::new(std::sync::Arc::new(remote));
    let mut args = rmcp::model::JsonObject::new();
    args.insert("query".into(), query.into());
    args.insert("count".into(), count.into());

    let out = handler.handle(&args).await;
    for block in &out.content {
        match block {
            OutputBlock::Text { text } => println!("{}\n", text),
            OutputBlock::Resource { resource } => println!("🖼  {} <{}>\n", resource.text, resource.uri),
        }
    }
    if out.is_error {
        return Err("search returned an error result".into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    #[tokio::test]
    async fn test_health_check_unreachable() {
        let result = health_check("http://localhost:9999").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn health_check_ok_and_error_paths() {
        use httpmock::prelude::*;
        let server = MockServer::start();
        server.mock(|when, then| { when.method(GET).path("/healthz"); then.status(200).body("ok"); });
        assert!(health_check(&server.base_url()).await.is_ok());

        let bad = MockServer::start();
        bad.mock(|when, then| { when.method(GET).path("/healthz"); then.status(500); });
        assert!(health_check(&bad.base_url()).await.is_err());
    }

    #[test]
    #[serial]
    fn test_validate_config_valid() {
        env::set_var("MODE", "server");
        env::set_var("PORT", "8080");

        let result = validate_config();
        assert!(result.is_ok());

        env::remove_var("MODE");
        env::remove_var("PORT");
    }

    #[test]
    #[serial]
    fn test_validate_config_invalid_mode() {
        env::set_var("MODE", "invalid");

        let result = validate_config();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid MODE"));

        env::remove_var("MODE");
    }

    #[test]
    #[serial]
    fn test_validate_config_stdio_mode() {
        env::set_var("MODE", "stdio");
        assert!(validate_config().is_ok());
        env::remove_var("MODE");
    }

    #[test]
    #[serial]
    fn test_validate_config_invalid_port() {
        env::set_var("MODE", "server");
        env::set_var("PORT", "0");

        let result = validate_config();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("PORT cannot be 0"));

        env::remove_var("MODE");
        env::remove_var("PORT");
    }

    #[test]
    #[serial]
    fn test_validate_config_bad_base_url() {
        env::set_var("REDNOTE_BASE_URL", "ftp://nope");
        let result = validate_config();
        env::remove_var("REDNOTE_BASE_URL");
        assert!(result.unwrap_err().to_string().contains("Invalid fetcher base_url"));
    }

    #[tokio::test]
    #[serial]
    async fn status_handles_non_200_health_and_tools() {
        use httpmock::prelude::*;
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/healthz");
            then.status(500).body("boom");
        });
        server.mock(|when, then| {
            when.method(POST).path("/mcp");
            then.status(500).body("boom");
        });

        assert!(show_status(&server.base_url()).await.is_ok());
    }

    #[tokio::test]
    async fn extraction_health_reports_both_answers() {
        use httpmock::prelude::*;
        let mut cfg = AppConfig::default();
        cfg.fetcher.retries = 0;
        assert_eq!(extraction_health(&cfg).await, None);

        let up = MockServer::start();
        let m = up.mock(|when, then| { when.method(GET).path("/health"); then.status(200).body("ok"); });
        cfg.fetcher.base_url = Some(up.base_url());
        assert_eq!(extraction_health(&cfg).await, Some(true));
        m.assert();

        let down = MockServer::start();
        down.mock(|when, then| { when.method(GET).path("/health"); then.status(503); });
        cfg.fetcher.base_url = Some(down.base_url());
        assert_eq!(extraction_health(&cfg).await, Some(false));
    }

    #[tokio::test]
    #[serial]
    async fn status_checks_configured_extraction_service() {
        use httpmock::prelude::*;
        let gateway = MockServer::start();
        gateway.mock(|when, then| { when.method(GET).path("/healthz"); then.status(200).body("ok"); });
        let extraction = MockServer::start();
        let health = extraction.mock(|when, then| { when.method(GET).path("/health"); then.status(200); });

        env::remove_var("CONFIG_PATH");
        env::set_var("REDNOTE_BASE_URL", extraction.base_url());
        let res = show_status(&gateway.base_url()).await;
        env::remove_var("REDNOTE_BASE_URL");
        assert!(res.is_ok());
        health.assert();
    }

    #[tokio::test]
    async fn test_status_handles_unavailable_service() {
        assert!(show_status("http://localhost:9999").await.is_err());
    }

    #[tokio::test]
    #[serial]
    async fn search_without_url_fails() {
        env::remove_var("REDNOTE_BASE_URL");
        env::remove_var("CONFIG_PATH");
        let err = search(None, "coffee", 1).await.unwrap_err();
        assert!(err.to_string().contains("No extraction service URL"));
    }

    #[tokio::test]
    #[serial]
    async fn search_prints_results_from_remote() {
        use httpmock::prelude::*;
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST).path("/api/search");
            then.status(200).json_body(serde_json::json!([{
                "title": "Morning Brew", "author": "J", "content": "Great roast",
                "images": ["http://img/1.png"], "link": "http://x/1"
            }]));
        });
        assert!(search(Some(server.base_url()), "coffee", 1).await.is_ok());
        m.assert();
    }

    #[tokio::test]
    #[serial]
    async fn search_reports_error_results() {
        use httpmock::prelude::*;
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/search");
            then.status(404);
        });
        assert!(search(Some(server.base_url()), "coffee", 1).await.is_err());
    }

    #[tokio::test]
    #[serial]
    async fn run_commands_config_success_and_failure() {
        let code = run_commands(Commands::Config).await;
        assert_eq!(code, ExitCode::SUCCESS);

        env::set_var("MODE", "nope");
        let code = run_commands(Commands::Config).await;
        assert_eq!(code, ExitCode::FAILURE);
        env::remove_var("MODE");
    }

    #[tokio::test]
    async fn run_commands_health_success() {
        use httpmock::prelude::*;
        let server = MockServer::start();
        server.mock(|when, then| { when.method(GET).path("/healthz"); then.status(200).body("ok"); });
        let code = run_commands(Commands::Health { url: server.base_url() }).await;
        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[test]
    fn config_takes_no_flags() {
        let cli = Cli::try_parse_from(["rednote-mcp-gateway", "config"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Config)));
        assert!(Cli::try_parse_from(["rednote-mcp-gateway", "config", "--validate"]).is_err());
    }

    #[test]
    fn cli_defaults_to_serve() {
        let cli = Cli::try_parse_from(["rednote-mcp-gateway"]).unwrap();
        assert!(cli.command.is_none());
        let cli = Cli::try_parse_from(["rednote-mcp-gateway", "search", "-q", "coffee"]).unwrap();
        match cli.command {
            Some(Commands::Search { query, count, url }) => {
                assert_eq!(query, "coffee");
                assert_eq!(count, 10);
                assert!(url.is_none());
            }
            _ => panic!("expected search command"),
        }
    }
}

//! `hr watch` command implementation.

use std::path::PathBuf;

use clap::Args;
use hr_agent::{AgentConfig, ReloadAgent, TokioScheduler, WsTransport};
use hr_config::{CliSettings, Config};

use crate::error::CliError;
use crate::output::Output;
use crate::reload::ReloadAction;

/// Arguments for the watch command.
#[derive(Args)]
pub(crate) struct WatchArgs {
    /// Path to configuration file (default: auto-discover hr.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// URL of the page being developed (overrides config).
    #[arg(short = 'u', long, env = "HR_PAGE_URL")]
    page_url: Option<String>,

    /// Reload socket path on the page's host (overrides config).
    #[arg(long)]
    path: Option<String>,

    /// Reconnect delay after a successful connection, in milliseconds.
    #[arg(long)]
    floor_ms: Option<u64>,

    /// Maximum reconnect delay, in milliseconds.
    #[arg(long)]
    ceiling_ms: Option<u64>,

    /// Text sent to the server after connecting.
    #[arg(long)]
    greeting: Option<String>,

    /// Enable verbose output (connection and retry logs).
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to run on reload, e.g. `hr watch -- touch reload.stamp`.
    #[arg(last = true)]
    exec: Vec<String>,
}

impl WatchArgs {
    /// Execute the watch command.
    ///
    /// Returns once the server's build changed and the reload action ran.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the reload action fails.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;
        let agent_config = agent_config(&config);
        let action = ReloadAction::from_command(config.reload.command.clone());

        output.info(&format!("Page: {}", config.page.url));
        if let Some(path) = &config.config_path {
            output.info(&format!("Config: {}", path.display()));
        }
        output.info(&format!("On reload: {}", action.describe()));

        let mut agent = ReloadAgent::for_page(
            &config.page.url,
            agent_config,
            WsTransport::new(),
            TokioScheduler,
            action,
        )?;
        output.info(&format!("Watching {}", agent.url()));

        let change = agent.run().await?;
        output.success(&format!("Reloaded after build change {change}"));

        Ok(())
    }

    /// Collect CLI overrides; an empty `-- <command>` leaves the config alone.
    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            page_url: self.page_url.clone(),
            path: self.path.clone(),
            floor_ms: self.floor_ms,
            ceiling_ms: self.ceiling_ms,
            greeting: self.greeting.clone(),
            command: (!self.exec.is_empty()).then(|| self.exec.clone()),
        }
    }
}

/// Agent settings from the loaded configuration.
fn agent_config(config: &Config) -> AgentConfig {
    AgentConfig {
        floor: config.backoff.floor(),
        ceiling: config.backoff.ceiling(),
        greeting: config.agent.greeting.clone(),
        path: config.page.path.clone(),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use clap::Parser;
    use hr_agent::{MockTransport, RecordingScheduler};
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: WatchArgs,
    }

    fn parse(args: &[&str]) -> WatchArgs {
        TestCli::parse_from(std::iter::once("hr").chain(args.iter().copied())).args
    }

    #[test]
    fn test_cli_settings_from_flags() {
        let args = parse(&[
            "--page-url",
            "http://localhost:4000",
            "--path",
            "/live",
            "--floor-ms",
            "200",
            "--ceiling-ms",
            "2000",
            "--greeting",
            "hi",
            "--",
            "touch",
            "reload.stamp",
        ]);

        let settings = args.cli_settings();

        assert_eq!(settings.page_url.as_deref(), Some("http://localhost:4000"));
        assert_eq!(settings.path.as_deref(), Some("/live"));
        assert_eq!(settings.floor_ms, Some(200));
        assert_eq!(settings.ceiling_ms, Some(2000));
        assert_eq!(settings.greeting.as_deref(), Some("hi"));
        assert_eq!(
            settings.command,
            Some(vec!["touch".to_owned(), "reload.stamp".to_owned()])
        );
    }

    #[test]
    fn test_no_exec_leaves_command_unset() {
        let args = parse(&["--verbose"]);
        assert!(args.verbose);
        assert_eq!(args.cli_settings().command, None);
    }

    #[test]
    fn test_agent_config_from_config() {
        let mut config = Config::default();
        config.backoff.floor_ms = 250;
        config.backoff.ceiling_ms = 750;
        config.agent.greeting = "ping".to_owned();
        config.page.path = "/_dev/reload".to_owned();

        let agent_config = agent_config(&config);

        assert_eq!(
            agent_config,
            AgentConfig {
                floor: Duration::from_millis(250),
                ceiling: Duration::from_millis(750),
                greeting: "ping".to_owned(),
                path: "/_dev/reload".to_owned(),
            }
        );
    }

    #[test]
    fn test_upper_case_page_url_passes_config_and_endpoint() {
        let mut config = Config::default();
        config.page.url = "HTTPS://preview.example.com:8443/docs".to_owned();
        config.validate().unwrap();

        let agent = ReloadAgent::for_page(
            &config.page.url,
            agent_config(&config),
            MockTransport::new(),
            RecordingScheduler::new(),
            ReloadAction::from_command(None),
        )
        .unwrap();

        assert_eq!(agent.url(), "wss://preview.example.com:8443/ws/reload");
    }

    #[tokio::test]
    async fn test_configured_agent_reloads_with_log_action() {
        let config = Config::default();
        let mut agent = ReloadAgent::for_page(
            &config.page.url,
            agent_config(&config),
            MockTransport::new()
                .with_refused(1)
                .with_session(["abc123", "def456"]),
            RecordingScheduler::new(),
            ReloadAction::from_command(None),
        )
        .unwrap();

        let change = agent.run().await.unwrap();

        assert_eq!(change.observed, "def456");
        assert_eq!(agent.url(), "ws://localhost:3000/ws/reload");
        assert_eq!(agent.scheduler().delays(), &[Duration::from_secs(1)]);
    }
}

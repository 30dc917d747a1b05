use clap::Parser;
use servermock_core::config::settings::Settings;
use servermock_http::logging::LogFormat;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "servermock", version, about = "Mock registration server for end-to-end tests")]
pub struct Cli {
    /// Settings file (YAML, JSON or JSONC)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to listen on
    #[arg(short, long)]
    pub listen: Option<SocketAddr>,

    /// Glob pattern of mock files registered at startup
    #[arg(long)]
    pub mocks: Option<String>,

    /// Treat every registration as single-use, ignoring `persist`
    #[arg(long, default_value_t = false)]
    pub no_persist: bool,

    /// Never forward unmocked requests to the network
    #[arg(long, default_value_t = false)]
    pub no_passthrough: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Log line format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Cli {
    /// Overlay command line flags on file settings.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(listen) = self.listen {
            settings.server.listen = listen;
        }
        if let Some(mocks) = &self.mocks {
            settings.server.mocks = Some(mocks.clone());
        }
        if self.no_persist {
            settings.middleware.allow_persist = false;
        }
        if self.no_passthrough {
            settings.server.passthrough = false;
        }
    }
}

#[test]
fn verify_cli() {
    use clap::CommandFactory;
    Cli::command().debug_assert()
}

#[test]
fn cli_overrides_settings() {
    let cli = Cli::parse_from([
        "servermock",
        "--listen",
        "127.0.0.1:0",
        "--mocks",
        "mocks/*.json",
        "--no-persist",
        "--no-passthrough",
    ]);
    let mut settings = Settings::default();
    cli.apply(&mut settings);

    assert_eq!(settings.server.listen.port(), 0);
    assert_eq!(settings.server.mocks.as_deref(), Some("mocks/*.json"));
    assert!(!settings.middleware.allow_persist);
    assert!(!settings.server.passthrough);
}

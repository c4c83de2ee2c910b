//! Socker Server
//!
//! Starts the socker websocket server.
//!
//! Run with: cargo run -- -i 0.0.0.0 -p 8765 -v
//!
//! Configuration is read from `--config` or the default locations
//! (see [`Config::load_default`]), then `SOCKER_*` environment variables,
//! then command-line flags.

use anyhow::Context;
use clap::Parser;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use socker::config::{generate_default_config, Config, LoggingConfig};

#[derive(Parser)]
#[command(name = "socker")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Start the socker websocket server")]
struct Cli {
    /// Listening interface
    #[arg(short, long)]
    interface: Option<String>,

    /// Listening port
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Auth backend (allow_all, prefix)
    #[arg(long)]
    auth_backend: Option<String>,

    /// Log output to FILE instead of console
    #[arg(long, value_name = "FILE")]
    logto: Option<String>,

    /// Print a default config file and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", generate_default_config());
        return Ok(());
    }

    let mut config = load_config(&cli, std::io::stderr)?;
    apply_cli_overrides(&mut config, &cli);

    init_logging(&config.logging, cli.verbose)?;

    tracing::info!("Starting socker v{}", env!("CARGO_PKG_VERSION"));

    socker::run(config).await?;

    tracing::info!("Bye!");
    Ok(())
}

/// Load the config file named on the command line, or the default one
///
/// The real subscriber is built from the loaded config, so events emitted
/// while loading go through a temporary subscriber writing to `writer`.
fn load_config<W>(cli: &Cli, writer: W) -> anyhow::Result<Config>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let bootstrap = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .with_writer(writer)
        .finish();

    tracing::subscriber::with_default(bootstrap, || match &cli.config {
        Some(path) => {
            let config = Config::load_with_env(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            tracing::info!("Loaded config from {:?}", path);
            Ok(config)
        }
        None => Ok(Config::load_default()),
    })
}

/// Command-line flags win over file and environment settings
fn apply_cli_overrides(config: &mut Config, cli: &Cli) {
    if let Some(interface) = &cli.interface {
        config.server.host = interface.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(backend) = &cli.auth_backend {
        config.auth.backend = backend.clone();
    }
    if let Some(file) = &cli.logto {
        config.logging.file = Some(file.clone());
    }
}

/// Initialize tracing from the logging config
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(config: &LoggingConfig, verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { "debug" } else { config.level.as_str() };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("socker={level},tower_http={level}")));

    let writer = match &config.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path))?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let registry = tracing_subscriber::registry().with(filter);
    if config.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(config.file.is_none())
                    .with_writer(writer),
            )
            .init();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Arc;

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "socker",
            "-i",
            "0.0.0.0",
            "-p",
            "9000",
            "--auth-backend",
            "prefix",
            "--logto",
            "/tmp/socker.log",
        ]);
        let mut config = Config::default();
        apply_cli_overrides(&mut config, &cli);

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.auth.backend, "prefix");
        assert_eq!(config.logging.file.as_deref(), Some("/tmp/socker.log"));
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_load_config_logs_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[hub]\nmax_connections = 7").unwrap();

        let path = file.path().to_str().unwrap();
        let cli = Cli::parse_from(["socker", "-c", path]);

        let captured = Captured::default();
        let writer = captured.clone();
        let config = load_config(&cli, move || writer.clone()).unwrap();
        assert_eq!(config.hub.max_connections, 7);

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Loaded config from"), "got: {output}");
    }

    #[test]
    fn test_load_config_reports_bad_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[hub\nmax_connections = ").unwrap();

        let path = file.path().to_str().unwrap();
        let cli = Cli::parse_from(["socker", "-c", path]);

        let err = load_config(&cli, std::io::sink).unwrap_err();
        assert!(err.to_string().starts_with("Failed to load config from"));
    }

    #[test]
    fn test_cli_defaults_keep_config() {
        let cli = Cli::parse_from(["socker"]);
        let mut config = Config::default();
        apply_cli_overrides(&mut config, &cli);

        assert_eq!(config.server.host, "localhost");
        assert_eq!(config.server.port, 8765);
        assert!(!cli.verbose);
    }
}

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;

/// Command line interface
#[derive(Parser, Debug)]
#[command(
    name = "dummy",
    about = "Mock server driven by an OpenAPI 3 specification",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the mock server
    Server(ServerArgs),
}

/// Arguments of the `server` command, each with an environment fallback
#[derive(Args, Debug, Clone)]
pub struct ServerArgs {
    /// Path to the OpenAPI specification (YAML or JSON)
    #[arg(env = "DUMMY_SPEC")]
    pub spec: PathBuf,

    /// Address to listen on
    #[arg(long, env = "SERVICE_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "SERVICE_PORT", default_value = "8080")]
    pub port: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long = "logger-level", env = "LOG_LEVEL", default_value = "INFO")]
    pub logger_level: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub spec_path: PathBuf,
    pub service_host: String,
    pub service_port: u16,
    pub log_level: Level,
}

impl Config {
    pub fn from_args(args: ServerArgs) -> Result<Self> {
        let service_port = args
            .port
            .parse::<u16>()
            .context("SERVICE_PORT must be a valid port number (0-65535)")?;

        let log_level = args
            .logger_level
            .parse::<Level>()
            .with_context(|| format!("LOG_LEVEL '{}' is not a known level", args.logger_level))?;

        if !args.spec.is_file() {
            bail!("Specification file not found: {}", args.spec.display());
        }

        Ok(Config {
            spec_path: args.spec,
            service_host: args.host,
            service_port,
            log_level,
        })
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.service_host, self.service_port)
    }

    pub fn log_startup(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Specification: {}", self.spec_path.display());
        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Service listening on: {}", self.listen_address());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn server_args(extra: &[&str]) -> ServerArgs {
        let cli = Cli::try_parse_from(["dummy", "server"].iter().chain(extra)).unwrap();
        match cli.command {
            Command::Server(args) => args,
        }
    }

    #[test]
    fn test_config_with_all_args() {
        let spec = NamedTempFile::new().unwrap();
        let path = spec.path().to_str().unwrap();

        let args = server_args(&[
            path,
            "--host",
            "127.0.0.1",
            "--port",
            "9000",
            "--logger-level",
            "debug",
        ]);
        let config = Config::from_args(args).unwrap();

        assert_eq!(config.spec_path, spec.path());
        assert_eq!(config.service_host, "127.0.0.1");
        assert_eq!(config.service_port, 9000);
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(config.listen_address(), "127.0.0.1:9000");
    }

    #[test]
    fn test_config_with_defaults() {
        let spec = NamedTempFile::new().unwrap();
        let args = server_args(&[spec.path().to_str().unwrap()]);

        let config = Config::from_args(args).unwrap();

        assert_eq!(config.service_port, 8080);
        assert_eq!(config.service_host, "0.0.0.0");
        assert_eq!(config.log_level, Level::INFO);
    }

    #[test]
    fn test_missing_spec_file() {
        let args = server_args(&["/definitely/not/here.yaml"]);

        let error = Config::from_args(args).unwrap_err();
        assert!(error.to_string().contains("not found"));
    }

    #[test]
    fn test_invalid_port() {
        let spec = NamedTempFile::new().unwrap();
        let args = server_args(&[spec.path().to_str().unwrap(), "--port", "not-a-number"]);

        let error = Config::from_args(args).unwrap_err();
        assert!(error.to_string().contains("SERVICE_PORT"));
    }

    #[test]
    fn test_port_out_of_range() {
        let spec = NamedTempFile::new().unwrap();
        let args = server_args(&[spec.path().to_str().unwrap(), "--port", "99999"]);

        assert!(Config::from_args(args).is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let spec = NamedTempFile::new().unwrap();
        let args = server_args(&[spec.path().to_str().unwrap(), "--logger-level", "loud"]);

        let error = Config::from_args(args).unwrap_err();
        assert!(error.to_string().contains("LOG_LEVEL"));
    }

    #[test]
    fn test_spec_path_is_required() {
        let result = Cli::try_parse_from(["dummy", "server"]);
        // only holds when DUMMY_SPEC is unset in the test environment
        if std::env::var_os("DUMMY_SPEC").is_none() {
            assert!(result.is_err());
        }
    }
}

//! NETCONF Compliance Checker CLI binary.
//!
//! # Commands
//!
//! - `check` - Connect to a device and audit its running configuration
//! - `evaluate` - Audit configuration text from a file or stdin
//! - `rules` - List the built-in compliance rules
//!
//! Exits with code 0 when every rule passed, 1 otherwise.

use std::io::{self, Read};
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use ncc::{
    compliance::{check_rules, BUILTIN_RULES},
    report::{report_outcomes, report_summary},
    run_check, ComplianceResult, Config, Datastore, TracingReporter, VERSION,
};

#[derive(Parser)]
#[command(name = "ncc")]
#[command(version = VERSION)]
#[command(about = "NETCONF Compliance Checker - audit a device's running configuration", long_about = None)]
struct Cli {
    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per event
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to a device over NETCONF/SSH and audit its running configuration
    Check {
        /// NETCONF router address (host:port, default port 830)
        #[arg(long)]
        router_address: Option<String>,

        /// NETCONF username
        #[arg(short, long)]
        username: Option<String>,

        /// NETCONF password (or use env NCC_PASSWORD)
        #[arg(short, long)]
        password: Option<String>,

        /// TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Connect timeout in seconds
        #[arg(long)]
        connect_timeout: Option<u64>,

        /// RPC reply timeout in seconds
        #[arg(long)]
        rpc_timeout: Option<u64>,

        /// Datastore to audit (running, candidate, startup)
        #[arg(long)]
        datastore: Option<Datastore>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Audit saved configuration text
    Evaluate {
        /// Configuration text (or - for stdin)
        input: Option<String>,

        /// Input file path
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the built-in compliance rules
    Rules,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            router_address,
            username,
            password,
            config,
            connect_timeout,
            rpc_timeout,
            datastore,
            json,
            verbose,
        } => {
            init_logging(verbose, cli.log_format);

            let mut settings = load_config(config)?;
            if let Some(address) = router_address {
                settings.connection.router_address = address;
            }
            if let Some(username) = username {
                settings.connection.username = username;
            }
            if let Some(password) = password {
                settings.connection.password = password;
            }
            if let Some(secs) = connect_timeout {
                settings.connection.connect_timeout_secs = secs;
            }
            if let Some(secs) = rpc_timeout {
                settings.session.rpc_timeout_secs = secs;
            }
            if let Some(datastore) = datastore {
                settings.session.datastore = datastore;
            }

            cmd_check(&settings, json)
        },

        Commands::Evaluate { input, file, json } => {
            init_logging(false, cli.log_format);
            cmd_evaluate(input, file, json)
        },

        Commands::Rules => {
            cmd_rules();
            Ok(())
        },
    }
}

fn cmd_check(config: &Config, json: bool) -> anyhow::Result<()> {
    tracing::info!("[INFO] Starting NETCONF Compliance Checker v{VERSION}");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let reporter = TracingReporter;
    let result = match runtime.block_on(run_check(config, &reporter)) {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("[ERROR] Compliance check failed: {e}");
            std::process::exit(1);
        },
    };

    finish(&result, json)
}

fn cmd_evaluate(input: Option<String>, file: Option<PathBuf>, json: bool) -> anyhow::Result<()> {
    let content = read_input(input, file)?;

    let outcomes = check_rules(BUILTIN_RULES, &content);
    if !json {
        report_outcomes(&TracingReporter, &outcomes);
    }
    let result = ComplianceResult::from_outcomes(&outcomes);

    finish(&result, json)
}

fn cmd_rules() {
    for (i, rule) in BUILTIN_RULES.iter().enumerate() {
        println!("{:>2}. {:<10} {}", i + 1, rule.name, rule.description);
    }
}

fn finish(result: &ComplianceResult, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        report_summary(&TracingReporter, result);
        let code = i32::from(!result.is_compliant());
        tracing::info!("[INFO] Exiting with code {code}");
    }

    if !result.is_compliant() {
        std::process::exit(1);
    }
    Ok(())
}

// Helper functions

fn init_logging(verbose: bool, format: LogFormat) {
    let log_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::from_file(path)?,
        None => match Config::default_path().filter(|p| p.exists()) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading default config file");
                Config::from_file(path)?
            },
            None => Config::default(),
        },
    };
    Ok(config.with_env())
}

fn read_input(input: Option<String>, file: Option<PathBuf>) -> anyhow::Result<String> {
    if let Some(path) = file {
        Ok(std::fs::read_to_string(path)?)
    } else if let Some(s) = input {
        if s == "-" {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        } else {
            Ok(s)
        }
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_check_flags() {
        let cli = Cli::try_parse_from([
            "ncc",
            "--log-format",
            "json",
            "check",
            "--router-address",
            "10.0.0.1",
            "--datastore",
            "candidate",
        ])
        .unwrap();

        assert!(cli.log_format == LogFormat::Json);
        match cli.command {
            Commands::Check {
                router_address,
                datastore,
                ..
            } => {
                assert_eq!(router_address.as_deref(), Some("10.0.0.1"));
                assert_eq!(datastore, Some(Datastore::Candidate));
            },
            _ => panic!("expected check"),
        }
    }

    #[test]
    fn test_rejects_unknown_datastore() {
        assert!(Cli::try_parse_from(["ncc", "check", "--datastore", "bogus"]).is_err());
    }

    #[test]
    fn test_log_format_defaults_to_text() {
        let cli = Cli::try_parse_from(["ncc", "rules"]).unwrap();
        assert!(cli.log_format == LogFormat::Text);
    }
}

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use ekrhizoc_core::config::{Config, SETTINGS};
use ekrhizoc_core::init_logger_from_env;
use tracing::{debug, info};

#[derive(Debug, Parser)]
#[command(name = "ekrhizoc", version, about)]
struct Cli {
    /// Log more; repeat for more detail (at most twice).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Log less; repeat to raise the level further.
    #[arg(short, long, action = ArgAction::Count, global = true, conflicts_with = "verbose")]
    quiet: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every setting with its environment variable and current value.
    Settings {
        /// Print the resolved settings as TOML instead.
        #[arg(long)]
        toml: bool,
    },
}

impl Cli {
    fn verbosity(&self) -> i32 {
        i32::from(self.verbose) - i32::from(self.quiet)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = init_logger_from_env(cli.verbosity()).context("failed to initialize logger")?;
    logger.install()?;
    debug!(level = %logger.level(), output = ?logger.output(), "logger ready");

    match cli.command {
        Some(Command::Settings { toml: true }) => {
            let cfg = Config::from_env()?;
            print!("{}", cfg.to_toml()?);
        }
        Some(Command::Settings { toml: false }) => print_settings(),
        None => {
            let cfg = Config::from_env()?;
            info!(
                bin_dir = %cfg.bin_dir,
                max_urls = cfg.max_urls,
                max_url_length = cfg.max_url_length,
                url_request_timer = cfg.url_request_timer,
                "ekrhizoc started"
            );
            debug!(ignore_filetypes = ?cfg.ignore_filetypes, "ignoring file types");
        }
    }

    Ok(())
}

fn print_settings() {
    for setting in SETTINGS {
        let current = setting
            .resolve_display()
            .unwrap_or_else(|e| format!("<invalid: {e}>"));
        let alias = setting
            .env_var_alias()
            .map(|a| format!(" (alias {a})"))
            .unwrap_or_default();
        println!("{}{alias}", setting.name());
        println!("    type:    {}", setting.kind());
        println!("    default: {:?}", setting.default_display());
        println!("    current: {current:?}");
        if let Some(description) = setting.description() {
            println!("    {description}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_counts_flags() {
        let cli = Cli::parse_from(["ekrhizoc", "-vv"]);
        assert_eq!(cli.verbosity(), 2);

        let cli = Cli::parse_from(["ekrhizoc", "settings", "-q"]);
        assert_eq!(cli.verbosity(), -1);
        assert!(matches!(cli.command, Some(Command::Settings { toml: false })));
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["ekrhizoc", "-v", "-q"]).is_err());
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}

use clap::{CommandFactory, Parser};
use sbpeek::{OutputFormat, RunOptions};

#[tokio::main]
pub async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // clap exits with 2 on bad input; usage problems exit with 1 here
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    init_logger(cli.verbose);

    if let Err(e) = cli.run().await {
        eprintln!("[error] {:#}", e);
        if is_usage_error(&e) {
            eprintln!("\n{}", Cli::command().render_usage());
        }
        std::process::exit(exit_code(&e));
    }
}

#[derive(Debug, Parser)]
#[command(name = "sbpeek", version)]
#[command(about = "peek Azure Service Bus queue and DLQ messages without removing them", long_about = None)]
pub struct Cli {
    /// Service Bus connection string (can include EntityPath)
    connection_string: String,

    /// Max messages to peek per queue
    #[arg(
        long,
        default_value_t = i64::from(sbpeek::DEFAULT_MAX_MESSAGES),
        allow_negative_numbers = true
    )]
    max: i64,

    /// Queue name (if not present in connection string)
    #[arg(long)]
    queue: Option<String>,

    /// Only peek active queue
    #[arg(long, conflicts_with = "dlq_only")]
    active_only: bool,

    /// Only peek dead-letter queue
    #[arg(long)]
    dlq_only: bool,

    /// Print one JSON object per message per line
    #[arg(long)]
    json: bool,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let format = if self.json {
            OutputFormat::JsonLines
        } else {
            OutputFormat::Human
        };
        let options = RunOptions::new(self.max, self.queue, self.active_only, self.dlq_only)?
            .with_format(format);

        tokio::select! {
            result = sbpeek::peek(&self.connection_string, &options, std::io::stdout()) => {
                result?;
            }
            _ = tokio::signal::ctrl_c() => {
                println!("Interrupted.");
            }
        }

        Ok(())
    }
}

fn init_logger(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();
}

fn is_usage_error(error: &anyhow::Error) -> bool {
    matches!(error.downcast_ref::<sbpeek::Error>(), Some(sbpeek::Error::Usage(_)))
}

fn exit_code(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<sbpeek::Error>()
        .map(sbpeek::Error::exit_code)
        .unwrap_or(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_defaults() {
        let cli = Cli::try_parse_from(["sbpeek", "Endpoint=sb://x/;EntityPath=q1"]).unwrap();
        assert_eq!(cli.max, 10);
        assert!(!cli.active_only && !cli.dlq_only && !cli.json);
        assert_eq!(cli.queue, None);
    }

    #[test]
    fn negative_max_reaches_validation() {
        let cli = Cli::try_parse_from(["sbpeek", "cs", "--max", "-5"]).unwrap();
        let err = RunOptions::new(cli.max, None, false, false).unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn exclusive_flags_conflict_in_clap() {
        let err = Cli::try_parse_from(["sbpeek", "cs", "--active-only", "--dlq-only"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn library_errors_choose_exit_code() {
        let usage = anyhow::Error::new(sbpeek::Error::Usage("x".into()));
        assert_eq!(exit_code(&usage), 1);

        let auth = anyhow::Error::new(sbpeek::Error::Authentication("x".into()));
        assert_eq!(exit_code(&auth), 2);

        assert_eq!(exit_code(&anyhow::anyhow!("boom")), 2);
    }

    #[test]
    fn only_usage_errors_print_usage() {
        assert!(is_usage_error(&anyhow::Error::new(sbpeek::Error::Usage("x".into()))));
        assert!(!is_usage_error(&anyhow::Error::new(sbpeek::Error::Configuration("x".into()))));
        assert!(Cli::command()
            .render_usage()
            .to_string()
            .contains("sbpeek [OPTIONS] <CONNECTION_STRING>"));
    }
}

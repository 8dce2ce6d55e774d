mod cli;

use cdnlog_core::logging::init_logging;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "cdnlog",
    version,
    about = "cdnlog: CDN access-log parser and traffic analytics"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse raw log files into structured records
    Parse(cli::parse::ParseArgs),

    /// Parse log files and produce an analytics report
    Analyze(cli::analyze::AnalyzeArgs),
}

fn main() {
    let cli = Cli::parse();

    init_logging();

    let result = match cli.command {
        Command::Parse(args) => cli::parse::run(args),
        Command::Analyze(args) => cli::analyze::run(args),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

use std::env;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format;

use self::args::{Args, Command};
use self::check::{run_check, run_evaluate};

mod args;
mod check;
mod problem;

fn main() -> ExitCode {
    let args = Args::parse();

    set_default_logging();

    let event_format = format().with_target(false).without_time();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .event_format(event_format)
        .init();

    let success = match args.command {
        Command::Check(config) => run_check(config),
        Command::Evaluate(config) => run_evaluate(config),
    };

    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn set_default_logging() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
}

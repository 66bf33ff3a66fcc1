use std::process::ExitCode;

use clap::Parser;
use dotenv::dotenv;

use crate::args::Args;

mod application;
mod args;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();

    let args = Args::parse();
    if let Err(e) = application::logging::init_tracing(&args.log) {
        eprintln!("error: {e:#}");
        return ExitCode::FAILURE;
    }

    match application::commands::run(args).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

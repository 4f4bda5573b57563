#![forbid(unsafe_code)]

use clap::Parser;
use visearch_cli::cli::{Cli, run};
use visearch_cli::logging;

fn main() {
    let cli = Cli::parse();
    let as_json = cli.json;
    logging::init(cli.log_json);
    if let Err(error) = run(cli) {
        if as_json {
            eprintln!(
                "{}",
                serde_json::json!({
                    "status": "error",
                    "error": error.to_string(),
                    "exit_code": error.exit_code(),
                })
            );
        } else {
            eprintln!("{error}");
        }
        std::process::exit(error.exit_code());
    }
}

// src/main.rs

use distwatch::{cli, logging, run};

/// Exit code for failures outside the comparison itself (bad config,
/// unwritable report, lock I/O).
const EXIT_ERROR: i32 = 2;

#[tokio::main]
async fn main() {
    let args = cli::parse();
    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("distwatch error: {err:?}");
        std::process::exit(EXIT_ERROR);
    }

    match run(args).await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("distwatch error: {err}");
            std::process::exit(EXIT_ERROR);
        }
    }
}

//! lev-install - build the CLI in release mode and install it locally.

use lev_release::cli;
use std::process;

#[tokio::main]
async fn main() {
    env_logger::init();

    let exit_code = match cli::run_install().await {
        Ok(code) => code,
        Err(e) => {
            cli::report_error(&e);
            1
        }
    };

    process::exit(exit_code);
}

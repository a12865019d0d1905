//! lev-release - build every release target and publish a GitHub release.
//!
//! Exit code 0 means every asset was uploaded.

use lev_release::cli;
use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    let exit_code = match cli::run_release().await {
        Ok(code) => code,
        Err(e) => {
            cli::report_error(&e);
            1
        }
    };

    process::exit(exit_code);
}

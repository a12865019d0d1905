//! lev-image - build and push the multi-architecture container image.

use lev_release::cli;
use std::process;

#[tokio::main]
async fn main() {
    env_logger::init();

    let exit_code = match cli::run_image().await {
        Ok(code) => code,
        Err(e) => {
            cli::report_error(&e);
            1
        }
    };

    process::exit(exit_code);
}

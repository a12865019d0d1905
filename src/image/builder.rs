//! The single build-and-push invocation.

use crate::config::ImageConfig;
use crate::process::CommandSpec;

/// `docker buildx build --platform <list> -t <ref> --push <context>`
pub fn build_and_push_command(config: &ImageConfig) -> CommandSpec {
    CommandSpec::new("docker")
        .args(["buildx", "build", "--platform"])
        .arg(config.platforms.join(","))
        .arg("-t")
        .arg(config.image_ref())
        .arg("--push")
        .arg(config.context.display().to_string())
}

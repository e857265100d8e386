//! rmdir command - Remove an empty directory

use clap::Args;

use super::Context;
use crate::exit_code::ExitCode;

/// Remove an empty directory
#[derive(Args, Debug)]
pub struct RmdirArgs {
    /// Remote directory to remove
    pub path: String,
}

/// Execute the rmdir command
pub async fn execute(args: RmdirArgs, ctx: &Context) -> ExitCode {
    let client = match ctx.connect() {
        Ok(client) => client,
        Err(code) => return code,
    };

    let result = client.rmdir(&args.path).await;
    ctx.finish(
        result,
        &format!("Failed to remove {}", args.path),
        &format!("Removed {}", args.path),
    )
}

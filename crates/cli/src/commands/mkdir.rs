//! mkdir command - Create a directory

use clap::Args;

use super::Context;
use crate::exit_code::ExitCode;

/// Create a directory
#[derive(Args, Debug)]
pub struct MkdirArgs {
    /// Remote directory to create
    pub path: String,
}

/// Execute the mkdir command
pub async fn execute(args: MkdirArgs, ctx: &Context) -> ExitCode {
    let client = match ctx.connect() {
        Ok(client) => client,
        Err(code) => return code,
    };

    let result = client.mkdir(&args.path).await;
    ctx.finish(
        result,
        &format!("Failed to create {}", args.path),
        &format!("Created {}", args.path),
    )
}

//! mv command - Rename a file or symlink
//!
//! Renames happen server-side within one storage group; nothing is copied.

use clap::Args;

use super::Context;
use crate::exit_code::ExitCode;

/// Rename a file or symlink
#[derive(Args, Debug)]
pub struct MvArgs {
    /// Current remote path
    pub source: String,

    /// New remote path
    pub target: String,
}

/// Execute the mv command
pub async fn execute(args: MvArgs, ctx: &Context) -> ExitCode {
    let client = match ctx.connect() {
        Ok(client) => client,
        Err(code) => return code,
    };

    let result = client.rename(&args.source, &args.target).await;
    ctx.finish(
        result,
        &format!("Failed to rename {}", args.source),
        &format!("Renamed {} -> {}", args.source, args.target),
    )
}

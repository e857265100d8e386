//! ln command - Create a symbolic link

use clap::Args;

use super::Context;
use crate::exit_code::ExitCode;

/// Create a symbolic link
#[derive(Args, Debug)]
pub struct LnArgs {
    /// Path the link points to
    pub target: String,

    /// Remote path of the link to create
    pub link: String,
}

/// Execute the ln command
pub async fn execute(args: LnArgs, ctx: &Context) -> ExitCode {
    let client = match ctx.connect() {
        Ok(client) => client,
        Err(code) => return code,
    };

    let result = client.symlink(&args.target, &args.link).await;
    ctx.finish(
        result,
        &format!("Failed to link {}", args.link),
        &format!("Linked {} -> {}", args.link, args.target),
    )
}

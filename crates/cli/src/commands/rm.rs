//! rm command - Delete files or symlinks
//!
//! Directories are removed with `rmdir`.

use clap::Args;

use super::Context;
use crate::exit_code::ExitCode;

/// Delete files or symlinks
#[derive(Args, Debug)]
pub struct RmArgs {
    /// Remote path(s) to delete
    #[arg(required = true)]
    pub paths: Vec<String>,

    /// Treat paths that do not exist as deleted
    #[arg(short, long)]
    pub force: bool,
}

/// Execute the rm command
///
/// Every path is attempted; the exit code is that of the last failure.
pub async fn execute(args: RmArgs, ctx: &Context) -> ExitCode {
    let client = match ctx.connect() {
        Ok(client) => client,
        Err(code) => return code,
    };

    let mut code = ExitCode::Success;
    for path in &args.paths {
        match client.delete(path).await {
            Ok(response) => ctx.formatter.done(&response, &format!("Deleted {path}")),
            Err(e) if args.force && e.status() == Some(404) => {
                tracing::debug!(path = %path, "already absent");
            }
            Err(e) => code = ctx.formatter.fail(&format!("Failed to delete {path}"), &e),
        }
    }
    code
}

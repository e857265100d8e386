//! exists command - Check whether a file exists

use clap::Args;
use serde::Serialize;

use super::Context;
use crate::exit_code::ExitCode;

/// Check whether a file exists
#[derive(Args, Debug)]
pub struct ExistsArgs {
    /// Remote path (e.g., /CODE/images/logo.png)
    pub path: String,
}

#[derive(Serialize)]
struct ExistsOutput<'a> {
    path: &'a str,
    exists: bool,
}

/// Execute the exists command
///
/// Exits 0 when the file exists and 5 when it does not.
pub async fn execute(args: ExistsArgs, ctx: &Context) -> ExitCode {
    let client = match ctx.connect() {
        Ok(client) => client,
        Err(code) => return code,
    };

    match client.file_exists(&args.path).await {
        Ok(exists) => {
            if ctx.formatter.is_json() {
                ctx.formatter.json(&ExistsOutput {
                    path: &args.path,
                    exists,
                });
            } else if exists {
                ctx.formatter.println(&format!("{} exists", args.path));
            } else {
                ctx.formatter.println(&format!("{} does not exist", args.path));
            }
            if exists { ExitCode::Success } else { ExitCode::NotFound }
        }
        Err(e) => ctx.formatter.fail(&format!("Failed to check {}", args.path), &e),
    }
}

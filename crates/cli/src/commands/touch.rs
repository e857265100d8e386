//! touch command - Set the modification time of a file

use clap::Args;
use jiff::Timestamp;

use super::Context;
use crate::exit_code::ExitCode;

/// Set the modification time of a file
#[derive(Args, Debug)]
pub struct TouchArgs {
    /// Remote file path
    pub path: String,

    /// New modification time: RFC 3339 or unix seconds (default: now)
    #[arg(short, long)]
    pub date: Option<String>,
}

/// Execute the touch command
pub async fn execute(args: TouchArgs, ctx: &Context) -> ExitCode {
    let client = match ctx.connect() {
        Ok(client) => client,
        Err(code) => return code,
    };

    let result = match &args.date {
        Some(date) => client.mtime(&args.path, date).await,
        None => client.mtime_at(&args.path, Timestamp::now()).await,
    };
    ctx.finish(
        result,
        &format!("Failed to set mtime of {}", args.path),
        &format!("Updated mtime of {}", args.path),
    )
}

//! ls command - List a directory
//!
//! Renders the entries of a `dir` listing as a table, or the normalized
//! document in JSON mode.

use clap::Args;
use ns_core::{Attributes, Response};

use super::Context;
use crate::exit_code::ExitCode;
use crate::output::{entries_table, format_size};

/// List a directory
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Remote directory (e.g., /CODE/images)
    pub path: String,

    /// Print entry names only, one per line
    #[arg(short = '1', long)]
    pub names: bool,

    /// Show totals after the listing
    #[arg(long)]
    pub summarize: bool,
}

/// Execute the ls command
pub async fn execute(args: LsArgs, ctx: &Context) -> ExitCode {
    let client = match ctx.connect() {
        Ok(client) => client,
        Err(code) => return code,
    };

    let response = match client.dir(&args.path).await {
        Ok(response) => response,
        Err(e) => return ctx.formatter.fail(&format!("Failed to list {}", args.path), &e),
    };

    if ctx.formatter.is_json() {
        ctx.formatter.json(&response);
        return ExitCode::Success;
    }

    let entries = dir_entries(&response);
    if args.names {
        for entry in &entries {
            if let Some(name) = entry.get("name") {
                ctx.formatter.println(name);
            }
        }
    } else if entries.is_empty() {
        ctx.formatter.println("(empty)");
    } else {
        ctx.formatter.println(&entries_table(&entries).to_string());
    }

    if args.summarize {
        let (count, bytes) = totals(&entries);
        ctx.formatter.println(&format!(
            "\nTotal: {count} entries, {}",
            format_size(&bytes.to_string())
        ));
    }
    ExitCode::Success
}

/// Entries of a `dir` response, in server order
fn dir_entries(response: &Response) -> Vec<&Attributes> {
    response
        .document()
        .and_then(|doc| doc.get("stat"))
        .map(|stat| stat.entries("file"))
        .unwrap_or_default()
}

/// Entry count and summed file sizes
fn totals(entries: &[&Attributes]) -> (usize, u64) {
    let bytes = entries
        .iter()
        .filter(|e| e.get("type").map(String::as_str) == Some("file"))
        .filter_map(|e| e.get("size")?.parse::<u64>().ok())
        .sum();
    (entries.len(), bytes)
}

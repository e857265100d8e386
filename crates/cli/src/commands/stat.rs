//! stat command - Show file or directory metadata

use clap::Args;
use ns_core::{Attributes, Response};

use super::Context;
use crate::exit_code::ExitCode;
use crate::output::{format_mtime, format_size};

/// Show metadata of a file, symlink or directory
#[derive(Args, Debug)]
pub struct StatArgs {
    /// Remote path (e.g., /CODE/images/logo.png)
    pub path: String,
}

/// Execute the stat command
pub async fn execute(args: StatArgs, ctx: &Context) -> ExitCode {
    let client = match ctx.connect() {
        Ok(client) => client,
        Err(code) => return code,
    };

    match client.stat(&args.path).await {
        Ok(response) => {
            if ctx.formatter.is_json() {
                ctx.formatter.json(&response);
            } else {
                for line in stat_lines(&response) {
                    ctx.formatter.println(&line);
                }
            }
            ExitCode::Success
        }
        Err(e) => ctx.formatter.fail(&format!("Failed to stat {}", args.path), &e),
    }
}

/// Human-readable lines for a stat response
fn stat_lines(response: &Response) -> Vec<String> {
    let Some(stat) = response.document().and_then(|doc| doc.get("stat")) else {
        return vec!["No metadata returned".to_string()];
    };

    let mut lines = Vec::new();
    if let Some(directory) = stat.attr("directory") {
        lines.push(format!("Directory : {directory}"));
    }
    for entry in stat.entries("file") {
        lines.push(String::new());
        lines.extend(entry_lines(entry));
    }
    lines
}

fn entry_lines(entry: &Attributes) -> Vec<String> {
    entry
        .iter()
        .map(|(key, value)| {
            let shown = match key.as_str() {
                "size" | "bytes" => format!("{value} ({})", format_size(value)),
                "mtime" => format_mtime(value),
                _ => value.clone(),
            };
            format!("{key:<10}: {shown}")
        })
        .collect()
}

//! put command - Upload a local file or stdin
//!
//! The body is streamed; nothing is buffered in memory.

use std::path::Path;

use clap::Args;
use ns_core::BodyReader;
use serde::Serialize;

use super::Context;
use crate::exit_code::ExitCode;

/// Upload a local file or stdin
#[derive(Args, Debug)]
pub struct PutArgs {
    /// Local file, or "-" for stdin
    pub source: String,

    /// Remote path; a trailing "/" keeps the local file name
    pub target: String,
}

#[derive(Debug, Serialize)]
struct PutOutput {
    status: &'static str,
    source: String,
    target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size_human: Option<String>,
}

/// Execute the put command
pub async fn execute(args: PutArgs, ctx: &Context) -> ExitCode {
    let formatter = &ctx.formatter;

    let target = match remote_target(&args.source, &args.target) {
        Ok(target) => target,
        Err(msg) => {
            formatter.error(&msg);
            return ExitCode::UsageError;
        }
    };

    let (reader, size) = match open_source(&args.source).await {
        Ok(opened) => opened,
        Err(e) => {
            formatter.error(&format!("Failed to open {}: {e}", args.source));
            return ExitCode::UsageError;
        }
    };

    let client = match ctx.connect() {
        Ok(client) => client,
        Err(code) => return code,
    };

    match client.upload(reader, &target).await {
        Ok(_) => {
            let size_human = size.map(|n| humansize::format_size(n, humansize::BINARY));
            if formatter.is_json() {
                formatter.json(&PutOutput {
                    status: "success",
                    source: args.source,
                    target,
                    size_bytes: size,
                    size_human,
                });
            } else {
                let suffix = size_human.map(|s| format!(" ({s})")).unwrap_or_default();
                formatter.success(&format!("Uploaded {} -> {target}{suffix}", args.source));
            }
            ExitCode::Success
        }
        Err(e) => formatter.fail(&format!("Failed to upload {target}"), &e),
    }
}

/// Open the upload body and its size when known
async fn open_source(source: &str) -> std::io::Result<(BodyReader, Option<u64>)> {
    if source == "-" {
        let stdin: BodyReader = Box::new(tokio::io::stdin());
        return Ok((stdin, None));
    }
    let file = tokio::fs::File::open(source).await?;
    let size = file.metadata().await.ok().map(|m| m.len());
    let body: BodyReader = Box::new(file);
    Ok((body, size))
}

/// Resolve the remote path, appending the local file name to a directory target
fn remote_target(source: &str, target: &str) -> Result<String, String> {
    if !target.ends_with('/') {
        return Ok(target.to_string());
    }
    if source == "-" {
        return Err("A file name is required when uploading from stdin".to_string());
    }
    Path::new(source)
        .file_name()
        .map(|name| format!("{target}{}", name.to_string_lossy()))
        .ok_or_else(|| format!("Cannot derive a file name from '{source}'"))
}

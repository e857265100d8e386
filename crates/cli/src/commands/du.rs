//! du command - Show disk usage of a directory

use clap::Args;
use ns_core::Response;

use super::Context;
use crate::exit_code::ExitCode;
use crate::output::format_size;

/// Show file count and byte total of a directory tree
#[derive(Args, Debug)]
pub struct DuArgs {
    /// Remote directory (e.g., /CODE)
    pub path: String,
}

/// Execute the du command
pub async fn execute(args: DuArgs, ctx: &Context) -> ExitCode {
    let client = match ctx.connect() {
        Ok(client) => client,
        Err(code) => return code,
    };

    match client.du(&args.path).await {
        Ok(response) => {
            if ctx.formatter.is_json() {
                ctx.formatter.json(&response);
            } else {
                ctx.formatter.println(&summary_line(&args.path, &response));
            }
            ExitCode::Success
        }
        Err(e) => ctx.formatter.fail(&format!("Failed to get usage of {}", args.path), &e),
    }
}

fn summary_line(path: &str, response: &Response) -> String {
    let info = response
        .document()
        .and_then(|doc| doc.get("du"))
        .and_then(|du| du.entries("du-info").into_iter().next());

    match info {
        Some(info) => {
            let files = info.get("files").map(String::as_str).unwrap_or("0");
            let bytes = info.get("bytes").map(String::as_str).unwrap_or("0");
            format!("{path}: {files} files, {}", format_size(bytes))
        }
        None => format!("{path}: no usage information returned"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_line() {
        let xml = r#"<?xml version="1.0" encoding="ISO-8859-1"?>
<du directory="/CODE"><du-info files="12" bytes="3145728"/></du>"#;
        let response = Response::Document(ns_core::xml::normalize_str(xml).unwrap());
        assert_eq!(summary_line("/CODE", &response), "/CODE: 12 files, 3 MiB");
    }

    #[test]
    fn test_summary_line_missing_info() {
        let line = summary_line("/CODE", &Response::Status { status: 200 });
        assert!(line.contains("no usage information"));
    }
}

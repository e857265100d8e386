//! get command - Download a file to disk or stdout

use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;
use tokio::io::AsyncWriteExt;

use super::Context;
use crate::exit_code::ExitCode;

/// Download a file to disk or stdout
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Remote file path
    pub source: String,

    /// Local destination, "-" for stdout (default: remote file name)
    pub target: Option<String>,
}

#[derive(Debug, Serialize)]
struct GetOutput {
    status: &'static str,
    source: String,
    target: String,
    size_bytes: u64,
    size_human: String,
}

/// Execute the get command
pub async fn execute(args: GetArgs, ctx: &Context) -> ExitCode {
    let client = match ctx.connect() {
        Ok(client) => client,
        Err(code) => return code,
    };

    if args.target.as_deref() == Some("-") {
        let mut stdout = tokio::io::stdout();
        let result = client.download(&args.source, &mut stdout).await;
        if let Err(e) = stdout.flush().await {
            tracing::debug!(error = %e, "flushing stdout failed");
        }
        return match result {
            Ok(_) => ExitCode::Success,
            Err(e) => ctx.formatter.fail(&format!("Failed to download {}", args.source), &e),
        };
    }

    let target = match local_target(&args.source, args.target.as_deref()) {
        Ok(target) => target,
        Err(msg) => {
            ctx.formatter.error(&msg);
            return ExitCode::UsageError;
        }
    };

    let mut file = match tokio::fs::File::create(&target).await {
        Ok(file) => file,
        Err(e) => {
            ctx.formatter
                .error(&format!("Failed to create {}: {e}", target.display()));
            return ExitCode::GeneralError;
        }
    };

    let result = client.download(&args.source, &mut file).await;
    let flushed = file.flush().await;
    drop(file);

    match (result, flushed) {
        (Ok(_), Ok(())) => {
            let size = tokio::fs::metadata(&target).await.map(|m| m.len()).unwrap_or(0);
            let size_human = humansize::format_size(size, humansize::BINARY);
            let target = target.display().to_string();
            if ctx.formatter.is_json() {
                ctx.formatter.json(&GetOutput {
                    status: "success",
                    source: args.source,
                    target,
                    size_bytes: size,
                    size_human,
                });
            } else {
                ctx.formatter
                    .success(&format!("Downloaded {} -> {target} ({size_human})", args.source));
            }
            ExitCode::Success
        }
        (Err(e), _) => {
            remove_partial(&target).await;
            ctx.formatter.fail(&format!("Failed to download {}", args.source), &e)
        }
        (Ok(_), Err(e)) => {
            remove_partial(&target).await;
            ctx.formatter
                .error(&format!("Failed to write {}: {e}", target.display()));
            ExitCode::GeneralError
        }
    }
}

async fn remove_partial(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!(path = %path.display(), error = %e, "could not remove partial download");
    }
}

/// Local path for a download; defaults to the remote file name
fn local_target(source: &str, target: Option<&str>) -> Result<PathBuf, String> {
    let name = || {
        source
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| format!("Cannot derive a file name from '{source}'"))
    };

    match target {
        None => Ok(PathBuf::from(name()?)),
        Some(dir) if dir.ends_with('/') || Path::new(dir).is_dir() => {
            Ok(Path::new(dir).join(name()?))
        }
        Some(file) => Ok(PathBuf::from(file)),
    }
}

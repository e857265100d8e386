//! CLI command definitions and execution
//!
//! Every storage command resolves a profile, connects a client and runs
//! one operation. Profile and completion commands never touch the network.

use clap::{Parser, Subcommand};
use ns_core::{ProfileManager, Response};
use ns_http::Client;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

mod completions;
mod du;
mod exists;
mod get;
mod ln;
mod ls;
mod mkdir;
mod mv;
mod profile;
mod put;
mod rm;
mod rmdir;
mod stat;
mod touch;

/// ns - NetStorage command-line client
///
/// Signed HTTP access to a NetStorage upload account: browse, upload,
/// download and manage files.
#[derive(Parser, Debug)]
#[command(name = "ns")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format: human-readable or JSON
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value = "false")]
    pub no_color: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true, default_value = "false")]
    pub debug: bool,

    /// Profile to use (defaults to the configured default profile)
    #[arg(short, long, global = true, env = "NS_PROFILE")]
    pub profile: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage connection profiles
    #[command(subcommand)]
    Profile(profile::ProfileCommands),

    /// Show metadata of a file or directory
    Stat(stat::StatArgs),

    /// List a directory
    Ls(ls::LsArgs),

    /// Show disk usage of a directory
    Du(du::DuArgs),

    /// Delete a file or symlink
    Rm(rm::RmArgs),

    /// Create a directory
    Mkdir(mkdir::MkdirArgs),

    /// Remove an empty directory
    Rmdir(rmdir::RmdirArgs),

    /// Rename a file or symlink
    Mv(mv::MvArgs),

    /// Create a symbolic link
    Ln(ln::LnArgs),

    /// Set the modification time of a file
    Touch(touch::TouchArgs),

    /// Upload a local file or stdin
    Put(put::PutArgs),

    /// Download a file to disk or stdout
    Get(get::GetArgs),

    /// Check whether a file exists (exit 0 if it does, 5 if not)
    Exists(exists::ExistsArgs),

    /// Generate shell completion scripts
    Completions(completions::CompletionsArgs),
}

/// State shared by all commands
#[derive(Debug, Clone)]
pub struct Context {
    pub formatter: Formatter,
    pub profile: Option<String>,
}

impl Context {
    /// Connect a client for the selected profile
    ///
    /// On failure the error is already reported and the exit code is returned.
    pub fn connect(&self) -> Result<Client, ExitCode> {
        let manager = ProfileManager::new()
            .map_err(|e| self.formatter.fail("Failed to load settings", &e))?;

        let name = match &self.profile {
            Some(name) => name.clone(),
            None => manager
                .default_name()
                .map_err(|e| self.formatter.fail("Failed to load settings", &e))?,
        };
        let profile = manager
            .get(&name)
            .map_err(|e| self.formatter.fail("Failed to load profile", &e))?;

        tracing::debug!(profile = %profile.name, host = %profile.host, "connecting");
        ns_http::connect(profile.to_update())
            .map_err(|e| self.formatter.fail("Failed to create client", &e))
    }

    /// Report the outcome of a mutating operation
    pub fn finish(&self, result: ns_core::Result<Response>, context: &str, done: &str) -> ExitCode {
        match result {
            Ok(response) => {
                self.formatter.done(&response, done);
                ExitCode::Success
            }
            Err(e) => self.formatter.fail(context, &e),
        }
    }
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let output_config = OutputConfig {
        json: cli.json,
        no_color: cli.no_color,
        quiet: cli.quiet,
    };
    let ctx = Context {
        formatter: Formatter::new(output_config),
        profile: cli.profile,
    };

    match cli.command {
        Commands::Profile(cmd) => profile::execute(cmd, &ctx),
        Commands::Stat(args) => stat::execute(args, &ctx).await,
        Commands::Ls(args) => ls::execute(args, &ctx).await,
        Commands::Du(args) => du::execute(args, &ctx).await,
        Commands::Rm(args) => rm::execute(args, &ctx).await,
        Commands::Mkdir(args) => mkdir::execute(args, &ctx).await,
        Commands::Rmdir(args) => rmdir::execute(args, &ctx).await,
        Commands::Mv(args) => mv::execute(args, &ctx).await,
        Commands::Ln(args) => ln::execute(args, &ctx).await,
        Commands::Touch(args) => touch::execute(args, &ctx).await,
        Commands::Put(args) => put::execute(args, &ctx).await,
        Commands::Get(args) => get::execute(args, &ctx).await,
        Commands::Exists(args) => exists::execute(args, &ctx).await,
        Commands::Completions(args) => completions::execute(args),
    }
}

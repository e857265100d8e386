//! Profile management commands
//!
//! Profiles are named storage hosts with the upload account used to sign
//! requests against them.

use clap::Subcommand;
use ns_core::{Profile, ProfileManager};
use serde::Serialize;

use super::Context;
use crate::exit_code::ExitCode;

/// Profile subcommands
#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Add or update a profile
    Set(SetArgs),

    /// List all configured profiles
    List(ListArgs),

    /// Remove a profile
    Remove(RemoveArgs),
}

/// Arguments for the `profile set` command
#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Profile name (e.g., "default", "media")
    pub name: String,

    /// Storage host (e.g., "example-nsu.akamaihd.net")
    pub host: String,

    /// Upload account key name
    pub key_name: String,

    /// Upload account key
    pub key: String,

    /// Use plain http instead of https
    #[arg(long)]
    pub no_tls: bool,

    /// Include server response bodies in error messages
    #[arg(long)]
    pub verbose: bool,

    /// Request timeout in milliseconds
    #[arg(long, default_value_t = ns_core::config::DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,
}

/// Arguments for the `profile list` command
#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Show connection options as well
    #[arg(short, long)]
    pub long: bool,
}

/// Arguments for the `profile remove` command
#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Name of the profile to remove
    pub name: String,
}

#[derive(Serialize)]
struct ProfileListOutput {
    default: String,
    profiles: Vec<ProfileInfo>,
}

/// Profile without its key
#[derive(Serialize)]
struct ProfileInfo {
    name: String,
    host: String,
    key_name: String,
    tls: bool,
    timeout_ms: u64,
}

impl From<&Profile> for ProfileInfo {
    fn from(profile: &Profile) -> Self {
        Self {
            name: profile.name.clone(),
            host: profile.host.clone(),
            key_name: profile.key_name.clone(),
            tls: profile.tls,
            timeout_ms: profile.timeout_ms,
        }
    }
}

#[derive(Serialize)]
struct ProfileOperationOutput {
    success: bool,
    profile: String,
    message: String,
}

/// Execute a profile subcommand
pub fn execute(cmd: ProfileCommands, ctx: &Context) -> ExitCode {
    let manager = match ProfileManager::new() {
        Ok(manager) => manager,
        Err(e) => return ctx.formatter.fail("Failed to load settings", &e),
    };

    match cmd {
        ProfileCommands::Set(args) => execute_set(args, &manager, ctx),
        ProfileCommands::List(args) => execute_list(args, &manager, ctx),
        ProfileCommands::Remove(args) => execute_remove(args, &manager, ctx),
    }
}

fn execute_set(args: SetArgs, manager: &ProfileManager, ctx: &Context) -> ExitCode {
    let formatter = &ctx.formatter;
    for (value, what) in [
        (&args.name, "Profile name"),
        (&args.host, "Host"),
        (&args.key_name, "Key name"),
        (&args.key, "Key"),
    ] {
        if value.trim().is_empty() {
            formatter.error(&format!("{what} cannot be empty"));
            return ExitCode::UsageError;
        }
    }
    if args.timeout_ms == 0 {
        formatter.error("Timeout must be greater than zero");
        return ExitCode::UsageError;
    }

    let mut profile = Profile::new(&args.name, &args.host, &args.key_name, &args.key);
    profile.tls = !args.no_tls;
    profile.verbose = args.verbose;
    profile.timeout_ms = args.timeout_ms;

    match manager.set(profile) {
        Ok(()) => {
            let message = format!("Profile '{}' configured successfully", args.name);
            if formatter.is_json() {
                formatter.json(&ProfileOperationOutput {
                    success: true,
                    profile: args.name,
                    message,
                });
            } else {
                formatter.success(&message);
            }
            ExitCode::Success
        }
        Err(e) => formatter.fail("Failed to save profile", &e),
    }
}

fn execute_list(args: ListArgs, manager: &ProfileManager, ctx: &Context) -> ExitCode {
    let formatter = &ctx.formatter;
    let (profiles, default) = match manager.list().and_then(|p| Ok((p, manager.default_name()?))) {
        Ok(listing) => listing,
        Err(e) => return formatter.fail("Failed to list profiles", &e),
    };

    if formatter.is_json() {
        formatter.json(&ProfileListOutput {
            default,
            profiles: profiles.iter().map(ProfileInfo::from).collect(),
        });
    } else if profiles.is_empty() {
        formatter.println("No profiles configured.");
    } else {
        for profile in &profiles {
            let marker = if profile.name == default { "*" } else { " " };
            let mut line = format!("{marker} {:<12} {}", profile.name, profile.host);
            if args.long {
                let scheme = if profile.tls { "https" } else { "http" };
                line.push_str(&format!(
                    " (key: {}, {scheme}, timeout: {}ms)",
                    profile.key_name, profile.timeout_ms
                ));
            }
            formatter.println(&line);
        }
    }
    ExitCode::Success
}

fn execute_remove(args: RemoveArgs, manager: &ProfileManager, ctx: &Context) -> ExitCode {
    let formatter = &ctx.formatter;
    match manager.remove(&args.name) {
        Ok(()) => {
            let message = format!("Profile '{}' removed successfully", args.name);
            if formatter.is_json() {
                formatter.json(&ProfileOperationOutput {
                    success: true,
                    profile: args.name,
                    message,
                });
            } else {
                formatter.success(&message);
            }
            ExitCode::Success
        }
        Err(e) => formatter.fail("Failed to remove profile", &e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_info_hides_key() {
        let profile = Profile::new("media", "example.akamaihd.net", "upload", "s3cr3t");
        let info = ProfileInfo::from(&profile);
        let json = serde_json::to_string(&info).unwrap();

        assert_eq!(info.name, "media");
        assert!(info.tls);
        assert!(!json.contains("s3cr3t"));
    }
}

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;

use crate::error::{BuildServerError, Result};
use crate::models::ServerConfig;
use crate::services::process;
use crate::services::supervisor::Supervisor;

/// First column of a `systemctl list-units` row, skipping the state bullet
/// systemd prints in front of failed units.
static UNIT_COLUMN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[●○×*]\s+)?(\S+)").unwrap());

/// `is-active` states in which the unit's job is still in progress.
/// Oneshot build units sit in `activating` for the whole build.
const RUNNING_STATES: &[&str] = &["active", "activating", "reloading"];

/// [`Supervisor`] backed by the host's systemd via `systemctl`.
pub struct SystemdSupervisor {
    timeout: Duration,
    use_sudo: bool,
}

impl SystemdSupervisor {
    pub fn new(timeout: Duration, use_sudo: bool) -> Self {
        Self { timeout, use_sudo }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.command_timeout(), config.use_sudo)
    }
}

#[async_trait]
impl Supervisor for SystemdSupervisor {
    async fn list_units(&self, pattern: &str) -> Result<Vec<String>> {
        let stdout = process::run_checked(
            "systemctl",
            &[
                "list-units",
                "--all",
                pattern,
                "--no-pager",
                "--no-legend",
                "--plain",
            ],
            None,
            self.timeout,
        )
        .await?;
        Ok(parse_unit_listing(&stdout))
    }

    async fn is_active(&self, unit: &str) -> Result<bool> {
        // is-active exits non-zero for every state but "active", so the exit
        // code alone says nothing about whether systemd answered.
        let output = process::run("systemctl", &["is-active", unit], None, self.timeout).await?;
        if output.stdout.is_empty() {
            return Err(BuildServerError::ProbeUnavailable(format!(
                "systemctl is-active {unit} gave no state (exit {}): {}",
                output.code, output.stderr
            )));
        }
        Ok(is_running_state(&output.stdout))
    }

    async fn start(&self, unit: &str) -> Result<()> {
        let (program, args) = start_command(unit, self.use_sudo);
        process::run_checked(program, &args, None, self.timeout).await?;
        Ok(())
    }
}

/// Command line used to start `unit`.
///
/// With sudo this is `sudo -n systemctl start --no-block <unit>`, where
/// `<unit>` is the full name including the suffix (`nix-build-alpha.service`).
/// A sudoers rule must allow exactly that argv, for example
/// `build-api ALL=(root) NOPASSWD: /run/current-system/sw/bin/systemctl start --no-block nix-build-*.service`.
/// Rules written for a bare `systemctl start nix-build-<repo>` do not match.
pub fn start_command(unit: &str, use_sudo: bool) -> (&'static str, Vec<&str>) {
    let systemctl_args = ["start", "--no-block", unit];
    if use_sudo {
        let mut args = vec!["-n", "systemctl"];
        args.extend_from_slice(&systemctl_args);
        ("sudo", args)
    } else {
        ("systemctl", systemctl_args.to_vec())
    }
}

/// Unit names from `systemctl list-units --no-legend` output.
pub fn parse_unit_listing(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| UNIT_COLUMN_RE.captures(line))
        .map(|caps| caps[1].to_string())
        .collect()
}

pub fn is_running_state(state: &str) -> bool {
    RUNNING_STATES.contains(&state.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_listing() {
        let output = "\
nix-build-alpha.service loaded inactive dead  Nix build for alpha
nix-build-beta.service  loaded active   start Nix build for beta
nix-build-alpha.timer   loaded active   waiting Timer for alpha
";
        assert_eq!(
            parse_unit_listing(output),
            vec![
                "nix-build-alpha.service",
                "nix-build-beta.service",
                "nix-build-alpha.timer"
            ]
        );
    }

    #[test]
    fn parse_listing_skips_failure_bullet() {
        let output = "● nix-build-gamma.service loaded failed failed Nix build for gamma\n";
        assert_eq!(parse_unit_listing(output), vec!["nix-build-gamma.service"]);
    }

    #[test]
    fn parse_empty_listing() {
        assert!(parse_unit_listing("").is_empty());
        assert!(parse_unit_listing("\n\n").is_empty());
    }

    #[test]
    fn start_command_lines() {
        assert_eq!(
            start_command("nix-build-alpha.service", true),
            (
                "sudo",
                vec!["-n", "systemctl", "start", "--no-block", "nix-build-alpha.service"]
            )
        );
        assert_eq!(
            start_command("nix-build-alpha.service", false),
            ("systemctl", vec!["start", "--no-block", "nix-build-alpha.service"])
        );
    }

    #[test]
    fn running_states() {
        assert!(is_running_state("active"));
        assert!(is_running_state("activating\n"));
        assert!(!is_running_state("inactive"));
        assert!(!is_running_state("failed"));
        assert!(!is_running_state("unknown"));
    }
}

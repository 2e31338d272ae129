//! Deny-list classification of shell commands before execution.
//!
//! Every command submitted through `run_command` is checked against a fixed,
//! ordered set of patterns covering catastrophic or irreversible actions:
//! recursive force-deletes rooted at `/`, filesystem formatting, raw disk
//! writes through `dd`, shell fork bombs, and system power-state changes.
//!
//! # Security Model
//!
//! This is an advisory deny-list, not a sandbox. A caller can trivially craft
//! a destructive command that evades every pattern (e.g. by quoting or
//! variable expansion). The container's own isolation is the actual boundary;
//! the classifier only catches the obvious foot-guns before they reach the
//! daemon.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

/// Deny patterns, checked in order; the first match short-circuits.
///
/// Matching is case-sensitive substring/regex matching on the raw command
/// text. Keep the order stable: tests and operator documentation refer to it.
const DENY_PATTERNS: &[&str] = &[
    r"rm\s+-rf\s+/", // recursive force-delete rooted at /
    r"mkfs",         // filesystem formatting
    r"dd\s+if=",     // raw disk writes
    r":\(\)",        // fork bomb definition
    r"shutdown",
    r"reboot",
    r"halt",
    r"poweroff",
];

static COMPILED_DENY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    DENY_PATTERNS
        .iter()
        .map(|p| {
            // The pattern list is a compile-time constant; a malformed entry
            // is a programming error, not a runtime condition.
            #[allow(clippy::expect_used)]
            Regex::new(p).expect("deny pattern must be a valid regex")
        })
        .collect()
});

/// Outcome of classifying one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// No deny pattern matched; execution may proceed.
    Valid,
    /// A deny pattern matched; execution must be skipped.
    Denied {
        /// Human-readable warning naming the offending command.
        warning: String,
    },
}

impl Validation {
    /// Returns `true` if the command passed classification.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Classifies a command as safe or unsafe by deny-pattern match.
///
/// Pure function: no side effects beyond a warning log on a match, and it
/// never fails.
#[must_use]
pub fn validate_command(command: &str) -> Validation {
    for pattern in COMPILED_DENY_PATTERNS.iter() {
        if pattern.is_match(command) {
            warn!(command = %command, pattern = %pattern.as_str(), "Command matched deny pattern");
            return Validation::Denied {
                warning: format!("Potentially dangerous command detected: {command}"),
            };
        }
    }

    Validation::Valid
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_denied(command: &str) {
        let outcome = validate_command(command);
        match outcome {
            Validation::Denied { warning } => {
                assert!(
                    warning.contains(command),
                    "warning should echo the offending command: {warning}"
                );
            }
            Validation::Valid => panic!("command should be denied: {command}"),
        }
    }

    #[test]
    fn test_rejects_recursive_root_delete() {
        assert_denied("rm -rf /");
        assert_denied("rm  -rf  /etc");
        assert_denied("sudo rm -rf / --no-preserve-root");
    }

    #[test]
    fn test_rejects_filesystem_formatting() {
        assert_denied("mkfs.ext4 /dev/sda1");
        assert_denied("mkfs -t vfat /dev/sdb");
    }

    #[test]
    fn test_rejects_raw_disk_writes() {
        assert_denied("dd if=/dev/zero of=/dev/sda");
    }

    #[test]
    fn test_rejects_fork_bomb() {
        assert_denied(":(){ :|:& };:");
    }

    #[test]
    fn test_rejects_power_state_changes() {
        assert_denied("shutdown -h now");
        assert_denied("reboot");
        assert_denied("halt");
        assert_denied("poweroff");
    }

    #[test]
    fn test_accepts_ordinary_commands() {
        assert!(validate_command("echo hello").is_valid());
        assert!(validate_command("ls -la /root").is_valid());
        assert!(validate_command("nmap -sV 10.0.0.1").is_valid());
        assert!(validate_command("cat /etc/os-release").is_valid());
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        // Uppercase variants do not match; the deny-list is advisory only.
        assert!(validate_command("REBOOT").is_valid());
        assert!(validate_command("Shutdown").is_valid());
    }

    #[test]
    fn test_plain_dd_without_input_file_is_allowed() {
        assert!(validate_command("dd --version").is_valid());
    }
}

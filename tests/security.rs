//! Integration tests for command classification.
//!
//! The classifier is advisory: it gates execution on a fixed, ordered
//! deny-list and never has side effects. These tests pin the observable
//! contract for every pattern family.

use zade::security::{validate_command, Validation};

fn warning_for(command: &str) -> String {
    match validate_command(command) {
        Validation::Denied { warning } => warning,
        Validation::Valid => panic!("expected {command:?} to be denied"),
    }
}

#[test]
fn test_every_deny_family_is_caught() {
    let denied = [
        "rm -rf /",
        "rm -rf /var/lib",
        "mkfs.ext4 /dev/sda",
        "dd if=/dev/urandom of=/dev/sda bs=1M",
        ":(){ :|:& };:",
        "shutdown now",
        "reboot",
        "halt -f",
        "poweroff",
    ];

    for command in denied {
        assert!(
            !validate_command(command).is_valid(),
            "expected deny: {command}"
        );
    }
}

#[test]
fn test_warning_echoes_the_offending_command() {
    let warning = warning_for("dd if=/dev/zero of=/dev/sda");
    assert!(warning.contains("dd if=/dev/zero of=/dev/sda"));
}

#[test]
fn test_typical_pentest_commands_pass() {
    let allowed = [
        "nmap -sV -p- 192.168.1.10",
        "whoami",
        "cat /etc/passwd",
        "curl -s https://example.com",
        "ls -la /host_tmp",
        "apt-get update",
    ];

    for command in allowed {
        assert!(
            validate_command(command).is_valid(),
            "expected allow: {command}"
        );
    }
}

#[test]
fn test_classification_is_pure_and_repeatable() {
    // Same input, same outcome, no state carried between calls.
    for _ in 0..3 {
        assert!(!validate_command("reboot").is_valid());
        assert!(validate_command("echo hello").is_valid());
    }
}

#[test]
fn test_embedded_pattern_matches_anywhere_in_the_command() {
    // Substring semantics: the pattern need not be the first word.
    assert!(!validate_command("echo done && reboot").is_valid());
    assert!(!validate_command("sleep 5; poweroff").is_valid());
}

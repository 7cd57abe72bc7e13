//! Stamps the binary with the short commit it was built from, for the startup log.

use std::process::Command;

const UNKNOWN: &str = "unknown";

fn short_commit() -> String {
    if let Ok(sha) = std::env::var("GIT_COMMIT_SHA") {
        return sha.chars().take(7).collect();
    }
    Command::new("git")
        .args(["rev-parse", "--short=7", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .map(|out| String::from_utf8_lossy(&out.stdout).trim().to_owned())
        .filter(|sha| !sha.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_owned())
}

fn main() {
    println!("cargo:rustc-env=GIT_COMMIT_SHORT={}", short_commit());
    println!("cargo:rerun-if-env-changed=GIT_COMMIT_SHA");
    for path in [".git/HEAD", ".git/refs/heads"] {
        if std::path::Path::new(path).exists() {
            println!("cargo:rerun-if-changed={path}");
        }
    }
}

//! Build script for the thermal coordinator
//!
//! Embeds the git revision, build timestamp, target triple and profile
//! so `thermal-coordinator version` can report what is running.

use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");

    let git_hash = git(&["rev-parse", "--short=8", "HEAD"]).unwrap_or_else(|| "unknown".into());
    let git_dirty = match git(&["status", "--porcelain"]) {
        Some(out) if !out.is_empty() => "true",
        Some(_) => "false",
        None => "unknown",
    };
    let rustc = Command::new("rustc")
        .arg("--version")
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".into());

    let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();
    let target = env::var("TARGET").unwrap_or_else(|_| "unknown".into());
    let profile = env::var("PROFILE").unwrap_or_else(|_| "unknown".into());

    println!("cargo:rustc-env=THERMAL_GIT_HASH={}", git_hash);
    println!("cargo:rustc-env=THERMAL_GIT_DIRTY={}", git_dirty);
    println!("cargo:rustc-env=THERMAL_BUILD_TIMESTAMP={}", timestamp);
    println!("cargo:rustc-env=THERMAL_TARGET={}", target);
    println!("cargo:rustc-env=THERMAL_PROFILE={}", profile);
    println!("cargo:rustc-env=THERMAL_RUSTC_VERSION={}", rustc);
}

/// Run a git command and return its trimmed stdout, if it succeeded
fn git(args: &[&str]) -> Option<String> {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
}

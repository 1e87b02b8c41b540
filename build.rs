// Copyright (c) 2026 rezky_nightky

use std::env;
use std::process::Command;

fn main() {
    for var in ["GLYPHRAIN_BUILD", "GLYPHRAIN_GIT_SHA", "GITHUB_SHA", "PROFILE"] {
        println!("cargo:rerun-if-env-changed={var}");
    }

    let build = env::var("GLYPHRAIN_BUILD")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(target_triple_label);
    println!("cargo:rustc-env=GLYPHRAIN_BUILD={build}");

    let sha = ["GLYPHRAIN_GIT_SHA", "GITHUB_SHA"]
        .into_iter()
        .find_map(|name| env::var(name).ok().and_then(|v| short_sha(&v)))
        .or_else(|| {
            let out = Command::new("git")
                .args(["rev-parse", "--short=7", "HEAD"])
                .output()
                .ok()?;
            if !out.status.success() {
                return None;
            }
            short_sha(&String::from_utf8_lossy(&out.stdout))
        })
        .unwrap_or_default();
    println!("cargo:rustc-env=GLYPHRAIN_GIT_SHA={sha}");
}

/// First seven hex digits, lowercased; anything else is rejected.
fn short_sha(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let short = raw.get(..raw.len().min(7))?;
    (!short.is_empty() && short.chars().all(|c| c.is_ascii_hexdigit()))
        .then(|| short.to_ascii_lowercase())
}

fn target_triple_label() -> String {
    let var = |name: &str| env::var(name).unwrap_or_else(|_| "unknown".to_string());
    let os = match var("CARGO_CFG_TARGET_OS").as_str() {
        "macos" => "darwin".to_string(),
        other => other.to_string(),
    };
    let arch = var("CARGO_CFG_TARGET_ARCH");
    let profile = var("PROFILE");
    format!("{os}-{arch}-{profile}")
}

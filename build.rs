//! Build script for Mealwise
//!
//! Bumps a persistent build counter and embeds build metadata as env vars.

use std::fs;
use std::path::Path;

const BUILD_NUMBER_FILE: &str = "build_number.txt";

/// Read the last build number and persist the next one
fn next_build_number(path: &Path) -> u64 {
    let last = fs::read_to_string(path)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(0);
    let next = last + 1;
    fs::write(path, next.to_string()).expect("Failed to write build number file");
    next
}

fn main() {
    println!("cargo:rerun-if-changed=src");

    let build_number = next_build_number(Path::new(BUILD_NUMBER_FILE));
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=MEALWISE_BUILD_NUMBER={}", build_number);
    println!("cargo:rustc-env=MEALWISE_BUILD_TIMESTAMP={}", timestamp);
    println!("cargo:rustc-env=MEALWISE_BUILD_PROFILE={}", profile);
}

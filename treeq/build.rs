//! Build script: records the git revision and the versions of the encoding
//! libraries so `treeq --version-verbose` can report them

use std::collections::HashMap;
use std::env;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::process::Command;

/// Libraries listed in the version banner, in display order
const TRACKED: &[&str] = &["serde_yaml", "serde_json", "quick-xml", "toml", "clap"];

fn main() {
    println!("cargo:rerun-if-changed=../.git/HEAD");
    println!("cargo:rerun-if-changed=../.git/index");
    println!("cargo:rerun-if-changed=../Cargo.lock");

    let commit_hash = git(&["rev-parse", "--short", "HEAD"]).unwrap_or_else(|| "unknown".to_string());
    let commit_date = git(&["log", "-1", "--format=%ci"]).unwrap_or_else(|| "unknown".to_string());
    let is_dirty = Command::new("git")
        .args(["status", "--porcelain"])
        .output()
        .map(|o| o.status.success() && !o.stdout.is_empty())
        .unwrap_or(false);
    let dirty_suffix = if is_dirty { "-dirty" } else { "" };

    println!("cargo:rustc-env=TREEQ_GIT_HASH={}{}", commit_hash, dirty_suffix);
    println!("cargo:rustc-env=TREEQ_GIT_DATE={}", commit_date);

    let versions = std::fs::read_to_string("../Cargo.lock")
        .map(|lockfile| parse_cargo_lock(&lockfile))
        .unwrap_or_default();

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is set by cargo");
    let dest_path = Path::new(&out_dir).join("versions.rs");
    let mut f = File::create(&dest_path).expect("cannot create versions.rs");

    writeln!(f, "/// Auto-generated dependency versions from Cargo.lock").unwrap();
    writeln!(f, "pub const DEPENDENCY_VERSIONS: &[(&str, &str)] = &[").unwrap();
    for name in TRACKED {
        if let Some(package) = versions.get(*name) {
            writeln!(f, "    (\"{}\", \"{}\"),", name, package.display_version()).unwrap();
        }
    }
    writeln!(f, "];").unwrap();
}

/// Run git and return trimmed stdout, if any
fn git(args: &[&str]) -> Option<String> {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

struct LockedPackage {
    version: String,
    source: Option<String>,
}

impl LockedPackage {
    fn display_version(&self) -> String {
        match &self.source {
            Some(source) if source.starts_with("git+") => format!("{} (git)", self.version),
            Some(_) => self.version.clone(),
            None => format!("{} (path)", self.version),
        }
    }
}

/// Collect tracked packages from the `[[package]]` blocks of Cargo.lock
fn parse_cargo_lock(content: &str) -> HashMap<String, LockedPackage> {
    let mut versions = HashMap::new();
    let mut name: Option<String> = None;
    let mut version: Option<String> = None;
    let mut source: Option<String> = None;

    let mut record = |name: Option<String>, version: Option<String>, source: Option<String>| {
        if let (Some(name), Some(version)) = (name, version) {
            if TRACKED.contains(&name.as_str()) {
                versions.insert(name, LockedPackage { version, source });
            }
        }
    };

    for line in content.lines().map(str::trim) {
        if line == "[[package]]" {
            record(name.take(), version.take(), source.take());
        } else if let Some(value) = line.strip_prefix("name = ") {
            name = Some(value.trim_matches('"').to_string());
        } else if let Some(value) = line.strip_prefix("version = ") {
            version = Some(value.trim_matches('"').to_string());
        } else if let Some(value) = line.strip_prefix("source = ") {
            source = Some(value.trim_matches('"').to_string());
        }
    }
    record(name, version, source);

    versions
}

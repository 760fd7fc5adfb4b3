//! Version information display

use treeq_core::format::FORMATS;

// Include the auto-generated versions from build.rs
include!(concat!(env!("OUT_DIR"), "/versions.rs"));

/// Package version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git commit hash (set by build.rs)
pub const GIT_HASH: &str = env!("TREEQ_GIT_HASH");

/// Git commit date (set by build.rs)
pub const GIT_DATE: &str = env!("TREEQ_GIT_DATE");

/// Print basic version information
pub fn print_version() {
    println!("treeq {} ({} {})", VERSION, GIT_HASH, GIT_DATE);
}

/// Print version information with library versions and output formats
pub fn print_version_verbose() {
    print_version();
    println!();
    println!("Core libraries:");

    let max_len = DEPENDENCY_VERSIONS.iter().map(|(n, _)| n.len()).max().unwrap_or(0);
    for (name, version) in DEPENDENCY_VERSIONS {
        println!("  {:width$}  {}", name, version, width = max_len);
    }

    println!();
    println!("Output formats:");
    print_formats();
}

/// List output formats with their aliases
pub fn print_formats() {
    let formats: Vec<_> = FORMATS.iter().filter(|f| !f.formal_name.is_empty()).collect();
    let max_len = formats.iter().map(|f| f.formal_name.len()).max().unwrap_or(0);
    for format in formats {
        println!(
            "  {:width$}  {}",
            format.formal_name,
            format.names.join(", "),
            width = max_len
        );
    }
}

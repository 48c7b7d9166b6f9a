//! Command: print version information.

/// Print the mounts version to stdout.
#[allow(clippy::print_stdout)]
pub fn run() {
    let version = option_env!("MOUNTS_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
    println!("mounts {version}");
}

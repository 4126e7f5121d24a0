//! Build identity of vidthumb.
//!
//! `build.rs` embeds git metadata through vergen; the CLI logs [`banner`]
//! at startup and reports it from `vidthumb stats`, so a cache directory can
//! be matched to the binary that filled it.

/// Package version from Cargo.toml.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git branch at build time, or "unknown" outside a checkout.
pub const GIT_BRANCH: &str = match option_env!("VERGEN_GIT_BRANCH") {
    Some(branch) => branch,
    None => "unknown",
};

/// Git commit SHA at build time, or "unknown" outside a checkout.
pub const GIT_SHA: &str = match option_env!("VERGEN_GIT_SHA") {
    Some(sha) => sha,
    None => "unknown",
};

pub fn git_dirty() -> bool {
    option_env!("VERGEN_GIT_DIRTY") == Some("true")
}

fn short_sha() -> &'static str {
    &GIT_SHA[..7.min(GIT_SHA.len())]
}

/// `{version}+{branch}.{sha}`, with `.dirty` appended for uncommitted builds,
/// e.g. `0.1.0+main.abc1234`.
pub fn version_string() -> String {
    let dirty_suffix = if git_dirty() { ".dirty" } else { "" };
    format!("{PKG_VERSION}+{GIT_BRANCH}.{}{dirty_suffix}", short_sha())
}

/// `vidthumb 0.1.0+main.abc1234`
pub fn banner() -> String {
    format!("{} {}", env!("CARGO_PKG_NAME"), version_string())
}

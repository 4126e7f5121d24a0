//! Embeds build metadata for `vidthumb::version_string`.
//!
//! Emits the git branch, short SHA and dirty flag shown by `vidthumb stats`
//! and the CLI startup log. When git metadata cannot be read (a crates.io
//! tarball, say) vergen warns instead of failing the build.

use vergen_gitcl::{Build, Cargo, Emitter, Gitcl};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let build = Build::builder().build_timestamp(true).build();
    let cargo = Cargo::builder().build();
    let gitcl = Gitcl::builder().branch(true).sha(true).dirty(true).build();

    Emitter::default()
        .add_instructions(&build)?
        .add_instructions(&cargo)?
        .add_instructions(&gitcl)?
        .emit()?;

    Ok(())
}

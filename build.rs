use anyhow::{Context, Result};
use fs_extra::dir::{CopyOptions, copy};
use std::env;
use std::path::PathBuf;

/// Mirrors the texture directory into `OUT_DIR` so packaged builds find it next to the artifacts.
fn main() -> Result<()> {
    println!("cargo:rerun-if-changed=assets");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let assets = manifest_dir.join("assets");
    if !assets.is_dir() {
        println!(
            "cargo:warning=no assets/ directory next to Cargo.toml; set HAUNTED_HOUSE_ASSETS at runtime"
        );
        return Ok(());
    }

    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    let options = CopyOptions {
        overwrite: true,
        ..CopyOptions::new()
    };
    copy(&assets, &out_dir, &options)
        .with_context(|| format!("failed to copy {} into {}", assets.display(), out_dir.display()))?;

    Ok(())
}

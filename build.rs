//! Build script - copies the linker script into the output directory
//! so that the linker can find it at link time.
//!
//! Host builds (`cargo test`) skip all of this; only the `embedded`
//! feature needs `memory.x` and the cortex-m-rt / defmt link scripts.

use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    if env::var_os("CARGO_FEATURE_EMBEDDED").is_none() {
        return;
    }

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR set by cargo"));

    // Copy memory.x to OUT_DIR
    fs::copy("memory.x", out_dir.join("memory.x")).expect("memory.x present at crate root");

    // Tell cargo to look for linker scripts in OUT_DIR
    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Rebuild if the linker script changes
    println!("cargo:rerun-if-changed=memory.x");
}

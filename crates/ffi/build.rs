//! Generates `solarpack.h` for the C ABI.
//!
//! The header always lands in `OUT_DIR`. Set `SOLARPACK_HEADER_DIR` to also
//! copy it somewhere a C build can pick it up.

use std::env;
use std::path::{Path, PathBuf};

const HEADER: &str = "solarpack.h";

fn main() {
    println!("cargo:rerun-if-changed=src/api.rs");
    println!("cargo:rerun-if-changed=src/types.rs");
    println!("cargo:rerun-if-changed=cbindgen.toml");
    println!("cargo:rerun-if-env-changed=SOLARPACK_HEADER_DIR");

    let crate_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo");
    let out_dir = env::var("OUT_DIR").expect("OUT_DIR must be set by Cargo");
    let config = cbindgen::Config::from_file(Path::new(&crate_dir).join("cbindgen.toml"))
        .unwrap_or_default();

    let bindings = match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_config(config)
        .generate()
    {
        Ok(bindings) => bindings,
        Err(e) => {
            // Header generation is optional for Rust consumers.
            println!("cargo:warning=skipping {}: {}", HEADER, e);
            return;
        }
    };

    let mut targets = vec![PathBuf::from(&out_dir).join(HEADER)];
    if let Some(dir) = env::var_os("SOLARPACK_HEADER_DIR") {
        targets.push(PathBuf::from(dir).join(HEADER));
    }
    for path in targets {
        bindings.write_to_file(&path);
    }
}

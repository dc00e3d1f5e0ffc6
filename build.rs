fn main() {
    let crate_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap();

    // Regenerate the C header for the FFI surface when possible; header
    // generation failing (e.g. during cross-checks) is not a build error.
    match cbindgen::generate(&crate_dir) {
        Ok(bindings) => {
            bindings.write_to_file("include/readtrj_core.h");
        }
        Err(e) => {
            println!("cargo:warning=cbindgen failed, C header not regenerated: {e}");
        }
    }
    println!("cargo:rerun-if-changed=src/ffi.rs");
}

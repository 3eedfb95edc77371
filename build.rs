use rustc_version::version;

fn main() {
    // Get the version of Rust used to compile, this is exposed as a label on
    // the stub_status_exporter_build_info metric.
    let v = version().expect("rustc version");
    println!("cargo:rustc-env=RUSTC_VERSION={v}");
    println!("cargo:rerun-if-changed=build.rs");
}

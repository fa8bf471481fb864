use std::env;
use std::fs;
use std::path::Path;

use cargo_toml::Manifest;

const CORE_PACKAGE: &str = "espcompose-core";

fn main() {
    println!("cargo::rerun-if-changed=build.rs");
    println!("cargo::rerun-if-changed=Cargo.toml");

    let manifest_dir = env::var_os("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR is set by cargo");
    let toml_path = Path::new(&manifest_dir).join("Cargo.toml");
    let cargo_toml = Manifest::from_path(toml_path).expect("Cargo.toml is readable");

    // Every device crate exports `descriptors()`.
    let device_packages = cargo_toml
        .dependencies
        .keys()
        .filter(|name| name.starts_with("espcompose-") && name.as_str() != CORE_PACKAGE)
        .map(|name| name.replace('-', "_"))
        .collect::<Vec<_>>();

    let registrations = device_packages
        .iter()
        .map(|p| format!("        .extend({}::descriptors())", p))
        .collect::<Vec<_>>()
        .join("\n");

    let out_dir = env::var_os("OUT_DIR").expect("OUT_DIR is set by cargo");
    let dest_path = Path::new(&out_dir).join("registry.rs");
    fs::write(
        &dest_path,
        format!(
            "/// Registry holding every device crate this binary was built with.
pub fn builtin_registry() -> espcompose_core::Registry {{
    espcompose_core::Registry::builder()
{}
        .build()
}}
",
            registrations
        ),
    )
    .expect("registry.rs is writable");
}

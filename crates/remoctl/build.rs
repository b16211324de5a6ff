// Build script for remoctl - embeds version at compile time

fn main() {
    // Release pipelines may stamp a version; otherwise use Cargo.toml
    let version =
        std::env::var("REMOCTL_VERSION").unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string());

    println!("cargo:rustc-env=REMOCTL_VERSION={}", version);

    println!("cargo:rerun-if-changed=Cargo.toml");
    println!("cargo:rerun-if-env-changed=REMOCTL_VERSION");
}

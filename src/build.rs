// Embeds the release version in the binary at compile time, e.g.
// VERSION=1.0.0-rc20250610 cargo build --release

fn main() {
    let version = std::env::var("VERSION").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rerun-if-changed=src/build.rs");
    println!("cargo:rerun-if-env-changed=VERSION");
    println!("cargo:rustc-env=LEARNING_ASSISTANT_VERSION={}", version);
}

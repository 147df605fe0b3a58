use std::env;

fn main() {
    // Host builds (tests, docs) have no ESP-IDF environment to forward
    if env::var_os("CARGO_FEATURE_BOARD").is_some() {
        embuild::espidf::sysenv::output();
    }
    println!("cargo:rerun-if-changed=build.rs");
}

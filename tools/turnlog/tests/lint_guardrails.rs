use std::path::{Path, PathBuf};

use toml::Value;

fn read_manifest(path: &Path) -> Value {
    let text = std::fs::read_to_string(path)
        .unwrap_or_else(|_| panic!("failed to read manifest: {}", path.display()));
    toml::from_str(&text).expect("manifest should parse as TOML")
}

fn clippy_level<'a>(table: Option<&'a Value>, lint: &str) -> Option<&'a str> {
    table
        .and_then(|lints| lints.get("clippy"))
        .and_then(|clippy| clippy.get(lint))
        .and_then(Value::as_str)
}

#[test]
fn workspace_denies_unwrap_in_library_code() {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.pop();
    path.pop();
    path.push("Cargo.toml");
    let manifest = read_manifest(&path);
    let lints = manifest.get("workspace").and_then(|w| w.get("lints"));
    assert_eq!(clippy_level(lints, "unwrap_used"), Some("deny"));
    assert_eq!(clippy_level(lints, "identity_op"), Some("deny"));
}

#[test]
fn package_warns_on_expect() {
    let manifest = read_manifest(&Path::new(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml"));
    assert_eq!(clippy_level(manifest.get("lints"), "expect_used"), Some("warn"));
}

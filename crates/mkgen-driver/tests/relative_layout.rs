//! `mkgen . out`: roots given relative to the working directory.
//!
//! Kept in its own test binary because it changes the process's current
//! directory.

use mkgen_build::Layout;
use mkgen_driver::Driver;
use std::fs;

#[test]
fn test_relative_build_root_is_not_scanned() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    fs::write(dir.path().join("a.cc"), "int main() { return 0; }\n").unwrap();
    fs::create_dir_all(dir.path().join("out")).unwrap();
    fs::write(dir.path().join("out/stale.h"), "").unwrap();
    fs::write(dir.path().join("out/gen.pb.cc"), "").unwrap();

    std::env::set_current_dir(dir.path()).unwrap();
    let generated = Driver::new(Layout::new(".", "out")).generate().unwrap();

    assert!(!generated.text.contains("stale"), "{}", generated.text);
    assert!(!generated.text.contains("gen.pb"), "{}", generated.text);
    assert!(!generated.text.contains("out/out"), "{}", generated.text);
    assert_eq!(generated.directories, vec!["out".to_string()]);
    assert_eq!(generated.executables, vec!["out/a".to_string()]);
}

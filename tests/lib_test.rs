//! Library integration tests.

use std::fs;
use std::path::Path;

use matlab_runtime::{find_runtime, resolve_prefix, uninstall, RuntimeError};
use tempfile::TempDir;

fn fake_runtime(prefix: &Path, release: &str) {
    let root = prefix.join(release);
    fs::create_dir_all(&root).unwrap();
    fs::write(
        root.join("VersionInfo.xml"),
        format!("<MathWorks_version_info><release>{release}</release></MathWorks_version_info>"),
    )
    .unwrap();
}

#[test]
fn error_types_are_public() {
    let err = RuntimeError::UnknownVersion {
        version: "R2099a".into(),
        message: "not in the catalog".into(),
    };
    assert!(err.to_string().contains("R2099a"));
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn result_type_alias_is_public() {
    fn test_fn() -> matlab_runtime::Result<()> {
        Ok(())
    }
    assert!(test_fn().is_ok());
}

#[test]
fn explicit_prefix_wins() {
    let temp = TempDir::new().unwrap();
    assert_eq!(resolve_prefix(Some(temp.path())).unwrap(), temp.path());
}

#[test]
fn uninstall_all_on_empty_prefix_is_noop() {
    let temp = TempDir::new().unwrap();
    let versions: [&str; 0] = [];
    uninstall(&versions, Some(&temp.path().join("missing")), false).unwrap();
}

#[cfg(unix)]
#[test]
fn uninstall_removes_named_release() {
    let temp = TempDir::new().unwrap();
    fake_runtime(temp.path(), "R2021b");
    fake_runtime(temp.path(), "R2022a");

    uninstall(&["R2021b"], Some(temp.path()), true).unwrap();

    assert!(!temp.path().join("R2021b").exists());
    assert!(temp.path().join("R2022a").exists());
}

#[test]
fn find_runtime_looks_in_prefix() {
    let temp = TempDir::new().unwrap();
    fake_runtime(temp.path(), "R2023b");

    let found = find_runtime("R2023b".parse().unwrap(), Some(temp.path())).unwrap();
    assert_eq!(found, Some(temp.path().join("R2023b")));
}

use std::path::PathBuf;

use spindle::resolve::{resolve, ResolveError};
use tempfile::TempDir;

/// Builds `<tmp>/www` with a few files and a sibling `<tmp>/www2`.
fn layout() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("www");
    std::fs::create_dir_all(root.join("sub")).unwrap();
    std::fs::write(root.join("a.txt"), "a").unwrap();
    std::fs::write(root.join("sub").join("my file.txt"), "b").unwrap();
    std::fs::create_dir_all(dir.path().join("www2")).unwrap();
    std::fs::write(dir.path().join("www2").join("x"), "secret").unwrap();
    let root = root.canonicalize().unwrap();
    (dir, root)
}

#[tokio::test]
async fn test_resolve_file_inside_root() {
    let (_dir, root) = layout();

    let path = resolve("/a.txt", &root).await.unwrap();

    assert_eq!(path, root.join("a.txt"));
}

#[tokio::test]
async fn test_resolve_root_itself() {
    let (_dir, root) = layout();

    assert_eq!(resolve("/", &root).await.unwrap(), root);
}

#[tokio::test]
async fn test_resolve_collapses_dot_segments_inside_root() {
    let (_dir, root) = layout();

    let path = resolve("/sub/../a.txt", &root).await.unwrap();

    assert_eq!(path, root.join("a.txt"));
}

#[tokio::test]
async fn test_resolve_percent_decodes() {
    let (_dir, root) = layout();

    let path = resolve("/sub/my%20file.txt", &root).await.unwrap();

    assert_eq!(path, root.join("sub").join("my file.txt"));
}

#[tokio::test]
async fn test_resolve_missing_is_not_found() {
    let (_dir, root) = layout();

    let result = resolve("/nosuch", &root).await;

    assert!(matches!(result, Err(ResolveError::NotFound { .. })));
}

#[tokio::test]
async fn test_resolve_rejects_parent_escape() {
    let (_dir, root) = layout();

    assert!(resolve("/../etc/passwd", &root).await.is_err());
    assert!(matches!(
        resolve("/..", &root).await,
        Err(ResolveError::OutsideRoot { .. })
    ));
}

#[tokio::test]
async fn test_resolve_rejects_sibling_sharing_string_prefix() {
    let (_dir, root) = layout();

    let result = resolve("/../www2/x", &root).await;

    assert!(matches!(result, Err(ResolveError::OutsideRoot { .. })));
}

#[tokio::test]
async fn test_resolve_rejects_encoded_escape() {
    let (_dir, root) = layout();

    let result = resolve("/%2e%2e/www2/x", &root).await;

    assert!(matches!(result, Err(ResolveError::OutsideRoot { .. })));
}

#[tokio::test]
async fn test_resolve_rejects_symlink_out_of_root() {
    let (dir, root) = layout();
    std::os::unix::fs::symlink(dir.path().join("www2"), root.join("escape")).unwrap();

    let result = resolve("/escape/x", &root).await;

    assert!(matches!(result, Err(ResolveError::OutsideRoot { .. })));
}

#[tokio::test]
async fn test_resolve_invalid_utf8_after_decoding() {
    let (_dir, root) = layout();

    let result = resolve("/%ff", &root).await;

    assert!(matches!(result, Err(ResolveError::InvalidEncoding { .. })));
}

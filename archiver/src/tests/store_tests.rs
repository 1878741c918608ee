use tempfile::TempDir;

use crate::store::{ContentStore, EntryKind};

#[test]
fn test_write_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let store = ContentStore::new(dir.path());

    store
        .write(&["jtwc_products", "text", "latest-wp1520web.txt"], b"WTPN31 PGTW")
        .unwrap();

    assert!(store.exists(&["jtwc_products", "text"]));
    assert_eq!(
        store
            .read(&["jtwc_products", "text", "latest-wp1520web.txt"])
            .unwrap(),
        Some(b"WTPN31 PGTW".to_vec())
    );
    assert_eq!(
        store.path(&["jtwc_products", "text"]),
        dir.path().join("jtwc_products").join("text")
    );
}

#[test]
fn test_read_missing_file() {
    let dir = TempDir::new().unwrap();
    let store = ContentStore::new(dir.path());

    assert!(!store.exists(&["jtwc.rss"]));
    assert_eq!(store.read(&["jtwc.rss"]).unwrap(), None);
}

#[test]
fn test_write_replaces_content_without_leftovers() {
    let dir = TempDir::new().unwrap();
    let store = ContentStore::new(dir.path());

    store.write(&["gif", "latest-wp1520.gif"], b"first").unwrap();
    store.write(&["gif", "latest-wp1520.gif"], b"second").unwrap();

    assert_eq!(
        store.read(&["gif", "latest-wp1520.gif"]).unwrap(),
        Some(b"second".to_vec())
    );
    let names: Vec<String> = store
        .list(&["gif"])
        .unwrap()
        .into_iter()
        .map(|entry| entry.name)
        .collect();
    assert_eq!(names, vec!["latest-wp1520.gif"]);
}

#[test]
fn test_list_reports_kinds() {
    let dir = TempDir::new().unwrap();
    let store = ContentStore::new(dir.path());
    store.write(&["products", "text", "a.txt"], b"a").unwrap();
    store.write(&["products", "b.txt"], b"b").unwrap();

    let mut entries = store.list(&["products"]).unwrap();
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "b.txt");
    assert_eq!(entries[0].kind, EntryKind::File);
    assert_eq!(entries[1].name, "text");
    assert_eq!(entries[1].kind, EntryKind::Dir);
}

#[test]
fn test_list_missing_directory_is_empty() {
    let dir = TempDir::new().unwrap();
    let store = ContentStore::new(dir.path());

    assert!(store.list(&["jtwc_products"]).unwrap().is_empty());
}

#[test]
fn test_remove() {
    let dir = TempDir::new().unwrap();
    let store = ContentStore::new(dir.path());
    store.write(&["old.txt"], b"old").unwrap();

    store.remove(&["old.txt"]).unwrap();

    assert!(!store.exists(&["old.txt"]));
    assert!(store.remove(&["old.txt"]).is_err());
}

#[cfg(unix)]
#[test]
fn test_written_files_are_world_readable() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let store = ContentStore::new(dir.path());
    store.write(&["gif", "latest-wp1520.gif"], b"GIF89a").unwrap();

    let mode = std::fs::metadata(store.path(&["gif", "latest-wp1520.gif"]))
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o644);
}

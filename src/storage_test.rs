use super::*;

// =============================================================================
// MemoryStorage
// =============================================================================

#[test]
fn memory_get_missing_is_none() {
    let store = MemoryStorage::new();
    assert_eq!(store.get("absent"), None);
    assert!(store.is_empty());
}

#[test]
fn memory_set_then_get() {
    let store = MemoryStorage::new();
    store.set("k", "v");
    assert_eq!(store.get("k").as_deref(), Some("v"));
    store.set("k", "w");
    assert_eq!(store.get("k").as_deref(), Some("w"));
    assert_eq!(store.len(), 1);
}

#[test]
fn memory_remove_absent_is_noop() {
    let store = MemoryStorage::new();
    store.remove("absent");
    store.set("k", "v");
    store.remove("k");
    store.remove("k");
    assert!(store.is_empty());
}

#[test]
fn memory_batch_operations() {
    let store = MemoryStorage::new();
    store.set_all(&[("a", "1"), ("b", "2")]);
    assert_eq!(store.len(), 2);
    store.remove_all(&["a", "b", "c"]);
    assert!(store.is_empty());
}

// =============================================================================
// FileStorage
// =============================================================================

#[test]
fn file_missing_opens_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStorage::open(dir.path().join("session.json"));
    assert_eq!(store.get("anything"), None);
}

#[test]
fn file_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    {
        let store = FileStorage::open(&path);
        store.set_all(&[("token", "abc"), ("user", "{}")]);
    }
    let reopened = FileStorage::open(&path);
    assert_eq!(reopened.get("token").as_deref(), Some("abc"));
    assert_eq!(reopened.get("user").as_deref(), Some("{}"));
}

#[test]
fn file_remove_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let store = FileStorage::open(&path);
    store.set("token", "abc");
    store.remove("token");
    assert_eq!(FileStorage::open(&path).get("token"), None);
}

#[test]
fn file_creates_missing_parent_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("deeper").join("session.json");
    let store = FileStorage::open(&path);
    store.set("token", "abc");
    assert!(path.exists());
    assert_eq!(store.path(), path.as_path());
}

#[test]
fn file_malformed_opens_empty_and_recovers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "{not json").unwrap();

    let store = FileStorage::open(&path);
    assert_eq!(store.get("token"), None);

    store.set("token", "fresh");
    assert_eq!(FileStorage::open(&path).get("token").as_deref(), Some("fresh"));
}

#[test]
fn file_blank_opens_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "  \n").unwrap();
    assert_eq!(FileStorage::open(&path).get("token"), None);
}

// =============================================================================
// write_batch
// =============================================================================

#[test]
fn batch_rejected_write_rolls_back_earlier_keys() {
    let store = MemoryStorage::new();
    let landed = write_batch(
        &[("auth_token", "tok"), ("auth_user", "{}")],
        |key, value| {
            if key == "auth_user" {
                return false;
            }
            store.set(key, value);
            true
        },
        |key| store.remove(key),
    );

    assert!(!landed);
    assert_eq!(store.get("auth_token"), None);
    assert_eq!(store.get("auth_user"), None);
}

#[test]
fn batch_all_accepted_keeps_everything() {
    let store = MemoryStorage::new();
    let landed = write_batch(
        &[("a", "1"), ("b", "2")],
        |key, value| {
            store.set(key, value);
            true
        },
        |key| store.remove(key),
    );

    assert!(landed);
    assert_eq!(store.get("a").as_deref(), Some("1"));
    assert_eq!(store.get("b").as_deref(), Some("2"));
}

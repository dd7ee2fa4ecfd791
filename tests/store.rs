// tests/store.rs

use workdag::store::Store;

#[test]
fn set_get_delete() {
    let store: Store<String, String> = Store::new();
    assert!(store.is_empty());

    assert_eq!(store.set("a".into(), "1".into()), None);
    assert_eq!(store.set("a".into(), "2".into()), Some("1".to_string()));
    assert_eq!(store.get("a").as_deref(), Some("2"));
    assert!(store.contains("a"));
    assert_eq!(store.len(), 1);

    assert_eq!(store.delete("a").as_deref(), Some("2"));
    assert!(!store.contains("a"));
    assert_eq!(store.get("a"), None);
}

#[test]
fn clones_share_entries() {
    let store: Store<String, u32> = Store::new();
    let other = store.clone();

    other.set("x".into(), 7);
    assert_eq!(store.get("x"), Some(7));

    let mut keys = store.keys();
    keys.sort();
    assert_eq!(keys, vec!["x".to_string()]);
    assert_eq!(store.snapshot(), vec![("x".to_string(), 7)]);
}

#[tokio::test]
async fn concurrent_writers_do_not_lose_updates() {
    let store: Store<usize, usize> = Store::new();
    let mut handles = Vec::new();

    for worker in 0..8 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..100 {
                store.set(worker * 100 + i, i);
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(store.len(), 800);
    assert_eq!(store.get(&742), Some(42));
}

//! Behavior shared by both persistence backends

use seedcrawl::config::{BackendKind, StorageConfig};
use seedcrawl::storage::{open_backend, Backend};
use std::sync::Arc;
use tempfile::TempDir;

fn open(dir: &TempDir, backend: BackendKind) -> Arc<dyn Backend> {
    let config = StorageConfig {
        backend,
        path: dir.path().join("fs"),
        database_path: dir.path().join("crawler.db"),
    };
    open_backend(&config).unwrap()
}

fn each_backend(check: impl Fn(BackendKind, Arc<dyn Backend>)) {
    for kind in [BackendKind::Filesystem, BackendKind::Sqlite] {
        let dir = TempDir::new().unwrap();
        check(kind, open(&dir, kind));
    }
}

#[test]
fn test_lookups_on_empty_backend() {
    each_backend(|kind, backend| {
        assert_eq!(backend.load_content("http://a/").unwrap(), None, "{}", kind);
        assert_eq!(backend.get_redirect("http://a/").unwrap(), "http://a/", "{}", kind);
        assert!(!backend.is_error("http://a/").unwrap(), "{}", kind);
    });
}

#[test]
fn test_later_content_write_overwrites() {
    each_backend(|kind, backend| {
        backend.save_content("http://a/", b"original").unwrap();
        backend.save_content("http://a/", b"replacement").unwrap();
        assert_eq!(
            backend.load_content("http://a/").unwrap(),
            Some(b"replacement".to_vec()),
            "{}",
            kind
        );
    });
}

#[test]
fn test_redirect_semantics() {
    each_backend(|kind, backend| {
        backend.add_redirect("http://a/", "http://a/").unwrap();
        assert_eq!(backend.get_redirect("http://a/").unwrap(), "http://a/", "{}", kind);

        backend.add_redirect("http://a/", "https://www.a/").unwrap();
        backend.add_redirect("http://a/", "https://www.a/home").unwrap();
        assert_eq!(
            backend.get_redirect("http://a/").unwrap(),
            "https://www.a/home",
            "{}",
            kind
        );
    });
}

#[test]
fn test_error_set_semantics() {
    each_backend(|kind, backend| {
        backend.add_error("http://bad/").unwrap();
        backend.add_error("http://bad/").unwrap();
        assert!(backend.is_error("http://bad/").unwrap(), "{}", kind);
        assert!(!backend.is_error("http://bad/other").unwrap(), "{}", kind);
    });
}

#[test]
fn test_unicode_urls() {
    each_backend(|kind, backend| {
        let url = "http://bäckerei.de/öffnungszeiten";
        backend.save_content(url, "Grüße".as_bytes()).unwrap();
        backend.add_redirect(url, "http://bäckerei.de/zeiten/").unwrap();
        backend.add_error("http://bäckerei.de/kaputt").unwrap();

        assert_eq!(
            backend.load_content(url).unwrap(),
            Some("Grüße".as_bytes().to_vec()),
            "{}",
            kind
        );
        assert_eq!(
            backend.get_redirect(url).unwrap(),
            "http://bäckerei.de/zeiten/",
            "{}",
            kind
        );
        assert!(backend.is_error("http://bäckerei.de/kaputt").unwrap(), "{}", kind);
    });
}

#[test]
fn test_state_survives_reopen() {
    for kind in [BackendKind::Filesystem, BackendKind::Sqlite] {
        let dir = TempDir::new().unwrap();
        {
            let backend = open(&dir, kind);
            backend.save_content("http://a/", b"body").unwrap();
            backend.add_redirect("http://a/", "http://b/").unwrap();
            backend.add_error("http://bad/").unwrap();
        }

        let backend = open(&dir, kind);
        assert_eq!(backend.load_content("http://a/").unwrap(), Some(b"body".to_vec()), "{}", kind);
        assert_eq!(backend.get_redirect("http://a/").unwrap(), "http://b/", "{}", kind);
        assert!(backend.is_error("http://bad/").unwrap(), "{}", kind);
    }
}

#[test]
fn test_concurrent_writers() {
    each_backend(|kind, backend| {
        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let backend = Arc::clone(&backend);
                std::thread::spawn(move || {
                    for i in 0..25 {
                        let url = format!("http://site/{}/{}", worker, i);
                        backend.save_content(&url, url.as_bytes()).unwrap();
                        backend.add_error(&format!("http://site/shared/{}", i)).unwrap();
                        backend.add_redirect(&url, &format!("{}/", url)).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        for worker in 0..8 {
            for i in 0..25 {
                let url = format!("http://site/{}/{}", worker, i);
                assert_eq!(
                    backend.load_content(&url).unwrap(),
                    Some(url.as_bytes().to_vec()),
                    "{}",
                    kind
                );
                assert_eq!(backend.get_redirect(&url).unwrap(), format!("{}/", url));
            }
        }
        assert!(backend.is_error("http://site/shared/24").unwrap(), "{}", kind);
    });
}

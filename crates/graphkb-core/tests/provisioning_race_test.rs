//! Concurrency scenarios: first-time access to an unseen cache key must
//! construct the resource exactly once, with every racer observing the same
//! instance.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use graphkb_core::{KbRegistry, PluginRegistry, SlotId, TermRecognizer};
use graphkb_memstore::{MemstoreBackend, MEMSTORE_BACKEND_ID};

const THREADS: usize = 8;

fn racing_core(root: &std::path::Path, plugins: PluginRegistry) -> Arc<KbRegistry> {
    let toml = format!(
        r#"
        [data]
        root-dir = "{}"

        [index-store.factory]
        class = "graphkb.backend.memstore"

        [kb.wiki]
        enabled = true
        language = "en"
        recognizer.class = "test.counting-recognizer"

        [kb.wiki.model.entities.provider]
        class = "graphkb.provider.fixture"
        "#,
        root.display()
    );
    let settings = graphkb_core::Settings::from_toml_str(&toml).unwrap();
    KbRegistry::new(settings, plugins).unwrap()
}

#[test]
fn racing_directory_access_opens_the_store_once() {
    let dir = tempfile::tempdir().unwrap();
    let mut plugins = PluginRegistry::new();
    plugins.register_backend(MEMSTORE_BACKEND_ID, Arc::new(MemstoreBackend::new()));
    plugins.register_recognizer("test.counting-recognizer", |language, _core| {
        Ok(Arc::new(TermRecognizer::new(language)))
    });
    let core = racing_core(dir.path(), plugins);

    let slot = SlotId::new("wiki", "facts");
    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let core = Arc::clone(&core);
            let slot = slot.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                core.get_directory(&slot).unwrap()
            })
        })
        .collect();

    // sled refuses a second open on the same path; any double construction
    // would fail one of the joins.
    let handles: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for db in &handles[1..] {
        assert!(Arc::ptr_eq(&handles[0], db));
    }
}

#[test]
fn racing_recognizer_access_invokes_the_constructor_once() {
    let dir = tempfile::tempdir().unwrap();
    let constructions = Arc::new(AtomicUsize::new(0));

    let mut plugins = PluginRegistry::new();
    plugins.register_backend(MEMSTORE_BACKEND_ID, Arc::new(MemstoreBackend::new()));
    let counter = Arc::clone(&constructions);
    plugins.register_recognizer("test.counting-recognizer", move |language, _core| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(TermRecognizer::new(language)))
    });
    let core = racing_core(dir.path(), plugins);

    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let core = Arc::clone(&core);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                core.get_entity_recognizer("wiki").unwrap()
            })
        })
        .collect();

    let recognizers: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(constructions.load(Ordering::SeqCst), 1);
    for recognizer in &recognizers[1..] {
        assert!(Arc::ptr_eq(&recognizers[0], recognizer));
    }
}

//! Plugin resolution failures: unregistered identifiers surface as wrapped
//! instantiation errors naming the offending plugin.

use std::sync::Arc;

use graphkb_core::{KbError, KbRegistry, PluginRegistry, Settings, SlotId};
use graphkb_memstore::{MemstoreBackend, MEMSTORE_BACKEND_ID};

fn settings(root: &std::path::Path, backend_id: &str) -> Settings {
    let toml = format!(
        r#"
        [data]
        root-dir = "{}"

        [index-store.factory]
        class = "{backend_id}"

        [kb.wiki]
        enabled = true
        language = "en"
        recognizer.class = "test.unregistered-recognizer"

        [kb.wiki.model.entities.provider]
        class = "test.unregistered-provider"
        "#,
        root.display()
    );
    Settings::from_toml_str(&toml).unwrap()
}

#[test]
fn unknown_backend_fails_registry_construction() {
    let dir = tempfile::tempdir().unwrap();
    let err =
        KbRegistry::new(settings(dir.path(), "test.no-such-backend"), PluginRegistry::new())
            .unwrap_err();
    match err {
        KbError::PluginInstantiationFailed { what, .. } => {
            assert_eq!(what, "test.no-such-backend");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unknown_provider_class_fails_provider_creation() {
    let dir = tempfile::tempdir().unwrap();
    let mut plugins = PluginRegistry::new();
    plugins.register_backend(MEMSTORE_BACKEND_ID, Arc::new(MemstoreBackend::new()));
    let core = KbRegistry::new(settings(dir.path(), MEMSTORE_BACKEND_ID), plugins).unwrap();
    core.initialize().unwrap();

    let err = core
        .create_data_provider(&SlotId::new("wiki", "entities"))
        .unwrap_err();
    assert!(matches!(err, KbError::PluginInstantiationFailed { .. }));
}

#[test]
fn unknown_recognizer_class_fails_recognizer_access() {
    let dir = tempfile::tempdir().unwrap();
    let mut plugins = PluginRegistry::new();
    plugins.register_backend(MEMSTORE_BACKEND_ID, Arc::new(MemstoreBackend::new()));
    let core = KbRegistry::new(settings(dir.path(), MEMSTORE_BACKEND_ID), plugins).unwrap();
    core.initialize().unwrap();

    let err = core.get_entity_recognizer("wiki").unwrap_err();
    assert!(matches!(err, KbError::PluginInstantiationFailed { .. }));
}

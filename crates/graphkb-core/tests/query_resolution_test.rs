//! Full pipeline: ingest entities, recognize a mention in free text, resolve
//! it against the slot's searcher, and record it in a query builder's ledger.

use std::sync::Arc;

use graphkb_core::{
    BindingKind, DataModelBinding, GraphQueryBuilder, KbRegistry, PluginRegistry, ProviderCtor,
    QueryPlanPatterns, QueryType, Settings, SlotId, TriplePattern,
};
use graphkb_memstore::{
    FixtureProviderFactory, MemstoreBackend, FIXTURE_PROVIDER_ID, MEMSTORE_BACKEND_ID,
};

fn resolution_core(root: &std::path::Path) -> Arc<KbRegistry> {
    let toml = format!(
        r#"
        [data]
        root-dir = "{}"

        [index-store.factory]
        class = "graphkb.backend.memstore"

        [kb.wiki]
        enabled = true
        language = "en"

        [kb.wiki.model.entities.provider]
        class = "graphkb.provider.fixture"
        records = [
            {{ iri = "dbr:Berlin", label = "Berlin" }},
            {{ iri = "dbr:Germany", label = "Germany" }},
        ]
        "#,
        root.display()
    );
    let settings = Settings::from_toml_str(&toml).unwrap();
    let mut plugins = PluginRegistry::new();
    plugins.register_backend(MEMSTORE_BACKEND_ID, Arc::new(MemstoreBackend::new()));
    plugins.register_provider(
        FIXTURE_PROVIDER_ID,
        ProviderCtor::Internal(FixtureProviderFactory::boxed),
    );
    KbRegistry::new(settings, plugins).unwrap()
}

#[test]
fn mentions_resolve_into_the_query_builders_ledger() {
    let dir = tempfile::tempdir().unwrap();
    let core = resolution_core(dir.path());
    core.initialize().unwrap();
    core.get_loader("wiki").load_all("entities").unwrap();

    let patterns = QueryPlanPatterns::new(vec![TriplePattern::new("P1", "P2", "?X")]);
    let bindings = vec![
        DataModelBinding::new("P1", "Berlin", BindingKind::Instance),
        DataModelBinding::new("P2", "capital of", BindingKind::Property),
    ];
    let builder = GraphQueryBuilder::new(QueryType::Select, patterns, bindings).unwrap();
    assert_eq!(
        builder.query(),
        "SELECT * WHERE {\n { :Berlin :capital_of ?X } \n}"
    );

    let recognizer = core.get_entity_recognizer("wiki").unwrap();
    let mentions = recognizer.recognize("is Berlin the capital?");
    assert_eq!(mentions.len(), 1);

    let searcher = core.get_searcher(&SlotId::new("wiki", "entities")).unwrap();
    let binding = builder.binding("P1").unwrap().clone();
    for hit in searcher.search(&mentions[0].text).unwrap() {
        builder.update(&binding, hit);
    }

    assert!(builder.is_resolved(&binding));
    let resolved = builder.resolved(&binding).unwrap();
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].iri, "dbr:Berlin");
    assert!(!builder.is_resolved(builder.binding("P2").unwrap()));

    core.terminate().unwrap();
}

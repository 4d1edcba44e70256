//! Integration tests for the composed application's lifecycle.

mod common;

use std::sync::Arc;

use winext_core::{Registerable, StoreBackend};
use winext_runtime::{ModelRefs, compose};

use common::{Journal, Recorder, declared_all, full_registry, full_sandbox};

#[tokio::test]
async fn only_server_start_performs_io() {
    let journal = Arc::new(Journal::default());
    let app = compose(
        &full_registry(&journal),
        &full_sandbox(),
        &declared_all(),
        &ModelRefs::default(),
    )
    .unwrap();
    assert!(journal.events_with("io:").is_empty());

    let server = app.server().unwrap();
    server.start().await.unwrap();
    assert_eq!(journal.events_with("io:"), vec!["io:server"]);

    server.stop().await.unwrap();
    assert_eq!(journal.events_with("io:"), vec!["io:server"]);
    assert_eq!(
        journal.events_with("st"),
        vec!["start:server", "stop:server"]
    );
}

#[tokio::test]
async fn run_until_starts_stores_before_server_and_stops_in_reverse() {
    let journal = Arc::new(Journal::default());
    let app = compose(
        &full_registry(&journal),
        &full_sandbox(),
        &declared_all(),
        &ModelRefs::default(),
    )
    .unwrap();

    app.run_until(async {}).await.unwrap();

    assert_eq!(
        journal.events_with("st"),
        vec![
            "start:repo:document",
            "start:repo:relational",
            "start:repo:graph",
            "start:redis",
            "start:server",
            "stop:server",
            "stop:redis",
            "stop:repo:graph",
            "stop:repo:relational",
            "stop:repo:document",
        ]
    );
}

#[tokio::test]
async fn repo_store_backends_start_independently() {
    let journal = Arc::new(Journal::default());
    let app = compose(
        &full_registry(&journal),
        &full_sandbox(),
        &declared_all(),
        &ModelRefs::default(),
    )
    .unwrap();

    let repo = app.repo_store().unwrap();
    repo.start(StoreBackend::Relational).await.unwrap();
    repo.stop(StoreBackend::Relational).await.unwrap();

    assert_eq!(
        journal.events_with("st"),
        vec!["start:repo:relational", "stop:repo:relational"]
    );

    // Sub-store handles are the ones that were registered.
    let before = journal.events_with("register:").len();
    repo.sub_store(StoreBackend::Graph)
        .register(&winext_core::Bundle::new(
            "data_graphql_trigger",
            winext_core::TraceContext::default(),
        ))
        .unwrap();
    assert_eq!(journal.events_with("register:").len(), before + 1);
}

#[tokio::test]
async fn failed_server_start_stops_started_stores() {
    let journal = Arc::new(Journal::default());
    let registry =
        full_registry(&journal).with_server(Recorder::failing_start("server", &journal));
    let app = compose(
        &registry,
        &full_sandbox(),
        &declared_all(),
        &ModelRefs::default(),
    )
    .unwrap();

    let err = app.run_until(async {}).await.unwrap_err();
    assert!(err.to_string().contains("port in use"));

    assert_eq!(
        journal.events_with("st"),
        vec![
            "start:repo:document",
            "start:repo:relational",
            "start:repo:graph",
            "start:redis",
            "start:server",
            "stop:redis",
            "stop:repo:graph",
            "stop:repo:relational",
            "stop:repo:document",
        ]
    );
    assert!(journal.events_with("io:").is_empty());
}

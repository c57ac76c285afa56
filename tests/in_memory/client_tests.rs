//! The per-kind client facade.

use std::sync::Arc;
use std::time::Duration;

use super::helpers::{POLL_INTERVAL, generous};
use serde_json::json;
use stratus::association::{adapters::memory::InMemoryAssociationStore, ports::AssociationStore};
use stratus::client::CloudClient;
use stratus::config::ClientConfig;
use stratus::lifecycle::{
    adapters::InMemoryRemoteApi,
    domain::ContinuationToken,
    services::AssociationSource,
};

#[tokio::test(flavor = "multi_thread")]
async fn controllers_share_the_api_but_not_associations() {
    let api = Arc::new(
        InMemoryRemoteApi::default()
            .with_auto_complete(1)
            .expect("auto-complete configured"),
    );
    let store = InMemoryAssociationStore::new();
    let client = CloudClient::from_parts(Arc::clone(&api), &store, POLL_INTERVAL);

    let mut token = ContinuationToken::empty();
    let account = client
        .cloud_accounts()
        .create(&generous(), &mut token, &json!({"name": "acct"}))
        .await
        .expect("create succeeds")
        .complete()
        .expect("create completes");

    assert_eq!(
        client.cloud_accounts().list().await.expect("list"),
        vec![account.primary_id().clone()]
    );
    assert!(client.subscriptions().list().await.expect("list").is_empty());
    assert!(store.keys().await.expect("root keys").is_empty());
    assert!(Arc::ptr_eq(client.api(), &api));

    let reopened = CloudClient::from_parts(api, &store, POLL_INTERVAL);
    assert_eq!(
        reopened
            .cloud_accounts()
            .resolve(account.primary_id())
            .await
            .expect("resolve"),
        Some(account.resource_id())
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn reconciling_client_reads_the_task_history() {
    let api = Arc::new(
        InMemoryRemoteApi::default()
            .with_auto_complete(1)
            .expect("auto-complete configured"),
    );
    let client = CloudClient::reconciling(api, POLL_INTERVAL);
    assert!(matches!(
        client.subscriptions().associations(),
        AssociationSource::TaskHistory
    ));

    let mut token = ContinuationToken::empty();
    let created = client
        .subscriptions()
        .create(&generous(), &mut token, &json!({"name": "sub"}))
        .await
        .expect("create succeeds")
        .complete()
        .expect("create completes");

    assert_eq!(
        client.subscriptions().list().await.expect("list"),
        vec![created.primary_id().clone()]
    );
    assert!(client.cloud_accounts().list().await.expect("list").is_empty());
}

#[test]
fn http_clients_build_from_config() {
    let config = ClientConfig::new("key", "secret")
        .with_base_url("http://127.0.0.1:9/v1")
        .with_poll_interval(Duration::from_millis(250));

    let client = CloudClient::from_task_history(&config).expect("client builds");
    assert_eq!(client.api().base_url(), "http://127.0.0.1:9/v1");

    let stored = CloudClient::with_store(&config, &InMemoryAssociationStore::new())
        .expect("client builds");
    assert!(matches!(
        stored.cloud_accounts().associations(),
        AssociationSource::Store(_)
    ));
}

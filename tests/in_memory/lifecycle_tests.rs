//! Full resource lifecycles over durable object-storage associations.

use std::sync::Arc;

use super::helpers::{BUCKET, controller, generous, pid, rid, storage};
use rstest::rstest;
use serde_json::json;
use stratus::association::adapters::memory::InMemoryObjectStorage;
use stratus::lifecycle::{
    adapters::InMemoryRemoteApi,
    domain::{ContinuationToken, ResourceKind},
    services::{Deleted, LifecycleError},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_update_read_delete(storage: Arc<InMemoryObjectStorage>) {
    let api = Arc::new(
        InMemoryRemoteApi::default()
            .with_auto_complete(2)
            .and_then(|api| api.with_next_resource_id(rid(16954)))
            .expect("simulation configured"),
    );
    let accounts = controller(ResourceKind::cloud_account(), &api, &storage);

    let mut token = ContinuationToken::empty();
    let created = accounts
        .create(&generous(), &mut token, &json!({"name": "prod", "provider": "AWS"}))
        .await
        .expect("create succeeds")
        .complete()
        .expect("create completes");
    let primary_id = created.primary_id().clone();
    assert_eq!(created.resource_id(), rid(16954));
    assert_eq!(
        storage.objects(BUCKET).expect("objects"),
        vec![format!("resources:cloud-accounts/{primary_id}/16954/")]
    );

    let mut update_token = ContinuationToken::empty();
    accounts
        .update(&generous(), &primary_id, &mut update_token, &json!({"name": "staging"}))
        .await
        .expect("update succeeds")
        .complete()
        .expect("update completes");
    assert_eq!(
        accounts.read(&primary_id).await.expect("read"),
        json!({"name": "staging", "id": 16954})
    );

    let mut delete_token = ContinuationToken::empty();
    let deleted = accounts
        .delete(&generous(), &primary_id, &mut delete_token)
        .await
        .expect("delete succeeds")
        .complete()
        .expect("delete completes");
    assert!(matches!(deleted, Deleted::Completed(_)));
    assert!(storage.objects(BUCKET).expect("objects").is_empty());
    assert!(accounts.list().await.expect("list").is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn kinds_keep_separate_namespaces(storage: Arc<InMemoryObjectStorage>) {
    let api = Arc::new(
        InMemoryRemoteApi::default()
            .with_auto_complete(1)
            .expect("auto-complete configured"),
    );
    let accounts = controller(ResourceKind::cloud_account(), &api, &storage);
    let subscriptions = controller(ResourceKind::subscription(), &api, &storage);

    let mut token = ContinuationToken::empty();
    let account = accounts
        .create(&generous(), &mut token, &json!({"name": "acct"}))
        .await
        .expect("create succeeds")
        .complete()
        .expect("create completes");

    assert_eq!(
        accounts.list().await.expect("list"),
        vec![account.primary_id().clone()]
    );
    assert!(subscriptions.list().await.expect("list").is_empty());
    let err = subscriptions
        .read(account.primary_id())
        .await
        .expect_err("not a subscription");
    assert!(matches!(err, LifecycleError::NotFound(_)));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_an_unknown_resource_is_a_no_op(storage: Arc<InMemoryObjectStorage>) {
    let api = Arc::new(InMemoryRemoteApi::default());
    let accounts = controller(ResourceKind::cloud_account(), &api, &storage);

    let mut token = ContinuationToken::empty();
    let deleted = accounts
        .delete(&generous(), &pid("never-created"), &mut token)
        .await
        .expect("delete succeeds");

    assert_eq!(deleted.complete(), Some(Deleted::AlreadyGone));
    assert_eq!(api.submissions().expect("submissions"), 0);
}

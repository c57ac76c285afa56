//! Resuming operations across short-lived invocations.
//!
//! Each invocation builds a fresh controller and only carries the
//! serialized continuation token and primary id forward.

use std::sync::Arc;

use super::helpers::{controller, generous, rid, storage, tight};
use rstest::rstest;
use serde_json::json;
use stratus::association::{adapters::memory::InMemoryObjectStorage, domain::PrimaryId};
use stratus::lifecycle::{
    adapters::InMemoryRemoteApi,
    domain::{ContinuationToken, Progress, ResourceKind, TaskStatus},
    services::{Deleted, LifecycleError},
};

fn carry(token: &ContinuationToken) -> String {
    serde_json::to_string(token).expect("token serializes")
}

fn resume(saved: &str) -> ContinuationToken {
    serde_json::from_str(saved).expect("token deserializes")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_survives_an_expired_invocation(storage: Arc<InMemoryObjectStorage>) {
    let api = Arc::new(
        InMemoryRemoteApi::default()
            .with_next_resource_id(rid(12345))
            .expect("next resource id configured"),
    );

    let mut token = ContinuationToken::empty();
    let first = controller(ResourceKind::cloud_account(), &api, &storage)
        .create(&tight(), &mut token, &json!({"name": "f15a"}))
        .await
        .expect("first invocation succeeds");
    let task_id = token.task_id().expect("task id handed back");
    assert_eq!(first, Progress::Pending(ContinuationToken::from(&task_id)));
    assert_eq!(
        api.task(&task_id).expect("lookup").map(|task| task.status()),
        Some(TaskStatus::ProcessingInProgress)
    );

    let saved = carry(&token);
    api.complete(&task_id).expect("remote finishes");

    let mut resumed = resume(&saved);
    let second = controller(ResourceKind::cloud_account(), &api, &storage)
        .create(&tight(), &mut resumed, &json!({"name": "f15a"}))
        .await
        .expect("second invocation succeeds");

    let created = second.complete().expect("create completes");
    assert_eq!(created.primary_id(), &PrimaryId::from(&task_id));
    assert_eq!(created.resource_id(), rid(12345));
    assert_eq!(api.submissions().expect("submissions"), 1);

    let later = controller(ResourceKind::cloud_account(), &api, &storage);
    assert_eq!(
        later.resolve(created.primary_id()).await.expect("resolve"),
        Some(rid(12345))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_resumes_without_resubmitting(storage: Arc<InMemoryObjectStorage>) {
    let api = Arc::new(
        InMemoryRemoteApi::default()
            .with_auto_complete(1)
            .expect("auto-complete configured"),
    );
    let mut create_token = ContinuationToken::empty();
    let created = controller(ResourceKind::subscription(), &api, &storage)
        .create(&generous(), &mut create_token, &json!({"name": "sub"}))
        .await
        .expect("create succeeds")
        .complete()
        .expect("create completes");

    let slow = Arc::new(InMemoryRemoteApi::default());
    slow.seed_resource(&ResourceKind::subscription(), created.resource_id(), json!({}))
        .expect("seed");
    let mut token = ContinuationToken::empty();
    let first = controller(ResourceKind::subscription(), &slow, &storage)
        .delete(&tight(), created.primary_id(), &mut token)
        .await
        .expect("first invocation succeeds");
    assert!(first.is_pending());

    let task_id = token.task_id().expect("task id handed back");
    slow.complete(&task_id).expect("remote finishes");
    let mut resumed = resume(&carry(&token));
    let second = controller(ResourceKind::subscription(), &slow, &storage)
        .delete(&tight(), created.primary_id(), &mut resumed)
        .await
        .expect("second invocation succeeds");

    assert_eq!(second.complete(), Some(Deleted::Completed(task_id)));
    assert_eq!(slow.submissions().expect("submissions"), 1);
    let err = controller(ResourceKind::subscription(), &slow, &storage)
        .read(created.primary_id())
        .await
        .expect_err("association removed");
    assert!(err.is_not_found());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failure_after_resume_surfaces_the_server_error(storage: Arc<InMemoryObjectStorage>) {
    let api = Arc::new(InMemoryRemoteApi::default());
    let mut token = ContinuationToken::empty();
    let first = controller(ResourceKind::cloud_account(), &api, &storage)
        .create(&tight(), &mut token, &json!({"name": "broken"}))
        .await
        .expect("first invocation succeeds");
    assert!(first.is_pending());

    let task_id = token.task_id().expect("task id handed back");
    api.fail(&task_id, json!({"type": "CLOUD_ACCOUNT_NOT_ACTIVE"}))
        .expect("remote fails");
    let err = controller(ResourceKind::cloud_account(), &api, &storage)
        .create(&tight(), &mut token, &json!({"name": "broken"}))
        .await
        .expect_err("failure surfaces");

    match err {
        LifecycleError::TaskFailed { task_id: failed, detail } => {
            assert_eq!(failed, task_id);
            assert_eq!(detail, json!({"type": "CLOUD_ACCOUNT_NOT_ACTIVE"}));
        }
        other => panic!("unexpected error: {other}"),
    }
    let accounts = controller(ResourceKind::cloud_account(), &api, &storage);
    assert!(accounts.list().await.expect("list").is_empty());
}

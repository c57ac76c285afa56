//! Then steps for resumable lifecycle BDD scenarios.

use super::world::{LifecycleWorld, Outcome, primary_id, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::then;
use serde_json::json;
use stratus::association::ports::AssociationStore;
use stratus::lifecycle::{
    domain::{ContinuationToken, Progress},
    services::{Deleted, LifecycleError},
};

fn outcome(world: &LifecycleWorld) -> Result<&Outcome, eyre::Report> {
    world
        .outcome
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no invocation has run"))
}

fn pending_token(world: &LifecycleWorld) -> Result<&ContinuationToken, eyre::Report> {
    match outcome(world)? {
        Outcome::Created(Progress::Pending(token)) => Ok(token),
        _ => Err(eyre::eyre!("expected a pending create")),
    }
}

#[then("the invocation is pending with a continuation token")]
fn pending_with_token(world: &LifecycleWorld) -> Result<(), eyre::Report> {
    let token = pending_token(world)?;
    if token.is_empty() || *token != world.token {
        return Err(eyre::eyre!(
            "expected the submitted task id, found {token:?} (world holds {:?})",
            world.token
        ));
    }
    Ok(())
}

#[then("the invocation is pending without a continuation token")]
fn pending_without_token(world: &LifecycleWorld) -> Result<(), eyre::Report> {
    let token = pending_token(world)?;
    if !token.is_empty() || !world.token.is_empty() {
        return Err(eyre::eyre!("expected an empty token, found {token:?}"));
    }
    Ok(())
}

#[then("the create completes with resource id {expected:u64}")]
fn create_completes(world: &LifecycleWorld, expected: u64) -> Result<(), eyre::Report> {
    match outcome(world)? {
        Outcome::Created(Progress::Complete(created))
            if created.resource_id().get() == expected =>
        {
            Ok(())
        }
        Outcome::Created(other) => Err(eyre::eyre!("unexpected create progress {other:?}")),
        Outcome::Failed(err) => Err(eyre::eyre!("create failed: {err}")),
        _ => Err(eyre::eyre!("last invocation was not a create")),
    }
}

#[then(r#"the association for "{name}" resolves to resource id {expected:u64}"#)]
fn association_resolves(
    world: &LifecycleWorld,
    name: String,
    expected: u64,
) -> Result<(), eyre::Report> {
    let id = primary_id(&name)?;
    let resolved = run_async(world.store.get(&id)).wrap_err("read association")?;
    if resolved.map(|resource_id| resource_id.get()) != Some(expected) {
        return Err(eyre::eyre!("expected {expected}, found {resolved:?}"));
    }
    Ok(())
}

#[then(r#"no association is recorded for "{name}""#)]
fn no_association(world: &LifecycleWorld, name: String) -> Result<(), eyre::Report> {
    let id = primary_id(&name)?;
    let resolved = run_async(world.store.get(&id)).wrap_err("read association")?;
    if let Some(resource_id) = resolved {
        return Err(eyre::eyre!("unexpected association to {resource_id}"));
    }
    Ok(())
}

#[then("the submission count is {expected:u64}")]
fn submission_count(world: &LifecycleWorld, expected: u64) -> Result<(), eyre::Report> {
    let wanted = usize::try_from(expected).wrap_err("submission count fits usize")?;
    let submissions = world
        .api
        .submissions()
        .map_err(|err| eyre::eyre!("read submissions: {err}"))?;
    if submissions != wanted {
        return Err(eyre::eyre!("expected {wanted} submissions, found {submissions}"));
    }
    Ok(())
}

#[then(r#"the operation fails with error type "{error_type}""#)]
fn fails_with_error_type(world: &LifecycleWorld, error_type: String) -> Result<(), eyre::Report> {
    match outcome(world)? {
        Outcome::Failed(LifecycleError::TaskFailed { detail, .. })
            if *detail == json!({"type": error_type}) =>
        {
            Ok(())
        }
        Outcome::Failed(err) => Err(eyre::eyre!("unexpected failure: {err}")),
        _ => Err(eyre::eyre!("expected the operation to fail")),
    }
}

#[then("the operation fails as not found")]
fn fails_as_not_found(world: &LifecycleWorld) -> Result<(), eyre::Report> {
    match outcome(world)? {
        Outcome::Failed(err) if err.is_not_found() => Ok(()),
        Outcome::Failed(err) => Err(eyre::eyre!("unexpected failure: {err}")),
        _ => Err(eyre::eyre!("expected the operation to fail")),
    }
}

#[then("the delete reports the resource already gone")]
fn delete_already_gone(world: &LifecycleWorld) -> Result<(), eyre::Report> {
    match outcome(world)? {
        Outcome::Deleted(Progress::Complete(Deleted::AlreadyGone)) => Ok(()),
        Outcome::Failed(err) => Err(eyre::eyre!("delete failed: {err}")),
        _ => Err(eyre::eyre!("expected an already-gone delete")),
    }
}

#[then("the delete completes")]
fn delete_completes(world: &LifecycleWorld) -> Result<(), eyre::Report> {
    match outcome(world)? {
        Outcome::Deleted(Progress::Complete(Deleted::Completed(_))) => Ok(()),
        Outcome::Failed(err) => Err(eyre::eyre!("delete failed: {err}")),
        _ => Err(eyre::eyre!("expected a completed delete")),
    }
}

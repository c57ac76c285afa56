//! When steps for resumable lifecycle BDD scenarios.

use std::time::Duration;

use super::world::{LifecycleWorld, Outcome, primary_id, run_async};
use rstest_bdd_macros::when;
use serde_json::json;
use stratus::lifecycle::domain::{Budget, ContinuationToken};

fn create_tick(world: &mut LifecycleWorld, millis: u64) -> Result<(), eyre::Report> {
    let id = world
        .primary_id
        .clone()
        .ok_or_else(|| eyre::eyre!("missing primary id in scenario world"))?;
    let budget = Budget::with_timeout(Duration::from_millis(millis));
    let body = json!({"name": id.as_str()});
    let result = run_async(
        world
            .controller
            .create_as(&budget, &id, &mut world.token, &body),
    );
    world.record(result, Outcome::Created);
    Ok(())
}

#[when(r#"a cloud account "{name}" is created with a {millis:u64} ms budget"#)]
fn create_account(
    world: &mut LifecycleWorld,
    name: String,
    millis: u64,
) -> Result<(), eyre::Report> {
    world.primary_id = Some(primary_id(&name)?);
    world.token = ContinuationToken::empty();
    create_tick(world, millis)
}

#[when("the create is resumed with a {millis:u64} ms budget")]
fn resume_create(world: &mut LifecycleWorld, millis: u64) -> Result<(), eyre::Report> {
    create_tick(world, millis)
}

#[when("the remote task completes")]
fn remote_completes(world: &mut LifecycleWorld) -> Result<(), eyre::Report> {
    let task_id = world
        .token
        .task_id()
        .ok_or_else(|| eyre::eyre!("no task in flight"))?;
    world
        .api
        .complete(&task_id)
        .map_err(|err| eyre::eyre!("complete task: {err}"))?;
    Ok(())
}

#[when(r#"the remote task fails with error type "{error_type}""#)]
fn remote_fails(world: &mut LifecycleWorld, error_type: String) -> Result<(), eyre::Report> {
    let task_id = world
        .token
        .task_id()
        .ok_or_else(|| eyre::eyre!("no task in flight"))?;
    world
        .api
        .fail(&task_id, json!({"type": error_type}))
        .map_err(|err| eyre::eyre!("fail task: {err}"))?;
    Ok(())
}

#[when(r#"the cloud account "{name}" is deleted"#)]
fn delete_account(world: &mut LifecycleWorld, name: String) -> Result<(), eyre::Report> {
    let id = primary_id(&name)?;
    world.token = ContinuationToken::empty();
    let result = run_async(
        world
            .controller
            .delete(&Budget::unbounded(), &id, &mut world.token),
    );
    world.record(result, Outcome::Deleted);
    Ok(())
}

#[when(r#"the cloud account "{name}" is renamed to "{new_name}""#)]
fn rename_account(
    world: &mut LifecycleWorld,
    name: String,
    new_name: String,
) -> Result<(), eyre::Report> {
    let id = primary_id(&name)?;
    world.token = ContinuationToken::empty();
    let result = run_async(world.controller.update(
        &Budget::unbounded(),
        &id,
        &mut world.token,
        &json!({"name": new_name}),
    ));
    world.record(result, Outcome::Updated);
    Ok(())
}

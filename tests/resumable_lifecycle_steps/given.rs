//! Given steps for resumable lifecycle BDD scenarios.

use super::world::{LifecycleWorld, primary_id, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use serde_json::json;
use stratus::lifecycle::{
    adapters::InMemoryRemoteApi,
    domain::{Budget, ContinuationToken},
};

#[given("a remote task API that finishes tasks on request")]
fn manual_api(world: &mut LifecycleWorld) {
    *world = LifecycleWorld::new(InMemoryRemoteApi::default());
}

#[given("a remote task API that finishes tasks immediately")]
fn instant_api(world: &mut LifecycleWorld) -> Result<(), eyre::Report> {
    *world = LifecycleWorld::new(InMemoryRemoteApi::default().with_auto_complete(1)?);
    Ok(())
}

#[given(r#"an existing cloud account "{name}""#)]
fn existing_account(world: &mut LifecycleWorld, name: String) -> Result<(), eyre::Report> {
    let id = primary_id(&name)?;
    let mut token = ContinuationToken::empty();
    let progress = run_async(world.controller.create_as(
        &Budget::unbounded(),
        &id,
        &mut token,
        &json!({"name": name}),
    ))
    .wrap_err("create existing account")?;
    if progress.is_pending() {
        return Err(eyre::eyre!("existing account did not finish creating"));
    }
    Ok(())
}

//! When steps for integration default scenarios.

use super::world::{RegistryWorld, run_async};
use eyre::WrapErr;
use integration_registry::integration::{
    domain::Scope,
    services::{IntegrationPayload, ResolveQuery},
};
use rstest_bdd_macros::when;
use serde_json::json;

#[when(r#"tenant "{tenant}" promotes "{label}""#)]
fn tenant_promotes(
    world: &mut RegistryWorld,
    tenant: String,
    label: String,
) -> Result<(), eyre::Report> {
    let project = world.tenant(&tenant)?;
    let target = world.record(&label)?.reference();
    run_async(
        world
            .orchestrator
            .promote_default(target, Scope::Tenant(project)),
    )
    .wrap_err("promote default for scenario")?;
    Ok(())
}

#[when(r#"tenant "{tenant}" integrations are resolved"#)]
fn tenant_integrations_resolved(
    world: &mut RegistryWorld,
    tenant: String,
) -> Result<(), eyre::Report> {
    let project = world.tenant(&tenant)?;
    let query = ResolveQuery::new(Scope::Tenant(project));
    let resolution =
        run_async(world.resolver.resolve(&query)).wrap_err("resolve tenant integrations")?;
    world.last_resolution = Some(resolution.into_flat());
    Ok(())
}

#[when(r#""{label}" stops being shared"#)]
fn stops_being_shared(world: &mut RegistryWorld, label: String) -> Result<(), eyre::Report> {
    let target = world.record(&label)?.reference();
    let payload = IntegrationPayload::new(json!({})).with_config(json!({ "is_shared": false }));
    let updated = run_async(world.orchestrator.update(target, payload))
        .wrap_err("unshare integration for scenario")?;
    world.records.insert(label, updated);
    Ok(())
}

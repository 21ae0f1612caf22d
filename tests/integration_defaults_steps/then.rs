//! Then steps for integration default scenarios.

use super::world::RegistryWorld;
use integration_registry::integration::domain::{IntegrationEvent, ResolvedIntegration};
use rstest_bdd_macros::then;
use serde_json::json;

fn resolved_entry<'a>(
    world: &'a RegistryWorld,
    label: &str,
) -> Result<&'a ResolvedIntegration, eyre::Report> {
    let target = world.record(label)?.reference();
    world
        .resolution()?
        .iter()
        .find(|item| item.integration.reference() == target)
        .ok_or_else(|| eyre::eyre!("'{label}' missing from resolution"))
}

#[then(r#""{label}" is resolved as the default"#)]
fn resolved_as_default(world: &mut RegistryWorld, label: String) -> Result<(), eyre::Report> {
    let entry = resolved_entry(world, &label)?;
    eyre::ensure!(entry.is_default, "expected '{label}' to be the default");
    Ok(())
}

#[then(r#""{label}" is resolved as not default"#)]
fn resolved_as_not_default(world: &mut RegistryWorld, label: String) -> Result<(), eyre::Report> {
    let entry = resolved_entry(world, &label)?;
    eyre::ensure!(!entry.is_default, "expected '{label}' not to be the default");
    Ok(())
}

#[then(r#"the resolved list starts with "{label}""#)]
fn resolved_list_starts_with(world: &mut RegistryWorld, label: String) -> Result<(), eyre::Report> {
    let target = world.record(&label)?.reference();
    let first = world
        .resolution()?
        .first()
        .ok_or_else(|| eyre::eyre!("resolution is empty"))?;
    eyre::ensure!(
        first.integration.reference() == target,
        "expected '{label}' first, found {}",
        first.integration.reference()
    );
    Ok(())
}

#[then("a settings change with empty settings reaches {count:usize} tenants")]
fn settings_change_reaches(world: &mut RegistryWorld, count: usize) -> Result<(), eyre::Report> {
    let events = world.notifier.events_named("integration_settings_changed");
    let reached = events.iter().any(|event| match &event.payload {
        IntegrationEvent::SettingsChanged {
            project_ids,
            new_settings,
            ..
        } => *new_settings == json!({}) && project_ids.len() == count,
        IntegrationEvent::CreatedOrUpdated(_) => false,
    });
    eyre::ensure!(
        reached,
        "no empty settings change reached {count} tenants: {events:?}"
    );
    Ok(())
}

#[then(r#"the default model is "{model}" from "{label}""#)]
fn default_model_is(
    world: &mut RegistryWorld,
    model: String,
    label: String,
) -> Result<(), eyre::Report> {
    let target = world.record(&label)?.reference();
    let defaults: Vec<_> = world
        .resolution()?
        .iter()
        .filter_map(|item| {
            item.integration
                .settings()
                .default_model_id()
                .map(|id| (item.integration.reference(), id.to_owned()))
        })
        .collect();
    eyre::ensure!(
        defaults == vec![(target, model.clone())],
        "expected default model '{model}' from '{label}', found {defaults:?}"
    );
    Ok(())
}

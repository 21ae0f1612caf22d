//! Default model selection across the integrations of the capability
//! section.
//!
//! At most one model in a resolved list ends up flagged `default`. An
//! operator-chosen pointer wins when it names an existing model; otherwise
//! the first chat-completion model in list order is chosen.

use crate::integration::domain::{Integration, IntegrationId, ModelEntry, ResolvedIntegration};

/// Parsed `<integrationId><separator><modelId>` secret value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultModelPointer {
    /// Store id of the integration holding the model.
    pub integration_id: IntegrationId,
    /// Model identifier within that integration.
    pub model_id: String,
}

impl DefaultModelPointer {
    /// Parses a pointer, splitting on the first occurrence of `separator`.
    ///
    /// Returns `None` when the separator is missing, the integration id is
    /// not an integer, or the model id is empty.
    #[must_use]
    pub fn parse(raw: &str, separator: &str) -> Option<Self> {
        let (integration, model) = raw.split_once(separator)?;
        let integration_id = integration.trim().parse::<i64>().ok()?;
        if model.is_empty() {
            return None;
        }
        Some(Self {
            integration_id: IntegrationId::new(integration_id),
            model_id: model.to_owned(),
        })
    }
}

/// Rewrites the `default` flag of every model held by entries of
/// `capability_section`.
///
/// Entries of other sections are left untouched.
pub fn mark_default_models(
    items: &mut [ResolvedIntegration],
    capability_section: &str,
    pointer: Option<&DefaultModelPointer>,
) {
    let mut capable: Vec<&mut Integration> = items
        .iter_mut()
        .map(|item| &mut item.integration)
        .filter(|integration| integration.section().as_str() == capability_section)
        .collect();

    for integration in &mut capable {
        for mut model in integration.settings_mut().models_mut() {
            model.set_default(false);
        }
    }

    if let Some(target) = pointer
        && mark_pointed_model(&mut capable, target)
    {
        return;
    }
    mark_first_chat_model(&mut capable);
}

fn mark_pointed_model(capable: &mut [&mut Integration], target: &DefaultModelPointer) -> bool {
    for integration in capable
        .iter_mut()
        .filter(|integration| integration.id() == target.integration_id)
    {
        let matched = integration
            .settings_mut()
            .models_mut()
            .find(|model| model.id() == Some(target.model_id.as_str()));
        if let Some(mut model) = matched {
            model.set_default(true);
            return true;
        }
    }
    false
}

fn mark_first_chat_model(capable: &mut [&mut Integration]) {
    for integration in capable.iter_mut() {
        let chat_model = integration
            .settings_mut()
            .models_mut()
            .find(ModelEntry::supports_chat_completion);
        if let Some(mut model) = chat_model {
            model.set_default(true);
            return;
        }
    }
}

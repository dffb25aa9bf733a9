use callcenter_core::config::AgentConfig;
use serde::{Deserialize, Serialize};

use crate::actions::params::{field_names, FIELD_DELIMITER};
use crate::actions::ActionKind;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    pub name: String,
    pub required: bool,
    pub description: String,
}

/// What the LLM runtime is told about one action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    pub action_type: ActionKind,
    pub description: String,
    pub parameters: Vec<ParameterDescriptor>,
}

impl ActionDescriptor {
    pub fn for_kind(kind: ActionKind) -> Self {
        let parameters = kind
            .fields()
            .iter()
            .map(|field| ParameterDescriptor {
                name: field.name.to_string(),
                required: field.required,
                description: field.description.to_string(),
            })
            .collect();

        Self { action_type: kind, description: describe(kind), parameters }
    }
}

pub fn catalog() -> Vec<ActionDescriptor> {
    ActionKind::ALL.into_iter().map(ActionDescriptor::for_kind).collect()
}

fn describe(kind: ActionKind) -> String {
    let mut lines = vec![
        kind.summary().to_string(),
        format!(
            "The input is a single string of the following values separated by `{FIELD_DELIMITER}` \
             in this order: {}",
            field_names(kind.fields())
        ),
    ];

    for field in kind.fields() {
        let marker = if field.required { "required" } else { "optional" };
        lines.push(format!("- {} ({marker}): {}", field.name, field.description));
    }

    lines.join("\n")
}

/// Agent persona plus the action catalog, in the shape the telephony
/// runtime is configured with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub first_message: String,
    pub prompt_preamble: String,
    pub actions: Vec<ActionDescriptor>,
}

impl AgentProfile {
    pub fn from_config(agent: &AgentConfig) -> Self {
        Self {
            first_message: agent.first_message.clone(),
            prompt_preamble: agent.prompt_preamble.clone(),
            actions: catalog(),
        }
    }
}

#[cfg(test)]
mod tests {
    use callcenter_core::config::AgentConfig;

    use super::{catalog, ActionDescriptor, AgentProfile};
    use crate::actions::ActionKind;

    #[test]
    fn catalog_lists_every_action_once() {
        let kinds = catalog().into_iter().map(|descriptor| descriptor.action_type).collect::<Vec<_>>();
        assert_eq!(kinds, ActionKind::ALL.to_vec());
    }

    #[test]
    fn send_text_description_spells_out_field_order() {
        let descriptor = ActionDescriptor::for_kind(ActionKind::SendText);

        assert!(descriptor.description.contains("first_name|phone_digits|doctor|address|datetime"));
        assert_eq!(descriptor.parameters.len(), 5);
        assert!(descriptor.parameters.iter().all(|parameter| parameter.required));
    }

    #[test]
    fn find_slots_marks_referral_optional() {
        let descriptor = ActionDescriptor::for_kind(ActionKind::FindSlots);

        let referral = descriptor
            .parameters
            .iter()
            .find(|parameter| parameter.name == "referral")
            .expect("referral parameter is declared");
        assert!(!referral.required);
        assert!(descriptor.description.contains("- referral (optional)"));
    }

    #[test]
    fn profile_carries_configured_persona() {
        let profile = AgentProfile::from_config(&AgentConfig {
            first_message: "Hi there".to_string(),
            prompt_preamble: "Be brief".to_string(),
        });

        assert_eq!(profile.first_message, "Hi there");
        assert_eq!(profile.prompt_preamble, "Be brief");
        assert_eq!(profile.actions.len(), 2);
    }
}

//! Parameter substitution over loaded workflow templates.
//!
//! Turns a [`WorkflowTemplate`] plus request [`Overrides`] into a concrete
//! graph ready for submission. Only the slots declared by the template's
//! bindings are ever rewritten; override fields with no bound slot are
//! ignored, except a prompt with nowhere to go, which is an error.

use serde_json::Value;

use crate::template::{SlotPath, WorkflowTemplate, node_map_mut};
use crate::{Error, Result, TRACING_TARGET_TEMPLATE};

/// Request-scoped substitution values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// Prompt text to place into the bound prompt slots.
    pub prompt_text: Option<String>,
    /// Reference image path to place into the bound image slots.
    pub ref_image_path: Option<String>,
}

impl Overrides {
    /// Creates an empty override set (substitution becomes the identity).
    pub fn none() -> Self {
        Self::default()
    }

    /// Set the prompt text.
    #[must_use]
    pub fn with_prompt_text(mut self, prompt: impl Into<String>) -> Self {
        self.prompt_text = Some(prompt.into());
        self
    }

    /// Set the reference image path.
    #[must_use]
    pub fn with_ref_image_path(mut self, path: impl Into<String>) -> Self {
        self.ref_image_path = Some(path.into());
        self
    }
}

/// Applies overrides to a template, producing a concrete graph.
///
/// With no overrides the result is identical to the template's document.
///
/// # Errors
///
/// Returns [`Error::MissingInput`] when prompt text is supplied but the
/// template binds no prompt slot it could land in.
pub fn apply(template: &WorkflowTemplate, overrides: &Overrides) -> Result<Value> {
    let mut document = template.document().clone();
    let bindings = template.bindings();

    if let Some(prompt) = &overrides.prompt_text {
        let written = write_slots(
            &mut document,
            &bindings.prompt_text,
            &Value::String(prompt.clone()),
        );
        if written == 0 {
            return Err(Error::MissingInput(format!(
                "{}: no prompt slot is bound in this workflow",
                template.name()
            )));
        }
    }

    if let Some(path) = &overrides.ref_image_path {
        let written = write_slots(
            &mut document,
            &bindings.ref_image,
            &Value::String(path.clone()),
        );
        if written == 0 {
            // The template defines which slots are substitutable; an image
            // override with nowhere to go is not an error.
            tracing::debug!(
                target: TRACING_TARGET_TEMPLATE,
                workflow = %template.name(),
                "Reference image override ignored: no bound slot"
            );
        }
    }

    Ok(document)
}

/// Writes a value into each bound slot, returning how many writes landed.
///
/// Slots whose node id no longer exists in the graph are skipped: a stale
/// sidecar must not corrupt the graph.
fn write_slots(document: &mut Value, slots: &[SlotPath], value: &Value) -> usize {
    let Some(nodes) = node_map_mut(document) else {
        return 0;
    };

    let mut written = 0;
    for slot in slots {
        let Some(inputs) = nodes
            .get_mut(&slot.node)
            .and_then(|node| node.get_mut("inputs"))
            .and_then(Value::as_object_mut)
        else {
            tracing::warn!(
                target: TRACING_TARGET_TEMPLATE,
                node = %slot.node,
                input = %slot.input,
                "Bound slot not present in graph, skipping"
            );
            continue;
        };

        let slot_value = if slot.list {
            Value::Array(vec![value.clone()])
        } else {
            value.clone()
        };

        inputs.insert(slot.input.clone(), slot_value);
        written += 1;
    }

    written
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::template::TemplateBindings;

    fn template() -> WorkflowTemplate {
        let graph = json!({
            "nodes": {
                "3": {"class_type": "CLIPTextEncode", "inputs": {"text": "fallback prompt"}},
                "5": {"class_type": "LoadImage", "inputs": {"image": "default.png"}},
                "8": {"class_type": "ImageBatch", "inputs": {"images": ["5", 0]}}
            }
        });

        WorkflowTemplate::new("portrait.json", graph, None).unwrap()
    }

    fn from_graph(graph: Value) -> WorkflowTemplate {
        WorkflowTemplate::new("test.json", graph, None).unwrap()
    }

    #[test]
    fn no_overrides_is_identity() {
        let template = template();
        let graph = apply(&template, &Overrides::none()).unwrap();

        assert_eq!(
            graph.to_string(),
            template.document().to_string(),
            "substitution with no overrides must be byte-identical"
        );
    }

    #[test]
    fn prompt_override_places_exact_string() {
        let template = template();
        let overrides = Overrides::none().with_prompt_text("soft cozy bedroom portrait");

        let graph = apply(&template, &overrides).unwrap();
        assert_eq!(
            graph["nodes"]["3"]["inputs"]["text"],
            json!("soft cozy bedroom portrait")
        );
    }

    #[test]
    fn absent_ref_image_leaves_slot_untouched() {
        let template = template();
        let overrides = Overrides::none().with_prompt_text("portrait");

        let graph = apply(&template, &overrides).unwrap();
        assert_eq!(graph["nodes"]["5"]["inputs"]["image"], json!("default.png"));
    }

    #[test]
    fn ref_image_writes_scalar_and_list_slots() {
        let template = template();
        let overrides = Overrides::none().with_ref_image_path("/input/ref.png");

        let graph = apply(&template, &overrides).unwrap();
        assert_eq!(
            graph["nodes"]["5"]["inputs"]["image"],
            json!("/input/ref.png")
        );
        assert_eq!(
            graph["nodes"]["8"]["inputs"]["images"],
            json!(["/input/ref.png"])
        );
    }

    #[test]
    fn prompt_with_no_bound_slot_is_missing_input() {
        let template = from_graph(json!({
            "nodes": {"5": {"class_type": "LoadImage", "inputs": {"image": "x.png"}}}
        }));
        let overrides = Overrides::none().with_prompt_text("portrait");

        let err = apply(&template, &overrides).unwrap_err();
        assert!(matches!(err, Error::MissingInput(_)));
    }

    #[test]
    fn ref_image_with_no_bound_slot_is_ignored() {
        let template = from_graph(json!({
            "nodes": {"3": {"class_type": "CLIPTextEncode", "inputs": {"text": "hi"}}}
        }));
        let overrides = Overrides::none().with_ref_image_path("/input/ref.png");

        let graph = apply(&template, &overrides).unwrap();
        assert_eq!(graph.to_string(), template.document().to_string());
    }

    #[test]
    fn stale_sidecar_slot_is_skipped() {
        let graph = json!({
            "nodes": {"3": {"class_type": "CLIPTextEncode", "inputs": {"text": "hi"}}}
        });
        let bindings = TemplateBindings {
            prompt_text: vec![
                crate::SlotPath::new("3", "text"),
                crate::SlotPath::new("99", "text"),
            ],
            ref_image: Vec::new(),
        };
        let template = WorkflowTemplate::new("stale.json", graph, Some(bindings)).unwrap();

        let overrides = Overrides::none().with_prompt_text("new");
        let graph = apply(&template, &overrides).unwrap();

        assert_eq!(graph["nodes"]["3"]["inputs"]["text"], json!("new"));
        assert!(graph["nodes"].get("99").is_none());
    }
}

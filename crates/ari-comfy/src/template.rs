//! Workflow template store and slot bindings.
//!
//! Templates are pre-authored ComfyUI graphs provisioned out-of-band into a
//! directory; the store reads them fresh on every request and never writes.
//! Each loaded template carries a [`TemplateBindings`] value declaring which
//! node inputs the substitution step may rewrite.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, Result, TRACING_TARGET_TEMPLATE};

/// Input names a template conventionally uses for prompt text.
const PROMPT_SLOT_KEYS: [&str; 3] = ["text", "prompt", "positive"];

/// Extension of the optional bindings sidecar, e.g. `portrait.bindings.json`
/// next to `portrait.json`.
const BINDINGS_SUFFIX: &str = "bindings.json";

/// One writable node input, addressed by node id and input name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotPath {
    /// Node id within the graph's node map.
    pub node: String,
    /// Input name within the node's `inputs` object.
    pub input: String,
    /// Whether the slot holds a list of values rather than a single one.
    #[serde(default)]
    pub list: bool,
}

impl SlotPath {
    /// Creates a scalar slot path.
    pub fn new(node: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            input: input.into(),
            list: false,
        }
    }

    /// Creates a list-valued slot path.
    pub fn new_list(node: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            list: true,
            ..Self::new(node, input)
        }
    }
}

/// Declared mapping from override fields to the node inputs they write.
///
/// Bindings come from a `<stem>.bindings.json` sidecar when one exists;
/// otherwise they are derived once at load time by scanning the template
/// for the conventional slot names. Either way the substitution step only
/// ever consumes this declared mapping, never the raw graph conventions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateBindings {
    /// Slots that receive the request's prompt text.
    #[serde(default)]
    pub prompt_text: Vec<SlotPath>,
    /// Slots that receive the request's reference image path.
    #[serde(default, rename = "ref_image_path")]
    pub ref_image: Vec<SlotPath>,
}

impl TemplateBindings {
    /// Derives bindings from a graph by the conventional slot names.
    ///
    /// Prompt slots are only bound where the current value is a string:
    /// a `positive` input holding a node link must stay a link.
    pub fn derive(nodes: &Map<String, Value>) -> Self {
        let mut bindings = Self::default();

        for (id, node) in nodes {
            let Some(inputs) = node.get("inputs").and_then(Value::as_object) else {
                continue;
            };

            for key in PROMPT_SLOT_KEYS {
                if inputs.get(key).is_some_and(Value::is_string) {
                    bindings.prompt_text.push(SlotPath::new(id, key));
                }
            }

            if inputs.contains_key("image") {
                bindings.ref_image.push(SlotPath::new(id, "image"));
            }
            if inputs.contains_key("images") {
                bindings.ref_image.push(SlotPath::new_list(id, "images"));
            }
        }

        bindings
    }
}

/// An immutable, pre-authored workflow graph loaded from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowTemplate {
    name: String,
    document: Value,
    bindings: TemplateBindings,
}

impl WorkflowTemplate {
    /// Wraps a parsed graph document, deriving bindings when none are given.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the document root (or its `nodes` field)
    /// is not a JSON object.
    pub fn new(
        name: impl Into<String>,
        document: Value,
        bindings: Option<TemplateBindings>,
    ) -> Result<Self> {
        let name = name.into();
        let nodes = node_map(&document)
            .ok_or_else(|| Error::Parse(format!("{name}: workflow root is not a node map")))?;
        let bindings = bindings.unwrap_or_else(|| TemplateBindings::derive(nodes));

        Ok(Self {
            name,
            document,
            bindings,
        })
    }

    /// Returns the template's file name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the graph document.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Returns the declared slot bindings.
    pub fn bindings(&self) -> &TemplateBindings {
        &self.bindings
    }

    /// Consumes the template, returning the graph document.
    pub fn into_document(self) -> Value {
        self.document
    }
}

/// Returns the node map of a graph document.
///
/// Accepts both the wrapped shape `{"nodes": {id: node}}` and the bare
/// ComfyUI API shape `{id: node}`.
pub(crate) fn node_map(document: &Value) -> Option<&Map<String, Value>> {
    match document.get("nodes") {
        Some(nodes) => nodes.as_object(),
        None => document.as_object(),
    }
}

/// Mutable counterpart of [`node_map`].
pub(crate) fn node_map_mut(document: &mut Value) -> Option<&mut Map<String, Value>> {
    if document.get("nodes").is_some() {
        document.get_mut("nodes")?.as_object_mut()
    } else {
        document.as_object_mut()
    }
}

/// Read-only directory of workflow templates.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    /// Creates a store over the given template directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the template directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Loads a template by file name, fresh from disk.
    ///
    /// When a `<stem>.bindings.json` sidecar exists next to the template it
    /// provides the slot bindings; otherwise they are derived from the
    /// graph's conventional input names.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if the file is absent or the name is not a
    ///   plain file name
    /// - [`Error::Parse`] if the template or sidecar is not well-formed
    pub fn load(&self, name: &str) -> Result<WorkflowTemplate> {
        if !is_plain_file_name(name) {
            return Err(Error::NotFound(format!("invalid workflow name: {name}")));
        }

        let path = self.dir.join(name);
        let raw = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound(name.to_string()),
            _ => Error::Parse(format!("{name}: {e}")),
        })?;

        let document: Value =
            serde_json::from_str(&raw).map_err(|e| Error::Parse(format!("{name}: {e}")))?;

        let bindings = self.load_sidecar(name)?;

        tracing::debug!(
            target: TRACING_TARGET_TEMPLATE,
            workflow = %name,
            sidecar = bindings.is_some(),
            "Workflow template loaded"
        );

        WorkflowTemplate::new(name, document, bindings)
    }

    /// Loads the bindings sidecar for a template, if one exists.
    fn load_sidecar(&self, name: &str) -> Result<Option<TemplateBindings>> {
        let stem = name.strip_suffix(".json").unwrap_or(name);
        let path = self.dir.join(format!("{stem}.{BINDINGS_SUFFIX}"));

        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::Parse(format!("{name} bindings: {e}"))),
        };

        let bindings = serde_json::from_str(&raw)
            .map_err(|e| Error::Parse(format!("{name} bindings: {e}")))?;

        Ok(Some(bindings))
    }
}

/// Returns whether a workflow name is a plain file name.
///
/// Names with path separators or parent components would escape the
/// template directory.
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains('/')
        && !name.contains('\\')
        && name != "."
        && name != ".."
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample_graph() -> Value {
        json!({
            "nodes": {
                "3": {"class_type": "CLIPTextEncode", "inputs": {"text": "default prompt", "clip": ["1", 0]}},
                "5": {"class_type": "LoadImage", "inputs": {"image": "default.png"}},
                "7": {"class_type": "KSampler", "inputs": {"positive": ["3", 0], "seed": 42}}
            }
        })
    }

    fn store_with(name: &str, contents: &str) -> (tempfile::TempDir, TemplateStore) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(name), contents).unwrap();
        let store = TemplateStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn load_parses_template_and_derives_bindings() {
        let (_dir, store) = store_with("portrait.json", &sample_graph().to_string());

        let template = store.load("portrait.json").unwrap();
        assert_eq!(template.name(), "portrait.json");
        assert_eq!(
            template.bindings().prompt_text,
            vec![SlotPath::new("3", "text")]
        );
        assert_eq!(
            template.bindings().ref_image,
            vec![SlotPath::new("5", "image")]
        );
    }

    #[test]
    fn derive_skips_link_valued_prompt_slots() {
        let nodes = sample_graph();
        let bindings = TemplateBindings::derive(node_map(&nodes).unwrap());

        // Node 7's "positive" input is a node link, not a literal.
        assert!(!bindings.prompt_text.iter().any(|s| s.node == "7"));
    }

    #[test]
    fn load_missing_template_is_not_found() {
        let (_dir, store) = store_with("portrait.json", "{}");

        let err = store.load("absent.json").unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn load_invalid_json_is_parse_error() {
        let (_dir, store) = store_with("broken.json", "{not json");

        let err = store.load("broken.json").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn load_non_object_root_is_parse_error() {
        let (_dir, store) = store_with("list.json", "[1, 2, 3]");

        let err = store.load("list.json").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn load_rejects_path_traversal_names() {
        let (_dir, store) = store_with("portrait.json", "{}");

        for name in ["../portrait.json", "a/b.json", "..", ""] {
            let err = store.load(name).unwrap_err();
            assert!(matches!(err, Error::NotFound(_)), "name: {name:?}");
        }
    }

    #[test]
    fn sidecar_bindings_take_precedence() {
        let (dir, store) = store_with("portrait.json", &sample_graph().to_string());
        let sidecar = json!({
            "prompt_text": [{"node": "3", "input": "text"}],
            "ref_image_path": [{"node": "5", "input": "image"}, {"node": "5", "input": "images", "list": true}]
        });
        std::fs::write(
            dir.path().join("portrait.bindings.json"),
            sidecar.to_string(),
        )
        .unwrap();

        let template = store.load("portrait.json").unwrap();
        assert_eq!(template.bindings().ref_image.len(), 2);
        assert!(template.bindings().ref_image[1].list);
    }

    #[test]
    fn bare_api_shape_is_accepted() {
        let graph = json!({
            "3": {"class_type": "CLIPTextEncode", "inputs": {"text": "hi"}}
        });
        let (_dir, store) = store_with("bare.json", &graph.to_string());

        let template = store.load("bare.json").unwrap();
        assert_eq!(
            template.bindings().prompt_text,
            vec![SlotPath::new("3", "text")]
        );
    }
}

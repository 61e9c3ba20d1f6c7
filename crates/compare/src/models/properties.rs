//! Block-type specific property extraction.
//!
//! Each block type maps to a pure function turning the raw block config into
//! its comparable property list. Unknown block types fall back to
//! [`default_properties`].

use super::property::{PropertyModel, PropertyType};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Extracts the comparable properties of one block config
pub type PropertyExtractor = fn(&Map<String, Value>) -> Vec<PropertyModel>;

/// Config keys that are structure, not properties
pub const RESERVED_KEYS: &[&str] = &[
    "id",
    "blockType",
    "tag",
    "children",
    "events",
    "permissions",
    "artifacts",
];

static REGISTRY: OnceLock<HashMap<&'static str, PropertyExtractor>> = OnceLock::new();

fn registry() -> &'static HashMap<&'static str, PropertyExtractor> {
    REGISTRY.get_or_init(|| {
        let mut map: HashMap<&'static str, PropertyExtractor> = HashMap::new();
        for block_type in [
            "requestVcDocumentBlock",
            "requestVcDocumentBlockAddon",
            "externalDataBlock",
            "documentsSourceAddon",
            "documentValidatorBlock",
        ] {
            map.insert(block_type, schema_block_properties);
        }
        for block_type in ["calculateContainerBlock", "customLogicBlock"] {
            map.insert(block_type, calculate_block_properties);
        }
        for block_type in [
            "mintDocumentBlock",
            "retirementDocumentBlock",
            "tokenActionBlock",
            "tokenConfirmationBlock",
            "createTokenBlock",
        ] {
            map.insert(block_type, token_block_properties);
        }
        map
    })
}

/// Look up the extractor for a block type
pub fn extractor_for(block_type: &str) -> PropertyExtractor {
    registry()
        .get(block_type)
        .copied()
        .unwrap_or(default_properties)
}

/// Properties of a block config, dispatched on its block type
pub fn extract_properties(block_type: &str, config: &Map<String, Value>) -> Vec<PropertyModel> {
    extractor_for(block_type)(config)
}

/// Every non-reserved key, flattened
pub fn default_properties(config: &Map<String, Value>) -> Vec<PropertyModel> {
    let mut out = Vec::new();
    for (name, value) in config {
        if RESERVED_KEYS.contains(&name.as_str()) {
            continue;
        }
        out.extend(PropertyModel::flatten_entry(name, value));
    }
    out
}

fn schema_block_properties(config: &Map<String, Value>) -> Vec<PropertyModel> {
    retype(default_properties(config), &["schema"], PropertyType::Schema)
}

fn calculate_block_properties(config: &Map<String, Value>) -> Vec<PropertyModel> {
    retype(
        default_properties(config),
        &["inputSchema", "outputSchema"],
        PropertyType::Schema,
    )
}

fn token_block_properties(config: &Map<String, Value>) -> Vec<PropertyModel> {
    retype(
        default_properties(config),
        &["tokenId", "template", "tokenTemplate"],
        PropertyType::Token,
    )
}

fn retype(props: Vec<PropertyModel>, names: &[&str], kind: PropertyType) -> Vec<PropertyModel> {
    props
        .into_iter()
        .map(|prop| {
            let scalar = matches!(prop.kind, PropertyType::Property | PropertyType::Uuid);
            if prop.lvl == 1 && scalar && names.contains(&prop.name.as_str()) {
                prop.with_kind(kind)
            } else {
                prop
            }
        })
        .collect()
}

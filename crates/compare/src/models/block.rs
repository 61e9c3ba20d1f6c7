use super::artifact::ArtifactModel;
use super::event::EventModel;
use super::properties::extract_properties;
use super::property::{PropertyModel, PropertyType};
use crate::error::{CompareError, Result};
use crate::hash::{HashBuilder, WeightTree};
use crate::options::{CompareOptions, EventsLvl, KeyLvl};
use crate::rates::CompareItem;
use serde_json::{json, Value};
use std::collections::HashMap;

/// One node of a policy/tool/module block tree
#[derive(Debug, Clone)]
pub struct BlockModel {
    /// Position among siblings
    pub index: usize,
    pub block_type: String,
    pub tag: String,
    pub id: Option<String>,
    pub properties: Vec<PropertyModel>,
    pub permissions: Vec<String>,
    pub events: Vec<EventModel>,
    pub artifacts: Vec<ArtifactModel>,
    pub children: Vec<BlockModel>,
    weight: String,
    hash: String,
}

impl BlockModel {
    /// Parse a block config tree.
    ///
    /// A missing `children` key means no children; any other non-array value
    /// is rejected.
    pub fn from_json(config: &Value) -> Result<Self> {
        Self::parse(config, 0, "root")
    }

    fn parse(config: &Value, index: usize, path: &str) -> Result<Self> {
        let map = config
            .as_object()
            .ok_or_else(|| CompareError::missing_block_type(path))?;
        let block_type = map
            .get("blockType")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| CompareError::missing_block_type(path))?
            .to_string();

        let children = match map.get("children") {
            None => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, child)| Self::parse(child, i, &format!("{path}.children[{i}]")))
                .collect::<Result<Vec<_>>>()?,
            Some(_) => return Err(CompareError::invalid_children(path)),
        };

        let permissions = map
            .get("permissions")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            index,
            tag: map
                .get("tag")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            id: map.get("id").and_then(Value::as_str).map(str::to_string),
            properties: extract_properties(&block_type, map),
            permissions,
            events: EventModel::list_from_json(map.get("events")),
            artifacts: ArtifactModel::list_from_json(map.get("artifacts")),
            block_type,
            children,
            weight: String::new(),
            hash: String::new(),
        })
    }

    /// Cheap structural digest: block type and children shape
    pub fn weight(&self) -> &str {
        &self.weight
    }

    /// Full digest of everything the options compare
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Recompute weights and hashes bottom-up
    pub fn update(&mut self, options: &CompareOptions) {
        for child in &mut self.children {
            child.update(options);
        }

        let mut weight = HashBuilder::new();
        weight.add(&self.block_type);
        for child in &self.children {
            weight.add(&child.weight);
        }
        self.weight = weight.weight();

        let mut hash = HashBuilder::new();
        hash.add(&self.block_type);
        if options.key_lvl == KeyLvl::Exact {
            hash.add(&self.tag);
        }
        for prop in &self.properties {
            if let Some(part) = prop.hash(options) {
                hash.add(part);
            }
        }
        let mut permissions = self.permissions.clone();
        permissions.sort();
        hash.add(permissions.join(","));
        if options.event_lvl == EventsLvl::All {
            for event in &self.events {
                hash.add(event.hash_part());
            }
        }
        for artifact in &self.artifacts {
            hash.add(artifact.hash_part());
        }
        for child in &self.children {
            hash.add(&child.hash);
        }
        self.hash = hash.result();
    }

    /// Attach schema content hashes to `Schema` properties, keyed by iri/id
    pub fn link_schemas(&mut self, schemas: &HashMap<String, String>) {
        self.link_properties(PropertyType::Schema, schemas);
    }

    /// Attach token content hashes to `Token` properties, keyed by token id/tag
    pub fn link_tokens(&mut self, tokens: &HashMap<String, String>) {
        self.link_properties(PropertyType::Token, tokens);
    }

    fn link_properties(&mut self, kind: PropertyType, hashes: &HashMap<String, String>) {
        for prop in &mut self.properties {
            if prop.kind != kind {
                continue;
            }
            if let Some(hash) = prop.value.as_str().and_then(|v| hashes.get(v)) {
                prop.link(hash.clone());
            }
        }
        for child in &mut self.children {
            child.link_properties(kind, hashes);
        }
    }

    /// Fill artifact content hashes from loaded files, keyed by uuid
    pub fn link_artifacts(&mut self, files: &HashMap<String, ArtifactModel>) {
        for artifact in &mut self.artifacts {
            if let Some(file) = files.get(&artifact.uuid) {
                artifact.hash = file.hash.clone();
            }
        }
        for child in &mut self.children {
            child.link_artifacts(files);
        }
    }

    /// All property values of the given kind in this subtree
    pub fn collect_values(&self, kind: PropertyType, out: &mut Vec<String>) {
        out.extend(
            self.properties
                .iter()
                .filter(|p| p.kind == kind)
                .filter_map(|p| p.value.as_str().map(str::to_string)),
        );
        for child in &self.children {
            child.collect_values(kind, out);
        }
    }

    /// Number of blocks in this subtree
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(BlockModel::count).sum::<usize>()
    }

    /// This node alone, without its subtree
    pub fn shallow(&self) -> Self {
        Self {
            index: self.index,
            block_type: self.block_type.clone(),
            tag: self.tag.clone(),
            id: self.id.clone(),
            properties: self.properties.clone(),
            permissions: self.permissions.clone(),
            events: self.events.clone(),
            artifacts: self.artifacts.clone(),
            children: Vec::new(),
            weight: self.weight.clone(),
            hash: self.hash.clone(),
        }
    }

    /// Structural weight tree used by the hash comparator
    pub fn to_weight(&self) -> WeightTree {
        WeightTree {
            weight: self.hash.clone(),
            children: self.children.iter().map(BlockModel::to_weight).collect(),
        }
    }
}

impl CompareItem for BlockModel {
    fn key(&self) -> String {
        if self.tag.is_empty() {
            self.block_type.clone()
        } else {
            self.tag.clone()
        }
    }

    fn to_object(&self) -> Value {
        json!({
            "index": self.index,
            "blockType": self.block_type,
            "tag": self.tag,
            "permissions": self.permissions,
            "properties": self.properties.iter().map(CompareItem::to_object).collect::<Vec<_>>(),
            "events": self.events.iter().map(CompareItem::to_object).collect::<Vec<_>>(),
            "artifacts": self.artifacts.iter().map(CompareItem::to_object).collect::<Vec<_>>(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tree() -> Value {
        json!({
            "blockType": "interfaceContainerBlock",
            "tag": "root",
            "permissions": ["ANY_ROLE"],
            "children": [
                { "blockType": "policyRolesBlock", "tag": "choose_role", "roles": ["Registrant"] },
                {
                    "blockType": "requestVcDocumentBlock",
                    "tag": "submit",
                    "schema": "#a&1.0.0",
                    "events": [{ "source": "submit", "target": "save", "input": "RunEvent", "output": "RunEvent", "actor": "" }]
                }
            ]
        })
    }

    #[test]
    fn test_parse_tree() {
        let block = BlockModel::from_json(&tree()).unwrap();
        assert_eq!(block.block_type, "interfaceContainerBlock");
        assert_eq!(block.children.len(), 2);
        assert_eq!(block.children[1].index, 1);
        assert_eq!(block.children[1].events.len(), 1);
        assert_eq!(block.children[1].properties[0].kind, PropertyType::Schema);
        assert_eq!(block.permissions, vec!["ANY_ROLE".to_string()]);
        assert_eq!(block.count(), 3);
    }

    #[test]
    fn test_missing_block_type_reports_path() {
        let config = json!({ "blockType": "a", "children": [ {}, { "tag": "x" } ] });
        match BlockModel::from_json(&config) {
            Err(CompareError::MissingBlockType { path }) => assert_eq!(path, "root.children[0]"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_children() {
        let config = json!({ "blockType": "a", "children": null });
        assert!(matches!(
            BlockModel::from_json(&config),
            Err(CompareError::InvalidChildren { .. })
        ));
        let config = json!({ "blockType": "a", "children": { "0": {} } });
        assert!(matches!(
            BlockModel::from_json(&config),
            Err(CompareError::InvalidChildren { .. })
        ));
    }

    #[test]
    fn test_missing_children_key_is_a_leaf() {
        let block = BlockModel::from_json(&json!({ "blockType": "a", "tag": "root" })).unwrap();
        assert!(block.children.is_empty());
        assert_eq!(block.count(), 1);
        let config = json!({ "blockType": "a", "children": [{ "blockType": "b", "children": "x" }] });
        match BlockModel::from_json(&config) {
            Err(CompareError::InvalidChildren { path }) => assert_eq!(path, "root.children[0]"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_hash_tracks_content_weight_tracks_shape() {
        let options = CompareOptions::default();
        let mut a = BlockModel::from_json(&tree()).unwrap();
        let mut changed = tree();
        changed["children"][0]["roles"] = json!(["Verifier"]);
        let mut b = BlockModel::from_json(&changed).unwrap();
        a.update(&options);
        b.update(&options);
        assert_eq!(a.weight(), b.weight());
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn test_tag_only_hashed_under_exact_keys() {
        let mut renamed = tree();
        renamed["tag"] = json!("other");
        for (options, same) in [
            (CompareOptions::default(), true),
            (CompareOptions::strict(), false),
        ] {
            let mut a = BlockModel::from_json(&tree()).unwrap();
            let mut b = BlockModel::from_json(&renamed).unwrap();
            a.update(&options);
            b.update(&options);
            assert_eq!(a.hash() == b.hash(), same);
        }
    }
}

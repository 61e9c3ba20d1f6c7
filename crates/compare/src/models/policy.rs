use super::artifact::ArtifactModel;
use super::block::BlockModel;
use super::object::{ObjectKind, ObjectModel};
use super::schema::SchemaModel;
use crate::error::{CompareError, Result};
use crate::options::CompareOptions;
use crate::result::ModelInfo;
use serde_json::Value;
use std::collections::HashMap;

/// Comparable view of a policy record
#[derive(Debug, Clone)]
pub struct PolicyModel {
    pub info: ModelInfo,
    pub tree: BlockModel,
    pub roles: Vec<ObjectModel>,
    pub groups: Vec<ObjectModel>,
    pub topics: Vec<ObjectModel>,
    pub tokens: Vec<ObjectModel>,
    pub schemas: Vec<SchemaModel>,
    pub artifacts: Vec<ArtifactModel>,
    options: CompareOptions,
}

impl PolicyModel {
    /// Parse a policy record (`config` block tree plus role/group/topic/token lists)
    pub fn from_json(record: &Value, options: &CompareOptions) -> Result<Self> {
        let config = record
            .get("config")
            .filter(|c| c.is_object())
            .ok_or_else(|| CompareError::empty_config("policy"))?;
        Ok(Self {
            info: ModelInfo::from_record(record),
            tree: BlockModel::from_json(config)?,
            roles: ObjectModel::list_from_json(ObjectKind::Role, record.get("policyRoles")),
            groups: ObjectModel::list_from_json(ObjectKind::Group, record.get("policyGroups")),
            topics: ObjectModel::list_from_json(ObjectKind::Topic, record.get("policyTopics")),
            tokens: ObjectModel::list_from_json(ObjectKind::Token, record.get("policyTokens")),
            schemas: Vec::new(),
            artifacts: Vec::new(),
            options: options.clone(),
        })
    }

    pub fn options(&self) -> &CompareOptions {
        &self.options
    }

    pub fn set_schemas(&mut self, schemas: Vec<SchemaModel>) -> &mut Self {
        self.schemas = schemas;
        self
    }

    pub fn set_artifacts(&mut self, artifacts: Vec<ArtifactModel>) -> &mut Self {
        self.artifacts = artifacts;
        self
    }

    /// Link schemas, tokens and artifacts into the tree and recompute hashes
    pub fn update(&mut self) -> &mut Self {
        let options = &self.options;
        for list in [
            &mut self.roles,
            &mut self.groups,
            &mut self.topics,
            &mut self.tokens,
        ] {
            for item in list.iter_mut() {
                item.update(options);
            }
        }
        self.tree.link_schemas(&schema_hashes(&self.schemas));
        self.tree.link_tokens(&token_hashes(&self.tokens));
        self.tree.link_artifacts(&artifact_files(&self.artifacts));
        self.tree.update(options);
        self
    }

    pub fn info(&self) -> ModelInfo {
        self.info.clone()
    }
}

/// Schema content hashes keyed by iri and by id
pub(crate) fn schema_hashes(schemas: &[SchemaModel]) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for schema in schemas {
        for key in [&schema.iri, &schema.id].into_iter().flatten() {
            map.insert(key.clone(), schema.hash().to_string());
        }
    }
    map
}

/// Token weights keyed by template tag and, when present, token id
pub(crate) fn token_hashes(tokens: &[ObjectModel]) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for token in tokens {
        map.insert(token.key.clone(), token.weight().to_string());
        if let Some(token_id) = token
            .properties
            .iter()
            .find(|p| p.lvl == 1 && p.name == "tokenId")
            .and_then(|p| p.value.as_str())
        {
            map.insert(token_id.to_string(), token.weight().to_string());
        }
    }
    map
}

pub(crate) fn artifact_files(artifacts: &[ArtifactModel]) -> HashMap<String, ArtifactModel> {
    artifacts
        .iter()
        .map(|a| (a.uuid.clone(), a.clone()))
        .collect()
}

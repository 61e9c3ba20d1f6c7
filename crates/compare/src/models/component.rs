use super::artifact::ArtifactModel;
use super::block::BlockModel;
use super::object::{ObjectKind, ObjectModel};
use super::policy::{artifact_files, schema_hashes};
use super::schema::SchemaModel;
use crate::error::{CompareError, Result};
use crate::options::CompareOptions;
use crate::result::ModelInfo;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Tool,
    Module,
}

impl ComponentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tool => "tool",
            Self::Module => "module",
        }
    }
}

/// Root config keys compared as their own tables, not as block properties
const COMPONENT_KEYS: [&str; 3] = ["inputEvents", "outputEvents", "variables"];

/// Reusable sub-policy (tool or module): a block tree with declared
/// input/output events and variables.
#[derive(Debug, Clone)]
pub struct ComponentModel {
    pub kind: ComponentKind,
    pub info: ModelInfo,
    pub tree: BlockModel,
    pub input_events: Vec<ObjectModel>,
    pub output_events: Vec<ObjectModel>,
    pub variables: Vec<ObjectModel>,
    pub schemas: Vec<SchemaModel>,
    pub artifacts: Vec<ArtifactModel>,
    options: CompareOptions,
}

pub type ToolModel = ComponentModel;
pub type ModuleModel = ComponentModel;

impl ComponentModel {
    pub fn from_json(kind: ComponentKind, record: &Value, options: &CompareOptions) -> Result<Self> {
        let config = record
            .get("config")
            .filter(|c| c.is_object())
            .ok_or_else(|| CompareError::empty_config(kind.as_str()))?;
        let list = |kind: ObjectKind, key: &str| {
            ObjectModel::list_from_json(kind, config.get(key).or_else(|| record.get(key)))
        };
        let mut root = config.clone();
        if let Some(map) = root.as_object_mut() {
            for key in COMPONENT_KEYS {
                map.remove(key);
            }
        }
        Ok(Self {
            kind,
            info: ModelInfo::from_record(record),
            tree: BlockModel::from_json(&root)?,
            input_events: list(ObjectKind::InputEvent, "inputEvents"),
            output_events: list(ObjectKind::OutputEvent, "outputEvents"),
            variables: list(ObjectKind::Variable, "variables"),
            schemas: Vec::new(),
            artifacts: Vec::new(),
            options: options.clone(),
        })
    }

    pub fn tool(record: &Value, options: &CompareOptions) -> Result<Self> {
        Self::from_json(ComponentKind::Tool, record, options)
    }

    pub fn module(record: &Value, options: &CompareOptions) -> Result<Self> {
        Self::from_json(ComponentKind::Module, record, options)
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

    pub fn update(&mut self) -> &mut Self {
        let options = &self.options;
        for list in [
            &mut self.input_events,
            &mut self.output_events,
            &mut self.variables,
        ] {
            for item in list.iter_mut() {
                item.update(options);
            }
        }
        self.tree.link_schemas(&schema_hashes(&self.schemas));
        self.tree.link_artifacts(&artifact_files(&self.artifacts));
        self.tree.update(options);
        self
    }

    pub fn info(&self) -> ModelInfo {
        self.info.clone()
    }
}

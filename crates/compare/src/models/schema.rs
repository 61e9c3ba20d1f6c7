use super::field::FieldModel;
use crate::error::{CompareError, Result};
use crate::hash::HashBuilder;
use crate::options::CompareOptions;
use crate::result::ModelInfo;
use serde_json::{Map, Value};

const DEFS_PREFIX: &str = "#/$defs/";

/// Tracks the `$ref` chain while a schema is resolved
struct RefContext<'a> {
    defs: &'a Map<String, Value>,
    max_depth: Option<usize>,
    stack: Vec<String>,
}

impl<'a> RefContext<'a> {
    fn lookup(&self, reference: &str) -> Option<&'a Value> {
        self.defs.get(reference).or_else(|| {
            reference
                .strip_prefix(DEFS_PREFIX)
                .and_then(|name| self.defs.get(name))
        })
    }
}

/// `if / then / else` block of an `allOf` list
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionModel {
    /// Field tested by `if`
    pub field: String,
    /// Value the field is compared to
    pub value: Value,
    pub then_fields: Vec<String>,
    pub else_fields: Vec<String>,
}

impl ConditionModel {
    pub fn name(&self) -> String {
        format!("{} = {}", self.field, self.value)
    }

    fn negated_name(&self) -> String {
        format!("{} != {}", self.field, self.value)
    }
}

/// Parsed (sub-)schema: ordered fields plus conditions
#[derive(Debug, Clone, Default)]
pub struct SchemaDocumentModel {
    /// Direct fields followed by conditional ones
    pub fields: Vec<FieldModel>,
    pub conditions: Vec<ConditionModel>,
}

impl SchemaDocumentModel {
    /// Parse a JSON-Schema document, resolving `$ref`s through `$defs`
    /// within the options' ref depth.
    pub fn parse(document: &Value, options: &CompareOptions) -> Result<Self> {
        let empty = Map::new();
        let defs = document
            .get("$defs")
            .and_then(Value::as_object)
            .unwrap_or(&empty);
        let mut ctx = RefContext {
            defs,
            max_depth: options.max_ref_depth(),
            stack: Vec::new(),
        };
        Self::parse_level(document, 1, &mut ctx)
    }

    fn parse_level(document: &Value, lvl: usize, ctx: &mut RefContext<'_>) -> Result<Self> {
        let required = required_names(document);
        let mut fields = Vec::new();
        if let Some(properties) = document.get("properties").and_then(Value::as_object) {
            for (name, prop) in properties {
                if name == "@context" {
                    continue;
                }
                let field = FieldModel::from_json(name, prop, required.contains(name), fields.len(), lvl);
                fields.push(Self::resolve(field, lvl, ctx)?);
            }
        }

        let mut conditions = Vec::new();
        for entry in document
            .get("allOf")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
        {
            let Some(condition) = parse_condition(entry) else {
                continue;
            };
            for (branch, label) in [
                ("then", condition.name()),
                ("else", condition.negated_name()),
            ] {
                let Some(branch_doc) = entry.get(branch) else {
                    continue;
                };
                let branch_required = required_names(branch_doc);
                for (name, prop) in branch_doc
                    .get("properties")
                    .and_then(Value::as_object)
                    .into_iter()
                    .flatten()
                {
                    let mut field = FieldModel::from_json(
                        name,
                        prop,
                        branch_required.contains(name),
                        fields.len(),
                        lvl,
                    );
                    field.condition = Some(label.clone());
                    fields.push(Self::resolve(field, lvl, ctx)?);
                }
            }
            conditions.push(condition);
        }

        Ok(Self { fields, conditions })
    }

    fn resolve(mut field: FieldModel, lvl: usize, ctx: &mut RefContext<'_>) -> Result<FieldModel> {
        let Some(max_depth) = ctx.max_depth else {
            return Ok(field);
        };
        let Some(reference) = field.ref_target().map(str::to_string) else {
            return Ok(field);
        };
        if ctx.stack.contains(&reference) {
            return Err(CompareError::CircularRef(reference));
        }
        if ctx.stack.len() >= max_depth {
            return Err(CompareError::RefDepthExceeded {
                reference,
                depth: max_depth,
            });
        }
        let target = ctx
            .lookup(&reference)
            .ok_or_else(|| CompareError::UnresolvedRef(reference.clone()))?;
        ctx.stack.push(reference);
        let sub = Self::parse_level(target, lvl + 1, ctx);
        ctx.stack.pop();
        field.sub_schema = Some(sub?);
        Ok(field)
    }

    pub fn update(&mut self, options: &CompareOptions) {
        for field in &mut self.fields {
            field.update(options);
        }
    }
}

fn required_names(document: &Value) -> Vec<String> {
    document
        .get("required")
        .and_then(Value::as_array)
        .map(|names| {
            names
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn parse_condition(entry: &Value) -> Option<ConditionModel> {
    let (field, test) = entry
        .get("if")?
        .get("properties")?
        .as_object()?
        .iter()
        .next()?;
    let names = |branch: &str| -> Vec<String> {
        entry
            .get(branch)
            .and_then(|b| b.get("properties"))
            .and_then(Value::as_object)
            .map(|props| props.keys().cloned().collect())
            .unwrap_or_default()
    };
    Some(ConditionModel {
        field: field.clone(),
        value: test.get("const").cloned().unwrap_or(Value::Null),
        then_fields: names("then"),
        else_fields: names("else"),
    })
}

/// Schema record plus its parsed document
#[derive(Debug, Clone)]
pub struct SchemaModel {
    pub id: Option<String>,
    pub iri: Option<String>,
    pub name: String,
    pub description: String,
    pub topic_id: Option<String>,
    pub document: SchemaDocumentModel,
    info: ModelInfo,
    hash: String,
}

impl SchemaModel {
    /// Build from a schema record; `document` may be an object or JSON text
    pub fn from_json(record: &Value, options: &CompareOptions) -> Result<Self> {
        let parsed;
        let document = match record.get("document") {
            Some(Value::String(text)) => {
                parsed = serde_json::from_str::<Value>(text)?;
                &parsed
            }
            Some(doc @ Value::Object(_)) => doc,
            _ => return Err(CompareError::empty_config("schema")),
        };

        let mut info = ModelInfo::from_record(record);
        if info.iri.is_none() {
            info.iri = document.get("$id").and_then(Value::as_str).map(str::to_string);
        }
        if info.name.is_none() {
            info.name = document.get("title").and_then(Value::as_str).map(str::to_string);
        }

        let mut model = Self {
            id: info.id.clone(),
            iri: info.iri.clone(),
            name: info.name.clone().unwrap_or_default(),
            description: info
                .description
                .clone()
                .or_else(|| document.get("description").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_default(),
            topic_id: info.topic_id.clone(),
            document: SchemaDocumentModel::parse(document, options)?,
            info,
            hash: String::new(),
        };
        model.update(options);
        Ok(model)
    }

    pub fn fields(&self) -> &[FieldModel] {
        &self.document.fields
    }

    /// Content hash over field weights (identifiers excluded)
    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn update(&mut self, options: &CompareOptions) {
        self.document.update(options);
        let mut hash = HashBuilder::new();
        for field in &self.document.fields {
            hash.add(field.weight());
        }
        self.hash = hash.result();
    }

    pub fn info(&self) -> ModelInfo {
        self.info.clone()
    }

    /// Human readable label: description, then name, then iri
    pub fn title(&self) -> String {
        [&self.description, &self.name]
            .into_iter()
            .find(|s| !s.is_empty())
            .cloned()
            .or_else(|| self.iri.clone())
            .unwrap_or_default()
    }
}

use super::property::{PropertyModel, PropertyType};
use super::schema::SchemaDocumentModel;
use crate::hash::HashBuilder;
use crate::options::CompareOptions;
use crate::rates::CompareItem;
use serde::Deserialize;
use serde_json::{json, Value};

/// Extra field metadata stored as JSON in `$comment`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldComment {
    unit: Option<Value>,
    unit_system: Option<Value>,
    custom_type: Option<Value>,
    order_position: Option<i64>,
}

impl FieldComment {
    fn parse(comment: Option<&str>) -> Self {
        comment
            .and_then(|text| serde_json::from_str(text).ok())
            .unwrap_or_default()
    }
}

fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// One field of a JSON-Schema document
#[derive(Debug, Clone, Default)]
pub struct FieldModel {
    pub index: usize,
    pub lvl: usize,
    pub name: String,
    pub title: String,
    pub description: String,
    /// Field type, or the `$ref` target for reference fields
    pub field_type: Option<String>,
    pub format: Option<String>,
    pub pattern: Option<String>,
    pub unit: Option<String>,
    pub unit_system: Option<String>,
    pub custom_type: Option<String>,
    pub comment: Option<String>,
    pub remote_link: Option<String>,
    pub enum_values: Option<Vec<Value>>,
    pub is_array: bool,
    pub is_ref: bool,
    pub read_only: bool,
    pub required: bool,
    pub order: Option<i64>,
    pub condition: Option<String>,
    pub sub_schema: Option<SchemaDocumentModel>,
    weight: String,
}

impl FieldModel {
    /// Parse a schema property. `oneOf` takes its first alternative and
    /// arrays describe their `items`.
    pub fn from_json(name: &str, property: &Value, required: bool, index: usize, lvl: usize) -> Self {
        let mut prop = property;
        if let Some(first) = prop.get("oneOf").and_then(Value::as_array).and_then(|v| v.first()) {
            prop = first;
        }

        let text = |v: &Value, key: &str| scalar_text(v.get(key));
        let title = text(prop, "title").unwrap_or_else(|| name.to_string());
        let description = text(prop, "description").unwrap_or_else(|| name.to_string());
        let comment = prop.get("$comment").and_then(Value::as_str).map(str::to_string);
        let read_only = prop.get("readOnly").and_then(Value::as_bool).unwrap_or(false);

        let is_array = prop.get("type").and_then(Value::as_str) == Some("array");
        let item = if is_array {
            prop.get("items").unwrap_or(&Value::Null)
        } else {
            prop
        };

        let reference = text(item, "$ref");
        let is_ref = reference.is_some() && item.get("type").is_none();
        let (field_type, format, pattern, enum_values, remote_link) = if is_ref {
            (reference, None, None, None, None)
        } else {
            (
                text(item, "type"),
                text(item, "format"),
                text(item, "pattern"),
                item.get("enum").and_then(Value::as_array).cloned(),
                reference,
            )
        };

        let meta = FieldComment::parse(comment.as_deref());
        Self {
            index,
            lvl,
            name: name.to_string(),
            title,
            description,
            field_type,
            format,
            pattern,
            unit: scalar_text(meta.unit.as_ref()),
            unit_system: scalar_text(meta.unit_system.as_ref()),
            custom_type: scalar_text(meta.custom_type.as_ref()),
            comment,
            remote_link,
            enum_values,
            is_array,
            is_ref,
            read_only,
            required,
            order: meta.order_position.filter(|pos| *pos > -1),
            condition: None,
            sub_schema: None,
            weight: String::new(),
        }
    }

    /// `$ref` target of a reference field
    pub fn ref_target(&self) -> Option<&str> {
        if self.is_ref {
            self.field_type.as_deref()
        } else {
            None
        }
    }

    /// Fields of the resolved sub-schema
    pub fn children(&self) -> &[FieldModel] {
        match &self.sub_schema {
            Some(sub) => &sub.fields,
            None => &[],
        }
    }

    /// Comparable property list of this field
    pub fn prop_list(&self) -> Vec<PropertyModel> {
        let mut props = vec![
            PropertyModel::simple("name", json!(self.name)),
            PropertyModel::simple("title", json!(self.title)),
            PropertyModel::simple("description", json!(self.description)),
            PropertyModel::simple("required", json!(self.required)),
        ];
        let optional = [
            ("type", &self.field_type),
            ("format", &self.format),
            ("pattern", &self.pattern),
            ("customType", &self.custom_type),
            ("unit", &self.unit),
            ("unitSystem", &self.unit_system),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                props.push(PropertyModel::simple(name, json!(value)));
            }
        }
        props.push(PropertyModel::simple("readOnly", json!(self.read_only)));
        props.push(PropertyModel::simple("isArray", json!(self.is_array)));
        if let Some(link) = &self.remote_link {
            props.push(PropertyModel::simple("remoteLink", json!(link)));
        }
        if let Some(values) = &self.enum_values {
            props.push(PropertyModel::new(
                "enum",
                PropertyType::Array,
                json!(values.len()),
                1,
                "enum",
            ));
            for (i, v) in values.iter().enumerate() {
                props.push(PropertyModel::new(
                    i.to_string(),
                    PropertyType::Property,
                    v.clone(),
                    2,
                    format!("enum.{i}"),
                ));
            }
        }
        if let Some(condition) = &self.condition {
            props.push(PropertyModel::simple("condition", json!(condition)));
        }
        if let Some(order) = self.order {
            props.push(PropertyModel::simple("order", json!(order)));
        }
        props
    }

    pub fn weight(&self) -> &str {
        &self.weight
    }

    pub fn update(&mut self, options: &CompareOptions) {
        if let Some(sub) = &mut self.sub_schema {
            sub.update(options);
        }
        let mut hash = HashBuilder::new();
        for prop in self.prop_list() {
            if let Some(part) = prop.hash(options) {
                hash.add(part);
            }
        }
        for child in self.children() {
            hash.add(&child.weight);
        }
        self.weight = hash.result();
    }
}

impl CompareItem for FieldModel {
    fn key(&self) -> String {
        self.name.clone()
    }

    fn to_object(&self) -> Value {
        json!({
            "index": self.index,
            "name": self.name,
            "title": self.title,
            "description": self.description,
            "type": self.field_type,
            "format": self.format,
            "pattern": self.pattern,
            "unit": self.unit,
            "unitSystem": self.unit_system,
            "isArray": self.is_array,
            "isRef": self.is_ref,
            "readOnly": self.read_only,
            "required": self.required,
            "customType": self.custom_type,
            "comment": self.comment,
            "remoteLink": self.remote_link,
            "enum": self.enum_values,
            "condition": self.condition,
            "order": self.order,
        })
    }
}

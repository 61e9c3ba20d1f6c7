use crate::options::{CompareOptions, IdLvl, PropertiesLvl};
use crate::rates::CompareItem;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::OnceLock;

static UUID_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn uuid_regex() -> Option<&'static Regex> {
    UUID_RE
        .get_or_init(|| {
            Regex::new(
                r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$",
            )
            .ok()
        })
        .as_ref()
}

/// Whether a string looks like a UUID
pub fn is_uuid(value: &str) -> bool {
    uuid_regex().is_some_and(|re| re.is_match(value))
}

/// Kind of a flattened property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    Property,
    #[serde(rename = "UUID")]
    Uuid,
    Array,
    Object,
    Schema,
    Token,
}

/// One flattened property of a block, field, object or document.
///
/// Nested objects and arrays are flattened into dotted paths; the container
/// itself is kept as an `Object`/`Array` entry so that shape changes count.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyModel {
    pub name: String,
    pub lvl: usize,
    pub path: String,
    pub kind: PropertyType,
    pub value: Value,
    /// Content hash of the linked schema or token
    content_hash: Option<String>,
    /// Document system field (ignored with `IdLvl::None`)
    system: bool,
}

impl PropertyModel {
    pub fn new(
        name: impl Into<String>,
        kind: PropertyType,
        value: Value,
        lvl: usize,
        path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            lvl,
            path: path.into(),
            kind,
            value,
            content_hash: None,
            system: false,
        }
    }

    /// Scalar first-level property
    pub fn simple(name: impl Into<String>, value: Value) -> Self {
        let name = name.into();
        Self::new(name.clone(), PropertyType::Property, value, 1, name)
    }

    /// Flatten every entry of a JSON object into properties
    pub fn flatten(map: &Map<String, Value>) -> Vec<PropertyModel> {
        let mut out = Vec::new();
        for (name, value) in map {
            collect(name, name, 1, value, &mut out);
        }
        out
    }

    /// Flatten a single named value (and its descendants)
    pub fn flatten_entry(name: &str, value: &Value) -> Vec<PropertyModel> {
        let mut out = Vec::new();
        collect(name, name, 1, value, &mut out);
        out
    }

    /// Flatten a VC/VP document, marking system fields
    pub fn document_properties(document: &Value, subject_type: Option<&str>) -> Vec<PropertyModel> {
        let Some(map) = document.as_object() else {
            return Vec::new();
        };
        let mut props = Self::flatten(map);
        for prop in &mut props {
            prop.system = is_system_field(&prop.name, &prop.path, subject_type, &prop.value);
        }
        props
    }

    pub fn with_kind(mut self, kind: PropertyType) -> Self {
        self.kind = kind;
        self
    }

    pub fn is_system(&self) -> bool {
        self.system
    }

    pub fn content_hash(&self) -> Option<&str> {
        self.content_hash.as_deref()
    }

    /// Attach the content hash of the schema/token this property points to
    pub fn link(&mut self, content_hash: impl Into<String>) {
        self.content_hash = Some(content_hash.into());
    }

    /// Whether the options exclude this property from comparison
    pub fn ignored(&self, options: &CompareOptions) -> bool {
        match options.prop_lvl {
            PropertiesLvl::None => return true,
            PropertiesLvl::Simple if self.lvl > 1 => return true,
            _ => {}
        }
        if !options.allows_property(&self.name, &self.path) {
            return true;
        }
        if options.id_lvl == IdLvl::None && (self.system || self.kind == PropertyType::Uuid) {
            return true;
        }
        false
    }

    /// Comparable weight of the value
    fn weight(&self) -> String {
        match (&self.content_hash, &self.value) {
            (Some(hash), _) => hash.clone(),
            (None, Value::String(s)) => s.clone(),
            (None, other) => other.to_string(),
        }
    }

    /// Strict equality under the given options
    pub fn equal(&self, other: &PropertyModel, options: &CompareOptions) -> bool {
        if self.kind != other.kind {
            return false;
        }
        match self.kind {
            PropertyType::Uuid if options.id_lvl == IdLvl::None => true,
            PropertyType::Schema | PropertyType::Token if options.id_lvl == IdLvl::None => {
                self.weight() == other.weight()
            }
            _ => self.value == other.value,
        }
    }

    /// Hash fragment contributed to the owner's structural hash
    pub fn hash(&self, options: &CompareOptions) -> Option<String> {
        if self.ignored(options) {
            return None;
        }
        let weight = match self.kind {
            PropertyType::Schema | PropertyType::Token if options.id_lvl == IdLvl::None => {
                self.weight()
            }
            _ => match &self.value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            },
        };
        Some(format!("{}:{}", self.path, weight))
    }
}

impl CompareItem for PropertyModel {
    fn key(&self) -> String {
        self.path.clone()
    }

    fn to_object(&self) -> Value {
        let mut obj = json!({
            "name": self.name,
            "lvl": self.lvl,
            "path": self.path,
            "type": self.kind,
            "value": self.value,
        });
        if let (Some(hash), Some(map)) = (&self.content_hash, obj.as_object_mut()) {
            map.insert("hash".to_string(), Value::String(hash.clone()));
        }
        obj
    }
}

fn collect(name: &str, path: &str, lvl: usize, value: &Value, out: &mut Vec<PropertyModel>) {
    match value {
        Value::Object(map) => {
            out.push(PropertyModel::new(name, PropertyType::Object, Value::Null, lvl, path));
            for (key, child) in map {
                collect(key, &format!("{path}.{key}"), lvl + 1, child, out);
            }
        }
        Value::Array(items) => {
            out.push(PropertyModel::new(
                name,
                PropertyType::Array,
                Value::from(items.len()),
                lvl,
                path,
            ));
            for (index, child) in items.iter().enumerate() {
                collect(&index.to_string(), &format!("{path}.{index}"), lvl + 1, child, out);
            }
        }
        Value::String(s) if is_uuid(s) => {
            out.push(PropertyModel::new(name, PropertyType::Uuid, value.clone(), lvl, path));
        }
        _ => {
            out.push(PropertyModel::new(name, PropertyType::Property, value.clone(), lvl, path));
        }
    }
}

const SYSTEM_NAMES: &[&str] = &[
    "@context",
    "type",
    "policyId",
    "id",
    "ref",
    "tokenId",
    "issuanceDate",
    "issuer",
];

const PROOF_SUFFIXES: &[&str] = &[
    "proof.created",
    "proof.jws",
    "proof.proofPurpose",
    "proof.type",
    "proof.verificationMethod",
];

/// Fields that differ between any two issued documents regardless of content
pub fn is_system_field(name: &str, path: &str, subject_type: Option<&str>, value: &Value) -> bool {
    if SYSTEM_NAMES.contains(&name) {
        return true;
    }
    if subject_type == Some("MintToken") && name == "date" {
        return true;
    }
    if path == "proof"
        || path.contains("@context")
        || path.starts_with("proof.")
        || path.starts_with("type.")
        || PROOF_SUFFIXES.iter().any(|suffix| path.ends_with(suffix))
    {
        return true;
    }
    matches!(value, Value::String(s) if s.starts_with("did:hedera:"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_flatten_nested_object_and_array() {
        let config = json!({
            "title": "Approve",
            "uiMetaData": { "options": [ { "tag": "a" } ] }
        });
        let props = PropertyModel::flatten(config.as_object().unwrap());
        let paths: Vec<(&str, usize, PropertyType)> = props
            .iter()
            .map(|p| (p.path.as_str(), p.lvl, p.kind))
            .collect();
        assert_eq!(
            paths,
            vec![
                ("title", 1, PropertyType::Property),
                ("uiMetaData", 1, PropertyType::Object),
                ("uiMetaData.options", 2, PropertyType::Array),
                ("uiMetaData.options.0", 3, PropertyType::Object),
                ("uiMetaData.options.0.tag", 4, PropertyType::Property),
            ]
        );
        assert_eq!(props[2].value, json!(1));
    }

    #[test]
    fn test_uuid_values_are_detected() {
        let props = PropertyModel::flatten_entry("ref", &json!("3fa85f64-5717-4562-b3fc-2c963f66afa6"));
        assert_eq!(props[0].kind, PropertyType::Uuid);
        let props = PropertyModel::flatten_entry("ref", &json!("not-a-uuid"));
        assert_eq!(props[0].kind, PropertyType::Property);
    }

    #[test]
    fn test_uuid_ignored_without_id_level() {
        let a = PropertyModel::flatten_entry("id", &json!("3fa85f64-5717-4562-b3fc-2c963f66afa6"));
        let b = PropertyModel::flatten_entry("id", &json!("00000000-5717-4562-b3fc-2c963f66afa6"));
        let strict = CompareOptions::default();
        let hashing = CompareOptions::hashing();
        assert!(!a[0].equal(&b[0], &strict));
        assert!(a[0].equal(&b[0], &hashing));
        assert!(a[0].ignored(&hashing));
        assert!(!a[0].ignored(&strict));
    }

    #[test]
    fn test_schema_property_compares_by_content_without_ids() {
        let mut a = PropertyModel::simple("schema", json!("#aaa&1.0.0")).with_kind(PropertyType::Schema);
        let mut b = PropertyModel::simple("schema", json!("#bbb&1.0.0")).with_kind(PropertyType::Schema);
        a.link("same-fields");
        b.link("same-fields");
        assert!(a.equal(&b, &CompareOptions::hashing()));
        assert!(!a.equal(&b, &CompareOptions::default()));
    }

    #[test]
    fn test_simple_level_ignores_nested() {
        let options = CompareOptions {
            prop_lvl: PropertiesLvl::Simple,
            ..Default::default()
        };
        let props = PropertyModel::flatten_entry("a", &json!({"b": 1}));
        assert!(!props[0].ignored(&options));
        assert!(props[1].ignored(&options));
    }

    #[test]
    fn test_document_system_fields() {
        let doc = json!({
            "id": "urn:uuid:1",
            "issuer": "did:hedera:testnet:abc",
            "credentialSubject": [{ "field0": "x", "policyId": "p", "date": "2024" }],
            "proof": { "jws": "sig" }
        });
        let props = PropertyModel::document_properties(&doc, Some("MintToken"));
        let system: Vec<&str> = props
            .iter()
            .filter(|p| p.is_system())
            .map(|p| p.path.as_str())
            .collect();
        assert_eq!(
            system,
            vec![
                "id",
                "issuer",
                "credentialSubject.0.policyId",
                "credentialSubject.0.date",
                "proof",
                "proof.jws",
            ]
        );
    }
}

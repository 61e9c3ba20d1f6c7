use crate::error::{CompareError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Depth used by [`RefLvl::Default`]
pub const DEFAULT_REF_DEPTH: usize = 8;

/// Options controlling how deep and how strict a comparison goes.
///
/// Built once per comparison run and passed by reference through every
/// model constructor and rate calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareOptions {
    /// Which block/field properties take part in comparison
    pub prop_lvl: PropertiesLvl,

    /// How far below the two roots the tree walk goes
    pub child_lvl: ChildrenLvl,

    /// Whether block events are compared
    pub event_lvl: EventsLvl,

    /// Whether identifiers (UUIDs, DIDs, system fields) take part in comparison
    pub id_lvl: IdLvl,

    /// Whether a tag mismatch lowers the rate or only marks the row
    pub key_lvl: KeyLvl,

    /// How deeply schema `$ref`s are resolved
    pub ref_lvl: RefLvl,

    /// Optional allow/deny list of property names
    pub property_filter: Option<PropertyFilter>,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            prop_lvl: PropertiesLvl::All,
            child_lvl: ChildrenLvl::All,
            event_lvl: EventsLvl::All,
            id_lvl: IdLvl::All,
            key_lvl: KeyLvl::Any,
            ref_lvl: RefLvl::Default,
            property_filter: None,
        }
    }
}

impl CompareOptions {
    /// Everything compared, tags must match exactly
    pub fn strict() -> Self {
        Self {
            key_lvl: KeyLvl::Exact,
            ..Default::default()
        }
    }

    /// Options used to build structural policy hashes (identifiers ignored)
    pub fn hashing() -> Self {
        Self {
            id_lvl: IdLvl::None,
            ..Default::default()
        }
    }

    /// Compare tree shape only: no properties, no events
    pub fn structure_only() -> Self {
        Self {
            prop_lvl: PropertiesLvl::None,
            event_lvl: EventsLvl::None,
            ..Default::default()
        }
    }

    /// Attach an allow/deny list
    pub fn with_filter(mut self, filter: PropertyFilter) -> Self {
        self.property_filter = Some(filter);
        self
    }

    /// Validate options
    pub fn validate(&self) -> Result<()> {
        if let RefLvl::Limit(0) = self.ref_lvl {
            return Err(CompareError::invalid_options(
                "ref_lvl limit must be > 0 (use \"none\" to disable ref resolution)",
            ));
        }

        if let Some(filter) = &self.property_filter {
            if let Some(empty) = filter
                .allow
                .iter()
                .chain(filter.deny.iter())
                .find(|name| name.trim().is_empty())
            {
                return Err(CompareError::invalid_options(format!(
                    "property filter contains an empty name ({empty:?})"
                )));
            }
        }

        Ok(())
    }

    /// Whether a property with this name and dotted path passes the filter
    pub fn allows_property(&self, name: &str, path: &str) -> bool {
        self.property_filter
            .as_ref()
            .map_or(true, |filter| filter.allows(name, path))
    }

    /// Maximum `$ref` depth, `None` when refs are left unresolved
    pub fn max_ref_depth(&self) -> Option<usize> {
        match self.ref_lvl {
            RefLvl::None => None,
            RefLvl::Default => Some(DEFAULT_REF_DEPTH),
            RefLvl::Limit(depth) => Some(depth),
        }
    }
}

/// Allow/deny list of property names.
///
/// Entries match either the property name or its full dotted path. A denied
/// entry always wins; an empty allow list admits everything not denied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyFilter {
    pub allow: Vec<String>,
    pub deny: Vec<String>,
}

impl PropertyFilter {
    pub fn allows(&self, name: &str, path: &str) -> bool {
        let hit = |entry: &String| entry == name || entry == path;
        if self.deny.iter().any(hit) {
            return false;
        }
        self.allow.is_empty() || self.allow.iter().any(hit)
    }
}

/// Property comparison level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "LevelValue")]
pub enum PropertiesLvl {
    /// Properties are not compared
    None,
    /// Only first-level properties
    Simple,
    /// All nested properties
    All,
}

/// Children comparison level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "LevelValue")]
pub enum ChildrenLvl {
    /// Only the two roots
    None,
    /// Roots and their direct children
    First,
    /// The whole tree
    All,
}

/// Event comparison level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "LevelValue")]
pub enum EventsLvl {
    None,
    All,
}

/// Identifier comparison level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "LevelValue")]
pub enum IdLvl {
    /// UUIDs and document system fields are ignored
    None,
    All,
}

/// Key (tag) comparison level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "LevelValue")]
pub enum KeyLvl {
    /// Tag differences only mark the row `Partly`
    Any,
    /// Tag equality is scored as its own sub-rate
    Exact,
}

/// Schema `$ref` resolution level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "LevelValue")]
pub enum RefLvl {
    /// Refs stay unresolved
    None,
    /// Resolve up to [`DEFAULT_REF_DEPTH`]
    Default,
    /// Resolve up to the given depth
    Limit(usize),
}

/// Raw level as it arrives from TOML/JSON: a number, a name, or `{ limit = n }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum LevelValue {
    Number(u64),
    Name(String),
    Limit { limit: usize },
}

macro_rules! level_from_value {
    ($ty:ident) => {
        impl TryFrom<LevelValue> for $ty {
            type Error = String;

            fn try_from(value: LevelValue) -> std::result::Result<Self, Self::Error> {
                match value {
                    LevelValue::Number(n) => n.to_string().parse(),
                    LevelValue::Name(name) => name.parse(),
                    LevelValue::Limit { limit } => format!("limit:{limit}").parse(),
                }
            }
        }
    };
}

level_from_value!(PropertiesLvl);
level_from_value!(ChildrenLvl);
level_from_value!(EventsLvl);
level_from_value!(IdLvl);
level_from_value!(KeyLvl);
level_from_value!(RefLvl);

fn unknown_level(kind: &str, value: &str) -> String {
    format!("unknown {kind} level: {value}")
}

impl FromStr for PropertiesLvl {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "none" => Ok(Self::None),
            "1" | "simple" => Ok(Self::Simple),
            "2" | "all" => Ok(Self::All),
            other => Err(unknown_level("properties", other)),
        }
    }
}

impl FromStr for ChildrenLvl {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "none" => Ok(Self::None),
            "1" | "first" => Ok(Self::First),
            "2" | "all" => Ok(Self::All),
            other => Err(unknown_level("children", other)),
        }
    }
}

impl FromStr for EventsLvl {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "none" => Ok(Self::None),
            "1" | "all" => Ok(Self::All),
            other => Err(unknown_level("events", other)),
        }
    }
}

impl FromStr for IdLvl {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "none" => Ok(Self::None),
            "1" | "all" => Ok(Self::All),
            other => Err(unknown_level("id", other)),
        }
    }
}

impl FromStr for KeyLvl {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "any" | "default" => Ok(Self::Any),
            "1" | "exact" => Ok(Self::Exact),
            other => Err(unknown_level("key", other)),
        }
    }
}

impl FromStr for RefLvl {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        match lowered.as_str() {
            "0" | "none" => Ok(Self::None),
            "1" | "2" | "default" => Ok(Self::Default),
            other => other
                .strip_prefix("limit:")
                .and_then(|depth| depth.trim().parse().ok())
                .map(Self::Limit)
                .ok_or_else(|| unknown_level("ref", other)),
        }
    }
}

impl fmt::Display for RefLvl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Default => write!(f, "default"),
            Self::Limit(depth) => write!(f, "limit:{depth}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_options_are_valid() {
        assert!(CompareOptions::default().validate().is_ok());
        assert!(CompareOptions::strict().validate().is_ok());
        assert!(CompareOptions::hashing().validate().is_ok());
        assert!(CompareOptions::structure_only().validate().is_ok());
    }

    #[test]
    fn test_zero_ref_limit_is_rejected() {
        let options = CompareOptions {
            ref_lvl: RefLvl::Limit(0),
            ..Default::default()
        };
        assert!(matches!(
            options.validate(),
            Err(CompareError::InvalidOptions(_))
        ));
    }

    #[test]
    fn test_numeric_and_named_levels() {
        assert_eq!("0".parse::<PropertiesLvl>().unwrap(), PropertiesLvl::None);
        assert_eq!("simple".parse::<PropertiesLvl>().unwrap(), PropertiesLvl::Simple);
        assert_eq!("2".parse::<ChildrenLvl>().unwrap(), ChildrenLvl::All);
        assert_eq!("Exact".parse::<KeyLvl>().unwrap(), KeyLvl::Exact);
        assert_eq!("limit:3".parse::<RefLvl>().unwrap(), RefLvl::Limit(3));
        assert!("7".parse::<EventsLvl>().is_err());
    }

    #[test]
    fn test_options_from_json_accept_numbers() {
        let options: CompareOptions = serde_json::from_str(
            r#"{"prop_lvl": 1, "child_lvl": "first", "id_lvl": 0, "ref_lvl": {"limit": 2}}"#,
        )
        .unwrap();
        assert_eq!(options.prop_lvl, PropertiesLvl::Simple);
        assert_eq!(options.child_lvl, ChildrenLvl::First);
        assert_eq!(options.id_lvl, IdLvl::None);
        assert_eq!(options.ref_lvl, RefLvl::Limit(2));
        assert_eq!(options.event_lvl, EventsLvl::All);
        assert_eq!(options.max_ref_depth(), Some(2));
    }

    #[test]
    fn test_property_filter_deny_wins() {
        let filter = PropertyFilter {
            allow: vec!["uiMetaData".to_string(), "options.title".to_string()],
            deny: vec!["options.title".to_string()],
        };
        assert!(filter.allows("uiMetaData", "uiMetaData"));
        assert!(!filter.allows("title", "options.title"));
        assert!(!filter.allows("defaultActive", "defaultActive"));

        let deny_only = PropertyFilter {
            allow: vec![],
            deny: vec!["permissions".to_string()],
        };
        assert!(deny_only.allows("anything", "a.b"));
        assert!(!deny_only.allows("permissions", "x.permissions"));
    }
}

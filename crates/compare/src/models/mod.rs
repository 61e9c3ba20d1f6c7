//! Structural models: raw policy/schema/document JSON normalised into
//! comparable typed trees.

mod artifact;
mod block;
mod component;
mod document;
mod event;
mod field;
mod object;
mod policy;
pub mod properties;
mod property;
mod record;
mod schema;

pub use artifact::ArtifactModel;
pub use block::BlockModel;
pub use component::{ComponentKind, ComponentModel, ModuleModel, ToolModel};
pub use document::{DocumentKind, DocumentModel};
pub use event::EventModel;
pub use field::FieldModel;
pub use object::{ObjectKind, ObjectModel};
pub use policy::PolicyModel;
pub use property::{is_system_field, is_uuid, PropertyModel, PropertyType};
pub use record::RecordModel;
pub use schema::{ConditionModel, SchemaDocumentModel, SchemaModel};

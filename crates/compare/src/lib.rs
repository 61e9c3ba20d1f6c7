//! # Policy Compare
//!
//! Structural comparison of policies, tools, modules, schemas and issued
//! documents.
//!
//! ## Features
//!
//! - **Pairwise comparison** - one left model against each of the others
//! - **Scored reports** - per-row rates (`Equal`, `Partly`, `Added`, `Removed`) and a total
//! - **N-way merge** - fold K pairwise reports into one multi-column table
//! - **CSV export** - flat report for spreadsheets
//! - **Hash similarity** - fast approximate lookup over stored weight trees
//!
//! ## Architecture
//!
//! ```text
//! DocumentStore (JSON records)
//!     │
//!     ├──> Models
//!     │      ├─ BlockModel tree (policy / tool / module config)
//!     │      ├─ ObjectModel lists (roles, groups, topics, tokens, variables)
//!     │      ├─ SchemaModel fields, DocumentModel trees, RecordModel lists
//!     │      └─ update(): link schemas/tokens/artifacts, compute hashes
//!     │
//!     ├──> Compare utilities
//!     │      ├─ Align nodes (by index for trees, by key for lists)
//!     │      └─ Rate pairs: weighted sub-rates → total
//!     │
//!     └──> Comparators
//!            ├─ CompareResult (tables + total)
//!            ├─ MultiCompareResult (merged tables)
//!            └─ CSV
//! ```

pub mod comparators;
pub mod error;
pub mod hash;
pub mod models;
pub mod options;
pub mod rates;
pub mod report;
pub mod result;
pub mod store;
pub mod utils;

pub use comparators::{
    Comparator, DocumentComparator, HashComparator, HashMatch, HashedPolicy, ModuleComparator,
    PolicyComparator, PolicyHash, RecordComparator, SchemaComparator, ToolComparator,
};
pub use error::{CompareError, Result};
pub use hash::WeightTree;
pub use options::{
    ChildrenLvl, CompareOptions, EventsLvl, IdLvl, KeyLvl, PropertiesLvl, PropertyFilter, RefLvl,
};
pub use rates::{Rate, RateType};
pub use report::{Csv, ReportTable};
pub use result::{CompareResult, ModelInfo, MultiCompareResult};
pub use store::{ArtifactOwner, DocumentStore, MemoryStore};

//! # Policy Search
//!
//! Block pattern search over policy trees: given a small filter subtree,
//! find the places in a policy where the same block structure occurs.
//!
//! ```text
//! config JSON ──> RootSearchModel (arena, parent/prev/next links, paths)
//!                      │
//! filter node ────────>├──> SearchUtils::search
//!                      │      └─ one ChainSearchModel per candidate node
//!                      │
//!                      └──> SearchUtils::search_policies (best chain per tree)
//! ```

mod block;
mod chain;
mod error;
mod pair;
mod root;
mod utils;

pub use block::{BlockSearchModel, NodeId};
pub use chain::{ChainInfo, ChainSearchModel, PairInfo};
pub use error::{Result, SearchError};
pub use pair::PairSearchModel;
pub use root::RootSearchModel;
pub use utils::{PolicyMatch, SearchUtils};

use policy_compare::CompareError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Filter block not found: {0}")]
    FilterNotFound(String),

    #[error("Search tree is empty")]
    EmptyTree,

    #[error(transparent)]
    Compare(#[from] CompareError),
}

impl SearchError {
    pub fn filter_not_found(selector: impl Into<String>) -> Self {
        Self::FilterNotFound(selector.into())
    }
}

//! Subcommand handlers. Each returns the text written to stdout.

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use policy_compare::{
    Comparator, CompareOptions, DocumentComparator, DocumentStore, HashComparator, HashMatch,
    HashedPolicy, ModuleComparator, PolicyComparator, RecordComparator, SchemaComparator,
    ToolComparator,
};
use policy_search::{RootSearchModel, SearchUtils};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CompareKind {
    Policy,
    Tool,
    Module,
    Schema,
    Document,
    Record,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    /// Pairwise results as JSON
    Pairs,
    /// One merged multi-column result as JSON
    Merged,
    Csv,
}

fn to_json(value: &impl Serialize) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn render<C: Comparator>(comparator: &C, models: &[C::Model], output: Output) -> Result<String> {
    let results = comparator.compare(models)?;
    match output {
        Output::Pairs => to_json(&results),
        Output::Merged => to_json(&C::merge_compare_results(&results)?),
        Output::Csv => Ok(C::table_to_csv(&results)?),
    }
}

pub async fn run_compare(
    store: &dyn DocumentStore,
    kind: CompareKind,
    ids: &[String],
    options: CompareOptions,
    output: Output,
) -> Result<String> {
    if ids.len() < 2 {
        bail!("compare needs at least two ids, got {}", ids.len());
    }
    log::info!("Comparing {} {kind:?} models", ids.len());

    macro_rules! compare_with {
        ($comparator:ident) => {{
            let mut models = Vec::with_capacity(ids.len());
            for id in ids {
                let model = $comparator::create_model_by_id(store, id, &options)
                    .await
                    .with_context(|| format!("Failed to load {kind:?} {id}"))?;
                models.push(model);
            }
            render(&$comparator::new(options), &models, output)
        }};
    }

    match kind {
        CompareKind::Policy => compare_with!(PolicyComparator),
        CompareKind::Tool => compare_with!(ToolComparator),
        CompareKind::Module => compare_with!(ModuleComparator),
        CompareKind::Schema => compare_with!(SchemaComparator),
        CompareKind::Document => compare_with!(DocumentComparator),
        CompareKind::Record => compare_with!(RecordComparator),
    }
}

/// Where the filter block sits inside the filter policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterSelector {
    Tag(String),
    Path(Vec<usize>),
}

impl FilterSelector {
    /// `--path` takes dot-separated sibling indices, e.g. `0.2.1`
    pub fn parse_path(text: &str) -> Result<Vec<usize>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        text.split('.')
            .map(|part| {
                part.trim()
                    .parse()
                    .with_context(|| format!("Invalid path segment {part:?}"))
            })
            .collect()
    }
}

async fn load_tree(store: &dyn DocumentStore, id: &str) -> Result<RootSearchModel> {
    let record = store
        .get_policy(id)
        .await?
        .with_context(|| format!("Unknown policy: {id}"))?;
    Ok(RootSearchModel::from_policy(&record, CompareOptions::default())?)
}

pub async fn run_search(
    store: &dyn DocumentStore,
    ids: &[String],
    filter_id: &str,
    selector: &FilterSelector,
    limit: usize,
    threshold: u32,
) -> Result<String> {
    let filter = load_tree(store, filter_id).await?;
    let filter_node = match selector {
        FilterSelector::Tag(tag) => filter.find_by_tag(tag)?,
        FilterSelector::Path(path) => filter.find_by_path(path)?,
    };

    if let [id] = ids {
        let source = load_tree(store, id).await?;
        let chains = source.search(&filter, filter_node)?;
        let infos: Vec<_> = chains
            .iter()
            .take(limit)
            .map(|chain| chain.info(&source, &filter))
            .collect();
        return to_json(&infos);
    }

    let mut candidates = Vec::with_capacity(ids.len());
    for id in ids {
        candidates.push(load_tree(store, id).await?);
    }
    let mut found = SearchUtils::search_policies(&filter, filter_node, &candidates, threshold)?;
    found.truncate(limit);
    to_json(&found)
}

#[derive(Debug, Serialize)]
struct HashReport {
    policies: Vec<HashedPolicy>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    matches: Vec<HashMatch>,
}

/// Hash every policy; with several, rank the others against the first
pub async fn run_hash(store: &dyn DocumentStore, ids: &[String], threshold: u32) -> Result<String> {
    let mut policies = Vec::with_capacity(ids.len());
    for id in ids {
        let model = HashComparator::create_model(store, id).await?;
        policies.push(HashComparator::hashed(&model)?);
    }
    let matches = match policies.split_first() {
        Some((first, rest)) if !rest.is_empty() => HashComparator::search(first, rest, threshold),
        _ => Vec::new(),
    };
    to_json(&HashReport { policies, matches })
}

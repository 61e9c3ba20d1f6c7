//! Entity comparators.
//!
//! Every comparator takes the first model as the fixed left side and
//! compares it against each of the others, producing one [`CompareResult`]
//! per pair. Pairwise results can be folded into a [`MultiCompareResult`] or
//! exported as CSV.

mod columns;
mod document;
mod hash;
mod module;
mod policy;
mod record;
mod schema;
mod tool;

pub use document::DocumentComparator;
pub use hash::{HashComparator, HashMatch, HashedPolicy, PolicyHash};
pub use module::ModuleComparator;
pub use policy::PolicyComparator;
pub use record::RecordComparator;
pub use schema::SchemaComparator;
pub use tool::ToolComparator;

use crate::error::{CompareError, Result};
use crate::models::{ArtifactModel, SchemaModel};
use crate::options::CompareOptions;
use crate::report::{Csv, ReportTable};
use crate::result::{CompareResult, ModelInfo, MultiCompareResult};
use crate::store::{ArtifactOwner, DocumentStore};
use crate::utils::{CompareUtils, MergeLayout, MultiCompareUtils};
use indexmap::IndexMap;

/// Pairwise comparison of one model kind
pub trait Comparator {
    type Model;

    fn options(&self) -> &CompareOptions;

    /// Compare one left model against one right model
    fn compare_pair(&self, left: &Self::Model, right: &Self::Model) -> CompareResult;

    /// First model against every other one
    fn compare(&self, models: &[Self::Model]) -> Result<Vec<CompareResult>> {
        let (left, rights) = match models.split_first() {
            Some((left, rights)) if !rights.is_empty() => (left, rights),
            _ => return Err(CompareError::NotEnoughModels(models.len())),
        };
        log::debug!("Comparing 1 model against {}", rights.len());
        Ok(rights
            .iter()
            .map(|right| self.compare_pair(left, right))
            .collect())
    }

    /// Fold pairwise results sharing the same left into one multi-column report
    fn merge_compare_results(results: &[CompareResult]) -> Result<MultiCompareResult>;

    /// CSV export of pairwise results
    fn table_to_csv(results: &[CompareResult]) -> Result<String>;
}

/// Identity header of one CSV section: `(label, ModelInfo field)`
pub(crate) type IdentityColumns = &'static [(&'static str, &'static str)];

/// CSV layout shared by all comparators: the left identity, then per right
/// its identity, one titled section per table and the total.
pub(crate) fn csv_report(
    results: &[CompareResult],
    noun: &str,
    identity: IdentityColumns,
    sections: &[(&str, &str)],
) -> Result<String> {
    let first = results
        .first()
        .ok_or(CompareError::NotEnoughModels(results.len()))?;
    let mut csv = Csv::new();
    csv.add(format!("{noun} 1")).add_line();
    write_identity(&mut csv, identity, &first.left);

    for (i, result) in results.iter().enumerate() {
        csv.add_line();
        csv.add(format!("{noun} {}", i + 2)).add_line();
        write_identity(&mut csv, identity, &result.right);
        csv.add_line();

        for (title, table) in sections {
            csv.add(title).add_line();
            if let Some(table) = result.table(table) {
                CompareUtils::table_to_csv(&mut csv, table);
            }
            csv.add_line();
        }
        csv.add("Total").add(format!("{}%", result.total)).add_line();
    }
    Ok(csv.result())
}

fn write_identity(csv: &mut Csv, identity: IdentityColumns, info: &ModelInfo) {
    for (label, _) in identity {
        csv.add(label);
    }
    csv.add_line();
    for (_, field) in identity {
        csv.add(info.field(field));
    }
    csv.add_line();
}

/// Merge every named table with its layout
pub(crate) fn merge_results(
    results: &[CompareResult],
    layouts: &[(&str, MergeLayout)],
) -> Result<MultiCompareResult> {
    let first = results
        .first()
        .ok_or(CompareError::NotEnoughModels(results.len()))?;
    let mut tables: IndexMap<String, ReportTable> = IndexMap::new();
    for (name, layout) in layouts {
        let inputs: Vec<&ReportTable> = results.iter().filter_map(|r| r.table(name)).collect();
        tables.insert(name.to_string(), MultiCompareUtils::merge_table(&inputs, layout));
    }
    Ok(MultiCompareResult {
        size: results.len() + 1,
        left: first.left.clone(),
        rights: results.iter().map(|r| r.right.clone()).collect(),
        totals: results.iter().map(|r| r.total).collect(),
        tables,
    })
}

/// Fetch a record or fail with `NotFound`
pub(crate) fn require<T>(record: Option<T>, kind: &str, id: &str) -> Result<T> {
    record.ok_or_else(|| CompareError::not_found(kind, id))
}

/// Schemas published in the model's topic
pub(crate) async fn load_schemas(
    store: &dyn DocumentStore,
    topic_id: Option<&str>,
    options: &CompareOptions,
) -> Result<Vec<SchemaModel>> {
    let Some(topic_id) = topic_id else {
        return Ok(Vec::new());
    };
    let records = store.get_schemas(topic_id).await?;
    log::debug!("Loaded {} schemas from topic {topic_id}", records.len());
    records
        .iter()
        .map(|record| SchemaModel::from_json(record, options))
        .collect()
}

/// Artifact metadata of the owner with the SHA-256 of each file
pub(crate) async fn load_artifacts(
    store: &dyn DocumentStore,
    owner: ArtifactOwner,
) -> Result<Vec<ArtifactModel>> {
    let mut artifacts = Vec::new();
    for meta in store.get_artifacts(&owner).await? {
        let model = ArtifactModel::from_json(&meta);
        let data = store
            .get_artifact_file_by_uuid(&model.uuid)
            .await?
            .ok_or_else(|| CompareError::MissingArtifactFile(model.uuid.clone()))?;
        artifacts.push(model.with_data(&data));
    }
    Ok(artifacts)
}

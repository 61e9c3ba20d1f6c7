use super::columns::{block_columns, block_layout, block_row, object_columns, object_layout, object_row};
use super::{csv_report, load_artifacts, load_schemas, merge_results, require, Comparator, IdentityColumns};
use crate::error::Result;
use crate::models::{ObjectModel, PolicyModel};
use crate::options::CompareOptions;
use crate::rates::Rate;
use crate::report::ReportTable;
use crate::result::{CompareResult, MultiCompareResult};
use crate::store::{ArtifactOwner, DocumentStore};
use crate::utils::{ComparePolicyUtils, CompareUtils};
use indexmap::IndexMap;

const IDENTITY: IdentityColumns = &[
    ("Policy ID", "id"),
    ("Policy Name", "name"),
    ("Policy Description", "description"),
    ("Policy Topic", "topicId"),
    ("Policy Version", "version"),
    ("Policy Hash", "hash"),
    ("Policy Message", "messageId"),
];

const OBJECT_TABLES: [&str; 4] = ["roles", "groups", "topics", "tokens"];

/// Policies: block tree plus roles, groups, topics and tokens
#[derive(Debug, Clone, Default)]
pub struct PolicyComparator {
    options: CompareOptions,
}

impl PolicyComparator {
    pub fn new(options: CompareOptions) -> Self {
        Self { options }
    }

    /// Load a policy with its topic schemas and artifacts, ready to compare
    pub async fn create_model_by_id(
        store: &dyn DocumentStore,
        id: &str,
        options: &CompareOptions,
    ) -> Result<PolicyModel> {
        let record = require(store.get_policy(id).await?, "policy", id)?;
        let mut model = PolicyModel::from_json(&record, options)?;
        let schemas = load_schemas(store, model.info.topic_id.as_deref(), options).await?;
        let artifacts = load_artifacts(store, ArtifactOwner::Policy(id.to_string())).await?;
        log::info!(
            "Loaded policy {id}: {} blocks, {} schemas, {} artifacts",
            model.tree.count(),
            schemas.len(),
            artifacts.len()
        );
        model.set_schemas(schemas).set_artifacts(artifacts).update();
        Ok(model)
    }

    fn objects_table(rates: &[Rate<'_, ObjectModel>]) -> ReportTable {
        let mut table = ReportTable::new(object_columns());
        for rate in rates {
            table.push(object_row(rate));
        }
        table
    }
}

impl Comparator for PolicyComparator {
    type Model = PolicyModel;

    fn options(&self) -> &CompareOptions {
        &self.options
    }

    fn compare_pair(&self, left: &PolicyModel, right: &PolicyModel) -> CompareResult {
        let options = &self.options;
        let tree = ComparePolicyUtils::compare_blocks(&left.tree, &right.tree, options);
        let collections = [
            ComparePolicyUtils::compare_array(&left.roles, &right.roles, options),
            ComparePolicyUtils::compare_array(&left.groups, &right.groups, options),
            ComparePolicyUtils::compare_array(&left.topics, &right.topics, options),
            ComparePolicyUtils::compare_array(&left.tokens, &right.tokens, options),
        ];

        let mut blocks = ReportTable::new(block_columns());
        for (lvl, rate) in ComparePolicyUtils::tree_to_array(&tree, 1) {
            blocks.push(block_row(lvl, rate));
        }

        let mut rates = vec![CompareUtils::tree_total(&tree)];
        rates.extend(collections.iter().map(|c| CompareUtils::flat_total(c)));
        let total = CompareUtils::calc_total_rate(&rates);

        let mut tables = IndexMap::new();
        tables.insert("blocks".to_string(), blocks);
        for (name, rates) in OBJECT_TABLES.iter().zip(&collections) {
            tables.insert(name.to_string(), Self::objects_table(rates));
        }

        CompareResult {
            left: left.info(),
            right: right.info(),
            total,
            tables,
        }
    }

    fn merge_compare_results(results: &[CompareResult]) -> Result<MultiCompareResult> {
        let mut layouts = vec![("blocks", block_layout())];
        layouts.extend(OBJECT_TABLES.iter().map(|name| (*name, object_layout())));
        merge_results(results, &layouts)
    }

    fn table_to_csv(results: &[CompareResult]) -> Result<String> {
        csv_report(
            results,
            "Policy",
            IDENTITY,
            &[
                ("Policy Roles", "roles"),
                ("Policy Groups", "groups"),
                ("Policy Topics", "topics"),
                ("Policy Tokens", "tokens"),
                ("Policy Blocks", "blocks"),
            ],
        )
    }
}

use super::tool::{compare_components, merge_components};
use super::{csv_report, load_artifacts, load_schemas, require, Comparator, IdentityColumns};
use crate::error::Result;
use crate::models::{BlockModel, ComponentModel, ModuleModel};
use crate::options::CompareOptions;
use crate::rates::Rate;
use crate::result::{CompareResult, MultiCompareResult};
use crate::store::{ArtifactOwner, DocumentStore};
use crate::utils::{ComparePolicyUtils, CompareUtils};

const IDENTITY: IdentityColumns = &[
    ("Module ID", "id"),
    ("Module Name", "name"),
    ("Module Description", "description"),
    ("Module Hash", "hash"),
    ("Module Message", "messageId"),
];

/// Modules: same tables as tools, block rows scored in steps
#[derive(Debug, Clone, Default)]
pub struct ModuleComparator {
    options: CompareOptions,
}

impl ModuleComparator {
    pub fn new(options: CompareOptions) -> Self {
        Self { options }
    }

    pub async fn create_model_by_id(
        store: &dyn DocumentStore,
        id: &str,
        options: &CompareOptions,
    ) -> Result<ModuleModel> {
        let record = require(store.get_module_by_id(id).await?, "module", id)?;
        let mut model = ComponentModel::module(&record, options)?;
        let schemas = load_schemas(store, model.info.topic_id.as_deref(), options).await?;
        let artifacts = load_artifacts(store, ArtifactOwner::Module(id.to_string())).await?;
        log::info!("Loaded module {id}: {} blocks", model.tree.count());
        model.set_schemas(schemas).set_artifacts(artifacts).update();
        Ok(model)
    }
}

/// Each block row counts 100, 50 or 0
fn stepped_blocks_total(tree: &Rate<'_, BlockModel>) -> u32 {
    CompareUtils::stepped_total(
        ComparePolicyUtils::tree_to_array(tree, 1)
            .into_iter()
            .map(|(_, rate)| rate),
    )
}

impl Comparator for ModuleComparator {
    type Model = ModuleModel;

    fn options(&self) -> &CompareOptions {
        &self.options
    }

    fn compare_pair(&self, left: &ModuleModel, right: &ModuleModel) -> CompareResult {
        compare_components(left, right, &self.options, stepped_blocks_total)
    }

    fn merge_compare_results(results: &[CompareResult]) -> Result<MultiCompareResult> {
        merge_components(results)
    }

    fn table_to_csv(results: &[CompareResult]) -> Result<String> {
        csv_report(
            results,
            "Module",
            IDENTITY,
            &[
                ("Module Input Events", "input_events"),
                ("Module Output Events", "output_events"),
                ("Module Variables", "variables"),
                ("Module Blocks", "blocks"),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::{json, Value};

    fn record(id: &str, title: &str) -> Value {
        json!({
            "id": id,
            "config": {
                "blockType": "module",
                "children": [
                    { "blockType": "interfaceContainerBlock", "tag": "a" },
                    { "blockType": "interfaceActionBlock", "tag": "b", "uiMetaData": { "title": title, "type": "selector" } }
                ]
            }
        })
    }

    #[tokio::test]
    async fn test_stepped_block_scores() {
        let mut store = MemoryStore::new();
        store.add_module(record("m1", "A")).add_module(record("m2", "B"));
        let options = CompareOptions::default();
        let left = ModuleComparator::create_model_by_id(&store, "m1", &options).await.unwrap();
        let right = ModuleComparator::create_model_by_id(&store, "m2", &options).await.unwrap();

        let result = ModuleComparator::default().compare_pair(&left, &right);
        // block rows: root 100, a 100, b partly (> 50) -> 50; floor(250 / 3) = 83
        // events and variables are empty -> 100
        assert_eq!(result.total, 92);
        assert!(ModuleComparator::table_to_csv(&[result]).unwrap().starts_with("Module 1\n"));
    }
}

use super::columns::{block_columns, block_layout, block_row, object_columns, object_layout, object_row};
use super::{csv_report, load_artifacts, load_schemas, merge_results, require, Comparator, IdentityColumns};
use crate::error::Result;
use crate::models::{BlockModel, ComponentModel, ObjectModel, ToolModel};
use crate::options::CompareOptions;
use crate::rates::Rate;
use crate::report::ReportTable;
use crate::result::{CompareResult, MultiCompareResult};
use crate::store::{ArtifactOwner, DocumentStore};
use crate::utils::{ComparePolicyUtils, CompareUtils};
use indexmap::IndexMap;

const IDENTITY: IdentityColumns = &[
    ("Tool ID", "id"),
    ("Tool Name", "name"),
    ("Tool Description", "description"),
    ("Tool Hash", "hash"),
    ("Tool Message", "messageId"),
];

pub(super) const COMPONENT_TABLES: [&str; 4] = ["blocks", "input_events", "output_events", "variables"];

/// Compare two tools or modules. `blocks_total` turns the block tree rate
/// into the block section total.
pub(super) fn compare_components(
    left: &ComponentModel,
    right: &ComponentModel,
    options: &CompareOptions,
    blocks_total: fn(&Rate<'_, BlockModel>) -> u32,
) -> CompareResult {
    let tree = ComparePolicyUtils::compare_blocks(&left.tree, &right.tree, options);
    let input_events = ComparePolicyUtils::compare_array(&left.input_events, &right.input_events, options);
    let output_events = ComparePolicyUtils::compare_array(&left.output_events, &right.output_events, options);
    let variables = ComparePolicyUtils::compare_array(&left.variables, &right.variables, options);

    let mut blocks = ReportTable::new(block_columns());
    for (lvl, rate) in ComparePolicyUtils::tree_to_array(&tree, 1) {
        blocks.push(block_row(lvl, rate));
    }

    let other = CompareUtils::calc_total_rate(&[
        CompareUtils::flat_total(&input_events),
        CompareUtils::flat_total(&output_events),
        CompareUtils::flat_total(&variables),
    ]);
    let total = CompareUtils::calc_total_rate(&[other, blocks_total(&tree)]);

    let mut tables = IndexMap::new();
    tables.insert(COMPONENT_TABLES[0].to_string(), blocks);
    for (name, rates) in COMPONENT_TABLES[1..]
        .iter()
        .zip([&input_events, &output_events, &variables])
    {
        tables.insert(name.to_string(), objects_table(rates));
    }
    CompareResult {
        left: left.info(),
        right: right.info(),
        total,
        tables,
    }
}

fn objects_table(rates: &[Rate<'_, ObjectModel>]) -> ReportTable {
    let mut table = ReportTable::new(object_columns());
    for rate in rates {
        table.push(object_row(rate));
    }
    table
}

pub(super) fn merge_components(results: &[CompareResult]) -> Result<MultiCompareResult> {
    merge_results(
        results,
        &[
            (COMPONENT_TABLES[0], block_layout()),
            (COMPONENT_TABLES[1], object_layout()),
            (COMPONENT_TABLES[2], object_layout()),
            (COMPONENT_TABLES[3], object_layout()),
        ],
    )
}

/// Tools: block tree plus input/output events and variables
#[derive(Debug, Clone, Default)]
pub struct ToolComparator {
    options: CompareOptions,
}

impl ToolComparator {
    pub fn new(options: CompareOptions) -> Self {
        Self { options }
    }

    pub async fn create_model_by_id(
        store: &dyn DocumentStore,
        id: &str,
        options: &CompareOptions,
    ) -> Result<ToolModel> {
        let record = require(store.get_tool_by_id(id).await?, "tool", id)?;
        let mut model = ComponentModel::tool(&record, options)?;
        let schemas = load_schemas(store, model.info.topic_id.as_deref(), options).await?;
        let artifacts = load_artifacts(store, ArtifactOwner::Tool(id.to_string())).await?;
        log::info!("Loaded tool {id}: {} blocks", model.tree.count());
        model.set_schemas(schemas).set_artifacts(artifacts).update();
        Ok(model)
    }
}

impl Comparator for ToolComparator {
    type Model = ToolModel;

    fn options(&self) -> &CompareOptions {
        &self.options
    }

    fn compare_pair(&self, left: &ToolModel, right: &ToolModel) -> CompareResult {
        compare_components(left, right, &self.options, CompareUtils::tree_total)
    }

    fn merge_compare_results(results: &[CompareResult]) -> Result<MultiCompareResult> {
        merge_components(results)
    }

    fn table_to_csv(results: &[CompareResult]) -> Result<String> {
        csv_report(
            results,
            "Tool",
            IDENTITY,
            &[
                ("Tool Input Events", "input_events"),
                ("Tool Output Events", "output_events"),
                ("Tool Variables", "variables"),
                ("Tool Blocks", "blocks"),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn tool(id: &str, outputs: &[&str]) -> ToolModel {
        let outputs: Vec<Value> = outputs.iter().map(|n| json!({ "name": n })).collect();
        let record = json!({
            "id": id,
            "name": "Tool",
            "config": {
                "blockType": "tool",
                "inputEvents": [{ "name": "start" }],
                "outputEvents": outputs,
                "variables": [],
                "children": [{ "blockType": "interfaceContainerBlock", "tag": "c" }]
            }
        });
        let mut model = ComponentModel::tool(&record, &CompareOptions::default()).unwrap();
        model.update();
        model
    }

    #[test]
    fn test_tool_totals() {
        let comparator = ToolComparator::default();
        let same = comparator.compare_pair(&tool("a", &["done"]), &tool("b", &["done"]));
        assert_eq!(same.total, 100);

        // outputs: one of two rows removed -> flat total 50; other = round(250 / 3) = 83
        let result = comparator.compare_pair(&tool("a", &["done", "fail"]), &tool("b", &["done"]));
        assert_eq!(result.table("output_events").unwrap().len(), 2);
        assert_eq!(result.total, 92);
    }

    #[test]
    fn test_tool_csv_sections() {
        let results = ToolComparator::default()
            .compare(&[tool("a", &["done"]), tool("b", &[])])
            .unwrap();
        let csv = ToolComparator::table_to_csv(&results).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Tool 1");
        assert_eq!(lines[1], "Tool ID,Tool Name,Tool Description,Tool Hash,Tool Message");
        assert_eq!(lines[2], "a,Tool,,,");
        assert_eq!(lines[4], "Tool 2");
        assert!(lines.contains(&"Tool Output Events"));
        assert_eq!(lines.last(), Some(&"Total,84%"));
    }
}

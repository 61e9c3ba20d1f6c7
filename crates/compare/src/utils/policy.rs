use super::merge::MergeUtils;
use crate::models::{BlockModel, DocumentModel, FieldModel, ObjectModel, RecordModel};
use crate::options::{ChildrenLvl, CompareOptions};
use crate::rates::{block_rate, document_rate, field_rate, object_rate, Rate};

/// Recursive alignment of block trees, field trees, document trees and
/// flat collections.
pub struct ComparePolicyUtils;

impl ComparePolicyUtils {
    /// Positional tree diff of two block trees.
    ///
    /// Children are paired index by index; the longer list's tail becomes
    /// `Removed`/`Added` subtrees. The options' children level bounds the
    /// descent.
    pub fn compare_blocks<'a>(
        left: &'a BlockModel,
        right: &'a BlockModel,
        options: &CompareOptions,
    ) -> Rate<'a, BlockModel> {
        Self::compare_block_nodes(Some(left), Some(right), options, 0)
    }

    fn compare_block_nodes<'a>(
        left: Option<&'a BlockModel>,
        right: Option<&'a BlockModel>,
        options: &CompareOptions,
        depth: usize,
    ) -> Rate<'a, BlockModel> {
        let mut rate = block_rate(left, right, options);
        if !Self::descend(options, depth) {
            return rate;
        }
        let empty: &[BlockModel] = &[];
        let left_children = left.map_or(empty, |b| b.children.as_slice());
        let right_children = right.map_or(empty, |b| b.children.as_slice());
        rate.children = MergeUtils::align_by_index(left_children, right_children)
            .into_iter()
            .map(|(l, r)| Self::compare_block_nodes(l, r, options, depth + 1))
            .collect();
        rate
    }

    fn descend(options: &CompareOptions, depth: usize) -> bool {
        match options.child_lvl {
            ChildrenLvl::None => false,
            ChildrenLvl::First => depth == 0,
            ChildrenLvl::All => true,
        }
    }

    /// Key-aligned comparison of a flat collection (roles, tokens, variables, ...)
    pub fn compare_array<'a>(
        left: &'a [ObjectModel],
        right: &'a [ObjectModel],
        options: &CompareOptions,
    ) -> Vec<Rate<'a, ObjectModel>> {
        MergeUtils::align_by_key(left, right, |o| o.key.clone())
            .into_iter()
            .map(|(l, r)| object_rate(l, r, options))
            .collect()
    }

    /// Schema fields aligned by name within each level, recursing into
    /// resolved sub-schemas.
    pub fn compare_fields<'a>(
        left: &'a [FieldModel],
        right: &'a [FieldModel],
        options: &CompareOptions,
    ) -> Vec<Rate<'a, FieldModel>> {
        MergeUtils::align_by_key(left, right, |f| f.name.clone())
            .into_iter()
            .map(|(l, r)| {
                let empty: &[FieldModel] = &[];
                let mut rate = field_rate(l, r, options);
                rate.children = Self::compare_fields(
                    l.map_or(empty, FieldModel::children),
                    r.map_or(empty, FieldModel::children),
                    options,
                );
                rate
            })
            .collect()
    }

    /// Document trees: related documents are paired by position
    pub fn compare_documents<'a>(
        left: &'a DocumentModel,
        right: &'a DocumentModel,
        options: &CompareOptions,
    ) -> Rate<'a, DocumentModel> {
        Self::compare_document_nodes(Some(left), Some(right), options, 0)
    }

    fn compare_document_nodes<'a>(
        left: Option<&'a DocumentModel>,
        right: Option<&'a DocumentModel>,
        options: &CompareOptions,
        depth: usize,
    ) -> Rate<'a, DocumentModel> {
        let mut rate = document_rate(left, right, options);
        if !Self::descend(options, depth) {
            return rate;
        }
        let empty: &[DocumentModel] = &[];
        rate.children = MergeUtils::align_by_index(
            left.map_or(empty, |d| d.children.as_slice()),
            right.map_or(empty, |d| d.children.as_slice()),
        )
        .into_iter()
        .map(|(l, r)| Self::compare_document_nodes(l, r, options, depth + 1))
        .collect();
        rate
    }

    /// Record documents in issue order, paired by position
    pub fn compare_record<'a>(
        left: &'a RecordModel,
        right: &'a RecordModel,
        options: &CompareOptions,
    ) -> Vec<Rate<'a, DocumentModel>> {
        MergeUtils::align_by_index(&left.documents, &right.documents)
            .into_iter()
            .map(|(l, r)| document_rate(l, r, options))
            .collect()
    }

    /// Pre-order `(lvl, rate)` list of a rate tree; the root is at `lvl`
    pub fn tree_to_array<'r, 'a, T>(rate: &'r Rate<'a, T>, lvl: usize) -> Vec<(usize, &'r Rate<'a, T>)> {
        let mut out = Vec::with_capacity(rate.size());
        Self::collect_levels(rate, lvl, &mut out);
        out
    }

    /// [`Self::tree_to_array`] over a forest
    pub fn forest_to_array<'r, 'a, T>(rates: &'r [Rate<'a, T>], lvl: usize) -> Vec<(usize, &'r Rate<'a, T>)> {
        let mut out = Vec::new();
        for rate in rates {
            Self::collect_levels(rate, lvl, &mut out);
        }
        out
    }

    fn collect_levels<'r, 'a, T>(rate: &'r Rate<'a, T>, lvl: usize, out: &mut Vec<(usize, &'r Rate<'a, T>)>) {
        out.push((lvl, rate));
        for child in &rate.children {
            Self::collect_levels(child, lvl + 1, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ObjectKind;
    use crate::rates::RateType;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn tree(children: &[&str]) -> BlockModel {
        let children: Vec<_> = children
            .iter()
            .map(|tag| json!({ "blockType": "interfaceActionBlock", "tag": tag }))
            .collect();
        let mut block = BlockModel::from_json(&json!({
            "blockType": "interfaceContainerBlock",
            "tag": "root",
            "children": children
        }))
        .unwrap();
        block.update(&CompareOptions::default());
        block
    }

    #[test]
    fn test_removed_child_shifts_right_indices() {
        let left = tree(&["a", "b", "c"]);
        let right = tree(&["a", "c"]);
        let rate = ComparePolicyUtils::compare_blocks(&left, &right, &CompareOptions::default());
        let rows = ComparePolicyUtils::tree_to_array(&rate, 1);
        assert_eq!(rows.len(), 4);
        let removed: Vec<_> = rows.iter().filter(|(_, r)| r.kind == RateType::Removed).collect();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].0, 2);
        let right_indices: Vec<usize> = rows[1..].iter().filter_map(|(_, r)| r.right.map(|b| b.index)).collect();
        assert_eq!(right_indices, vec![0, 1]);
    }

    #[test]
    fn test_children_level_bounds_descent() {
        let left = tree(&["a"]);
        let right = tree(&["a", "b"]);
        let options = CompareOptions {
            child_lvl: ChildrenLvl::None,
            ..CompareOptions::default()
        };
        let rate = ComparePolicyUtils::compare_blocks(&left, &right, &options);
        assert!(rate.children.is_empty());
        let rate = ComparePolicyUtils::compare_blocks(&left, &right, &CompareOptions::default());
        assert_eq!(rate.children[1].kind, RateType::Added);
    }

    #[test]
    fn test_compare_array_by_key() {
        let left = ObjectModel::list_from_json(ObjectKind::Role, Some(&json!(["A", "B"])));
        let right = ObjectModel::list_from_json(ObjectKind::Role, Some(&json!(["B", "C"])));
        let rates = ComparePolicyUtils::compare_array(&left, &right, &CompareOptions::default());
        let kinds: Vec<RateType> = rates.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![RateType::Removed, RateType::Equal, RateType::Added]);
    }

    #[test]
    fn test_compare_fields_recurses_into_unpaired() {
        let parse = |doc: serde_json::Value| {
            crate::models::SchemaDocumentModel::parse(&doc, &CompareOptions::default()).unwrap()
        };
        let left = parse(json!({
            "$defs": { "#child": { "properties": { "x": { "type": "string" } } } },
            "properties": { "a": { "$ref": "#child" } }
        }));
        let right = parse(json!({ "properties": { "b": { "type": "string" } } }));
        let rates = ComparePolicyUtils::compare_fields(&left.fields, &right.fields, &CompareOptions::default());
        let rows = ComparePolicyUtils::forest_to_array(&rates, 1);
        let summary: Vec<(usize, RateType)> = rows.iter().map(|(lvl, r)| (*lvl, r.kind)).collect();
        assert_eq!(
            summary,
            vec![(1, RateType::Removed), (2, RateType::Removed), (1, RateType::Added)]
        );
    }
}

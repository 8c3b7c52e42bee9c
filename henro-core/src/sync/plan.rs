//! Resolves a [`RowMapping`] against a table and turns rows into documents.

use crate::models::{Document, DocumentKey, Value};
use crate::rules::{DerivationRule, RowMapping};
use crate::table::Table;

use super::error::SyncError;

/// A mapping whose column names have been resolved to table positions.
///
/// Compiling checks every referenced column up front, so a missing column is
/// reported before any row is touched.
#[derive(Debug)]
pub struct SyncPlan<'m> {
    key_index: usize,
    columns: Vec<(usize, &'m str)>,
    rules: Vec<(Vec<usize>, &'m DerivationRule)>,
}

impl<'m> SyncPlan<'m> {
    pub fn compile(table: &Table, mapping: &'m RowMapping) -> Result<Self, SyncError> {
        let key_index = resolve(table, &mapping.key_column)?;

        let mut columns = Vec::with_capacity(mapping.columns.len());
        for column in &mapping.columns {
            columns.push((resolve(table, &column.source)?, column.target.as_str()));
        }

        let mut rules = Vec::with_capacity(mapping.rules.len());
        for rule in &mapping.rules {
            let mut indices = Vec::with_capacity(rule.inputs().len());
            for input in rule.inputs() {
                indices.push(resolve(table, input)?);
            }
            rules.push((indices, rule));
        }

        Ok(Self {
            key_index,
            columns,
            rules,
        })
    }

    /// Builds the keyed document for one row. `row_number` is 1-based.
    pub fn document_for(
        &self,
        row_number: usize,
        row: &[Value],
    ) -> Result<(DocumentKey, Document), SyncError> {
        // Rules may read the key column too; a bad key is reported as such
        let key = DocumentKey::from_value(&row[self.key_index]).map_err(|source| {
            SyncError::KeyCoercion {
                row: row_number,
                source,
            }
        })?;

        let mut document = Document::new();

        for (index, target) in &self.columns {
            document.insert(*target, row[*index].clone());
        }

        for (indices, rule) in &self.rules {
            let inputs: Vec<&Value> = indices.iter().map(|i| &row[*i]).collect();
            let value = rule.apply(&inputs).map_err(|source| SyncError::Derivation {
                row: row_number,
                field: rule.field().to_string(),
                source,
            })?;

            if let Value::GeoPoint(point) = &value {
                if !point.in_bounds() {
                    tracing::warn!(
                        row = row_number,
                        field = rule.field(),
                        "Coordinates {} are out of range; writing as given",
                        point
                    );
                }
            }

            document.insert(rule.field(), value);
        }

        Ok((key, document))
    }

    /// Builds every document in table order. Fails on the first bad row.
    pub fn build_documents(&self, table: &Table) -> Result<Vec<(DocumentKey, Document)>, SyncError> {
        table
            .rows()
            .enumerate()
            .map(|(i, row)| self.document_for(i + 1, row))
            .collect()
    }
}

fn resolve(table: &Table, column: &str) -> Result<usize, SyncError> {
    table
        .column_index(column)
        .ok_or_else(|| SyncError::MissingColumn {
            column: column.to_string(),
        })
}

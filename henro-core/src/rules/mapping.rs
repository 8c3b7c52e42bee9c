use super::DerivationRule;

/// A column copied into the document under a (possibly different) field name.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMapping {
    pub source: String,
    pub target: String,
}

impl ColumnMapping {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// How rows of a table become keyed documents.
#[derive(Debug, Clone)]
pub struct RowMapping {
    pub key_column: String,
    pub columns: Vec<ColumnMapping>,
    pub rules: Vec<DerivationRule>,
}

impl RowMapping {
    pub fn new(key_column: impl Into<String>) -> Self {
        Self {
            key_column: key_column.into(),
            columns: Vec::new(),
            rules: Vec::new(),
        }
    }

    pub fn with_column(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.columns.push(ColumnMapping::new(source, target));
        self
    }

    pub fn with_rule(mut self, rule: DerivationRule) -> Self {
        self.rules.push(rule);
        self
    }
}

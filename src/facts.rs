use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// Table name prefix expected for every table of the target schema.
pub const WP_PREFIX: &str = "wp_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum TableOp {
    #[strum(to_string = "DROP TABLE")]
    Drop,
    #[strum(to_string = "CREATE TABLE")]
    Create,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableFact {
    pub op: TableOp,
    /// Case preserved, quoting characters and surrounding whitespace removed.
    pub name: String,
}

impl TableFact {
    pub fn new(op: TableOp, name: impl Into<String>) -> Self {
        Self {
            op,
            name: name.into(),
        }
    }

    pub fn has_wp_prefix(&self) -> bool {
        self.name.contains(WP_PREFIX)
    }
}

/// Tables whose `INSERT INTO` rows are collected during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum InsertTarget {
    #[strum(to_string = "wp_options")]
    Options,
    #[strum(to_string = "wp_blogs")]
    Blogs,
}

impl InsertTarget {
    pub fn table_name(&self) -> &'static str {
        match self {
            InsertTarget::Options => "wp_options",
            InsertTarget::Blogs => "wp_blogs",
        }
    }
}

/// One row of an `INSERT INTO` statement keyed by the header tuple's columns.
///
/// Columns keep header order. A column without a positional value maps to `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertRecord {
    pub table: String,
    pub fields: IndexMap<String, Option<String>>,
}

impl InsertRecord {
    /// Value of `column`, `None` when the column is missing or has no value.
    pub fn value(&self, column: &str) -> Option<&str> {
        self.fields.get(column).and_then(|v| v.as_deref())
    }
}

/// Everything the extraction pass learned about a dump.
///
/// Built once by [`crate::parser::FactExtractor`] and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpFacts {
    pub drop_tables: Vec<TableFact>,
    pub create_tables: Vec<TableFact>,
    pub charsets: Vec<String>,
    pub database_statements: Vec<String>,
    pub options_records: Vec<InsertRecord>,
    pub blogs_records: Vec<InsertRecord>,
}

impl DumpFacts {
    pub fn tables(&self, op: TableOp) -> &[TableFact] {
        match op {
            TableOp::Drop => &self.drop_tables,
            TableOp::Create => &self.create_tables,
        }
    }

    /// Names of the `op` tables, split on whether they carry the `wp_` prefix.
    pub fn table_names(&self, op: TableOp, wp_prefixed: bool) -> Vec<&str> {
        self.tables(op)
            .iter()
            .filter(|fact| fact.has_wp_prefix() == wp_prefixed)
            .map(|fact| fact.name.as_str())
            .collect()
    }

    pub fn records(&self, target: InsertTarget) -> &[InsertRecord] {
        match target {
            InsertTarget::Options => &self.options_records,
            InsertTarget::Blogs => &self.blogs_records,
        }
    }

    pub(crate) fn push_table(&mut self, fact: TableFact) {
        match fact.op {
            TableOp::Drop => self.drop_tables.push(fact),
            TableOp::Create => self.create_tables.push(fact),
        }
    }

    pub(crate) fn extend_records(&mut self, target: InsertTarget, records: Vec<InsertRecord>) {
        match target {
            InsertTarget::Options => self.options_records.extend(records),
            InsertTarget::Blogs => self.blogs_records.extend(records),
        }
    }
}

use strum::IntoEnumIterator;

use crate::facts::{DumpFacts, InsertTarget, TableFact, TableOp};

pub mod rows;

const DROP_TABLE: &str = "DROP TABLE ";
const CREATE_TABLE: &str = "CREATE TABLE ";
const CHARSET: &str = "CHARSET";
const DATABASE_STATEMENTS: [&str; 2] = ["CREATE DATABASE", "DROP DATABASE"];

/// Accumulates [`DumpFacts`] one statement at a time.
///
/// Every statement is classified independently, so the same accumulator can
/// be fed from a fully split dump or from a statement stream.
#[derive(Debug, Default)]
pub struct FactExtractor {
    facts: DumpFacts,
}

impl FactExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn facts(&self) -> &DumpFacts {
        &self.facts
    }

    pub fn finish(self) -> DumpFacts {
        self.facts
    }

    pub fn extract(&mut self, statement: &str) {
        if let Some(fact) = parse_drop_table(statement) {
            log::debug!("Found {} {}", fact.op, fact.name);
            self.facts.push_table(fact);
        }

        if let Some(fact) = parse_create_table(statement) {
            log::debug!("Found {} {}", fact.op, fact.name);
            self.facts.push_table(fact);
            if let Some(charset) = parse_charset(statement) {
                log::debug!("Found charset {}", charset);
                self.facts.charsets.push(charset.to_owned());
            }
        }

        if is_database_statement(statement) {
            log::debug!("Found database statement: {}", statement);
            self.facts.database_statements.push(statement.to_owned());
        }

        for target in InsertTarget::iter() {
            let records = rows::parse_insert_rows(statement, target.table_name());
            if !records.is_empty() {
                log::debug!("Found {} {} rows", records.len(), target);
                self.facts.extend_records(target, records);
            }
        }
    }
}

/// Runs a [`FactExtractor`] over `statements` in order.
pub fn extract_statements<I, S>(statements: I) -> DumpFacts
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut extractor = FactExtractor::new();
    for statement in statements {
        extractor.extract(statement.as_ref());
    }
    let facts = extractor.finish();
    log::info!(
        "Extracted {} DROP TABLE, {} CREATE TABLE, {} charsets, {} database statements, {} wp_options rows, {} wp_blogs rows",
        facts.drop_tables.len(),
        facts.create_tables.len(),
        facts.charsets.len(),
        facts.database_statements.len(),
        facts.options_records.len(),
        facts.blogs_records.len(),
    );
    facts
}

/// `DROP TABLE [IF EXISTS] <name>` anywhere in the statement.
pub fn parse_drop_table(statement: &str) -> Option<TableFact> {
    let rest = line_after(statement, DROP_TABLE)?;
    let rest = rest.trim_start();
    let rest = rest.strip_prefix("IF EXISTS ").unwrap_or(rest);
    let name = match rest.rfind(';') {
        Some(end) => &rest[..end],
        None => rest,
    };
    table_fact(TableOp::Drop, name)
}

/// `CREATE TABLE <name> (` anywhere in the statement. Column definitions are ignored.
pub fn parse_create_table(statement: &str) -> Option<TableFact> {
    let rest = line_after(statement, CREATE_TABLE)?;
    let rest = rest.trim_start();
    let rest = rest.strip_prefix("IF NOT EXISTS ").unwrap_or(rest);
    let end = rest.find('(')?;
    table_fact(TableOp::Create, &rest[..end])
}

/// First charset token following `CHARSET=` or `CHARSET `.
pub fn parse_charset(statement: &str) -> Option<&str> {
    statement.match_indices(CHARSET).find_map(|(idx, _)| {
        let rest = &statement[idx + CHARSET.len()..];
        let value = if let Some(value) = rest.strip_prefix('=') {
            value.trim_start_matches(' ')
        } else if rest.starts_with(' ') {
            let value = rest.trim_start_matches(' ');
            value.strip_prefix('=').map_or(value, |v| v.trim_start_matches(' '))
        } else {
            return None;
        };
        let end = value
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(value.len());
        let token = &value[..end];
        if token.is_empty() { None } else { Some(token) }
    })
}

/// Whether the statement opens with `CREATE DATABASE` or `DROP DATABASE`, in any case.
pub fn is_database_statement(statement: &str) -> bool {
    let statement = statement.trim_start();
    DATABASE_STATEMENTS
        .iter()
        .any(|prefix| starts_with_ignore_ascii_case(statement, prefix))
}

pub(crate) fn starts_with_ignore_ascii_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len()
        && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// Strips backticks, quotes and whitespace from both ends of an identifier.
pub(crate) fn unquote(s: &str) -> &str {
    s.trim_matches(|c: char| c == '`' || c == '\'' || c == '"' || c.is_whitespace())
}

fn line_after<'a>(statement: &'a str, keyword: &str) -> Option<&'a str> {
    let start = statement.find(keyword)? + keyword.len();
    let rest = &statement[start..];
    Some(rest.split('\n').next().unwrap_or(rest))
}

fn table_fact(op: TableOp, raw_name: &str) -> Option<TableFact> {
    let name = unquote(raw_name);
    if name.is_empty() {
        None
    } else {
        Some(TableFact::new(op, name))
    }
}

use indexmap::{IndexMap, IndexSet};

use crate::facts::InsertRecord;
use crate::parser::{starts_with_ignore_ascii_case, unquote};

const INSERT_INTO: &str = "INSERT INTO";

/// Table named by an `INSERT INTO <table>` statement, unquoted.
///
/// A qualified name (`db.table`) yields its last segment.
pub fn insert_table_name(statement: &str) -> Option<&str> {
    let statement = statement.trim_start();
    if !starts_with_ignore_ascii_case(statement, INSERT_INTO) {
        return None;
    }
    let rest = &statement[INSERT_INTO.len()..];
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let rest = rest.trim_start();
    let end = rest
        .find(|c: char| c.is_whitespace() || c == '(')
        .unwrap_or(rest.len());
    let name = rest[..end].rsplit('.').next().map(unquote)?;
    if name.is_empty() { None } else { Some(name) }
}

/// Top-level parenthesized groups of `sql`, parentheses included.
///
/// Nested groups stay inside their enclosing group so a value holding literal
/// parentheses does not cut its tuple short. Quotes are not tracked, and a
/// group still open at the end of the input is dropped.
pub fn paren_groups(sql: &str) -> Vec<&str> {
    let mut groups = vec![];
    let mut depth = 0usize;
    let mut start = 0;
    for (idx, c) in sql.char_indices() {
        match c {
            '(' => {
                if depth == 0 {
                    start = idx;
                }
                depth += 1;
            }
            ')' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    groups.push(&sql[start..=idx]);
                }
            }
            _ => {}
        }
    }
    if depth > 0 {
        log::warn!(
            "Dropping unbalanced parenthesized group: {}",
            sql[start..].chars().take(50).collect::<String>()
        );
    }
    groups
}

/// Rows of an `INSERT INTO <table>` statement as column-keyed records.
///
/// The first parenthesized group is always read as the column list. A
/// statement without an explicit column list therefore loses its first row,
/// which becomes the header. Values are split on every comma, quoted or not.
/// A column repeated in the header keeps a single field holding the value of
/// its last occurrence.
/// Returns nothing when the statement does not insert into `table`.
pub fn parse_insert_rows(statement: &str, table: &str) -> Vec<InsertRecord> {
    if insert_table_name(statement) != Some(table) {
        return vec![];
    }

    let groups = paren_groups(statement);
    let Some((header, tuples)) = groups.split_first() else {
        return vec![];
    };
    let columns = header_columns(header);
    if columns.iter().collect::<IndexSet<_>>().len() != columns.len() {
        log::warn!("Repeated columns in {} header: {:?}", table, columns);
    }
    log::debug!(
        "Parsing {} rows of {} with columns {:?}",
        tuples.len(),
        table,
        columns
    );

    tuples
        .iter()
        .map(|tuple| {
            let mut values = tuple_values(tuple).into_iter();
            let fields: IndexMap<String, Option<String>> = columns
                .iter()
                .map(|column| (column.clone(), values.next()))
                .collect();
            InsertRecord {
                table: table.to_owned(),
                fields,
            }
        })
        .collect()
}

fn header_columns(header: &str) -> Vec<String> {
    header
        .chars()
        .filter(|&c| !matches!(c, '(' | ')' | '\'' | '"' | '`') && !c.is_whitespace())
        .collect::<String>()
        .split(',')
        .map(str::to_owned)
        .collect()
}

fn tuple_values(tuple: &str) -> Vec<String> {
    let inner = tuple.strip_prefix('(').unwrap_or(tuple);
    let inner = inner.strip_suffix(')').unwrap_or(inner);
    inner
        .split(',')
        .map(|value| unquote(value).to_owned())
        .collect()
}

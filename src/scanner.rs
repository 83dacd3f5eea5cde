//! Text-level passes run over a raw dump before any statement is classified.
//!
//! Both passes are purely textual: they know nothing about quoting, so a `#`
//! or `--` at the start of a line or a `/*` sequence inside a string literal is
//! still treated as a comment. Dumps that rely on such literals are corrupted
//! here.

const CONDITIONAL_COMMENT_OPEN: &str = "/*!";
const CONDITIONAL_COMMENT_CLOSE: &str = "*/;";
const BLOCK_COMMENT_OPEN: &str = "/*";
const BLOCK_COMMENT_CLOSE: &str = "*/";

/// Removes comments from `sql`.
///
/// Conditional comments (`/*! ... */;`, including the trailing `;`) go first,
/// then generic block comments, then lines starting with `#` or `--`. Runs of
/// blank lines left behind are collapsed into a single newline.
pub fn strip_comments(sql: &str) -> String {
    let sql = remove_blocks(sql, CONDITIONAL_COMMENT_OPEN, CONDITIONAL_COMMENT_CLOSE);
    let sql = remove_blocks(&sql, BLOCK_COMMENT_OPEN, BLOCK_COMMENT_CLOSE);

    let mut stripped = String::with_capacity(sql.len());
    let mut last_was_newline = false;
    for (i, line) in sql.split('\n').enumerate() {
        if i > 0 && !last_was_newline {
            stripped.push('\n');
            last_was_newline = true;
        }
        if is_line_comment(line) || line.trim_end_matches('\r').is_empty() {
            continue;
        }
        stripped.push_str(line);
        last_was_newline = false;
    }
    stripped
}

fn is_line_comment(line: &str) -> bool {
    line.starts_with('#') || line.starts_with("--")
}

/// Removes every `open ... close` span, shortest match first.
/// An `open` marker without a matching `close` is left untouched.
fn remove_blocks(source: &str, open: &str, close: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(start) = rest.find(open) {
        let after_open = &rest[start + open.len()..];
        let Some(end) = after_open.find(close) else {
            break;
        };
        out.push_str(&rest[..start]);
        rest = &after_open[end + close.len()..];
    }
    out.push_str(rest);
    out
}

/// Splits `sql` into trimmed statements on `delimiter`.
///
/// A delimiter only terminates a statement when it ends its line. The piece
/// after the last delimiter is dropped when it is empty.
pub fn split_statements(sql: &str, delimiter: &str) -> Vec<String> {
    let sql = sql.replace('\r', "");
    let mut statements = vec![];

    if delimiter.is_empty() {
        let trimmed = sql.trim();
        if !trimmed.is_empty() {
            statements.push(trimmed.to_owned());
        }
        return statements;
    }

    let mut piece_start = 0;
    let mut search_from = 0;
    while let Some(offset) = sql[search_from..].find(delimiter) {
        let delimiter_start = search_from + offset;
        let delimiter_end = delimiter_start + delimiter.len();
        if is_end_of_line(&sql, delimiter_end) {
            statements.push(sql[piece_start..delimiter_start].trim().to_owned());
            piece_start = delimiter_end;
            search_from = delimiter_end;
        } else {
            // Retry one character further so overlapping delimiters are found.
            let step = sql[delimiter_start..]
                .chars()
                .next()
                .map_or(1, |c| c.len_utf8());
            search_from = delimiter_start + step;
        }
    }

    let last = sql[piece_start..].trim();
    if !last.is_empty() {
        statements.push(last.to_owned());
    }

    log::debug!("Split dump into {} statements", statements.len());
    statements
}

fn is_end_of_line(sql: &str, idx: usize) -> bool {
    idx == sql.len() || sql[idx..].starts_with('\n')
}

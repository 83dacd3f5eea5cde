//! # validate-sql
//!
//! A library for checking a WordPress database dump before it is imported.
//!
//! # Features
//!
//! - Strip comments and split a dump into statements on a configurable delimiter.
//! - Collect DROP/CREATE TABLE names, table charsets, CREATE/DROP DATABASE statements
//!   and the rows inserted into `wp_options` and `wp_blogs`.
//! - Evaluate a fixed battery of rules: `wp_` prefix, matching drops, charsets,
//!   core and multisite table coverage, database statements, `siteurl`/`home`
//!   options and `wp_blogs` domains and paths.
//!
//! # Example
//!
//! ```rust
//! use validate_sql::{rules::Severity, validate};
//!
//! let dump = r#"
//! DROP TABLE IF EXISTS `wp_posts`;
//! CREATE TABLE `wp_posts` (
//!   `ID` bigint(20) unsigned NOT NULL AUTO_INCREMENT
//! ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4;
//! "#;
//!
//! let findings = validate(dump, ";", false);
//! for finding in &findings {
//!     println!("{}: {}", finding.severity(), finding.summary());
//! }
//! assert_eq!(findings[0].severity(), Severity::Success);
//! ```
pub mod config;
pub mod facts;
pub mod input;
pub mod parser;
pub mod report;
pub mod rules;
pub mod scanner;

use facts::DumpFacts;
use rules::{Finding, RuleEngine};

/// Strips comments from `sql`, splits it on `delimiter` and extracts the facts
/// of every statement.
pub fn extract_facts(sql: &str, delimiter: &str) -> DumpFacts {
    log::debug!("Validating {}", sql.chars().take(50).collect::<String>());
    let cleaned = scanner::strip_comments(sql);
    let statements = scanner::split_statements(&cleaned, delimiter);
    parser::extract_statements(&statements)
}

/// Runs the whole pipeline over a dump and returns the findings in rule order.
///
/// The multisite rules only run when `multisite_confirmed` is set.
pub fn validate(sql: &str, delimiter: &str, multisite_confirmed: bool) -> Vec<Finding> {
    let facts = extract_facts(sql, delimiter);
    RuleEngine::new(&facts, multisite_confirmed).evaluate()
}

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

use crate::facts::{DumpFacts, InsertRecord, TableOp, WP_PREFIX};

pub mod catalog;

use catalog::ReferenceSet;

pub const OPTIONS_COLUMNS: [&str; 2] = ["option_name", "option_value"];
pub const BLOGS_COLUMNS: [&str; 4] = ["blog_id", "site_id", "domain", "path"];
const SITE_URL_OPTIONS: [&str; 2] = ["siteurl", "home"];

/// `Error` is reserved for failures reported outside the rule battery, such as
/// an unreadable dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum Severity {
    Success,
    Warning,
    Error,
}

/// The rule battery, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum Rule {
    Prefix,
    DropCreateMatching,
    Charset,
    CoreDropCoverage,
    CoreCreateCoverage,
    DatabaseStatements,
    Options,
    MultisiteDropCoverage,
    MultisiteCreateCoverage,
    Blogs,
}

impl Rule {
    /// Rules that only run once the operator confirmed a multisite dump.
    pub fn requires_multisite(&self) -> bool {
        matches!(self, Rule::MultisiteDropCoverage | Rule::MultisiteCreateCoverage)
    }

    pub fn heading(&self) -> &'static str {
        match self {
            Rule::Prefix => "Checking for wp_ prefix...",
            Rule::DropCreateMatching => "Checking for matching DROP TABLE statements...",
            Rule::Charset => "Checking for charset...",
            Rule::CoreDropCoverage => "Checking for DROP TABLE statements...",
            Rule::CoreCreateCoverage => "Checking for CREATE TABLE statements...",
            Rule::DatabaseStatements => "Checking for CREATE or DROP DATABASE statements...",
            Rule::Options => "Checking for siteurl and home options...",
            Rule::MultisiteDropCoverage => "Checking for DROP TABLE statements for multisite...",
            Rule::MultisiteCreateCoverage => {
                "Checking for CREATE TABLE statements for multisite..."
            }
            Rule::Blogs => "Checking for wp_blogs table...",
        }
    }
}

/// Rows attached to a finding, restricted to a fixed set of columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RecordTable {
    pub fn new(columns: &[&str], records: &[&InsertRecord]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: records
                .iter()
                .map(|record| {
                    columns
                        .iter()
                        .map(|column| record.value(column).map(str::to_owned))
                        .collect()
                })
                .collect(),
        }
    }
}

/// One outcome of a rule. Never modified after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    rule: Rule,
    severity: Severity,
    summary: String,
    details: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    table: Option<RecordTable>,
}

impl Finding {
    fn new(rule: Rule, severity: Severity, summary: impl Into<String>) -> Self {
        Self {
            rule,
            severity,
            summary: summary.into(),
            details: vec![],
            table: None,
        }
    }

    pub fn success(rule: Rule, summary: impl Into<String>) -> Self {
        Self::new(rule, Severity::Success, summary)
    }

    pub fn warning(rule: Rule, summary: impl Into<String>) -> Self {
        Self::new(rule, Severity::Warning, summary)
    }

    pub fn with_details<I, S>(mut self, details: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.details = details.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_table(mut self, table: RecordTable) -> Self {
        self.table = Some(table);
        self
    }

    pub fn rule(&self) -> Rule {
        self.rule
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn details(&self) -> &[String] {
        &self.details
    }

    pub fn table(&self) -> Option<&RecordTable> {
        self.table.as_ref()
    }
}

/// Evaluates the rule battery against the facts of one dump.
pub struct RuleEngine<'a> {
    facts: &'a DumpFacts,
    multisite_confirmed: bool,
}

impl<'a> RuleEngine<'a> {
    pub fn new(facts: &'a DumpFacts, multisite_confirmed: bool) -> Self {
        Self {
            facts,
            multisite_confirmed,
        }
    }

    /// Findings of every enabled rule, in rule order.
    pub fn evaluate(&self) -> Vec<Finding> {
        self.evaluate_rules(Rule::iter())
    }

    /// Findings of `rules` in the given order, skipping the multisite rules
    /// unless they were confirmed.
    pub fn evaluate_rules(&self, rules: impl IntoIterator<Item = Rule>) -> Vec<Finding> {
        rules
            .into_iter()
            .filter(|rule| self.multisite_confirmed || !rule.requires_multisite())
            .flat_map(|rule| self.evaluate_rule(rule))
            .collect()
    }

    pub fn evaluate_rule(&self, rule: Rule) -> Vec<Finding> {
        let facts = self.facts;
        let findings = match rule {
            Rule::Prefix => check_prefix(facts),
            Rule::DropCreateMatching => check_drop_create_matching(facts),
            Rule::Charset => check_charsets(&facts.charsets),
            Rule::CoreDropCoverage => vec![check_coverage(
                rule,
                ReferenceSet::Core,
                TableOp::Drop,
                &facts.table_names(TableOp::Drop, true),
            )],
            Rule::CoreCreateCoverage => vec![check_coverage(
                rule,
                ReferenceSet::Core,
                TableOp::Create,
                &facts.table_names(TableOp::Create, true),
            )],
            Rule::DatabaseStatements => vec![check_database_statements(
                &facts.database_statements,
            )],
            Rule::Options => vec![check_options(&facts.options_records)],
            Rule::MultisiteDropCoverage => vec![check_coverage(
                rule,
                ReferenceSet::Multisite,
                TableOp::Drop,
                &facts.table_names(TableOp::Drop, true),
            )],
            Rule::MultisiteCreateCoverage => vec![check_coverage(
                rule,
                ReferenceSet::Multisite,
                TableOp::Create,
                &facts.table_names(TableOp::Create, true),
            )],
            Rule::Blogs => check_blogs(&facts.blogs_records),
        };
        log::debug!("Rule {} produced {} findings", rule, findings.len());
        findings
    }
}

/// One warning per operation listing the tables without the `wp_` prefix.
pub fn check_prefix(facts: &DumpFacts) -> Vec<Finding> {
    let findings: Vec<Finding> = [TableOp::Drop, TableOp::Create]
        .into_iter()
        .filter_map(|op| {
            let offenders = facts.table_names(op, false);
            if offenders.is_empty() {
                None
            } else {
                Some(
                    Finding::warning(
                        Rule::Prefix,
                        format!("We have found some {} statements with a custom prefix.", op),
                    )
                    .with_details(offenders),
                )
            }
        })
        .collect();

    if findings.is_empty() {
        vec![Finding::success(
            Rule::Prefix,
            format!("All tables use the {} prefix", WP_PREFIX),
        )]
    } else {
        findings
    }
}

/// Every created table needs a drop of the same name, `wp_` tables against
/// `wp_` drops and custom tables against custom drops.
pub fn check_drop_create_matching(facts: &DumpFacts) -> Vec<Finding> {
    let findings: Vec<Finding> = [true, false]
        .into_iter()
        .flat_map(|wp_prefixed| {
            let drops = facts.table_names(TableOp::Drop, wp_prefixed);
            facts
                .table_names(TableOp::Create, wp_prefixed)
                .into_iter()
                .filter(move |create| !drops.contains(create))
                .map(|create| {
                    Finding::warning(
                        Rule::DropCreateMatching,
                        format!("There is a missing drop statement for {}", create),
                    )
                })
        })
        .collect();

    if findings.is_empty() {
        vec![Finding::success(
            Rule::DropCreateMatching,
            "We have found a DROP TABLE statement for each CREATE TABLE statement",
        )]
    } else {
        findings
    }
}

fn is_known_charset(charset: &str) -> bool {
    ["utf8mb4", "latin1", "utf8"]
        .iter()
        .any(|known| charset.eq_ignore_ascii_case(known))
}

pub fn check_charsets(charsets: &[String]) -> Vec<Finding> {
    if charsets.is_empty() {
        return vec![Finding::warning(
            Rule::Charset,
            "We have not found any UTF8MB4 charset, please check your SQL file",
        )];
    }

    let mut findings = vec![];
    if charsets.iter().any(|c| c.eq_ignore_ascii_case("utf8mb4")) {
        findings.push(Finding::success(
            Rule::Charset,
            "We have found some UTF8MB4 charsets",
        ));
    }
    findings.extend(
        charsets
            .iter()
            .filter(|c| c.eq_ignore_ascii_case("latin1") || c.eq_ignore_ascii_case("utf8"))
            .map(|c| {
                Finding::warning(
                    Rule::Charset,
                    format!(
                        "We have found a {} charset that should be converted to UTF8MB4",
                        c
                    ),
                )
            }),
    );

    let custom: Vec<&String> = charsets.iter().filter(|c| !is_known_charset(c)).collect();
    if !custom.is_empty() {
        findings.push(
            Finding::warning(
                Rule::Charset,
                "We have found some custom charset, please check your SQL file",
            )
            .with_details(custom.into_iter().cloned()),
        );
    }
    findings
}

/// Success when `present` covers the whole reference set, otherwise one
/// warning listing the missing tables.
pub fn check_coverage(rule: Rule, set: ReferenceSet, op: TableOp, present: &[&str]) -> Finding {
    let missing = set.missing(present);
    if missing.is_empty() {
        Finding::success(
            rule,
            format!(
                "We have found all required {} statements for {} tables",
                op, set
            ),
        )
    } else {
        let verb = match op {
            TableOp::Drop => "drop",
            TableOp::Create => "create",
        };
        Finding::warning(rule, format!("Missing {} {} statement:", set, verb)).with_details(missing)
    }
}

pub fn check_database_statements(statements: &[String]) -> Finding {
    if statements.is_empty() {
        Finding::success(
            Rule::DatabaseStatements,
            "There are no CREATE or DROP DATABASE statements",
        )
    } else {
        Finding::warning(
            Rule::DatabaseStatements,
            "We have found some unwanted statements:",
        )
        .with_details(statements.iter().cloned())
    }
}

/// Reports the `siteurl` and `home` rows of wp_options as a table.
pub fn check_options(records: &[InsertRecord]) -> Finding {
    if records.is_empty() {
        return Finding::warning(Rule::Options, "Unable to find the wp_options table.");
    }

    let site_urls: Vec<&InsertRecord> = records
        .iter()
        .filter(|record| {
            record
                .value("option_name")
                .is_some_and(|name| SITE_URL_OPTIONS.contains(&name))
        })
        .collect();
    let summary = format!("We have found {} entries.", site_urls.len());
    let finding = if site_urls.is_empty() {
        Finding::warning(Rule::Options, summary)
    } else {
        Finding::success(Rule::Options, summary)
    };
    finding.with_table(RecordTable::new(&OPTIONS_COLUMNS, &site_urls))
}

/// Lists the wp_blogs rows, then warns about every row without a domain or path.
/// A dump without wp_blogs rows produces no findings.
pub fn check_blogs(records: &[InsertRecord]) -> Vec<Finding> {
    if records.is_empty() {
        return vec![];
    }

    let all: Vec<&InsertRecord> = records.iter().collect();
    let mut findings = vec![
        Finding::success(Rule::Blogs, format!("We have found {} entries.", records.len()))
            .with_table(RecordTable::new(&BLOGS_COLUMNS, &all)),
    ];

    for record in records {
        let blog_id = record.value("blog_id").unwrap_or("unknown");
        if record.value("domain").is_none_or(str::is_empty) {
            findings.push(Finding::warning(
                Rule::Blogs,
                format!("No domain set up for blog_id {}", blog_id),
            ));
        }
        if record.value("path").is_none_or(str::is_empty) {
            findings.push(Finding::warning(
                Rule::Blogs,
                format!("No path set up for blog_id {}", blog_id),
            ));
        }
    }
    findings
}

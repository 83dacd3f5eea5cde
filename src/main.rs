use std::io::{BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::anyhow;
use clap::Parser as ClapParser;
use strum::IntoEnumIterator;
use validate_sql::config::Config;
use validate_sql::extract_facts;
use validate_sql::input::{DumpKind, load_dump};
use validate_sql::report::{OutReport, render_json, render_text, severity_line};
use validate_sql::rules::{Finding, Rule, RuleEngine, Severity};

const MULTISITE_QUESTION: &str = "Is the provided database for a multisite WordPress?";

#[derive(clap::Parser)]
#[command(name = "validate-sql")]
#[command(about = "Check a WordPress SQL dump before importing it", long_about = None)]
struct Cli {
    /// Path to a .sql file, or a .gz/.zip archive containing exactly one .sql file.
    #[arg(short, long, value_name = "SQLFILE")]
    file: PathBuf,
    /// Statement delimiter used in the dump [default: ;].
    #[arg(short, long)]
    delimiter: Option<String>,
    /// The dump is for a multisite WordPress; do not ask.
    #[arg(long, conflicts_with = "no_multisite")]
    multisite: bool,
    /// The dump is not for a multisite WordPress; do not ask.
    #[arg(long)]
    no_multisite: bool,
    /// Print the findings as JSON.
    #[arg(long)]
    json: bool,
    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,
    /// Path to a TOML file with default settings.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

struct Settings {
    delimiter: String,
    multisite: Option<bool>,
    json: bool,
    pretty: bool,
}

impl Settings {
    fn resolve(cli: &Cli, config: Config) -> anyhow::Result<Self> {
        let delimiter = cli
            .delimiter
            .clone()
            .unwrap_or_else(|| config.delimiter().to_owned());
        if delimiter.is_empty() {
            return Err(anyhow!("The statement delimiter cannot be empty"));
        }
        let multisite = if cli.multisite {
            Some(true)
        } else if cli.no_multisite {
            Some(false)
        } else {
            config.multisite
        };
        Ok(Self {
            delimiter,
            multisite,
            json: cli.json || config.json.unwrap_or(false),
            pretty: cli.pretty || config.pretty.unwrap_or(false),
        })
    }
}

/// Asks the multisite question on stderr. A closed or non-interactive stdin answers no.
fn confirm_multisite() -> anyhow::Result<bool> {
    let stdin = std::io::stdin();
    if !stdin.is_terminal() {
        log::info!("stdin is not interactive, assuming a single site dump");
        return Ok(false);
    }
    let mut stderr = std::io::stderr();
    loop {
        write!(stderr, "\n{} [y/n] ", MULTISITE_QUESTION)?;
        stderr.flush()?;
        let mut answer = String::new();
        if stdin.lock().read_line(&mut answer)? == 0 {
            return Ok(false);
        }
        match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => continue,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let now = Instant::now();

    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let settings = Settings::resolve(&cli, config)?;

    let loaded = DumpKind::from_path(&cli.file).and_then(|kind| {
        if kind.is_archive() && !settings.json {
            println!("Extracting the archive...");
        }
        load_dump(&cli.file)
    });
    let sql = match loaded {
        Ok(sql) => sql,
        Err(err) => {
            if settings.json {
                let out = OutReport::Err {
                    error: err.to_string(),
                };
                println!("{}", render_json(&out, settings.pretty)?);
            } else {
                eprintln!("{}", severity_line(Severity::Error, &err.to_string()));
            }
            std::process::exit(1);
        }
    };

    let facts = extract_facts(&sql, &settings.delimiter);

    // Rules ahead of the first multisite rule are reported before asking.
    let common = RuleEngine::new(&facts, false)
        .evaluate_rules(Rule::iter().take_while(|rule| !rule.requires_multisite()));
    if !settings.json {
        print!("{}", render_text(&common));
    }

    let multisite_confirmed = match settings.multisite {
        Some(answer) => answer,
        None => confirm_multisite()?,
    };
    let remaining = RuleEngine::new(&facts, multisite_confirmed)
        .evaluate_rules(Rule::iter().skip_while(|rule| !rule.requires_multisite()));

    if settings.json {
        let findings: Vec<Finding> = common.into_iter().chain(remaining).collect();
        let out = OutReport::Ok {
            findings: &findings,
        };
        println!("{}", render_json(&out, settings.pretty)?);
    } else if !remaining.is_empty() {
        println!();
        print!("{}", render_text(&remaining));
    }

    let elapsed = now.elapsed();
    log::info!("Elapsed: {:.2?}", elapsed);

    Ok(())
}

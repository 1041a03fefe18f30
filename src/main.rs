use anyhow::{Context, Result};
use clap::Parser;
use class_analyzer::cli::{Cli, Commands, OutputFormat};
use class_analyzer::config::{Settings, resolve_settings};
use class_analyzer::descriptors::Descriptors;
use class_analyzer::model::ClassFacts;
use class_analyzer::parser::ClassParser;
use class_analyzer::query::ClassQuery;
use class_analyzer::scan::{ScanFailure, ScanReport, scan};
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = resolve_settings(&cli)?;
    init_logging(&settings)?;

    match cli.command.clone() {
        Commands::Inspect { file, format } => {
            let interner = Descriptors::new();
            let facts = parse_file(&interner, &file)?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&facts)?),
                OutputFormat::Text => print!("{}", render_facts(&facts)),
            }
        }
        Commands::Scan { path, format } => {
            let start = Instant::now();
            let interner = Descriptors::new();
            let report = scan(&path, &interner, settings.threads)?;
            let output = ScanOutput::new(&path, &report, start);
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&output)?),
                OutputFormat::Text => print!("{}", output.render_text()),
            }
        }
        Commands::Query {
            path,
            query,
            pattern,
            format,
        } => {
            let query = ClassQuery::parse(&query, pattern.as_deref())?;
            let interner = Descriptors::new();
            let index = scan(&path, &interner, settings.threads)?.into_index();
            let matches: Vec<String> = index.select(&query).iter().map(|f| f.fqn()).collect();
            let diagnostics: Vec<String> =
                index.take_diagnostics().iter().map(ToString::to_string).collect();
            match format {
                OutputFormat::Json => {
                    let output = QueryOutput {
                        query: query.to_string(),
                        classes_indexed: index.len(),
                        matches,
                        diagnostics,
                    };
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                OutputFormat::Text => {
                    for name in matches {
                        println!("{name}");
                    }
                }
            }
        }
        Commands::Refs { file, format } => {
            let interner = Descriptors::new();
            let bytes = read_class(&file)?;
            let refs = ClassParser::new(&interner)
                .parse_references(&bytes)
                .with_context(|| format!("Failed to parse {}", file.display()))?;
            let names: Vec<String> = refs.iter().map(|t| t.dotted()).collect();
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&names)?),
                OutputFormat::Text => {
                    for name in names {
                        println!("{name}");
                    }
                }
            }
        }
    }

    Ok(())
}

fn init_logging(settings: &Settings) -> Result<()> {
    let filter = EnvFilter::try_new(&settings.log_filter)
        .with_context(|| format!("Invalid log filter: {}", settings.log_filter))?;
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact();
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
    Ok(())
}

fn read_class(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read class file: {}", path.display()))
}

fn parse_file(interner: &Descriptors, path: &Path) -> Result<ClassFacts> {
    let bytes = read_class(path)?;
    ClassParser::new(interner)
        .parse(&bytes)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

fn join<T: ToString>(items: impl IntoIterator<Item = T>) -> String {
    items
        .into_iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_facts(facts: &ClassFacts) -> String {
    let mut out = String::new();
    out.push_str(&format!("class       {}\n", facts.fqn()));
    out.push_str(&format!("version     {} ({})\n", facts.version(), facts.format()));
    out.push_str(&format!("access      0x{:04x}\n", facts.access()));
    if let Some(super_class) = facts.super_class() {
        out.push_str(&format!("extends     {super_class}\n"));
    }
    if !facts.interfaces().is_empty() {
        out.push_str(&format!("implements  {}\n", join(facts.interfaces())));
    }
    if let Some(source) = facts.source_file() {
        out.push_str(&format!("source      {source}\n"));
    }
    out.push_str(&format!(
        "members     {} fields, {} methods\n",
        facts.fields().len(),
        facts.methods().len()
    ));
    if !facts.annotations().is_empty() {
        out.push_str(&format!("annotations {}\n", join(facts.annotations().iter().map(|a| a.fqn()))));
    }
    out.push_str(&format!("imports     {}\n", join(facts.imports())));
    out.push_str(&format!("api         {}\n", join(facts.api_uses())));
    out
}

#[derive(Debug, Serialize)]
struct ScanClassSummary {
    source: String,
    class_name: String,
    version: String,
    sha256: String,
    super_class: Option<String>,
    imports: Vec<String>,
    api: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ScanOutput {
    root: String,
    classes_parsed: usize,
    failed: usize,
    duration_ms: u64,
    classes: Vec<ScanClassSummary>,
    failures: Vec<ScanFailure>,
}

impl ScanOutput {
    fn new(root: &Path, report: &ScanReport, start: Instant) -> Self {
        let mut classes: Vec<ScanClassSummary> = report
            .classes
            .iter()
            .map(|c| ScanClassSummary {
                source: c.source.clone(),
                class_name: c.facts.fqn(),
                version: c.facts.version(),
                sha256: c.sha256.clone(),
                super_class: c.facts.super_class().map(|s| s.dotted()),
                imports: c.facts.imports().iter().map(|p| p.fqn()).collect(),
                api: c.facts.api_uses().map(|p| p.fqn()).collect(),
            })
            .collect();
        classes.sort_by(|a, b| a.class_name.cmp(&b.class_name).then_with(|| a.source.cmp(&b.source)));

        Self {
            root: root.display().to_string(),
            classes_parsed: report.classes.len(),
            failed: report.failures.len(),
            duration_ms: start.elapsed().as_millis() as u64,
            classes,
            failures: report.failures.clone(),
        }
    }

    fn render_text(&self) -> String {
        let mut out = String::new();
        for class in &self.classes {
            out.push_str(&format!(
                "{}  {}  {}\n",
                class.class_name,
                class.version,
                &class.sha256[..12.min(class.sha256.len())]
            ));
        }
        for failure in &self.failures {
            out.push_str(&format!("FAILED {}: {}\n", failure.source, failure.error));
        }
        out.push_str(&format!(
            "{} classes parsed, {} failed in {} ms\n",
            self.classes_parsed, self.failed, self.duration_ms
        ));
        out
    }
}

#[derive(Debug, Serialize)]
struct QueryOutput {
    query: String,
    classes_indexed: usize,
    matches: Vec<String>,
    diagnostics: Vec<String>,
}

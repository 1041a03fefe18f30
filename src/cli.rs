use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "class-analyzer")]
#[command(about = "Inspect compiled Java classes: references, API surface, annotations and class queries")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log filter, e.g. `debug` or `class_analyzer=trace` (env: CLASS_ANALYZER_LOG)
    #[arg(long, global = true, value_name = "FILTER")]
    pub log: Option<String>,

    /// Parser threads for batch commands (env: CLASS_ANALYZER_THREADS)
    #[arg(long, global = true, value_name = "N")]
    pub threads: Option<usize>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Parse one class file and print its facts
    Inspect {
        file: PathBuf,

        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Parse every class file in a directory tree or jar
    Scan {
        path: PathBuf,

        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// List the classes under PATH that match a query, e.g. `extends 'com.acme.*'`
    Query {
        path: PathBuf,

        /// ANY, NAMED, IMPLEMENTS, EXTENDS, IMPORTS, ANNOTATED, VERSION, PUBLIC,
        /// ABSTRACT, CONCRETE, DEFAULT_CONSTRUCTOR, RUNTIMEANNOTATIONS or CLASSANNOTATIONS
        query: String,

        /// Glob over dotted names; a leading `!` negates it
        pattern: Option<String>,

        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print the types one class file refers to
    Refs {
        file: PathBuf,

        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

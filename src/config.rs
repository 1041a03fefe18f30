use anyhow::{Context, Result};
use std::env;

use crate::cli::Cli;

pub const LOG_ENV: &str = "CLASS_ANALYZER_LOG";
pub const THREADS_ENV: &str = "CLASS_ANALYZER_THREADS";
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Effective settings: command line flag, then environment, then default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub log_filter: String,
    pub threads: Option<usize>,
}

pub fn resolve_settings(cli: &Cli) -> Result<Settings> {
    Ok(Settings {
        log_filter: resolve_log_filter(cli.log.as_deref(), env::var(LOG_ENV).ok()),
        threads: resolve_threads(cli.threads, env::var(THREADS_ENV).ok())?,
    })
}

fn resolve_log_filter(flag: Option<&str>, from_env: Option<String>) -> String {
    if let Some(f) = flag {
        return f.to_string();
    }
    from_env
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
}

fn resolve_threads(flag: Option<usize>, from_env: Option<String>) -> Result<Option<usize>> {
    if let Some(n) = flag {
        return Ok(Some(n.max(1)));
    }
    let Some(raw) = from_env.filter(|v| !v.trim().is_empty()) else {
        return Ok(None);
    };
    let n: usize = raw
        .trim()
        .parse()
        .with_context(|| format!("{THREADS_ENV} is not a number: {raw:?}"))?;
    Ok(Some(n.max(1)))
}

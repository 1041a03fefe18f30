//! Batch driver: finds class files under a path and parses each of them.
//!
//! A failure in one input is logged and counted; it never stops the batch.

use anyhow::{Context, Result};
use ignore::WalkBuilder;
use memmap2::Mmap;
use rayon::prelude::*;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use zip::ZipArchive;

use crate::descriptors::Descriptors;
use crate::index::ClassIndex;
use crate::model::ClassFacts;
use crate::parser::ClassParser;

/// The raw bytes of one class file and where they came from.
#[derive(Debug)]
pub struct ClassInput {
    /// `path/to/Foo.class`, or `lib.jar!/com/acme/Foo.class` for jar entries.
    pub source: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Serialize)]
pub struct ScannedClass {
    pub source: String,
    pub sha256: String,
    pub facts: ClassFacts,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanFailure {
    pub source: String,
    pub error: String,
}

#[derive(Debug, Default, Serialize)]
pub struct ScanReport {
    pub classes: Vec<ScannedClass>,
    pub failures: Vec<ScanFailure>,
}

impl ScanReport {
    /// Builds a query index; duplicates keep the first class in source order.
    pub fn into_index(self) -> ClassIndex {
        let mut index = ClassIndex::new();
        for class in self.classes {
            index.insert(class.source, class.facts);
        }
        index
    }
}

pub fn is_class_file(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "class")
}

pub fn is_jar(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "jar" || e == "zip")
}

/// Lists `.class` and `.jar` files below `base_path`, sorted. A file path is
/// returned as is.
pub fn discover(base_path: &Path) -> Result<Vec<PathBuf>> {
    if base_path.is_file() {
        return Ok(vec![base_path.to_path_buf()]);
    }
    if !base_path.exists() {
        anyhow::bail!("Path does not exist: {}", base_path.display());
    }

    let (tx, rx) = mpsc::channel();
    let walker = WalkBuilder::new(base_path)
        .hidden(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .build_parallel();

    walker.run(|| {
        let tx = tx.clone();
        Box::new(move |entry| {
            if let Ok(entry) = entry {
                let path = entry.path();
                if is_class_file(path) || is_jar(path) {
                    let _ = tx.send(path.to_path_buf());
                }
            }
            ignore::WalkState::Continue
        })
    });

    drop(tx);
    let mut paths: Vec<PathBuf> = rx.iter().collect();
    paths.sort();
    Ok(paths)
}

pub fn read_jar(jar_path: &Path) -> Result<Vec<ClassInput>> {
    let file = File::open(jar_path)
        .with_context(|| format!("Failed to open jar: {}", jar_path.display()))?;
    // SAFETY: the map is read only and dropped before this function returns.
    let mmap = unsafe { Mmap::map(&file) }
        .with_context(|| format!("Failed to mmap jar: {}", jar_path.display()))?;
    let mut archive = ZipArchive::new(Cursor::new(&mmap[..]))
        .with_context(|| format!("Failed to read zip structure: {}", jar_path.display()))?;

    let mut inputs = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if !entry.is_file() || !entry.name().ends_with(".class") {
            continue;
        }
        let source = format!("{}!/{}", jar_path.display(), entry.name());
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut bytes)
            .with_context(|| format!("Failed to read {source}"))?;
        inputs.push(ClassInput { source, bytes });
    }
    Ok(inputs)
}

/// Collects the class inputs under `path`. Unreadable files and jars become
/// failures rather than errors.
pub fn collect_inputs(path: &Path) -> Result<(Vec<ClassInput>, Vec<ScanFailure>)> {
    let mut inputs = Vec::new();
    let mut failures = Vec::new();
    for file in discover(path)? {
        let loaded = if is_jar(&file) {
            read_jar(&file)
        } else {
            std::fs::read(&file)
                .with_context(|| format!("Failed to read {}", file.display()))
                .map(|bytes| {
                    vec![ClassInput {
                        source: file.display().to_string(),
                        bytes,
                    }]
                })
        };
        match loaded {
            Ok(mut found) => inputs.append(&mut found),
            Err(e) => {
                tracing::warn!("skipping {}: {:#}", file.display(), e);
                failures.push(ScanFailure {
                    source: file.display().to_string(),
                    error: format!("{e:#}"),
                });
            }
        }
    }
    Ok((inputs, failures))
}

pub fn hash_content(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Parses every input in parallel. All parsers share `interner`, so equal
/// names resolve to the same identity across the batch.
pub fn parse_all(inputs: &[ClassInput], interner: &Descriptors) -> ScanReport {
    let results: Vec<std::result::Result<ScannedClass, ScanFailure>> = inputs
        .par_iter()
        .map(|input| {
            let parser = ClassParser::new(interner);
            match parser.parse(&input.bytes) {
                Ok(facts) => Ok(ScannedClass {
                    source: input.source.clone(),
                    sha256: hash_content(&input.bytes),
                    facts,
                }),
                Err(e) => {
                    tracing::warn!("failed to parse {}: {}", input.source, e);
                    Err(ScanFailure {
                        source: input.source.clone(),
                        error: e.to_string(),
                    })
                }
            }
        })
        .collect();

    let mut report = ScanReport::default();
    for result in results {
        match result {
            Ok(class) => report.classes.push(class),
            Err(failure) => report.failures.push(failure),
        }
    }
    report
}

/// Discovers, reads and parses everything under `path`. `threads` bounds the
/// parallelism; `None` uses the global rayon pool.
pub fn scan(path: &Path, interner: &Descriptors, threads: Option<usize>) -> Result<ScanReport> {
    let (inputs, failures) = collect_inputs(path)?;
    tracing::debug!("parsing {} class files under {}", inputs.len(), path.display());

    let mut report = match threads {
        Some(n) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n.max(1))
                .build()
                .context("Failed to build thread pool")?;
            pool.install(|| parse_all(&inputs, interner))
        }
        None => parse_all(&inputs, interner),
    };
    let mut all_failures = failures;
    all_failures.append(&mut report.failures);
    report.failures = all_failures;
    Ok(report)
}

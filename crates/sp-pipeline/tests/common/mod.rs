//! In-process stand-in for the shrinking engine.
//!
//! Class files are plain text; every `ref <class>` line is a reference to
//! another class by its original dotted name. The engine keeps classes that
//! match a keep rule plus everything they reach, renames the rest, honours
//! registered mappings in order and fails on unresolved references.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use sp_classpath::archive;
use sp_core::{ClasspathEntry, CompiledFilter, ShrinkConfig};
use sp_pipeline::ShrinkEngine;
use zip::write::SimpleFileOptions;

struct ClassFile {
    refs: Vec<String>,
    bytes: Vec<u8>,
}

#[derive(Clone, Default)]
pub struct SimulatedEngine {
    runs: Arc<Mutex<Vec<ShrinkConfig>>>,
    windows: Arc<Mutex<Vec<(Instant, Instant)>>>,
}

impl SimulatedEngine {
    pub fn runs(&self) -> Vec<ShrinkConfig> {
        self.runs.lock().unwrap().clone()
    }

    pub fn windows(&self) -> Vec<(Instant, Instant)> {
        self.windows.lock().unwrap().clone()
    }

    fn shrink(&self, config: &ShrinkConfig) -> anyhow::Result<()> {
        let out = config.out_artifact.as_ref().context("no output artifact")?;
        let mapping_out = config.print_mapping.as_ref().context("no mapping output")?;

        let mut forward: HashMap<String, String> = HashMap::new();
        let mut reverse: HashMap<String, String> = HashMap::new();
        for mapping in &config.apply_mappings {
            for (original, renamed) in parse_mapping(mapping)? {
                reverse.insert(renamed.clone(), original.clone());
                forward.insert(original, renamed);
            }
        }

        let mut classes: BTreeMap<String, ClassFile> = BTreeMap::new();
        let mut resources: Vec<(String, Vec<u8>)> = Vec::new();
        for entry in config.processed.entries() {
            for (name, bytes) in read_entries(entry)? {
                match class_name(&name) {
                    Some(current) => {
                        let original = reverse.get(&current).cloned().unwrap_or(current);
                        let refs = parse_refs(&bytes);
                        classes.entry(original).or_insert(ClassFile { refs, bytes });
                    }
                    None => {
                        if !resources.iter().any(|(n, _)| n == &name) {
                            resources.push((name, bytes));
                        }
                    }
                }
            }
        }

        let mut library = HashSet::new();
        for entry in config.reference.entries() {
            if !entry.path.exists() {
                continue;
            }
            for (name, _) in read_entries(entry)? {
                if let Some(class) = class_name(&name) {
                    library.insert(class);
                }
            }
        }

        let keep = keep_filter(config)?;
        let is_kept = |name: &str| keep.as_ref().is_some_and(|k| k.accepts(name));
        let roots: Vec<String> = classes.keys().filter(|c| is_kept(c.as_str())).cloned().collect();

        let mut reachable = BTreeSet::new();
        let mut stack = roots.clone();
        while let Some(name) = stack.pop() {
            if !reachable.insert(name.clone()) {
                continue;
            }
            for r in &classes[&name].refs {
                if classes.contains_key(r) {
                    stack.push(r.clone());
                } else if !library.contains(r) {
                    bail!("can't find referenced class {r} (referenced from {name})");
                }
            }
        }

        let mut names: BTreeMap<String, String> = BTreeMap::new();
        let mut used: HashSet<String> = forward.values().cloned().collect();
        for original in &reachable {
            if is_kept(original.as_str()) {
                names.insert(original.clone(), original.clone());
            } else if let Some(renamed) = forward.get(original) {
                names.insert(original.clone(), renamed.clone());
            }
        }
        used.extend(names.values().cloned());
        let mut counter = 0;
        for original in &reachable {
            if names.contains_key(original) {
                continue;
            }
            let fresh = loop {
                let candidate = format!("z.c{counter}");
                counter += 1;
                if used.insert(candidate.clone()) {
                    break candidate;
                }
            };
            names.insert(original.clone(), fresh);
        }

        let mut writer = zip::ZipWriter::new(File::create(out)?);
        for (original, renamed) in &names {
            let path = format!("{}.class", renamed.replace('.', "/"));
            writer.start_file(path, SimpleFileOptions::default())?;
            writer.write_all(&classes[original].bytes)?;
        }
        for (name, bytes) in &resources {
            writer.start_file(name.as_str(), SimpleFileOptions::default())?;
            writer.write_all(bytes)?;
        }
        writer.finish()?;

        let mapping: String = names.iter().map(|(o, n)| format!("{o} -> {n}:\n")).collect();
        std::fs::write(mapping_out, mapping)?;
        if let Some(dump) = &config.dump {
            let text: String = names.values().map(|n| format!("{n}\n")).collect();
            std::fs::write(dump, text)?;
        }
        if let Some(seeds) = &config.print_seeds {
            let text: String = roots.iter().map(|n| format!("{n}\n")).collect();
            std::fs::write(seeds, text)?;
        }
        if let Some(usage) = &config.print_usage {
            let text: String = classes
                .keys()
                .filter(|c| !reachable.contains(*c))
                .map(|c| format!("{c}\n"))
                .collect();
            std::fs::write(usage, text)?;
        }
        Ok(())
    }
}

impl ShrinkEngine for SimulatedEngine {
    fn name(&self) -> &str {
        "simulated"
    }

    fn run(&mut self, config: &ShrinkConfig) -> anyhow::Result<()> {
        let started = Instant::now();
        self.runs.lock().unwrap().push(config.clone());
        std::thread::sleep(Duration::from_millis(10));
        let result = self.shrink(config);
        self.windows.lock().unwrap().push((started, Instant::now()));
        result
    }
}

fn class_name(entry: &str) -> Option<String> {
    entry.strip_suffix(".class").map(|stem| stem.replace('/', "."))
}

fn parse_refs(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .filter_map(|l| l.trim().strip_prefix("ref ").map(|r| r.trim().to_string()))
        .collect()
}

fn parse_mapping(path: &Path) -> anyhow::Result<Vec<(String, String)>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading mapping {}", path.display()))?;
    Ok(text
        .lines()
        .filter_map(|line| {
            let (original, renamed) = line.trim().trim_end_matches(':').split_once(" -> ")?;
            Some((original.to_string(), renamed.to_string()))
        })
        .collect())
}

fn keep_pattern(rule: &str) -> Option<String> {
    let mut tokens = rule.split_whitespace();
    match tokens.next() {
        Some("class") => tokens.next().map(str::to_string),
        _ => None,
    }
}

fn keep_filter(config: &ShrinkConfig) -> anyhow::Result<Option<CompiledFilter>> {
    let mut patterns: Vec<String> = config.keep_rules.iter().filter_map(|r| keep_pattern(r)).collect();
    for rule_file in &config.rule_files {
        for line in std::fs::read_to_string(rule_file)?.lines() {
            if let Some(rule) = line.trim().strip_prefix("-keep ") {
                patterns.extend(keep_pattern(rule));
            }
        }
    }
    if patterns.is_empty() {
        return Ok(None);
    }
    Ok(Some(CompiledFilter::classes(&patterns)?))
}

fn read_entries(entry: &ClasspathEntry) -> anyhow::Result<Vec<(String, Vec<u8>)>> {
    let filter = CompiledFilter::files(&entry.filter)?;
    let names: Vec<String> =
        archive::entry_names(&entry.path)?.into_iter().filter(|n| filter.accepts(n)).collect();
    let mut out = Vec::new();
    if entry.path.is_dir() {
        for name in names {
            let bytes = std::fs::read(entry.path.join(&name))?;
            out.push((name, bytes));
        }
        return Ok(out);
    }
    let mut zip = zip::ZipArchive::new(File::open(&entry.path)?)?;
    for name in names {
        let mut file = zip.by_name(&name)?;
        if file.is_dir() {
            continue;
        }
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        out.push((name, bytes));
    }
    Ok(out)
}

// ========== Fixtures ==========

/// Route pipeline logs to the test output; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Write a class whose body references `refs`.
pub fn class_body(refs: &[&str]) -> Vec<u8> {
    refs.iter().map(|r| format!("ref {r}\n")).collect::<String>().into_bytes()
}

pub fn write_class_dir(root: &Path, classes: &[(&str, &[&str])]) {
    for (name, refs) in classes {
        let path = root.join(format!("{}.class", name.replace('.', "/")));
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, class_body(refs)).unwrap();
    }
}

pub fn write_jar(path: &Path, classes: &[(&str, &[&str])], resources: &[(&str, &str)]) {
    let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
    for (name, refs) in classes {
        let entry = format!("{}.class", name.replace('.', "/"));
        writer.start_file(entry, SimpleFileOptions::default()).unwrap();
        writer.write_all(&class_body(refs)).unwrap();
    }
    for (name, body) in resources {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(body.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
}

pub fn jar_entries(path: &Path) -> Vec<String> {
    archive::entry_names(path).unwrap()
}

pub fn paths_of(config: &ShrinkConfig, processed: bool) -> Vec<PathBuf> {
    let classpath = if processed { &config.processed } else { &config.reference };
    classpath.paths().into_iter().map(Path::to_path_buf).collect()
}

//! Engine that drives the ProGuard command-line tool.

use std::fmt::Write as _;
use std::io::Write as _;
use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{bail, Context};
use sp_core::{ClasspathEntry, EngineSettings, ShrinkConfig};

use crate::engine::ShrinkEngine;

fn quote(path: &Path) -> String {
    format!("'{}'", path.display())
}

fn classpath_line(option: &str, entry: &ClasspathEntry) -> String {
    let mut line = format!("{option} {}", quote(&entry.path));
    if !entry.filter.is_empty() {
        line.push('(');
        line.push_str(&entry.filter.join(","));
        line.push(')');
    }
    line
}

/// Render a configuration in ProGuard option syntax.
pub fn render(config: &ShrinkConfig) -> String {
    let mut out = String::new();
    for entry in config.processed.entries() {
        let _ = writeln!(out, "{}", classpath_line("-injars", entry));
    }
    if let Some(artifact) = &config.out_artifact {
        let _ = writeln!(out, "-outjars {}", quote(artifact));
    }
    for entry in config.reference.entries() {
        let _ = writeln!(out, "{}", classpath_line("-libraryjars", entry));
    }
    for mapping in &config.apply_mappings {
        let _ = writeln!(out, "-applymapping {}", quote(mapping));
    }
    for rule in &config.rule_files {
        let _ = writeln!(out, "-include {}", quote(rule));
    }
    for keep in &config.keep_rules {
        let _ = writeln!(out, "-keep {keep}");
    }
    let reports = [
        ("-printmapping", &config.print_mapping),
        ("-dump", &config.dump),
        ("-printseeds", &config.print_seeds),
        ("-printusage", &config.print_usage),
    ];
    for (option, target) in reports {
        if let Some(path) = target {
            let _ = writeln!(out, "{option} {}", quote(path));
        }
    }
    if !config.optimize {
        out.push_str("-dontoptimize\n");
    }
    if config.force_processing {
        out.push_str("-forceprocessing\n");
    }
    out
}

/// Runs `java [jvm args] -jar <proguard.jar> @<rendered config>` per pass.
pub struct ProguardCommandEngine {
    settings: EngineSettings,
}

impl ProguardCommandEngine {
    pub fn new(settings: EngineSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }
}

impl ShrinkEngine for ProguardCommandEngine {
    fn run(&mut self, config: &ShrinkConfig) -> anyhow::Result<()> {
        let rendered = render(config);
        let mut file = tempfile::Builder::new()
            .prefix("shrinkpass-")
            .suffix(".pro")
            .tempfile()
            .context("creating engine configuration file")?;
        file.write_all(rendered.as_bytes())?;
        file.flush()?;
        tracing::debug!(config = %file.path().display(), "wrote engine configuration");

        let output = Command::new(&self.settings.java)
            .args(&self.settings.jvm_args)
            .arg("-jar")
            .arg(&self.settings.proguard_jar)
            .arg(format!("@{}", file.path().display()))
            .stdin(Stdio::null())
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("proguard exited with {:?}: {}", output.status.code(), stderr.trim());
        }
        Ok(())
    }
}

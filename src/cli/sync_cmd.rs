//! Documentation sync commands

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde_json::{json, Value};

use super::output::Output;
use crate::domain::{Field, RecordSet};
use crate::source::RegistrySnapshot;
use crate::storage::{read_key, Config, GlobalConfig, SyncConfig, WireConverter};
use crate::sync::{DocSync, DocsApi, HttpDocsApi, SyncSettings};

/// Writes a default config into `data_dir`
pub fn init(output: &Output, data_dir: &Path, force: bool) -> Result<()> {
    let config_path = Config::config_path(data_dir);
    if config_path.exists() && !force {
        bail!(
            "{} already exists. Use --force to overwrite it.",
            config_path.display()
        );
    }

    let config = Config {
        sync: SyncConfig::default(),
        global: GlobalConfig::default(),
        data_dir: data_dir.to_path_buf(),
    };
    config.save_sync()?;
    output.verbose_ctx("init", &format!("Wrote {}", config_path.display()));

    let key_path = config.key_path();
    let key_present = read_key(&key_path).is_some();

    if output.is_json() {
        output.data(&json!({
            "config": config_path.display().to_string(),
            "key_file": key_path.display().to_string(),
            "key_present": key_present,
        }));
    } else {
        output.success(&format!("Initialized docsync in {}", data_dir.display()));
        if !key_present {
            output.line(format!(
                "Put your API key in {} to enable uploads.",
                key_path.display()
            ));
        }
    }

    Ok(())
}

/// Validates the API key
pub fn check(output: &Output, config: &Config) -> Result<()> {
    let key = require_key(config)?;
    let api = http_api(config)?;

    output.verbose_ctx("check", &format!("Checking key against {}", config.sync.api_url));
    let valid = api
        .check_key(&key)
        .context("Failed to check the API key")?;

    if output.is_json() {
        output.data(&json!({ "valid": valid }));
    }
    if !valid {
        bail!("The API key was rejected. Check the key on your addon page.");
    }
    if !output.is_json() {
        output.success("The API key is valid");
    }
    Ok(())
}

/// Prints the records extracted from a registry snapshot
pub fn inspect(output: &Output, config: &Config, registry: &Path) -> Result<()> {
    let sync = open_sync(config, registry, None)?;
    let records = sync.local_records();
    output.verbose_ctx("inspect", &format!("Extracted {} records", records.len()));

    if output.is_json() {
        let converter = WireConverter::new(sync.addon().name.clone());
        output.data(&json!({
            "addon": sync.addon().name,
            "count": records.len(),
            "records": converter.encode_all(&records),
        }));
        return Ok(());
    }

    if records.is_empty() {
        output.line(format!("No documentable syntax found for {}", sync.addon().name));
        return Ok(());
    }

    print_table(output, &records);
    output.line("");
    output.line(format!("{} record(s)", records.len()));
    Ok(())
}

/// Shows what a sync would upload
pub fn diff(output: &Output, config: &Config, registry: &Path) -> Result<()> {
    let key = require_key(config)?;
    let sync = open_sync(config, registry, Some(key))?;

    if !sync.check_key().context("Failed to check the API key")? {
        bail!("The API key was rejected. Check the key on your addon page.");
    }
    let published = sync.download().context("Failed to download published syntax")?;
    output.verbose_ctx("diff", &format!("{} published records", published));

    let plan = sync.plan().context("Failed to plan the upload")?;

    if output.is_json() {
        let converter = WireConverter::new(sync.addon().name.clone());
        let records: Vec<Value> = plan
            .records
            .iter()
            .map(|record| {
                json!({
                    "outcome": if record.remote_id().is_some() { "edited" } else { "added" },
                    "payload": converter.to_wire(record),
                })
            })
            .collect();
        output.data(&json!({
            "summary": plan.summary,
            "records": records,
        }));
        return Ok(());
    }

    for record in &plan.records {
        let marker = if record.remote_id().is_some() { "~" } else { "+" };
        output.line(format!("{} {}", marker, record));
    }
    if !plan.records.is_empty() {
        output.line("");
    }
    output.line(format!(
        "{} to add, {} to edit, {} unchanged",
        plan.records.additions().count(),
        plan.records.edits().count(),
        plan.summary.unchanged
    ));
    Ok(())
}

/// Runs one full blocking cycle
pub fn sync(output: &Output, config: &Config, registry: &Path) -> Result<()> {
    let key = require_key(config)?;
    let sync = open_sync(config, registry, Some(key))?;

    let report = sync.run_cycle().context("Documentation sync failed")?;

    if output.is_json() {
        output.data(&report);
    } else if report.is_uploaded() {
        output.success(&format!(
            "Uploaded {} new and {} edited syntaxes ({} unchanged)",
            report.added, report.edited, report.unchanged
        ));
    } else {
        output.success(&format!(
            "Documentation is up to date ({} unchanged)",
            report.unchanged
        ));
    }
    Ok(())
}

fn require_key(config: &Config) -> Result<String> {
    let key_path = config.key_path();
    read_key(&key_path).with_context(|| format!("No API key found in {}", key_path.display()))
}

fn http_api(config: &Config) -> Result<Arc<HttpDocsApi>> {
    let api = HttpDocsApi::new(&config.sync.api_url, config.sync.timeout())
        .context("Failed to create the docs service client")?;
    Ok(Arc::new(api))
}

fn open_sync(config: &Config, registry: &Path, key: Option<String>) -> Result<DocSync> {
    let snapshot = RegistrySnapshot::load(registry)
        .with_context(|| format!("Failed to load registry snapshot: {}", registry.display()))?;

    if snapshot.addon.name.trim().is_empty() {
        bail!("Registry snapshot does not name an addon");
    }

    Ok(DocSync::new(
        snapshot.addon.clone(),
        key,
        SyncSettings::from(&config.sync),
        http_api(config)?,
        Arc::new(snapshot),
    ))
}

fn print_table(output: &Output, records: &RecordSet) {
    output.line(format!("{:<12} {:<28} PATTERN", "CATEGORY", "NAME"));
    output.line("-".repeat(70));

    for record in records {
        let pattern = record
            .text(Field::Pattern)
            .and_then(|p| p.lines().next())
            .unwrap_or("");
        output.line(format!(
            "{:<12} {:<28} {}",
            record.category().wire_name(),
            truncate(record.name(), 28),
            pattern
        ));
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

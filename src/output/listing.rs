use std::{
    fs,
    io::{self, Write},
    path::Path,
};

use anyhow::{Context, Result};

use crate::models::Catalog;

const ARTIFACT_EXTENSION: &str = "bin";

/// Prints every model with its license, available combinations and default.
pub fn write_catalog<W: Write>(out: &mut W, catalog: &Catalog) -> io::Result<()> {
    for (name, model) in catalog.models() {
        let available = model
            .combinations()
            .iter()
            .map(|combination| format!("{name}:{combination}"))
            .collect::<Vec<_>>()
            .join(", ");
        let default = model
            .default_combination()
            .map(|combination| format!("{name}:{combination}"))
            .unwrap_or_else(|| "(missing)".into());

        writeln!(out, "**{name}**: {}", model.brief)?;
        writeln!(out, "License  : {}", model.license)?;
        writeln!(out, "Available: {available}")?;
        writeln!(out, "Default  : {default}")?;
        writeln!(out)?;
    }
    Ok(())
}

/// `.bin` files in `dir` that no catalog entry refers to, sorted by name.
/// A missing directory has nothing unlisted.
pub fn unlisted_artifacts(catalog: &Catalog, dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let known = catalog.known_file_names();
    let mut unlisted = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("list {}", dir.display()))? {
        let path = entry.context("read directory entry")?.path();
        if !path.is_file()
            || path.extension().and_then(|ext| ext.to_str()) != Some(ARTIFACT_EXTENSION)
        {
            continue;
        }
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if !known.contains(name) {
            unlisted.push(name.to_owned());
        }
    }
    unlisted.sort();
    Ok(unlisted)
}

/// Models with a dangling default variant, then artifacts the catalog
/// does not know about.
pub fn write_check_report<W: Write>(out: &mut W, catalog: &Catalog, legacy_dir: &Path) -> Result<()> {
    for warning in catalog.consistency_check() {
        writeln!(out, "{warning}")?;
    }
    let unlisted = unlisted_artifacts(catalog, legacy_dir)?;
    writeln!(out, "not uploaded models: {unlisted:?}")?;
    Ok(())
}

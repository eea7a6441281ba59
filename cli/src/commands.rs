//! The batch jobs behind each subcommand.
//!
//! Everything here is generic over the transport and token source so the
//! tests can drive it with scripted responses.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use orcrim_core::{
    ApiError, Listing, Lookup, Person, PersonFields, Session, StaticToken, TokenManager,
    TokenProvider, Transport,
};
use serde_json::Value;

/// Client-credentials manager or a token handed in by the user.
pub enum AnyToken {
    Managed(TokenManager),
    Static(StaticToken),
}

impl TokenProvider for AnyToken {
    fn access_token<T: Transport + ?Sized>(&mut self, transport: &T) -> Result<String, ApiError> {
        match self {
            AnyToken::Managed(manager) => manager.access_token(transport),
            AnyToken::Static(token) => token.access_token(transport),
        }
    }
}

/// Write `value` as JSON to `out_dir/relative.json`, creating directories.
pub fn write_json(out_dir: &Path, relative: &str, value: &Value) -> Result<PathBuf> {
    let path = out_dir.join(format!("{}.json", relative.trim_start_matches('/')));
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let file =
        File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
    write_value(file, value).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// Serialize through a buffer and flush it, so a failed final write is
/// reported instead of being lost on drop.
fn write_value<W: Write>(inner: W, value: &Value) -> Result<()> {
    let mut writer = BufWriter::new(inner);
    serde_json::to_writer(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

/// True for `null`, `[]`, `{}` and `{"data": []}`.
fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => {
            map.is_empty() || map.get("data").and_then(Value::as_array).is_some_and(Vec::is_empty)
        }
        _ => false,
    }
}

#[derive(Debug, Default)]
pub struct LookupReport {
    pub written: Vec<PathBuf>,
    pub empty: Vec<Lookup>,
    pub failed: Vec<(Lookup, ApiError)>,
}

/// Resolve `--only` values into lookups; empty means all of them.
pub fn select_lookups(only: &[String]) -> Result<Vec<Lookup>> {
    if only.is_empty() {
        return Ok(Lookup::ALL.to_vec());
    }
    only.iter()
        .map(|p| Lookup::from_path(p).with_context(|| format!("Unknown lookup endpoint: {p}")))
        .collect()
}

/// Fetch each lookup and save the non-empty ones. One failing endpoint does
/// not stop the others.
pub fn export_lookups<T: Transport, P: TokenProvider>(
    session: &mut Session<T, P>,
    lookups: &[Lookup],
    out_dir: &Path,
) -> Result<LookupReport> {
    let mut report = LookupReport::default();
    for &lookup in lookups {
        match session.lookup(lookup) {
            Ok(value) if is_empty(&value) => {
                tracing::warn!(%lookup, "endpoint returned no data");
                report.empty.push(lookup);
            }
            Ok(value) => {
                let path = write_json(out_dir, lookup.path(), &value)?;
                tracing::info!(%lookup, path = %path.display(), "lookup saved");
                report.written.push(path);
            }
            Err(e) => {
                tracing::error!(%lookup, error = %e, "lookup failed");
                report.failed.push((lookup, e));
            }
        }
    }
    Ok(report)
}

/// Search the range and save the listing as `personalidade.json`.
///
/// Returns `None` when the range holds no people; nothing is written then.
pub fn export_personalidades<T: Transport, P: TokenProvider>(
    session: &mut Session<T, P>,
    start: NaiveDateTime,
    end: NaiveDateTime,
    out_dir: &Path,
) -> Result<Option<PathBuf>> {
    if start > end {
        bail!("start date {start} is after end date {end}");
    }
    let value = session
        .search_personalities(start, end)
        .context("Person search failed")?;
    if is_empty(&value) {
        tracing::warn!("person search returned no data");
        return Ok(None);
    }
    write_json(out_dir, "personalidade", &value).map(Some)
}

pub fn load_listing(path: &Path) -> Result<Listing> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read listing: {}", path.display()))?;
    Listing::from_json(&raw).context("Failed to parse listing")
}

/// Build a person from a JSON file of flat fields.
pub fn load_person(path: &Path) -> Result<Person> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read person file: {}", path.display()))?;
    let fields: PersonFields =
        serde_json::from_str(&raw).context("Failed to parse person fields")?;
    Ok(Person::from_fields(fields))
}

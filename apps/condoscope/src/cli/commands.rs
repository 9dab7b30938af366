//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::api::{self, ApiSettings, AppState};
use crate::config::{Backend, Config};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use condoscope_core::{
    CondominiumId, CondoscopeError, Dataset, EntityKind, ExecutiveSummary, RecordSource, Store,
    evaluate,
};
use std::path::{Path, PathBuf};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum file size for dataset import (100 MB).
///
/// This prevents memory exhaustion from malicious or accidental large files.
const MAX_IMPORT_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), CondoscopeError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| CondoscopeError::Io(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(CondoscopeError::InvalidInput(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Validate an input file path.
///
/// Canonicalizes the path (resolving symlinks and "..") and requires a
/// regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, CondoscopeError> {
    let canonical = path.canonicalize().map_err(|e| {
        CondoscopeError::Io(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(CondoscopeError::Io(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Validate an output file path: the parent directory must exist.
fn validate_output_path(path: &Path) -> Result<PathBuf, CondoscopeError> {
    // A bare file name has an empty parent
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        CondoscopeError::Io(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(CondoscopeError::Io(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| CondoscopeError::Io("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

/// Read and parse a JSON dataset file.
fn read_dataset(path: &Path) -> Result<Dataset, CondoscopeError> {
    let validated_path = validate_file_path(path)?;
    validate_file_size(&validated_path, MAX_IMPORT_FILE_SIZE)?;

    let data = std::fs::read(&validated_path)
        .map_err(|e| CondoscopeError::Io(format!("Read file: {}", e)))?;
    Dataset::from_json_slice(&data)
}

fn write_dataset(path: &Path, dataset: &Dataset) -> Result<usize, CondoscopeError> {
    let json = dataset.to_json_pretty()?;
    std::fs::write(path, &json).map_err(|e| CondoscopeError::Io(format!("Write file: {}", e)))?;
    Ok(json.len())
}

fn render_json<T: serde::Serialize>(value: &T) -> Result<String, CondoscopeError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| CondoscopeError::Serialization(format!("Render JSON: {}", e)))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CondoscopeError> {
    println!("{}", render_json(value)?);
    Ok(())
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(config: &Config) -> Result<(), CondoscopeError> {
    let store = load_store(config)?;

    println!("Condoscope Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:     {}", config.host);
    println!("  Port:     {}", config.port);
    println!("  Backend:  {}", config.backend);
    println!("  Database: {:?}", config.database);
    println!();
    println!("Endpoints:");
    println!("  GET  /health                              - Health check");
    println!("  GET  /status                              - Row counts");
    println!("  GET  /executive-summary                   - Executive summary");
    println!("  GET  /condominiums/{{id}}/executive-summary - Summary for one condominium");
    println!("  GET  /metrics                             - Prometheus metrics");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let state = AppState::with_settings(store, ApiSettings::from_config(config));
    api::run_server(&config.bind_addr(), state).await
}

// =============================================================================
// EVALUATE COMMAND
// =============================================================================

/// Parse `--now`. The date is evaluated at midnight UTC.
fn parse_now(raw: Option<&str>) -> Result<DateTime<Utc>, CondoscopeError> {
    match raw {
        None => Ok(Utc::now()),
        Some(text) => NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
            .map(|date| date.and_time(NaiveTime::MIN).and_utc())
            .map_err(|e| {
                CondoscopeError::InvalidInput(format!(
                    "Invalid date '{}' (expected YYYY-MM-DD): {}",
                    text, e
                ))
            }),
    }
}

/// Evaluate one tenant (or all rows) and return the summary.
pub fn evaluate_store(
    store: &Store,
    condominium: Option<&str>,
    now: DateTime<Utc>,
) -> Result<ExecutiveSummary, CondoscopeError> {
    let tenant = CondominiumId::parse_optional(condominium);
    let snapshot = store.snapshot(tenant.as_ref())?;
    Ok(evaluate(&snapshot, now))
}

/// Print the executive summary.
pub fn cmd_evaluate(
    config: &Config,
    json_mode: bool,
    condominium: Option<&str>,
    now: Option<&str>,
) -> Result<(), CondoscopeError> {
    let now = parse_now(now)?;
    let store = load_store(config)?;
    let summary = evaluate_store(&store, condominium, now)?;

    tracing::info!(
        tenant = condominium.unwrap_or("*"),
        overall_score = summary.overall_score,
        alerts = summary.alerts.len(),
        "Executive summary computed"
    );

    if json_mode {
        return print_json(&summary);
    }

    println!("Condoscope Executive Summary");
    println!("============================");
    if let Some(id) = &summary.condominium_id {
        println!("Condominium: {}", id);
    }
    println!("As of:       {}", summary.generated_at.format("%Y-%m-%d %H:%M UTC"));
    println!();
    println!(
        "Overall Score: {} ({})",
        summary.overall_score,
        summary.maturity_level.name()
    );
    println!();
    println!("Pillars:");
    for pillar in &summary.pillars {
        println!(
            "  {:<14} {:>3}  weight {:>2}  risk {}",
            pillar.label,
            pillar.score,
            pillar.weight,
            pillar.risk_level.name()
        );
    }
    println!();

    if summary.alerts.is_empty() {
        println!("No alerts.");
    } else {
        println!("Alerts ({}):", summary.alerts.len());
        for alert in &summary.alerts {
            println!("  [{}] {}", alert.severity.name(), alert.title);
            println!("      {}", alert.description);
            println!("      Action: {}", alert.action);
            if alert.financial_impact > 0.0 {
                println!("      Impact: R$ {:.2}", alert.financial_impact);
            }
        }
        println!();
        println!("Estimated Financial Impact: R$ {:.2}", summary.financial_impact);
    }

    Ok(())
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show row counts.
pub fn cmd_status(
    config: &Config,
    json_mode: bool,
    condominium: Option<&str>,
) -> Result<(), CondoscopeError> {
    let store = load_store(config)?;
    let tenant = CondominiumId::parse_optional(condominium);
    let counts = store.counts(tenant.as_ref())?;

    if json_mode {
        let output = serde_json::json!({
            "backend": store.backend_name(),
            "database": config.database,
            "condominiumId": tenant,
            "totalRows": counts.total(),
            "counts": counts,
        });
        return print_json(&output);
    }

    println!("Condoscope Store Status");
    println!("=======================");
    println!("Database: {:?}", config.database);
    println!("Backend:  {}", store.backend_name());
    if let Some(id) = &tenant {
        println!("Tenant:   {}", id);
    }
    println!();
    for kind in EntityKind::ALL {
        println!("{:<22} {}", kind.name(), counts.get(kind));
    }
    println!();
    println!("{:<22} {}", "total", counts.total());

    Ok(())
}

// =============================================================================
// IMPORT / EXPORT COMMANDS
// =============================================================================

/// Load a JSON dataset into the store.
pub fn cmd_import(config: &Config, input: &Path) -> Result<(), CondoscopeError> {
    let dataset = read_dataset(input)?;
    let mut store = load_store(config)?;
    let imported = store.import_dataset(&dataset)?;

    if config.backend == Backend::File {
        write_dataset(&config.database, &store.export_dataset()?)?;
    }

    tracing::info!(
        rows = imported.total(),
        backend = %config.backend,
        "Dataset imported"
    );
    println!(
        "Imported {} rows into {:?}",
        imported.total(),
        config.database
    );

    Ok(())
}

/// Dump the store as a JSON dataset.
pub fn cmd_export(config: &Config, output: &Path) -> Result<(), CondoscopeError> {
    let validated_output = validate_output_path(output)?;
    let store = load_store(config)?;
    let dataset = store.export_dataset()?;
    let bytes = write_dataset(&validated_output, &dataset)?;

    println!(
        "Exported {} rows ({} bytes) to {:?}",
        dataset.total_rows(),
        bytes,
        validated_output
    );

    Ok(())
}

// =============================================================================
// TENANTS COMMAND
// =============================================================================

/// List condominium ids present in the store.
pub fn cmd_tenants(config: &Config, json_mode: bool) -> Result<(), CondoscopeError> {
    let store = load_store(config)?;
    let tenants = store.tenants()?;

    if json_mode {
        return print_json(&tenants);
    }

    if tenants.is_empty() {
        println!("No condominiums found.");
    }
    for id in &tenants {
        println!("{}", id);
    }

    Ok(())
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Initialize new database.
pub fn cmd_init(config: &Config, force: bool) -> Result<(), CondoscopeError> {
    let db_path = &config.database;
    if db_path.exists() {
        if !force {
            return Err(CondoscopeError::InvalidInput(
                "Database already exists. Use --force to overwrite.".to_string(),
            ));
        }
        std::fs::remove_file(db_path)
            .map_err(|e| CondoscopeError::Io(format!("Remove existing database: {}", e)))?;
    }

    match config.backend {
        Backend::Redb => {
            let _store = Store::open_redb(db_path)?;
            println!("Initialized new redb database at {:?}", db_path);
        }
        Backend::File => {
            write_dataset(db_path, &Dataset::new())?;
            println!("Initialized new file database at {:?}", db_path);
        }
    }

    Ok(())
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Open the configured store.
///
/// The file backend reads the JSON dataset when it exists and starts empty
/// otherwise; the redb backend opens or creates the database.
pub fn load_store(config: &Config) -> Result<Store, CondoscopeError> {
    match config.backend {
        Backend::Redb => Store::open_redb(&config.database),
        Backend::File => {
            if config.database.exists() {
                Ok(Store::InMemory(read_dataset(&config.database)?))
            } else {
                Ok(Store::InMemory(Dataset::new()))
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config_for(backend: Backend, database: PathBuf) -> Config {
        Config {
            backend,
            database,
            ..Config::default()
        }
    }

    fn write_sample(dir: &Path) -> PathBuf {
        let path = dir.join("rows.json");
        let doc = json!({
            "transactions": [
                {"id": "t1", "condominium_id": "c-1", "type": "despesa", "status": "pendente",
                 "amount": 500, "due_date": "2024-06-14"},
                {"id": "t2", "condominium_id": "c-2", "type": "receita", "status": "pago",
                 "amount": 900}
            ],
            "suppliers": [{"id": "s1", "condominium_id": "c-1"}]
        });
        std::fs::write(&path, doc.to_string()).unwrap();
        path
    }

    #[test]
    fn test_render_json_reports_unserializable_values() {
        let mut by_pair = std::collections::BTreeMap::new();
        by_pair.insert((1u8, 2u8), "pair keys are not JSON object keys");

        let err = render_json(&by_pair).unwrap_err();
        assert!(matches!(err, CondoscopeError::Serialization(_)));
        assert!(render_json(&json!({"ok": true})).unwrap().contains("\"ok\": true"));
    }

    #[test]
    fn test_parse_now() {
        let parsed = parse_now(Some("2024-06-15")).unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-06-15T00:00:00+00:00");
        assert!(matches!(
            parse_now(Some("15/06/2024")),
            Err(CondoscopeError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_validate_output_path_accepts_bare_filename() {
        let validated = validate_output_path(Path::new("export.json")).unwrap();
        assert_eq!(validated.file_name().unwrap(), "export.json");
    }

    #[test]
    fn test_validate_file_path_rejects_directory() {
        let temp = tempfile::tempdir().unwrap();
        assert!(validate_file_path(temp.path()).is_err());
    }

    #[test]
    fn test_import_then_evaluate_redb() {
        let temp = tempfile::tempdir().unwrap();
        let input = write_sample(temp.path());
        let config = config_for(Backend::Redb, temp.path().join("condoscope.db"));

        cmd_init(&config, false).unwrap();
        cmd_import(&config, &input).unwrap();

        let store = load_store(&config).unwrap();
        let now = parse_now(Some("2024-06-15")).unwrap();
        let summary = evaluate_store(&store, Some("c-1"), now).unwrap();
        assert_eq!(summary.metrics.transactions, 1);
        assert_eq!(summary.metrics.suppliers, 1);
        assert_eq!(summary.indicators.overdue_payments, 1);
        assert_eq!(store.tenants().unwrap().len(), 2);
    }

    #[test]
    fn test_file_backend_import_persists_dataset() {
        let temp = tempfile::tempdir().unwrap();
        let input = write_sample(temp.path());
        let config = config_for(Backend::File, temp.path().join("store.json"));

        cmd_import(&config, &input).unwrap();
        let store = load_store(&config).unwrap();
        assert_eq!(store.backend_name(), "file");
        assert_eq!(store.counts(None).unwrap().total(), 3);
    }

    #[test]
    fn test_export_writes_reimportable_dataset() {
        let temp = tempfile::tempdir().unwrap();
        let input = write_sample(temp.path());
        let config = config_for(Backend::Redb, temp.path().join("condoscope.db"));
        cmd_import(&config, &input).unwrap();

        let output = temp.path().join("out.json");
        cmd_export(&config, &output).unwrap();

        let exported = read_dataset(&output).unwrap();
        assert_eq!(exported.total_rows(), 3);
    }

    #[test]
    fn test_load_store_rejects_unparseable_file_dataset() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("store.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = load_store(&config_for(Backend::File, path)).unwrap_err();
        assert!(matches!(err, CondoscopeError::Serialization(_)));
    }

    #[test]
    fn test_load_store_rejects_unopenable_redb_path() {
        let temp = tempfile::tempdir().unwrap();

        // A directory is not a database file.
        let err = load_store(&config_for(Backend::Redb, temp.path().to_path_buf())).unwrap_err();
        assert!(matches!(err, CondoscopeError::Storage(_)));
    }

    #[test]
    fn test_init_refuses_existing_database_without_force() {
        let temp = tempfile::tempdir().unwrap();
        let config = config_for(Backend::File, temp.path().join("store.json"));

        cmd_init(&config, false).unwrap();
        assert!(matches!(
            cmd_init(&config, false),
            Err(CondoscopeError::InvalidInput(_))
        ));
        cmd_init(&config, true).unwrap();
    }
}

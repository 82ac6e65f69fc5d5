use std::path::{Path, PathBuf};

use droidport_core::error::{PortError, Result};
use droidport_core::restore::CategoryOutcome;
use droidport_core::transfer::adb::list_devices;
use droidport_core::transfer::factory::{Backend, ChannelParams, open_channel};
use droidport_core::{
    AppIdentifierMapping, BackupSession, Category, RestoreOrchestrator, RestoreReport,
    RestoreSelection, RestoreTarget, Settings,
};
use time::format_description::well_known::Rfc3339;
use tracing::{info, warn};

use crate::presentation::cli::{BackupArgs, CategoryFlags};

fn mapping_from_args(settings: &Settings, extra: Option<&Path>) -> Result<AppIdentifierMapping> {
    let mapping = settings.mapping();
    match extra {
        Some(path) => mapping.with_overrides_file(path),
        None => Ok(mapping),
    }
}

/// Explicit flags, or the default selection when none were given.
pub fn selection_from_flags(flags: &CategoryFlags) -> Result<RestoreSelection> {
    let picked: Vec<Category> = [
        (flags.media, Category::Media),
        (flags.notes, Category::Notes),
        (flags.notes_archive, Category::NotesArchive),
        (flags.shared_documents, Category::SharedDocuments),
        (flags.app_data, Category::AppData),
        (flags.installed_apps, Category::InstalledApps),
    ]
    .into_iter()
    .filter_map(|(on, c)| on.then_some(c))
    .collect();
    if picked.is_empty() {
        Ok(RestoreSelection::default())
    } else {
        RestoreSelection::new(picked)
    }
}

pub async fn handle_devices(settings: &Settings) -> Result<()> {
    let devices = list_devices(Path::new(&settings.adb_path)).await?;
    if devices.is_empty() {
        eprintln!("no devices attached");
    }
    for d in devices {
        println!(
            "{:<20} {:<24} {}",
            d.serial,
            d.display_name(),
            d.product.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

pub async fn handle_catalog(args: BackupArgs) -> Result<()> {
    let mut session = BackupSession::load(&args.backup, args.key.as_deref()).await;
    if let Some(e) = session.catalog_error.take() {
        return Err(e);
    }
    let c = &session.classified;

    println!("records: {}", session.records.len());
    for app in &c.apps {
        println!("app {} ({} files)", app.app_id, app.documents.len());
        for path in app.documents.paths() {
            println!("  {path}");
        }
    }
    if let Some(shared) = &c.shared {
        println!("shared documents ({} files)", shared.len());
        for path in shared.paths() {
            println!("  {path}");
        }
    }
    println!("media ({} files)", c.media.len());
    for m in &c.media {
        println!("  {} <- {}", m.file_name, m.file_id);
    }
    match &c.notes_source {
        Some(src) => println!(
            "notes store {}{}",
            src.file_id,
            if src.wal_file_id.is_some() { " (+wal)" } else { "" }
        ),
        None => println!("notes store: none"),
    }
    Ok(())
}

pub async fn handle_notes(args: BackupArgs, json: bool) -> Result<()> {
    let mut session = BackupSession::load(&args.backup, args.key.as_deref()).await;
    if let Some(e) = session.catalog_error.take() {
        return Err(e);
    }
    if let Some(e) = session.notes_error.take() {
        return Err(e);
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&session.notes)?);
        return Ok(());
    }
    for note in &session.notes {
        let when = note
            .modified_at()
            .and_then(|t| t.format(&Rfc3339).ok())
            .unwrap_or_else(|| "-".into());
        println!("#{:<6} {:<25} {}", note.id, when, note.title);
    }
    Ok(())
}

pub fn handle_map(settings: &Settings, bundle_id: &str, extra: Option<PathBuf>) -> Result<()> {
    let mapping = mapping_from_args(settings, extra.as_deref())?;
    match mapping.resolve(bundle_id) {
        Some(pkg) => {
            println!("{pkg}");
            Ok(())
        }
        None => Err(PortError::Config(format!("no target package for {bundle_id}"))),
    }
}

pub struct RestoreRequest {
    pub backup: BackupArgs,
    pub serial: Option<String>,
    pub mirror: Option<PathBuf>,
    pub mapping: Option<PathBuf>,
    pub categories: CategoryFlags,
    pub json: bool,
}

pub async fn handle_restore(settings: &Settings, req: RestoreRequest) -> Result<()> {
    let selection = selection_from_flags(&req.categories)?;
    let mapping = mapping_from_args(settings, req.mapping.as_deref())?;

    let (backend, device) = match &req.mirror {
        Some(root) => (Backend::Mirror, format!("mirror:{}", root.display())),
        None => (Backend::Adb, req.serial.clone().unwrap_or_default()),
    };
    let channel = open_channel(backend, ChannelParams {
        adb_path: PathBuf::from(&settings.adb_path),
        serial: req.serial.clone().unwrap_or_default(),
        mirror_root: req.mirror.clone(),
    })?;

    let mut session = BackupSession::load(&req.backup.backup, req.backup.key.as_deref()).await;
    if let Some(e) = session.catalog_error.take() {
        return Err(e);
    }
    if let Some(e) = &session.notes_error {
        warn!("notes will not be restored: {e}");
    }

    let orchestrator = RestoreOrchestrator::new(channel, mapping, settings.layout.clone());
    let target = RestoreTarget { device, selection };
    let handle = orchestrator.start(&target, session.into_inputs());

    let token = handle.cancel_token();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received; stopping after the current file");
            token.cancel();
        }
    });
    let report = handle.wait().await;
    interrupt.abort();

    if req.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    info!(pushed = report.total_pushed(), "restore finished");
    Ok(())
}

fn print_report(report: &RestoreReport) {
    println!("device: {}", report.device);
    for r in &report.categories {
        let outcome = match r.outcome {
            CategoryOutcome::Succeeded => "ok",
            CategoryOutcome::Partial => "partial",
            CategoryOutcome::Skipped => "skipped",
            CategoryOutcome::Cancelled => "cancelled",
            CategoryOutcome::Failed => "FAILED",
        };
        println!(
            "{:<18} {:<9} pushed={} skipped={} failed={}",
            r.category.as_str(),
            outcome,
            r.stats.pushed,
            r.stats.skipped,
            r.stats.failed + r.stats.mkdir_failed
        );
        if !r.unmapped_apps.is_empty() {
            println!("  unmapped: {}", r.unmapped_apps.join(", "));
        }
        if let Some(detail) = &r.detail {
            println!("  {detail}");
        }
    }
}

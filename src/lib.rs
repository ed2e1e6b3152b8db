mod annotate;
mod classify;
mod error;
mod report;
mod settings;

pub use annotate::{
    ability_type_from_code, annotate, annotate_event, AbilityType, AnnotatedEvent, BuffKey,
    BuffKeyTable, BuffRef, CombatEvent, EventKind, RuneAnnotation, RuneDriftAnnotation, RuneKind,
    RuneSlots, RuneState, TimingAnnotation, RUNE_SLOT_COUNT,
};
pub use classify::{
    classify, classify_percentile, Classification, ClassificationBand, MetricResult, Percentile,
    PercentileBand, RatioBanding,
};
pub use error::{EngineError, EngineResult, ErrorKind};
pub use report::{
    load_fight_report, report_view_path, write_report_view, FightHeader, FightMetadata,
    FightRanking, FightReport, PlayerRanking, Rankings, ReportMetric, ReportSection, ReportView,
    ReportViewDocument,
};
pub use settings::{ReportSettings, SETTINGS_PATH_ENV};

use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

const USAGE: &str = "usage: runelog <payload.json>";

pub fn render_report_file(payload_path: &Path, settings: &ReportSettings) -> EngineResult<PathBuf> {
    let report = load_fight_report(payload_path)?;
    let view = ReportView::build(&report, settings);

    tracing::info!(
        payload = %payload_path.display(),
        encounter = %view.header.encounter,
        metrics = view.metrics.len(),
        events = view.events.len(),
        skipped_metrics = view.skipped_metric_count,
        skipped_events = view.skipped_event_count,
        "Built report view"
    );

    write_report_view(payload_path, &view)
}

pub fn run() -> Result<(), String> {
    let settings = ReportSettings::from_env().map_err(|error| error.to_string())?;
    init_tracing(&settings.log_filter);

    let mut args = std::env::args_os().skip(1);
    let payload_path = match (args.next(), args.next()) {
        (Some(path), None) => PathBuf::from(path),
        _ => return Err(USAGE.to_string()),
    };

    let view_path = render_report_file(&payload_path, &settings).map_err(|error| {
        tracing::error!(
            payload = %payload_path.display(),
            render_error = %error,
            "Failed to render report"
        );
        error.to_string()
    })?;

    println!("{}", view_path.display());
    Ok(())
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // Already initialised when embedded in a host that installs its own subscriber.
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}

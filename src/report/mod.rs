mod ingest;
mod payload;
mod sections;
mod sidecar;

pub use payload::{FightMetadata, FightRanking, FightReport, PlayerRanking, Rankings};
pub use sections::ReportSection;
pub use sidecar::{load_fight_report, report_view_path, write_report_view, ReportViewDocument};

use serde::Serialize;
use serde_json::Value;

use crate::annotate::{annotate, AnnotatedEvent, BuffKeyTable};
use crate::classify::{
    classify, classify_percentile, Classification, MetricResult, Percentile, PercentileBand,
};
use crate::settings::ReportSettings;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FightHeader {
    pub source: String,
    pub encounter: String,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dps: Option<i64>,
    pub player_rank: Percentile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_rank_band: Option<PercentileBand>,
    pub fight_speed: Percentile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fight_speed_band: Option<PercentileBand>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetric {
    pub key: String,
    pub section: ReportSection,
    pub metric: MetricResult,
    pub classification: Classification,
}

/// Everything the renderer needs for one fight, already classified and annotated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportView {
    pub header: FightHeader,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec: Option<String>,
    pub show_procs: bool,
    pub show_speed: bool,
    pub show_runes: bool,
    pub metrics: Vec<ReportMetric>,
    pub events: Vec<AnnotatedEvent>,
    pub skipped_metric_count: usize,
    pub skipped_event_count: usize,
}

impl ReportView {
    pub fn build(report: &FightReport, settings: &ReportSettings) -> Self {
        let (metrics, skipped_metric_count) = build_metrics(report, settings);
        let (events, skipped_event_count) = build_events(&report.events, settings);

        let has_rune_spend_error = report
            .analysis
            .get("has_rune_spend_error")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        Self {
            header: FightHeader::from_metadata(&report.fight_metadata),
            spec: report.spec.clone(),
            show_procs: report.show_procs,
            show_speed: report.show_speed,
            show_runes: !has_rune_spend_error,
            metrics,
            events,
            skipped_metric_count,
            skipped_event_count,
        }
    }

    pub fn metric(&self, key: &str) -> Option<&ReportMetric> {
        self.metrics.iter().find(|entry| entry.key == key)
    }
}

impl FightHeader {
    fn from_metadata(metadata: &FightMetadata) -> Self {
        let player_ranking = metadata.rankings.player_ranking.as_ref();
        let player_rank = player_ranking
            .map(|ranking| ranking.rank_percentile)
            .unwrap_or(Percentile::Unavailable);
        let fight_speed = metadata
            .rankings
            .fight_ranking
            .as_ref()
            .map(|ranking| ranking.speed_percentile)
            .unwrap_or(Percentile::Unavailable);

        Self {
            source: metadata.source.clone(),
            encounter: metadata.encounter.clone(),
            duration_ms: metadata.duration,
            player_name: player_ranking.and_then(|ranking| ranking.name.clone()),
            dps: player_ranking.map(|ranking| ranking.dps.round() as i64),
            player_rank,
            player_rank_band: percentile_band("player_rank", player_rank),
            fight_speed,
            fight_speed_band: percentile_band("fight_speed", fight_speed),
        }
    }
}

fn percentile_band(key: &str, percentile: Percentile) -> Option<PercentileBand> {
    match classify_percentile(percentile) {
        Ok(band) => Some(band),
        Err(error) => {
            tracing::warn!(metric = key, classify_error = %error, "Skipping percentile band");
            None
        }
    }
}

fn build_metrics(report: &FightReport, settings: &ReportSettings) -> (Vec<ReportMetric>, usize) {
    let extraction = sections::extract_metrics(&report.analysis);
    let mut skipped = 0;

    for (key, error) in &extraction.failures {
        tracing::warn!(metric = %key, section_error = %error, "Skipping malformed report section");
        skipped += 1;
    }

    let mut metrics = Vec::with_capacity(extraction.metrics.len());
    for named in extraction.metrics {
        match classify(&named.metric, settings.ratio_banding) {
            Ok(classification) => metrics.push(ReportMetric {
                key: named.key,
                section: named.section,
                metric: named.metric,
                classification,
            }),
            Err(error) => {
                tracing::warn!(
                    metric = %named.key,
                    kind = named.metric.kind_label(),
                    classify_error = %error,
                    "Skipping unclassifiable metric"
                );
                skipped += 1;
            }
        }
    }

    // Stable, so entries keep their extraction order within a section.
    metrics.sort_by_key(|entry| entry.section);
    (metrics, skipped)
}

fn build_events(raw_events: &[Value], settings: &ReportSettings) -> (Vec<AnnotatedEvent>, usize) {
    let buff_keys = BuffKeyTable::from_settings(settings);
    let mut skipped = 0;
    let mut combat_events = Vec::with_capacity(raw_events.len());

    for (index, raw_event) in raw_events.iter().enumerate() {
        match ingest::ingest_event(raw_event, &buff_keys) {
            Ok(event) => combat_events.push(event),
            Err(error) => {
                tracing::warn!(
                    event_index = index,
                    timestamp = ?raw_event.get("timestamp"),
                    ingest_error = %error,
                    "Skipping malformed combat event"
                );
                skipped += 1;
            }
        }
    }

    let mut events = Vec::with_capacity(combat_events.len());
    for (event, annotated) in combat_events.iter().zip(annotate(&combat_events)) {
        match annotated {
            Ok(annotated) => events.push(annotated),
            Err(error) => {
                tracing::warn!(
                    timestamp = event.timestamp,
                    ability = %event.ability_name,
                    annotate_error = %error,
                    "Skipping combat event that failed annotation"
                );
                skipped += 1;
            }
        }
    }

    (events, skipped)
}

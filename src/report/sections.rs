use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use super::payload::{
    AnalysisScoresSection, ArmySection, BombUsageSection, DiseasesDroppedSection,
    FlaskUsageSection, GargoyleSection, GargoyleWindow, GcdLatencySection, GhoulSection,
    HowlingBlastSection, HyperspeedSection, KillingMachineSection, PotionUsageSection,
    RaiseDeadSection, RimeSection, RuneDriftSection, RunicPowerSection, TrinketUsage,
    UnbreakableArmorSection,
};
use crate::classify::{
    MetricResult, GCD_DELAY_RED_ABOVE_MS, GCD_DELAY_YELLOW_ABOVE_MS,
    KILLING_MACHINE_DELAY_RED_ABOVE_MS, KILLING_MACHINE_DELAY_YELLOW_ABOVE_MS,
    RUNE_DRIFT_TOTAL_RED_ABOVE_MS, RUNE_DRIFT_TOTAL_YELLOW_ABOVE_MS,
};
use crate::error::{EngineError, EngineResult};

const FULL_UPTIME: f64 = 1.0;
const RECOMMENDED_POTIONS: i64 = 2;

/// Display order of the report, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ReportSection {
    Speed,
    Rotation,
    Miscellaneous,
    Trinkets,
    Gargoyle,
    ArmyOfTheDead,
    Ghoul,
    Overall,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NamedMetric {
    pub(crate) key: String,
    pub(crate) section: ReportSection,
    pub(crate) metric: MetricResult,
}

#[derive(Debug, Default)]
pub(crate) struct MetricExtraction {
    pub(crate) metrics: Vec<NamedMetric>,
    pub(crate) failures: Vec<(String, EngineError)>,
}

impl MetricExtraction {
    fn push(&mut self, key: impl Into<String>, section: ReportSection, metric: MetricResult) {
        self.metrics.push(NamedMetric {
            key: key.into(),
            section,
            metric,
        });
    }

    fn push_checked(
        &mut self,
        key: impl Into<String>,
        section: ReportSection,
        metric: EngineResult<MetricResult>,
    ) {
        let key = key.into();
        match metric {
            Ok(metric) => self.push(key, section, metric),
            Err(error) => self.failures.push((key, error)),
        }
    }

    fn section<T: DeserializeOwned>(
        &mut self,
        analysis: &BTreeMap<String, Value>,
        key: &str,
    ) -> Option<T> {
        let value = match analysis.get(key) {
            Some(value) if !value.is_null() => value,
            _ => {
                tracing::debug!(section = key, "Report section not present");
                return None;
            }
        };

        match serde_json::from_value::<T>(value.clone()) {
            Ok(section) => Some(section),
            Err(error) => {
                self.failures.push((
                    key.to_string(),
                    EngineError::contract(format!("section '{key}' is malformed: {error}")),
                ));
                None
            }
        }
    }
}

pub(crate) fn extract_metrics(analysis: &BTreeMap<String, Value>) -> MetricExtraction {
    let mut extraction = MetricExtraction::default();

    speed_metrics(&mut extraction, analysis);
    rotation_metrics(&mut extraction, analysis);
    miscellaneous_metrics(&mut extraction, analysis);
    trinket_metrics(&mut extraction, analysis);
    if let Some(gargoyle) = extraction.section::<GargoyleSection>(analysis, "gargoyle") {
        gargoyle_metrics(&mut extraction, &gargoyle);
    }
    if let Some(army) = extraction.section::<ArmySection>(analysis, "army") {
        army_metrics(&mut extraction, &army);
    }
    if let Some(ghoul) = extraction.section::<GhoulSection>(analysis, "ghoul") {
        ghoul_metrics(&mut extraction, &ghoul);
    }
    if let Some(scores) = extraction.section::<AnalysisScoresSection>(analysis, "analysis_scores") {
        extraction.push(
            "analysis_scores.total_score",
            ReportSection::Overall,
            MetricResult::Composite {
                value: scores.total_score,
            },
        );
    }

    extraction
}

fn speed_metrics(extraction: &mut MetricExtraction, analysis: &BTreeMap<String, Value>) {
    if let Some(gcd) = extraction.section::<GcdLatencySection>(analysis, "gcd_latency") {
        extraction.push(
            "gcd_latency",
            ReportSection::Speed,
            MetricResult::Delay {
                observed_ms: gcd.average_latency,
                yellow_above_ms: GCD_DELAY_YELLOW_ABOVE_MS,
                red_above_ms: GCD_DELAY_RED_ABOVE_MS,
            },
        );
    }
    if let Some(drift) = extraction.section::<RuneDriftSection>(analysis, "rune_drift") {
        extraction.push(
            "rune_drift",
            ReportSection::Speed,
            MetricResult::Delay {
                observed_ms: drift.rune_drift_ms,
                yellow_above_ms: RUNE_DRIFT_TOTAL_YELLOW_ABOVE_MS,
                red_above_ms: RUNE_DRIFT_TOTAL_RED_ABOVE_MS,
            },
        );
    }
    if let Some(killing_machine) =
        extraction.section::<KillingMachineSection>(analysis, "killing_machine")
    {
        extraction.push(
            "killing_machine.avg_latency",
            ReportSection::Speed,
            MetricResult::Delay {
                observed_ms: killing_machine.avg_latency,
                yellow_above_ms: KILLING_MACHINE_DELAY_YELLOW_ABOVE_MS,
                red_above_ms: KILLING_MACHINE_DELAY_RED_ABOVE_MS,
            },
        );
        extraction.push_checked(
            "killing_machine.usage",
            ReportSection::Speed,
            usage_fraction(killing_machine.num_used, killing_machine.num_total),
        );
    }
}

fn rotation_metrics(extraction: &mut MetricExtraction, analysis: &BTreeMap<String, Value>) {
    if let Some(armor) =
        extraction.section::<UnbreakableArmorSection>(analysis, "unbreakable_armor")
    {
        extraction.push(
            "unbreakable_armor",
            ReportSection::Rotation,
            MetricResult::ratio(armor.num_actual, armor.num_possible),
        );
        for (index, window) in armor.windows.iter().enumerate() {
            let suffix = if window.with_erw { ".with_erw" } else { "" };
            extraction.push(
                format!("unbreakable_armor.window_{}{suffix}", index + 1),
                ReportSection::Rotation,
                MetricResult::ratio(window.num_actual, window.num_possible),
            );
        }
    }
    if let Some(diseases) =
        extraction.section::<DiseasesDroppedSection>(analysis, "diseases_dropped")
    {
        extraction.push(
            "diseases_dropped",
            ReportSection::Rotation,
            MetricResult::Boolean {
                value: diseases.num_diseases_dropped == 0,
            },
        );
    }
    if let Some(howling_blast) =
        extraction.section::<HowlingBlastSection>(analysis, "howling_blast_bad_usages")
    {
        extraction.push(
            "howling_blast_bad_usages",
            ReportSection::Rotation,
            MetricResult::Boolean {
                value: howling_blast.num_bad_usages == 0,
            },
        );
    }
    if let Some(runic_power) = extraction.section::<RunicPowerSection>(analysis, "runic_power") {
        if runic_power.overcap_times < 0 || runic_power.overcap_sum < 0 {
            extraction.failures.push((
                "runic_power".to_string(),
                EngineError::contract(format!(
                    "overcap must not be negative, got {} over {} casts",
                    runic_power.overcap_sum, runic_power.overcap_times
                )),
            ));
        } else {
            extraction.push(
                "runic_power.overcap",
                ReportSection::Rotation,
                MetricResult::Informational {
                    value: runic_power.overcap_sum as f64,
                },
            );
        }
    }
    if let Some(rime) = extraction.section::<RimeSection>(analysis, "rime") {
        // Some encounters report more uses than procs.
        extraction.push_checked(
            "rime.usage",
            ReportSection::Rotation,
            usage_fraction(rime.num_used, rime.num_total.max(rime.num_used)),
        );
    }
    if let Some(raise_dead) = extraction.section::<RaiseDeadSection>(analysis, "raise_dead_usage")
    {
        extraction.push(
            "raise_dead_usage",
            ReportSection::Rotation,
            MetricResult::ratio(raise_dead.num_usages, raise_dead.possible_usages),
        );
    }

    let judged_uptimes = [
        ("melee_uptime", None),
        ("t9_uptime", Some("t9_max_uptime")),
        ("sigil_uptime", Some("sigil_max_uptime")),
        ("bone_shield_uptime", None),
        ("desolation_uptime", None),
        ("ghoul_frenzy_uptime", None),
    ];
    for (key, max_key) in judged_uptimes {
        let Some(fraction) = extraction.section::<f64>(analysis, key) else {
            continue;
        };
        let metric = if key == "melee_uptime" {
            MetricResult::info_uptime(fraction)
        } else {
            let max_achievable = match max_key {
                Some(max_key) if analysis.get(max_key).is_some_and(|value| !value.is_null()) => {
                    // A present maximum must decode, or the uptime is skipped.
                    let Some(max_achievable) = extraction.section::<f64>(analysis, max_key) else {
                        continue;
                    };
                    max_achievable
                }
                _ => FULL_UPTIME,
            };
            MetricResult::judged_uptime(fraction, max_achievable)
        };
        extraction.push(key, ReportSection::Rotation, metric);
    }
}

fn miscellaneous_metrics(extraction: &mut MetricExtraction, analysis: &BTreeMap<String, Value>) {
    if let Some(flask) = extraction.section::<FlaskUsageSection>(analysis, "flask_usage") {
        extraction.push(
            "flask_usage",
            ReportSection::Miscellaneous,
            MetricResult::Boolean {
                value: flask.has_flask,
            },
        );
    }
    if let Some(potions) = extraction.section::<PotionUsageSection>(analysis, "potion_usage") {
        extraction.push(
            "potion_usage",
            ReportSection::Miscellaneous,
            MetricResult::Boolean {
                value: potions.potions_used >= RECOMMENDED_POTIONS,
            },
        );
    }
    if let Some(bombs) = extraction.section::<BombUsageSection>(analysis, "bomb_usage") {
        extraction.push(
            "bomb_usage.thermal",
            ReportSection::Miscellaneous,
            MetricResult::ratio(bombs.thermal_actual, bombs.thermal_possible),
        );
        extraction.push(
            "bomb_usage.saronite",
            ReportSection::Miscellaneous,
            MetricResult::ratio(bombs.saronite_actual, bombs.saronite_possible),
        );
    }
    if let Some(hyperspeed) = extraction.section::<HyperspeedSection>(analysis, "hyperspeed") {
        extraction.push(
            "hyperspeed",
            ReportSection::Miscellaneous,
            MetricResult::ratio(hyperspeed.num_actual, hyperspeed.num_possible),
        );
    }
}

fn trinket_metrics(extraction: &mut MetricExtraction, analysis: &BTreeMap<String, Value>) {
    let Some(trinkets) = extraction.section::<Vec<TrinketUsage>>(analysis, "trinket_usages")
    else {
        return;
    };

    for trinket in trinkets {
        extraction.push(
            format!("trinket_usages.{}", trinket.name),
            ReportSection::Trinkets,
            MetricResult::ratio(trinket.num_actual, trinket.num_possible),
        );
    }
}

fn gargoyle_metrics(extraction: &mut MetricExtraction, gargoyle: &GargoyleSection) {
    extraction.push(
        "gargoyle",
        ReportSection::Gargoyle,
        MetricResult::ratio(gargoyle.num_actual, gargoyle.num_possible),
    );

    for (index, window) in gargoyle.windows.iter().enumerate() {
        gargoyle_window_metrics(extraction, &format!("gargoyle.window_{}", index + 1), window);
    }
}

fn gargoyle_window_metrics(
    extraction: &mut MetricExtraction,
    prefix: &str,
    window: &GargoyleWindow,
) {
    let section = ReportSection::Gargoyle;
    extraction.push(
        format!("{prefix}.damage"),
        section,
        MetricResult::Informational {
            value: window.damage,
        },
    );

    for trinket in &window.trinket_uptimes {
        extraction.push(
            format!("{prefix}.trinket_uptime.{}", trinket.name),
            section,
            MetricResult::judged_uptime(trinket.uptime, FULL_UPTIME),
        );
    }

    let buff_uptimes = [
        ("unholy_presence_uptime", Some(window.unholy_presence_uptime)),
        ("bloodlust_uptime", Some(window.bloodlust_uptime)),
        ("hyperspeed_uptime", Some(window.hyperspeed_uptime)),
        ("speed_uptime", Some(window.speed_uptime)),
        ("berserking_uptime", window.berserking_uptime),
    ];
    for (name, uptime) in buff_uptimes {
        if let Some(uptime) = uptime {
            extraction.push(
                format!("{prefix}.{name}"),
                section,
                MetricResult::judged_uptime(uptime, FULL_UPTIME),
            );
        }
    }

    for snapshot in &window.trinket_snapshots {
        extraction.push(
            format!("{prefix}.snapshot.{}", snapshot.name),
            section,
            MetricResult::Boolean {
                value: snapshot.did_snapshot,
            },
        );
    }

    let sigil_key = window
        .sigil_name
        .as_deref()
        .map(|sigil_name| format!("{prefix}.snapshot.{sigil_name}"))
        .unwrap_or_else(|| format!("{prefix}.snapshot.sigil"));
    let buff_snapshots = [
        (format!("{prefix}.snapshot.fallen_crusader"), Some(window.snapshotted_fc)),
        (format!("{prefix}.snapshot.blood_fury"), window.snapshotted_bloodfury),
        (sigil_key, window.snapshotted_sigil),
        (format!("{prefix}.snapshot.t9"), window.snapshotted_t9),
    ];
    for (key, did_snapshot) in buff_snapshots {
        if let Some(value) = did_snapshot {
            extraction.push(key, section, MetricResult::Boolean { value });
        }
    }
}

fn army_metrics(extraction: &mut MetricExtraction, army: &ArmySection) {
    let section = ReportSection::ArmyOfTheDead;
    extraction.push(
        "army.damage",
        section,
        MetricResult::Informational { value: army.damage },
    );
    for snapshot in &army.snapshots {
        extraction.push(
            format!("army.snapshot.{}", snapshot.name),
            section,
            MetricResult::Boolean {
                value: snapshot.did_snapshot,
            },
        );
    }
}

fn ghoul_metrics(extraction: &mut MetricExtraction, ghoul: &GhoulSection) {
    let section = ReportSection::Ghoul;
    extraction.push(
        "ghoul.damage",
        section,
        MetricResult::Informational {
            value: ghoul.damage,
        },
    );
    extraction.push(
        "ghoul.melee_uptime",
        section,
        MetricResult::judged_uptime(ghoul.melee_uptime, FULL_UPTIME),
    );
    extraction.push(
        "ghoul.uptime",
        section,
        MetricResult::judged_uptime(ghoul.uptime, FULL_UPTIME),
    );
    extraction.push(
        "ghoul.claw_rate",
        section,
        MetricResult::Rate {
            observed_rate: ghoul.claw_cpm,
            target_rate: ghoul.claw_cpm_possible,
        },
    );
    extraction.push(
        "ghoul.gnaw",
        section,
        MetricResult::Boolean {
            value: ghoul.num_gnaws == 0,
        },
    );
}

fn usage_fraction(used: i64, total: i64) -> EngineResult<MetricResult> {
    if used < 0 || total < 0 {
        return Err(EngineError::contract(format!(
            "usage counts must not be negative, got {used} of {total}"
        )));
    }

    let value = if total == 0 {
        1.0
    } else {
        used as f64 / total as f64
    };
    Ok(MetricResult::Informational { value })
}

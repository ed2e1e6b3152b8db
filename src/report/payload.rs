use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::classify::Percentile;

#[derive(Debug, Clone, Deserialize)]
pub struct FightReport {
    pub fight_metadata: FightMetadata,
    #[serde(default)]
    pub analysis: BTreeMap<String, Value>,
    #[serde(default)]
    pub events: Vec<Value>,
    #[serde(default)]
    pub spec: Option<String>,
    #[serde(default)]
    pub show_procs: bool,
    #[serde(default)]
    pub show_speed: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FightMetadata {
    pub source: String,
    pub encounter: String,
    #[serde(default)]
    pub start_time: Option<u64>,
    #[serde(default)]
    pub end_time: Option<u64>,
    pub duration: u64,
    #[serde(default)]
    pub rankings: Rankings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Rankings {
    #[serde(default)]
    pub fight_ranking: Option<FightRanking>,
    #[serde(default)]
    pub player_ranking: Option<PlayerRanking>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FightRanking {
    #[serde(default)]
    pub speed_percentile: Percentile,
    #[serde(default)]
    pub execution_percentile: Option<Percentile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerRanking {
    #[serde(default)]
    pub name: Option<String>,
    pub dps: f64,
    #[serde(default)]
    pub rank_percentile: Percentile,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawCombatEvent {
    pub(crate) timestamp: u64,
    pub(crate) ability: String,
    #[serde(rename = "abilityGameID")]
    pub(crate) ability_game_id: u32,
    #[serde(default)]
    pub(crate) ability_type: i64,
    #[serde(rename = "type")]
    pub(crate) event_type: String,
    #[serde(default)]
    pub(crate) target: Option<String>,
    #[serde(default)]
    pub(crate) is_core_cast: bool,
    #[serde(default)]
    pub(crate) is_miss: bool,
    #[serde(default)]
    pub(crate) hit_type: Option<String>,
    #[serde(default)]
    pub(crate) runic_power: i64,
    #[serde(default)]
    pub(crate) runic_power_waste: i64,
    #[serde(default)]
    pub(crate) has_gcd: bool,
    #[serde(default)]
    pub(crate) gcd_offset: Option<i64>,
    #[serde(default)]
    pub(crate) buffs: Vec<RawBuff>,
    #[serde(default)]
    pub(crate) consumes_km: bool,
    #[serde(default)]
    pub(crate) consumes_rime: bool,
    #[serde(default)]
    pub(crate) runes_before: Option<Vec<RawRune>>,
    #[serde(default)]
    pub(crate) runes: Option<Vec<RawRune>>,
    #[serde(default)]
    pub(crate) modifies_runes: bool,
    #[serde(default)]
    pub(crate) rune_grace_wasted: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawBuff {
    pub(crate) ability: String,
    #[serde(rename = "abilityGameID")]
    pub(crate) ability_game_id: u32,
    #[serde(default)]
    pub(crate) ability_icon: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawRune {
    pub(crate) name: String,
    pub(crate) is_available: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GcdLatencySection {
    pub(crate) average_latency: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RuneDriftSection {
    pub(crate) rune_drift_ms: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct KillingMachineSection {
    pub(crate) num_used: i64,
    pub(crate) num_total: i64,
    pub(crate) avg_latency: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UsageWindow {
    pub(crate) num_actual: i64,
    pub(crate) num_possible: i64,
    #[serde(default)]
    pub(crate) with_erw: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UnbreakableArmorSection {
    pub(crate) num_actual: i64,
    pub(crate) num_possible: i64,
    #[serde(default)]
    pub(crate) windows: Vec<UsageWindow>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DiseasesDroppedSection {
    pub(crate) num_diseases_dropped: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct HowlingBlastSection {
    pub(crate) num_bad_usages: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RunicPowerSection {
    pub(crate) overcap_times: i64,
    pub(crate) overcap_sum: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RimeSection {
    pub(crate) num_total: i64,
    pub(crate) num_used: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RaiseDeadSection {
    pub(crate) num_usages: i64,
    pub(crate) possible_usages: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct BombUsageSection {
    pub(crate) thermal_possible: i64,
    pub(crate) thermal_actual: i64,
    pub(crate) saronite_possible: i64,
    pub(crate) saronite_actual: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct HyperspeedSection {
    pub(crate) num_possible: i64,
    pub(crate) num_actual: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FlaskUsageSection {
    pub(crate) has_flask: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PotionUsageSection {
    pub(crate) potions_used: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AnalysisScoresSection {
    pub(crate) total_score: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TrinketUsage {
    pub(crate) name: String,
    pub(crate) num_actual: i64,
    pub(crate) num_possible: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct NamedUptime {
    pub(crate) name: String,
    pub(crate) uptime: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct NamedSnapshot {
    pub(crate) name: String,
    pub(crate) did_snapshot: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GargoyleSection {
    pub(crate) num_actual: i64,
    pub(crate) num_possible: i64,
    #[serde(default)]
    pub(crate) windows: Vec<GargoyleWindow>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GargoyleWindow {
    pub(crate) damage: f64,
    #[serde(default)]
    pub(crate) trinket_uptimes: Vec<NamedUptime>,
    pub(crate) unholy_presence_uptime: f64,
    pub(crate) bloodlust_uptime: f64,
    pub(crate) hyperspeed_uptime: f64,
    pub(crate) speed_uptime: f64,
    #[serde(default)]
    pub(crate) berserking_uptime: Option<f64>,
    #[serde(default)]
    pub(crate) trinket_snapshots: Vec<NamedSnapshot>,
    pub(crate) snapshotted_fc: bool,
    #[serde(default)]
    pub(crate) snapshotted_bloodfury: Option<bool>,
    #[serde(default)]
    pub(crate) snapshotted_sigil: Option<bool>,
    #[serde(default)]
    pub(crate) sigil_name: Option<String>,
    #[serde(default)]
    pub(crate) snapshotted_t9: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ArmySection {
    pub(crate) damage: f64,
    #[serde(default)]
    pub(crate) snapshots: Vec<NamedSnapshot>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GhoulSection {
    pub(crate) damage: f64,
    pub(crate) melee_uptime: f64,
    pub(crate) uptime: f64,
    pub(crate) claw_cpm: f64,
    pub(crate) claw_cpm_possible: f64,
    pub(crate) num_gnaws: i64,
}

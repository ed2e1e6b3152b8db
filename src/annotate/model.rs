use serde::{Deserialize, Serialize};

use crate::classify::ClassificationBand;

pub const RUNE_SLOT_COUNT: usize = 6;

pub type RuneSlots = [RuneState; RUNE_SLOT_COUNT];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    Cast,
    DebuffRemoved,
    BuffRemoved,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AbilityType {
    None,
    Physical,
    Fire,
    Frost,
    Shadow,
    Unknown(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BuffKey {
    Presence,
    KillingMachine,
    Rime,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuffRef {
    pub ability_id: u32,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub key: BuffKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuneKind {
    Blood,
    Frost,
    Unholy,
    Death,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuneState {
    pub kind: RuneKind,
    pub is_available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatEvent {
    pub timestamp: u64,
    pub ability_id: u32,
    pub ability_name: String,
    pub ability_type: AbilityType,
    pub kind: EventKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub is_core_cast: bool,
    pub is_miss: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hit_type: Option<String>,
    pub resource_after: i64,
    pub resource_waste: i64,
    pub has_global_cooldown: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gcd_offset: Option<i64>,
    pub active_buffs: Vec<BuffRef>,
    pub consumes_killing_machine: bool,
    pub consumes_rime: bool,
    pub runes_before: RuneSlots,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runes_after: Option<RuneSlots>,
    pub modifies_runes: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rune_grace_wasted: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingAnnotation {
    pub baseline_ms: i64,
    pub delta_ms: i64,
    pub band: ClassificationBand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuneDriftAnnotation {
    pub wasted_ms: i64,
    pub band: ClassificationBand,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuneAnnotation {
    pub before: RuneSlots,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<RuneSlots>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedEvent {
    pub event: CombatEvent,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub miss_reason: Option<String>,
    pub is_filler: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing: Option<TimingAnnotation>,
    pub consumed_procs: Vec<BuffRef>,
    pub resource_display: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_waste_display: Option<i64>,
    pub runes: RuneAnnotation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rune_drift: Option<RuneDriftAnnotation>,
}

impl AnnotatedEvent {
    pub fn timestamp(&self) -> u64 {
        self.event.timestamp
    }

    pub fn timing_band(&self) -> Option<ClassificationBand> {
        self.timing.map(|timing| timing.band)
    }

    pub fn rune_drift_band(&self) -> Option<ClassificationBand> {
        self.rune_drift.map(|drift| drift.band)
    }
}

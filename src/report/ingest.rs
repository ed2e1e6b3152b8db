use serde::Deserialize;
use serde_json::Value;

use super::payload::{RawBuff, RawCombatEvent, RawRune};
use crate::annotate::{
    ability_type_from_code, BuffKeyTable, BuffRef, CombatEvent, EventKind, RuneKind, RuneSlots,
    RuneState, RUNE_SLOT_COUNT,
};
use crate::error::{EngineError, EngineResult};

const EVENT_CAST: &str = "cast";
const EVENT_REMOVE_DEBUFF: &str = "removedebuff";
const EVENT_REMOVE_BUFF: &str = "removebuff";

pub(crate) fn ingest_event(value: &Value, buff_keys: &BuffKeyTable) -> EngineResult<CombatEvent> {
    let raw_event = RawCombatEvent::deserialize(value)
        .map_err(|error| EngineError::contract(format!("malformed combat event: {error}")))?;

    let runes_before = match raw_event.runes_before.as_deref() {
        Some(runes) => rune_slots(runes, "runes_before")?,
        None => {
            return Err(EngineError::contract(format!(
                "{} at {} ms has no rune state",
                raw_event.ability, raw_event.timestamp
            )));
        }
    };
    let runes_after = raw_event
        .runes
        .as_deref()
        .map(|runes| rune_slots(runes, "runes"))
        .transpose()?;

    Ok(CombatEvent {
        timestamp: raw_event.timestamp,
        ability_id: raw_event.ability_game_id,
        ability_type: ability_type_from_code(raw_event.ability_type),
        kind: event_kind(&raw_event.event_type),
        target: raw_event.target,
        is_core_cast: raw_event.is_core_cast,
        is_miss: raw_event.is_miss,
        hit_type: raw_event.hit_type,
        resource_after: raw_event.runic_power,
        resource_waste: raw_event.runic_power_waste,
        has_global_cooldown: raw_event.has_gcd,
        gcd_offset: raw_event.gcd_offset,
        active_buffs: raw_event
            .buffs
            .into_iter()
            .map(|buff| buff_ref(buff, buff_keys))
            .collect(),
        consumes_killing_machine: raw_event.consumes_km,
        consumes_rime: raw_event.consumes_rime,
        runes_before,
        runes_after,
        modifies_runes: raw_event.modifies_runes,
        rune_grace_wasted: raw_event.rune_grace_wasted,
        ability_name: raw_event.ability,
    })
}

fn event_kind(event_type: &str) -> EventKind {
    match event_type {
        EVENT_CAST => EventKind::Cast,
        EVENT_REMOVE_DEBUFF => EventKind::DebuffRemoved,
        EVENT_REMOVE_BUFF => EventKind::BuffRemoved,
        _ => EventKind::Other,
    }
}

fn buff_ref(buff: RawBuff, buff_keys: &BuffKeyTable) -> BuffRef {
    BuffRef {
        key: buff_keys.resolve(buff.ability_game_id),
        ability_id: buff.ability_game_id,
        name: buff.ability,
        icon: buff.ability_icon,
    }
}

fn rune_slots(runes: &[RawRune], field: &str) -> EngineResult<RuneSlots> {
    if runes.len() != RUNE_SLOT_COUNT {
        return Err(EngineError::contract(format!(
            "{field} must hold {RUNE_SLOT_COUNT} runes, got {}",
            runes.len()
        )));
    }

    let mut slots = [RuneState {
        kind: RuneKind::Blood,
        is_available: true,
    }; RUNE_SLOT_COUNT];
    for (slot, rune) in slots.iter_mut().zip(runes) {
        *slot = RuneState {
            kind: rune_kind(&rune.name)?,
            is_available: rune.is_available,
        };
    }

    Ok(slots)
}

fn rune_kind(name: &str) -> EngineResult<RuneKind> {
    match name {
        "Blood" => Ok(RuneKind::Blood),
        "Frost" => Ok(RuneKind::Frost),
        "Unholy" => Ok(RuneKind::Unholy),
        "Death" => Ok(RuneKind::Death),
        other => Err(EngineError::contract(format!("unknown rune kind '{other}'"))),
    }
}

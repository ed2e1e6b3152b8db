mod abilities;
mod model;

pub use abilities::{ability_type_from_code, BuffKeyTable};
pub use model::{
    AbilityType, AnnotatedEvent, BuffKey, BuffRef, CombatEvent, EventKind, RuneAnnotation,
    RuneDriftAnnotation, RuneKind, RuneSlots, RuneState, TimingAnnotation, RUNE_SLOT_COUNT,
};

use crate::classify::ClassificationBand;
use crate::error::{EngineError, EngineResult};

const PRESENCE_GCD_BASELINE_MS: i64 = 1_000;
const DEFAULT_GCD_BASELINE_MS: i64 = 1_500;
const GCD_DELTA_RED_ABOVE_MS: i64 = 500;
const GCD_DELTA_YELLOW_ABOVE_MS: i64 = 100;
const RUNE_DRIFT_RED_ABOVE_MS: i64 = 1_500;
const RUNE_DRIFT_ORANGE_ABOVE_MS: i64 = 1_000;
const RESOURCE_UNIT_SCALE: i64 = 10;

pub fn annotate(events: &[CombatEvent]) -> Vec<EngineResult<AnnotatedEvent>> {
    events.iter().map(annotate_event).collect()
}

pub fn annotate_event(event: &CombatEvent) -> EngineResult<AnnotatedEvent> {
    if event.resource_waste < 0 {
        return Err(violation(
            event,
            format!("resource waste must not be negative, got {}", event.resource_waste),
        ));
    }

    let (label, miss_reason) = event_label(event)?;

    Ok(AnnotatedEvent {
        label,
        miss_reason,
        is_filler: !event.is_core_cast,
        timing: timing_annotation(event)?,
        consumed_procs: consumed_procs(event),
        resource_display: event.resource_after.div_euclid(RESOURCE_UNIT_SCALE),
        resource_waste_display: (event.resource_waste > 0)
            .then(|| event.resource_waste / RESOURCE_UNIT_SCALE),
        runes: rune_annotation(event)?,
        rune_drift: rune_drift_annotation(event)?,
        event: event.clone(),
    })
}

fn timing_annotation(event: &CombatEvent) -> EngineResult<Option<TimingAnnotation>> {
    if !event.has_global_cooldown {
        return Ok(None);
    }
    let Some(gcd_offset) = event.gcd_offset else {
        return Ok(None);
    };
    if gcd_offset < 0 {
        return Err(violation(
            event,
            format!("global cooldown offset must not be negative, got {gcd_offset}"),
        ));
    }

    let baseline_ms = gcd_baseline_ms(&event.active_buffs);
    let delta_ms = gcd_offset - baseline_ms;
    let band = if delta_ms > GCD_DELTA_RED_ABOVE_MS {
        ClassificationBand::Red
    } else if delta_ms > GCD_DELTA_YELLOW_ABOVE_MS {
        ClassificationBand::Yellow
    } else {
        ClassificationBand::Green
    };

    Ok(Some(TimingAnnotation {
        baseline_ms,
        delta_ms,
        band,
    }))
}

fn gcd_baseline_ms(active_buffs: &[BuffRef]) -> i64 {
    if active_buffs.iter().any(|buff| buff.key == BuffKey::Presence) {
        PRESENCE_GCD_BASELINE_MS
    } else {
        DEFAULT_GCD_BASELINE_MS
    }
}

fn consumed_procs(event: &CombatEvent) -> Vec<BuffRef> {
    event
        .active_buffs
        .iter()
        .filter(|buff| match buff.key {
            BuffKey::KillingMachine => event.consumes_killing_machine,
            BuffKey::Rime => event.consumes_rime,
            BuffKey::Presence | BuffKey::Other => false,
        })
        .cloned()
        .collect()
}

fn rune_annotation(event: &CombatEvent) -> EngineResult<RuneAnnotation> {
    if !event.modifies_runes {
        return Ok(RuneAnnotation {
            before: event.runes_before,
            after: None,
        });
    }

    let after = event
        .runes_after
        .ok_or_else(|| violation(event, "rune-modifying event has no resulting rune state"))?;

    Ok(RuneAnnotation {
        before: event.runes_before,
        after: Some(after),
    })
}

fn rune_drift_annotation(event: &CombatEvent) -> EngineResult<Option<RuneDriftAnnotation>> {
    let wasted_ms = match event.rune_grace_wasted {
        None | Some(0) => return Ok(None),
        Some(wasted_ms) if wasted_ms < 0 => {
            return Err(violation(
                event,
                format!("rune grace wasted must not be negative, got {wasted_ms}"),
            ));
        }
        Some(wasted_ms) => wasted_ms,
    };

    let band = if wasted_ms > RUNE_DRIFT_RED_ABOVE_MS {
        ClassificationBand::Red
    } else if wasted_ms > RUNE_DRIFT_ORANGE_ABOVE_MS {
        ClassificationBand::Orange
    } else {
        ClassificationBand::Yellow
    };

    Ok(Some(RuneDriftAnnotation { wasted_ms, band }))
}

fn event_label(event: &CombatEvent) -> EngineResult<(String, Option<String>)> {
    let label = match event.kind {
        EventKind::DebuffRemoved => {
            let target = event
                .target
                .as_deref()
                .ok_or_else(|| violation(event, "debuff removal has no target"))?;
            format!("{} drops on {target}", event.ability_name)
        }
        EventKind::BuffRemoved => format!("{} ends", event.ability_name),
        EventKind::Cast | EventKind::Other => event.ability_name.clone(),
    };

    let miss_reason = if event.is_miss {
        let hit_type = event
            .hit_type
            .as_deref()
            .ok_or_else(|| violation(event, "missed event has no hit result"))?;
        Some(hit_type.to_lowercase())
    } else {
        None
    };

    Ok((label, miss_reason))
}

fn violation(event: &CombatEvent, message: impl AsRef<str>) -> EngineError {
    EngineError::contract(format!(
        "{} at {} ms: {}",
        event.ability_name,
        event.timestamp,
        message.as_ref()
    ))
}

#[cfg(test)]
mod tests {
    use super::{
        annotate, annotate_event, AbilityType, BuffKey, BuffRef, CombatEvent, EventKind,
        RuneKind, RuneSlots, RuneState,
    };
    use crate::classify::ClassificationBand;

    fn full_runes() -> RuneSlots {
        let rune = |kind| RuneState {
            kind,
            is_available: true,
        };
        [
            rune(RuneKind::Blood),
            rune(RuneKind::Blood),
            rune(RuneKind::Frost),
            rune(RuneKind::Frost),
            rune(RuneKind::Unholy),
            rune(RuneKind::Unholy),
        ]
    }

    fn buff(ability_id: u32, name: &str, key: BuffKey) -> BuffRef {
        BuffRef {
            ability_id,
            name: name.to_string(),
            icon: None,
            key,
        }
    }

    fn cast_event(timestamp: u64, ability_name: &str) -> CombatEvent {
        CombatEvent {
            timestamp,
            ability_id: 49020,
            ability_name: ability_name.to_string(),
            ability_type: AbilityType::Physical,
            kind: EventKind::Cast,
            target: Some("Patchwerk".to_string()),
            is_core_cast: true,
            is_miss: false,
            hit_type: None,
            resource_after: 0,
            resource_waste: 0,
            has_global_cooldown: true,
            gcd_offset: None,
            active_buffs: Vec::new(),
            consumes_killing_machine: false,
            consumes_rime: false,
            runes_before: full_runes(),
            runes_after: None,
            modifies_runes: false,
            rune_grace_wasted: None,
        }
    }

    fn annotated(event: &CombatEvent) -> super::AnnotatedEvent {
        annotate_event(event).expect("Expected event to annotate")
    }

    #[test]
    fn preserves_length_and_order() {
        let events = (0..5)
            .map(|index| cast_event(index * 1_500, "Obliterate"))
            .collect::<Vec<CombatEvent>>();

        let annotated_events = annotate(&events);

        assert_eq!(annotated_events.len(), events.len());
        for (input, output) in events.iter().zip(annotated_events.iter()) {
            let output = output.as_ref().expect("Expected event to annotate");
            assert_eq!(output.timestamp(), input.timestamp);
        }
    }

    #[test]
    fn failed_events_keep_their_slot() {
        let mut broken = cast_event(1_000, "Blood Plague");
        broken.kind = EventKind::DebuffRemoved;
        broken.target = None;
        let events = vec![cast_event(0, "Icy Touch"), broken, cast_event(2_000, "Obliterate")];

        let annotated_events = annotate(&events);

        assert_eq!(annotated_events.len(), 3);
        assert!(annotated_events[0].is_ok());
        assert!(annotated_events[1]
            .as_ref()
            .expect_err("Expected missing target to fail")
            .is_contract_violation());
        assert!(annotated_events[2].is_ok());
    }

    #[test]
    fn presence_buff_lowers_gcd_baseline() {
        let mut without_presence = cast_event(10_000, "Scourge Strike");
        without_presence.gcd_offset = Some(1_800);
        let mut with_presence = without_presence.clone();
        with_presence
            .active_buffs
            .push(buff(48265, "Unholy Presence", BuffKey::Presence));

        let default_timing = annotated(&without_presence)
            .timing
            .expect("Expected timing annotation");
        let presence_timing = annotated(&with_presence)
            .timing
            .expect("Expected timing annotation");

        assert_eq!(default_timing.baseline_ms, 1_500);
        assert_eq!(default_timing.delta_ms, 300);
        assert_eq!(default_timing.band, ClassificationBand::Yellow);
        assert_eq!(presence_timing.baseline_ms, 1_000);
        assert_eq!(presence_timing.delta_ms, 800);
        assert_eq!(presence_timing.band, ClassificationBand::Red);
    }

    #[test]
    fn timing_within_tolerance_is_green() {
        let mut event = cast_event(3_000, "Obliterate");
        event.gcd_offset = Some(1_600);

        assert_eq!(annotated(&event).timing_band(), Some(ClassificationBand::Green));
    }

    #[test]
    fn events_without_gcd_or_offset_are_not_timed() {
        let mut off_gcd = cast_event(3_000, "Unbreakable Armor");
        off_gcd.has_global_cooldown = false;
        off_gcd.gcd_offset = Some(4_000);
        let no_offset = cast_event(3_000, "Obliterate");

        assert_eq!(annotated(&off_gcd).timing, None);
        assert_eq!(annotated(&no_offset).timing, None);
    }

    #[test]
    fn records_consumed_procs_in_buff_order() {
        let mut event = cast_event(5_000, "Howling Blast");
        event.active_buffs = vec![
            buff(59052, "Rime", BuffKey::Rime),
            buff(2825, "Bloodlust", BuffKey::Other),
            buff(51124, "Killing Machine", BuffKey::KillingMachine),
        ];
        event.consumes_killing_machine = true;
        event.consumes_rime = true;

        let procs = annotated(&event)
            .consumed_procs
            .into_iter()
            .map(|proc_buff| proc_buff.key)
            .collect::<Vec<BuffKey>>();

        assert_eq!(procs, vec![BuffKey::Rime, BuffKey::KillingMachine]);
    }

    #[test]
    fn active_proc_is_not_consumed_without_flag() {
        let mut event = cast_event(5_000, "Obliterate");
        event.active_buffs = vec![buff(51124, "Killing Machine", BuffKey::KillingMachine)];
        event.consumes_rime = true;

        assert!(annotated(&event).consumed_procs.is_empty());
    }

    #[test]
    fn resource_waste_is_scaled_down_and_floored() {
        let mut event = cast_event(6_000, "Obliterate");
        event.resource_after = 1_300;
        event.resource_waste = 35;

        let annotated_event = annotated(&event);

        assert_eq!(annotated_event.resource_waste_display, Some(3));
        assert_eq!(annotated_event.resource_display, 130);
        assert_eq!(
            annotated(&cast_event(6_000, "Obliterate")).resource_waste_display,
            None
        );
    }

    #[test]
    fn rune_drift_bands() {
        let drift_band = |rune_grace_wasted: Option<i64>| {
            let mut event = cast_event(7_000, "Obliterate");
            event.rune_grace_wasted = rune_grace_wasted;
            annotated(&event).rune_drift_band()
        };

        assert_eq!(drift_band(None), None);
        assert_eq!(drift_band(Some(0)), None);
        assert_eq!(drift_band(Some(900)), Some(ClassificationBand::Yellow));
        assert_eq!(drift_band(Some(1_200)), Some(ClassificationBand::Orange));
        assert_eq!(drift_band(Some(1_600)), Some(ClassificationBand::Red));
    }

    #[test]
    fn runes_after_only_shown_for_rune_changes() {
        let untouched = cast_event(8_000, "Frost Strike");
        let mut unchanged_spend = cast_event(8_000, "Blood Tap");
        unchanged_spend.modifies_runes = true;
        unchanged_spend.runes_after = Some(full_runes());

        assert_eq!(annotated(&untouched).runes.after, None);
        let runes = annotated(&unchanged_spend).runes;
        assert_eq!(runes.after, Some(runes.before));
    }

    #[test]
    fn rune_change_without_resulting_state_is_rejected() {
        let mut event = cast_event(8_000, "Obliterate");
        event.modifies_runes = true;

        let error = annotate_event(&event).expect_err("Expected missing runes to fail");

        assert!(error.is_contract_violation());
    }

    #[test]
    fn relabels_removals_and_misses() {
        let mut debuff_drop = cast_event(9_000, "Frost Fever");
        debuff_drop.kind = EventKind::DebuffRemoved;
        let mut buff_end = cast_event(9_000, "Unbreakable Armor");
        buff_end.kind = EventKind::BuffRemoved;
        let mut miss = cast_event(9_000, "Obliterate");
        miss.is_miss = true;
        miss.hit_type = Some("DODGE".to_string());

        assert_eq!(annotated(&debuff_drop).label, "Frost Fever drops on Patchwerk");
        assert_eq!(annotated(&buff_end).label, "Unbreakable Armor ends");
        let missed = annotated(&miss);
        assert_eq!(missed.label, "Obliterate");
        assert_eq!(missed.miss_reason.as_deref(), Some("dodge"));
    }

    #[test]
    fn non_core_casts_are_marked_as_filler() {
        let mut event = cast_event(9_500, "Horn of Winter");
        event.is_core_cast = false;

        assert!(annotated(&event).is_filler);
    }
}

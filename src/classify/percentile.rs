use super::model::{Percentile, PercentileBand};
use crate::error::{EngineError, EngineResult};

pub fn classify_percentile(percentile: Percentile) -> EngineResult<PercentileBand> {
    let value = match percentile {
        Percentile::Ranked(value) => value,
        Percentile::Unavailable => return Ok(PercentileBand::NEUTRAL),
    };

    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(EngineError::contract(format!(
            "percentile must be within 0..=100, got {value}"
        )));
    }

    let band = if value >= 100.0 {
        PercentileBand::Gold
    } else if value >= 99.0 {
        PercentileBand::Pink
    } else if value >= 95.0 {
        PercentileBand::Orange
    } else if value >= 75.0 {
        PercentileBand::Purple
    } else if value >= 50.0 {
        PercentileBand::Blue
    } else {
        PercentileBand::Grey
    };

    Ok(band)
}

mod model;
mod percentile;

pub use model::{
    Classification, ClassificationBand, MetricResult, Percentile, PercentileBand, RatioBanding,
};
pub use percentile::classify_percentile;

use crate::error::{EngineError, EngineResult};

pub(crate) const GCD_DELAY_YELLOW_ABOVE_MS: f64 = 100.0;
pub(crate) const GCD_DELAY_RED_ABOVE_MS: f64 = 200.0;
pub(crate) const RUNE_DRIFT_TOTAL_YELLOW_ABOVE_MS: f64 = 5_000.0;
pub(crate) const RUNE_DRIFT_TOTAL_RED_ABOVE_MS: f64 = 10_000.0;
pub(crate) const KILLING_MACHINE_DELAY_YELLOW_ABOVE_MS: f64 = 2_000.0;
pub(crate) const KILLING_MACHINE_DELAY_RED_ABOVE_MS: f64 = 2_500.0;

pub fn classify(
    metric: &MetricResult,
    ratio_banding: RatioBanding,
) -> EngineResult<Classification> {
    match *metric {
        MetricResult::Ratio { actual, possible } => classify_ratio(actual, possible, ratio_banding),
        MetricResult::Rate {
            observed_rate,
            target_rate,
        } => classify_rate(observed_rate, target_rate),
        MetricResult::Uptime {
            fraction,
            max_achievable,
            info_only,
        } => classify_uptime(fraction, max_achievable, info_only),
        MetricResult::Composite { value } => classify_composite(value),
        MetricResult::Boolean { value } => Ok(classify_boolean(value)),
        MetricResult::Delay {
            observed_ms,
            yellow_above_ms,
            red_above_ms,
        } => classify_delay(observed_ms, yellow_above_ms, red_above_ms),
        MetricResult::Informational { value } => {
            require_finite("informational value", value)?;
            Ok(Classification::new(ClassificationBand::Info, value))
        }
    }
}

fn classify_ratio(
    actual: i64,
    possible: i64,
    ratio_banding: RatioBanding,
) -> EngineResult<Classification> {
    if actual < 0 || possible < 0 {
        return Err(EngineError::contract(format!(
            "ratio counts must not be negative, got {actual} of {possible}"
        )));
    }

    // No opportunities means nothing to fail.
    if possible == 0 {
        return Ok(Classification::new(ClassificationBand::Green, 1.0));
    }

    let score = actual as f64 / possible as f64;
    let band = if score >= 1.0 {
        ClassificationBand::Green
    } else if score >= 0.5 {
        match ratio_banding {
            RatioBanding::Graded => ClassificationBand::Yellow,
            RatioBanding::SingleThreshold => ClassificationBand::Orange,
        }
    } else if score > 0.0 {
        ClassificationBand::Orange
    } else {
        ClassificationBand::Red
    };

    Ok(Classification::new(band, score))
}

fn classify_rate(observed_rate: f64, target_rate: f64) -> EngineResult<Classification> {
    require_finite("observed rate", observed_rate)?;
    if !target_rate.is_finite() || target_rate <= 0.0 {
        return Err(EngineError::contract(format!(
            "target rate must be positive, got {target_rate}"
        )));
    }
    if observed_rate < 0.0 {
        return Err(EngineError::contract(format!(
            "observed rate must not be negative, got {observed_rate}"
        )));
    }

    let score = observed_rate / target_rate;
    let band = if score >= 1.0 {
        ClassificationBand::Green
    } else if score >= 0.8 {
        ClassificationBand::Yellow
    } else if score > 0.5 {
        ClassificationBand::Orange
    } else {
        ClassificationBand::Red
    };

    Ok(Classification::new(band, score))
}

fn classify_uptime(
    fraction: f64,
    max_achievable: f64,
    info_only: bool,
) -> EngineResult<Classification> {
    if !fraction.is_finite() || !(0.0..=1.0).contains(&fraction) {
        return Err(EngineError::contract(format!(
            "uptime fraction must be within 0..=1, got {fraction}"
        )));
    }
    if !max_achievable.is_finite() || max_achievable <= 0.0 || max_achievable > 1.0 {
        return Err(EngineError::contract(format!(
            "maximum achievable uptime must be within (0, 1], got {max_achievable}"
        )));
    }

    let normalized = fraction / max_achievable;
    if info_only {
        return Ok(Classification::new(ClassificationBand::Info, normalized));
    }

    let band = if normalized > 0.9 {
        ClassificationBand::Green
    } else if normalized > 0.65 {
        ClassificationBand::Yellow
    } else if normalized > 0.5 {
        ClassificationBand::Orange
    } else {
        ClassificationBand::Red
    };

    Ok(Classification::new(band, normalized))
}

fn classify_composite(value: f64) -> EngineResult<Classification> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(EngineError::contract(format!(
            "composite score must be within 0..=1, got {value}"
        )));
    }

    let band = if value > 0.8 {
        ClassificationBand::Green
    } else if value > 0.65 {
        ClassificationBand::Yellow
    } else if value > 0.5 {
        ClassificationBand::Orange
    } else {
        ClassificationBand::Red
    };

    Ok(Classification::new(band, value))
}

fn classify_boolean(value: bool) -> Classification {
    if value {
        Classification::new(ClassificationBand::Green, 1.0)
    } else {
        Classification::new(ClassificationBand::Red, 0.0)
    }
}

fn classify_delay(
    observed_ms: f64,
    yellow_above_ms: f64,
    red_above_ms: f64,
) -> EngineResult<Classification> {
    require_finite("observed delay", observed_ms)?;
    if observed_ms < 0.0 {
        return Err(EngineError::contract(format!(
            "observed delay must not be negative, got {observed_ms}"
        )));
    }
    if !yellow_above_ms.is_finite()
        || !red_above_ms.is_finite()
        || yellow_above_ms <= 0.0
        || yellow_above_ms > red_above_ms
    {
        return Err(EngineError::contract(format!(
            "delay thresholds must satisfy 0 < yellow <= red, got {yellow_above_ms} and {red_above_ms}"
        )));
    }

    let band = if observed_ms > red_above_ms {
        ClassificationBand::Red
    } else if observed_ms > yellow_above_ms {
        ClassificationBand::Yellow
    } else {
        ClassificationBand::Green
    };
    let score = 1.0 - (observed_ms / red_above_ms).min(1.0);

    Ok(Classification::new(band, score))
}

fn require_finite(name: &str, value: f64) -> EngineResult<()> {
    if value.is_finite() {
        return Ok(());
    }

    Err(EngineError::contract(format!(
        "{name} must be a finite number, got {value}"
    )))
}

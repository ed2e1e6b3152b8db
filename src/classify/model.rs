use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClassificationBand {
    Red,
    Orange,
    Yellow,
    Green,
    Info,
}

impl ClassificationBand {
    fn rank(self) -> Option<u8> {
        match self {
            ClassificationBand::Red => Some(0),
            ClassificationBand::Orange => Some(1),
            ClassificationBand::Yellow => Some(2),
            ClassificationBand::Green => Some(3),
            ClassificationBand::Info => None,
        }
    }

    pub fn is_judged(self) -> bool {
        self.rank().is_some()
    }
}

impl PartialOrd for ClassificationBand {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.rank(), other.rank()) {
            (Some(left), Some(right)) => Some(left.cmp(&right)),
            (None, None) => Some(Ordering::Equal),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RatioBanding {
    #[default]
    Graded,
    SingleThreshold,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum MetricResult {
    Ratio {
        actual: i64,
        possible: i64,
    },
    Rate {
        observed_rate: f64,
        target_rate: f64,
    },
    Uptime {
        fraction: f64,
        max_achievable: f64,
        info_only: bool,
    },
    Composite {
        value: f64,
    },
    Boolean {
        value: bool,
    },
    Delay {
        observed_ms: f64,
        yellow_above_ms: f64,
        red_above_ms: f64,
    },
    Informational {
        value: f64,
    },
}

impl MetricResult {
    pub fn ratio(actual: i64, possible: i64) -> Self {
        MetricResult::Ratio { actual, possible }
    }

    pub fn judged_uptime(fraction: f64, max_achievable: f64) -> Self {
        MetricResult::Uptime {
            fraction,
            max_achievable,
            info_only: false,
        }
    }

    pub fn info_uptime(fraction: f64) -> Self {
        MetricResult::Uptime {
            fraction,
            max_achievable: 1.0,
            info_only: true,
        }
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            MetricResult::Ratio { .. } => "ratio",
            MetricResult::Rate { .. } => "rate",
            MetricResult::Uptime { .. } => "uptime",
            MetricResult::Composite { .. } => "composite",
            MetricResult::Boolean { .. } => "boolean",
            MetricResult::Delay { .. } => "delay",
            MetricResult::Informational { .. } => "informational",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub band: ClassificationBand,
    pub score: f64,
}

impl Classification {
    pub(crate) fn new(band: ClassificationBand, score: f64) -> Self {
        Self { band, score }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PercentileBand {
    Grey,
    Blue,
    Purple,
    Orange,
    Pink,
    Gold,
}

impl PercentileBand {
    pub const NEUTRAL: PercentileBand = PercentileBand::Grey;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPercentile", into = "RawPercentile")]
pub enum Percentile {
    Ranked(f64),
    #[default]
    Unavailable,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawPercentile {
    Number(f64),
    Text(String),
    Missing,
}

const UNAVAILABLE_PERCENTILE: &str = "n/a";

impl From<RawPercentile> for Percentile {
    fn from(raw: RawPercentile) -> Self {
        match raw {
            RawPercentile::Number(value) => Percentile::Ranked(value),
            RawPercentile::Text(text) => match text.trim().parse::<f64>() {
                Ok(value) => Percentile::Ranked(value),
                Err(_) => Percentile::Unavailable,
            },
            RawPercentile::Missing => Percentile::Unavailable,
        }
    }
}

impl From<Percentile> for RawPercentile {
    fn from(percentile: Percentile) -> Self {
        match percentile {
            Percentile::Ranked(value) => RawPercentile::Number(value),
            Percentile::Unavailable => RawPercentile::Text(UNAVAILABLE_PERCENTILE.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ClassificationBand, MetricResult, Percentile};

    #[test]
    fn info_band_is_outside_the_judged_ladder() {
        assert!(ClassificationBand::Red < ClassificationBand::Orange);
        assert!(ClassificationBand::Yellow < ClassificationBand::Green);
        assert_eq!(
            ClassificationBand::Info.partial_cmp(&ClassificationBand::Green),
            None
        );
        assert!(!ClassificationBand::Info.is_judged());
    }

    #[test]
    fn percentile_accepts_numbers_and_not_available_marker() {
        let ranked: Percentile = serde_json::from_str("97.5").expect("Expected numeric percentile");
        let unavailable: Percentile =
            serde_json::from_str("\"n/a\"").expect("Expected n/a percentile");

        assert_eq!(ranked, Percentile::Ranked(97.5));
        assert_eq!(unavailable, Percentile::Unavailable);
        assert_eq!(
            serde_json::to_string(&unavailable).expect("Expected percentile to serialize"),
            "\"n/a\""
        );
    }

    #[test]
    fn null_percentile_is_unavailable() {
        let missing: Percentile = serde_json::from_str("null").expect("Expected null percentile");

        assert_eq!(missing, Percentile::Unavailable);
        assert_eq!(Percentile::default(), Percentile::Unavailable);
    }

    #[test]
    fn metric_results_are_tagged_by_kind() {
        let metric: MetricResult =
            serde_json::from_str(r#"{ "kind": "uptime", "fraction": 0.4, "maxAchievable": 0.8, "infoOnly": false }"#)
                .expect("Expected tagged uptime metric");

        assert_eq!(metric, MetricResult::judged_uptime(0.4, 0.8));
        assert_eq!(metric.kind_label(), "uptime");
    }
}

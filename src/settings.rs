use serde::{Deserialize, Serialize};
use std::io::ErrorKind as IoErrorKind;
use std::path::Path;

use crate::classify::RatioBanding;
use crate::error::{EngineError, EngineResult};

pub const SETTINGS_PATH_ENV: &str = "RUNELOG_SETTINGS";

pub(crate) const UNHOLY_PRESENCE_BUFF_ID: u32 = 48265;
pub(crate) const KILLING_MACHINE_BUFF_ID: u32 = 51124;
pub(crate) const RIME_BUFF_ID: u32 = 59052;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportSettings {
    pub ratio_banding: RatioBanding,
    pub presence_buff_ids: Vec<u32>,
    pub killing_machine_buff_ids: Vec<u32>,
    pub rime_buff_ids: Vec<u32>,
    pub log_filter: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            ratio_banding: RatioBanding::Graded,
            presence_buff_ids: vec![UNHOLY_PRESENCE_BUFF_ID],
            killing_machine_buff_ids: vec![KILLING_MACHINE_BUFF_ID],
            rime_buff_ids: vec![RIME_BUFF_ID],
            log_filter: "info".to_string(),
        }
    }
}

impl ReportSettings {
    pub fn from_env() -> EngineResult<Self> {
        match std::env::var(SETTINGS_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_path(Path::new(path.trim())),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_path(path: &Path) -> EngineResult<Self> {
        let raw_json = std::fs::read_to_string(path).map_err(|error| {
            if error.kind() == IoErrorKind::NotFound {
                EngineError::configuration(format!(
                    "Settings file not found: {}",
                    path.display()
                ))
            } else {
                EngineError::configuration(format!(
                    "Failed to read settings '{}': {error}",
                    path.display()
                ))
            }
        })?;

        let settings = serde_json::from_str::<ReportSettings>(&raw_json).map_err(|error| {
            EngineError::configuration(format!(
                "Failed to parse settings '{}': {error}",
                path.display()
            ))
        })?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> EngineResult<()> {
        let groups = [
            ("presenceBuffIds", &self.presence_buff_ids),
            ("killingMachineBuffIds", &self.killing_machine_buff_ids),
            ("rimeBuffIds", &self.rime_buff_ids),
        ];

        for (name, ids) in groups {
            if ids.is_empty() {
                return Err(EngineError::configuration(format!(
                    "{name} must list at least one ability id"
                )));
            }
        }

        for (index, (name, ids)) in groups.iter().enumerate() {
            for (other_name, other_ids) in groups.iter().skip(index + 1) {
                if let Some(shared) = ids.iter().find(|id| other_ids.contains(*id)) {
                    return Err(EngineError::configuration(format!(
                        "ability id {shared} is listed in both {name} and {other_name}"
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ReportSettings, KILLING_MACHINE_BUFF_ID};
    use crate::classify::RatioBanding;
    use crate::error::ErrorKind;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_file(name: &str) -> std::path::PathBuf {
        let timestamp_nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|duration| duration.as_nanos())
            .unwrap_or(0);
        let process_id = std::process::id();
        std::env::temp_dir().join(format!(
            "runelog_settings_test_{process_id}_{timestamp_nanos}_{name}"
        ))
    }

    #[test]
    fn partial_settings_file_falls_back_to_defaults() {
        let path = unique_temp_file("partial.json");
        std::fs::write(&path, r#"{ "ratioBanding": "singleThreshold" }"#)
            .expect("Failed to write settings fixture");

        let settings = ReportSettings::from_path(&path).expect("Expected settings to load");

        assert_eq!(settings.ratio_banding, RatioBanding::SingleThreshold);
        assert_eq!(settings.killing_machine_buff_ids, vec![KILLING_MACHINE_BUFF_ID]);
        assert_eq!(settings.log_filter, "info");

        std::fs::remove_file(&path).expect("Failed to remove settings fixture");
    }

    #[test]
    fn missing_settings_file_is_a_configuration_error() {
        let path = unique_temp_file("does_not_exist.json");

        let error = ReportSettings::from_path(&path).expect_err("Expected missing file to fail");

        assert_eq!(error.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn rejects_ids_shared_between_buff_groups() {
        let settings = ReportSettings {
            rime_buff_ids: vec![KILLING_MACHINE_BUFF_ID],
            ..ReportSettings::default()
        };

        let error = settings.validate().expect_err("Expected overlapping ids to fail");

        assert!(error.message().contains("killingMachineBuffIds"));
    }
}

use serde::Serialize;
use serde_json::Value;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use super::{FightReport, ReportView};
use crate::error::{EngineError, EngineResult};

pub(crate) const REPORT_VIEW_SCHEMA_VERSION: u32 = 1;

const ENVELOPE_KEY: &str = "data";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportViewDocument<'a> {
    pub schema_version: u32,
    pub payload_file: String,
    pub generated_at: String,
    pub view: &'a ReportView,
}

impl<'a> ReportViewDocument<'a> {
    pub fn new(payload_path: &Path, view: &'a ReportView) -> Self {
        let payload_file = payload_path
            .file_name()
            .map(|value| value.to_string_lossy().to_string())
            .unwrap_or_else(|| payload_path.to_string_lossy().to_string());

        Self {
            schema_version: REPORT_VIEW_SCHEMA_VERSION,
            payload_file,
            generated_at: chrono::Utc::now().to_rfc3339(),
            view,
        }
    }
}

pub fn report_view_path(payload_path: &Path) -> PathBuf {
    payload_path.with_extension("view.json")
}

pub fn load_fight_report(payload_path: &Path) -> EngineResult<FightReport> {
    let raw_json = std::fs::read_to_string(payload_path).map_err(|error| {
        EngineError::unavailable(format!(
            "Failed to read report payload '{}': {error}",
            payload_path.display()
        ))
    })?;

    let mut document = serde_json::from_str::<Value>(&raw_json).map_err(|error| {
        EngineError::unavailable(format!(
            "Failed to parse report payload '{}': {error}",
            payload_path.display()
        ))
    })?;

    if let Some(inner) = document
        .as_object_mut()
        .and_then(|object| object.remove(ENVELOPE_KEY))
        .filter(Value::is_object)
    {
        document = inner;
    }

    serde_json::from_value::<FightReport>(document).map_err(|error| {
        EngineError::unavailable(format!(
            "Report payload '{}' is missing fight data: {error}",
            payload_path.display()
        ))
    })
}

pub fn write_report_view(payload_path: &Path, view: &ReportView) -> EngineResult<PathBuf> {
    let view_path = report_view_path(payload_path);
    let document = ReportViewDocument::new(payload_path, view);
    let serialized = serde_json::to_vec_pretty(&document).map_err(|error| {
        EngineError::unavailable(format!("Failed to serialize report view: {error}"))
    })?;

    replace_file(&view_path, &serialized).map_err(|error| {
        EngineError::unavailable(format!(
            "Failed to write report view '{}': {error}",
            view_path.display()
        ))
    })?;

    Ok(view_path)
}

fn replace_file(target_path: &Path, contents: &[u8]) -> std::io::Result<()> {
    if let Some(parent_directory) = target_path.parent() {
        std::fs::create_dir_all(parent_directory)?;
    }

    let staging_path = staging_path(target_path);
    let staged = std::fs::write(&staging_path, contents)
        .and_then(|()| std::fs::rename(&staging_path, target_path));

    if staged.is_err() {
        if let Err(cleanup_error) = std::fs::remove_file(&staging_path) {
            if cleanup_error.kind() != IoErrorKind::NotFound {
                tracing::warn!(
                    staging_path = %staging_path.display(),
                    cleanup_error = %cleanup_error,
                    "Failed to remove staged report view"
                );
            }
        }
    }

    staged
}

fn staging_path(target_path: &Path) -> PathBuf {
    let file_name = target_path
        .file_name()
        .map(|value| value.to_string_lossy().to_string())
        .unwrap_or_default();

    target_path.with_file_name(format!(".{file_name}.{}.tmp", std::process::id()))
}

#[cfg(test)]
mod tests {
    use super::{load_fight_report, report_view_path, write_report_view};
    use crate::error::ErrorKind;
    use crate::report::ReportView;
    use crate::settings::ReportSettings;
    use serde_json::{json, Value};
    use std::path::Path;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_directory() -> std::path::PathBuf {
        let timestamp_nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|duration| duration.as_nanos())
            .unwrap_or(0);
        let process_id = std::process::id();
        std::env::temp_dir().join(format!("runelog_sidecar_test_{process_id}_{timestamp_nanos}"))
    }

    fn minimal_fight() -> Value {
        json!({
            "fight_metadata": {
                "source": "Tsunami",
                "encounter": "Grobbulus",
                "duration": 95_000,
                "rankings": {}
            },
            "analysis": { "flask_usage": { "has_flask": true } }
        })
    }

    #[test]
    fn derives_view_path_from_payload_path() {
        let view_path = report_view_path(Path::new("/reports/naxx_patchwerk.json"));

        assert_eq!(view_path, Path::new("/reports/naxx_patchwerk.view.json"));
    }

    #[test]
    fn loads_enveloped_and_bare_payloads() {
        let temp_directory = unique_temp_directory();
        std::fs::create_dir_all(&temp_directory)
            .expect("Failed to create temporary sidecar test directory");

        let enveloped_path = temp_directory.join("enveloped.json");
        std::fs::write(&enveloped_path, json!({ "data": minimal_fight() }).to_string())
            .expect("Failed to write enveloped payload");
        let bare_path = temp_directory.join("bare.json");
        std::fs::write(&bare_path, minimal_fight().to_string())
            .expect("Failed to write bare payload");

        let enveloped = load_fight_report(&enveloped_path).expect("Expected enveloped payload");
        let bare = load_fight_report(&bare_path).expect("Expected bare payload");

        assert_eq!(enveloped.fight_metadata.encounter, "Grobbulus");
        assert_eq!(bare.fight_metadata.duration, 95_000);

        std::fs::remove_dir_all(&temp_directory)
            .expect("Failed to remove temporary sidecar test directory");
    }

    #[test]
    fn unreadable_payloads_are_upstream_failures() {
        let temp_directory = unique_temp_directory();
        std::fs::create_dir_all(&temp_directory)
            .expect("Failed to create temporary sidecar test directory");

        let missing = load_fight_report(&temp_directory.join("missing.json"))
            .expect_err("Expected missing payload to fail");
        assert_eq!(missing.kind(), ErrorKind::UpstreamDataUnavailable);

        let garbled_path = temp_directory.join("garbled.json");
        std::fs::write(&garbled_path, "{ not json").expect("Failed to write garbled payload");
        let garbled = load_fight_report(&garbled_path).expect_err("Expected garbled payload to fail");
        assert_eq!(garbled.kind(), ErrorKind::UpstreamDataUnavailable);

        let headless_path = temp_directory.join("headless.json");
        std::fs::write(&headless_path, json!({ "events": [] }).to_string())
            .expect("Failed to write headless payload");
        let headless =
            load_fight_report(&headless_path).expect_err("Expected payload without metadata to fail");
        assert_eq!(headless.kind(), ErrorKind::UpstreamDataUnavailable);

        std::fs::remove_dir_all(&temp_directory)
            .expect("Failed to remove temporary sidecar test directory");
    }

    #[test]
    fn writes_view_document_next_to_payload() {
        let temp_directory = unique_temp_directory();
        std::fs::create_dir_all(&temp_directory)
            .expect("Failed to create temporary sidecar test directory");

        let payload_path = temp_directory.join("grobbulus.json");
        std::fs::write(&payload_path, minimal_fight().to_string())
            .expect("Failed to write payload");

        let report = load_fight_report(&payload_path).expect("Expected payload to load");
        let view = ReportView::build(&report, &ReportSettings::default());

        let view_path =
            write_report_view(&payload_path, &view).expect("Expected view write to succeed");
        // A second write replaces the first.
        write_report_view(&payload_path, &view).expect("Expected view rewrite to succeed");

        let written: Value = serde_json::from_str(
            &std::fs::read_to_string(&view_path).expect("Expected view file to exist"),
        )
        .expect("Expected view file to be JSON");

        assert_eq!(written["schemaVersion"], 1);
        assert_eq!(written["payloadFile"], "grobbulus.json");
        assert_eq!(written["view"]["header"]["encounter"], "Grobbulus");
        assert_eq!(written["view"]["header"]["playerRank"], "n/a");
        assert_eq!(written["view"]["metrics"][0]["key"], "flask_usage");
        assert_eq!(written["view"]["metrics"][0]["classification"]["band"], "green");
        assert!(written["generatedAt"].is_string());

        let leftovers = std::fs::read_dir(&temp_directory)
            .expect("Expected temporary directory listing")
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);

        std::fs::remove_dir_all(&temp_directory)
            .expect("Failed to remove temporary sidecar test directory");
    }
}

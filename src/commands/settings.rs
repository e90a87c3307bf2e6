use crate::commands::gateway::GatewayDelays;
use crate::interaction::validation::ValidationLimits;
use serde_json::{json, Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const SETTINGS_SCHEMA_VERSION: i64 = 2;
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EffectiveSettings {
    pub delays: GatewayDelays,
    pub limits: ValidationLimits,
}

pub type SharedSettings = Arc<Mutex<EffectiveSettings>>;

pub fn current_limits(settings: &SharedSettings) -> Result<ValidationLimits, String> {
    settings
        .lock()
        .map(|s| s.limits)
        .map_err(|_| "Settings lock error".to_string())
}

#[cfg(feature = "desktop")]
fn app_data_dir(app: &tauri::AppHandle) -> Result<String, String> {
    use tauri::Manager;
    app.path()
        .app_data_dir()
        .map(|dir| dir.to_string_lossy().to_string())
        .map_err(|e| format!("Failed to resolve app data directory: {e}"))
}

#[cfg(feature = "desktop")]
#[tauri::command]
pub async fn get_settings(app: tauri::AppHandle) -> Result<Value, String> {
    load_settings_from_disk(&app_data_dir(&app)?)
}

// Gateway delays are only read at startup.
#[cfg(feature = "desktop")]
#[tauri::command]
pub async fn save_settings(
    settings: Value,
    app: tauri::AppHandle,
    effective: tauri::State<'_, SharedSettings>,
) -> Result<Value, String> {
    let data_dir = app_data_dir(&app)?;
    let saved = save_settings_to_disk(&data_dir, settings)?;
    let mut current = effective.lock().map_err(|_| "Settings lock error".to_string())?;
    *current = effective_from_value(&saved);
    Ok(saved)
}

pub fn load_effective_settings(data_dir: &str) -> Result<EffectiveSettings, String> {
    let settings = load_settings_from_disk(data_dir)?;
    Ok(effective_from_value(&settings))
}

fn millis(settings: &Value, key: &str, default: u64) -> Duration {
    Duration::from_millis(settings.get(key).and_then(Value::as_u64).unwrap_or(default))
}

fn count(settings: &Value, key: &str, default: usize) -> usize {
    settings
        .get(key)
        .and_then(Value::as_u64)
        .map(|v| v as usize)
        .unwrap_or(default)
}

pub fn effective_from_value(settings: &Value) -> EffectiveSettings {
    let defaults = ValidationLimits::default();
    let min_otp_length = count(settings, "minOtpLength", defaults.min_otp_length);

    EffectiveSettings {
        delays: GatewayDelays {
            network: millis(settings, "networkDelayMs", 2000),
            location: millis(settings, "locationDelayMs", 2000),
            digilocker: millis(settings, "digilockerDelayMs", 3000),
        },
        limits: ValidationLimits {
            max_images: count(settings, "maxImagesPerReport", defaults.max_images),
            min_phone_digits: count(settings, "minPhoneDigits", defaults.min_phone_digits),
            min_otp_length,
            max_otp_length: count(settings, "maxOtpLength", defaults.max_otp_length).max(min_otp_length),
        },
    }
}

pub fn load_settings_from_disk(data_dir: &str) -> Result<Value, String> {
    let path = settings_path(data_dir);
    ensure_data_dir(data_dir)?;

    let on_disk = read_settings_file(&path)?;
    let migrated = migrate_settings(on_disk.clone().unwrap_or_else(|| json!({})));
    if on_disk.as_ref() != Some(&migrated) {
        log::debug!("writing normalized {SETTINGS_FILE}");
        write_settings_file(&path, &migrated)?;
    }

    Ok(migrated)
}

pub fn save_settings_to_disk(data_dir: &str, settings: Value) -> Result<Value, String> {
    let path = settings_path(data_dir);
    ensure_data_dir(data_dir)?;

    let mut merged = match load_settings_from_disk(data_dir).unwrap_or_else(|_| default_settings()) {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    merge_settings(&mut merged, &settings);

    let migrated = migrate_settings(Value::Object(merged));
    write_settings_file(&path, &migrated)?;
    log::info!("settings saved to {}", path.display());
    Ok(migrated)
}

fn settings_path(data_dir: &str) -> PathBuf {
    Path::new(data_dir).join(SETTINGS_FILE)
}

fn ensure_data_dir(data_dir: &str) -> Result<(), String> {
    fs::create_dir_all(data_dir).map_err(|e| format!("Failed to create data directory: {e}"))
}

// `None` when the file does not exist yet.
fn read_settings_file(path: &Path) -> Result<Option<Value>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {SETTINGS_FILE}: {e}"))?;
    match serde_json::from_str::<Value>(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            log::warn!("{SETTINGS_FILE} is not valid JSON, using defaults: {e}");
            Ok(Some(json!({})))
        }
    }
}

fn write_settings_file(path: &Path, settings: &Value) -> Result<(), String> {
    let raw = serde_json::to_string_pretty(settings)
        .map_err(|e| format!("Failed to serialize settings: {e}"))?;
    fs::write(path, raw).map_err(|e| format!("Failed to write {SETTINGS_FILE}: {e}"))
}

fn migrate_settings(input: Value) -> Value {
    let mut out = match input {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    let version = out
        .get("schema_version")
        .and_then(Value::as_i64)
        .unwrap_or(0);

    if version < 2 {
        split_simulated_delay(&mut out);
    }

    normalize_keys(&mut out);
    sanitize_settings(&mut out);
    out.insert("schema_version".to_string(), json!(SETTINGS_SCHEMA_VERSION));

    Value::Object(out)
}

fn default_settings() -> Value {
    json!({
        "schema_version": SETTINGS_SCHEMA_VERSION,
        "networkDelayMs": 2000,
        "locationDelayMs": 2000,
        "digilockerDelayMs": 3000,
        "maxImagesPerReport": 3,
        "minPhoneDigits": 10,
        "minOtpLength": 4,
        "maxOtpLength": 6
    })
}

// v1 had a single simulatedDelayMs. DigiLocker gets one and a half times it.
fn split_simulated_delay(obj: &mut Map<String, Value>) {
    let Some(delay) = obj.remove("simulatedDelayMs").and_then(|v| v.as_u64()) else {
        return;
    };

    obj.entry("networkDelayMs".to_string()).or_insert(json!(delay));
    obj.entry("locationDelayMs".to_string()).or_insert(json!(delay));
    obj.entry("digilockerDelayMs".to_string())
        .or_insert(json!(delay + delay / 2));
}

// Keys no longer known are dropped and missing ones take their default.
fn normalize_keys(settings: &mut Map<String, Value>) {
    let Value::Object(defaults) = default_settings() else {
        return;
    };
    settings.retain(|key, _| defaults.contains_key(key));
    for (key, value) in defaults {
        settings.entry(key).or_insert(value);
    }
}

// Settings are a flat map of numbers. Unknown keys and non-numeric values in
// an update are ignored rather than stored.
fn merge_settings(target: &mut Map<String, Value>, incoming: &Value) {
    let Value::Object(incoming) = incoming else {
        log::warn!("ignoring settings update that is not an object");
        return;
    };

    for (key, value) in incoming {
        if key == "schema_version" || !target.contains_key(key) {
            log::debug!("ignoring unknown setting {key}");
            continue;
        }
        if value.is_u64() {
            target.insert(key.clone(), value.clone());
        } else {
            log::debug!("ignoring non-numeric value for {key}");
        }
    }
}

fn sanitize_settings(obj: &mut Map<String, Value>) {
    clamp_u64(obj, "networkDelayMs", 0, 10_000, 2000);
    clamp_u64(obj, "locationDelayMs", 0, 10_000, 2000);
    clamp_u64(obj, "digilockerDelayMs", 0, 10_000, 3000);
    clamp_u64(obj, "maxImagesPerReport", 1, 10, 3);
    clamp_u64(obj, "minPhoneDigits", 7, 15, 10);
    clamp_u64(obj, "minOtpLength", 4, 8, 4);
    clamp_u64(obj, "maxOtpLength", 4, 8, 6);

    // Max never below min.
    let min_otp = obj.get("minOtpLength").and_then(Value::as_u64).unwrap_or(4);
    let max_otp = obj.get("maxOtpLength").and_then(Value::as_u64).unwrap_or(6);
    obj.insert("maxOtpLength".to_string(), json!(max_otp.max(min_otp)));
}

fn clamp_u64(map: &mut Map<String, Value>, key: &str, min: u64, max: u64, default: u64) {
    let raw = map.get(key).and_then(Value::as_u64).unwrap_or(default);
    map.insert(key.to_string(), json!(raw.clamp(min, max)));
}

//! WebAssembly bindings for the Postbox query engine.
//!
//! The browser dashboard keeps the record list in memory and recomputes its
//! view locally on every interaction. All values cross the boundary as JSON
//! strings; the map buckets in a view are shaped for the charting library.

use postbox_core::{
    Dashboard, Engine, FilterCriteria, FilterState, GeoConfig, MapMode, Postcard, SortKey,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Error payload returned in place of a view.
#[derive(Serialize)]
struct ErrorResult {
    error: String,
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| error_json(format!("Serialization error: {}", e)))
}

fn error_json(error: String) -> String {
    serde_json::to_string(&ErrorResult { error })
        .unwrap_or_else(|_| r#"{"error":"Unknown error"}"#.to_string())
}

fn parse_engine(geo_json: Option<String>) -> Result<Engine, String> {
    match geo_json.as_deref().map(str::trim) {
        Some(json) if !json.is_empty() => GeoConfig::from_json(json)
            .map(Engine::new)
            .map_err(|e| e.to_string()),
        _ => Ok(Engine::default()),
    }
}

fn parse_records(records_json: &str) -> Result<Vec<Postcard>, String> {
    Postcard::parse_many(records_json).map_err(|e| format!("Failed to parse records: {}", e))
}

fn query_internal(records_json: &str, filter_json: &str) -> Result<String, String> {
    let records = parse_records(records_json)?;
    let state: FilterState = if filter_json.trim().is_empty() {
        FilterState::default()
    } else {
        serde_json::from_str(filter_json).map_err(|e| format!("Failed to parse filter: {}", e))?
    };

    let view = Engine::default().run(&records, &state);
    Ok(to_json(&view))
}

/// Run the whole pipeline once.
///
/// # Arguments
/// * `records_json` - One record or a list of records
/// * `filter_json` - Filter state (`country`, `type`, `sort`, `displayCount`,
///   `mapMode`, ...); an empty string means defaults
///
/// # Returns
/// A JSON string with the derived view, or `{"error": ...}`
#[wasm_bindgen]
pub fn query_wasm(records_json: &str, filter_json: &str) -> String {
    query_internal(records_json, filter_json).unwrap_or_else(error_json)
}

/// Stored country name behind a world map label.
#[wasm_bindgen]
pub fn resolve_country_wasm(label: &str) -> String {
    Engine::default().resolve_country(label)
}

/// Sort keys accepted by [`WasmDashboard::set_sort`].
#[wasm_bindgen]
pub fn sort_keys() -> js_sys::Array {
    SortKey::ALL
        .iter()
        .map(|key| JsValue::from_str(key.as_str()))
        .collect()
}

/// Get the library version.
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// A dashboard session living in the page.
#[wasm_bindgen]
pub struct WasmDashboard {
    inner: Dashboard,
}

#[wasm_bindgen]
impl WasmDashboard {
    /// Create a session, optionally with custom geo tables.
    #[wasm_bindgen(constructor)]
    pub fn new(geo_json: Option<String>) -> Result<WasmDashboard, JsError> {
        let engine = parse_engine(geo_json).map_err(|e| JsError::new(&e))?;
        Ok(Self {
            inner: Dashboard::new(engine),
        })
    }

    /// Replace the record list after a fetch.
    pub fn set_records(&mut self, records_json: &str) -> Result<(), JsError> {
        let records = parse_records(records_json).map_err(|e| JsError::new(&e))?;
        self.inner.set_records(records);
        Ok(())
    }

    /// Replace all filter criteria with the given JSON object.
    pub fn set_criteria(&mut self, criteria_json: &str) -> Result<(), JsError> {
        let criteria = self.parse_criteria(criteria_json).map_err(|e| JsError::new(&e))?;
        self.inner.set_criteria(criteria);
        Ok(())
    }

    /// Merge the given fields into the current criteria.
    pub fn update_criteria(&mut self, patch_json: &str) -> Result<(), JsError> {
        let criteria = self.merge_criteria(patch_json).map_err(|e| JsError::new(&e))?;
        self.inner.set_criteria(criteria);
        Ok(())
    }

    pub fn set_sort(&mut self, sort: &str) -> Result<(), JsError> {
        let sort = sort.parse::<SortKey>().map_err(|e| JsError::new(&e.to_string()))?;
        self.inner.set_sort(sort);
        Ok(())
    }

    pub fn load_more(&mut self) {
        self.inner.load_more();
    }

    /// Switch between `china` and `world`.
    pub fn toggle_map(&mut self, mode: &str) -> Result<(), JsError> {
        let mode = mode.parse::<MapMode>().map_err(|e| JsError::new(&e.to_string()))?;
        self.inner.toggle_map(mode);
        Ok(())
    }

    /// Handle a click on a map region or country.
    pub fn click_map(&mut self, label: &str) {
        self.inner.click_map(label);
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }

    /// Current filter state as JSON.
    pub fn state(&self) -> String {
        to_json(self.inner.state())
    }

    /// Current derived view as JSON.
    pub fn view(&mut self) -> String {
        to_json(&self.inner.view())
    }
}

impl WasmDashboard {
    fn parse_criteria(&self, json: &str) -> Result<FilterCriteria, String> {
        if json.trim().is_empty() {
            return Ok(FilterCriteria::default());
        }
        serde_json::from_str(json).map_err(|e| format!("Failed to parse criteria: {}", e))
    }

    fn merge_criteria(&self, patch_json: &str) -> Result<FilterCriteria, String> {
        let patch: serde_json::Value = serde_json::from_str(patch_json)
            .map_err(|e| format!("Failed to parse criteria: {}", e))?;
        let serde_json::Value::Object(patch) = patch else {
            return Err("Criteria patch must be a JSON object".to_string());
        };

        let mut merged = match serde_json::to_value(self.inner.criteria()) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        };
        for (key, value) in patch {
            if value.is_null() {
                merged.remove(&key);
            } else {
                merged.insert(key, value);
            }
        }
        serde_json::from_value(serde_json::Value::Object(merged))
            .map_err(|e| format!("Failed to parse criteria: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    const RECORDS: &str = r#"[
        {"id": "W1", "type": "received", "region": "内蒙古呼和浩特"},
        {"id": "W2", "type": "sent", "country": "日本"},
        {"id": "W3", "type": "寄出", "region": "浙江杭州"}
    ]"#;

    fn dashboard() -> WasmDashboard {
        let mut dashboard = WasmDashboard {
            inner: Dashboard::new(Engine::default()),
        };
        dashboard.inner.set_records(parse_records(RECORDS).unwrap());
        dashboard
    }

    fn parse(json: &str) -> Value {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_query_defaults() {
        let view = parse(&query_wasm(RECORDS, ""));
        assert_eq!(view["totalFilteredCount"], 3);
        assert_eq!(view["displayCards"][0]["id"], "W3");
        assert_eq!(view["stats"]["countryCount"], 2);
        assert_eq!(view["map"]["mapName"], "china");
    }

    #[test]
    fn test_query_with_filter() {
        let filter = r#"{"type": "寄出", "sort": "id_asc", "mapMode": "world"}"#;
        let view = parse(&query_wasm(RECORDS, filter));
        assert_eq!(view["totalFilteredCount"], 2);
        assert_eq!(view["displayCards"][0]["id"], "W2");
        assert_eq!(view["map"]["mapName"], "world");
    }

    #[test]
    fn test_query_reports_errors_as_json() {
        let result = parse(&query_wasm("{oops", ""));
        assert!(result["error"]
            .as_str()
            .unwrap()
            .starts_with("Failed to parse records"));

        let result = parse(&query_wasm(RECORDS, r#"{"sort": "newest"}"#));
        assert!(result["error"].as_str().unwrap().contains("Failed to parse filter"));
    }

    #[test]
    fn test_resolve_country() {
        assert_eq!(resolve_country_wasm("Japan"), "日本");
        assert_eq!(resolve_country_wasm("Narnia"), "Narnia");
    }

    #[test]
    fn test_custom_geo_config() {
        let engine = parse_engine(Some(r#"{"countryLabels": {"Suomi": "Finland"}}"#.into())).unwrap();
        assert_eq!(engine.resolve_country("Finland"), "Suomi");
        assert!(parse_engine(Some(r#"{"regionPrefixLen": 0}"#.into())).is_err());
        assert!(parse_engine(None).is_ok());
    }

    #[test]
    fn test_dashboard_click_and_reset() {
        let mut dashboard = dashboard();
        dashboard.click_map("内蒙古");

        let view = parse(&dashboard.view());
        assert_eq!(view["totalFilteredCount"], 1);
        assert_eq!(view["displayCards"][0]["id"], "W1");

        let state = parse(&dashboard.state());
        assert_eq!(state["country"], "中国");
        assert_eq!(state["province"], "内蒙古");

        dashboard.reset();
        let view = parse(&dashboard.view());
        assert_eq!(view["totalFilteredCount"], 3);
    }

    #[test]
    fn test_merge_criteria_patch() {
        let mut dashboard = dashboard();
        let criteria = dashboard.merge_criteria(r#"{"country": "日本"}"#).unwrap();
        dashboard.inner.set_criteria(criteria);

        let criteria = dashboard.merge_criteria(r#"{"tag": "x"}"#).unwrap();
        assert_eq!(criteria.country.as_deref(), Some("日本"));
        assert_eq!(criteria.tag.as_deref(), Some("x"));

        let criteria = dashboard.merge_criteria(r#"{"country": null}"#).unwrap();
        assert_eq!(criteria.country, None);

        assert!(dashboard.merge_criteria("[]").is_err());
    }

    #[test]
    fn test_load_more_grows_display_count() {
        let mut dashboard = dashboard();
        dashboard.load_more();
        let state = parse(&dashboard.state());
        assert_eq!(state["displayCount"], 24);
    }
}

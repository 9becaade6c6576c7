//! Geographic configuration and map bucketing.
//!
//! Two map modes are supported. In home mode records of the home country are
//! bucketed by a short province key derived from their free-text region. In
//! world mode every record is bucketed by its effective country, translated to
//! the label the map renderer expects.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PostboxError, Result};
use crate::normalize::NormalizedCard;

/// Home country assumed for records without a `country`.
pub const DEFAULT_HOME_COUNTRY: &str = "中国";

/// Minimum upper bound of the map colour scale.
pub const MIN_SCALE_MAX: usize = 5;

const DEFAULT_REGION_EXCEPTIONS: &[(&str, &str)] = &[("内蒙", "内蒙古"), ("黑龙", "黑龙江")];

const DEFAULT_COUNTRY_LABELS: &[(&str, &str)] = &[
    ("中国", "China"),
    ("日本", "Japan"),
    ("美国", "United States"),
    ("德国", "Germany"),
    ("英国", "United Kingdom"),
    ("法国", "France"),
    ("韩国", "Korea"),
    ("俄罗斯", "Russia"),
    ("加拿大", "Canada"),
    ("澳大利亚", "Australia"),
];

/// Geographic lookup tables used by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeoConfig {
    /// Effective country of records that carry no `country`.
    pub home_country: String,
    /// Map name handed to the renderer in home mode.
    pub home_map_name: String,
    /// Number of leading characters of `region` that form a province key.
    pub region_prefix_len: usize,
    /// Truncated prefixes that must be expanded to a full province name.
    pub region_exceptions: BTreeMap<String, String>,
    /// Home-language country name to world map label.
    pub country_labels: BTreeMap<String, String>,
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            home_country: DEFAULT_HOME_COUNTRY.to_string(),
            home_map_name: "china".to_string(),
            region_prefix_len: 2,
            region_exceptions: DEFAULT_REGION_EXCEPTIONS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            country_labels: DEFAULT_COUNTRY_LABELS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl GeoConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        tracing::debug!(
            path = %path.display(),
            exceptions = config.region_exceptions.len(),
            labels = config.country_labels.len(),
            "Loaded geo config"
        );
        Ok(config)
    }

    /// Reject tables the engine cannot use unambiguously.
    pub fn validate(&self) -> Result<()> {
        if self.home_country.is_empty() {
            return Err(PostboxError::InvalidConfig(
                "homeCountry must not be empty".into(),
            ));
        }
        if self.region_prefix_len == 0 {
            return Err(PostboxError::InvalidConfig(
                "regionPrefixLen must be at least 1".into(),
            ));
        }

        let mut seen: HashMap<&str, &str> = HashMap::new();
        for (country, label) in &self.country_labels {
            if let Some(previous) = seen.insert(label.as_str(), country.as_str()) {
                return Err(PostboxError::InvalidConfig(format!(
                    "label '{}' is used by both '{}' and '{}'",
                    label, previous, country
                )));
            }
        }
        Ok(())
    }

    /// Province key for a free-text region, e.g. `内蒙古自治区呼和浩特` -> `内蒙古`.
    pub fn province_key(&self, region: &str) -> Option<String> {
        let prefix: String = region.chars().take(self.region_prefix_len).collect();
        if prefix.is_empty() {
            return None;
        }
        Some(self.region_exceptions.get(&prefix).cloned().unwrap_or(prefix))
    }

    /// World map label of a country. Unmapped countries pass through.
    pub fn country_label<'a>(&'a self, country: &'a str) -> &'a str {
        self.country_labels
            .get(country)
            .map(String::as_str)
            .unwrap_or(country)
    }

    /// Country name behind a world map label. Unknown labels pass through.
    pub fn resolve_country(&self, label: &str) -> String {
        self.country_labels
            .iter()
            .find(|(_, mapped)| mapped.as_str() == label)
            .map(|(country, _)| country.clone())
            .unwrap_or_else(|| label.to_string())
    }

    pub fn map_name<'a>(&'a self, mode: MapMode) -> &'a str {
        match mode {
            MapMode::Home => &self.home_map_name,
            MapMode::World => "world",
        }
    }
}

/// Which map the dashboard shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapMode {
    #[default]
    #[serde(alias = "china")]
    Home,
    World,
}

impl MapMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::World => "world",
        }
    }
}

impl fmt::Display for MapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MapMode {
    type Err = PostboxError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "home" | "china" => Ok(Self::Home),
            "world" => Ok(Self::World),
            _ => Err(PostboxError::InvalidMapMode(s.to_string())),
        }
    }
}

/// Per-key totals for the choropleth.
///
/// Field names on the wire follow the renderer's data item shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoBucket {
    pub name: String,
    #[serde(rename = "value")]
    pub total: usize,
    #[serde(rename = "send")]
    pub sent: usize,
    #[serde(rename = "receive")]
    pub received: usize,
}

/// Everything the renderer needs to draw the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapData {
    pub mode: MapMode,
    pub map_name: String,
    pub buckets: Vec<GeoBucket>,
    /// Upper bound of the colour scale, never below [`MIN_SCALE_MAX`].
    pub scale_max: usize,
    /// Region labels are only legible on the home map.
    pub show_labels: bool,
}

/// Bucket key of one record, `None` when it does not belong on the map.
pub fn bucket_key(card: &NormalizedCard<'_>, mode: MapMode, geo: &GeoConfig) -> Option<String> {
    match mode {
        MapMode::Home => {
            if !card.is_home {
                return None;
            }
            card.region.and_then(|region| geo.province_key(region))
        }
        MapMode::World => Some(geo.country_label(card.country).to_string()),
    }
}

/// Aggregate records into map buckets, in first-seen key order.
pub fn aggregate(cards: &[NormalizedCard<'_>], mode: MapMode, geo: &GeoConfig) -> Vec<GeoBucket> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut buckets: Vec<GeoBucket> = Vec::new();

    for card in cards {
        let Some(key) = bucket_key(card, mode, geo) else {
            continue;
        };
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            buckets.push(GeoBucket {
                name: key,
                total: 0,
                sent: 0,
                received: 0,
            });
            buckets.len() - 1
        });

        let bucket = &mut buckets[slot];
        bucket.total += 1;
        if card.card.is_received() {
            bucket.received += 1;
        } else {
            bucket.sent += 1;
        }
    }

    buckets
}

/// Build the full map payload.
pub fn map_data(cards: &[NormalizedCard<'_>], mode: MapMode, geo: &GeoConfig) -> MapData {
    let buckets = aggregate(cards, mode, geo);
    let scale_max = buckets
        .iter()
        .map(|b| b.total)
        .max()
        .unwrap_or(0)
        .max(MIN_SCALE_MAX);

    MapData {
        mode,
        map_name: geo.map_name(mode).to_string(),
        buckets,
        scale_max,
        show_labels: mode == MapMode::Home,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Postcard;

    fn card(country: Option<&str>, region: Option<&str>, kind: &str) -> Postcard {
        Postcard {
            kind: Some(kind.to_string()),
            country: country.map(String::from),
            region: region.map(String::from),
            ..Default::default()
        }
    }

    fn buckets(records: &[Postcard], mode: MapMode) -> Vec<GeoBucket> {
        let geo = GeoConfig::default();
        let cards: Vec<_> = records.iter().map(|c| NormalizedCard::new(c, &geo)).collect();
        aggregate(&cards, mode, &geo)
    }

    #[test]
    fn test_province_key_exceptions() {
        let geo = GeoConfig::default();
        assert_eq!(geo.province_key("内蒙古自治区呼和浩特").as_deref(), Some("内蒙古"));
        assert_eq!(geo.province_key("黑龙江省哈尔滨").as_deref(), Some("黑龙江"));
        assert_eq!(geo.province_key("广东省广州市").as_deref(), Some("广东"));
        assert_eq!(geo.province_key("").as_deref(), None);
    }

    #[test]
    fn test_home_mode_skips_foreign_and_regionless() {
        let records = vec![
            card(None, Some("内蒙古自治区包头"), "received"),
            card(Some("中国"), Some("内蒙古锡林郭勒"), "sent"),
            card(None, None, "received"),
            card(Some("日本"), Some("東京都"), "received"),
        ];
        let result = buckets(&records, MapMode::Home);

        assert_eq!(
            result,
            vec![GeoBucket {
                name: "内蒙古".into(),
                total: 2,
                sent: 1,
                received: 1,
            }]
        );
    }

    #[test]
    fn test_world_mode_translates_labels() {
        let records = vec![
            card(Some("日本"), None, "received"),
            card(Some("Brazil"), None, "sent"),
            card(None, Some("广东"), "received"),
        ];
        let result = buckets(&records, MapMode::World);
        let names: Vec<_> = result.iter().map(|b| b.name.as_str()).collect();

        assert_eq!(names, vec!["Japan", "Brazil", "China"]);
        assert!(result.iter().all(|b| b.total == 1));
    }

    #[test]
    fn test_unknown_type_counts_as_sent() {
        let records = vec![card(Some("法国"), None, "lost")];
        let result = buckets(&records, MapMode::World);
        assert_eq!(result[0].sent, 1);
        assert_eq!(result[0].received, 0);
    }

    #[test]
    fn test_reverse_lookup() {
        let geo = GeoConfig::default();
        assert_eq!(geo.resolve_country("France"), "法国");
        assert_eq!(geo.resolve_country("Mars"), "Mars");
    }

    #[test]
    fn test_scale_max_has_floor() {
        let geo = GeoConfig::default();
        let records = vec![card(Some("日本"), None, "sent")];
        let cards: Vec<_> = records.iter().map(|c| NormalizedCard::new(c, &geo)).collect();
        let data = map_data(&cards, MapMode::World, &geo);
        assert_eq!(data.scale_max, MIN_SCALE_MAX);
        assert_eq!(data.map_name, "world");
        assert!(!data.show_labels);
    }

    #[test]
    fn test_config_from_json_adds_exception() {
        let geo = GeoConfig::from_json(
            r#"{"regionExceptions": {"内蒙": "内蒙古", "黑龙": "黑龙江", "新疆": "新疆维吾尔"}}"#,
        )
        .unwrap();
        assert_eq!(geo.home_country, DEFAULT_HOME_COUNTRY);
        assert_eq!(geo.province_key("新疆乌鲁木齐").as_deref(), Some("新疆维吾尔"));
    }

    #[test]
    fn test_config_rejects_duplicate_labels() {
        let err = GeoConfig::from_json(r#"{"countryLabels": {"韩国": "Korea", "朝鲜": "Korea"}}"#)
            .unwrap_err();
        assert!(matches!(err, PostboxError::InvalidConfig(_)));
    }

    #[test]
    fn test_map_mode_parse() {
        assert_eq!("china".parse::<MapMode>().unwrap(), MapMode::Home);
        assert_eq!("World".parse::<MapMode>().unwrap(), MapMode::World);
        assert!("moon".parse::<MapMode>().is_err());
    }
}

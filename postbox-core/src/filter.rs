//! Filter criteria and record matching.

use serde::{Deserialize, Deserializer, Serialize};

use crate::normalize::NormalizedCard;
use crate::record::CardType;

/// Independent filter criteria. `None` or an empty string matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterCriteria {
    /// Exact effective country.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Substring of the region, home-country records only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    /// Substring of the region, home-country records only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(
        rename = "type",
        deserialize_with = "optional_card_type",
        skip_serializing_if = "Option::is_none"
    )]
    pub card_type: Option<CardType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    /// Case-insensitive keyword over tags, note, region, country and person.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Case-insensitive substring of the id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl FilterCriteria {
    /// True when no criterion is active.
    pub fn is_empty(&self) -> bool {
        [
            &self.country,
            &self.province,
            &self.city,
            &self.platform,
            &self.tag,
            &self.id,
        ]
        .into_iter()
        .all(|c| active(c).is_none())
            && self.card_type.is_none()
    }

    /// Build a reusable matcher. Keywords are lowercased once here.
    pub fn matcher(&self) -> Matcher<'_> {
        Matcher {
            criteria: self,
            tag: active(&self.tag).map(str::to_lowercase),
            id: active(&self.id).map(str::to_lowercase),
        }
    }

    /// Convenience for a single record.
    pub fn matches(&self, card: &NormalizedCard<'_>) -> bool {
        self.matcher().matches(card)
    }
}

/// Criteria prepared for evaluation over many records.
#[derive(Debug)]
pub struct Matcher<'c> {
    criteria: &'c FilterCriteria,
    tag: Option<String>,
    id: Option<String>,
}

impl Matcher<'_> {
    /// Conjunction of every active criterion.
    pub fn matches(&self, card: &NormalizedCard<'_>) -> bool {
        let c = self.criteria;

        if let Some(country) = active(&c.country) {
            if card.country != country {
                return false;
            }
        }

        if card.is_home {
            for part in [active(&c.province), active(&c.city)].into_iter().flatten() {
                if !card.region.is_some_and(|region| region.contains(part)) {
                    return false;
                }
            }
        }

        if let Some(wanted) = c.card_type {
            if card.card.card_type() != Some(wanted) {
                return false;
            }
        }

        if let Some(platform) = active(&c.platform) {
            if card.card.platform.as_deref() != Some(platform) {
                return false;
            }
        }

        if let Some(id) = &self.id {
            if !card.id_lower.as_ref().is_some_and(|own| own.contains(id.as_str())) {
                return false;
            }
        }

        if let Some(tag) = &self.tag {
            if !card.search_pool.contains(tag.as_str()) {
                return false;
            }
        }

        true
    }
}

fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn optional_card_type<'de, D>(deserializer: D) -> Result<Option<CardType>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(label) if !label.trim().is_empty() => {
            label.parse().map(Some).map_err(serde::de::Error::custom)
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoConfig;
    use crate::record::Postcard;

    fn matches(criteria: &FilterCriteria, card: &Postcard) -> bool {
        let geo = GeoConfig::default();
        criteria.matches(&NormalizedCard::new(card, &geo))
    }

    fn home_card(region: Option<&str>) -> Postcard {
        Postcard {
            id: Some("CN-77".into()),
            kind: Some("收到".into()),
            region: region.map(String::from),
            platform: Some("Postcrossing".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_criteria_match_everything() {
        let criteria = FilterCriteria {
            country: Some(String::new()),
            ..Default::default()
        };
        assert!(criteria.is_empty());
        assert!(matches(&criteria, &Postcard::default()));
    }

    #[test]
    fn test_country_uses_home_default() {
        let criteria = FilterCriteria {
            country: Some("中国".into()),
            ..Default::default()
        };
        assert!(matches(&criteria, &home_card(None)));

        let foreign = Postcard {
            country: Some("日本".into()),
            ..Default::default()
        };
        assert!(!matches(&criteria, &foreign));
    }

    #[test]
    fn test_region_filters_need_region() {
        let criteria = FilterCriteria {
            province: Some("浙江".into()),
            city: Some("杭州".into()),
            ..Default::default()
        };
        assert!(matches(&criteria, &home_card(Some("浙江省杭州市"))));
        assert!(!matches(&criteria, &home_card(Some("浙江省宁波市"))));
        assert!(!matches(&criteria, &home_card(None)));
    }

    #[test]
    fn test_region_filters_ignored_abroad() {
        let criteria = FilterCriteria {
            province: Some("浙江".into()),
            ..Default::default()
        };
        let foreign = Postcard {
            country: Some("德国".into()),
            ..Default::default()
        };
        assert!(matches(&criteria, &foreign));
    }

    #[test]
    fn test_keyword_searches_pool_case_insensitively() {
        let card = Postcard {
            tags: vec!["Lighthouse".into()],
            person: Some("Hannah".into()),
            country: Some("德国".into()),
            ..Default::default()
        };
        for keyword in ["lighthouse", "HANNAH", "德国"] {
            let criteria = FilterCriteria {
                tag: Some(keyword.into()),
                ..Default::default()
            };
            assert!(matches(&criteria, &card), "keyword {keyword} should match");
        }

        let criteria = FilterCriteria {
            tag: Some("volcano".into()),
            ..Default::default()
        };
        assert!(!matches(&criteria, &card));
    }

    #[test]
    fn test_id_filter_missing_id_does_not_match() {
        let criteria = FilterCriteria {
            id: Some("cn-7".into()),
            ..Default::default()
        };
        assert!(matches(&criteria, &home_card(None)));
        assert!(!matches(&criteria, &Postcard::default()));
    }

    #[test]
    fn test_type_and_platform_exact() {
        let criteria = FilterCriteria {
            card_type: Some(CardType::Received),
            platform: Some("Postcrossing".into()),
            ..Default::default()
        };
        assert!(matches(&criteria, &home_card(None)));

        let other_platform = FilterCriteria {
            platform: Some("postcrossing".into()),
            ..Default::default()
        };
        assert!(!matches(&other_platform, &home_card(None)));

        let sent = FilterCriteria {
            card_type: Some(CardType::Sent),
            ..Default::default()
        };
        assert!(!matches(&sent, &home_card(None)));
        assert!(!matches(&sent, &Postcard::default()));
    }

    #[test]
    fn test_deserialize_blank_type_is_wildcard() {
        let criteria: FilterCriteria =
            serde_json::from_str(r#"{"type": "", "country": "日本"}"#).unwrap();
        assert_eq!(criteria.card_type, None);
        assert_eq!(criteria.country.as_deref(), Some("日本"));

        let criteria: FilterCriteria = serde_json::from_str(r#"{"type": "寄出"}"#).unwrap();
        assert_eq!(criteria.card_type, Some(CardType::Sent));
    }
}

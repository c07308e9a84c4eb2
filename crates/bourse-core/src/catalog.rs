//! Exchange catalog and the country-grouped view built from it.
//!
//! A catalog arrives either as a flat JSON array of [`ExchangeRecord`] or as a
//! JSON object mapping country to records. Both are decoded into a
//! [`CatalogPayload`]; the aggregator then normalizes either one into a
//! [`CountryGroupedView`].

use std::collections::{BTreeSet, HashMap};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::{normalize_code, ExchangeRecord};
use crate::{CatalogError, ValidationError};

/// Flat, ordered, immutable list of exchange records.
///
/// Cloning is cheap; the records are shared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    records: Arc<[ExchangeRecord]>,
}

impl Catalog {
    pub fn new(records: Vec<ExchangeRecord>) -> Self {
        Self {
            records: records.into(),
        }
    }

    pub fn records(&self) -> &[ExchangeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sorted, distinct, normalized, non-empty country codes.
    pub fn countries(&self) -> Vec<String> {
        self.records
            .iter()
            .map(ExchangeRecord::normalized_country)
            .filter(|country| !country.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Sorted, distinct, normalized, non-empty MICs of every record whose
    /// normalized country is one of `countries`.
    ///
    /// `countries` must already be normalized.
    pub fn mics_for_countries(&self, countries: &[String]) -> Vec<String> {
        if countries.is_empty() {
            return Vec::new();
        }

        self.records
            .iter()
            .filter(|record| countries.contains(&record.normalized_country()))
            .map(ExchangeRecord::normalized_mic)
            .filter(|mic| !mic.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl From<Vec<ExchangeRecord>> for Catalog {
    fn from(records: Vec<ExchangeRecord>) -> Self {
        Self::new(records)
    }
}

/// Ordered mapping from normalized country code to that country's records.
///
/// Key order is insertion order. Serializes as a JSON object in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountryGroupedView {
    buckets: Vec<(String, Vec<ExchangeRecord>)>,
    index: HashMap<String, usize>,
}

impl CountryGroupedView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group records by normalized country, first-seen order for both the
    /// countries and the records inside each bucket.
    ///
    /// Records with an empty country can never be selected and are left out.
    pub fn from_records(records: &[ExchangeRecord]) -> Self {
        let mut view = Self::new();
        for record in records {
            let country = record.normalized_country();
            if country.is_empty() {
                continue;
            }
            view.bucket_mut(country).push(record.clone());
        }
        view
    }

    /// Normalize the keys of a pre-grouped catalog. Keys that collapse to the
    /// same country after normalization are merged in document order.
    pub fn from_groups(groups: &[(String, Vec<ExchangeRecord>)]) -> Self {
        let mut view = Self::new();
        for (country, records) in groups {
            let country = normalize_code(country);
            if country.is_empty() {
                continue;
            }
            view.bucket_mut(country).extend(records.iter().cloned());
        }
        view
    }

    /// Insert or replace the bucket for an already normalized country.
    pub fn insert(&mut self, country: String, records: Vec<ExchangeRecord>) {
        *self.bucket_mut(country) = records;
    }

    pub fn get(&self, country: &str) -> Option<&[ExchangeRecord]> {
        self.index
            .get(country)
            .map(|position| self.buckets[*position].1.as_slice())
    }

    pub fn contains_country(&self, country: &str) -> bool {
        self.index.contains_key(country)
    }

    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.buckets.iter().map(|(country, _)| country.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ExchangeRecord])> {
        self.buckets
            .iter()
            .map(|(country, records)| (country.as_str(), records.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn record_count(&self) -> usize {
        self.buckets.iter().map(|(_, records)| records.len()).sum()
    }

    /// Every record in `self` is present under the same key in `superset`.
    pub fn is_subset_of(&self, superset: &Self) -> bool {
        self.iter().all(|(country, records)| {
            superset
                .get(country)
                .is_some_and(|all| records.iter().all(|record| all.contains(record)))
        })
    }

    fn bucket_mut(&mut self, country: String) -> &mut Vec<ExchangeRecord> {
        let position = match self.index.get(&country).copied() {
            Some(position) => position,
            None => {
                let position = self.buckets.len();
                self.index.insert(country.clone(), position);
                self.buckets.push((country, Vec::new()));
                position
            }
        };
        &mut self.buckets[position].1
    }
}

impl Serialize for CountryGroupedView {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.buckets.len()))?;
        for (country, records) in &self.buckets {
            map.serialize_entry(country, records)?;
        }
        map.end()
    }
}

/// Declared layout of a catalog document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogShape {
    /// Decide from the first non-whitespace character (`[` or `{`).
    #[default]
    Auto,
    Flat,
    Grouped,
}

impl CatalogShape {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Flat => "flat",
            Self::Grouped => "grouped",
        }
    }
}

impl Display for CatalogShape {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CatalogShape {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "flat" => Ok(Self::Flat),
            "grouped" => Ok(Self::Grouped),
            other => Err(ValidationError::InvalidCatalogShape {
                value: other.to_owned(),
            }),
        }
    }
}

/// Decoded catalog document in either supported layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogPayload {
    Flat(Vec<ExchangeRecord>),
    /// Country key (as published) to records, in document order.
    Grouped(Vec<(String, Vec<ExchangeRecord>)>),
}

impl CatalogPayload {
    pub fn parse(body: &str, shape: CatalogShape) -> Result<Self, CatalogError> {
        let shape = match shape {
            CatalogShape::Auto if body.trim_start().starts_with('{') => CatalogShape::Grouped,
            CatalogShape::Auto => CatalogShape::Flat,
            explicit => explicit,
        };

        match shape {
            CatalogShape::Grouped => {
                let OrderedGroups(groups) = serde_json::from_str(body)?;
                Ok(Self::Grouped(groups))
            }
            _ => {
                let records: Option<Vec<ExchangeRecord>> = serde_json::from_str(body)?;
                Ok(Self::Flat(records.unwrap_or_default()))
            }
        }
    }

    pub const fn shape(&self) -> CatalogShape {
        match self {
            Self::Flat(_) => CatalogShape::Flat,
            Self::Grouped(_) => CatalogShape::Grouped,
        }
    }

    /// Flatten into a record list, bucket by bucket for grouped payloads.
    ///
    /// In a grouped payload the key decides the country: each record's
    /// `country` is replaced by its group key, so the flattened catalog maps
    /// countries to MICs the same way the grouped view does.
    pub fn to_catalog(&self) -> Catalog {
        match self {
            Self::Flat(records) => Catalog::new(records.clone()),
            Self::Grouped(groups) => Catalog::new(
                groups
                    .iter()
                    .flat_map(|(country, records)| {
                        records.iter().map(move |record| ExchangeRecord {
                            country: country.clone(),
                            ..record.clone()
                        })
                    })
                    .collect(),
            ),
        }
    }

    pub fn record_count(&self) -> usize {
        match self {
            Self::Flat(records) => records.len(),
            Self::Grouped(groups) => groups.iter().map(|(_, records)| records.len()).sum(),
        }
    }
}

/// JSON object decoded into key/value pairs without losing document order.
struct OrderedGroups(Vec<(String, Vec<ExchangeRecord>)>);

impl<'de> Deserialize<'de> for OrderedGroups {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct GroupsVisitor;

        impl<'de> Visitor<'de> for GroupsVisitor {
            type Value = OrderedGroups;

            fn expecting(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
                formatter.write_str("an object mapping country to exchange records")
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(OrderedGroups(Vec::new()))
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut groups = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((country, records)) =
                    access.next_entry::<String, Option<Vec<ExchangeRecord>>>()?
                {
                    groups.push((country, records.unwrap_or_default()));
                }
                Ok(OrderedGroups(groups))
            }
        }

        deserializer.deserialize_any(GroupsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(mic: &str, country: &str) -> ExchangeRecord {
        ExchangeRecord::new(mic, mic, mic, country, "")
    }

    #[test]
    fn groups_in_first_seen_order() {
        let view = CountryGroupedView::from_records(&[
            record("xlon", "gb"),
            record("xnys", "us"),
            record("xlse", " GB "),
        ]);

        assert_eq!(view.countries().collect::<Vec<_>>(), vec!["GB", "US"]);
        let gb = view.get("GB").expect("GB bucket");
        assert_eq!(gb.len(), 2);
        assert_eq!(gb[0].mic, "xlon");
        assert_eq!(gb[1].mic, "xlse");
    }

    #[test]
    fn skips_records_without_country() {
        let view = CountryGroupedView::from_records(&[record("xnys", ""), record("xnas", "us")]);
        assert_eq!(view.len(), 1);
        assert_eq!(view.record_count(), 1);
    }

    #[test]
    fn grouped_keys_are_normalized_and_merged() {
        let view = CountryGroupedView::from_groups(&[
            (String::from("us"), vec![record("xnys", "us")]),
            (String::from("gb"), vec![record("xlon", "gb")]),
            (String::from("US "), vec![record("xnas", "us")]),
        ]);

        assert_eq!(view.countries().collect::<Vec<_>>(), vec!["US", "GB"]);
        assert_eq!(view.get("US").map(<[_]>::len), Some(2));
    }

    #[test]
    fn grouped_payload_keeps_document_order() {
        let body = r#"{"ro":[{"mic":"xbse","country":"ro"}],"at":[{"mic":"xwbo","country":"at"}]}"#;
        let payload = CatalogPayload::parse(body, CatalogShape::Auto).expect("parse");

        let CatalogPayload::Grouped(groups) = payload else {
            panic!("expected grouped payload");
        };
        assert_eq!(groups[0].0, "ro");
        assert_eq!(groups[1].0, "at");
    }

    #[test]
    fn grouped_catalog_takes_country_from_key() {
        let body = r#"{"us":[{"mic":"xnys"},{"mic":"xlon","country":"gb"}]}"#;
        let payload = CatalogPayload::parse(body, CatalogShape::Grouped).expect("parse");

        let catalog = payload.to_catalog();

        assert_eq!(catalog.countries(), vec!["US"]);
        assert_eq!(
            catalog.mics_for_countries(&[String::from("US")]),
            vec!["XLON", "XNYS"]
        );
        assert!(catalog.mics_for_countries(&[String::from("GB")]).is_empty());
    }

    #[test]
    fn auto_detects_flat_payload() {
        let payload = CatalogPayload::parse(" [ {\"mic\":\"xnys\"} ]", CatalogShape::Auto)
            .expect("parse");
        assert_eq!(payload.shape(), CatalogShape::Flat);
        assert_eq!(payload.record_count(), 1);
    }

    #[test]
    fn null_flat_payload_is_empty() {
        let payload = CatalogPayload::parse("null", CatalogShape::Flat).expect("parse");
        assert_eq!(payload, CatalogPayload::Flat(Vec::new()));
    }

    #[test]
    fn shape_mismatch_is_malformed() {
        let err = CatalogPayload::parse("[]", CatalogShape::Grouped).expect_err("must fail");
        assert!(matches!(err, CatalogError::Malformed(_)));
    }

    #[test]
    fn view_serializes_in_insertion_order() {
        let mut view = CountryGroupedView::new();
        view.insert(String::from("US"), Vec::new());
        view.insert(String::from("FR"), Vec::new());

        let json = serde_json::to_string(&view).expect("serialize");
        assert_eq!(json, r#"{"US":[],"FR":[]}"#);
    }

    #[test]
    fn legal_mics_are_sorted_and_distinct() {
        let catalog = Catalog::new(vec![
            record("xnys", "us"),
            record("XNAS ", "US"),
            record("xnys", "us"),
            record("", "us"),
            record("xlon", "gb"),
        ]);

        assert_eq!(
            catalog.mics_for_countries(&[String::from("US")]),
            vec!["XNAS", "XNYS"]
        );
        assert!(catalog.mics_for_countries(&[]).is_empty());
        assert_eq!(catalog.countries(), vec!["GB", "US"]);
    }
}

//! Polygon dataset loading and group selection.
//!
//! Purpose
//! - Read a GeoJSON FeatureCollection once into an immutable `Dataset` and
//!   answer group-level queries against it: the universe of group codes, and
//!   the ordered unit subset for one group code.
//!
//! Attribute columns are duck-typed: required roles come from an explicit
//! `ColumnSpec`, optional sub-group roles are resolved heuristically (see
//! `schema`). Codes arrive as numbers or zero-padded strings depending on the
//! source dataset; both normalize to the same canonical integer.

pub mod schema;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use geo::MultiPolygon;
use geojson::{FeatureCollection, GeoJson};
use serde_json::Value;

use crate::error::{Error, Result};
use schema::{resolve_subgroup_columns, SubgroupColumns};

/// Required attribute roles, by column name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnSpec {
    pub group_code: String,
    pub group_name: String,
    pub unit_no: String,
    pub unit_name: String,
}

impl Default for ColumnSpec {
    fn default() -> Self {
        Self {
            group_code: "ST_CODE".to_string(),
            group_name: "ST_NAME".to_string(),
            unit_no: "AC_NO".to_string(),
            unit_name: "AC_NAME".to_string(),
        }
    }
}

/// One source record: attributes plus areal geometry.
#[derive(Clone, Debug)]
struct RawRecord {
    properties: serde_json::Map<String, Value>,
    geometry: MultiPolygon<f64>,
}

/// Immutable in-memory dataset, loaded once and shared across group runs.
#[derive(Clone, Debug)]
pub struct Dataset {
    records: Vec<RawRecord>,
    /// Attribute column names, sorted for deterministic heuristics.
    columns: Vec<String>,
}

/// One entry of the group universe (operator convenience listing).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupInfo {
    pub code: i64,
    pub name: String,
}

/// One unit of a group, keyed by its declared unit number. The unit number is
/// the node id, never the record's position in the file.
#[derive(Clone, Debug)]
pub struct UnitRecord {
    pub unit_no: i64,
    pub name: String,
    pub subgroup_code: Option<i64>,
    pub subgroup_name: Option<String>,
    pub geometry: MultiPolygon<f64>,
}

/// Ordered unit subset of one group.
#[derive(Clone, Debug)]
pub struct GroupSubset {
    pub code: i64,
    /// Units sorted ascending by declared unit number.
    pub units: Vec<UnitRecord>,
    /// Columns the sub-group attributes were read from (either may be absent).
    pub subgroup_columns: SubgroupColumns,
}

impl Dataset {
    pub fn from_geojson_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| Error::io(path, source))?;
        Self::from_geojson_str(&raw)
    }

    pub fn from_geojson_str(raw: &str) -> Result<Self> {
        let parsed: GeoJson = raw.parse()?;
        let collection = FeatureCollection::try_from(parsed)?;
        let mut records = Vec::with_capacity(collection.features.len());
        let mut columns = std::collections::BTreeSet::new();
        for (index, feature) in collection.features.into_iter().enumerate() {
            let gj_geometry = feature
                .geometry
                .ok_or_else(|| Error::Dataset(format!("feature {index} has no geometry")))?;
            let geometry = match geo::Geometry::<f64>::try_from(gj_geometry)? {
                geo::Geometry::Polygon(polygon) => MultiPolygon::new(vec![polygon]),
                geo::Geometry::MultiPolygon(multi) => multi,
                _ => {
                    return Err(Error::Dataset(format!(
                        "feature {index}: expected Polygon or MultiPolygon geometry"
                    )))
                }
            };
            let properties = feature.properties.unwrap_or_default();
            for key in properties.keys() {
                if !columns.contains(key) {
                    columns.insert(key.clone());
                }
            }
            records.push(RawRecord {
                properties,
                geometry,
            });
        }
        Ok(Self {
            records,
            columns: columns.into_iter().collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Attribute column names, sorted.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Distinct (group code, group name) pairs present in the source, sorted
    /// by code.
    pub fn group_universe(&self, columns: &ColumnSpec) -> Vec<GroupInfo> {
        let mut seen: BTreeMap<i64, String> = BTreeMap::new();
        for record in &self.records {
            let Some(code) = record
                .properties
                .get(&columns.group_code)
                .and_then(normalize_code)
            else {
                continue;
            };
            let name = record
                .properties
                .get(&columns.group_name)
                .and_then(text_value)
                .unwrap_or_default();
            seen.entry(code).or_insert(name);
        }
        seen.into_iter()
            .map(|(code, name)| GroupInfo { code, name })
            .collect()
    }

    /// Select the units of one group, sorted by declared unit number.
    ///
    /// Group codes are compared after canonical integer normalization, so a
    /// zero-padded `"007"` in the source matches a requested `7`. Zero
    /// matching records is the recoverable `MissingGroup` condition; callers
    /// skip the group and continue with the rest of the batch.
    pub fn select_group(
        &self,
        columns: &ColumnSpec,
        subgroup_token: &str,
        code: i64,
    ) -> Result<GroupSubset> {
        for required in [&columns.group_code, &columns.unit_no] {
            if !self.columns.iter().any(|c| c == required) {
                return Err(Error::Dataset(format!(
                    "required column {required:?} not present (have: {:?})",
                    self.columns
                )));
            }
        }
        let subgroup_columns =
            resolve_subgroup_columns(self.columns.iter().map(String::as_str), subgroup_token);
        let mut units = Vec::new();
        for (index, record) in self.records.iter().enumerate() {
            let Some(record_code) = record
                .properties
                .get(&columns.group_code)
                .and_then(normalize_code)
            else {
                continue;
            };
            if record_code != code {
                continue;
            }
            let unit_no = record
                .properties
                .get(&columns.unit_no)
                .and_then(normalize_code)
                .ok_or_else(|| {
                    Error::Dataset(format!(
                        "feature {index}: column {:?} does not hold a unit number",
                        columns.unit_no
                    ))
                })?;
            if unit_no <= 0 {
                return Err(Error::Dataset(format!(
                    "feature {index}: unit number {unit_no} is not positive"
                )));
            }
            let name = record
                .properties
                .get(&columns.unit_name)
                .and_then(text_value)
                .unwrap_or_default();
            let subgroup_code = subgroup_columns
                .code
                .as_deref()
                .and_then(|c| record.properties.get(c))
                .and_then(normalize_code);
            let subgroup_name = subgroup_columns
                .name
                .as_deref()
                .and_then(|c| record.properties.get(c))
                .and_then(text_value);
            units.push(UnitRecord {
                unit_no,
                name,
                subgroup_code,
                subgroup_name,
                geometry: record.geometry.clone(),
            });
        }
        if units.is_empty() {
            return Err(Error::MissingGroup(code));
        }
        units.sort_by_key(|u| u.unit_no);
        Ok(GroupSubset {
            code,
            units,
            subgroup_columns,
        })
    }
}

impl GroupSubset {
    /// Unit numbers must be exactly 1..=N for the output invariants (ids and
    /// id-1 adjacency indexing) to be satisfiable. Duplicates and gaps both
    /// trip here because the units are already sorted.
    pub fn check_unit_numbering(&self) -> Result<()> {
        for (position, unit) in self.units.iter().enumerate() {
            let expected_no = position as i64 + 1;
            if unit.unit_no != expected_no {
                return Err(Error::UnitNumbering {
                    group: self.code,
                    expected: self.units.len(),
                    found: unit.unit_no,
                    position,
                });
            }
        }
        Ok(())
    }
}

/// Canonical integer form of a group/unit code: `"007"`, `"7"`, `7` and `7.0`
/// all normalize to `7`.
pub(crate) fn normalize_code(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            let stripped = trimmed.trim_start_matches('0');
            if stripped.is_empty() {
                Some(0)
            } else {
                stripped.parse().ok()
            }
        }
        _ => None,
    }
}

fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests;

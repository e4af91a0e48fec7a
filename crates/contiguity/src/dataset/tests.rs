use super::schema::resolve_subgroup_columns;
use super::*;
use serde_json::json;

fn square(x0: f64, y0: f64, size: f64) -> Value {
    json!({
        "type": "Polygon",
        "coordinates": [[
            [x0, y0],
            [x0 + size, y0],
            [x0 + size, y0 + size],
            [x0, y0 + size],
            [x0, y0],
        ]]
    })
}

fn feature(props: Value, geometry: Value) -> Value {
    json!({ "type": "Feature", "properties": props, "geometry": geometry })
}

fn collection(features: Vec<Value>) -> String {
    json!({ "type": "FeatureCollection", "features": features }).to_string()
}

fn two_state_dataset() -> Dataset {
    let raw = collection(vec![
        feature(
            json!({"ST_CODE": "007", "ST_NAME": "DELHI", "AC_NO": 2, "AC_NAME": "B"}),
            square(1.0, 0.0, 1.0),
        ),
        feature(
            json!({"ST_CODE": 7, "ST_NAME": "DELHI", "AC_NO": 1, "AC_NAME": "A"}),
            square(0.0, 0.0, 1.0),
        ),
        feature(
            json!({"ST_CODE": "30", "ST_NAME": "GOA", "AC_NO": 1, "AC_NAME": "C"}),
            square(5.0, 0.0, 1.0),
        ),
    ]);
    Dataset::from_geojson_str(&raw).unwrap()
}

#[test]
fn loads_records_and_columns() {
    let dataset = two_state_dataset();
    assert_eq!(dataset.len(), 3);
    // sorted for deterministic heuristics
    let columns: Vec<&str> = dataset.columns().iter().map(String::as_str).collect();
    assert_eq!(columns, vec!["AC_NAME", "AC_NO", "ST_CODE", "ST_NAME"]);
}

#[test]
fn zero_padded_and_numeric_codes_select_the_same_group() {
    let dataset = two_state_dataset();
    let subset = dataset
        .select_group(&ColumnSpec::default(), "DIST", 7)
        .unwrap();
    assert_eq!(subset.units.len(), 2);
}

#[test]
fn units_sorted_by_declared_number_not_file_order() {
    let dataset = two_state_dataset();
    let subset = dataset
        .select_group(&ColumnSpec::default(), "DIST", 7)
        .unwrap();
    let numbers: Vec<i64> = subset.units.iter().map(|u| u.unit_no).collect();
    assert_eq!(numbers, vec![1, 2]);
    assert_eq!(subset.units[0].name, "A");
}

#[test]
fn missing_group_is_a_typed_skip_condition() {
    let dataset = two_state_dataset();
    match dataset.select_group(&ColumnSpec::default(), "DIST", 99) {
        Err(Error::MissingGroup(99)) => {}
        other => panic!("expected MissingGroup(99), got {other:?}"),
    }
}

#[test]
fn missing_required_column_is_a_dataset_error() {
    let dataset = two_state_dataset();
    let columns = ColumnSpec {
        group_code: "NO_SUCH".to_string(),
        ..ColumnSpec::default()
    };
    assert!(matches!(
        dataset.select_group(&columns, "DIST", 7),
        Err(Error::Dataset(_))
    ));
}

#[test]
fn subgroup_columns_feed_unit_records() {
    let raw = collection(vec![feature(
        json!({
            "ST_CODE": 7, "ST_NAME": "DELHI", "AC_NO": 1, "AC_NAME": "A",
            "DIST_CODE": "03", "DIST_NAME": "Central"
        }),
        square(0.0, 0.0, 1.0),
    )]);
    let dataset = Dataset::from_geojson_str(&raw).unwrap();
    let subset = dataset
        .select_group(&ColumnSpec::default(), "DIST", 7)
        .unwrap();
    assert_eq!(subset.units[0].subgroup_code, Some(3));
    assert_eq!(subset.units[0].subgroup_name.as_deref(), Some("Central"));
    assert_eq!(subset.subgroup_columns.code.as_deref(), Some("DIST_CODE"));
}

#[test]
fn absent_subgroup_columns_degrade_to_none() {
    let dataset = two_state_dataset();
    let subset = dataset
        .select_group(&ColumnSpec::default(), "DIST", 30)
        .unwrap();
    assert_eq!(subset.subgroup_columns, SubgroupColumns::default());
    assert_eq!(subset.units[0].subgroup_code, None);
    assert_eq!(subset.units[0].subgroup_name, None);
}

#[test]
fn unit_numbering_gap_is_detected() {
    let raw = collection(vec![
        feature(
            json!({"ST_CODE": 7, "ST_NAME": "DELHI", "AC_NO": 1, "AC_NAME": "A"}),
            square(0.0, 0.0, 1.0),
        ),
        feature(
            json!({"ST_CODE": 7, "ST_NAME": "DELHI", "AC_NO": 3, "AC_NAME": "C"}),
            square(2.0, 0.0, 1.0),
        ),
    ]);
    let dataset = Dataset::from_geojson_str(&raw).unwrap();
    let subset = dataset
        .select_group(&ColumnSpec::default(), "DIST", 7)
        .unwrap();
    match subset.check_unit_numbering() {
        Err(Error::UnitNumbering {
            group: 7,
            expected: 2,
            found: 3,
            position: 1,
        }) => {}
        other => panic!("expected UnitNumbering, got {other:?}"),
    }
}

#[test]
fn group_universe_sorted_by_code() {
    let dataset = two_state_dataset();
    let universe = dataset.group_universe(&ColumnSpec::default());
    assert_eq!(
        universe,
        vec![
            GroupInfo {
                code: 7,
                name: "DELHI".to_string()
            },
            GroupInfo {
                code: 30,
                name: "GOA".to_string()
            },
        ]
    );
}

#[test]
fn non_areal_geometry_rejected() {
    let raw = collection(vec![feature(
        json!({"ST_CODE": 7}),
        json!({"type": "Point", "coordinates": [0.0, 0.0]}),
    )]);
    assert!(matches!(
        Dataset::from_geojson_str(&raw),
        Err(Error::Dataset(_))
    ));
}

#[test]
fn normalize_code_canonical_forms() {
    assert_eq!(normalize_code(&json!(7)), Some(7));
    assert_eq!(normalize_code(&json!("007")), Some(7));
    assert_eq!(normalize_code(&json!("0")), Some(0));
    assert_eq!(normalize_code(&json!(7.0)), Some(7));
    assert_eq!(normalize_code(&json!(7.5)), None);
    assert_eq!(normalize_code(&json!("")), None);
    assert_eq!(normalize_code(&json!(null)), None);
}

// --- schema heuristics ---

#[test]
fn schema_prefers_code_over_number_fallback() {
    let resolved = resolve_subgroup_columns(["DIST_NO", "DIST_CODE", "DIST_NAME"], "DIST");
    assert_eq!(resolved.code.as_deref(), Some("DIST_CODE"));
    assert_eq!(resolved.name.as_deref(), Some("DIST_NAME"));
}

#[test]
fn schema_number_fallback_applies() {
    let resolved = resolve_subgroup_columns(["DIST_NO", "DIST_NAME"], "DIST");
    assert_eq!(resolved.code.as_deref(), Some("DIST_NO"));
}

#[test]
fn schema_matches_case_insensitively() {
    let resolved = resolve_subgroup_columns(["district_code", "district_name"], "dist");
    assert_eq!(resolved.code.as_deref(), Some("district_code"));
    assert_eq!(resolved.name.as_deref(), Some("district_name"));
}

#[test]
fn schema_degrades_to_none_without_token() {
    let resolved = resolve_subgroup_columns(["ST_CODE", "AC_NO", "AC_NAME"], "DIST");
    assert_eq!(resolved, SubgroupColumns::default());
}

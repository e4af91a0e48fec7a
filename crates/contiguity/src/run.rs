//! Batch orchestration: one graph artifact per configured group.
//!
//! The group list is injected explicitly and the dataset is loaded once by
//! the caller; no hidden module state. Per-group failures are reported in
//! place and never abort the remaining groups; per-unit failures are already
//! contained by the adjacency builder.

use std::path::PathBuf;

use crate::adjacency::{build_adjacency, BuildCfg};
use crate::dataset::{ColumnSpec, Dataset};
use crate::error::Result;
use crate::graph::{Graph, Node};

/// One requested group: artifact label and group code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupSpec {
    pub label: String,
    pub code: i64,
}

/// Batch configuration.
#[derive(Clone, Debug)]
pub struct RunCfg {
    pub columns: ColumnSpec,
    /// Token for the sub-group column heuristics.
    pub subgroup_token: String,
    pub build: BuildCfg,
    pub out_dir: PathBuf,
}

impl Default for RunCfg {
    fn default() -> Self {
        Self {
            columns: ColumnSpec::default(),
            subgroup_token: "DIST".to_string(),
            build: BuildCfg::default(),
            out_dir: PathBuf::from("data"),
        }
    }
}

/// Result of one group's successful run.
#[derive(Clone, Debug)]
pub struct GroupSummary {
    pub label: String,
    pub code: i64,
    pub node_count: usize,
    pub isolated: Vec<i64>,
    pub excluded: Vec<(i64, String)>,
    pub artifact: PathBuf,
}

/// Process every requested group against the shared dataset.
pub fn process_groups(
    dataset: &Dataset,
    groups: &[GroupSpec],
    cfg: &RunCfg,
) -> Vec<(GroupSpec, Result<GroupSummary>)> {
    groups
        .iter()
        .map(|spec| {
            let outcome = process_group(dataset, spec, cfg);
            if let Err(error) = &outcome {
                tracing::warn!(group = %spec.label, code = spec.code, %error, "group skipped");
            }
            (spec.clone(), outcome)
        })
        .collect()
}

fn process_group(dataset: &Dataset, spec: &GroupSpec, cfg: &RunCfg) -> Result<GroupSummary> {
    tracing::info!(group = %spec.label, code = spec.code, "processing group");
    let subset = dataset.select_group(&cfg.columns, &cfg.subgroup_token, spec.code)?;
    subset.check_unit_numbering()?;

    let (adjacency, report) = build_adjacency(&subset.units, &cfg.build);
    for (unit_no, reason) in &report.excluded {
        tracing::warn!(group = %spec.label, unit = unit_no, %reason, "unit excluded from adjacency");
    }
    if !report.isolated.is_empty() {
        tracing::warn!(group = %spec.label, units = ?report.isolated, "units with no neighbors");
    }

    let nodes: Vec<Node> = subset.units.iter().map(Node::from_unit).collect();
    let graph = Graph::new(nodes, adjacency)?;
    let artifact = cfg.out_dir.join(format!("{}_graph.json", spec.label));
    graph.write_json(&artifact)?;
    tracing::info!(
        group = %spec.label,
        nodes = graph.nodes.len(),
        artifact = %artifact.display(),
        "artifact written"
    );

    Ok(GroupSummary {
        label: spec.label.clone(),
        code: spec.code,
        node_count: graph.nodes.len(),
        isolated: report.isolated,
        excluded: report
            .excluded
            .into_iter()
            .map(|(unit_no, exclusion)| (unit_no, exclusion.to_string()))
            .collect(),
        artifact,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjacency::CoordSystem;
    use crate::error::Error;
    use crate::graph::Graph;
    use serde_json::{json, Value};

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

    fn l_shape_dataset() -> Dataset {
        // Group 7: three 10x10 squares in an L. Group 30: one far square.
        let features = vec![
            feature(
                json!({"ST_CODE": 7, "ST_NAME": "DELHI", "AC_NO": 1, "AC_NAME": "A",
                       "DIST_CODE": 1, "DIST_NAME": "West"}),
                square(0.0, 0.0, 10.0),
            ),
            feature(
                json!({"ST_CODE": 7, "ST_NAME": "DELHI", "AC_NO": 2, "AC_NAME": "B",
                       "DIST_CODE": 1, "DIST_NAME": "West"}),
                square(10.0, 0.0, 10.0),
            ),
            feature(
                json!({"ST_CODE": 7, "ST_NAME": "DELHI", "AC_NO": 3, "AC_NAME": "C",
                       "DIST_CODE": 2, "DIST_NAME": "North"}),
                square(10.0, 10.0, 10.0),
            ),
            feature(
                json!({"ST_CODE": 30, "ST_NAME": "GOA", "AC_NO": 1, "AC_NAME": "D"}),
                square(500.0, 500.0, 10.0),
            ),
        ];
        let raw = json!({ "type": "FeatureCollection", "features": features }).to_string();
        Dataset::from_geojson_str(&raw).unwrap()
    }

    fn planar_cfg(out_dir: PathBuf) -> RunCfg {
        RunCfg {
            build: BuildCfg {
                coord_system: CoordSystem::Planar,
                ..BuildCfg::default()
            },
            out_dir,
            ..RunCfg::default()
        }
    }

    #[test]
    fn batch_continues_past_missing_groups() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = l_shape_dataset();
        let groups = vec![
            GroupSpec {
                label: "delhi".to_string(),
                code: 7,
            },
            GroupSpec {
                label: "ghost".to_string(),
                code: 99,
            },
            GroupSpec {
                label: "goa".to_string(),
                code: 30,
            },
        ];
        let outcomes = process_groups(&dataset, &groups, &planar_cfg(dir.path().to_path_buf()));
        assert_eq!(outcomes.len(), 3);

        let delhi = outcomes[0].1.as_ref().unwrap();
        assert_eq!(delhi.node_count, 3);
        assert!(delhi.isolated.is_empty());

        assert!(matches!(outcomes[1].1, Err(Error::MissingGroup(99))));

        // Goa's lone unit is isolated; the run still succeeds with a warning
        // recorded in the summary.
        let goa = outcomes[2].1.as_ref().unwrap();
        assert_eq!(goa.node_count, 1);
        assert_eq!(goa.isolated, vec![1]);
        assert!(goa.artifact.exists());
    }

    #[test]
    fn artifact_matches_expected_graph() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = l_shape_dataset();
        let groups = vec![GroupSpec {
            label: "delhi".to_string(),
            code: 7,
        }];
        let outcomes = process_groups(&dataset, &groups, &planar_cfg(dir.path().to_path_buf()));
        let summary = outcomes[0].1.as_ref().unwrap();
        assert_eq!(summary.artifact, dir.path().join("delhi_graph.json"));

        let parsed: Graph =
            serde_json::from_str(&std::fs::read_to_string(&summary.artifact).unwrap()).unwrap();
        assert_eq!(parsed.nodes.len(), parsed.adjacency.len());
        assert_eq!(parsed.nodes[0].sub_group_id, Some(1));
        assert_eq!(parsed.nodes[0].sub_group_name.as_deref(), Some("West"));
        assert_eq!(parsed.nodes[2].sub_group_name.as_deref(), Some("North"));

        assert_eq!(parsed.neighbors(1).len(), 1);
        assert_eq!(parsed.neighbors(2).len(), 2);
        assert_eq!(parsed.neighbors(3).len(), 1);
        assert!((parsed.neighbors(1)[0].shared_perim - 0.25).abs() < 1e-12);
    }

    #[test]
    fn reruns_are_value_identical() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = l_shape_dataset();
        let groups = vec![GroupSpec {
            label: "delhi".to_string(),
            code: 7,
        }];
        let cfg = planar_cfg(dir.path().to_path_buf());

        process_groups(&dataset, &groups, &cfg);
        let first = std::fs::read_to_string(dir.path().join("delhi_graph.json")).unwrap();
        process_groups(&dataset, &groups, &cfg);
        let second = std::fs::read_to_string(dir.path().join("delhi_graph.json")).unwrap();
        let first: Graph = serde_json::from_str(&first).unwrap();
        let second: Graph = serde_json::from_str(&second).unwrap();
        assert_eq!(first.nodes, second.nodes);
        assert_eq!(first.adjacency.len(), second.adjacency.len());
        for (a, b) in first.adjacency.iter().zip(&second.adjacency) {
            assert_eq!(a.len(), b.len());
            for (x, y) in a.iter().zip(b) {
                assert_eq!(x.id, y.id);
                assert!((x.shared_perim - y.shared_perim).abs() <= 1e-9 * x.shared_perim.abs());
            }
        }
    }

    #[test]
    fn bad_unit_numbering_skips_the_group() {
        let features = vec![
            feature(
                json!({"ST_CODE": 7, "ST_NAME": "DELHI", "AC_NO": 1, "AC_NAME": "A"}),
                square(0.0, 0.0, 10.0),
            ),
            feature(
                json!({"ST_CODE": 7, "ST_NAME": "DELHI", "AC_NO": 5, "AC_NAME": "E"}),
                square(10.0, 0.0, 10.0),
            ),
        ];
        let raw = json!({ "type": "FeatureCollection", "features": features }).to_string();
        let dataset = Dataset::from_geojson_str(&raw).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let groups = vec![GroupSpec {
            label: "delhi".to_string(),
            code: 7,
        }];
        let outcomes = process_groups(&dataset, &groups, &planar_cfg(dir.path().to_path_buf()));
        assert!(matches!(
            outcomes[0].1,
            Err(Error::UnitNumbering { found: 5, .. })
        ));
        // Nothing was written for the failed group.
        assert!(!dir.path().join("delhi_graph.json").exists());
    }
}

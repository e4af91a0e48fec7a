use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::fmt::SubscriberBuilder;

use contiguity::adjacency::{BuildCfg, CoordSystem};
use contiguity::dataset::{ColumnSpec, Dataset};
use contiguity::run::{process_groups, GroupSpec, RunCfg};

#[derive(Parser)]
#[command(name = "contiguity")]
#[command(about = "Shared-border adjacency graphs from polygon datasets")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Build one <label>_graph.json artifact per requested group
    Build {
        /// GeoJSON dataset with per-polygon attributes
        #[arg(long)]
        input: PathBuf,
        /// Group to process, as label=code; repeatable
        #[arg(long = "group", value_parser = parse_group, required = true)]
        groups: Vec<GroupSpec>,
        /// Output directory for the artifacts
        #[arg(long, default_value = "data")]
        out_dir: PathBuf,
        /// Token for the sub-group column heuristics
        #[arg(long, default_value = "DIST")]
        subgroup_token: String,
        /// Treat input coordinates as already planar (meters); skip reprojection
        #[arg(long)]
        planar: bool,
        /// Column holding the group code
        #[arg(long, default_value = "ST_CODE")]
        group_code_column: String,
        /// Column holding the group name
        #[arg(long, default_value = "ST_NAME")]
        group_name_column: String,
        /// Column holding the unit number
        #[arg(long, default_value = "AC_NO")]
        unit_no_column: String,
        /// Column holding the unit name
        #[arg(long, default_value = "AC_NAME")]
        unit_name_column: String,
    },
    /// List the group codes and names present in the dataset
    Groups {
        #[arg(long)]
        input: PathBuf,
        /// Emit the listing as JSON instead of aligned text
        #[arg(long)]
        json: bool,
        /// Column holding the group code
        #[arg(long, default_value = "ST_CODE")]
        group_code_column: String,
        /// Column holding the group name
        #[arg(long, default_value = "ST_NAME")]
        group_name_column: String,
    },
}

fn parse_group(raw: &str) -> Result<GroupSpec, String> {
    let (label, code) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected label=code, got {raw:?}"))?;
    let label = label.trim();
    if label.is_empty() {
        return Err(format!("empty label in {raw:?}"));
    }
    let code = code
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("bad code in {raw:?}: {e}"))?;
    Ok(GroupSpec {
        label: label.to_string(),
        code,
    })
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Build {
            input,
            groups,
            out_dir,
            subgroup_token,
            planar,
            group_code_column,
            group_name_column,
            unit_no_column,
            unit_name_column,
        } => {
            let columns = ColumnSpec {
                group_code: group_code_column,
                group_name: group_name_column,
                unit_no: unit_no_column,
                unit_name: unit_name_column,
            };
            build(input, groups, out_dir, subgroup_token, planar, columns)
        }
        Action::Groups {
            input,
            json,
            group_code_column,
            group_name_column,
        } => {
            let columns = ColumnSpec {
                group_code: group_code_column,
                group_name: group_name_column,
                ..ColumnSpec::default()
            };
            list_groups(input, json, columns)
        }
    }
}

fn build(
    input: PathBuf,
    groups: Vec<GroupSpec>,
    out_dir: PathBuf,
    subgroup_token: String,
    planar: bool,
    columns: ColumnSpec,
) -> Result<()> {
    let dataset = Dataset::from_geojson_path(&input)
        .with_context(|| format!("loading {}", input.display()))?;
    tracing::info!(records = dataset.len(), "dataset loaded");

    let cfg = RunCfg {
        columns,
        subgroup_token,
        build: BuildCfg {
            coord_system: if planar {
                CoordSystem::Planar
            } else {
                CoordSystem::Geographic
            },
            ..BuildCfg::default()
        },
        out_dir,
    };
    let outcomes = process_groups(&dataset, &groups, &cfg);

    let mut failed = 0usize;
    for (spec, outcome) in &outcomes {
        match outcome {
            Ok(summary) => tracing::info!(
                group = %spec.label,
                nodes = summary.node_count,
                isolated = summary.isolated.len(),
                excluded = summary.excluded.len(),
                "done"
            ),
            Err(error) => {
                failed += 1;
                tracing::warn!(group = %spec.label, %error, "failed");
            }
        }
    }
    if failed == outcomes.len() {
        anyhow::bail!("all {failed} group(s) failed");
    }
    Ok(())
}

fn list_groups(input: PathBuf, as_json: bool, columns: ColumnSpec) -> Result<()> {
    let dataset = Dataset::from_geojson_path(&input)
        .with_context(|| format!("loading {}", input.display()))?;
    let universe = dataset.group_universe(&columns);
    if as_json {
        let entries: Vec<serde_json::Value> = universe
            .iter()
            .map(|info| serde_json::json!({ "code": info.code, "name": info.name }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for info in &universe {
            println!("{:>4}  {}", info.code, info.name);
        }
    }
    Ok(())
}

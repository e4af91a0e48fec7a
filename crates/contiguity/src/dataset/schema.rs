//! Duck-typed resolution of optional sub-group attribute columns.
//!
//! Dataset schemas vary across sources: the sub-group code/name columns are
//! found by ordered, case-insensitive substring heuristics against whatever
//! column names are present, and degrade to `None` when nothing matches.
//! Schema variability must never abort a run.

/// Resolved sub-group column names (either may be absent).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubgroupColumns {
    pub code: Option<String>,
    pub name: Option<String>,
}

/// First column whose upper-cased name contains every needle.
fn find_col<'a>(columns: &[&'a str], needles: &[&str]) -> Option<&'a str> {
    columns.iter().copied().find(|column| {
        let upper = column.to_uppercase();
        needles.iter().all(|needle| upper.contains(needle))
    })
}

/// Resolve sub-group code and name columns for the given token (e.g. `DIST`
/// when sub-groups are districts).
///
/// Heuristic order: code = token+`COD`, then token+`NO`, then token+`NUM`;
/// name = token+`NAME`.
pub fn resolve_subgroup_columns<'a>(
    columns: impl IntoIterator<Item = &'a str>,
    token: &str,
) -> SubgroupColumns {
    let columns: Vec<&str> = columns.into_iter().collect();
    let token = token.to_uppercase();
    let code = find_col(&columns, &[&token, "COD"])
        .or_else(|| find_col(&columns, &[&token, "NO"]))
        .or_else(|| find_col(&columns, &[&token, "NUM"]));
    let name = find_col(&columns, &[&token, "NAME"]);
    SubgroupColumns {
        code: code.map(str::to_string),
        name: name.map(str::to_string),
    }
}

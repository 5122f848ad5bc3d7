//! Relocating the UI off records a replay just deleted.

use crate::schema::Schema;

use super::op::Op;

/// If `current_path` shows the detail view of a primary-entity record that
/// `ops` deleted, return the list route to navigate to instead.
///
/// `/dances/7`, `/dances/7/` and `/dances/7/edit?tab=notes` all address
/// dance 7.
pub fn redirect_after(ops: &[Op], current_path: &str, schema: &Schema) -> Option<String> {
    let path = normalize(current_path);
    ops.iter().find_map(|op| {
        let Op::Delete { table, id, .. } = op else {
            return None;
        };
        let route = schema.list_route(table)?;
        let detail = format!("{route}/{id}");
        let addressed = path == detail
            || path
                .strip_prefix(detail.as_str())
                .is_some_and(|rest| rest.starts_with('/'));
        addressed.then(|| route.to_string())
    })
}

fn normalize(path: &str) -> &str {
    let end = path.find(|c| c == '?' || c == '#').unwrap_or(path.len());
    let path = &path[..end];
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

use std::collections::HashMap;

use st_core::{owning_scope_path, ScopeOrder, SignatureTable, TableRow};
use tracing::warn;

pub fn group_table(table: &SignatureTable, order: &ScopeOrder) -> Vec<TableRow> {
    let mut by_scope: HashMap<&str, Vec<TableRow>> = HashMap::new();
    for (signature, qualified) in table {
        let owner = owning_scope_path(qualified);
        if !order.contains(owner) {
            warn!(name = %qualified, scope = owner, "row owned by unknown scope dropped");
            continue;
        }
        by_scope.entry(owner).or_default().push(TableRow {
            signature: signature.clone(),
            qualified_name: qualified.clone(),
        });
    }

    let mut rows = Vec::with_capacity(table.len());
    for scope in order.scopes() {
        let Some(mut group) = by_scope.remove(scope.path.as_str()) else {
            continue;
        };
        group.sort_by(|left, right| left.qualified_name.cmp(&right.qualified_name));
        rows.extend(group);
    }
    rows
}

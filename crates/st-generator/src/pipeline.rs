use st_core::{DeclarationSource, GroupedTables, ScopeConfig, SigTableError};
use tracing::info;

use crate::group::group_table;
use crate::resolve::PriorityResolver;

pub fn generate_tables(
    source: &mut dyn DeclarationSource,
    scopes: Vec<ScopeConfig>,
) -> Result<GroupedTables, SigTableError> {
    let resolver = PriorityResolver::new(scopes);
    let resolved = resolver.resolve(source)?;
    let order = resolver.scope_order();

    let grouped = GroupedTables {
        scopes: order.paths(),
        interfaces: group_table(&resolved.interfaces, order),
        functions: group_table(&resolved.functions, order),
    };
    info!(
        scopes = grouped.scopes.len(),
        interfaces = grouped.interfaces.len(),
        functions = grouped.functions.len(),
        "generated signature tables"
    );
    Ok(grouped)
}

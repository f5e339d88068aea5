use st_core::{
    is_exported, DeclShape, DeclarationSource, InterfaceType, LocalTables, ScopeConfig,
    ScopeDeclarations, SigTableError,
};
use tracing::debug;

use crate::canonical::{interface_signature, signature_string};

pub fn extract_scope(
    source: &mut dyn DeclarationSource,
    scope: &ScopeConfig,
) -> Result<LocalTables, SigTableError> {
    if scope.is_universe() {
        let universe = source.universe()?;
        return Ok(extract_declarations(&universe, true));
    }
    let declarations = source.load(&scope.path)?;
    Ok(extract_declarations(&declarations, false))
}

// Within one scope the first name in name order keeps a shape.
pub fn extract_declarations(scope: &ScopeDeclarations, include_all: bool) -> LocalTables {
    let mut declarations = scope.declarations.iter().collect::<Vec<_>>();
    declarations.sort_by(|left, right| left.name.cmp(&right.name));

    let mut tables = LocalTables::default();
    for declaration in declarations {
        if !include_all && !declaration.exported {
            continue;
        }
        let (table, signature) = match &declaration.shape {
            DeclShape::Interface(iface) if is_interface_shaped(iface) => {
                (&mut tables.interfaces, interface_signature(iface))
            }
            DeclShape::Func(signature) => (&mut tables.functions, signature_string(signature)),
            _ => continue,
        };
        table
            .entry(signature)
            .or_insert_with(|| declaration.name.clone());
    }

    debug!(
        scope = %scope.path,
        interfaces = tables.interfaces.len(),
        functions = tables.functions.len(),
        "extracted scope"
    );
    tables
}

fn is_interface_shaped(iface: &InterfaceType) -> bool {
    !iface.methods.is_empty()
        && !iface.is_constraint()
        && iface.methods.iter().all(|method| is_exported(&method.name))
}

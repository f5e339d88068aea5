use st_core::{
    qualified_name, DeclarationSource, ResolvedTables, ScopeConfig, ScopeOrder, SigTableError,
    SignatureTable,
};
use tracing::{debug, info_span, trace};

use crate::extract::extract_scope;

#[derive(Debug, Clone)]
pub struct PriorityResolver {
    order: ScopeOrder,
}

impl PriorityResolver {
    pub fn new(scopes: Vec<ScopeConfig>) -> Self {
        Self {
            order: ScopeOrder::new(scopes),
        }
    }

    pub fn scope_order(&self) -> &ScopeOrder {
        &self.order
    }

    pub fn resolve(
        &self,
        source: &mut dyn DeclarationSource,
    ) -> Result<ResolvedTables, SigTableError> {
        let mut tables = ResolvedTables::default();
        for scope in self.order.scopes() {
            if scope.is_private() {
                debug!(scope = %scope.path, "skipping private scope");
                continue;
            }
            let _span = info_span!("scope", path = %scope.path).entered();
            let local = extract_scope(source, scope)?;
            merge_first_wins(&mut tables.interfaces, local.interfaces, &scope.path);
            merge_first_wins(&mut tables.functions, local.functions, &scope.path);
        }
        debug!(
            interfaces = tables.interfaces.len(),
            functions = tables.functions.len(),
            "resolved signature tables"
        );
        Ok(tables)
    }
}

fn merge_first_wins(global: &mut SignatureTable, local: SignatureTable, path: &str) {
    for (signature, name) in local {
        let qualified = qualified_name(path, &name);
        match global.get(&signature) {
            Some(owner) => {
                trace!(signature = %signature, owner = %owner, dropped = %qualified, "shape already owned");
            }
            None => {
                global.insert(signature, qualified);
            }
        }
    }
}

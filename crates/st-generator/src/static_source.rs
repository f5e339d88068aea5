use std::collections::BTreeMap;

use st_core::{
    DeclShape, Declaration, DeclarationSource, GoType, InterfaceType, Method, ScopeDeclarations,
    SigTableError, Signature, UNIVERSE_PATH,
};

#[derive(Debug, Clone)]
pub struct StaticSource {
    universe: Vec<Declaration>,
    scopes: BTreeMap<String, Vec<Declaration>>,
    loaded: Vec<String>,
}

impl Default for StaticSource {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticSource {
    pub fn new() -> Self {
        let error = InterfaceType {
            methods: vec![Method::new(
                "Error",
                Signature::new(Vec::new(), vec![GoType::basic("string")]),
            )],
            terms: Vec::new(),
        };
        Self {
            universe: vec![
                Declaration::new("any", DeclShape::Interface(InterfaceType::default())),
                Declaration::new("error", DeclShape::Interface(error)),
            ],
            scopes: BTreeMap::new(),
            loaded: Vec::new(),
        }
    }

    pub fn scope(mut self, path: impl Into<String>) -> Self {
        self.scopes.entry(path.into()).or_default();
        self
    }

    pub fn declare(
        mut self,
        path: impl Into<String>,
        name: impl Into<String>,
        shape: DeclShape,
    ) -> Self {
        self.scopes
            .entry(path.into())
            .or_default()
            .push(Declaration::new(name, shape));
        self
    }

    pub fn loaded(&self) -> &[String] {
        &self.loaded
    }
}

impl DeclarationSource for StaticSource {
    fn universe(&mut self) -> Result<ScopeDeclarations, SigTableError> {
        Ok(ScopeDeclarations {
            path: UNIVERSE_PATH.to_string(),
            declarations: self.universe.clone(),
        })
    }

    fn load(&mut self, path: &str) -> Result<ScopeDeclarations, SigTableError> {
        self.loaded.push(path.to_string());
        let declarations = self.scopes.get(path).ok_or_else(|| {
            SigTableError::new("SCOPE_NOT_FOUND", format!("Unknown scope \"{}\".", path))
        })?;
        Ok(ScopeDeclarations {
            path: path.to_string(),
            declarations: declarations.clone(),
        })
    }
}

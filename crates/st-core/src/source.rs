use crate::error::SigTableError;
use crate::types::ScopeDeclarations;

pub trait DeclarationSource {
    fn universe(&mut self) -> Result<ScopeDeclarations, SigTableError>;

    fn load(&mut self, path: &str) -> Result<ScopeDeclarations, SigTableError>;
}

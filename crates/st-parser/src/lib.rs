mod ast;
mod constraint;
mod decl;
mod lexer;

pub use ast::*;
pub use constraint::{find_build_constraint, parse_build_constraint, BuildConstraint};
pub use decl::parse_go_file;
pub use lexer::{Keyword, Lexer, Symbol, Token, TokenKind};

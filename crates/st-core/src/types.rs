use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: SourceLocation,
    pub end: SourceLocation,
}

impl SourceSpan {
    pub fn point(line: usize, column: usize) -> Self {
        Self {
            start: SourceLocation { line, column },
            end: SourceLocation { line, column },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoType {
    Basic(String),
    Named {
        path: String,
        name: String,
        args: Vec<GoType>,
    },
    Pointer(Box<GoType>),
    Slice(Box<GoType>),
    Array {
        len: String,
        elem: Box<GoType>,
    },
    Map {
        key: Box<GoType>,
        value: Box<GoType>,
    },
    Chan {
        dir: ChanDir,
        elem: Box<GoType>,
    },
    Func(Signature),
    Interface(InterfaceType),
    Struct(Vec<StructField>),
    Union(Vec<UnionTerm>),
}

impl GoType {
    pub fn basic(name: impl Into<String>) -> Self {
        Self::Basic(name.into())
    }

    pub fn named(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Named {
            path: path.into(),
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn pointer(elem: GoType) -> Self {
        Self::Pointer(Box::new(elem))
    }

    pub fn slice(elem: GoType) -> Self {
        Self::Slice(Box::new(elem))
    }

    pub fn error() -> Self {
        Self::named("", "error")
    }
}

// A variadic signature keeps the slice type in its last parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    pub params: Vec<GoType>,
    pub results: Vec<GoType>,
    pub variadic: bool,
}

impl Signature {
    pub fn new(params: Vec<GoType>, results: Vec<GoType>) -> Self {
        Self {
            params,
            results,
            variadic: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    pub signature: Signature,
}

impl Method {
    pub fn new(name: impl Into<String>, signature: Signature) -> Self {
        Self {
            name: name.into(),
            signature,
        }
    }
}

// A non-empty `terms` marks a constraint interface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterfaceType {
    pub methods: Vec<Method>,
    pub terms: Vec<GoType>,
}

impl InterfaceType {
    pub fn is_constraint(&self) -> bool {
        !self.terms.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructField {
    pub name: Option<String>,
    pub ty: GoType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionTerm {
    pub tilde: bool,
    pub ty: GoType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclShape {
    Interface(InterfaceType),
    Func(Signature),
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub exported: bool,
    pub shape: DeclShape,
}

impl Declaration {
    pub fn new(name: impl Into<String>, shape: DeclShape) -> Self {
        let name = name.into();
        Self {
            exported: is_exported(&name),
            name,
            shape,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeDeclarations {
    pub path: String,
    pub declarations: Vec<Declaration>,
}

pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

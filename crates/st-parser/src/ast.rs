use st_core::{ChanDir, SourceSpan};

#[derive(Debug, Clone, PartialEq)]
pub struct GoFile {
    pub package: String,
    pub imports: Vec<ImportSpec>,
    pub types: Vec<TypeSpec>,
    pub consts: Vec<ConstSpec>,
}

impl GoFile {
    pub fn imports_path(&self, path: &str) -> bool {
        self.imports.iter().any(|import| import.path == path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    pub alias: Option<String>,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpec {
    pub name: String,
    pub alias: bool,
    pub generic: bool,
    pub ty: TypeExpr,
    pub location: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstSpec {
    pub name: String,
    pub value: Option<ConstValue>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstValue {
    Literal(String),
    Name(String),
    Qualified { package: String, name: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    Name(String),
    Qualified {
        package: String,
        name: String,
    },
    Instance {
        base: Box<TypeExpr>,
        args: Vec<TypeExpr>,
    },
    Pointer(Box<TypeExpr>),
    Slice(Box<TypeExpr>),
    Array {
        len: ArrayLen,
        elem: Box<TypeExpr>,
    },
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
    },
    Chan {
        dir: ChanDir,
        elem: Box<TypeExpr>,
    },
    Func(FuncTypeExpr),
    Interface(Vec<InterfaceElem>),
    Struct(Vec<FieldExpr>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrayLen {
    Literal(String),
    Name(String),
    Qualified { package: String, name: String },
    Expr(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FuncTypeExpr {
    pub params: Vec<ParamExpr>,
    pub results: Vec<ParamExpr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamExpr {
    pub name: Option<String>,
    pub ty: TypeExpr,
    pub variadic: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InterfaceElem {
    Method { name: String, func: FuncTypeExpr },
    Embed(TypeExpr),
    Union(Vec<UnionTermExpr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnionTermExpr {
    pub tilde: bool,
    pub ty: TypeExpr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldExpr {
    pub name: Option<String>,
    pub ty: TypeExpr,
}

use st_core::{
    DeclShape, Declaration, GoType, InterfaceType, Method, ScopeDeclarations, Signature,
    UNIVERSE_PATH,
};

const BASIC_TYPES: &[&str] = &[
    "bool",
    "byte",
    "complex64",
    "complex128",
    "float32",
    "float64",
    "int",
    "int8",
    "int16",
    "int32",
    "int64",
    "rune",
    "string",
    "uint",
    "uint8",
    "uint16",
    "uint32",
    "uint64",
    "uintptr",
];

pub(crate) fn lookup(name: &str) -> Option<GoType> {
    if BASIC_TYPES.contains(&name) {
        return Some(GoType::basic(name));
    }
    match name {
        "any" | "comparable" | "error" => Some(GoType::named(UNIVERSE_PATH, name)),
        _ => None,
    }
}

pub(crate) fn underlying(name: &str) -> Option<GoType> {
    match name {
        "any" => Some(GoType::Interface(InterfaceType::default())),
        "error" => Some(GoType::Interface(error_interface())),
        "comparable" => Some(GoType::Interface(InterfaceType {
            methods: Vec::new(),
            terms: vec![GoType::basic("comparable")],
        })),
        _ => lookup(name),
    }
}

pub(crate) fn universe_declarations() -> ScopeDeclarations {
    let mut names = BASIC_TYPES.to_vec();
    names.extend(["any", "comparable", "error"]);
    names.sort_unstable();

    let declarations = names
        .into_iter()
        .map(|name| {
            let shape = match underlying(name) {
                Some(GoType::Interface(iface)) if !iface.is_constraint() => {
                    DeclShape::Interface(iface)
                }
                _ => DeclShape::Other,
            };
            Declaration::new(name, shape)
        })
        .collect();

    ScopeDeclarations {
        path: UNIVERSE_PATH.to_string(),
        declarations,
    }
}

fn error_interface() -> InterfaceType {
    InterfaceType {
        methods: vec![Method::new(
            "Error",
            Signature::new(Vec::new(), vec![GoType::basic("string")]),
        )],
        terms: Vec::new(),
    }
}

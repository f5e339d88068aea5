use std::fmt::Write as _;

use st_core::{ChanDir, GoType, InterfaceType, Signature, UNIVERSE_PATH};

pub fn type_string(ty: &GoType) -> String {
    let mut out = String::new();
    write_type(&mut out, ty);
    out
}

// Top-level parameters print their tuple types: a variadic tail is its slice
// type, so `func(...T)` and `func([]T)` share a signature. Nested func types
// keep `...T` as Go type strings do.
pub fn signature_string(signature: &Signature) -> String {
    format!(
        "({})({})",
        join_types(&signature.params),
        join_types(&signature.results)
    )
}

pub fn interface_signature(iface: &InterfaceType) -> String {
    let mut methods = iface.methods.iter().collect::<Vec<_>>();
    methods.sort_by(|left, right| left.name.cmp(&right.name));
    methods
        .into_iter()
        .map(|method| format!("{}{}", method.name, signature_string(&method.signature)))
        .collect::<Vec<_>>()
        .join("; ")
}

fn join_types(types: &[GoType]) -> String {
    types.iter().map(type_string).collect::<Vec<_>>().join(", ")
}

fn write_type(out: &mut String, ty: &GoType) {
    match ty {
        GoType::Basic(name) => out.push_str(name),
        GoType::Named { path, name, args } => {
            if path != UNIVERSE_PATH {
                out.push_str(path);
                out.push('.');
            }
            out.push_str(name);
            if !args.is_empty() {
                out.push('[');
                write_list(out, args);
                out.push(']');
            }
        }
        GoType::Pointer(elem) => {
            out.push('*');
            write_type(out, elem);
        }
        GoType::Slice(elem) => {
            out.push_str("[]");
            write_type(out, elem);
        }
        GoType::Array { len, elem } => {
            let _ = write!(out, "[{}]", len);
            write_type(out, elem);
        }
        GoType::Map { key, value } => {
            out.push_str("map[");
            write_type(out, key);
            out.push(']');
            write_type(out, value);
        }
        GoType::Chan { dir, elem } => {
            let parenthesize = *dir == ChanDir::Both
                && matches!(elem.as_ref(), GoType::Chan { dir: ChanDir::Recv, .. });
            out.push_str(match dir {
                ChanDir::Both => "chan ",
                ChanDir::Send => "chan<- ",
                ChanDir::Recv => "<-chan ",
            });
            if parenthesize {
                out.push('(');
                write_type(out, elem);
                out.push(')');
            } else {
                write_type(out, elem);
            }
        }
        GoType::Func(signature) => {
            out.push_str("func");
            write_func_tail(out, signature);
        }
        GoType::Interface(iface) => write_interface(out, iface),
        GoType::Struct(fields) => {
            out.push_str("struct{");
            for (index, field) in fields.iter().enumerate() {
                if index > 0 {
                    out.push_str("; ");
                }
                if let Some(name) = &field.name {
                    out.push_str(name);
                    out.push(' ');
                }
                write_type(out, &field.ty);
            }
            out.push('}');
        }
        GoType::Union(terms) => {
            for (index, term) in terms.iter().enumerate() {
                if index > 0 {
                    out.push_str(" | ");
                }
                if term.tilde {
                    out.push('~');
                }
                write_type(out, &term.ty);
            }
        }
    }
}

fn write_list(out: &mut String, types: &[GoType]) {
    for (index, ty) in types.iter().enumerate() {
        if index > 0 {
            out.push_str(", ");
        }
        write_type(out, ty);
    }
}

// Nested function form: `(params) result` or `(params) (r1, r2)`.
fn write_func_tail(out: &mut String, signature: &Signature) {
    out.push('(');
    let last = signature.params.len().saturating_sub(1);
    for (index, param) in signature.params.iter().enumerate() {
        if index > 0 {
            out.push_str(", ");
        }
        match param {
            GoType::Slice(elem) if signature.variadic && index == last => {
                out.push_str("...");
                write_type(out, elem);
            }
            _ => write_type(out, param),
        }
    }
    out.push(')');
    match signature.results.as_slice() {
        [] => {}
        [single] => {
            out.push(' ');
            write_type(out, single);
        }
        results => {
            out.push_str(" (");
            write_list(out, results);
            out.push(')');
        }
    }
}

fn write_interface(out: &mut String, iface: &InterfaceType) {
    if iface.methods.is_empty() && iface.terms.is_empty() {
        out.push_str("interface{}");
        return;
    }
    let mut methods = iface.methods.iter().collect::<Vec<_>>();
    methods.sort_by(|left, right| left.name.cmp(&right.name));

    out.push_str("interface{");
    let mut first = true;
    for method in methods {
        if !first {
            out.push_str("; ");
        }
        first = false;
        out.push_str(&method.name);
        write_func_tail(out, &method.signature);
    }
    for term in &iface.terms {
        if !first {
            out.push_str("; ");
        }
        first = false;
        write_type(out, term);
    }
    out.push('}');
}

#[cfg(test)]
mod canonical_tests {
    use super::*;
    use st_core::{Method, StructField, UnionTerm};

    fn io_method(name: &str) -> Method {
        Method::new(
            name,
            Signature::new(
                vec![GoType::slice(GoType::basic("byte"))],
                vec![GoType::basic("int"), GoType::error()],
            ),
        )
    }

    #[test]
    fn interface_signature_sorts_methods_and_omits_names() {
        let iface = InterfaceType {
            methods: vec![io_method("Write"), io_method("Read")],
            terms: Vec::new(),
        };
        assert_eq!(
            interface_signature(&iface),
            "Read([]byte)(int, error); Write([]byte)(int, error)"
        );
    }

    #[test]
    fn function_signature_keeps_variadic_as_slice() {
        let signature = Signature {
            params: vec![
                GoType::basic("string"),
                GoType::slice(GoType::named("", "any")),
            ],
            results: vec![GoType::basic("int"), GoType::error()],
            variadic: true,
        };
        assert_eq!(signature_string(&signature), "(string, []any)(int, error)");
        let sliced = Signature {
            variadic: false,
            ..signature.clone()
        };
        assert_eq!(signature_string(&sliced), signature_string(&signature));
        assert_eq!(
            type_string(&GoType::Func(signature)),
            "func(string, ...any) (int, error)"
        );
        assert_eq!(signature_string(&Signature::default()), "()()");
    }

    #[test]
    fn nested_types_use_go_type_strings_with_full_paths() {
        let callback = GoType::Func(Signature {
            params: vec![
                GoType::named("io/fs", "FileInfo"),
                GoType::slice(GoType::basic("int")),
            ],
            results: vec![GoType::error()],
            variadic: true,
        });
        assert_eq!(type_string(&callback), "func(io/fs.FileInfo, ...int) error");

        let pair = GoType::Func(Signature::new(
            Vec::new(),
            vec![GoType::basic("int"), GoType::error()],
        ));
        assert_eq!(type_string(&pair), "func() (int, error)");

        assert_eq!(
            type_string(&GoType::pointer(GoType::named("io/fs", "PathError"))),
            "*io/fs.PathError"
        );
        assert_eq!(
            type_string(&GoType::Map {
                key: Box::new(GoType::basic("string")),
                value: Box::new(GoType::slice(GoType::basic("string"))),
            }),
            "map[string][]string"
        );
        assert_eq!(
            type_string(&GoType::Array {
                len: "32".to_string(),
                elem: Box::new(GoType::basic("byte")),
            }),
            "[32]byte"
        );
        assert_eq!(
            type_string(&GoType::Named {
                path: "iter".to_string(),
                name: "Seq".to_string(),
                args: vec![GoType::basic("int"), GoType::basic("string")],
            }),
            "iter.Seq[int, string]"
        );
    }

    #[test]
    fn channel_directions_and_nesting() {
        let recv = GoType::Chan {
            dir: ChanDir::Recv,
            elem: Box::new(GoType::basic("int")),
        };
        assert_eq!(type_string(&recv), "<-chan int");
        assert_eq!(
            type_string(&GoType::Chan {
                dir: ChanDir::Send,
                elem: Box::new(GoType::basic("int")),
            }),
            "chan<- int"
        );
        assert_eq!(
            type_string(&GoType::Chan {
                dir: ChanDir::Both,
                elem: Box::new(recv.clone()),
            }),
            "chan (<-chan int)"
        );
        assert_eq!(
            type_string(&GoType::Chan {
                dir: ChanDir::Send,
                elem: Box::new(recv),
            }),
            "chan<- <-chan int"
        );
    }

    #[test]
    fn literal_interfaces_structs_and_unions() {
        assert_eq!(
            type_string(&GoType::Interface(InterfaceType::default())),
            "interface{}"
        );
        let stringer = InterfaceType {
            methods: vec![Method::new(
                "String",
                Signature::new(Vec::new(), vec![GoType::basic("string")]),
            )],
            terms: Vec::new(),
        };
        assert_eq!(
            type_string(&GoType::Interface(stringer)),
            "interface{String() string}"
        );
        assert_eq!(
            type_string(&GoType::Struct(vec![
                StructField {
                    name: Some("X".to_string()),
                    ty: GoType::basic("int"),
                },
                StructField {
                    name: None,
                    ty: GoType::named("sync", "Mutex"),
                },
            ])),
            "struct{X int; sync.Mutex}"
        );
        assert_eq!(type_string(&GoType::Struct(Vec::new())), "struct{}");
        assert_eq!(
            type_string(&GoType::Union(vec![
                UnionTerm {
                    tilde: true,
                    ty: GoType::basic("int"),
                },
                UnionTerm {
                    tilde: false,
                    ty: GoType::basic("string"),
                },
            ])),
            "~int | string"
        );
    }
}

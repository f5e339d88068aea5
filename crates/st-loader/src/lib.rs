mod package;
mod resolve;
mod target;
mod universe;

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use st_core::{
    is_exported, DeclShape, Declaration, DeclarationSource, GoType, ScopeDeclarations,
    SigTableError,
};
use tracing::debug;

use package::{load_package, LoadedPackage};

pub use target::BuildTarget;

const VENDOR_DIR: &str = "vendor";

pub struct GoSourceTree {
    root: PathBuf,
    target: BuildTarget,
    packages: HashMap<String, Rc<LoadedPackage>>,
    underlying: HashMap<(String, String), GoType>,
    aliases: HashMap<(String, String), GoType>,
    visiting: HashSet<(String, String)>,
    visiting_aliases: HashSet<(String, String)>,
}

impl GoSourceTree {
    pub fn new(root: impl Into<PathBuf>, target: BuildTarget) -> Self {
        Self {
            root: root.into(),
            target,
            packages: HashMap::new(),
            underlying: HashMap::new(),
            aliases: HashMap::new(),
            visiting: HashSet::new(),
            visiting_aliases: HashSet::new(),
        }
    }

    pub fn from_goroot(goroot: &Path, target: BuildTarget) -> Self {
        Self::new(goroot.join("src"), target)
    }

    pub(crate) fn package(&mut self, path: &str) -> Result<Rc<LoadedPackage>, SigTableError> {
        if let Some(found) = self.packages.get(path) {
            return Ok(Rc::clone(found));
        }
        // GOROOT resolves imports it does not hold itself from src/vendor.
        let vendored = self.root.join(VENDOR_DIR);
        let root = if !self.root.join(path).is_dir() && vendored.join(path).is_dir() {
            debug!(path, "loading vendored package");
            vendored
        } else {
            self.root.clone()
        };
        let loaded = Rc::new(load_package(&root, path, &self.target)?);
        self.packages.insert(path.to_string(), Rc::clone(&loaded));
        Ok(loaded)
    }
}

impl DeclarationSource for GoSourceTree {
    fn universe(&mut self) -> Result<ScopeDeclarations, SigTableError> {
        Ok(universe::universe_declarations())
    }

    fn load(&mut self, path: &str) -> Result<ScopeDeclarations, SigTableError> {
        let package = self.package(path)?;
        let mut declarations = Vec::with_capacity(package.types.len());
        // BTreeMap keys keep declarations in name order.
        for (name, entry) in &package.types {
            let shape = if is_exported(name) && !entry.spec.generic {
                self.declaration_shape(path, name)?
            } else {
                DeclShape::Other
            };
            declarations.push(Declaration::new(name.clone(), shape));
        }
        debug!(
            scope = path,
            declarations = declarations.len(),
            "resolved scope declarations"
        );
        Ok(ScopeDeclarations {
            path: path.to_string(),
            declarations,
        })
    }
}

#[cfg(test)]
mod loader_tests {
    use super::*;
    use st_core::{ChanDir, InterfaceType, Method, Signature};
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_root(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time should be monotonic")
            .as_nanos();
        std::env::temp_dir().join(format!("sigtable-loader-{}-{}", name, nanos))
    }

    fn write_file(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("parent should be created");
        }
        fs::write(path, content).expect("file should be written");
    }

    fn shape_of<'d>(scope: &'d ScopeDeclarations, name: &str) -> &'d DeclShape {
        &scope
            .declarations
            .iter()
            .find(|decl| decl.name == name)
            .expect("declaration should exist")
            .shape
    }

    fn write_io_fixture(root: &Path) {
        write_file(
            root,
            "io/io.go",
            r#"package io

type Reader interface {
	Read(p []byte) (n int, err error)
}

type Writer interface {
	Write(p []byte) (n int, err error)
}

type ReadWriter interface {
	Reader
	Writer
}

type ByteReader = byteReader

type byteReader interface {
	ReadByte() (byte, error)
}

type WalkFunc func(path string, fn func(string) error, opts ...int) error

type Pipe struct {
	buf [BufSize]byte
}

const BufSize = 0x20
"#,
        );
    }

    #[test]
    fn universe_is_synthesized() {
        let mut tree = GoSourceTree::new(temp_root("universe"), BuildTarget::default());
        let universe = tree.universe().expect("universe should load");
        assert_eq!(universe.path, "");
        assert!(universe.declarations.iter().any(|decl| decl.name == "error"));
    }

    #[test]
    fn loads_interfaces_and_functions_with_flattened_embeds() {
        let root = temp_root("io");
        write_io_fixture(&root);
        let mut tree = GoSourceTree::new(&root, BuildTarget::default());
        let scope = tree.load("io").expect("io should load");

        let names = scope
            .declarations
            .iter()
            .map(|decl| decl.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(
            names,
            vec!["ByteReader", "Pipe", "ReadWriter", "Reader", "WalkFunc", "Writer", "byteReader"]
        );

        let io_method = |name: &str| {
            Method::new(
                name,
                Signature::new(
                    vec![GoType::slice(GoType::basic("byte"))],
                    vec![GoType::basic("int"), GoType::error()],
                ),
            )
        };
        assert_eq!(
            shape_of(&scope, "ReadWriter"),
            &DeclShape::Interface(InterfaceType {
                methods: vec![io_method("Read"), io_method("Write")],
                terms: Vec::new(),
            })
        );
        assert_eq!(
            shape_of(&scope, "ByteReader"),
            &DeclShape::Interface(InterfaceType {
                methods: vec![Method::new(
                    "ReadByte",
                    Signature::new(Vec::new(), vec![GoType::basic("byte"), GoType::error()]),
                )],
                terms: Vec::new(),
            })
        );
        assert_eq!(shape_of(&scope, "byteReader"), &DeclShape::Other);
        assert_eq!(shape_of(&scope, "Pipe"), &DeclShape::Other);

        let DeclShape::Func(walk) = shape_of(&scope, "WalkFunc") else {
            panic!("WalkFunc should be function-shaped");
        };
        assert!(walk.variadic);
        assert_eq!(
            walk.params,
            vec![
                GoType::basic("string"),
                GoType::Func(Signature::new(
                    vec![GoType::basic("string")],
                    vec![GoType::error()]
                )),
                GoType::slice(GoType::basic("int")),
            ]
        );

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn resolves_imported_names_with_full_paths() {
        let root = temp_root("imports");
        write_io_fixture(&root);
        write_file(
            &root,
            "net/http/header.go",
            "package http\n\ntype Header map[string][]string\n",
        );
        write_file(
            &root,
            "example/v2/lib.go",
            "package example\n\ntype Size int\n",
        );
        write_file(
            &root,
            "app/app.go",
            r#"package app

import (
	"example/v2"
	stdio "io"
	"net/http"
	"unsafe"
)

type Handler func(http.Header, <-chan stdio.Reader) (example.Size, unsafe.Pointer)

type Sink interface {
	stdio.Writer
	Flush(done chan<- struct{}) error
}
"#,
        );

        let mut tree = GoSourceTree::new(&root, BuildTarget::default());
        let scope = tree.load("app").expect("app should load");

        let DeclShape::Func(handler) = shape_of(&scope, "Handler") else {
            panic!("Handler should be function-shaped");
        };
        assert_eq!(
            handler.params,
            vec![
                GoType::named("net/http", "Header"),
                GoType::Chan {
                    dir: ChanDir::Recv,
                    elem: Box::new(GoType::named("io", "Reader")),
                },
            ]
        );
        assert_eq!(
            handler.results,
            vec![
                GoType::named("example/v2", "Size"),
                GoType::basic("unsafe.Pointer"),
            ]
        );

        let DeclShape::Interface(sink) = shape_of(&scope, "Sink") else {
            panic!("Sink should be interface-shaped");
        };
        assert_eq!(
            sink.methods
                .iter()
                .map(|method| method.name.as_str())
                .collect::<Vec<_>>(),
            vec!["Flush", "Write"]
        );

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn vendored_imports_resolve_and_non_signature_bodies_are_skipped() {
        let goroot = temp_root("vendor");
        write_file(
            &goroot,
            "src/vendor/golang.org/x/net/dns/dnsmessage/msg.go",
            "package dnsmessage\n\ntype Header struct {\n\tID uint16\n}\n\ntype Message struct {\n\tHeader Header\n}\n",
        );
        write_file(
            &goroot,
            "src/net/net.go",
            r#"package net

import (
	"golang.org/x/net/dns/dnsmessage"
	"golang.org/x/net/missing"
)

type Conn interface {
	Close() error
}

type Resolver struct {
	last dnsmessage.Header
	cache missing.Cache
}

type Table map[string]missing.Entry

type Msg dnsmessage.Message

type HeaderParser interface {
	Start(dnsmessage.Header) error
}
"#,
        );
        let mut tree = GoSourceTree::from_goroot(&goroot, BuildTarget::default());
        let scope = tree.load("net").expect("net should load");

        assert_eq!(
            shape_of(&scope, "Conn"),
            &DeclShape::Interface(InterfaceType {
                methods: vec![Method::new(
                    "Close",
                    Signature::new(Vec::new(), vec![GoType::error()]),
                )],
                terms: Vec::new(),
            })
        );
        assert_eq!(shape_of(&scope, "Resolver"), &DeclShape::Other);
        assert_eq!(shape_of(&scope, "Table"), &DeclShape::Other);
        assert_eq!(shape_of(&scope, "Msg"), &DeclShape::Other);

        let DeclShape::Interface(parser) = shape_of(&scope, "HeaderParser") else {
            panic!("HeaderParser should be interface-shaped");
        };
        assert_eq!(
            parser.methods[0].signature.params,
            vec![GoType::named("golang.org/x/net/dns/dnsmessage", "Header")]
        );

        let _ = fs::remove_dir_all(goroot);
    }

    #[test]
    fn folds_constant_array_lengths() {
        let root = temp_root("arrays");
        write_file(
            &root,
            "sha/sha.go",
            "package sha\n\nconst Size = 0x20\nconst BlockSize = Size\n\ntype Sum func([BlockSize]byte, [N + 1]int) [Size]byte\n",
        );
        let mut tree = GoSourceTree::new(&root, BuildTarget::default());
        let scope = tree.load("sha").expect("sha should load");
        let DeclShape::Func(sum) = shape_of(&scope, "Sum") else {
            panic!("Sum should be function-shaped");
        };
        assert_eq!(
            sum.params[0],
            GoType::Array {
                len: "32".to_string(),
                elem: Box::new(GoType::basic("byte")),
            }
        );
        assert_eq!(
            sum.params[1],
            GoType::Array {
                len: "N + 1".to_string(),
                elem: Box::new(GoType::basic("int")),
            }
        );

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn reports_unknown_and_recursive_types() {
        let root = temp_root("errors");
        write_file(
            &root,
            "bad/bad.go",
            "package bad\n\ntype Loop interface {\n\tLoop\n}\n",
        );
        write_file(
            &root,
            "unknown/unknown.go",
            "package unknown\n\ntype F func(Missing)\n",
        );
        write_file(
            &root,
            "cycle/cycle.go",
            "package cycle\n\ntype A B\n\ntype B A\n",
        );
        let mut tree = GoSourceTree::new(&root, BuildTarget::default());

        let recursive = tree.load("bad").expect_err("self embedding should fail");
        assert_eq!(recursive.code, "TYPE_DECL_RECURSIVE");

        let cycle = tree.load("cycle").expect_err("defined type cycle should fail");
        assert_eq!(cycle.code, "TYPE_DECL_RECURSIVE");

        let unknown = tree.load("unknown").expect_err("unknown type should fail");
        assert_eq!(unknown.code, "TYPE_UNKNOWN");

        let missing = tree.load("nowhere").expect_err("missing scope should fail");
        assert_eq!(missing.code, "SCOPE_NOT_FOUND");

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn generic_declarations_stay_opaque() {
        let root = temp_root("generic");
        write_file(
            &root,
            "iter/iter.go",
            "package iter\n\ntype Seq[V any] func(yield func(V) bool)\n\ntype IntSeq = Seq[int]\n\ntype Ints Seq[int]\n\ntype Number interface {\n\t~int | ~float64\n}\n\ntype Stringer interface {\n\tString() string\n\tcomparable\n}\n",
        );
        let mut tree = GoSourceTree::new(&root, BuildTarget::default());
        let scope = tree.load("iter").expect("iter should load");
        assert_eq!(shape_of(&scope, "Seq"), &DeclShape::Other);
        assert_eq!(shape_of(&scope, "IntSeq"), &DeclShape::Other);
        assert_eq!(shape_of(&scope, "Ints"), &DeclShape::Other);
        let DeclShape::Interface(number) = shape_of(&scope, "Number") else {
            panic!("Number should be interface-shaped");
        };
        assert!(number.is_constraint());
        let DeclShape::Interface(stringer) = shape_of(&scope, "Stringer") else {
            panic!("Stringer should be interface-shaped");
        };
        assert!(stringer.is_constraint());

        let _ = fs::remove_dir_all(root);
    }
}

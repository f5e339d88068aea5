use std::collections::HashSet;
use std::rc::Rc;

use st_core::{
    DeclShape, GoType, InterfaceType, Method, SigTableError, Signature, StructField, UnionTerm,
    UNIVERSE_PATH,
};
use st_parser::{ArrayLen, ConstValue, FuncTypeExpr, InterfaceElem, ParamExpr, TypeExpr};

use crate::package::LoadedPackage;
use crate::universe;
use crate::GoSourceTree;

const MAX_CONST_DEPTH: usize = 8;

type TypeKey = (String, String);

fn key(path: &str, name: &str) -> TypeKey {
    (path.to_string(), name.to_string())
}

#[derive(Clone)]
struct Site {
    package: Rc<LoadedPackage>,
    file: usize,
}

impl GoSourceTree {
    pub(crate) fn declaration_shape(
        &mut self,
        path: &str,
        name: &str,
    ) -> Result<DeclShape, SigTableError> {
        if !self.has_signature_constructor(path, name)? {
            return Ok(DeclShape::Other);
        }
        Ok(match self.underlying_of(path, name)? {
            GoType::Interface(iface) => DeclShape::Interface(iface),
            GoType::Func(signature) => DeclShape::Func(signature),
            _ => DeclShape::Other,
        })
    }

    // Follows type names through aliases and defined types down to the first
    // type literal. Only `interface` and `func` literals are resolved further.
    fn has_signature_constructor(&mut self, path: &str, name: &str) -> Result<bool, SigTableError> {
        let mut seen = HashSet::new();
        let mut current = key(path, name);
        loop {
            if current.0 == UNIVERSE_PATH {
                return Ok(matches!(
                    universe::underlying(&current.1),
                    Some(GoType::Interface(_))
                ));
            }
            if !seen.insert(current.clone()) {
                return Err(SigTableError::new(
                    "TYPE_DECL_RECURSIVE",
                    format!(
                        "Type \"{}.{}\" is defined in terms of itself.",
                        current.0, current.1
                    ),
                ));
            }
            let package = self.package(&current.0)?;
            let Some(entry) = package.types.get(&current.1) else {
                return Err(unknown_type(&current.0, &current.1));
            };
            if entry.spec.generic {
                return Ok(false);
            }
            let site = Site {
                file: entry.file,
                package: Rc::clone(&package),
            };
            match &entry.spec.ty {
                TypeExpr::Interface(_) | TypeExpr::Func(_) => return Ok(true),
                TypeExpr::Name(name) => current = self.head_name(&site, name)?,
                TypeExpr::Qualified { package: local, name } => {
                    let path = self.import_path(&site, local)?;
                    if path == "unsafe" {
                        return Ok(false);
                    }
                    current = key(&path, name);
                }
                _ => return Ok(false),
            }
        }
    }

    fn head_name(&mut self, site: &Site, name: &str) -> Result<TypeKey, SigTableError> {
        if site.package.types.contains_key(name) {
            return Ok(key(&site.package.path, name));
        }
        if universe::lookup(name).is_some() {
            return Ok(key(UNIVERSE_PATH, name));
        }
        for path in self.dot_imports(site) {
            if self.package(&path)?.types.contains_key(name) {
                return Ok(key(&path, name));
            }
        }
        Err(unknown_type(&site.package.path, name))
    }

    fn dot_imports(&self, site: &Site) -> Vec<String> {
        site.package.files[site.file]
            .imports
            .iter()
            .filter(|import| import.alias.as_deref() == Some("."))
            .map(|import| import.path.clone())
            .collect()
    }

    pub(crate) fn underlying_of(
        &mut self,
        path: &str,
        name: &str,
    ) -> Result<GoType, SigTableError> {
        if path == UNIVERSE_PATH {
            return universe::underlying(name).ok_or_else(|| unknown_type(path, name));
        }
        let type_key = key(path, name);
        if let Some(found) = self.underlying.get(&type_key) {
            return Ok(found.clone());
        }
        if self.visiting.contains(&type_key) {
            return Err(SigTableError::new(
                "TYPE_DECL_RECURSIVE",
                format!("Type \"{}.{}\" is defined in terms of itself.", path, name),
            ));
        }

        let package = self.package(path)?;
        let Some(entry) = package.types.get(name) else {
            return Err(unknown_type(path, name));
        };
        if entry.spec.generic {
            return Ok(GoType::named(path, name));
        }
        let site = Site {
            file: entry.file,
            package: Rc::clone(&package),
        };
        let expr = entry.spec.ty.clone();

        self.visiting.insert(type_key.clone());
        let result = self
            .resolve_expr(&site, &expr)
            .and_then(|resolved| self.compute_underlying(resolved));
        self.visiting.remove(&type_key);

        let underlying = result?;
        self.underlying.insert(type_key, underlying.clone());
        Ok(underlying)
    }

    fn compute_underlying(&mut self, ty: GoType) -> Result<GoType, SigTableError> {
        match ty {
            GoType::Named { path, name, .. } => self.underlying_of(&path, &name),
            other => Ok(other),
        }
    }

    fn named_in(&mut self, package: &Rc<LoadedPackage>, name: &str) -> Result<GoType, SigTableError> {
        let Some(entry) = package.types.get(name) else {
            return Err(unknown_type(&package.path, name));
        };
        if !entry.spec.alias {
            return Ok(GoType::named(package.path.clone(), name));
        }

        let type_key = key(&package.path, name);
        if let Some(found) = self.aliases.get(&type_key) {
            return Ok(found.clone());
        }
        if !self.visiting_aliases.insert(type_key.clone()) {
            return Err(SigTableError::new(
                "TYPE_DECL_RECURSIVE",
                format!("Alias \"{}.{}\" refers to itself.", package.path, name),
            ));
        }
        let site = Site {
            file: entry.file,
            package: Rc::clone(package),
        };
        let expr = entry.spec.ty.clone();
        let result = self.resolve_expr(&site, &expr);
        self.visiting_aliases.remove(&type_key);

        let target = result?;
        self.aliases.insert(type_key, target.clone());
        Ok(target)
    }

    fn resolve_type_name(&mut self, site: &Site, name: &str) -> Result<GoType, SigTableError> {
        if site.package.types.contains_key(name) {
            return self.named_in(&site.package, name);
        }
        if let Some(predeclared) = universe::lookup(name) {
            return Ok(predeclared);
        }
        for path in self.dot_imports(site) {
            let imported = self.package(&path)?;
            if imported.types.contains_key(name) {
                return self.named_in(&imported, name);
            }
        }
        Err(unknown_type(&site.package.path, name))
    }

    fn resolve_qualified(
        &mut self,
        site: &Site,
        local: &str,
        name: &str,
    ) -> Result<GoType, SigTableError> {
        let path = self.import_path(site, local)?;
        if path == "unsafe" {
            return Ok(GoType::basic(format!("unsafe.{}", name)));
        }
        let imported = self.package(&path)?;
        self.named_in(&imported, name)
    }

    fn import_path(&mut self, site: &Site, local: &str) -> Result<String, SigTableError> {
        let imports = &site.package.files[site.file].imports;
        if let Some(import) = imports
            .iter()
            .find(|import| import.alias.as_deref() == Some(local))
        {
            return Ok(import.path.clone());
        }
        let implicit = imports
            .iter()
            .filter(|import| import.alias.is_none())
            .map(|import| import.path.clone())
            .collect::<Vec<_>>();
        if let Some(path) = implicit.iter().find(|path| guess_package_name(path) == local) {
            return Ok(path.clone());
        }
        for path in implicit {
            if let Ok(imported) = self.package(&path) {
                if imported.name == local {
                    return Ok(path);
                }
            }
        }
        Err(SigTableError::new(
            "TYPE_UNKNOWN",
            format!(
                "Package \"{}\" does not import \"{}\".",
                site.package.path, local
            ),
        ))
    }

    fn resolve_expr(&mut self, site: &Site, expr: &TypeExpr) -> Result<GoType, SigTableError> {
        Ok(match expr {
            TypeExpr::Name(name) => self.resolve_type_name(site, name)?,
            TypeExpr::Qualified { package, name } => self.resolve_qualified(site, package, name)?,
            TypeExpr::Instance { base, args } => {
                let resolved_args = args
                    .iter()
                    .map(|arg| self.resolve_expr(site, arg))
                    .collect::<Result<Vec<_>, _>>()?;
                match self.resolve_expr(site, base)? {
                    GoType::Named { path, name, .. } => GoType::Named {
                        path,
                        name,
                        args: resolved_args,
                    },
                    other => other,
                }
            }
            TypeExpr::Pointer(elem) => GoType::Pointer(Box::new(self.resolve_expr(site, elem)?)),
            TypeExpr::Slice(elem) => GoType::Slice(Box::new(self.resolve_expr(site, elem)?)),
            TypeExpr::Array { len, elem } => GoType::Array {
                len: self.array_len(site, len),
                elem: Box::new(self.resolve_expr(site, elem)?),
            },
            TypeExpr::Map { key, value } => GoType::Map {
                key: Box::new(self.resolve_expr(site, key)?),
                value: Box::new(self.resolve_expr(site, value)?),
            },
            TypeExpr::Chan { dir, elem } => GoType::Chan {
                dir: *dir,
                elem: Box::new(self.resolve_expr(site, elem)?),
            },
            TypeExpr::Func(func) => GoType::Func(self.resolve_signature(site, func)?),
            TypeExpr::Interface(elems) => GoType::Interface(self.resolve_interface(site, elems)?),
            TypeExpr::Struct(fields) => GoType::Struct(
                fields
                    .iter()
                    .map(|field| {
                        Ok(StructField {
                            name: field.name.clone(),
                            ty: self.resolve_expr(site, &field.ty)?,
                        })
                    })
                    .collect::<Result<Vec<_>, SigTableError>>()?,
            ),
        })
    }

    fn resolve_signature(
        &mut self,
        site: &Site,
        func: &FuncTypeExpr,
    ) -> Result<Signature, SigTableError> {
        let variadic = func.params.last().is_some_and(|param| param.variadic);
        Ok(Signature {
            params: self.resolve_params(site, &func.params)?,
            results: self.resolve_params(site, &func.results)?,
            variadic,
        })
    }

    fn resolve_params(
        &mut self,
        site: &Site,
        params: &[ParamExpr],
    ) -> Result<Vec<GoType>, SigTableError> {
        params
            .iter()
            .map(|param| {
                let ty = self.resolve_expr(site, &param.ty)?;
                Ok(if param.variadic {
                    GoType::Slice(Box::new(ty))
                } else {
                    ty
                })
            })
            .collect()
    }

    fn resolve_interface(
        &mut self,
        site: &Site,
        elems: &[InterfaceElem],
    ) -> Result<InterfaceType, SigTableError> {
        let mut iface = InterfaceType::default();
        for elem in elems {
            match elem {
                InterfaceElem::Method { name, func } => {
                    let signature = self.resolve_signature(site, func)?;
                    iface.methods.push(Method::new(name.clone(), signature));
                }
                InterfaceElem::Embed(expr) => {
                    let embedded = self.resolve_expr(site, expr)?;
                    match self.compute_underlying(embedded.clone())? {
                        GoType::Interface(inner) => {
                            iface.methods.extend(inner.methods);
                            iface.terms.extend(inner.terms);
                        }
                        _ => iface.terms.push(embedded),
                    }
                }
                InterfaceElem::Union(terms) => {
                    let resolved = terms
                        .iter()
                        .map(|term| {
                            Ok(UnionTerm {
                                tilde: term.tilde,
                                ty: self.resolve_expr(site, &term.ty)?,
                            })
                        })
                        .collect::<Result<Vec<_>, SigTableError>>()?;
                    iface.terms.push(GoType::Union(resolved));
                }
            }
        }
        iface
            .methods
            .sort_by(|left, right| left.name.cmp(&right.name));
        iface.methods.dedup_by(|later, earlier| later.name == earlier.name);
        Ok(iface)
    }

    fn array_len(&mut self, site: &Site, len: &ArrayLen) -> String {
        match len {
            ArrayLen::Literal(text) => normalize_int(text).unwrap_or_else(|| text.clone()),
            ArrayLen::Name(name) => self
                .const_in(&site.package, name, 0)
                .unwrap_or_else(|| name.clone()),
            ArrayLen::Qualified { package, name } => self
                .import_path(site, package)
                .ok()
                .and_then(|path| self.package(&path).ok())
                .and_then(|imported| self.const_in(&imported, name, 0))
                .unwrap_or_else(|| format!("{}.{}", package, name)),
            ArrayLen::Expr(text) => text.clone(),
        }
    }

    fn const_in(&mut self, package: &Rc<LoadedPackage>, name: &str, depth: usize) -> Option<String> {
        if depth >= MAX_CONST_DEPTH {
            return None;
        }
        let (file, value) = package.consts.get(name)?.clone();
        match value {
            ConstValue::Literal(text) => normalize_int(&text),
            ConstValue::Name(other) => self.const_in(package, &other, depth + 1),
            ConstValue::Qualified { package: local, name } => {
                let site = Site {
                    package: Rc::clone(package),
                    file,
                };
                let path = self.import_path(&site, &local).ok()?;
                let imported = self.package(&path).ok()?;
                self.const_in(&imported, &name, depth + 1)
            }
        }
    }
}

fn unknown_type(path: &str, name: &str) -> SigTableError {
    let shown = if path == UNIVERSE_PATH {
        name.to_string()
    } else {
        format!("{}.{}", path, name)
    };
    SigTableError::new("TYPE_UNKNOWN", format!("Unknown type \"{}\".", shown))
}

pub(crate) fn guess_package_name(path: &str) -> &str {
    let mut segments = path.rsplit('/');
    let mut last = segments.next().unwrap_or(path);
    if is_major_version(last) {
        if let Some(previous) = segments.next() {
            last = previous;
        }
    }
    match last.rsplit_once(".v") {
        Some((base, version)) if is_digits(version) => base,
        _ => last,
    }
}

fn is_major_version(segment: &str) -> bool {
    segment.strip_prefix('v').is_some_and(is_digits)
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|ch| ch.is_ascii_digit())
}

pub(crate) fn normalize_int(text: &str) -> Option<String> {
    let cleaned = text.replace('_', "");
    let lower = cleaned.to_ascii_lowercase();
    let (digits, radix) = if let Some(rest) = lower.strip_prefix("0x") {
        (rest, 16)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (rest, 2)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (rest, 8)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (&lower[1..], 8)
    } else {
        (lower.as_str(), 10)
    };
    u128::from_str_radix(digits, radix)
        .ok()
        .map(|value| value.to_string())
}

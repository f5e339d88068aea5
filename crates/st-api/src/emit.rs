use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use st_core::{GroupedTables, SigTableError, TableRow};

pub const GENERATED_HEADER: &str = "// Generated by sigtable. DO NOT EDIT.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Go,
    Json,
}

pub fn render(
    tables: &GroupedTables,
    package: &str,
    format: OutputFormat,
) -> Result<String, SigTableError> {
    match format {
        OutputFormat::Go => Ok(render_go_source(tables, package)),
        OutputFormat::Json => render_json(tables),
    }
}

pub fn render_go_source(tables: &GroupedTables, package: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", GENERATED_HEADER);
    out.push('\n');
    let _ = writeln!(out, "package {}", package);
    out.push('\n');

    out.push_str("var pkgs = map[string]struct{}{\n");
    for path in &tables.scopes {
        let _ = writeln!(out, "\t{}: struct{{}}{{}},", go_quote(path));
    }
    out.push_str("}\n\n");

    write_rows(&mut out, "ifaces", &tables.interfaces);
    out.push('\n');
    write_rows(&mut out, "funcs", &tables.functions);
    out
}

fn write_rows(out: &mut String, var: &str, rows: &[TableRow]) {
    let _ = writeln!(out, "var {} = map[string]string{{", var);
    for row in rows {
        let _ = writeln!(
            out,
            "\t{}: {},",
            go_quote(&row.signature),
            go_quote(&row.qualified_name)
        );
    }
    out.push_str("}\n");
}

pub fn render_json(tables: &GroupedTables) -> Result<String, SigTableError> {
    let mut rendered = serde_json::to_string_pretty(tables).map_err(|error| {
        SigTableError::new("EMIT_JSON", format!("Failed to render JSON: {}", error))
    })?;
    rendered.push('\n');
    Ok(rendered)
}

pub fn go_quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for ch in text.chars() {
        match ch {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            ch if ch.is_control() => {
                let _ = write!(quoted, "\\u{:04x}", ch as u32);
            }
            ch => quoted.push(ch),
        }
    }
    quoted.push('"');
    quoted
}

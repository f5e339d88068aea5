use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub type SignatureTable = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalTables {
    pub interfaces: SignatureTable,
    pub functions: SignatureTable,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedTables {
    pub interfaces: SignatureTable,
    pub functions: SignatureTable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    pub signature: String,
    pub qualified_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedTables {
    pub scopes: Vec<String>,
    pub interfaces: Vec<TableRow>,
    pub functions: Vec<TableRow>,
}

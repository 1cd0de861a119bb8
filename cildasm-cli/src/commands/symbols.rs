//! JSON symbol files.
//!
//! ```json
//! {
//!   "strings": { "0x70000001": "Hello, World!" },
//!   "methods": { "0x0A000001": { "declaring_type": "System.Console", "name": "WriteLine" } },
//!   "fields":  { "0x04000001": { "declaring_type": "Program", "name": "counter" } },
//!   "types":   { "0x01000001": "System.Object" },
//!   "locals":  { "0x11000001": ["System.Int32", null] }
//! }
//! ```
//!
//! Every section is optional. Keys are tokens in `0x` hex or decimal.

use std::{collections::BTreeMap, path::Path};

use anyhow::{Context, Result};
use cildasm::metadata::{MemberName, SymbolTable};
use log::debug;
use serde::Deserialize;

use crate::commands::common::{parse_token, read_file};

#[derive(Debug, Deserialize)]
struct MemberEntry {
    #[serde(default)]
    declaring_type: String,
    name: String,
}

impl From<MemberEntry> for MemberName {
    fn from(entry: MemberEntry) -> Self {
        MemberName::new(entry.declaring_type, entry.name)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SymbolFile {
    strings: BTreeMap<String, String>,
    methods: BTreeMap<String, MemberEntry>,
    fields: BTreeMap<String, MemberEntry>,
    types: BTreeMap<String, String>,
    locals: BTreeMap<String, Vec<Option<String>>>,
}

impl SymbolFile {
    fn into_table(self) -> Result<SymbolTable> {
        let mut table = SymbolTable::new();

        for (key, value) in self.strings {
            table.add_string(parse_token(&key)?, value);
        }
        for (key, entry) in self.methods {
            table.add_method(parse_token(&key)?, entry.into());
        }
        for (key, entry) in self.fields {
            table.add_field(parse_token(&key)?, entry.into());
        }
        for (key, value) in self.types {
            table.add_type(parse_token(&key)?, value);
        }
        for (key, locals) in self.locals {
            table.add_local_signature(parse_token(&key)?, locals);
        }

        Ok(table)
    }
}

/// Parse a symbol file from JSON text. The top level must be a JSON object.
pub fn parse_symbols(json: &str) -> Result<SymbolTable> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    anyhow::ensure!(
        value.is_object(),
        "symbol file must be a JSON object"
    );

    let file: SymbolFile = serde_json::from_value(value)?;
    file.into_table()
}

/// Load a symbol file, or an empty table if no path is given.
pub fn load_symbols(path: Option<&Path>) -> Result<SymbolTable> {
    let Some(path) = path else {
        return Ok(SymbolTable::new());
    };

    let data = read_file(path)?;
    let json = String::from_utf8(data)
        .with_context(|| format!("symbol file is not UTF-8: {}", path.display()))?;
    let table = parse_symbols(&json)
        .with_context(|| format!("failed to load symbols: {}", path.display()))?;

    debug!("loaded {} symbols from {}", table.len(), path.display());
    Ok(table)
}

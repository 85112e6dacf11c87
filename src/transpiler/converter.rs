//! Solidity → ink! mapping of types, names and literals.
//!
//! The assembler leans on this module for every piece of destination
//! syntax that is a straight lookup rather than a structural decision,
//! e.g. `uint256` → `u128` or `address` → `AccountId`.

use crate::transpiler::ast::SolType;
use convert_case::{Case, Casing};
use std::collections::BTreeSet;

/// Parses an elementary Solidity type name. Returns `None` for anything
/// that is not a builtin, so callers can fall back to user-defined types.
pub fn elementary_type(text: &str) -> Option<SolType> {
    match text {
        "bool" => return Some(SolType::Bool),
        "address" => return Some(SolType::Address),
        "string" => return Some(SolType::String),
        "bytes" => return Some(SolType::Bytes),
        "byte" => return Some(SolType::FixedBytes(1)),
        "uint" => return Some(SolType::Uint(256)),
        "int" => return Some(SolType::Int(256)),
        _ => {}
    }
    if let Some(bits) = text.strip_prefix("uint").and_then(|s| s.parse::<u16>().ok()) {
        if bits % 8 == 0 && bits <= 256 {
            return Some(SolType::Uint(bits));
        }
    }
    if let Some(bits) = text.strip_prefix("int").and_then(|s| s.parse::<u16>().ok()) {
        if bits % 8 == 0 && bits <= 256 {
            return Some(SolType::Int(bits));
        }
    }
    if let Some(n) = text.strip_prefix("bytes").and_then(|s| s.parse::<u8>().ok()) {
        if n >= 1 && n <= 32 {
            return Some(SolType::FixedBytes(n));
        }
    }
    None
}

/// Destination integer type for a Solidity integer width. 256-bit values
/// map to the largest native integer the target framework works with.
fn integer_type(bits: u16, signed: bool) -> &'static str {
    let rounded = match bits {
        0..=8 => 8,
        9..=16 => 16,
        17..=32 => 32,
        33..=64 => 64,
        _ => 128,
    };
    match (signed, rounded) {
        (false, 8) => "u8",
        (false, 16) => "u16",
        (false, 32) => "u32",
        (false, 64) => "u64",
        (false, _) => "u128",
        (true, 8) => "i8",
        (true, 16) => "i16",
        (true, 32) => "i32",
        (true, 64) => "i64",
        (true, _) => "i128",
    }
}

/// Converts a Solidity type to its ink! counterpart, recording the
/// imports the emitted text relies on.
pub fn convert_type(ty: &SolType, imports: &mut BTreeSet<String>) -> String {
    match ty {
        SolType::Uint(bits) => integer_type(*bits, false).to_owned(),
        SolType::Int(bits) => integer_type(*bits, true).to_owned(),
        SolType::Bool => String::from("bool"),
        SolType::Address | SolType::AddressPayable => String::from("AccountId"),
        SolType::String => {
            imports.insert(String::from("ink_prelude::string::String"));
            String::from("String")
        }
        SolType::Bytes => {
            imports.insert(String::from("ink_prelude::vec::Vec"));
            String::from("Vec<u8>")
        }
        SolType::FixedBytes(n) => format!("[u8; {}]", n),
        SolType::Array(elem) => {
            imports.insert(String::from("ink_prelude::vec::Vec"));
            format!("Vec<{}>", convert_type(elem, imports))
        }
        SolType::Mapping(key, value) => {
            imports.insert(String::from("openbrush::storage::Mapping"));
            // nested mappings flatten into a tuple key
            let mut keys = vec![convert_type(key, imports)];
            let mut inner = value.as_ref();
            while let SolType::Mapping(k, v) = inner {
                keys.push(convert_type(k, imports));
                inner = v.as_ref();
            }
            let key_text = if keys.len() == 1 {
                keys.remove(0)
            } else {
                format!("({})", keys.join(", "))
            };
            format!("Mapping<{}, {}>", key_text, convert_type(inner, imports))
        }
        SolType::Custom(name) => name.clone(),
        SolType::Unknown => String::from("_"),
    }
}

/// Destination type used for `type(T).max` / `type(T).min` rewriting.
/// Only integers have limit constants; other types return `None` and the
/// rewrite is skipped.
pub fn limit_type(ty: &SolType) -> Option<&'static str> {
    match ty {
        SolType::Uint(bits) => Some(integer_type(*bits, false)),
        SolType::Int(bits) => Some(integer_type(*bits, true)),
        _ => None,
    }
}

pub fn snake(name: &str) -> String {
    name.to_case(Case::Snake)
}

pub fn screaming(name: &str) -> String {
    name.to_case(Case::UpperSnake)
}

pub fn pascal(name: &str) -> String {
    name.to_case(Case::Pascal)
}

/// Module name for the generated contract, e.g. `MyToken` -> `my_token`.
pub fn module_name(contract: &str) -> String {
    snake(contract)
}

/// Trait name for a translated interface; the leading `I` convention is
/// dropped (`IERC20` -> `ERC20`).
pub fn trait_name(interface: &str) -> String {
    let mut chars = interface.chars();
    match (chars.next(), chars.clone().next()) {
        (Some('I'), Some(second)) if second.is_uppercase() => chars.collect(),
        _ => interface.to_owned(),
    }
}

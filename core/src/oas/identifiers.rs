#![deny(missing_docs)]

//! # Identifier Normalization
//!
//! Turns arbitrary document names (schema keys, parameter names, media types, status
//! codes) into legal Rust identifiers.
//!
//! Type-level names use the separator-driven camel casing that code generators in this
//! space have converged on: every character in [`SEPARATORS`] starts a new word and is
//! dropped, letters and digits are kept, everything else disappears. Value-level names
//! are snake_case.

use crate::error::{AppError, AppResult};
use heck::ToSnakeCase;

/// Characters that split words and are dropped from camel-cased output.
pub const SEPARATORS: &str = "-#@!$&=.+:;_~ (){}[]";

/// Strict and reserved keywords of the 2021 edition.
const RUST_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "self", "Self", "static", "struct", "super", "trait", "true", "try", "type",
    "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Keywords that cannot be written as raw identifiers.
const NON_RAW_KEYWORDS: &[&str] = &["self", "Self", "super", "crate"];

/// Which identifier namespace a name is destined for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentCase {
    /// Types, enum variants: `UpperCamelCase`.
    Type,
    /// Fields, variables: `snake_case`.
    Value,
}

/// Camel-cases `input` by word separators.
///
/// `"read-pets"` → `"ReadPets"`, `"get-{petId}"` → `"GetPetId"`. Case inside a word is
/// preserved, so `"userID"` stays `"UserID"`.
pub fn to_camel_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut cap_next = true;
    for c in input.trim_matches(' ').chars() {
        if c.is_uppercase() || c.is_ascii_digit() {
            out.push(c);
        } else if c.is_lowercase() {
            if cap_next {
                out.extend(c.to_uppercase());
            } else {
                out.push(c);
            }
        }
        cap_next = SEPARATORS.contains(c);
    }
    out
}

/// Converts a schema or component key into a type name.
///
/// A bare `$` becomes `DollarSign`; a leading digit gets an `N` prefix. The result may be
/// empty; see [`type_name`] for the checked variant.
pub fn schema_name_to_type_name(name: &str) -> String {
    if name == "$" {
        return "DollarSign".to_string();
    }
    let camel = to_camel_case(name);
    if camel.starts_with(|c: char| c.is_ascii_digit()) {
        format!("N{camel}")
    } else {
        camel
    }
}

/// Checked type-level identifier.
pub fn type_name(raw: &str) -> AppResult<String> {
    normalize_identifier(raw, IdentCase::Type)
}

/// Checked value-level identifier.
pub fn field_name(raw: &str) -> AppResult<String> {
    normalize_identifier(raw, IdentCase::Value)
}

/// Normalizes `raw` into a legal identifier for `case`.
///
/// Fails with [`AppError::InvalidIdentifier`] when nothing usable is left, e.g. for
/// `"{}"` or `"--"`.
pub fn normalize_identifier(raw: &str, case: IdentCase) -> AppResult<String> {
    let ident = match case {
        IdentCase::Type => schema_name_to_type_name(raw),
        IdentCase::Value => {
            let snake: String = raw
                .to_snake_case()
                .chars()
                .filter(|c| c.is_alphanumeric() || *c == '_')
                .collect();
            if snake.starts_with(|c: char| c.is_ascii_digit()) {
                format!("n{snake}")
            } else {
                snake
            }
        }
    };

    if ident.is_empty() || ident.chars().all(|c| c == '_') {
        return Err(AppError::InvalidIdentifier(format!(
            "'{}' does not contain any identifier characters",
            raw
        )));
    }

    Ok(escape_keyword(ident))
}

/// Renames reserved words: raw identifiers where the language allows them, a trailing
/// underscore otherwise.
pub fn escape_keyword(ident: String) -> String {
    if NON_RAW_KEYWORDS.contains(&ident.as_str()) {
        format!("{ident}_")
    } else if RUST_KEYWORDS.contains(&ident.as_str()) {
        format!("r#{ident}")
    } else {
        ident
    }
}

/// Prefix applied to operation identifiers so they can start a type name.
pub(crate) fn type_name_prefix(name: &str) -> AppResult<&'static str> {
    match name.chars().next() {
        None => Err(AppError::InvalidIdentifier(
            "operation identifier is empty".to_string(),
        )),
        Some(c) if c.is_ascii_digit() => Ok("N"),
        Some(_) => Ok(""),
    }
}

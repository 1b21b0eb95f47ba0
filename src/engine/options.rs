//! Engine options.
//!
//! [`EngineOptions`] stores the typed values behind the UCI `setoption`
//! surface. The search never reads it directly; it asks an
//! [`OptionSource`] so callers can substitute their own storage.

use crate::board::search::DEFAULT_QUIESCENCE_DEPTH;
use crate::board::{OptionError, Variant};

pub const HASH: &str = "Hash";
pub const MULTI_PV: &str = "MultiPV";
pub const QUIESCENCE_DEPTH: &str = "Quiescence Depth";
pub const UCI_VARIANT: &str = "UCI_Variant";
pub const UCI_CHESS960: &str = "UCI_Chess960";
pub const MOVE_OVERHEAD: &str = "Move Overhead";

pub const DEFAULT_HASH_MB: usize = 16;
const MAX_HASH_MB: i64 = 65536;
const MAX_MULTI_PV: i64 = 64;
const MAX_QUIESCENCE_DEPTH: i64 = 100;
const MAX_MOVE_OVERHEAD_MS: i64 = 5000;

/// Typed option value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OptionValue {
    Int(i64),
    Bool(bool),
    Str(String),
}

/// Named option lookup used by the search.
pub trait OptionSource {
    fn option(&self, name: &str) -> Option<OptionValue>;

    /// Integer option, or `default` when missing or of another type.
    fn int(&self, name: &str, default: i64) -> i64 {
        match self.option(name) {
            Some(OptionValue::Int(v)) => v,
            _ => default,
        }
    }

    fn bool(&self, name: &str, default: bool) -> bool {
        match self.option(name) {
            Some(OptionValue::Bool(v)) => v,
            _ => default,
        }
    }

    fn string(&self, name: &str, default: &str) -> String {
        match self.option(name) {
            Some(OptionValue::Str(v)) => v,
            _ => default.to_string(),
        }
    }
}

/// Side effect the caller must perform after an option changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptionAction {
    ResizeHash(usize),
    ChangeVariant(Variant),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineOptions {
    pub hash_mb: usize,
    pub multi_pv: u32,
    pub quiescence_depth: i32,
    pub variant: Variant,
    pub chess960: bool,
    pub move_overhead_ms: u64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            hash_mb: DEFAULT_HASH_MB,
            multi_pv: 1,
            quiescence_depth: DEFAULT_QUIESCENCE_DEPTH,
            variant: Variant::Standard,
            chess960: false,
            move_overhead_ms: 50,
        }
    }
}

impl OptionSource for EngineOptions {
    fn option(&self, name: &str) -> Option<OptionValue> {
        let value = match normalize(name).as_str() {
            "hash" => OptionValue::Int(self.hash_mb as i64),
            "multipv" => OptionValue::Int(i64::from(self.multi_pv)),
            "quiescence depth" => OptionValue::Int(i64::from(self.quiescence_depth)),
            "uci_variant" => OptionValue::Str(self.variant.name().to_string()),
            "uci_chess960" => OptionValue::Bool(self.chess960),
            "move overhead" => OptionValue::Int(self.move_overhead_ms as i64),
            _ => return None,
        };
        Some(value)
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

fn parse_int(name: &str, value: Option<&str>, min: i64, max: i64) -> Result<i64, OptionError> {
    let raw = value.unwrap_or("").trim();
    let v = raw.parse::<i64>().map_err(|_| OptionError::InvalidValue {
        name: name.to_string(),
        value: raw.to_string(),
    })?;
    if !(min..=max).contains(&v) {
        return Err(OptionError::OutOfRange {
            name: name.to_string(),
            value: v,
            min,
            max,
        });
    }
    Ok(v)
}

fn parse_bool(name: &str, value: Option<&str>) -> Result<bool, OptionError> {
    let raw = value.unwrap_or("").trim();
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(OptionError::InvalidValue {
            name: name.to_string(),
            value: raw.to_string(),
        }),
    }
}

impl EngineOptions {
    /// UCI `option` declarations, one per line.
    #[must_use]
    pub fn declarations(&self) -> Vec<String> {
        let variants: Vec<String> = Variant::ALL
            .iter()
            .map(|v| format!("var {}", v.name()))
            .collect();
        vec![
            format!("option name {HASH} type spin default {} min 1 max {MAX_HASH_MB}", self.hash_mb),
            format!("option name {MULTI_PV} type spin default {} min 1 max {MAX_MULTI_PV}", self.multi_pv),
            format!(
                "option name {QUIESCENCE_DEPTH} type spin default {} min 0 max {MAX_QUIESCENCE_DEPTH}",
                self.quiescence_depth
            ),
            format!(
                "option name {UCI_VARIANT} type combo default {} {}",
                self.variant.name(),
                variants.join(" ")
            ),
            format!("option name {UCI_CHESS960} type check default {}", self.chess960),
            format!(
                "option name {MOVE_OVERHEAD} type spin default {} min 0 max {MAX_MOVE_OVERHEAD_MS}",
                self.move_overhead_ms
            ),
        ]
    }

    /// Apply a `setoption`. Names match case-insensitively.
    pub fn set_option(
        &mut self,
        name: &str,
        value: Option<&str>,
    ) -> Result<Option<OptionAction>, OptionError> {
        match normalize(name).as_str() {
            "hash" => {
                let mb = parse_int(HASH, value, 1, MAX_HASH_MB)? as usize;
                if mb != self.hash_mb {
                    self.hash_mb = mb;
                    return Ok(Some(OptionAction::ResizeHash(mb)));
                }
            }
            "multipv" => {
                self.multi_pv = parse_int(MULTI_PV, value, 1, MAX_MULTI_PV)? as u32;
            }
            "quiescence depth" => {
                self.quiescence_depth =
                    parse_int(QUIESCENCE_DEPTH, value, 0, MAX_QUIESCENCE_DEPTH)? as i32;
            }
            "uci_variant" => {
                let variant: Variant = value.unwrap_or("").trim().parse()?;
                if variant != self.variant {
                    self.variant = variant;
                    return Ok(Some(OptionAction::ChangeVariant(variant)));
                }
            }
            "uci_chess960" => self.chess960 = parse_bool(UCI_CHESS960, value)?,
            "move overhead" => {
                self.move_overhead_ms =
                    parse_int(MOVE_OVERHEAD, value, 0, MAX_MOVE_OVERHEAD_MS)? as u64;
            }
            _ => {
                return Err(OptionError::UnknownOption {
                    name: name.trim().to_string(),
                })
            }
        }
        Ok(None)
    }
}

/// Split the tokens of a `setoption name <name> value <value>` command.
#[must_use]
pub fn parse_setoption(parts: &[&str]) -> Option<(String, Option<String>)> {
    if parts.first() != Some(&"setoption") {
        return None;
    }

    let mut name_parts: Vec<&str> = Vec::new();
    let mut value_parts: Vec<&str> = Vec::new();
    let mut mode = "";

    for part in parts.iter().skip(1) {
        match *part {
            "name" => mode = "name",
            "value" => mode = "value",
            _ => match mode {
                "name" => name_parts.push(part),
                "value" => value_parts.push(part),
                _ => {}
            },
        }
    }

    if name_parts.is_empty() {
        return None;
    }

    let name = name_parts.join(" ");
    let value = (!value_parts.is_empty()).then(|| value_parts.join(" "));
    Some((name, value))
}

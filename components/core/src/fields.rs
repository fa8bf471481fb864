use std::collections::HashSet;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};

use crate::entity::enum_error;
use crate::error::{ValidationError, ValidationResult};
use crate::id::Identifier;

/// Enumerated setting decoded through its serde representation.
pub trait Choice: DeserializeOwned {
    /// Canonical spellings, reported when a value is not recognised.
    const NAMES: &'static [&'static str];
}

/// Typed, path-aware reader over one configuration mapping.
///
/// Every key read is remembered so that [`Fields::finish`] can reject the
/// keys nobody asked for.
pub struct Fields<'a> {
    path: String,
    map: Option<&'a Mapping>,
    seen: HashSet<&'a str>,
}

impl<'a> Fields<'a> {
    /// A `null` value reads as an empty mapping (`decibels:` with no body).
    pub fn new(path: impl Into<String>, value: &'a Value) -> ValidationResult<Self> {
        let path = path.into();
        let map = match value {
            Value::Mapping(map) => Some(map),
            Value::Null => None,
            _ => {
                return Err(ValidationError::TypeMismatch {
                    path,
                    expected: "a mapping",
                })
            }
        };
        Ok(Fields {
            path,
            map,
            seen: HashSet::new(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn child_path(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.path, key)
        }
    }

    pub fn get(&mut self, key: &str) -> Option<&'a Value> {
        let map = self.map?;
        let (stored, value) = map.iter().find(|(k, _)| k.as_str() == Some(key))?;
        if let Some(stored) = stored.as_str() {
            self.seen.insert(stored);
        }
        Some(value)
    }

    fn mismatch<T>(&self, key: &str, expected: &'static str) -> ValidationResult<T> {
        Err(ValidationError::TypeMismatch {
            path: self.child_path(key),
            expected,
        })
    }

    pub fn string(&mut self, key: &str) -> ValidationResult<Option<String>> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(Value::Bool(b)) => Ok(Some(b.to_string())),
            Some(_) => self.mismatch(key, "a string"),
        }
    }

    pub fn bool(&mut self, key: &str) -> ValidationResult<Option<bool>> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(Value::String(s)) => match s.to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "enable" => Ok(Some(true)),
                "false" | "no" | "off" | "disable" => Ok(Some(false)),
                _ => self.mismatch(key, "a boolean"),
            },
            Some(_) => self.mismatch(key, "a boolean"),
        }
    }

    pub fn float(&mut self, key: &str) -> ValidationResult<Option<f64>> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => match n.as_f64() {
                Some(f) if f.is_finite() => Ok(Some(f)),
                _ => self.mismatch(key, "a number"),
            },
            Some(Value::String(s)) => match s.trim().parse::<f64>() {
                Ok(f) if f.is_finite() => Ok(Some(f)),
                _ => self.mismatch(key, "a number"),
            },
            Some(_) => self.mismatch(key, "a number"),
        }
    }

    pub fn unsigned(&mut self, key: &str) -> ValidationResult<Option<u64>> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => match n.as_u64() {
                Some(u) => Ok(Some(u)),
                None => self.mismatch(key, "a positive integer"),
            },
            Some(Value::String(s)) => match parse_unsigned(s) {
                Some(u) => Ok(Some(u)),
                None => self.mismatch(key, "a positive integer"),
            },
            Some(_) => self.mismatch(key, "a positive integer"),
        }
    }

    pub fn choice<T: Choice>(&mut self, key: &str) -> ValidationResult<Option<T>> {
        let Some(value) = self.string(key)? else {
            return Ok(None);
        };
        serde_yaml::from_value(Value::String(value.clone()))
            .map(Some)
            .map_err(|_| enum_error(self.child_path(key), value, T::NAMES))
    }

    pub fn identifier(&mut self, key: &str) -> ValidationResult<Option<Identifier>> {
        match self.string(key)? {
            None => Ok(None),
            Some(s) => match Identifier::parse(&s) {
                Some(id) => Ok(Some(id)),
                None => self.mismatch(key, "an ID made of letters, digits and underscores"),
            },
        }
    }

    /// Accepts `125ms`, `1s`, `2min` and plain integers as milliseconds.
    pub fn duration(&mut self, key: &str) -> ValidationResult<Option<Duration>> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => match n.as_u64() {
                Some(ms) => Ok(Some(Duration::from_millis(ms))),
                None => self.mismatch(key, "a time period"),
            },
            Some(Value::String(s)) => match duration_str::parse(s.trim()) {
                Ok(d) => Ok(Some(d)),
                Err(_) => self.mismatch(key, "a time period"),
            },
            Some(_) => self.mismatch(key, "a time period"),
        }
    }

    pub fn string_list(&mut self, key: &str) -> ValidationResult<Option<Vec<String>>> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Sequence(items)) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::String(s) => out.push(s.clone()),
                        Value::Number(n) => out.push(n.to_string()),
                        _ => return self.mismatch(key, "a list of strings"),
                    }
                }
                Ok(Some(out))
            }
            Some(_) => self.mismatch(key, "a list of strings"),
        }
    }

    /// Fails on the first key in document order that was never read.
    pub fn finish(self) -> ValidationResult<()> {
        let Some(map) = self.map else {
            return Ok(());
        };
        for (key, _) in map {
            match key.as_str() {
                Some(key) if self.seen.contains(key) => {}
                Some(key) => {
                    return Err(ValidationError::UnknownField {
                        path: self.child_path(key),
                    })
                }
                None => {
                    return Err(ValidationError::TypeMismatch {
                        path: self.path.clone(),
                        expected: "string keys",
                    })
                }
            }
        }
        Ok(())
    }
}

fn parse_unsigned(value: &str) -> Option<u64> {
    let value = value.trim();
    if let Some(hex) = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        u64::from_str_radix(hex, 16).ok()
    } else {
        value.parse().ok()
    }
}

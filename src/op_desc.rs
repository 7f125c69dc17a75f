//! Graph-level description of one op: argument names and attributes.

use crate::error::Error;

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
#[cfg(feature = "serialization")]
use std::fs::File;
#[cfg(feature = "serialization")]
use std::io::{BufReader, BufWriter};
#[cfg(feature = "serialization")]
use std::path::Path;

/// A typed attribute value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serialization", serde(untagged))]
pub enum Attribute {
    Bool(bool),
    Int(i32),
    Float(f32),
    String(String),
    Ints(Vec<i32>),
}

impl Attribute {
    fn kind(&self) -> &'static str {
        match self {
            Attribute::Bool(_) => "bool",
            Attribute::Int(_) => "int",
            Attribute::Float(_) => "float",
            Attribute::String(_) => "string",
            Attribute::Ints(_) => "ints",
        }
    }
}

impl From<bool> for Attribute {
    fn from(v: bool) -> Self {
        Attribute::Bool(v)
    }
}

impl From<i32> for Attribute {
    fn from(v: i32) -> Self {
        Attribute::Int(v)
    }
}

impl From<f32> for Attribute {
    fn from(v: f32) -> Self {
        Attribute::Float(v)
    }
}

impl From<&str> for Attribute {
    fn from(v: &str) -> Self {
        Attribute::String(v.to_string())
    }
}

impl From<Vec<i32>> for Attribute {
    fn from(v: Vec<i32>) -> Self {
        Attribute::Ints(v)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct OpDesc {
    #[cfg_attr(feature = "serialization", serde(rename = "type"))]
    pub op_type: String,
    #[cfg_attr(feature = "serialization", serde(default))]
    pub inputs: BTreeMap<String, Vec<String>>,
    #[cfg_attr(feature = "serialization", serde(default))]
    pub outputs: BTreeMap<String, Vec<String>>,
    #[cfg_attr(feature = "serialization", serde(default))]
    pub attrs: BTreeMap<String, Attribute>,
}

impl OpDesc {
    pub fn new(op_type: &str) -> Self {
        Self {
            op_type: op_type.to_string(),
            ..Default::default()
        }
    }

    pub fn with_input(mut self, param: &str, args: &[&str]) -> Self {
        self.inputs
            .insert(param.to_string(), args.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn with_output(mut self, param: &str, args: &[&str]) -> Self {
        self.outputs
            .insert(param.to_string(), args.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<Attribute>) -> Self {
        self.attrs.insert(name.to_string(), value.into());
        self
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<Attribute>) {
        self.attrs.insert(name.to_string(), value.into());
    }

    /// First argument bound to input parameter `param`.
    pub fn input(&self, param: &str) -> Result<&str, Error> {
        Self::first_arg(&self.op_type, &self.inputs, param)
    }

    /// First argument bound to output parameter `param`.
    pub fn output(&self, param: &str) -> Result<&str, Error> {
        Self::first_arg(&self.op_type, &self.outputs, param)
    }

    fn first_arg<'a>(
        op: &str,
        args: &'a BTreeMap<String, Vec<String>>,
        param: &str,
    ) -> Result<&'a str, Error> {
        args.get(param)
            .and_then(|names| names.first())
            .map(String::as_str)
            .ok_or_else(|| Error::MissingArgument {
                op: op.to_string(),
                argument: param.to_string(),
            })
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    pub fn attr(&self, name: &str) -> Result<&Attribute, Error> {
        self.attrs.get(name).ok_or_else(|| Error::MissingAttribute {
            op: self.op_type.clone(),
            name: name.to_string(),
        })
    }

    fn wrong_kind(&self, name: &str, expected: &str, found: &Attribute) -> Error {
        Error::InvalidAttribute {
            op: self.op_type.clone(),
            name: name.to_string(),
            reason: format!("expected {}, found {} ({:?})", expected, found.kind(), found),
        }
    }

    pub fn get_attr_i32(&self, name: &str) -> Result<i32, Error> {
        match self.attr(name)? {
            Attribute::Int(v) => Ok(*v),
            other => Err(self.wrong_kind(name, "int", other)),
        }
    }

    pub fn get_attr_f32(&self, name: &str) -> Result<f32, Error> {
        match self.attr(name)? {
            Attribute::Float(v) => Ok(*v),
            other => Err(self.wrong_kind(name, "float", other)),
        }
    }

    #[cfg(feature = "serialization")]
    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(|e| Error::DeserializationError(e.to_string()))
    }

    #[cfg(feature = "serialization")]
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self).map_err(|e| Error::SerializationError(e.to_string()))
    }

    /// Reads an op description from a JSON file.
    #[cfg(feature = "serialization")]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let reader = BufReader::new(File::open(path)?);
        serde_json::from_reader(reader).map_err(|e| Error::DeserializationError(e.to_string()))
    }

    #[cfg(feature = "serialization")]
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| Error::SerializationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_getters() {
        let desc = OpDesc::new("plugin_add")
            .with_attr("axis", -1)
            .with_attr("flag", true);
        assert_eq!(desc.get_attr_i32("axis").unwrap(), -1);
        assert!(matches!(
            desc.get_attr_i32("flag"),
            Err(Error::InvalidAttribute { .. })
        ));
        assert!(matches!(
            desc.get_attr_i32("missing"),
            Err(Error::MissingAttribute { .. })
        ));
    }

    #[test]
    fn test_first_argument() {
        let desc = OpDesc::new("plugin_add").with_input("X", &["a", "b"]);
        assert_eq!(desc.input("X").unwrap(), "a");
        assert!(matches!(
            desc.input("Y"),
            Err(Error::MissingArgument { .. })
        ));
        let empty = OpDesc::new("plugin_add").with_output("Out", &[]);
        assert!(empty.output("Out").is_err());
    }
}

//! Named variables an op reads its tensors from.

use crate::error::Error;
use crate::tensor::Tensor;
use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
pub struct Scope {
    vars: HashMap<String, Tensor>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, tensor: Tensor) -> Option<Tensor> {
        self.vars.insert(name.to_string(), tensor)
    }

    pub fn find_var(&self, name: &str) -> Option<Tensor> {
        self.vars.get(name).cloned()
    }

    /// Looks up an existing variable.
    pub fn var(&self, name: &str) -> Result<Tensor, Error> {
        self.find_var(name)
            .ok_or_else(|| Error::VariableNotFound(name.to_string()))
    }

    /// Returns the variable, creating an empty tensor under `name` if absent.
    pub fn new_var(&mut self, name: &str) -> Tensor {
        self.vars
            .entry(name.to_string())
            .or_insert_with(Tensor::empty)
            .clone()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

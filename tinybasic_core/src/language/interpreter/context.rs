use std::collections::HashMap;
use super::value::Value;

/// Name to value bindings that outlive a single block.
#[derive(Debug, Clone, Default)]
pub struct VariableStore {
    variables: HashMap<String, Value>,
}

impl VariableStore {
    pub fn new() -> Self {
        VariableStore {
            variables: HashMap::new(),
        }
    }

    pub fn set_variable(&mut self, name: &str, value: Value) {
        self.variables.insert(name.to_string(), value);
    }

    pub fn get_variable(&self, name: &str) -> Option<Value> {
        self.variables.get(name).copied()
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Bindings ordered by name.
    pub fn sorted(&self) -> Vec<(&str, Value)> {
        let mut entries: Vec<(&str, Value)> = self
            .variables
            .iter()
            .map(|(name, value)| (name.as_str(), *value))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

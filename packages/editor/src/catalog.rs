use serde::{Deserialize, Serialize};

/// A variable the host offers for insertion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableDescriptor {
    /// Expression placed inside the placeholder
    pub name: String,

    #[serde(default)]
    pub description: String,
}

impl VariableDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Read-only list of variables supplied by the host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableCatalog {
    variables: Vec<VariableDescriptor>,
}

impl VariableCatalog {
    pub fn new(variables: Vec<VariableDescriptor>) -> Self {
        Self { variables }
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VariableDescriptor> {
        self.variables.iter()
    }

    pub fn get(&self, name: &str) -> Option<&VariableDescriptor> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Case-insensitive substring match on name or description, in catalog
    /// order. An empty term matches everything.
    pub fn filter(&self, term: &str) -> Vec<&VariableDescriptor> {
        let term = term.to_lowercase();
        self.variables
            .iter()
            .filter(|v| {
                term.is_empty()
                    || v.name.to_lowercase().contains(&term)
                    || v.description.to_lowercase().contains(&term)
            })
            .collect()
    }
}

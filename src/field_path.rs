// Structured field paths for validation errors
//
// Every finding produced by the validators is scoped to the field it refers
// to, e.g. `spec.rules[2].exclude.any[0].resources.kinds`. Paths are built by
// appending children and indices to a root, and are cheap to clone.

use serde::{Deserialize, Serialize};

/// A single step in a field path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathElement {
    /// Named child field
    Field(String),
    /// Position in a list
    Index(usize),
    /// Key in a map
    Key(String),
}

/// Path to a field inside a policy document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldPath(Vec<PathElement>);

impl FieldPath {
    /// Creates a path rooted at `name`.
    pub fn new(name: impl Into<String>) -> Self {
        FieldPath(vec![PathElement::Field(name.into())])
    }

    /// Creates an empty path. Displays as `<root>`.
    pub fn root() -> Self {
        FieldPath(Vec::new())
    }

    /// Returns a new path with a named child appended.
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut elements = self.0.clone();
        elements.push(PathElement::Field(name.into()));
        FieldPath(elements)
    }

    /// Returns a new path with a list index appended.
    pub fn index(&self, index: usize) -> Self {
        let mut elements = self.0.clone();
        elements.push(PathElement::Index(index));
        FieldPath(elements)
    }

    /// Returns a new path with a map key appended.
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut elements = self.0.clone();
        elements.push(PathElement::Key(key.into()));
        FieldPath(elements)
    }

    pub fn elements(&self) -> &[PathElement] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return write!(f, "<root>");
        }
        for (i, element) in self.0.iter().enumerate() {
            match element {
                PathElement::Field(name) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", name)?;
                }
                PathElement::Index(index) => write!(f, "[{}]", index)?,
                PathElement::Key(key) => write!(f, "[{}]", key)?,
            }
        }
        Ok(())
    }
}

impl From<&str> for FieldPath {
    fn from(s: &str) -> Self {
        FieldPath::new(s)
    }
}

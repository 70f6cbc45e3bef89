//! Name + type metadata shared by properties, methods and classes.

use mirror_core::TypeIdentity;

/// The `{name, type}` pair every reflected entity carries.
///
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTypeInfo {
    name: String,
    type_id: TypeIdentity,
}

impl NameTypeInfo {
    /// Create the metadata.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty.
    pub fn new(name: impl Into<String>, type_id: TypeIdentity) -> Self {
        let name = name.into();
        assert!(!name.is_empty(), "reflected names must not be empty");
        Self { name, type_id }
    }

    /// Entity name, never empty.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identity of the entity's type.
    pub fn type_identity(&self) -> TypeIdentity {
        self.type_id
    }

    /// Diagnostic dump: name at `indent`, type one column deeper.
    pub fn dump(&self, indent: usize) -> String {
        format!(
            "{}name: {}\n{}type: {}\n",
            pad(indent),
            self.name,
            pad(indent + 1),
            self.type_id.name()
        )
    }
}

/// Indentation prefix for diagnostic dumps.
pub(crate) fn pad(indent: usize) -> String {
    " ".repeat(indent)
}

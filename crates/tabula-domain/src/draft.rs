//! Schema draft - the user-edited, not yet committed field list

use crate::field::{FieldAttribute, FieldDefinition, SchemaDefinition};
use thiserror::Error;

/// Class name used when the user does not pick one
pub const DEFAULT_CLASS_NAME: &str = "SingleData";

/// Reasons a draft mutation was refused
///
/// A refused mutation never changes the draft.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    /// The schema has been committed and is read-only
    #[error("Schema is already created and can no longer be edited")]
    Frozen,

    /// Index does not address an existing field
    #[error("Field index {index} out of range (draft has {len} fields)")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Current field count
        len: usize,
    },

    /// Removing the field would leave the schema empty
    #[error("A schema must keep at least one field")]
    LastField,
}

/// Ordered field definitions plus the record class name
///
/// Field order is significant: it becomes positional field order in the
/// compiled schema. Once [`SchemaDraft::freeze`] has been called every
/// mutation is refused for the rest of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDraft {
    class_name: String,
    fields: Vec<FieldDefinition>,
    frozen: bool,
}

impl SchemaDraft {
    /// Create an unfrozen draft from explicit fields
    pub fn new(class_name: impl Into<String>, fields: Vec<FieldDefinition>) -> Self {
        Self {
            class_name: class_name.into(),
            fields,
            frozen: false,
        }
    }

    /// The seed draft a fresh session starts with
    pub fn seeded() -> Self {
        Self::new(
            DEFAULT_CLASS_NAME,
            vec![
                FieldDefinition::new("name", "str", "name of the person"),
                FieldDefinition::new("price", "int", "price for a service"),
                FieldDefinition::new("gender", "bool", "return true if he is male"),
                FieldDefinition::new("list_of_suggest", "List[str]", "list of subject names"),
            ],
        )
    }

    /// Record class name
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Fields in positional order
    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the draft has no fields (only reachable via [`SchemaDraft::new`])
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether the draft has been committed
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Whether [`SchemaDraft::remove_field`] would currently be accepted
    pub fn can_remove(&self) -> bool {
        !self.frozen && self.fields.len() > 1
    }

    /// Rename the record class
    pub fn set_class_name(&mut self, class_name: impl Into<String>) -> Result<(), DraftError> {
        self.ensure_editable()?;
        self.class_name = class_name.into();
        Ok(())
    }

    /// Append an empty field of type `str`
    pub fn add_field(&mut self) -> Result<(), DraftError> {
        self.ensure_editable()?;
        self.fields.push(FieldDefinition::blank());
        Ok(())
    }

    /// Replace one attribute of one field
    pub fn update_field(
        &mut self,
        index: usize,
        attribute: FieldAttribute,
        value: impl Into<String>,
    ) -> Result<(), DraftError> {
        self.ensure_editable()?;
        let len = self.fields.len();
        let field = self
            .fields
            .get_mut(index)
            .ok_or(DraftError::IndexOutOfRange { index, len })?;
        field.set(attribute, value.into());
        Ok(())
    }

    /// Remove one field, never dropping below one
    pub fn remove_field(&mut self, index: usize) -> Result<(), DraftError> {
        self.ensure_editable()?;
        let len = self.fields.len();
        if index >= len {
            return Err(DraftError::IndexOutOfRange { index, len });
        }
        if len <= 1 {
            return Err(DraftError::LastField);
        }
        self.fields.remove(index);
        Ok(())
    }

    /// Make the draft read-only; irreversible
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Wire representation: ordered `[name, type, description]` triples
    pub fn as_triples(&self) -> Vec<[String; 3]> {
        self.fields.iter().map(FieldDefinition::to_triple).collect()
    }

    /// Snapshot as a serializable schema file
    pub fn to_definition(&self) -> SchemaDefinition {
        SchemaDefinition {
            class_name: self.class_name.clone(),
            fields: self.fields.clone(),
        }
    }

    fn ensure_editable(&self) -> Result<(), DraftError> {
        if self.frozen {
            Err(DraftError::Frozen)
        } else {
            Ok(())
        }
    }
}

impl Default for SchemaDraft {
    fn default() -> Self {
        Self::seeded()
    }
}

impl From<SchemaDefinition> for SchemaDraft {
    fn from(definition: SchemaDefinition) -> Self {
        Self::new(definition.class_name, definition.fields)
    }
}

//! Field definitions - the building blocks of an extraction schema

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type annotation attached to a schema field
///
/// The remote service compiles these spellings verbatim into its record
/// model, so only this fixed set is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TypeTag {
    /// `str`
    #[default]
    Str,
    /// `int`
    Int,
    /// `float`
    Float,
    /// `bool`
    Bool,
    /// `List[str]`
    ListStr,
    /// `List[int]`
    ListInt,
    /// `Dict[str,Any]`
    DictStrAny,
    /// `Optional[str]`
    OptionalStr,
}

impl TypeTag {
    /// Every accepted tag, in display order
    pub const ALL: [TypeTag; 8] = [
        TypeTag::Str,
        TypeTag::Int,
        TypeTag::Float,
        TypeTag::Bool,
        TypeTag::ListStr,
        TypeTag::ListInt,
        TypeTag::DictStrAny,
        TypeTag::OptionalStr,
    ];

    /// Get the canonical spelling sent over the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTag::Str => "str",
            TypeTag::Int => "int",
            TypeTag::Float => "float",
            TypeTag::Bool => "bool",
            TypeTag::ListStr => "List[str]",
            TypeTag::ListInt => "List[int]",
            TypeTag::DictStrAny => "Dict[str,Any]",
            TypeTag::OptionalStr => "Optional[str]",
        }
    }

    /// Parse a tag from its canonical spelling
    ///
    /// Surrounding whitespace is ignored; everything else must match exactly.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.iter().copied().find(|tag| tag.as_str() == s)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TypeTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid field type: {}", s))
    }
}

/// One field of a schema draft
///
/// `field_type` keeps the raw spelling so that drafts loaded from files can
/// carry an unknown type; [`crate::validate_schema`] reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Field name in the compiled record model
    pub name: String,

    /// Type spelling, expected to be one of [`TypeTag::ALL`]
    #[serde(rename = "type")]
    pub field_type: String,

    /// Natural-language hint for the extraction model
    pub description: String,
}

impl FieldDefinition {
    /// Create a field definition
    pub fn new(
        name: impl Into<String>,
        field_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            description: description.into(),
        }
    }

    /// Empty field with the default `str` type, as appended by "add field"
    pub fn blank() -> Self {
        Self::new("", TypeTag::default().as_str(), "")
    }

    /// Parsed type tag, if the spelling is known
    pub fn type_tag(&self) -> Option<TypeTag> {
        TypeTag::parse(&self.field_type)
    }

    /// Replace a single attribute
    pub fn set(&mut self, attribute: FieldAttribute, value: String) {
        match attribute {
            FieldAttribute::Name => self.name = value,
            FieldAttribute::Type => self.field_type = value,
            FieldAttribute::Description => self.description = value,
        }
    }

    /// Wire representation: `[name, type, description]`
    pub fn to_triple(&self) -> [String; 3] {
        [
            self.name.clone(),
            self.field_type.clone(),
            self.description.clone(),
        ]
    }
}

/// Editable attribute of a [`FieldDefinition`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldAttribute {
    /// The field name
    Name,
    /// The type spelling
    Type,
    /// The description
    Description,
}

impl FieldAttribute {
    /// Parse an attribute name (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "name" => Some(FieldAttribute::Name),
            "type" => Some(FieldAttribute::Type),
            "description" | "desc" => Some(FieldAttribute::Description),
            _ => None,
        }
    }
}

/// Serializable schema file contents
///
/// ```toml
/// class_name = "Person"
///
/// [[fields]]
/// name = "age"
/// type = "int"
/// description = "age in years"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    /// Name of the generated record class
    pub class_name: String,

    /// Ordered field list
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

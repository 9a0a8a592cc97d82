use crate::data::query::QueryExecutionError;
use crate::data::store::{Attribute, ValueType};

use itertools::Itertools;
use thiserror::Error;

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

/// The meta field every object type implicitly has.
pub const TYPENAME_FIELD: &str = "__typename";

/// Fields whose name starts with this prefix are introspection fields and
/// never map to an attribute of their own.
pub const META_FIELD_PREFIX: &str = "__";

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SchemaValidationError {
    #[error("Type `{0}` is registered more than once")]
    DuplicateType(String),
    #[error("Type `{0}`: id attribute `{1}` is not an attribute of the type")]
    IdNotAnAttribute(String, String), // (type_name, id_attribute)
    #[error("Type `{0}`, field `{1}`: attribute `{2}` is not defined")]
    FieldAttributeUnknown(String, String, String), // (type_name, field_name, attribute)
    #[error("Type `{0}`, field `{1}`: type `{2}` is not defined")]
    FieldTypeUnknown(String, String, String), // (type_name, field_name, field_type)
    #[error("Type `{0}`: possible type `{1}` is not defined")]
    PossibleTypeUnknown(String, String),
    #[error("Invalid field type `{0}`")]
    InvalidFieldType(String),
}

/// The GraphQL type of a field, e.g. `[Cat!]!`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FieldType {
    Named(String),
    List(Box<FieldType>),
    NonNull(Box<FieldType>),
}

impl FieldType {
    pub fn named(name: impl Into<String>) -> Self {
        FieldType::Named(name.into())
    }

    /// The name of the innermost type, with all list and non-null wrappers
    /// removed.
    pub fn named_type(&self) -> &str {
        match self {
            FieldType::Named(name) => name.as_str(),
            FieldType::List(inner) | FieldType::NonNull(inner) => inner.named_type(),
        }
    }

    pub fn is_list(&self) -> bool {
        match self {
            FieldType::Named(_) => false,
            FieldType::List(_) => true,
            FieldType::NonNull(inner) => inner.is_list(),
        }
    }
}

impl FromStr for FieldType {
    type Err = SchemaValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SchemaValidationError::InvalidFieldType(s.to_string());
        let trimmed = s.trim();
        if let Some(inner) = trimmed.strip_suffix('!') {
            let inner = inner.parse::<FieldType>().map_err(|_| invalid())?;
            return match inner {
                FieldType::NonNull(_) => Err(invalid()),
                inner => Ok(FieldType::NonNull(Box::new(inner))),
            };
        }
        if let Some(inner) = trimmed.strip_prefix('[') {
            let inner = inner.strip_suffix(']').ok_or_else(invalid)?;
            let inner = inner.parse::<FieldType>().map_err(|_| invalid())?;
            return Ok(FieldType::List(Box::new(inner)));
        }
        let is_name = trimmed
            .chars()
            .enumerate()
            .all(|(i, c)| c == '_' || c.is_ascii_alphabetic() || (i > 0 && c.is_ascii_digit()));
        if trimmed.is_empty() || !is_name {
            return Err(invalid());
        }
        Ok(FieldType::Named(trimmed.to_string()))
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FieldType::Named(name) => write!(f, "{}", name),
            FieldType::List(inner) => write!(f, "[{}]", inner),
            FieldType::NonNull(inner) => write!(f, "{}!", inner),
        }
    }
}

/// What is known about one type: its attributes, how its fields map onto
/// them, and which fields lead to other types.
///
/// Fields that are neither mapped nor typed are computed fields; they never
/// contribute to a fetch plan.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeDescriptor {
    name: String,
    id_attribute: Option<Attribute>,
    attributes: Vec<Attribute>,
    fields: BTreeMap<String, Attribute>,
    field_types: BTreeMap<String, FieldType>,
    possible_types: BTreeSet<String>,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        TypeDescriptor {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Declare `attribute` as the id attribute. It is also registered as an
    /// attribute and as a field of the same name.
    pub fn id(mut self, attribute: impl Into<Attribute>) -> Self {
        let attribute = attribute.into();
        self = self.attribute(attribute.clone());
        self.id_attribute = Some(attribute);
        self
    }

    /// Register an attribute exposed as a field of the same name.
    pub fn attribute(mut self, attribute: impl Into<Attribute>) -> Self {
        let attribute = attribute.into();
        if !self.attributes.contains(&attribute) {
            self.attributes.push(attribute.clone());
        }
        self.fields.insert(attribute.clone(), attribute);
        self
    }

    /// Expose `attribute` under the field name `field`.
    pub fn field(mut self, field: impl Into<String>, attribute: impl Into<Attribute>) -> Self {
        self.fields.insert(field.into(), attribute.into());
        self
    }

    /// Register an attribute whose values are of another registered type.
    pub fn relation(
        mut self,
        field: impl Into<String>,
        attribute: impl Into<Attribute>,
        field_type: FieldType,
    ) -> Self {
        let field = field.into();
        let attribute = attribute.into();
        if !self.attributes.contains(&attribute) {
            self.attributes.push(attribute.clone());
        }
        self.fields.insert(field.clone(), attribute);
        self.field_types.insert(field, field_type);
        self
    }

    /// Declare the type of a field that has no attribute, like the `edges`
    /// field of a connection type.
    pub fn field_type(mut self, field: impl Into<String>, field_type: FieldType) -> Self {
        self.field_types.insert(field.into(), field_type);
        self
    }

    /// Declare a concrete type an interface or union can resolve to.
    pub fn possible_type(mut self, name: impl Into<String>) -> Self {
        self.possible_types.insert(name.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id_attribute(&self) -> Option<&str> {
        self.id_attribute.as_deref()
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// The attribute behind `field`, `None` for computed fields.
    pub fn attribute_for(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn type_of(&self, field: &str) -> Option<&FieldType> {
        self.field_types.get(field)
    }

    /// The concrete types in sorted order.
    pub fn possible_types(&self) -> impl Iterator<Item = &str> {
        self.possible_types.iter().map(String::as_str)
    }

    fn validate(&self, types: &BTreeMap<String, TypeDescriptor>) -> Vec<SchemaValidationError> {
        let mut errors = Vec::new();
        if let Some(id) = &self.id_attribute {
            if !self.attributes.contains(id) {
                errors.push(SchemaValidationError::IdNotAnAttribute(
                    self.name.clone(),
                    id.clone(),
                ));
            }
        }
        for (field, attribute) in &self.fields {
            if !self.attributes.contains(attribute) {
                errors.push(SchemaValidationError::FieldAttributeUnknown(
                    self.name.clone(),
                    field.clone(),
                    attribute.clone(),
                ));
            }
        }
        for (field, field_type) in &self.field_types {
            if !types.contains_key(field_type.named_type()) {
                errors.push(SchemaValidationError::FieldTypeUnknown(
                    self.name.clone(),
                    field.clone(),
                    field_type.named_type().to_string(),
                ));
            }
        }
        for possible in &self.possible_types {
            if !types.contains_key(possible) {
                errors.push(SchemaValidationError::PossibleTypeUnknown(
                    self.name.clone(),
                    possible.clone(),
                ));
            }
        }
        errors
    }
}

/// The read-only registry of types and field mappings that fetch planning
/// and element type resolution work against. Build it once at startup with
/// `SchemaDescriptor::builder()` and share it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemaDescriptor {
    types: BTreeMap<String, TypeDescriptor>,
    cursor_value_types: HashSet<ValueType>,
}

impl SchemaDescriptor {
    pub fn builder() -> SchemaDescriptorBuilder {
        SchemaDescriptorBuilder::default()
    }

    pub fn get(&self, type_name: &str) -> Option<&TypeDescriptor> {
        self.types.get(type_name)
    }

    pub fn has_type(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.values()
    }

    /// The attribute behind `type_name.field`. Fails if the type is not
    /// registered; `Ok(None)` means the field is computed.
    pub fn attribute_for(
        &self,
        type_name: &str,
        field: &str,
    ) -> Result<Option<&str>, QueryExecutionError> {
        self.types
            .get(type_name)
            .map(|t| t.attribute_for(field))
            .ok_or_else(|| QueryExecutionError::UnmappableTypeError(type_name.to_string()))
    }

    pub fn id_attribute(&self, type_name: &str) -> Option<&str> {
        self.types.get(type_name).and_then(|t| t.id_attribute())
    }

    pub fn field_type(&self, type_name: &str, field: &str) -> Option<&FieldType> {
        self.types.get(type_name).and_then(|t| t.type_of(field))
    }

    /// The value types that may appear in a cursor's key tuple. `Null` is
    /// always permitted and is not part of this set.
    pub fn cursor_value_types(&self) -> &HashSet<ValueType> {
        &self.cursor_value_types
    }
}

#[derive(Debug, Default)]
pub struct SchemaDescriptorBuilder {
    types: Vec<TypeDescriptor>,
    cursor_value_types: HashSet<ValueType>,
}

impl SchemaDescriptorBuilder {
    pub fn add_type(mut self, type_descriptor: TypeDescriptor) -> Self {
        self.types.push(type_descriptor);
        self
    }

    pub fn allow_cursor_value(mut self, value_type: ValueType) -> Self {
        self.cursor_value_types.insert(value_type);
        self
    }

    pub fn allow_cursor_values(mut self, value_types: impl IntoIterator<Item = ValueType>) -> Self {
        self.cursor_value_types.extend(value_types);
        self
    }

    /// Validate the registered types. All problems are reported, not just
    /// the first one.
    pub fn build(self) -> Result<SchemaDescriptor, Vec<SchemaValidationError>> {
        let mut errors = Vec::new();
        let mut types = BTreeMap::new();
        for t in self.types {
            if types.contains_key(&t.name) {
                errors.push(SchemaValidationError::DuplicateType(t.name.clone()));
                continue;
            }
            types.insert(t.name.clone(), t);
        }
        errors.extend(types.values().flat_map(|t| t.validate(&types)));

        if errors.is_empty() {
            Ok(SchemaDescriptor {
                types,
                cursor_value_types: self.cursor_value_types,
            })
        } else {
            Err(errors)
        }
    }
}

impl fmt::Display for SchemaDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.types.keys().join(", "))
    }
}

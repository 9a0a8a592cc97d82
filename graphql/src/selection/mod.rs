//! Turning the selection set of a query into the attribute paths that need
//! to be fetched.

use graphql_parser::query as q;
use itertools::Itertools;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

use graph::prelude::*;

mod plan;

pub use self::plan::SelectionPlanResolver;

/// One field of a selection set, identified by the chain of
/// `(type, field)` pairs that leads to it from the queried field.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SelectionField {
    segments: Vec<(String, String)>,
    is_leaf: bool,
    possible_types: BTreeSet<String>,
}

impl SelectionField {
    pub fn new(segments: Vec<(String, String)>, is_leaf: bool) -> Self {
        SelectionField {
            segments,
            is_leaf,
            possible_types: BTreeSet::new(),
        }
    }

    /// Parse a leaf field from its qualified name, e.g.
    /// `Cat.owner/Person.name`.
    pub fn leaf(qualified_name: &str) -> Result<Self, Error> {
        qualified_name.parse()
    }

    /// Parse a field with subselections from its qualified name.
    pub fn object(qualified_name: &str) -> Result<Self, Error> {
        let mut field: SelectionField = qualified_name.parse()?;
        field.is_leaf = false;
        Ok(field)
    }

    /// The concrete types the field's parent can resolve to. Only used for
    /// meta fields like `__typename`.
    pub fn with_possible_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.possible_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn segments(&self) -> &[(String, String)] {
        &self.segments
    }

    pub fn is_leaf(&self) -> bool {
        self.is_leaf
    }

    pub fn possible_types(&self) -> &BTreeSet<String> {
        &self.possible_types
    }

    pub fn type_name(&self) -> Option<&str> {
        self.segments.last().map(|(t, _)| t.as_str())
    }

    pub fn field_name(&self) -> Option<&str> {
        self.segments.last().map(|(_, f)| f.as_str())
    }

    /// `Type.field/Type.field/...`
    pub fn qualified_name(&self) -> String {
        self.segments
            .iter()
            .map(|(t, f)| format!("{}.{}", t, f))
            .join("/")
    }

    /// The field names only, `field/field/...`
    pub fn path(&self) -> String {
        self.segments.iter().map(|(_, f)| f).join("/")
    }

    /// Whether the field lies strictly below `element_root`, a `/`
    /// separated list of field names. Every field lies below the empty root.
    pub fn is_below(&self, element_root: &[&str]) -> bool {
        self.segments.len() > element_root.len()
            && self
                .segments
                .iter()
                .zip(element_root)
                .all(|((_, field), root)| field == root)
    }
}

impl FromStr for SelectionField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments = s
            .split('/')
            .map(|segment| match segment.split_once('.') {
                Some((t, f)) if !t.is_empty() && !f.is_empty() => {
                    Ok((t.to_string(), f.to_string()))
                }
                _ => Err(anyhow!(
                    "invalid selection segment `{}`, expected `Type.field`",
                    segment
                )),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SelectionField::new(segments, true))
    }
}

impl fmt::Display for SelectionField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.qualified_name())
    }
}

/// Flatten the selection set of a field of type `type_name` into the list
/// of selected fields, leaves and objects alike.
///
/// Inline fragments and fragment spreads switch to the type of their type
/// condition. Directives are not evaluated, so fields under `@skip` or
/// `@include` are always part of the result. Subselections of fields whose
/// type is not registered are not descended into. A fragment that spreads
/// itself, directly or through other fragments, fails with
/// `CyclicalFragment`.
pub fn collect_fields(
    schema: &SchemaDescriptor,
    type_name: &str,
    selection_set: &q::SelectionSet<'static, String>,
    fragments: &[q::FragmentDefinition<'static, String>],
) -> Result<Vec<SelectionField>, QueryExecutionError> {
    let mut fields = BTreeSet::new();
    collect_into(
        schema,
        type_name,
        selection_set,
        fragments,
        &[],
        &HashSet::new(),
        &mut fields,
    )?;
    Ok(fields.into_iter().collect())
}

fn collect_into<'a>(
    schema: &SchemaDescriptor,
    type_name: &str,
    selection_set: &'a q::SelectionSet<'static, String>,
    fragments: &'a [q::FragmentDefinition<'static, String>],
    parent: &[(String, String)],
    visited_fragments: &HashSet<&'a str>,
    fields: &mut BTreeSet<SelectionField>,
) -> Result<(), QueryExecutionError> {
    let type_descriptor = schema
        .get(type_name)
        .ok_or_else(|| QueryExecutionError::UnmappableTypeError(type_name.to_string()))?;

    for selection in &selection_set.items {
        match selection {
            q::Selection::Field(field) => {
                let mut segments = parent.to_vec();
                segments.push((type_name.to_string(), field.name.clone()));
                let is_leaf = field.selection_set.items.is_empty();

                let mut selected = SelectionField::new(segments.clone(), is_leaf);
                if field.name.starts_with(META_FIELD_PREFIX) {
                    selected = selected.with_possible_types(type_descriptor.possible_types());
                }
                fields.insert(selected);

                if !is_leaf {
                    if let Some(field_type) = type_descriptor.type_of(&field.name) {
                        collect_into(
                            schema,
                            field_type.named_type(),
                            &field.selection_set,
                            fragments,
                            &segments,
                            visited_fragments,
                            fields,
                        )?;
                    }
                }
            }
            q::Selection::InlineFragment(fragment) => {
                let type_name = match &fragment.type_condition {
                    Some(q::TypeCondition::On(name)) => name.as_str(),
                    None => type_name,
                };
                collect_into(
                    schema,
                    type_name,
                    &fragment.selection_set,
                    fragments,
                    parent,
                    visited_fragments,
                    fields,
                )?;
            }
            q::Selection::FragmentSpread(spread) => {
                if let Some(fragment) = fragments.iter().find(|f| f.name == spread.fragment_name) {
                    // Copy `visited_fragments` on write; the same fragment may
                    // be spread more than once without forming a cycle.
                    let mut visited_fragments = visited_fragments.clone();
                    if !visited_fragments.insert(spread.fragment_name.as_str()) {
                        return Err(QueryExecutionError::CyclicalFragment(
                            spread.fragment_name.clone(),
                        ));
                    }
                    let q::TypeCondition::On(name) = &fragment.type_condition;
                    collect_into(
                        schema,
                        name,
                        &fragment.selection_set,
                        fragments,
                        parent,
                        &visited_fragments,
                        fields,
                    )?;
                }
            }
        }
    }
    Ok(())
}

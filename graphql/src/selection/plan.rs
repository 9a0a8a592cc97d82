use graph::prelude::*;

use super::SelectionField;

/// Computes fetch plans against one schema descriptor.
///
/// The attribute path of a field only depends on the field and the element
/// root, so paths are memoized per resolver.
#[derive(Debug)]
pub struct SelectionPlanResolver {
    logger: Logger,
    schema: Arc<SchemaDescriptor>,
    paths: MemoCache<(String, SelectionField), Option<String>>,
}

impl SelectionPlanResolver {
    pub fn new(logger: &Logger, schema: Arc<SchemaDescriptor>, cache_size: usize) -> Self {
        SelectionPlanResolver {
            logger: logger.new(o!("component" => "SelectionPlanResolver")),
            schema,
            paths: MemoCache::new(cache_size),
        }
    }

    pub fn schema(&self) -> &Arc<SchemaDescriptor> {
        &self.schema
    }

    /// The attribute paths needed for the leaf `fields` below
    /// `element_root`, a `/` separated list of field names that is stripped
    /// from each field before mapping it. Fields without a backing attribute
    /// are left out.
    pub fn resolve(
        &self,
        fields: &[SelectionField],
        element_root: &str,
    ) -> Result<FetchPlan, QueryExecutionError> {
        let root: Vec<&str> = if element_root.is_empty() {
            vec![]
        } else {
            element_root.split('/').collect()
        };

        let mut plan = FetchPlan::new();
        for field in fields {
            if !field.is_leaf() || !field.is_below(&root) {
                continue;
            }
            let key = (element_root.to_string(), field.clone());
            let path = self
                .paths
                .get_or_try_insert_with(&key, || self.attribute_path(field, root.len()))
                .map_err(|e| {
                    error!(
                        self.logger,
                        "Selection can not be mapped";
                        "code" => LogCode::UnmappableSelection,
                        "field" => field.qualified_name(),
                        "error" => %e
                    );
                    e
                })?;
            if let Some(path) = path {
                plan.insert(path);
            }
        }

        if ENV_VARS.log_fetch_plans() {
            debug!(
                self.logger,
                "Resolved fetch plan";
                "code" => LogCode::FetchPlanResolved,
                "root" => element_root,
                "plan" => %plan
            );
        }
        Ok(plan)
    }

    /// Map the segments of `field` after the first `skip` ones to attribute
    /// names. `Ok(None)` if some segment has no attribute.
    fn attribute_path(
        &self,
        field: &SelectionField,
        skip: usize,
    ) -> Result<Option<String>, QueryExecutionError> {
        let segments = &field.segments()[skip..];
        let mut parts = Vec::with_capacity(segments.len());
        for (i, (type_name, field_name)) in segments.iter().enumerate() {
            if !self.schema.has_type(type_name) {
                return Err(QueryExecutionError::UnmappableTypeError(
                    type_name.to_string(),
                ));
            }

            if field_name.starts_with(META_FIELD_PREFIX) {
                // The row only needs to be identifiable to answer a meta
                // field.
                let id = if i + 1 == segments.len() && !field.possible_types().is_empty() {
                    field
                        .possible_types()
                        .iter()
                        .find_map(|t| self.schema.id_attribute(t))
                } else {
                    self.schema.id_attribute(type_name)
                };
                match id {
                    Some(id) => parts.push(id),
                    None => return Ok(None),
                }
                continue;
            }

            match self.schema.attribute_for(type_name, field_name)? {
                Some(attribute) => parts.push(attribute),
                None => return Ok(None),
            }
        }
        Ok(Some(parts.join(".")))
    }
}

#[cfg(test)]
mod tests {
    use super::SelectionPlanResolver;
    use crate::selection::SelectionField;
    use graph::log::discard;
    use graph::prelude::*;
    use pretty_assertions::assert_eq;

    fn resolver(schema: SchemaDescriptor) -> SelectionPlanResolver {
        SelectionPlanResolver::new(&discard(), Arc::new(schema), 100)
    }

    fn base_schema() -> SchemaDescriptor {
        SchemaDescriptor::builder()
            .add_type(TypeDescriptor::new("Base").id("id").attribute("name"))
            .build()
            .unwrap()
    }

    fn leaves(names: &[&str]) -> Vec<SelectionField> {
        names
            .iter()
            .map(|name| SelectionField::leaf(name).unwrap())
            .collect()
    }

    #[test]
    fn maps_a_plain_field() {
        let plan = resolver(base_schema())
            .resolve(&leaves(&["Base.name"]), "")
            .unwrap();
        assert_eq!(FetchPlan::from_iter(vec!["name"]), plan);
    }

    #[test]
    fn typename_fetches_the_id() {
        let plan = resolver(base_schema())
            .resolve(&leaves(&["Base.__typename"]), "")
            .unwrap();
        assert_eq!(FetchPlan::from_iter(vec!["id"]), plan);
    }

    #[test]
    fn typename_uses_the_first_possible_type_with_an_id() {
        let schema = SchemaDescriptor::builder()
            .add_type(
                TypeDescriptor::new("Animal")
                    .possible_type("Cat")
                    .possible_type("Bird"),
            )
            .add_type(TypeDescriptor::new("Bird").attribute("wings"))
            .add_type(TypeDescriptor::new("Cat").id("catId"))
            .build()
            .unwrap();
        let resolver = resolver(schema);

        let field = SelectionField::leaf("Animal.__typename")
            .unwrap()
            .with_possible_types(vec!["Cat", "Bird"]);
        assert_eq!(
            FetchPlan::from_iter(vec!["catId"]),
            resolver.resolve(&[field], "").unwrap()
        );

        // No possible type has an id
        let field = SelectionField::leaf("Animal.__typename")
            .unwrap()
            .with_possible_types(vec!["Bird"]);
        assert!(resolver.resolve(&[field], "").unwrap().is_empty());
    }

    #[test]
    fn follows_nested_fields_below_the_root() {
        let schema = SchemaDescriptor::builder()
            .add_type(
                TypeDescriptor::new("CatConnection")
                    .field_type("edges", "[CatEdge!]!".parse().unwrap()),
            )
            .add_type(TypeDescriptor::new("CatEdge").field_type("node", FieldType::named("Cat")))
            .add_type(
                TypeDescriptor::new("Cat")
                    .id("id")
                    .attribute("name")
                    .field("nickname", "name")
                    .relation("owner", "owner", FieldType::named("Person")),
            )
            .add_type(
                TypeDescriptor::new("Person")
                    .id("personId")
                    .field("fullName", "name")
                    .attribute("name"),
            )
            .build()
            .unwrap();
        let mut fields = leaves(&[
            "CatConnection.edges/CatEdge.node/Cat.nickname",
            "CatConnection.edges/CatEdge.node/Cat.name",
            "CatConnection.edges/CatEdge.node/Cat.owner/Person.fullName",
            "CatConnection.edges/CatEdge.node/Cat.owner/Person.__typename",
            "CatConnection.edges/CatEdge.node/Cat.age",
            "CatConnection.edges/CatEdge.cursor",
            "CatConnection.totalCount",
        ]);
        fields.push(SelectionField::object("CatConnection.edges/CatEdge.node/Cat.owner").unwrap());

        let resolver = resolver(schema);
        let plan = resolver.resolve(&fields, "edges/node").unwrap();
        assert_eq!(
            FetchPlan::from_iter(vec!["name", "owner.name", "owner.personId"]),
            plan
        );

        // Same input in a different order
        fields.reverse();
        assert_eq!(plan, resolver.resolve(&fields, "edges/node").unwrap());
    }

    #[test]
    fn unknown_types_are_errors() {
        let resolver = resolver(base_schema());
        assert_eq!(
            Err(QueryExecutionError::UnmappableTypeError("Ghost".to_string())),
            resolver.resolve(&leaves(&["Ghost.name"]), "")
        );
        // Errors are not memoized
        assert!(resolver.paths.is_empty());
        assert!(resolver.resolve(&leaves(&["Ghost.name"]), "").is_err());
    }

    #[test]
    fn memoizes_paths_per_root() {
        let resolver = resolver(base_schema());
        let fields = leaves(&["Base.name", "Base.computed"]);
        resolver.resolve(&fields, "").unwrap();
        assert_eq!(2, resolver.paths.len());
        resolver.resolve(&fields, "").unwrap();
        assert_eq!(2, resolver.paths.len());
    }
}

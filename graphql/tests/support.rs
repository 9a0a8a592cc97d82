#[macro_use]
extern crate pretty_assertions;

use graph::log::discard;
use graph::prelude::*;
use viewgraph_graphql::graphql_parser::query as q;
use viewgraph_graphql::prelude::*;

fn schema() -> Arc<SchemaDescriptor> {
    let schema = SchemaDescriptor::builder()
        .add_type(
            TypeDescriptor::new("Query")
                .field_type("cats", "CatConnection!".parse().unwrap())
                .field_type("allCats", "[Cat!]!".parse().unwrap()),
        )
        .add_type(
            TypeDescriptor::new("CatConnection")
                .field_type("edges", "[CatEdge!]!".parse().unwrap())
                .field_type("pageInfo", FieldType::named("PageInfo")),
        )
        .add_type(TypeDescriptor::new("CatEdge").field_type("node", FieldType::named("Cat")))
        .add_type(TypeDescriptor::new("PageInfo"))
        .add_type(
            TypeDescriptor::new("Cat")
                .id("id")
                .attribute("name")
                .field("nickname", "name"),
        )
        .allow_cursor_values(vec![ValueType::String, ValueType::Int])
        .build()
        .unwrap();
    Arc::new(schema)
}

fn support() -> GraphQlSupport {
    GraphQlSupport::new(&discard(), schema(), ConnectionNames::default())
}

fn connection_type() -> FieldType {
    "CatConnection!".parse().unwrap()
}

fn leaves(names: &[&str]) -> Vec<SelectionField> {
    names
        .iter()
        .map(|name| SelectionField::leaf(name).unwrap())
        .collect()
}

#[test]
fn resolves_element_types() {
    let support = support();
    assert_eq!(
        Ok("Cat".to_string()),
        support.element_type_name(&connection_type(), "edges/node")
    );
    assert_eq!(
        Ok("Cat".to_string()),
        support.element_type_name(&"[Cat!]!".parse().unwrap(), "")
    );
    // Cached results are the same
    assert_eq!(
        Ok("Cat".to_string()),
        support.element_type_name(&connection_type(), "edges/node")
    );
    assert_eq!(
        Err(QueryExecutionError::UnknownElementRoot(
            "CatEdge".to_string(),
            "nodes".to_string()
        )),
        support.element_type_name(&connection_type(), "edges/nodes")
    );
    assert_eq!(
        Err(QueryExecutionError::UnmappableTypeError("Dog".to_string())),
        support.element_type_name(&FieldType::named("Dog"), "")
    );
}

#[test]
fn paginated_setting() {
    let support = support();
    let fields = leaves(&[
        "CatConnection.edges/CatEdge.node/Cat.nickname",
        "CatConnection.edges/CatEdge.node/Cat.__typename",
        "CatConnection.pageInfo/PageInfo.hasNextPage",
    ]);
    let setting = support
        .create_paginated_setting(&connection_type(), &PaginationArgs::default().first(5), &fields)
        .unwrap();

    assert_eq!("Cat", setting.entity_type);
    assert_eq!(FetchPlan::from_iter(vec!["id", "name"]), setting.fetches);
    assert_eq!(Some(5), setting.window.page_size());
    assert!(setting.window.use_keyset());
    assert!(setting.disable_count_query);
    assert!(!setting.extract_all_keysets);
}

#[test]
fn selected_count_and_cursors_are_flagged() {
    let support = support();
    let fields = leaves(&["CatConnection.totalCount", "CatConnection.edges/CatEdge.cursor"]);
    let setting = support
        .create_paginated_setting(&connection_type(), &PaginationArgs::default(), &fields)
        .unwrap();
    assert!(!setting.disable_count_query);
    assert!(setting.extract_all_keysets);
    assert!(setting.fetches.is_empty());
    assert!(!setting.window.use_keyset());
}

#[test]
fn plain_list_setting() {
    let support = support();
    let setting = support
        .create_setting(
            &"[Cat!]!".parse().unwrap(),
            &PaginationArgs::default().offset(10),
            &leaves(&["Cat.name"]),
            "",
        )
        .unwrap();
    assert_eq!("Cat", setting.entity_type);
    assert_eq!(10, setting.window.first_result());
    assert!(!setting.disable_count_query);
}

#[test]
fn setting_from_a_query_field() {
    let support = support();
    let doc = q::parse_query::<String>(
        r#"{
            cats(first: 2, after: null) {
                totalCount
                edges { cursor node { nickname } }
            }
        }"#,
    )
    .unwrap()
    .into_static();
    let cats = match &doc.definitions[0] {
        q::Definition::Operation(q::OperationDefinition::SelectionSet(set)) => {
            match &set.items[0] {
                q::Selection::Field(field) => field.clone(),
                _ => unreachable!(),
            }
        }
        _ => unreachable!(),
    };

    let setting = support.setting_for_field(&connection_type(), &cats, &[]).unwrap();
    assert_eq!(Some(2), setting.window.page_size());
    assert_eq!(FetchPlan::from_iter(vec!["name"]), setting.fetches);
    assert!(!setting.disable_count_query);
    assert!(setting.extract_all_keysets);
}

#[test]
fn cyclic_fragments_in_a_query_field() {
    let support = support();
    let doc = q::parse_query::<String>(
        r#"{ cats(first: 2) { edges { node { ...a } } } }
        fragment a on Cat { name ...b }
        fragment b on Cat { nickname ...a }"#,
    )
    .unwrap()
    .into_static();

    let mut fragments = vec![];
    let mut cats = None;
    for definition in doc.definitions {
        match definition {
            q::Definition::Fragment(fragment) => fragments.push(fragment),
            q::Definition::Operation(q::OperationDefinition::SelectionSet(set)) => {
                if let Some(q::Selection::Field(field)) = set.items.into_iter().next() {
                    cats = Some(field);
                }
            }
            _ => unreachable!(),
        }
    }

    let err = support
        .setting_for_field(&connection_type(), &cats.unwrap(), &fragments)
        .unwrap_err();
    assert_eq!(QueryExecutionError::CyclicalFragment("a".to_string()), err);
    assert!(err.is_client_error());
}

#[test]
fn round_trip_through_the_facade() {
    let support = support();
    let window = support
        .create_paginated_setting(&connection_type(), &PaginationArgs::default().first(2), &[])
        .unwrap()
        .window;
    let rows = vec![
        Row::with_keyset("felix", Keyset::new(vec![Value::from("felix"), Value::Int(1)])),
        Row::with_keyset("tom", Keyset::new(vec![Value::from("tom"), Value::Int(2)])),
    ];
    let conn = support.assemble(rows, &window, Some(3));
    assert_eq!(Some(3), conn.total_count);
    assert!(conn.page_info.has_next_page);

    let end = conn.page_info.end_cursor.unwrap();
    let cursor = support.decode_cursor(&end).unwrap();
    assert_eq!(
        Keyset::new(vec![Value::from("tom"), Value::Int(2)]),
        cursor.keyset
    );

    let next = support
        .create_paginated_setting(
            &connection_type(),
            &PaginationArgs::default().first(2).after(end),
            &[],
        )
        .unwrap();
    assert_eq!(Some(&cursor), next.window.highest());
    assert_eq!(2, next.window.first_result());
}

#[test]
fn cursors_with_disallowed_values_are_rejected() {
    let codec = CursorCodec::new(&discard(), maplit::hashset! { ValueType::Bytes }, 8192);
    let token = codec.encode(&Cursor::new(
        0,
        2,
        Keyset::new(vec![Value::from(vec![1u8, 2, 3])]),
    ))
    .unwrap();
    let err = support()
        .create_paginated_setting(
            &connection_type(),
            &PaginationArgs::default().first(2).after(token),
            &[],
        )
        .unwrap_err();
    assert_eq!(
        QueryExecutionError::InvalidCursor(CursorError::DisallowedType("Bytes".to_string())),
        err
    );
}

#[test]
fn renamed_connection_fields() {
    let names = ConnectionNames::from_toml(
        r#"
        totalCount = "count"
        [arguments]
        first = "limit"
        "#,
    )
    .unwrap();
    let support = GraphQlSupport::new(&discard(), schema(), names);
    let args = support
        .pagination_args(&[("limit".to_string(), q::Value::Int(3.into()))])
        .unwrap();
    assert_eq!(Some(3), args.first);

    let setting = support
        .create_paginated_setting(
            &connection_type(),
            &args,
            &leaves(&["CatConnection.count"]),
        )
        .unwrap();
    assert!(!setting.disable_count_query);
}

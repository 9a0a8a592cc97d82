#[macro_use]
extern crate pretty_assertions;

use graph::log::discard;
use graph::prelude::*;
use maplit::hashset;
use viewgraph_graphql::prelude::*;

fn codec() -> CursorCodec {
    CursorCodec::new(
        &discard(),
        hashset! { ValueType::Int, ValueType::String },
        8192,
    )
}

fn windows() -> WindowResolver {
    WindowResolver::new(&discard(), codec(), ArgumentNames::default(), None)
}

fn assembler() -> ConnectionAssembler {
    ConnectionAssembler::new(&discard(), codec())
}

/// Simulates the query layer: rows `0..total` sorted by `(name, id)`,
/// read with the given window.
fn fetch(window: &KeysetWindow, total: i32) -> Vec<Row<i32>> {
    let key = |n: i32| Keyset::new(vec![Value::from(format!("cat-{:03}", n)), Value::Int(n)]);
    let all: Vec<i32> = (0..total).collect();
    let page_size = window.page_size().map(|n| n as usize).unwrap_or(all.len());

    let selected: Vec<i32> = if window.use_keyset() {
        match (window.lowest(), window.highest()) {
            (Some(_), _) if window.scans_from_end() => {
                let start = all.len().saturating_sub(page_size);
                all[start..].to_vec()
            }
            (Some(_), _) if window.scans_from_start() => {
                all.iter().copied().take(page_size).collect()
            }
            (Some(lowest), _) => {
                let before: Vec<i32> = all
                    .iter()
                    .copied()
                    .filter(|n| key(*n) < lowest.keyset)
                    .collect();
                let start = before.len().saturating_sub(page_size);
                before[start..].to_vec()
            }
            (None, Some(highest)) => all
                .iter()
                .copied()
                .filter(|n| key(*n) > highest.keyset)
                .take(page_size)
                .collect(),
            (None, None) => unreachable!("keyset windows have a bound"),
        }
    } else {
        all.iter()
            .copied()
            .skip(window.first_result() as usize)
            .take(page_size)
            .collect()
    };
    selected
        .into_iter()
        .map(|n| Row::with_keyset(n, key(n)))
        .collect()
}

fn page(args: PaginationArgs, total: i32) -> Connection<i32> {
    let window = windows().resolve(&args).unwrap();
    let meta = PageMeta::from_window(&window).total_count(Some(total as u64));
    assembler().assemble(fetch(&window, total), &meta)
}

fn nodes(conn: &Connection<i32>) -> Vec<i32> {
    conn.nodes().copied().collect()
}

#[test]
fn pages_forward_with_end_cursors() {
    let first = page(PaginationArgs::default().first(4), 10);
    assert_eq!(vec![0, 1, 2, 3], nodes(&first));
    assert!(!first.page_info.has_previous_page);
    assert!(first.page_info.has_next_page);

    let end = first.page_info.end_cursor.clone().unwrap();
    let second = page(PaginationArgs::default().first(4).after(end), 10);
    assert_eq!(vec![4, 5, 6, 7], nodes(&second));
    assert!(second.page_info.has_previous_page);
    assert!(second.page_info.has_next_page);

    let end = second.page_info.end_cursor.clone().unwrap();
    let third = page(PaginationArgs::default().first(4).after(end), 10);
    assert_eq!(vec![8, 9], nodes(&third));
    assert!(!third.page_info.has_next_page);
}

#[test]
fn pages_backward_with_start_cursors() {
    let last = page(PaginationArgs::default().last(3), 10);
    assert_eq!(vec![7, 8, 9], nodes(&last));

    let start = last.page_info.start_cursor.clone().unwrap();
    let previous = page(PaginationArgs::default().last(3).before(start), 10);
    assert_eq!(vec![4, 5, 6], nodes(&previous));
}

#[test]
fn every_edge_cursor_is_re_enterable_with_full_keysets() {
    let conn = page(PaginationArgs::default().first(5), 10);
    let third = conn.edges[2].cursor.clone();
    let next = page(PaginationArgs::default().first(2).after(third), 10);
    assert_eq!(vec![3, 4], nodes(&next));
}

#[test]
fn tail_of_the_first_page() {
    let window = windows()
        .resolve(&PaginationArgs::default().first(10).last(3))
        .unwrap();
    assert_eq!(Some(3), window.page_size());
    assert_eq!(7, window.first_result());
    assert!(!window.use_keyset());

    assert_eq!(
        vec![7, 8, 9],
        nodes(&page(PaginationArgs::default().first(10).last(3), 20))
    );
}

#[test]
fn after_with_last_reads_the_tail() {
    let first = page(PaginationArgs::default().first(2), 10);
    let end = first.page_info.end_cursor.clone().unwrap();
    let tail = page(PaginationArgs::default().last(2).after(end), 10);
    assert_eq!(vec![8, 9], nodes(&tail));
}

#[test]
fn first_last_and_after_read_the_tail() {
    let first = page(PaginationArgs::default().first(2), 10);
    let end = first.page_info.end_cursor.clone().unwrap();
    let args = PaginationArgs::default().first(10).last(3).after(end);

    let window = windows().resolve(&args).unwrap();
    assert!(window.use_keyset());
    assert!(window.scans_from_end());
    assert_eq!(vec![7, 8, 9], nodes(&page(args, 10)));
}

#[test]
fn boundary_keysets_only() {
    let rows = vec![
        Row::with_keyset(0, Keyset::new(vec![Value::Int(0)])),
        Row::new(1),
        Row::new(2),
        Row::new(3),
        Row::with_keyset(4, Keyset::new(vec![Value::Int(4)])),
    ];
    let conn = assembler().assemble(rows, &PageMeta::new(0, Some(5)));
    let cursors: Vec<&str> = conn.edges.iter().map(|e| e.cursor.as_str()).collect();
    assert_eq!(vec!["2", "3", "4"], cursors[1..4].to_vec());

    let codec = codec();
    assert_eq!(
        Keyset::new(vec![Value::Int(0)]),
        codec.decode(cursors[0]).unwrap().keyset
    );
    assert_eq!(
        Keyset::new(vec![Value::Int(4)]),
        codec.decode(cursors[4]).unwrap().keyset
    );

    // Positional cursors are not valid for seeking
    let err = windows()
        .resolve(&PaginationArgs::default().first(5).after(cursors[2]))
        .unwrap_err();
    assert!(matches!(err, QueryExecutionError::InvalidCursor(_)));
}

#[test]
fn resolving_is_deterministic() {
    let first = page(PaginationArgs::default().first(3), 10);
    let args = PaginationArgs::default()
        .first(3)
        .after(first.page_info.end_cursor.clone().unwrap());
    assert_eq!(windows().resolve(&args), windows().resolve(&args));
    assert_eq!(page(args.clone(), 10), page(args, 10));
}

#[test]
fn argument_errors_name_the_argument() {
    let resolver = windows();
    for (args, argument) in vec![
        (PaginationArgs::default().first(-1), "first"),
        (PaginationArgs::default().last(-1), "last"),
        (PaginationArgs::default().offset(-1), "offset"),
        (PaginationArgs::default().first(5).before("X").after("Y"), "before"),
    ] {
        let err = resolver.resolve(&args).unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(Some(argument), err.argument());
    }
}

#[test]
fn renamed_offset_argument_in_errors() {
    let names = ArgumentNames {
        offset: "skip".to_string(),
        ..Default::default()
    };
    let resolver = WindowResolver::new(&discard(), codec(), names, None);
    let err = resolver
        .resolve(&PaginationArgs::default().offset(-4))
        .unwrap_err();
    assert_eq!(Some("skip"), err.argument());
}

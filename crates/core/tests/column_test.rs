//! Tests for column derivation, balancing and lookup.

use rostergrid_core::{ColumnSet, GridError, Rectangle, Row, Span};

fn rect(x: f64, y: f64, w: f64, h: f64) -> Rectangle {
    Rectangle::new(x, y, w, h).unwrap()
}

fn row_of(y: f64, spans: &[(f64, f64)]) -> Row {
    let mut row = Row::new();
    for (n, &(x, x2)) in spans.iter().enumerate() {
        row.append(rect(x, y, x2 - x, 40.0), format!("r{y}c{n}"), None)
            .unwrap();
    }
    row
}

fn spans(set: &ColumnSet) -> Vec<(f64, f64)> {
    set.iter().map(|c| (c.x, c.x2)).collect()
}

#[test]
fn test_derive_clusters_across_rows() {
    let rows = [
        row_of(100.0, &[(0.0, 40.0), (60.0, 100.0)]),
        row_of(200.0, &[(5.0, 45.0), (62.0, 98.0)]),
    ];
    let columns = ColumnSet::derive(&rows);
    assert_eq!(spans(&columns), [(0.0, 45.0), (60.0, 100.0)]);
}

#[test]
fn test_overlap_chains_merge_and_touching_spans_do_not() {
    let chained = ColumnSet::from_spans([
        Span::new(18.0, 30.0),
        Span::new(0.0, 10.0),
        Span::new(8.0, 20.0),
    ]);
    assert_eq!(spans(&chained), [(0.0, 30.0)]);

    let touching = ColumnSet::from_spans([Span::new(0.0, 10.0), Span::new(10.0, 20.0)]);
    assert_eq!(touching.len(), 2);
}

#[test]
fn test_balance_equalizes_adjacent_widths() {
    let mut columns = ColumnSet::from_spans([
        Span::new(10.0, 40.0),
        Span::new(60.0, 100.0),
        Span::new(120.0, 150.0),
    ]);
    columns.balance();
    assert_eq!(spans(&columns), [(5.0, 45.0), (60.0, 100.0), (115.0, 155.0)]);
    for pair in columns.iter().collect::<Vec<_>>().windows(2) {
        assert_eq!(pair[0].width(), pair[1].width());
        assert!(pair[0].x2 <= pair[1].x);
    }
}

#[test]
fn test_balance_never_overlaps_neighbours() {
    let mut columns = ColumnSet::from_spans([Span::new(0.0, 40.0), Span::new(42.0, 72.0)]);
    columns.balance();
    assert_eq!(spans(&columns), [(0.0, 40.0), (40.0, 80.0)]);
}

#[test]
fn test_find_column() {
    let columns = ColumnSet::from_spans([Span::new(0.0, 40.0), Span::new(60.0, 100.0)]);
    assert_eq!(columns.find_column(&rect(5.0, 0.0, 30.0, 10.0)), Ok(0));
    assert_eq!(columns.find_column(&rect(30.0, 0.0, 20.0, 10.0)), Ok(0));
    assert_eq!(columns.find_column(&rect(38.0, 0.0, 30.0, 10.0)), Ok(1));
    assert_eq!(
        columns.find_column(&rect(200.0, 0.0, 40.0, 10.0)),
        Err(GridError::ColumnNotFound { x: 200.0, x2: 240.0 })
    );
}

#[test]
fn test_empty_set() {
    let mut columns = ColumnSet::new();
    columns.balance();
    assert!(columns.is_empty());
    assert!(columns.find_column(&rect(0.0, 0.0, 1.0, 1.0)).is_err());
}

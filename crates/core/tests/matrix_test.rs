//! Tests for row assignment, ordering and traversal of the matrix.

use rostergrid_core::{
    AppendOutcome, Matrix, MatrixParams, PruneOptions, Rectangle, RemovedRow, Segment,
};

fn rect(x: f64, y: f64, w: f64, h: f64) -> Rectangle {
    Rectangle::new(x, y, w, h).unwrap()
}

/// Five 40x40 icons near y = 100, 60px apart, ingested out of order.
fn first_row() -> Vec<(Rectangle, String)> {
    [(120.0, 100.0), (0.0, 102.0), (240.0, 98.0), (60.0, 101.0), (180.0, 99.0)]
        .iter()
        .map(|&(x, y)| (rect(x, y, 40.0, 40.0), format!("icon{x}")))
        .collect()
}

fn ingest(matrix: &mut Matrix, items: &[(Rectangle, String)]) {
    for (rectangle, label) in items {
        matrix.auto_append(*rectangle, label.clone(), true).unwrap();
    }
}

fn labels(matrix: &Matrix, row: usize) -> Vec<String> {
    matrix[row].iter().map(|i| i.label().to_string()).collect()
}

#[test]
fn test_example_roster_groups_into_two_rows() {
    let mut matrix = Matrix::new(400.0, 600.0);
    ingest(&mut matrix, &first_row());
    ingest(&mut matrix, &[(rect(10.0, 300.0, 40.0, 40.0), "lonely".into())]);
    matrix.sort();

    assert_eq!(matrix.len(), 2);
    assert_eq!(matrix.row_lengths(), [5, 1]);
    let xs: Vec<f64> = matrix[0].iter().map(|i| i.rectangle().x()).collect();
    assert_eq!(xs, [0.0, 60.0, 120.0, 180.0, 240.0]);
    assert_eq!(labels(&matrix, 1), ["lonely"]);
}

#[test]
fn test_single_item_last_row_survives_prune_unmodified() {
    let mut matrix = Matrix::new(400.0, 600.0);
    ingest(&mut matrix, &first_row());
    let lonely = rect(10.0, 300.0, 40.0, 40.0);
    ingest(&mut matrix, &[(lonely, "lonely".into())]);
    matrix.sort();

    let report = matrix.prune(PruneOptions::new(3)).unwrap();
    assert!(report.removed.is_empty());
    assert!(report.filled.is_empty());
    assert_eq!(matrix.len(), 2);
    assert_eq!(*matrix[1][0].rectangle(), lonely);
}

#[test]
fn test_single_item_middle_row_is_pruned() {
    let mut matrix = Matrix::new(600.0, 600.0);
    ingest(&mut matrix, &first_row());
    ingest(&mut matrix, &[(rect(10.0, 300.0, 40.0, 40.0), "lonely".into())]);
    let third: Vec<(Rectangle, String)> = (0..5)
        .map(|n| (rect(n as f64 * 60.0, 500.0, 40.0, 40.0), format!("low{n}")))
        .collect();
    ingest(&mut matrix, &third);
    matrix.sort();

    let report = matrix.prune(PruneOptions::new(3)).unwrap();
    assert_eq!(report.removed, [RemovedRow { index: 1, len: 1 }]);
    assert_eq!(matrix.row_lengths(), [5, 5]);
    assert!(matrix.iter().all(|row| row.get("lonely").is_none()));
}

#[test]
fn test_row_assignment_is_deterministic() {
    let mut items = first_row();
    items.push((rect(10.0, 300.0, 40.0, 40.0), "lonely".into()));
    items.push((rect(70.0, 298.0, 40.0, 40.0), "second".into()));

    let build = || {
        let mut matrix = Matrix::new(400.0, 600.0);
        ingest(&mut matrix, &items);
        matrix.sort();
        matrix.to_string()
    };
    assert_eq!(build(), build());
}

#[test]
fn test_first_fit_beats_best_fit() {
    let mut matrix = Matrix::new(400.0, 600.0);
    matrix
        .auto_append(rect(0.0, 100.0, 40.0, 40.0), "a", true)
        .unwrap();
    let b = matrix
        .auto_append(rect(60.0, 120.0, 40.0, 40.0), "b", true)
        .unwrap();
    assert!(b.new_row);
    assert_eq!(matrix.len(), 2);

    // Overlaps row 0 by 55% and row 1 by 95%; the first match wins.
    let c = matrix
        .auto_append(rect(120.0, 118.0, 40.0, 40.0), "c", true)
        .unwrap();
    assert_eq!(c.row, 0);
    assert!(!c.new_row);
}

#[test]
fn test_auto_append_tries_rows_in_creation_order_after_sort() {
    let mut matrix = Matrix::new(400.0, 600.0);
    matrix
        .auto_append(rect(0.0, 120.0, 40.0, 40.0), "lower", true)
        .unwrap();
    matrix
        .auto_append(rect(60.0, 100.0, 40.0, 40.0), "upper", true)
        .unwrap();
    matrix.sort();
    assert_eq!(labels(&matrix, 0), ["upper"]);

    // Row created first is tried first even though it now sits second.
    let placed = matrix
        .auto_append(rect(120.0, 118.0, 40.0, 40.0), "probe", true)
        .unwrap();
    assert_eq!(placed.row, 1);
    assert_eq!(labels(&matrix, 1), ["lower", "probe"]);
}

#[test]
fn test_spacing_percent_controls_row_joining() {
    let strict = MatrixParams::default().with_spacing_percent(0.9);
    let mut matrix = Matrix::with_params(400.0, 600.0, strict);
    matrix
        .auto_append(rect(0.0, 100.0, 40.0, 40.0), "a", true)
        .unwrap();
    let placed = matrix
        .auto_append(rect(60.0, 106.0, 40.0, 40.0), "b", true)
        .unwrap();
    assert!(placed.new_row);

    let mut loose = Matrix::new(400.0, 600.0);
    loose
        .auto_append(rect(0.0, 100.0, 40.0, 40.0), "a", true)
        .unwrap();
    let placed = loose
        .auto_append(rect(60.0, 106.0, 40.0, 40.0), "b", true)
        .unwrap();
    assert!(!placed.new_row);
}

#[test]
fn test_overlapping_detection_merges_through_matrix() {
    let mut matrix = Matrix::new(400.0, 600.0);
    ingest(&mut matrix, &first_row());
    let placed = matrix
        .auto_append(rect(2.0, 103.0, 40.0, 40.0), "dup", true)
        .unwrap();
    assert_eq!(placed.outcome, AppendOutcome::Merged(1));
    assert_eq!(matrix.item_count(), 5);
}

#[test]
fn test_sort_is_idempotent() {
    let mut matrix = Matrix::new(400.0, 600.0);
    ingest(&mut matrix, &[(rect(10.0, 300.0, 40.0, 40.0), "lonely".into())]);
    ingest(&mut matrix, &first_row());

    matrix.sort();
    let once = matrix.to_string();
    matrix.sort();
    assert_eq!(matrix.to_string(), once);
    assert_eq!(labels(&matrix, 1), ["lonely"]);
}

#[test]
fn test_traversal_and_statistics() {
    let mut matrix = Matrix::new(400.0, 600.0);
    assert!(matrix.is_empty());
    assert!(matrix.average_width().is_err());

    let segments = vec![
        Segment::new(0.0, 100.0, 40.0, 40.0, "a").unwrap(),
        Segment::new(60.0, 100.0, 40.0, 40.0, "b").unwrap(),
        Segment::new(0.0, 200.0, 60.0, 20.0, "c").unwrap(),
    ];
    let placements = matrix.extend_segments(segments).unwrap();
    assert_eq!(placements.len(), 3);
    assert!(placements[2].new_row);

    assert_eq!(matrix.average_width(), Ok(50.0));
    assert_eq!(matrix.average_height(), Ok(30.0));
    assert_eq!(matrix.average_gap(), Some(20.0));
    assert_eq!(matrix.item_count(), 3);
    assert_eq!((&matrix).into_iter().count(), 2);
    assert!(matrix.get(2).is_none());
    assert_eq!(matrix.source_width(), 600.0);
    assert_eq!(matrix.source_height(), 400.0);
}

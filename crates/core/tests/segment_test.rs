//! Tests for segment input, cell classification and layout checks.

use rostergrid_core::{Cell, GridError, LayoutExpectation, Matrix, PruneOptions, Segment};

fn roster(rows: usize, columns: usize, last: usize) -> Vec<Segment> {
    let mut segments = Vec::new();
    for r in 0..rows {
        let count = if r + 1 == rows { last } else { columns };
        for c in 0..count {
            segments.push(
                Segment::new(
                    c as f64 * 50.0,
                    r as f64 * 60.0,
                    44.0,
                    44.0,
                    format!("hero-{r}-{c}"),
                )
                .unwrap(),
            );
        }
    }
    segments
}

#[test]
fn test_segment_from_json() {
    let json = r#"{"x": 10, "y": 20.5, "width": 40, "height": 42, "label": "a"}"#;
    let segment: Segment = serde_json::from_str(json).unwrap();
    assert_eq!(segment, Segment::new(10.0, 20.5, 40.0, 42.0, "a").unwrap());

    let round_trip = serde_json::to_value(&segment).unwrap();
    assert_eq!(round_trip["width"], 40.0);
    assert_eq!(round_trip["label"], "a");
}

#[test]
fn test_segment_json_rejects_empty_box() {
    let json = r#"{"x": 10, "y": 20, "width": 0, "height": 42, "label": "a"}"#;
    assert!(serde_json::from_str::<Segment>(json).is_err());
}

#[test]
fn test_classify_cells_walks_grid_in_order() {
    let mut matrix = Matrix::new(400.0, 400.0);
    matrix.extend_segments(roster(2, 3, 2)).unwrap();
    matrix.sort();

    let mut visited = 0;
    let mut classifier = |cell: Cell<'_>| {
        visited += 1;
        format!("{}:{}={}", cell.row, cell.position, cell.item.label())
    };
    let labels = matrix.classify_cells(&mut classifier);

    assert_eq!(
        labels,
        [
            vec!["0:0=hero-0-0", "0:1=hero-0-1", "0:2=hero-0-2"],
            vec!["1:0=hero-1-0", "1:1=hero-1-1"],
        ]
    );
    assert_eq!(visited, 5);
}

#[test]
fn test_check_layout() {
    let mut matrix = Matrix::new(400.0, 400.0);
    matrix.extend_segments(roster(3, 4, 2)).unwrap();
    matrix.sort();
    matrix.prune(PruneOptions::new(4)).unwrap();

    let strict = LayoutExpectation::new(3, 4);
    assert_eq!(
        matrix.check_layout(&strict),
        Err(GridError::LayoutMismatch {
            expected_rows: 3,
            expected_columns: 4,
            actual: vec![4, 4, 2],
        })
    );
    assert!(
        matrix
            .check_layout(&strict.with_partial_last_row())
            .is_ok()
    );
    assert!(!LayoutExpectation::new(2, 4).accepts(&matrix.row_lengths()));
}

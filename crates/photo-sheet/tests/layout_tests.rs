use photo_sheet::layout::photo_placements;
use photo_sheet::*;

const A4: (u32, u32) = (2480, 3508);
const PASSPORT: (u32, u32) = (413, 531);

#[test]
fn test_default_options_match_a4_passport() {
    let options = SheetOptions::default();
    assert_eq!(options.page_dimensions_px(), A4);
    assert_eq!(options.photo_dimensions_px(), PASSPORT);
}

#[test]
fn test_column_counts_on_a4() {
    for (columns, expected_spacing) in [(1, 1033.5), (3, 310.25), (4, 165.6), (6, 0.285_714_285_714_285_7)] {
        let layout = compute_sheet_layout(A4, PASSPORT, columns, 20).unwrap();
        assert_eq!(layout.rows, 6, "columns = {columns}");
        assert!(
            (layout.horizontal_spacing - expected_spacing).abs() < 1e-9,
            "columns = {columns}: {}",
            layout.horizontal_spacing
        );
        assert_eq!(layout.total_placed(), columns * 6);
    }
}

#[test]
fn test_seven_columns_do_not_fit() {
    let result = compute_sheet_layout(A4, PASSPORT, 7, 20);
    match result {
        Err(PhotoError::LayoutInfeasible {
            columns,
            photo_width,
            page_width,
        }) => {
            assert_eq!((columns, photo_width, page_width), (7, 413, 2480));
        }
        other => panic!("Expected LayoutInfeasible, got {other:?}"),
    }
}

#[test]
fn test_zero_columns_is_infeasible() {
    assert!(matches!(
        compute_sheet_layout(A4, PASSPORT, 0, 20),
        Err(PhotoError::LayoutInfeasible { .. })
    ));
}

#[test]
fn test_placements_stay_on_page_and_never_overlap() {
    let layout = compute_sheet_layout(A4, PASSPORT, 4, 20).unwrap();
    let placements = photo_placements(&layout);
    assert_eq!(placements.len(), 24);

    for placement in &placements {
        assert!(placement.rect.x >= 0.0);
        assert!(placement.rect.y >= 20.0);
        assert!(placement.rect.right() <= 2480.0);
        assert!(placement.rect.bottom() <= 3508.0 - 20.0);
    }

    for (i, a) in placements.iter().enumerate() {
        for b in &placements[i + 1..] {
            assert!(!a.rect.overlaps(&b.rect), "{a:?} overlaps {b:?}");
        }
    }
}

#[test]
fn test_rows_follow_fixed_margin() {
    let layout = compute_sheet_layout(A4, PASSPORT, 2, 20).unwrap();
    let placements = photo_placements(&layout);

    let first_column: Vec<f64> = placements
        .iter()
        .filter(|p| p.grid_pos.col == 0)
        .map(|p| p.rect.y)
        .collect();
    assert_eq!(first_column, vec![20.0, 571.0, 1122.0, 1673.0, 2224.0, 2775.0]);
}

#[test]
fn test_short_page_yields_empty_layout() {
    let layout = compute_sheet_layout((2480, 500), PASSPORT, 4, 20).unwrap();
    assert_eq!(layout.rows, 0);
    assert!(layout.is_empty());
    assert!(photo_placements(&layout).is_empty());
}

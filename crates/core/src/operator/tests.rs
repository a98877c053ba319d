use glam::DVec3;

use super::*;

fn entries_of(operator: &SplatOperator) -> Vec<(usize, usize, f64)> {
    operator
        .entries()
        .map(|t| (t.point, t.voxel, t.weight))
        .collect()
}

fn voxel(side: usize, x: usize, y: usize, z: usize) -> usize {
    (z - 1) * side * side + (y - 1) * side + (x - 1)
}

#[test]
fn axis_corner_uses_ceiling_and_floor() {
    let (r, w) = AxisSign::Plus.corner(2.25);
    assert_eq!(r, 3.0);
    assert!((w - 0.25).abs() < 1.0e-12);
    let (r, w) = AxisSign::Minus.corner(2.25);
    assert_eq!(r, 2.0);
    assert!((w - 0.75).abs() < 1.0e-12);
    assert_eq!(AxisSign::Plus.corner(4.0), (4.0, 1.0));
    assert_eq!(AxisSign::Minus.corner(4.0), (4.0, 1.0));
}

#[test]
fn integer_point_collapses_onto_one_voxel() {
    let points = [DVec3::new(2.0, 2.0, 2.0)];
    let mut batch = Vec::new();
    for signs in CORNER_SIGNS {
        corner_batch(&points, 4, signs, &mut batch);
    }
    assert_eq!(batch.len(), 8);
    assert!(batch.iter().all(|t| t.voxel == voxel(4, 2, 2, 2)));
    assert!(batch.iter().all(|t| t.weight == 3.0));

    let operator = build_operator(&points, 4).unwrap();
    assert_eq!(operator.nnz(), 1);
    assert_eq!(entries_of(&operator), vec![(0, voxel(4, 2, 2, 2), 24.0)]);
}

#[test]
fn midpoint_splits_weight_evenly() {
    let operator = build_operator(&[DVec3::new(2.5, 2.0, 2.0)], 4).unwrap();
    let entries = entries_of(&operator);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].1, voxel(4, 2, 2, 2));
    assert_eq!(entries[1].1, voxel(4, 3, 2, 2));
    assert!((entries[0].2 - 10.0).abs() < 1.0e-12);
    assert!((entries[0].2 - entries[1].2).abs() < 1.0e-12);
}

#[test]
fn interior_point_touches_eight_voxels() {
    let operator = build_operator(&[DVec3::new(1.2, 2.7, 3.5)], 5).unwrap();
    assert_eq!(operator.nnz(), 8);
    let near = operator
        .row(0)
        .find(|(v, _)| *v == voxel(5, 1, 3, 3))
        .map(|(_, w)| w)
        .unwrap();
    // x floor 0.8 + y ceil 0.7 + z floor 0.5
    assert!((near - 2.0).abs() < 1.0e-12);
    assert!(operator.row(0).all(|(_, w)| w > 0.0 && w <= 3.0));
}

#[test]
fn out_of_grid_corners_are_dropped() {
    let points = [
        DVec3::new(0.5, 2.0, 2.0),
        DVec3::new(4.5, 2.0, 2.0),
        DVec3::new(-10.0, 50.0, 2.0),
        DVec3::new(f64::NAN, 2.0, 2.0),
    ];
    let operator = build_operator(&points, 4).unwrap();
    assert_eq!(operator.num_points(), 4);
    assert_eq!(operator.row(0).collect::<Vec<_>>().len(), 1);
    assert_eq!(operator.row(0).next().unwrap().0, voxel(4, 1, 2, 2));
    assert_eq!(operator.row(1).next().unwrap().0, voxel(4, 4, 2, 2));
    assert_eq!(operator.row(2).count(), 0);
    assert_eq!(operator.row(3).count(), 0);
}

#[test]
fn build_is_deterministic() {
    let points: Vec<DVec3> = (0..200)
        .map(|i| {
            let t = i as f64 * 0.37;
            DVec3::new(1.0 + (t * 1.3) % 6.0, 1.0 + (t * 2.1) % 6.0, 1.0 + (t * 0.7) % 6.0)
        })
        .collect();
    let a = build_operator(&points, 8).unwrap();
    let b = build_operator(&points, 8).unwrap();
    let bits = |op: &SplatOperator| -> Vec<(usize, usize, u64)> {
        op.entries()
            .map(|t| (t.point, t.voxel, t.weight.to_bits()))
            .collect()
    };
    assert_eq!(bits(&a), bits(&b));
}

#[test]
fn weight_sums_and_scatter_match_entries() {
    let points = [DVec3::new(2.0, 2.0, 2.0), DVec3::new(2.5, 2.0, 2.0)];
    let operator = build_operator(&points, 4).unwrap();
    let sums = operator.weight_sums();
    assert_eq!(sums.len(), 64);
    assert!((sums[voxel(4, 2, 2, 2)] - 34.0).abs() < 1.0e-12);
    assert!((sums[voxel(4, 3, 2, 2)] - 10.0).abs() < 1.0e-12);
    assert_eq!(sums.iter().filter(|w| **w > 0.0).count(), 2);

    let mut raw = vec![0.0; 64];
    operator.scatter_into(&[1.0, 2.0], &mut raw);
    assert!((raw[voxel(4, 2, 2, 2)] - 44.0).abs() < 1.0e-12);
    assert!((raw[voxel(4, 3, 2, 2)] - 20.0).abs() < 1.0e-12);
}

#[test]
fn empty_point_set_builds_empty_operator() {
    let operator = build_operator(&[], 3).unwrap();
    assert_eq!(operator.num_points(), 0);
    assert_eq!(operator.num_voxels(), 27);
    assert!(operator.weight_sums().iter().all(|w| *w == 0.0));
}

#[test]
fn zero_side_is_rejected() {
    assert_eq!(build_operator(&[], 0), Err(GridError::ZeroSide));
}

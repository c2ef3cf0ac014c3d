use burn::tensor::{Distribution, Tensor};
use burn_ndarray::NdArray;
use nalgebra::{Matrix2, Vector2};
use proptest::prelude::*;
use warpkit_core::{Axes, Grid, Point};
use warpkit_spatial::{AffineTransform, IdentityTransform, PointSetConfig, PointSetTransformer, TransformerError};

type Backend = NdArray<f32>;

fn as_vec<const R: usize>(tensor: Tensor<Backend, R>) -> Vec<f32> {
    tensor.into_data().as_slice::<f32>().unwrap().to_vec()
}

fn oblique_grid() -> Grid<2> {
    let (s, c) = 0.3f64.sin_cos();
    Grid::new([10, 8])
        .with_spacing(Vector2::new(0.8, 1.25))
        .with_direction(Matrix2::new(c, -s, s, c))
        .with_center(Point::<2>::new(4.0, -2.0))
}

#[test]
fn test_defaults_follow_transform() {
    let grid = oblique_grid();
    let transformer =
        PointSetTransformer::<Backend, _, 2>::new(IdentityTransform::new(grid.clone()), PointSetConfig::default())
            .unwrap();
    assert_eq!(transformer.target_grid(), &grid);
    assert_eq!(transformer.target_axes(), Axes::CubeCorners);
    assert_eq!(transformer.source_grid(), &grid);
    assert_eq!(transformer.source_axes(), Axes::CubeCorners);
}

#[test]
fn test_cross_convention_matches_direct_conversion() {
    let device = Default::default();
    let a = oblique_grid();
    let b = Grid::new([5, 9]).with_spacing(Vector2::new(2.0, 0.5)).with_align_corners(false);

    for (axes, to_axes) in [
        (Axes::World, Axes::Cube),
        (Axes::Grid, Axes::World),
        (Axes::CubeCorners, Axes::Grid),
        (Axes::Cube, Axes::Cube),
    ] {
        let config = PointSetConfig::default()
            .with_grid(a.clone())
            .with_axes(axes)
            .unwrap()
            .with_to_grid(b.clone())
            .with_to_axes(to_axes)
            .unwrap();
        let transformer =
            PointSetTransformer::new(IdentityTransform::new(Grid::new([6, 6])), config).unwrap();

        // Grid center and a corner of grid A
        let center = a.world_to_axes(axes).unwrap().apply(a.center());
        let points = Tensor::<Backend, 2>::from_floats(
            [[center.x as f32, center.y as f32], [0.0, 1.0]],
            &device,
        );
        let expected = a.transform_points(points.clone(), axes, &b, to_axes, None).unwrap();
        let actual = transformer.forward(points).unwrap();
        for (x, y) in as_vec(actual).iter().zip(as_vec(expected).iter()) {
            assert!((x - y).abs() < 1e-4, "{} -> {}: {} vs {}", axes, to_axes, x, y);
        }
    }
}

#[test]
fn test_affine_point_transform() {
    let device = Default::default();
    let grid = Grid::new([11, 11]);
    let matrix = Tensor::<Backend, 2>::from_floats([[0.0, -1.0], [1.0, 0.0]], &device);
    let translation = Tensor::<Backend, 1>::from_floats([0.2, 0.0], &device);
    let transform = AffineTransform::new(grid, matrix, translation);

    // Input in voxel indices, output in voxel indices
    let config = PointSetConfig::default().with_axes("grid").unwrap();
    let transformer = PointSetTransformer::new(transform, config).unwrap();
    assert_eq!(transformer.source_axes(), Axes::Grid);

    // Index (10, 5) is cube (1, 0), rotated to (0, 1), shifted to (0.2, 1), index (6, 10)
    let points = Tensor::<Backend, 2>::from_floats([[10.0, 5.0]], &device);
    let output = as_vec(transformer.forward(points).unwrap());
    assert!((output[0] - 6.0).abs() < 1e-4, "{:?}", output);
    assert!((output[1] - 10.0).abs() < 1e-4, "{:?}", output);
}

#[test]
fn test_leading_dims_are_preserved() {
    let device = Default::default();
    let grid = Grid::new([7, 6, 5]);
    let transformer = PointSetTransformer::new(
        AffineTransform::<Backend, 3>::identity(grid, &device),
        PointSetConfig::default().with_axes(Axes::World).unwrap(),
    )
    .unwrap();

    let points = Tensor::<Backend, 4>::random([2, 3, 4, 3], Distribution::Uniform(-5.0, 5.0), &device);
    let output = transformer.forward(points.clone()).unwrap();
    assert_eq!(output.dims(), [2, 3, 4, 3]);
    for (a, b) in as_vec(output).iter().zip(as_vec(points).iter()) {
        assert!((a - b).abs() < 1e-4);
    }

    let single = Tensor::<Backend, 1>::zeros([3], &device);
    assert!(matches!(
        transformer.forward(single),
        Err(TransformerError::ShapeMismatch { .. })
    ));
    let wrong = Tensor::<Backend, 3>::zeros([2, 4, 2], &device);
    match transformer.forward(wrong) {
        Err(TransformerError::ShapeMismatch { expected, actual }) => {
            assert_eq!(expected, vec![2, 4, 3]);
            assert_eq!(actual, vec![2, 4, 2]);
        }
        other => panic!("expected shape mismatch, got {:?}", other.map(|t| t.dims())),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_identity_round_trip(
        values in prop::collection::vec(-100.0f32..100.0, 12),
        axes in prop_oneof![Just(Axes::Grid), Just(Axes::Cube), Just(Axes::CubeCorners), Just(Axes::World)],
        batched in any::<bool>(),
    ) {
        let device = Default::default();
        let grid = oblique_grid();
        let transformer = PointSetTransformer::<Backend, _, 2>::new(
            IdentityTransform::new(grid.clone()).with_axes(Axes::World),
            PointSetConfig::default().with_axes(axes).unwrap(),
        ).unwrap();

        let points = Tensor::<Backend, 1>::from_floats(values.as_slice(), &device);
        let output = if batched {
            as_vec(transformer.forward(points.clone().reshape([2, 3, 2])).unwrap())
        } else {
            as_vec(transformer.forward(points.clone().reshape([6, 2])).unwrap())
        };
        for (a, b) in output.iter().zip(values.iter()) {
            prop_assert!((a - b).abs() < 1e-3, "{} vs {}", a, b);
        }
    }

    #[test]
    fn test_same_convention_is_exact(
        values in prop::collection::vec(-10.0f32..10.0, 8),
    ) {
        let device = Default::default();
        let transformer = PointSetTransformer::<Backend, _, 2>::new(
            IdentityTransform::new(oblique_grid()),
            PointSetConfig::default(),
        ).unwrap();
        let points = Tensor::<Backend, 1>::from_floats(values.as_slice(), &device).reshape([1, 4, 2]);
        prop_assert_eq!(as_vec(transformer.forward(points).unwrap()), values);
    }
}

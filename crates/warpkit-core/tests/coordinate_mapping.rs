use burn::tensor::Tensor;
use burn_ndarray::NdArray;
use proptest::prelude::*;
use warpkit_core::spatial::{Direction, Point, Spacing};
use warpkit_core::{Axes, Grid};

type Backend = NdArray<f32>;
const D: usize = 3;

fn make_rotation(angle_x: f64, angle_y: f64, angle_z: f64) -> Direction<D> {
    let (sx, cx) = angle_x.sin_cos();
    let (sy, cy) = angle_y.sin_cos();
    let (sz, cz) = angle_z.sin_cos();

    let rz = Direction::<D>::new(
        cz, -sz, 0.0,
        sz, cz, 0.0,
        0.0, 0.0, 1.0,
    );
    let ry = Direction::<D>::new(
        cy, 0.0, sy,
        0.0, 1.0, 0.0,
        -sy, 0.0, cy,
    );
    let rx = Direction::<D>::new(
        1.0, 0.0, 0.0,
        0.0, cx, -sx,
        0.0, sx, cx,
    );
    rx * ry * rz
}

fn axes_strategy() -> impl Strategy<Value = Axes> {
    prop_oneof![
        Just(Axes::Grid),
        Just(Axes::Cube),
        Just(Axes::CubeCorners),
        Just(Axes::World),
    ]
}

proptest! {
    #[test]
    fn test_coordinate_roundtrip(
        ox in -100.0f64..100.0, oy in -100.0f64..100.0, oz in -100.0f64..100.0,
        sx in 0.1f64..5.0, sy in 0.1f64..5.0, sz in 0.1f64..5.0,
        ax in -3.14f64..3.14, ay in -3.14f64..3.14, az in -3.14f64..3.14,
        px in -50.0f64..50.0, py in -50.0f64..50.0, pz in -50.0f64..50.0,
        axes in axes_strategy(),
    ) {
        let grid = Grid::new([7, 12, 5])
            .with_spacing(Spacing::<D>::new(sx, sy, sz))
            .with_direction(make_rotation(ax, ay, az))
            .with_origin(Point::<D>::new(ox, oy, oz));

        let point = Point::<D>::new(px, py, pz);
        let to_axes = grid.world_to_axes(axes).unwrap();
        let to_world = grid.axes_to_world(axes).unwrap();
        let recovered = to_world.apply(&to_axes.apply(&point));

        prop_assert!((point - recovered).norm() < 1e-8, "{:?} vs {:?}", point, recovered);
    }

    #[test]
    fn test_grid_to_grid_map_composes(
        sx in 0.5f64..2.0, sy in 0.5f64..2.0,
        cx in -10.0f64..10.0, cy in -10.0f64..10.0,
        angle in -3.14f64..3.14,
        from in axes_strategy(), via in axes_strategy(), to in axes_strategy(),
    ) {
        let (s, c) = angle.sin_cos();
        let a = Grid::new([9, 6]);
        let b = Grid::new([5, 11])
            .with_spacing(Spacing::<2>::new(sx, sy))
            .with_direction(Direction::<2>::new(c, -s, s, c))
            .with_center(Point::<2>::new(cx, cy))
            .with_align_corners(false);

        let direct = a.transform_map(from, &b, to).unwrap();
        let composed = a
            .transform_map(from, &a, via)
            .unwrap()
            .then(&a.transform_map(via, &b, to).unwrap());

        let p = Point::<2>::new(0.3, -0.7);
        prop_assert!((direct.apply(&p) - composed.apply(&p)).norm() < 1e-8);
    }

    #[test]
    fn test_tensor_batch_consistency(
        ox in -10.0f64..10.0,
        sx in 0.5f64..2.0,
        px in -10.0f64..10.0
    ) {
        let device = Default::default();
        let grid = Grid::new([4, 4, 4])
            .with_spacing(Spacing::<D>::new(sx, sx, sx))
            .with_origin(Point::<D>::new(ox, ox, ox));

        let index_val = grid.world_to_axes(Axes::Grid).unwrap().apply(&Point::<D>::new(px, px, px));

        let points = Tensor::<Backend, 2>::from_floats([[px as f32, px as f32, px as f32]], &device);
        let indices = grid.world_to_index(points).unwrap();
        let indices_data = indices.into_data();
        let indices_slice = indices_data.as_slice::<f32>().unwrap();

        prop_assert!((indices_slice[0] - index_val[0] as f32).abs() < 1e-3);
        prop_assert!((indices_slice[1] - index_val[1] as f32).abs() < 1e-3);
        prop_assert!((indices_slice[2] - index_val[2] as f32).abs() < 1e-3);
    }
}

#[test]
fn test_same_convention_is_pass_through() {
    let device = Default::default();
    let grid = Grid::new([3, 3]).with_spacing(Spacing::<2>::new(0.3, 0.7));
    let points = Tensor::<Backend, 3>::from_floats([[[0.123456, -0.654321], [1.5, 2.5]]], &device);
    for axes in [Axes::Grid, Axes::Cube, Axes::CubeCorners, Axes::World] {
        let result = grid
            .transform_points(points.clone(), axes, &grid, axes, None)
            .unwrap();
        assert_eq!(
            result.into_data().as_slice::<f32>().unwrap(),
            points.clone().into_data().as_slice::<f32>().unwrap()
        );
    }
}

#[test]
fn test_index_cube_tensor_conversions() {
    let device = Default::default();
    let grid = Grid::new([5, 3]);
    let indices = Tensor::<Backend, 2>::from_floats([[0.0, 0.0], [4.0, 2.0], [2.0, 1.0]], &device);
    let cube = grid.index_to_cube(indices).unwrap();
    let data = cube.clone().into_data();
    let expected = [-1.0, -1.0, 1.0, 1.0, 0.0, 0.0];
    for (a, e) in data.as_slice::<f32>().unwrap().iter().zip(expected.iter()) {
        assert!((a - e).abs() < 1e-6);
    }

    let back = grid.cube_to_index(cube).unwrap().into_data();
    let expected = [0.0, 0.0, 4.0, 2.0, 2.0, 1.0];
    for (a, e) in back.as_slice::<f32>().unwrap().iter().zip(expected.iter()) {
        assert!((a - e).abs() < 1e-5);
    }

    let world = grid
        .index_to_world(Tensor::<Backend, 2>::from_floats([[0.0, 0.0]], &device))
        .unwrap()
        .into_data();
    assert_eq!(world.as_slice::<f32>().unwrap(), &[-2.0, -1.0]);
}

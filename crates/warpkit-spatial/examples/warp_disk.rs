//! Warp a synthetic disk image with an affine and a displacement field
//! transform, and map a point set through the same transform.
//!
//! Run with `RUST_LOG=debug` for construction logs.

use burn::tensor::Tensor;
use burn_ndarray::NdArray;
use tracing_subscriber::EnvFilter;
use warpkit_core::{circle_image, Grid, Padding, Point, Sampling};
use warpkit_spatial::{
    AffineTransform, DisplacementFieldTransform, ImageTransformer, ImageTransformerConfig, PointSetConfig,
    PointSetTransformer, SharedTransform,
};

type Backend = NdArray<f32>;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let device = Default::default();
    let grid = Grid::new([64, 33]);
    let image = circle_image::<Backend, 2>(grid.size(), Some(Point::<2>::new(24.0, 16.0)), Some(10.0), &device)
        .reshape([1, 1, 33, 64]);
    let input_mass = image.clone().sum().into_scalar();
    tracing::info!("Input disk mass: {}", input_mass);

    // Rotate by 90 degrees about the grid center and shift along x
    let matrix = Tensor::<Backend, 2>::from_floats([[0.0, -1.0], [1.0, 0.0]], &device);
    let translation = Tensor::<Backend, 1>::from_floats([0.25, 0.0], &device);
    let affine: SharedTransform<Backend, _, 2> =
        SharedTransform::new(AffineTransform::new(grid.clone(), matrix, translation));

    let config = ImageTransformerConfig::default()
        .with_sampling(Sampling::Linear)
        .with_padding(Padding::Zeros);
    let images = ImageTransformer::new(affine.clone(), config.clone(), &device)?;
    let rotated = images.sample(image.clone())?;
    tracing::info!("Affine warped disk mass: {}", rotated.sum().into_scalar());

    let points = PointSetTransformer::new(affine, PointSetConfig::default().with_axes("grid")?)?;
    let landmarks = Tensor::<Backend, 2>::from_floats([[24.0, 16.0], [34.0, 16.0], [24.0, 26.0]], &device);
    let mapped = points.forward(landmarks)?;
    tracing::info!("Mapped landmarks: {:?}", mapped.into_data().to_vec::<f32>());

    // Displacement field conditioned from outside, e.g. predicted by a network
    let field = DisplacementFieldTransform::<Backend, 2>::new(grid.clone(), &device)?;
    let warper = ImageTransformer::new(field, config, &device)?;
    let shift = 4.0 * 2.0 / (grid.size()[0] as f32 - 1.0);
    let displacement = Tensor::cat(
        vec![
            Tensor::<Backend, 3>::ones([1, 1, grid.numel()], &device).mul_scalar(shift),
            Tensor::<Backend, 3>::zeros([1, 1, grid.numel()], &device),
        ],
        1,
    );
    let shifted = warper.with_condition(Some(displacement)).sample(image)?;
    tracing::info!("Displaced disk mass: {}", shifted.sum().into_scalar());

    Ok(())
}

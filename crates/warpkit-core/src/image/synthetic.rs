//! Synthetic test images.

use burn::tensor::backend::Backend;
use burn::tensor::{Shape, Tensor, TensorData};

use crate::error::{Result, SpatialError};
use crate::spatial::Point;

/// Binary image of a disk (2D) or ball (3D).
///
/// # Arguments
/// * `size` - Image size `(x, y, z)`; the tensor has the reversed shape
/// * `center` - Center in voxel indices, defaults to the grid center
/// * `radius` - Radius in voxels, defaults to `min(size) / 2 - 1`
/// * `device` - The device to create the tensor on
///
/// Voxels whose squared distance to the center is at most `radius²` are one,
/// all others zero.
pub fn circle_image<B: Backend, const D: usize>(
    size: [usize; D],
    center: Option<Point<D>>,
    radius: Option<f64>,
    device: &B::Device,
) -> Tensor<B, D> {
    let center = center.unwrap_or_else(|| default_center(size));
    let radius = radius.unwrap_or_else(|| default_radius(size));
    let r2 = radius * radius;
    binary_image(size, device, |index| squared_distance(index, &center) <= r2)
}

/// Binary image of a C-shape, i.e. a disk ring opened towards `+x`.
///
/// # Arguments
/// * `size` - Image size `(x, y)`
/// * `center` - Center in voxel indices, defaults to the grid center
/// * `radius` - Outer radius in voxels, defaults to `min(size) / 2 - 1`
/// * `width` - Ring width in voxels, defaults to `floor(radius / 2)`
/// * `device` - The device to create the tensor on
///
/// A voxel is one when its squared distance `d²` to the center satisfies
/// `(radius - width)² < d² <= radius²` and it lies less than `width` to the
/// right of the center.
pub fn cshape_image<B: Backend>(
    size: [usize; 2],
    center: Option<Point<2>>,
    radius: Option<f64>,
    width: Option<f64>,
    device: &B::Device,
) -> Tensor<B, 2> {
    let center = center.unwrap_or_else(|| default_center(size));
    let radius = radius.unwrap_or_else(|| default_radius(size));
    let width = width.unwrap_or_else(|| (radius / 2.0).floor());
    let outer = radius * radius;
    let inner = (radius - width).max(0.0).powi(2);
    binary_image(size, device, |index| {
        let d2 = squared_distance(index, &center);
        d2 <= outer && d2 > inner && (index[0] as f64 - center[0]) < width
    })
}

/// Arrange a synthetic image as an image batch.
///
/// With `num == 0` the result is a single image `[1, ...shape]` with one
/// channel, otherwise a batch `[num, 1, ...shape]` of copies. The output
/// rank `R` must be `D + 1` or `D + 2` respectively.
pub fn image_batch<B: Backend, const D: usize, const R: usize>(image: Tensor<B, D>, num: usize) -> Result<Tensor<B, R>> {
    let leading = if num == 0 { 1 } else { 2 };
    if R != D + leading {
        return Err(SpatialError::dimension_mismatch(format!(
            "image_batch() with num={} yields rank {}, not {}",
            num,
            D + leading,
            R
        )));
    }
    let mut dims = vec![1usize; leading];
    dims.extend_from_slice(&image.dims());
    let image: Tensor<B, R> = image.reshape(Shape::from(dims));
    if num <= 1 {
        return Ok(image);
    }
    let mut times = vec![1usize; R];
    times[0] = num;
    Ok(image.repeat(&times))
}

fn default_center<const D: usize>(size: [usize; D]) -> Point<D> {
    let mut c = Point::<D>::origin();
    for i in 0..D {
        c[i] = (size[i] as f64 - 1.0) / 2.0;
    }
    c
}

fn default_radius<const D: usize>(size: [usize; D]) -> f64 {
    let min = size.iter().copied().min().unwrap_or(0);
    (min / 2) as f64 - 1.0
}

fn squared_distance<const D: usize>(index: &[usize; D], center: &Point<D>) -> f64 {
    (0..D).map(|i| (index[i] as f64 - center[i]).powi(2)).sum()
}

/// Evaluate `inside` at every voxel index `(x, y, z)` in tensor order.
fn binary_image<B: Backend, const D: usize>(
    size: [usize; D],
    device: &B::Device,
    inside: impl Fn(&[usize; D]) -> bool,
) -> Tensor<B, D> {
    let total: usize = size.iter().product();
    let mut values = Vec::with_capacity(total);
    let mut index = [0usize; D];
    for _ in 0..total {
        values.push(if inside(&index) { 1.0f32 } else { 0.0 });
        for i in 0..D {
            index[i] += 1;
            if index[i] < size[i] {
                break;
            }
            index[i] = 0;
        }
    }

    let mut shape = size;
    shape.reverse();
    Tensor::<B, D>::from_data(TensorData::new(values, Shape::new(shape)), device)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    fn sums(tensor: Tensor<TestBackend, 2>, dim: usize) -> Vec<f32> {
        tensor.sum_dim(dim).into_data().as_slice::<f32>().unwrap().to_vec()
    }

    #[test]
    fn test_circle_image_rows() {
        let device = Default::default();
        let image = circle_image::<TestBackend, 2>([64, 33], Some(Point::<2>::new(16.0, 16.0)), None, &device);
        assert_eq!(image.dims(), [33, 64]);

        let rows = sums(image, 1);
        let expected_head = [0.0, 1.0, 11.0, 15.0, 19.0, 21.0, 23.0, 25.0, 25.0, 27.0, 27.0];
        assert_eq!(&rows[..expected_head.len()], &expected_head);
        assert_eq!(rows[16], 31.0);
        // Symmetric about the center row
        for y in 0..=16 {
            assert_eq!(rows[16 - y], rows[16 + y]);
        }
    }

    #[test]
    fn test_ball_default_center() {
        let device = Default::default();
        let image = circle_image::<TestBackend, 3>([5, 5, 5], None, Some(1.0), &device);
        // 6-neighbourhood plus center
        let total = image.sum().into_data();
        assert_eq!(total.as_slice::<f32>().unwrap(), &[7.0]);
    }

    #[test]
    fn test_cshape_image_sums() {
        let device = Default::default();
        let image = cshape_image::<TestBackend>([64, 33], Some(Point::<2>::new(16.0, 16.0)), None, None, &device);
        assert_eq!(image.dims(), [33, 64]);

        let expected_rows = [
            0.0, 1.0, 11.0, 14.0, 16.0, 17.0, 18.0, 19.0, 18.0, 13.0, 9.0, 8.0, 8.0, 7.0, 7.0, 7.0, 7.0, 7.0, 7.0, 7.0,
            8.0, 8.0, 9.0, 13.0, 18.0, 19.0, 18.0, 17.0, 16.0, 14.0, 11.0, 1.0, 0.0,
        ];
        assert_eq!(sums(image.clone(), 1), expected_rows.to_vec());

        let expected_columns = [
            0.0, 1.0, 11.0, 15.0, 19.0, 21.0, 23.0, 25.0, 24.0, 20.0, 16.0, 16.0, 16.0, 14.0, 14.0, 14.0, 14.0, 14.0,
            14.0, 14.0, 16.0, 16.0, 16.0, 0.0,
        ];
        let columns = sums(image, 0);
        assert_eq!(&columns[..expected_columns.len()], &expected_columns);
        assert!(columns[expected_columns.len()..].iter().all(|&c| c == 0.0));
    }

    #[test]
    fn test_image_batch_shapes() {
        let device = Default::default();
        let image = circle_image::<TestBackend, 2>([64, 33], Some(Point::<2>::new(16.0, 16.0)), None, &device);

        let single = image_batch::<TestBackend, 2, 3>(image.clone(), 0).unwrap();
        assert_eq!(single.dims(), [1, 33, 64]);

        let batch = image_batch::<TestBackend, 2, 4>(image.clone(), 3).unwrap();
        assert_eq!(batch.dims(), [3, 1, 33, 64]);
        let per_image = batch.sum_dim(3).sum_dim(2).into_data();
        let total = image.clone().sum().into_data().as_slice::<f32>().unwrap()[0];
        assert_eq!(per_image.as_slice::<f32>().unwrap(), &[total; 3]);

        assert!(image_batch::<TestBackend, 2, 4>(image.clone(), 0).is_err());
        assert!(image_batch::<TestBackend, 2, 3>(image, 1).is_err());
    }
}

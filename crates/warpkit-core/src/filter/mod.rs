pub mod sample;

pub use sample::{check_batch_shape, ImageSampler, MASK_THRESHOLD};

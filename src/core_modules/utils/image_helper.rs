pub mod image_helper {
    use crate::error::{HeatmapError, HeatmapResult};
    use image::RgbImage;
    use std::path::Path;

    /// Decodes any supported image file into an 8-bit RGB buffer.
    pub fn decode_image(path: &Path) -> HeatmapResult<RgbImage> {
        let image = image::open(path).map_err(|source| HeatmapError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(image.to_rgb8())
    }

    /// Writes `image` to `path`, picking the format from the file extension.
    pub fn encode_image(image: &RgbImage, path: &Path) -> HeatmapResult<()> {
        image.save(path).map_err(|source| HeatmapError::Encode {
            path: path.to_path_buf(),
            source,
        })
    }
}

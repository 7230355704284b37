use std::path::Path;

use image::{GrayImage, ImageReader, RgbImage};
use log::debug;

use crate::error::{LocateError, LocateResult};

/// Decode an image file into 8-bit RGB, whatever its stored layout.
///
/// The format is guessed from the file content, not the extension.
pub fn load_rgb<P: AsRef<Path>>(path: P) -> LocateResult<RgbImage> {
    let path = path.as_ref();
    let load_err = |source| LocateError::ImageLoad {
        path: path.to_path_buf(),
        source,
    };
    let img = ImageReader::open(path)
        .map_err(|e| load_err(image::ImageError::IoError(e)))?
        .with_guessed_format()
        .map_err(|e| load_err(image::ImageError::IoError(e)))?
        .decode()
        .map_err(load_err)?;

    debug!(
        "loaded {} ({}x{}, {:?})",
        path.display(),
        img.width(),
        img.height(),
        img.color()
    );
    Ok(img.to_rgb8())
}

/// Encode `img` to `path`, format chosen by the extension
pub fn save_rgb<P: AsRef<Path>>(img: &RgbImage, path: P) -> LocateResult<()> {
    let path = path.as_ref();
    img.save(path).map_err(|source| LocateError::ImageWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Luma image used for detection
pub fn to_gray(img: &RgbImage) -> GrayImage {
    image::imageops::grayscale(img)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, Rgba, RgbaImage};

    #[test]
    fn rgb_channel_order_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("colors.png");
        let img = RgbImage::from_fn(4, 2, |x, _| match x {
            0 => Rgb([255, 0, 0]),
            1 => Rgb([0, 255, 0]),
            2 => Rgb([0, 0, 255]),
            _ => Rgb([10, 20, 30]),
        });
        save_rgb(&img, &path).unwrap();
        assert_eq!(load_rgb(&path).unwrap(), img);
    }

    #[test]
    fn gray_and_rgba_files_become_rgb() {
        let dir = tempfile::tempdir().unwrap();

        let gray_path = dir.path().join("gray.png");
        GrayImage::from_pixel(3, 3, Luma([77])).save(&gray_path).unwrap();
        let loaded = load_rgb(&gray_path).unwrap();
        assert_eq!(loaded.dimensions(), (3, 3));
        assert!(loaded.pixels().all(|p| *p == Rgb([77, 77, 77])));

        let rgba_path = dir.path().join("rgba.png");
        RgbaImage::from_pixel(2, 2, Rgba([9, 8, 7, 128])).save(&rgba_path).unwrap();
        assert!(load_rgb(&rgba_path).unwrap().pixels().all(|p| *p == Rgb([9, 8, 7])));
    }

    #[test]
    fn format_comes_from_content() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("real.png");
        RgbImage::from_pixel(2, 2, Rgb([1, 2, 3])).save(&png).unwrap();
        let misnamed = dir.path().join("looks_like.jpeg");
        std::fs::copy(&png, &misnamed).unwrap();
        assert_eq!(load_rgb(&misnamed).unwrap().get_pixel(1, 1), &Rgb([1, 2, 3]));
    }

    #[test]
    fn missing_and_corrupt_files_fail() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.png");
        match load_rgb(&missing) {
            Err(LocateError::ImageLoad { path, .. }) => assert_eq!(path, missing),
            other => panic!("expected ImageLoad, got {other:?}"),
        }

        let corrupt = dir.path().join("corrupt.png");
        std::fs::write(&corrupt, b"definitely not an image").unwrap();
        assert!(matches!(load_rgb(&corrupt), Err(LocateError::ImageLoad { .. })));
    }

    #[test]
    fn unwritable_output_fails() {
        let dir = tempfile::tempdir().unwrap();
        let img = RgbImage::new(2, 2);
        let bad = dir.path().join("missing_dir").join("out.png");
        assert!(matches!(save_rgb(&img, &bad), Err(LocateError::ImageWrite { .. })));
        let unknown = dir.path().join("out.unknown_ext");
        assert!(matches!(save_rgb(&img, &unknown), Err(LocateError::ImageWrite { .. })));
    }

    #[test]
    fn gray_conversion_keeps_dimensions() {
        let img = RgbImage::from_pixel(5, 3, Rgb([100, 100, 100]));
        let gray = to_gray(&img);
        assert_eq!(gray.dimensions(), (5, 3));
        assert_eq!(gray.get_pixel(4, 2), &Luma([100]));
    }
}

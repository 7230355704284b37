#![allow(dead_code)]

use std::path::Path;

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::geometric_transformations::{warp, Interpolation, Projection};
use imageproc::rect::Rect;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const SCENE_BACKGROUND: u8 = 128;

/// Checkerboard whose cells take random shades, dark and light alternating.
///
/// Neighbouring junctions differ, so each one gives a distinct descriptor.
pub fn random_checker(size: u32, cell: u32, seed: u64) -> RgbImage {
    const DARK: [u8; 3] = [20, 60, 100];
    const LIGHT: [u8; 3] = [150, 195, 240];

    let cells = size.div_ceil(cell);
    let mut rng = StdRng::seed_from_u64(seed);
    let shades: Vec<u8> = (0..cells * cells)
        .map(|i| {
            let (cx, cy) = (i % cells, i / cells);
            let palette = if (cx + cy) % 2 == 0 { &DARK } else { &LIGHT };
            palette[rng.gen_range(0..palette.len())]
        })
        .collect();

    RgbImage::from_fn(size, size, |x, y| {
        let v = shades[((y / cell) * cells + x / cell) as usize];
        Rgb([v, v, v])
    })
}

/// Flat gray scene with `target` pasted at `(left, top)`
pub fn scene_with(target: &RgbImage, width: u32, height: u32, left: u32, top: u32) -> RgbImage {
    let mut scene = RgbImage::from_pixel(
        width,
        height,
        Rgb([SCENE_BACKGROUND, SCENE_BACKGROUND, SCENE_BACKGROUND]),
    );
    image::imageops::replace(&mut scene, target, left as i64, top as i64);
    scene
}

pub fn blank_scene(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(
        width,
        height,
        Rgb([SCENE_BACKGROUND, SCENE_BACKGROUND, SCENE_BACKGROUND]),
    )
}

/// Target at (150, 150) in a 400x400 scene; returns both paths
pub fn write_translated_pair(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
    let target = random_checker(100, 10, 7);
    let scene = scene_with(&target, 400, 400, 150, 150);
    let target_path = dir.join("target.png");
    let frame_path = dir.join("frame.png");
    target.save(&target_path).unwrap();
    scene.save(&frame_path).unwrap();
    (target_path, frame_path)
}

/// Gradient ground covered by overlapping rectangles and discs of random
/// shades, so every corner sees a different neighbourhood
pub fn random_shapes(size: u32, seed: u64) -> RgbImage {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut img = RgbImage::from_fn(size, size, |x, y| {
        let v = (60 + (x + 2 * y) * 80 / (3 * size)) as u8;
        Rgb([v, v, v])
    });
    for _ in 0..70 {
        let v: u8 = rng.gen_range(0..=255);
        let cx = rng.gen_range(0..size as i32);
        let cy = rng.gen_range(0..size as i32);
        if rng.gen_bool(0.7) {
            let w = rng.gen_range(8..36);
            let h = rng.gen_range(8..36);
            draw_filled_rect_mut(
                &mut img,
                Rect::at(cx - w as i32 / 2, cy - h as i32 / 2).of_size(w, h),
                Rgb([v, v, v]),
            );
        } else {
            let r = rng.gen_range(5..16);
            draw_filled_circle_mut(&mut img, (cx, cy), r, Rgb([v, v, v]));
        }
    }
    img
}

/// Scene of side `scene_size` holding `target` scaled by `scale`, turned by
/// `degrees` and centered at the scene center
pub fn warped_scene(target: &RgbImage, scene_size: u32, scale: f32, degrees: f32) -> RgbImage {
    let canvas = scene_with(target, scene_size, scene_size, 0, 0);
    let half_scene = scene_size as f32 / 2.0;
    let projection = Projection::translate(half_scene, half_scene)
        * Projection::rotate(degrees.to_radians())
        * Projection::scale(scale, scale)
        * Projection::translate(-(target.width() as f32) / 2.0, -(target.height() as f32) / 2.0);
    warp(
        &canvas,
        &projection,
        Interpolation::Bilinear,
        Rgb([SCENE_BACKGROUND, SCENE_BACKGROUND, SCENE_BACKGROUND]),
    )
}

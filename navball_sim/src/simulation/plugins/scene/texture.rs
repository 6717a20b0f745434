// navball_sim/src/simulation/plugins/scene/texture.rs

//! The procedural navball texture, laid out for Bevy's UV sphere.

use bevy::asset::RenderAssetUsages;
use bevy::image::Image;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};

pub const TEXTURE_WIDTH: u32 = 1024;
pub const TEXTURE_HEIGHT: u32 = 512;

/// Texture column (as a fraction of the width) facing render +Z once the
/// sphere mesh is stood upright. Render +Z is telemetry north.
pub const NORTH_U: f64 = 0.75;

const SKY: [u8; 4] = [38, 110, 196, 255];
const GROUND: [u8; 4] = [139, 90, 43, 255];
const LINE: [u8; 4] = [240, 240, 240, 255];
const NORTH: [u8; 4] = [220, 40, 40, 255];

const HORIZON_HALF_WIDTH_DEG: f64 = 1.2;
const LADDER_HALF_WIDTH_DEG: f64 = 0.5;
const LADDER_STEP_DEG: f64 = 30.0;
const MERIDIAN_HALF_WIDTH_DEG: f64 = 0.5;
const MERIDIAN_STEP_DEG: f64 = 45.0;

/// Distance from `value` to the nearest multiple of `step`.
fn off_grid(value: f64, step: f64) -> f64 {
    let r = value.rem_euclid(step);
    r.min(step - r)
}

/// The color at texture coordinate (`u`, `v`), both in `[0, 1]`, with `v = 0`
/// at the sky pole.
pub fn navball_color(u: f64, v: f64) -> [u8; 4] {
    let latitude = 90.0 - v * 180.0;
    let longitude = u * 360.0;

    let north_offset = (longitude - NORTH_U * 360.0).abs();
    if north_offset / 4.0 + latitude.abs() / 8.0 < 1.0 {
        return NORTH;
    }
    if latitude.abs() < HORIZON_HALF_WIDTH_DEG {
        return LINE;
    }
    // Pitch ladder, skipping the horizon and the poles.
    if latitude.abs() < 90.0 - LADDER_STEP_DEG / 2.0
        && off_grid(latitude, LADDER_STEP_DEG) < LADDER_HALF_WIDTH_DEG
    {
        return LINE;
    }
    if off_grid(longitude, MERIDIAN_STEP_DEG) < MERIDIAN_HALF_WIDTH_DEG {
        return LINE;
    }
    if latitude > 0.0 {
        SKY
    } else {
        GROUND
    }
}

/// Row-major RGBA8 pixels, sampled at pixel centers.
pub fn navball_pixels(width: u32, height: u32) -> Vec<u8> {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for py in 0..height {
        let v = (py as f64 + 0.5) / height as f64;
        for px in 0..width {
            let u = (px as f64 + 0.5) / width as f64;
            data.extend_from_slice(&navball_color(u, v));
        }
    }
    data
}

pub fn navball_image() -> Image {
    Image::new(
        Extent3d {
            width: TEXTURE_WIDTH,
            height: TEXTURE_HEIGHT,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        navball_pixels(TEXTURE_WIDTH, TEXTURE_HEIGHT),
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::default(),
    )
}

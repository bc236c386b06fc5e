// src/png.rs
//! Превью карты в PNG
//!
//! Каждая клетка рисуется квадратом [`TILE_PX`]×[`TILE_PX`]. Жидкости имеют
//! фиксированные цвета, цвет тайла местности выводится из хеша его имени, поэтому
//! один и тот же тайл всегда выглядит одинаково. Объекты рисуются кружками в центре клетки.

use crate::error::FileError;
use crate::generator::GeneratedMap;
use crate::grid::Grid;
use crate::liquid::Liquid;
use image::{ImageBuffer, Rgba, RgbaImage};
use imageproc::drawing::draw_filled_circle_mut;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::path::Path;

/// Размер клетки в пикселях
pub const TILE_PX: u32 = 8;

/// Цвет тайла: фиксированный для жидкостей, производный от имени для местности.
#[must_use]
pub fn tile_rgb(tile: &str) -> [u8; 3] {
    if let Ok(liquid) = tile.parse::<Liquid>() {
        return liquid.to_rgb();
    }
    let [r, g, b, _] = fnv1a(tile).to_le_bytes();
    // приглушённые тона, чтобы жидкости выделялись
    [80 + r % 120, 70 + g % 110, 60 + b % 100]
}

fn fnv1a(text: &str) -> u32 {
    text.bytes().fold(0x811c_9dc5, |hash, byte| {
        (hash ^ u32::from(byte)).wrapping_mul(0x0100_0193)
    })
}

/// Раскладывает сетку в RGBA-буфер размером `width·TILE_PX × height·TILE_PX`.
#[must_use]
pub fn to_rgba_image(grid: &Grid) -> Vec<u8> {
    let colors: Vec<[u8; 3]> = grid.data.iter().map(|t| tile_rgb(t)).collect();
    let tile = TILE_PX as usize;
    let img_width = grid.width * tile;
    let pixel_count = img_width * grid.height * tile;

    let pixel = |i: usize| {
        let x = (i % img_width) / tile;
        let y = (i / img_width) / tile;
        let [r, g, b] = colors[y * grid.width + x];
        [r, g, b, 255]
    };

    #[cfg(feature = "parallel")]
    let data = (0..pixel_count).into_par_iter().flat_map_iter(pixel).collect();
    #[cfg(not(feature = "parallel"))]
    let data = (0..pixel_count).flat_map(pixel).collect();
    data
}

/// Рисует превью карты вместе с объектами.
pub fn render_preview(map: &GeneratedMap) -> Result<RgbaImage, FileError> {
    let width = map.grid.width as u32 * TILE_PX;
    let height = map.grid.height as u32 * TILE_PX;
    let mut img: RgbaImage = ImageBuffer::from_raw(width, height, to_rgba_image(&map.grid))
        .ok_or(FileError::ImageBuffer { width, height })?;

    let radius = (TILE_PX / 3) as i32;
    for (at, object) in map.objects.iter() {
        let [r, g, b] = tile_rgb(object);
        let center = (
            (at.x as u32 * TILE_PX + TILE_PX / 2) as i32,
            (at.y as u32 * TILE_PX + TILE_PX / 2) as i32,
        );
        draw_filled_circle_mut(&mut img, center, radius, Rgba([r / 2, g / 2, b / 2, 255]));
    }
    Ok(img)
}

pub fn save_preview(map: &GeneratedMap, path: impl AsRef<Path>) -> Result<(), FileError> {
    render_preview(map)?.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Coord;

    #[test]
    fn liquid_colors_are_fixed() {
        assert_eq!(tile_rgb("lava"), Liquid::Lava.to_rgb());
        assert_eq!(tile_rgb("msc"), tile_rgb("msc"));
        assert_ne!(tile_rgb("msc"), tile_rgb("mscd"));
    }

    #[test]
    fn each_tile_becomes_a_square() {
        let mut grid = Grid::filled(2, 1, "msc");
        grid.set(Coord::new(1, 0), "water");
        let data = to_rgba_image(&grid);

        let tile = TILE_PX as usize;
        assert_eq!(data.len(), 2 * tile * tile * 4);

        let at = |x: usize, y: usize| {
            let i = (y * 2 * tile + x) * 4;
            [data[i], data[i + 1], data[i + 2]]
        };
        assert_eq!(at(0, 0), tile_rgb("msc"));
        assert_eq!(at(tile - 1, tile - 1), tile_rgb("msc"));
        assert_eq!(at(tile, 0), Liquid::Water.to_rgb());
        assert_eq!(at(2 * tile - 1, tile - 1), Liquid::Water.to_rgb());
    }
}

use crate::error::ConfigError;
use rand::Rng;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Координата клетки: `x` это столбец, `y` это строка
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub x: usize,
    pub y: usize,
}

impl Coord {
    #[must_use]
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Соседство по 8 направлениям (диагонали считаются).
    #[must_use]
    pub fn is_adjacent8(self, other: Coord) -> bool {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        dx <= 1 && dy <= 1 && (dx, dy) != (0, 0)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl Serialize for Coord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Прямоугольная сетка тайлов, хранится построчно
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
    pub data: Vec<String>,
}

impl Grid {
    /// Сетка, целиком заполненная одним тайлом.
    #[must_use]
    pub fn filled(width: usize, height: usize, tile: &str) -> Self {
        Self {
            width,
            height,
            data: vec![tile.to_string(); width * height],
        }
    }

    pub fn get(&self, at: Coord) -> &str {
        &self.data[at.y * self.width + at.x]
    }

    pub fn set(&mut self, at: Coord, tile: &str) {
        let idx = at.y * self.width + at.x;
        tile.clone_into(&mut self.data[idx]);
    }

    /// Сдвиг на `(dy, dx)`; `None`, если результат вне сетки.
    #[must_use]
    pub fn offset(&self, from: Coord, dy: i32, dx: i32) -> Option<Coord> {
        let x = from.x as i64 + i64::from(dx);
        let y = from.y as i64 + i64::from(dy);
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(Coord::new(x as usize, y as usize))
    }

    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.data.chunks(self.width.max(1))
    }

    /// Количество клеток каждого тайла.
    #[must_use]
    pub fn tile_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for tile in &self.data {
            *counts.entry(tile.as_str()).or_insert(0) += 1;
        }
        counts
    }
}

impl Serialize for Grid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.rows())
    }
}

/// Заполняет сетку тайлами, выбранными независимо и равновероятно из `tiles`.
///
/// Ровно одно обращение к генератору на клетку, строка за строкой.
pub fn build_grid<R: Rng + ?Sized>(
    width: usize,
    height: usize,
    tiles: &[String],
    rng: &mut R,
) -> Result<Grid, ConfigError> {
    if tiles.is_empty() {
        return Err(ConfigError::EmptyTileSet);
    }
    if width == 0 || height == 0 {
        return Err(ConfigError::InvalidDimensions {
            width: width as i64,
            height: height as i64,
        });
    }

    let mut data = Vec::with_capacity(width * height);
    for _y in 0..height {
        for _x in 0..width {
            data.push(tiles[rng.gen_range(0..tiles.len())].clone());
        }
    }

    Ok(Grid {
        width,
        height,
        data,
    })
}

// src/error.rs
//! Ошибки и предупреждения генерации
//!
//! - [`ConfigError`]: фатальные ошибки конфигурации, генерация не начинается
//! - [`GenerationWarning`]: нефатальные ситуации, собираются в отчёт вместе с результатом
//! - [`FileError`]: ошибки чтения конфигурации и сохранения карты/превью

use serde::Serialize;
use thiserror::Error;

use crate::liquid::Liquid;

/// Ошибка конфигурации. Возвращается до первого обращения к генератору случайных чисел.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("набор тайлов местности пуст")]
    EmptyTileSet,

    #[error("размеры карты должны быть положительными: {width}×{height}")]
    InvalidDimensions { width: i64, height: i64 },

    #[error("отрицательное количество объектов `{object}`: {count}")]
    NegativeCount { object: String, count: i64 },

    #[error("неверный диапазон для `{object}`: {min}-{max}")]
    InvalidRange { object: String, min: i64, max: i64 },

    #[error("не удалось разобрать количество `{0}`: ожидается `N` или `MIN-MAX`")]
    UnparsableCount(String),

    #[error("тайл местности `{0}` совпадает с названием жидкости")]
    TileIsLiquid(String),

    #[error("неверные границы жилы для {liquid}: {reason}")]
    InvalidVeinBounds { liquid: Liquid, reason: String },

    #[error("пустая стартовая зона: x {x_min}..{x_max}, y {y_min}..{y_max}")]
    InvalidStartZone {
        x_min: usize,
        x_max: usize,
        y_min: usize,
        y_max: usize,
    },
}

/// Нефатальные ситуации генерации.
///
/// Каждое предупреждение попадает в отчёт и дублируется в лог через `tracing::warn!`.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationWarning {
    #[error("неизвестная жидкость `{name}` пропущена")]
    UnknownLiquid { name: String },

    #[error("жидкость {liquid} указана повторно, повтор пропущен")]
    DuplicateLiquid { liquid: Liquid },

    #[error("нет подходящей стартовой клетки для {liquid}")]
    VeinStartNotFound { liquid: Liquid },

    #[error("жила {liquid} упёрлась в тупик: {length} из {target}")]
    DeadEndTruncation {
        liquid: Liquid,
        length: usize,
        target: usize,
    },

    #[error("размещено только {placed}/{target} объектов `{object}`")]
    PlacementShortfall {
        object: String,
        placed: usize,
        target: usize,
    },
}

/// Ошибка чтения конфигурации или записи результата.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("ошибка сериализации JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("ошибка чтения TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("ошибка изображения: {0}")]
    Image(#[from] image::ImageError),

    #[error("не удалось создать буфер изображения {width}×{height}")]
    ImageBuffer { width: u32, height: u32 },
}

// src/config.rs
//! Конфигурация генерации карты
//!
//! Модуль описывает два уровня настроек:
//! - [`MapConfig`]: «сырая» конфигурация, как она пришла из TOML-файла или CLI
//! - [`GenerationParams`]: проверенные и строго типизированные параметры, с которыми работает ядро
//!
//! Переход между ними выполняет [`MapConfig::validate`]: все фатальные ошибки
//! ([`ConfigError`]) обнаруживаются здесь, до первого обращения к генератору случайных чисел.
//! Неизвестные и повторяющиеся жидкости не считаются ошибкой: они отбрасываются с предупреждением.

use crate::error::{ConfigError, FileError, GenerationWarning};
use crate::liquid::Liquid;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::ops::Range;
use std::path::Path;
use tracing::warn;

/// Границы одной жилы (все диапазоны включительные)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VeinBounds {
    /// Минимальная длина основного пути (по умолчанию 20)
    #[serde(default = "default_min_length")]
    pub min_length: usize,

    /// Максимальная длина основного пути (по умолчанию 50)
    #[serde(default = "default_max_length")]
    pub max_length: usize,

    /// Минимальное число боковых тайлов на шаг (по умолчанию 1)
    #[serde(default = "default_min_width")]
    pub min_width: usize,

    /// Максимальное число боковых тайлов на шаг (по умолчанию 3)
    #[serde(default = "default_max_width")]
    pub max_width: usize,
}

fn default_min_length() -> usize {
    20
}
fn default_max_length() -> usize {
    50
}
fn default_min_width() -> usize {
    1
}
fn default_max_width() -> usize {
    3
}

impl Default for VeinBounds {
    fn default() -> Self {
        Self {
            min_length: 20,
            max_length: 50,
            min_width: 1,
            max_width: 3,
        }
    }
}

impl VeinBounds {
    #[must_use]
    pub fn new(min_length: usize, max_length: usize, min_width: usize, max_width: usize) -> Self {
        Self {
            min_length,
            max_length,
            min_width,
            max_width,
        }
    }

    fn check(&self, liquid: Liquid) -> Result<(), ConfigError> {
        let reason = if self.min_length == 0 {
            Some("min_length должен быть не меньше 1".to_string())
        } else if self.min_length > self.max_length {
            Some(format!(
                "длина {}-{}: минимум больше максимума",
                self.min_length, self.max_length
            ))
        } else if self.min_width > self.max_width {
            Some(format!(
                "ширина {}-{}: минимум больше максимума",
                self.min_width, self.max_width
            ))
        } else {
            None
        };

        match reason {
            Some(reason) => Err(ConfigError::InvalidVeinBounds { liquid, reason }),
            None => Ok(()),
        }
    }
}

/// Стартовая зона жил (полуоткрытые интервалы)
///
/// Жилы всегда начинаются внутри этой зоны, обрезанной по границам сетки,
/// см. [`StartZone::clip`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartZone {
    #[serde(default = "default_zone_x_min")]
    pub x_min: usize,
    #[serde(default = "default_zone_x_max")]
    pub x_max: usize,
    #[serde(default = "default_zone_y_min")]
    pub y_min: usize,
    #[serde(default = "default_zone_y_max")]
    pub y_max: usize,
}

fn default_zone_x_min() -> usize {
    5
}
fn default_zone_x_max() -> usize {
    11
}
fn default_zone_y_min() -> usize {
    9
}
fn default_zone_y_max() -> usize {
    15
}

impl Default for StartZone {
    fn default() -> Self {
        Self {
            x_min: 5,
            x_max: 11,
            y_min: 9,
            y_max: 15,
        }
    }
}

impl StartZone {
    /// Возвращает диапазоны `(x, y)`, гарантированно лежащие внутри сетки `width × height`.
    ///
    /// По каждой оси зона пересекается с сеткой. Если пересечение пусто (зона
    /// целиком за краем), берётся полоса той же ширины у дальнего края сетки.
    ///
    /// # Примеры
    /// ```
    /// use tilemap::config::StartZone;
    /// let zone = StartZone::default();
    /// assert_eq!(zone.clip(24, 16), (5..11, 9..15));
    /// assert_eq!(zone.clip(10, 12), (5..10, 9..12));
    /// assert_eq!(zone.clip(4, 4), (0..4, 0..4));
    /// ```
    #[must_use]
    pub fn clip(&self, width: usize, height: usize) -> (Range<usize>, Range<usize>) {
        (
            clip_axis(self.x_min, self.x_max, width),
            clip_axis(self.y_min, self.y_max, height),
        )
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.x_min >= self.x_max || self.y_min >= self.y_max {
            return Err(ConfigError::InvalidStartZone {
                x_min: self.x_min,
                x_max: self.x_max,
                y_min: self.y_min,
                y_max: self.y_max,
            });
        }
        Ok(())
    }
}

fn clip_axis(min: usize, max: usize, dim: usize) -> Range<usize> {
    let end = max.min(dim);
    if min < end {
        return min..end;
    }
    // зона целиком за краем: та же ширина у дальнего края; перевёрнутая зона пуста
    let extent = max.saturating_sub(min).min(dim);
    dim - extent..dim
}

/// Количество объектов одного типа
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectCount {
    /// Ровно `n` объектов
    Fixed(usize),
    /// Случайное количество из `[min, max]`
    Range { min: usize, max: usize },
}

impl ObjectCount {
    /// Разбирает запись вида `"3"` или `"1-5"`.
    ///
    /// Отрицательные числа в текстовой записи не поддерживаются: `"-3"` даёт
    /// [`ConfigError::UnparsableCount`].
    pub fn parse(object: &str, text: &str) -> Result<Self, ConfigError> {
        let unparsable = || ConfigError::UnparsableCount(text.to_string());
        let text = text.trim();

        if let Some((min, max)) = text.split_once('-') {
            let min: usize = min.trim().parse().map_err(|_| unparsable())?;
            let max: usize = max.trim().parse().map_err(|_| unparsable())?;
            return Self::range(object, min as i64, max as i64);
        }

        text.parse::<usize>()
            .map(ObjectCount::Fixed)
            .map_err(|_| unparsable())
    }

    fn range(object: &str, min: i64, max: i64) -> Result<Self, ConfigError> {
        if min < 0 {
            return Err(ConfigError::NegativeCount {
                object: object.to_string(),
                count: min,
            });
        }
        if min > max {
            return Err(ConfigError::InvalidRange {
                object: object.to_string(),
                min,
                max,
            });
        }
        Ok(ObjectCount::Range {
            min: min as usize,
            max: max as usize,
        })
    }
}

/// Количество объектов в том виде, в каком оно записано в конфигурации
///
/// ```toml
/// [objects]
/// rock = 5
/// mossystone = [1, 5]
/// stonemossy = "5-10"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawCount {
    Number(i64),
    Pair([i64; 2]),
    Text(String),
}

impl RawCount {
    pub fn resolve(&self, object: &str) -> Result<ObjectCount, ConfigError> {
        match self {
            RawCount::Number(n) if *n < 0 => Err(ConfigError::NegativeCount {
                object: object.to_string(),
                count: *n,
            }),
            RawCount::Number(n) => Ok(ObjectCount::Fixed(*n as usize)),
            RawCount::Pair([min, max]) => ObjectCount::range(object, *min, *max),
            RawCount::Text(text) => ObjectCount::parse(object, text),
        }
    }
}

/// Основные параметры генерации карты
///
/// Полная «сырая» конфигурация одной карты. Поддерживает загрузку из TOML-файлов.
#[derive(Debug, Clone, Deserialize)]
pub struct MapConfig {
    /// Имя карты (используется в имени выходного файла)
    #[serde(default = "default_name")]
    pub name: String,

    /// Сид генератора; без него берётся случайный и возвращается в результате
    #[serde(default)]
    pub seed: Option<u64>,

    /// Ширина карты в тайлах (по умолчанию 24)
    #[serde(default = "default_width")]
    pub width: i64,

    /// Высота карты в тайлах (по умолчанию 16)
    #[serde(default = "default_height")]
    pub height: i64,

    /// Тайлы местности, из которых заполняется сетка
    #[serde(default)]
    pub terrain: Vec<String>,

    /// Жидкости для жил, по одной жиле на тип
    #[serde(default)]
    pub liquids: Vec<String>,

    /// Переопределение границ жил, ключом служит название жидкости
    #[serde(default)]
    pub veins: BTreeMap<String, VeinBounds>,

    /// Зона, в которой начинаются жилы
    #[serde(default)]
    pub start_zone: StartZone,

    /// Объекты для размещения, в порядке объявления
    #[serde(default, deserialize_with = "ordered_entries")]
    pub objects: Vec<(String, RawCount)>,
}

fn default_name() -> String {
    "map".to_string()
}
fn default_width() -> i64 {
    24
}
fn default_height() -> i64 {
    16
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            seed: None,
            width: 24,
            height: 16,
            terrain: Vec::new(),
            liquids: Vec::new(),
            veins: BTreeMap::new(),
            start_zone: StartZone::default(),
            objects: Vec::new(),
        }
    }
}

/// Проверенные параметры генерации
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationParams {
    pub name: String,
    pub seed: Option<u64>,
    pub width: usize,
    pub height: usize,
    pub terrain: Vec<String>,
    /// Распознанные жидкости без повторов, в порядке запроса
    pub liquids: Vec<Liquid>,
    /// Границы для каждой из `liquids`
    pub veins: BTreeMap<Liquid, VeinBounds>,
    pub start_zone: StartZone,
    pub objects: Vec<(String, ObjectCount)>,
}

impl MapConfig {
    /// Загружает конфигурацию из TOML-файла
    ///
    /// # Пример
    /// ```toml
    /// # cave.toml
    /// name = "Slime Cave"
    /// seed = 42
    /// terrain = ["msc", "mscd"]
    /// liquids = ["slime", "lava"]
    ///
    /// [objects]
    /// mossystone = "1-5"
    /// ```
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, FileError> {
        let contents = fs::read_to_string(path)?;
        Ok(Self::from_toml_str(&contents)?)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Проверяет конфигурацию и превращает её в [`GenerationParams`].
    ///
    /// Неизвестные жидкости и повторы отбрасываются, для каждого из них возвращается предупреждение.
    pub fn validate(&self) -> Result<(GenerationParams, Vec<GenerationWarning>), ConfigError> {
        if self.width <= 0 || self.height <= 0 {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.terrain.is_empty() {
            return Err(ConfigError::EmptyTileSet);
        }
        if let Some(tile) = self.terrain.iter().find(|t| t.parse::<Liquid>().is_ok()) {
            return Err(ConfigError::TileIsLiquid(tile.clone()));
        }
        self.start_zone.check()?;

        let mut warnings = Vec::new();
        let mut liquids: Vec<Liquid> = Vec::new();
        for name in &self.liquids {
            match name.parse::<Liquid>() {
                Ok(liquid) if liquids.contains(&liquid) => {
                    warn!(%liquid, "повторная жидкость пропущена");
                    warnings.push(GenerationWarning::DuplicateLiquid { liquid });
                }
                Ok(liquid) => liquids.push(liquid),
                Err(name) => {
                    warn!(%name, "неизвестная жидкость пропущена");
                    warnings.push(GenerationWarning::UnknownLiquid { name });
                }
            }
        }

        let mut veins = BTreeMap::new();
        for &liquid in &liquids {
            let bounds = self.veins.get(liquid.as_str()).copied().unwrap_or_default();
            bounds.check(liquid)?;
            veins.insert(liquid, bounds);
        }

        let objects = self
            .objects
            .iter()
            .map(|(object, raw)| raw.resolve(object).map(|count| (object.clone(), count)))
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let params = GenerationParams {
            name: self.name.clone(),
            seed: self.seed,
            width: self.width as usize,
            height: self.height as usize,
            terrain: self.terrain.clone(),
            liquids,
            veins,
            start_zone: self.start_zone,
            objects,
        };
        Ok((params, warnings))
    }
}

/// Читает таблицу TOML в вектор пар, сохраняя порядок ключей в документе.
fn ordered_entries<'de, D>(deserializer: D) -> Result<Vec<(String, RawCount)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct EntriesVisitor;

    impl<'de> Visitor<'de> for EntriesVisitor {
        type Value = Vec<(String, RawCount)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("таблица `тип = количество`")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry::<String, RawCount>()? {
                entries.push(entry);
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(EntriesVisitor)
}

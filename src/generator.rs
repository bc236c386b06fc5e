// src/generator.rs
//! Полный цикл генерации карты
//!
//! Генератор владеет единственным `ChaCha8Rng` и одалживает его компонентам
//! строго по очереди:
//! 1. [`build_grid`]: одно обращение на клетку, построчно
//! 2. [`carve_veins`]: жидкости в порядке запроса
//! 3. [`place_objects`]: типы объектов в порядке объявления
//!
//! При одинаковом сиде и конфигурации результат совпадает побитово.

use crate::config::{GenerationParams, MapConfig};
use crate::error::{ConfigError, GenerationWarning};
use crate::grid::{Grid, build_grid};
use crate::objects::{ObjectMap, PlacementReport, place_objects};
use crate::veins::{VeinReport, carve_veins};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::info;

/// Диагностика одной генерации
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    pub veins: Vec<VeinReport>,
    pub placements: Vec<PlacementReport>,
    /// Все нефатальные ситуации, включая отброшенные при проверке конфигурации жидкости
    pub warnings: Vec<GenerationWarning>,
}

/// Результат генерации: сетка, объекты и отчёт
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedMap {
    pub name: String,
    /// Сид, с которым реально шла генерация (случайный, если не был задан)
    pub seed: u64,
    pub grid: Grid,
    pub objects: ObjectMap,
    #[serde(skip)]
    pub report: GenerationReport,
}

/// Проверяет конфигурацию и генерирует карту.
///
/// Ошибка возвращается только при неверной конфигурации; всё остальное попадает
/// в `report.warnings`.
pub fn generate_map(config: &MapConfig) -> Result<GeneratedMap, ConfigError> {
    let (params, warnings) = config.validate()?;
    let mut map = generate(&params)?;
    map.report.warnings.splice(0..0, warnings);
    Ok(map)
}

/// Генерирует карту по уже проверенным параметрам.
pub fn generate(params: &GenerationParams) -> Result<GeneratedMap, ConfigError> {
    let seed = params.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    info!(
        name = %params.name,
        seed,
        width = params.width,
        height = params.height,
        "генерация карты"
    );

    let mut grid = build_grid(params.width, params.height, &params.terrain, &mut rng)?;

    let (veins, mut warnings) = carve_veins(
        &mut grid,
        &params.terrain,
        &params.liquids,
        &params.veins,
        &params.start_zone,
        &mut rng,
    );

    let (objects, placements, placement_warnings) =
        place_objects(grid.width, grid.height, &params.objects, &mut rng);
    warnings.extend(placement_warnings);

    info!(
        veins = veins.len(),
        objects = objects.len(),
        warnings = warnings.len(),
        "карта готова"
    );

    Ok(GeneratedMap {
        name: params.name.clone(),
        seed,
        grid,
        objects,
        report: GenerationReport {
            veins,
            placements,
            warnings,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RawCount;

    fn cave() -> MapConfig {
        MapConfig {
            name: "Slime Cave".into(),
            seed: Some(1234),
            terrain: vec!["msc".into(), "mscd".into()],
            liquids: vec!["slime".into(), "lava".into()],
            objects: vec![
                ("mossystone".into(), RawCount::Text("1-5".into())),
                ("stonemossy".into(), RawCount::Number(7)),
            ],
            ..MapConfig::default()
        }
    }

    #[test]
    fn same_seed_same_map() {
        let first = generate_map(&cave()).unwrap();
        let second = generate_map(&cave()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn different_seed_changes_map() {
        let first = generate_map(&cave()).unwrap();
        let mut other = cave();
        other.seed = Some(4321);
        let second = generate_map(&other).unwrap();
        assert_ne!(first.grid, second.grid);
    }

    #[test]
    fn unseeded_run_reports_its_seed() {
        let mut config = cave();
        config.seed = None;
        let map = generate_map(&config).unwrap();

        config.seed = Some(map.seed);
        let replay = generate_map(&config).unwrap();
        assert_eq!(map.grid, replay.grid);
        assert_eq!(map.objects, replay.objects);
    }

    #[test]
    fn config_warnings_come_first() {
        let mut config = cave();
        config.liquids.insert(0, "fire".into());
        let map = generate_map(&config).unwrap();
        assert_eq!(
            map.report.warnings.first(),
            Some(&GenerationWarning::UnknownLiquid {
                name: "fire".into()
            })
        );
        assert_eq!(map.report.veins.len(), 2);
    }

    #[test]
    fn invalid_config_is_fatal() {
        let mut config = cave();
        config.objects.push(("rock".into(), RawCount::Number(-2)));
        assert!(matches!(
            generate_map(&config),
            Err(ConfigError::NegativeCount { .. })
        ));
    }
}

// src/veins.rs
//! Жилы жидкостей
//!
//! Для каждой жидкости прорезается ровно одна связная жила: случайное блуждание
//! по 8 направлениям с инерцией (продолжение прямо весит 10, плавный поворот 3,
//! остальное 1) и боковыми тайлами, придающими жиле ширину.
//!
//! Порядок обращений к генератору фиксирован: длина, ширина, попытки старта
//! (`y`, затем `x`), затем на каждом шаге выбор соседа и, если нужны боковые тайлы,
//! их количество и по одному выбору стороны на тайл.

use crate::config::{StartZone, VeinBounds};
use crate::error::GenerationWarning;
use crate::grid::{Coord, Grid};
use crate::liquid::Liquid;
use rand::Rng;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::ops::Range;
use tracing::{debug, info, warn};

/// Направления `(dy, dx)` в порядке перебора соседей
const DIRECTIONS: [(i32, i32); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

/// Сколько раз пытаемся найти стартовую клетку в стартовой зоне
pub const START_ATTEMPTS: usize = 200;

const WEIGHT_STRAIGHT: u32 = 10;
const WEIGHT_SOFT_TURN: u32 = 3;
const WEIGHT_OTHER: u32 = 1;

/// Итог прорезания одной жилы
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VeinReport {
    pub liquid: Liquid,
    pub target_length: usize,
    pub max_side_width: usize,
    /// Основной путь в порядке обхода
    pub path: Vec<Coord>,
    /// Боковые тайлы в порядке появления
    pub side_tiles: Vec<Coord>,
}

impl VeinReport {
    /// Путь упёрся в тупик раньше, чем достиг целевой длины.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.path.len() < self.target_length
    }

    #[must_use]
    pub fn total_tiles(&self) -> usize {
        self.path.len() + self.side_tiles.len()
    }
}

/// Прорезает по одной жиле на каждую жидкость из `liquids`, у которой есть границы в `bounds`.
///
/// Сетка меняется на месте. Жидкость без стартовой клетки пропускается,
/// тупик обрезает жилу; обе ситуации возвращаются как предупреждения.
pub fn carve_veins<R: Rng + ?Sized>(
    grid: &mut Grid,
    terrain: &[String],
    liquids: &[Liquid],
    bounds: &BTreeMap<Liquid, VeinBounds>,
    start_zone: &StartZone,
    rng: &mut R,
) -> (Vec<VeinReport>, Vec<GenerationWarning>) {
    let terrain: HashSet<&str> = terrain.iter().map(String::as_str).collect();
    let zone = start_zone.clip(grid.width, grid.height);

    let mut reports = Vec::new();
    let mut warnings = Vec::new();

    for &liquid in liquids {
        let Some(vein_bounds) = bounds.get(&liquid) else {
            debug!(%liquid, "нет границ жилы, жидкость пропущена");
            continue;
        };

        match carve_vein(grid, &terrain, liquid, vein_bounds, &zone, rng) {
            Some(report) => {
                info!(
                    %liquid,
                    main = report.path.len(),
                    side = report.side_tiles.len(),
                    target = report.target_length,
                    "жила прорезана"
                );
                if report.is_truncated() {
                    warn!(%liquid, length = report.path.len(), target = report.target_length, "жила упёрлась в тупик");
                    warnings.push(GenerationWarning::DeadEndTruncation {
                        liquid,
                        length: report.path.len(),
                        target: report.target_length,
                    });
                }
                reports.push(report);
            }
            None => {
                warn!(%liquid, "нет подходящей стартовой клетки");
                warnings.push(GenerationWarning::VeinStartNotFound { liquid });
            }
        }
    }

    (reports, warnings)
}

fn carve_vein<R: Rng + ?Sized>(
    grid: &mut Grid,
    terrain: &HashSet<&str>,
    liquid: Liquid,
    bounds: &VeinBounds,
    (zone_x, zone_y): &(Range<usize>, Range<usize>),
    rng: &mut R,
) -> Option<VeinReport> {
    let target_length = rng.gen_range(bounds.min_length..=bounds.max_length);
    let max_side_width = rng.gen_range(bounds.min_width..=bounds.max_width);

    let start = find_start(grid, terrain, zone_x, zone_y, rng)?;
    let tile = liquid.as_str();

    grid.set(start, tile);
    let mut path = vec![start];
    let mut on_path = HashSet::from([start]);
    let mut side_tiles = Vec::new();

    let mut current = start;
    let mut heading: Option<(i32, i32)> = None;

    while path.len() < target_length {
        let candidates: Vec<(u32, Coord, (i32, i32))> = DIRECTIONS
            .iter()
            .filter_map(|&step| {
                let next = grid.offset(current, step.0, step.1)?;
                if !terrain.contains(grid.get(next)) || on_path.contains(&next) {
                    return None;
                }
                Some((step_weight(step, heading), next, step))
            })
            .collect();

        let Some((next, step)) = pick_weighted(&candidates, rng) else {
            break;
        };

        grid.set(next, tile);
        path.push(next);
        on_path.insert(next);
        current = next;
        heading = Some(step);

        if max_side_width > 0 && path.len() >= 2 {
            let (dy, dx) = step;
            let perpendiculars = [(-dx, dy), (dx, -dy)];

            let side_count = rng.gen_range(0..=max_side_width);
            for _ in 0..side_count {
                let side = perpendiculars[rng.gen_range(0..perpendiculars.len())];
                if let Some(at) = place_side_tile(grid, terrain, &on_path, current, side, tile) {
                    side_tiles.push(at);
                }
            }
        }
    }

    Some(VeinReport {
        liquid,
        target_length,
        max_side_width,
        path,
        side_tiles,
    })
}

/// Ставит не больше одного бокового тайла в сторону `(dy, dx)` от `from`:
/// ближнюю клетку, а если она занята, то клетку через одну.
fn place_side_tile(
    grid: &mut Grid,
    terrain: &HashSet<&str>,
    on_path: &HashSet<Coord>,
    from: Coord,
    (dy, dx): (i32, i32),
    tile: &str,
) -> Option<Coord> {
    for dist in 1..=2 {
        let Some(side) = grid.offset(from, dy * dist, dx * dist) else {
            continue;
        };
        if terrain.contains(grid.get(side)) && !on_path.contains(&side) {
            grid.set(side, tile);
            return Some(side);
        }
    }
    None
}

fn find_start<R: Rng + ?Sized>(
    grid: &Grid,
    terrain: &HashSet<&str>,
    zone_x: &Range<usize>,
    zone_y: &Range<usize>,
    rng: &mut R,
) -> Option<Coord> {
    if zone_x.is_empty() || zone_y.is_empty() {
        return None;
    }
    for _ in 0..START_ATTEMPTS {
        let y = rng.gen_range(zone_y.clone());
        let x = rng.gen_range(zone_x.clone());
        let at = Coord::new(x, y);
        if terrain.contains(grid.get(at)) {
            return Some(at);
        }
    }
    None
}

/// Вес шага с учётом направления предыдущего шага.
fn step_weight(step: (i32, i32), heading: Option<(i32, i32)>) -> u32 {
    let Some(prev) = heading else {
        return WEIGHT_OTHER;
    };
    if step == prev {
        WEIGHT_STRAIGHT
    } else if (step.0 - prev.0).abs() + (step.1 - prev.1).abs() <= 1 {
        WEIGHT_SOFT_TURN
    } else {
        WEIGHT_OTHER
    }
}

/// Взвешенный выбор по накопленной сумме: одно обращение к генератору.
fn pick_weighted<R: Rng + ?Sized>(
    candidates: &[(u32, Coord, (i32, i32))],
    rng: &mut R,
) -> Option<(Coord, (i32, i32))> {
    let (_, last, last_step) = *candidates.last()?;
    let total: u32 = candidates.iter().map(|c| c.0).sum();
    let pick = rng.r#gen::<f64>() * f64::from(total);

    let mut cumulative = 0.0;
    for &(weight, at, step) in candidates {
        cumulative += f64::from(weight);
        if pick <= cumulative {
            return Some((at, step));
        }
    }
    Some((last, last_step))
}

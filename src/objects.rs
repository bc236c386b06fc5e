use crate::config::ObjectCount;
use crate::error::GenerationWarning;
use crate::grid::Coord;
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use tracing::{debug, warn};

/// Лимит попыток размещения на один тип объектов
pub const PLACEMENT_ATTEMPTS: usize = 1000;

/// Точечные объекты карты: координата → тип объекта
///
/// Каждая координата занята не более чем одним объектом, это проверяется при вставке.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ObjectMap(BTreeMap<Coord, String>);

impl ObjectMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Вставляет объект, если клетка свободна. Возвращает `false`, если клетка уже занята.
    pub fn try_insert(&mut self, at: Coord, object: &str) -> bool {
        match self.0.entry(at) {
            Entry::Vacant(slot) => {
                slot.insert(object.to_string());
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    pub fn get(&self, at: Coord) -> Option<&str> {
        self.0.get(&at).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Coord, &str)> {
        self.0.iter().map(|(&at, object)| (at, object.as_str()))
    }

    /// Число объектов заданного типа.
    #[must_use]
    pub fn count_of(&self, object: &str) -> usize {
        self.0.values().filter(|o| *o == object).count()
    }
}

/// Итог размещения одного типа объектов
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacementReport {
    pub object: String,
    pub placed: usize,
    pub target: usize,
}

impl PlacementReport {
    #[must_use]
    pub fn shortfall(&self) -> usize {
        self.target - self.placed
    }
}

/// Размещает объекты методом отбора: случайная клетка по всей карте, занятые отбрасываются.
///
/// Содержимое тайлов не учитывается, жидкость так же пригодна, как и местность.
/// На каждый тип даётся не более [`PLACEMENT_ATTEMPTS`] попыток.
pub fn place_objects<R: Rng + ?Sized>(
    width: usize,
    height: usize,
    specs: &[(String, ObjectCount)],
    rng: &mut R,
) -> (ObjectMap, Vec<PlacementReport>, Vec<GenerationWarning>) {
    let mut objects = ObjectMap::new();
    let mut reports = Vec::with_capacity(specs.len());
    let mut warnings = Vec::new();

    for (object, count) in specs {
        let target = match *count {
            ObjectCount::Fixed(n) => n,
            ObjectCount::Range { min, max } => rng.gen_range(min..=max),
        };

        let mut placed = 0;
        let mut attempts = 0;
        let has_cells = width > 0 && height > 0;
        while has_cells && placed < target && attempts < PLACEMENT_ATTEMPTS {
            let x = rng.gen_range(0..width);
            let y = rng.gen_range(0..height);
            if objects.try_insert(Coord::new(x, y), object) {
                placed += 1;
            }
            attempts += 1;
        }

        debug!(object = %object, placed, target, attempts, "объекты размещены");
        if placed < target {
            warn!(object = %object, placed, target, "не хватило попыток размещения");
            warnings.push(GenerationWarning::PlacementShortfall {
                object: object.clone(),
                placed,
                target,
            });
        }
        reports.push(PlacementReport {
            object: object.clone(),
            placed,
            target,
        });
    }

    (objects, reports, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn overfull_grid_reports_shortfall() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let specs = vec![("rock".to_string(), ObjectCount::Fixed(5))];
        let (objects, reports, warnings) = place_objects(2, 2, &specs, &mut rng);

        assert_eq!(objects.len(), 4);
        assert_eq!(reports[0].placed, 4);
        assert_eq!(reports[0].shortfall(), 1);
        assert_eq!(
            warnings,
            vec![GenerationWarning::PlacementShortfall {
                object: "rock".into(),
                placed: 4,
                target: 5
            }]
        );
    }

    #[test]
    fn zero_count_places_nothing() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let specs = vec![("rock".to_string(), ObjectCount::Fixed(0))];
        let (objects, reports, warnings) = place_objects(24, 16, &specs, &mut rng);
        assert!(objects.is_empty());
        assert_eq!(reports[0].target, 0);
        assert!(warnings.is_empty());
    }

    #[test]
    fn range_count_stays_in_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let specs = vec![
            ("mossystone".to_string(), ObjectCount::Range { min: 1, max: 5 }),
            ("stonemossy".to_string(), ObjectCount::Range { min: 5, max: 10 }),
        ];
        let (objects, reports, warnings) = place_objects(24, 16, &specs, &mut rng);

        assert!(warnings.is_empty());
        assert!((1..=5).contains(&reports[0].placed));
        assert!((5..=10).contains(&reports[1].placed));
        assert_eq!(objects.count_of("mossystone"), reports[0].placed);
        assert_eq!(objects.len(), reports[0].placed + reports[1].placed);
        for (at, _) in objects.iter() {
            assert!(at.x < 24 && at.y < 16);
        }
    }

    #[test]
    fn later_types_do_not_overwrite_earlier() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let specs = vec![
            ("a".to_string(), ObjectCount::Fixed(3)),
            ("b".to_string(), ObjectCount::Fixed(3)),
        ];
        let (objects, reports, _) = place_objects(2, 2, &specs, &mut rng);
        assert_eq!(objects.count_of("a"), 3);
        assert_eq!(objects.count_of("b"), 1);
        assert_eq!(reports[1].shortfall(), 2);
    }

    #[test]
    fn try_insert_rejects_occupied() {
        let mut objects = ObjectMap::new();
        assert!(objects.try_insert(Coord::new(1, 2), "rock"));
        assert!(!objects.try_insert(Coord::new(1, 2), "tree"));
        assert_eq!(objects.get(Coord::new(1, 2)), Some("rock"));
    }

    #[test]
    fn serializes_with_xy_keys() {
        let mut objects = ObjectMap::new();
        objects.try_insert(Coord::new(3, 1), "rock");
        assert_eq!(
            serde_json::to_string(&objects).unwrap(),
            r#"{"3,1":"rock"}"#
        );
    }
}

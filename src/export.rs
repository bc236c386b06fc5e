// src/export.rs
//! Сохранение карты в JSON
//!
//! Формат рассчитан на чтение глазами: каждая строка сетки занимает одну строку файла,
//! объекты идут по одному на строку.
//!
//! ```json
//! {
//!   "name": "Slime Cave",
//!   "grid": [
//!     ["msc","mscd","msc"],
//!     ["slime","slime","msc"]
//!   ],
//!   "objects": {
//!     "0,1": "mossystone"
//!   }
//! }
//! ```

use crate::error::FileError;
use crate::generator::GeneratedMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// Имя файла карты: `"Slime Cave"` → `"slime_cave.json"`.
///
/// Разделители путей и ведущие точки отбрасываются, так что файл всегда
/// остаётся в выходном каталоге.
#[must_use]
pub fn map_file_name(name: &str) -> String {
    let stem: String = name
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '/' | '\\'))
        .map(|c| if c == ' ' { '_' } else { c })
        .collect();
    let stem = stem.trim_start_matches('.');
    if stem.is_empty() {
        "map.json".to_string()
    } else {
        format!("{stem}.json")
    }
}

/// Собирает JSON-документ карты с построчной сеткой.
pub fn to_compact_json(map: &GeneratedMap) -> Result<String, FileError> {
    let mut out = String::from("{\n");
    let _ = writeln!(out, "  \"name\": {},", serde_json::to_string(&map.name)?);

    out.push_str("  \"grid\": [\n");
    let rows: Vec<String> = map
        .grid
        .rows()
        .map(serde_json::to_string)
        .collect::<Result<_, _>>()?;
    for (i, row) in rows.iter().enumerate() {
        let comma = if i + 1 < rows.len() { "," } else { "" };
        let _ = writeln!(out, "    {row}{comma}");
    }
    out.push_str("  ],\n");

    if map.objects.is_empty() {
        out.push_str("  \"objects\": {}\n");
    } else {
        out.push_str("  \"objects\": {\n");
        let entries: Vec<String> = map
            .objects
            .iter()
            .map(|(at, object)| -> Result<String, serde_json::Error> {
                Ok(format!(
                    "    {}: {}",
                    serde_json::to_string(&at)?,
                    serde_json::to_string(object)?
                ))
            })
            .collect::<Result<_, _>>()?;
        out.push_str(&entries.join(",\n"));
        out.push_str("\n  }\n");
    }
    out.push('}');
    Ok(out)
}

/// Записывает карту в `dir`, создавая каталог при необходимости. Возвращает путь к файлу.
pub fn write_map_json(map: &GeneratedMap, dir: impl AsRef<Path>) -> Result<PathBuf, FileError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let path = dir.join(map_file_name(&map.name));
    fs::write(&path, to_compact_json(map)?)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MapConfig, RawCount};
    use crate::generator::generate_map;

    fn small_map() -> GeneratedMap {
        let config = MapConfig {
            name: "Slime Cave".into(),
            seed: Some(5),
            width: 6,
            height: 4,
            terrain: vec!["msc".into(), "mscd".into()],
            liquids: vec!["slime".into()],
            objects: vec![("rock".into(), RawCount::Number(3))],
            ..MapConfig::default()
        };
        generate_map(&config).unwrap()
    }

    #[test]
    fn file_name_from_map_name() {
        assert_eq!(map_file_name("Slime Cave"), "slime_cave.json");
    }

    #[test]
    fn file_name_cannot_leave_directory() {
        assert_eq!(map_file_name("../x"), "x.json");
        assert_eq!(map_file_name("a/b\\c"), "abc.json");
        assert_eq!(map_file_name(".."), "map.json");

        let dir = tempfile::tempdir().unwrap();
        let mut map = small_map();
        map.name = "../../escape".into();
        let path = write_map_json(&map, dir.path()).unwrap();
        assert_eq!(path.parent(), Some(dir.path()));
        assert!(path.ends_with("escape.json"));
    }

    #[test]
    fn compact_json_is_valid_and_row_per_line() {
        let map = small_map();
        let text = to_compact_json(&map).unwrap();

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["name"], "Slime Cave");
        assert_eq!(value["grid"].as_array().unwrap().len(), 4);
        assert_eq!(value["objects"].as_object().unwrap().len(), 3);
        for (at, object) in map.objects.iter() {
            assert_eq!(value["objects"][at.to_string()], object);
        }

        // строка файла на каждую строку сетки
        let grid_lines = text.lines().filter(|l| l.trim_start().starts_with("[\"")).count();
        assert_eq!(grid_lines, 4);
    }

    #[test]
    fn empty_objects_still_valid_json() {
        let mut map = small_map();
        map.objects = crate::objects::ObjectMap::new();
        let text = to_compact_json(&map).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(value["objects"].as_object().unwrap().is_empty());
    }

    #[test]
    fn writes_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let map = small_map();
        let path = write_map_json(&map, dir.path().join("maps")).unwrap();
        assert!(path.ends_with("slime_cave.json"));
        assert_eq!(fs::read_to_string(path).unwrap(), to_compact_json(&map).unwrap());
    }
}

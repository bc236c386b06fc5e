use clap::Parser;
use std::path::PathBuf;
use tilemap::export::write_map_json;
use tilemap::png::save_preview;
use tilemap::{MapConfig, RawCount, generate_map};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Генератор тайловых карт: местность, жилы жидкостей и объекты
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Путь к конфигурационному файлу в формате TOML
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Имя карты (определяет имя выходного файла)
    #[arg(short, long)]
    name: Option<String>,

    /// Сид генератора
    #[arg(short, long)]
    seed: Option<u64>,

    /// Ширина карты в тайлах
    #[arg(long)]
    width: Option<i64>,

    /// Высота карты в тайлах
    #[arg(long)]
    height: Option<i64>,

    /// Тайлы местности, через запятую или повтором флага
    #[arg(short, long, value_delimiter = ',')]
    terrain: Vec<String>,

    /// Жидкости для жил (slime, lava, water, poison, acid)
    #[arg(short, long, value_delimiter = ',')]
    liquid: Vec<String>,

    /// Объекты в виде `тип=количество` или `тип=мин-макс`
    #[arg(long, value_parser = parse_object)]
    object: Vec<(String, String)>,

    /// Каталог для JSON-файла карты
    #[arg(short, long, default_value = "maps")]
    output: PathBuf,

    /// Путь для сохранения PNG-превью
    #[arg(short, long)]
    preview: Option<PathBuf>,
}

fn parse_object(arg: &str) -> Result<(String, String), String> {
    let (object, count) = arg
        .split_once('=')
        .ok_or_else(|| format!("ожидается `тип=количество`, получено `{arg}`"))?;
    let object = object.trim();
    if object.is_empty() {
        return Err(format!("пустой тип объекта в `{arg}`"));
    }
    Ok((object.to_string(), count.trim().to_string()))
}

impl Cli {
    /// Конфигурация из файла (или по умолчанию) с поверх наложенными флагами.
    fn into_config(self) -> Result<MapConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => MapConfig::from_toml_file(path)?,
            None => MapConfig::default(),
        };

        if let Some(name) = self.name {
            config.name = name;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if !self.terrain.is_empty() {
            config.terrain = self.terrain;
        }
        if !self.liquid.is_empty() {
            config.liquids = self.liquid;
        }
        for (object, count) in self.object {
            config.objects.retain(|(o, _)| *o != object);
            config.objects.push((object, RawCount::Text(count)));
        }
        Ok(config)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("tilemap=warn".parse()?))
        .init();

    let cli = Cli::parse();
    let output = cli.output.clone();
    let preview = cli.preview.clone();

    println!("🔍 Загрузка конфигурации...");
    let config = cli.into_config()?;

    println!(
        "Генерация карты «{}» (размер: {}×{})...",
        config.name, config.width, config.height
    );
    let map = generate_map(&config)?;

    for vein in &map.report.veins {
        println!(
            "  {}: {} основных + {} боковых тайлов (цель {})",
            vein.liquid,
            vein.path.len(),
            vein.side_tiles.len(),
            vein.target_length
        );
    }
    for warning in &map.report.warnings {
        println!("  ⚠ {warning}");
    }

    let path = write_map_json(&map, &output)?;
    println!("\nГотово! Карта сохранена в {}", path.display());
    println!(
        "   {}×{} | {} тайлов | {} жил | {} объектов",
        map.grid.height,
        map.grid.width,
        map.grid.data.len(),
        map.report.veins.len(),
        map.objects.len()
    );
    println!("   Тайлы: {:?}", map.grid.tile_counts());
    println!("   Сид: {}", map.seed);

    if let Some(preview) = preview {
        save_preview(&map, &preview)?;
        println!("   Превью: {}", preview.display());
    }
    Ok(())
}

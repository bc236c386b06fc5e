use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Жидкость, из которой прорезается жила
///
/// Словарь закрыт: всё, что не входит в него, отбрасывается при проверке конфигурации.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Liquid {
    Slime,
    Lava,
    Water,
    Poison,
    Acid,
}

impl Liquid {
    pub const ALL: [Liquid; 5] = [
        Liquid::Slime,
        Liquid::Lava,
        Liquid::Water,
        Liquid::Poison,
        Liquid::Acid,
    ];

    /// Идентификатор тайла, которым жидкость записывается в сетку.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Liquid::Slime => "slime",
            Liquid::Lava => "lava",
            Liquid::Water => "water",
            Liquid::Poison => "poison",
            Liquid::Acid => "acid",
        }
    }

    pub fn to_rgb(self) -> [u8; 3] {
        match self {
            Liquid::Slime => [110, 200, 60],
            Liquid::Lava => [230, 90, 20],
            Liquid::Water => [40, 110, 220],
            Liquid::Poison => [140, 60, 170],
            Liquid::Acid => [200, 230, 40],
        }
    }
}

impl fmt::Display for Liquid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Liquid {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Liquid::ALL
            .into_iter()
            .find(|l| l.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_liquids() {
        for liquid in Liquid::ALL {
            assert_eq!(liquid.as_str().parse::<Liquid>(), Ok(liquid));
        }
    }

    #[test]
    fn rejects_unknown_liquid() {
        assert_eq!("fire".parse::<Liquid>(), Err("fire".to_string()));
        // регистр имеет значение
        assert!("Lava".parse::<Liquid>().is_err());
    }
}

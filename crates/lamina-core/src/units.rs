//! Length units. Internally every length is stored in metres.

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    #[serde(alias = "A")]
    Angstrom,
    #[default]
    #[serde(alias = "nm")]
    Nanometre,
    #[serde(alias = "um")]
    Micrometre,
    #[serde(alias = "mm")]
    Millimetre,
    #[serde(alias = "m")]
    Metre,
}

impl LengthUnit {
    /// Size of one unit in metres.
    pub fn in_metres(self) -> f64 {
        match self {
            LengthUnit::Angstrom => 1e-10,
            LengthUnit::Nanometre => 1e-9,
            LengthUnit::Micrometre => 1e-6,
            LengthUnit::Millimetre => 1e-3,
            LengthUnit::Metre => 1.0,
        }
    }
}

/// A physical length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length {
    metres: f64,
}

impl Length {
    pub fn new(value: f64, unit: LengthUnit) -> Self {
        Self {
            metres: value * unit.in_metres(),
        }
    }

    pub fn nm(value: f64) -> Self {
        Self::new(value, LengthUnit::Nanometre)
    }

    pub fn metres(&self) -> f64 {
        self.metres
    }

    pub fn nanometres(&self) -> f64 {
        self.metres / LengthUnit::Nanometre.in_metres()
    }

    pub fn to(&self, unit: LengthUnit) -> f64 {
        self.metres / unit.in_metres()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_units_normalise_to_metres() {
        assert_relative_eq!(Length::new(1.55, LengthUnit::Micrometre).metres(), 1.55e-6);
        assert_relative_eq!(Length::new(15.5, LengthUnit::Angstrom).nanometres(), 1.55);
        assert_relative_eq!(Length::nm(250.0).to(LengthUnit::Micrometre), 0.25);
    }
}

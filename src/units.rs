//! Length units and the directed conversion factor table.
//!
//! Factors are the published rounded constants, authored per direction.
//! `factor(a, b)` is not derived from `factor(b, a)` and many pairs have no
//! entry at all.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Unit {
    Miles,
    Yards,
    Feet,
    Inches,
    Millimeters,
    Centimeters,
    Meters,
    Kilometers,
}

impl Unit {
    pub const ALL: [Unit; 8] = [
        Unit::Miles,
        Unit::Yards,
        Unit::Feet,
        Unit::Inches,
        Unit::Millimeters,
        Unit::Centimeters,
        Unit::Meters,
        Unit::Kilometers,
    ];

    /// Upper-case plural name, the form used in error messages.
    pub fn canonical_name(self) -> &'static str {
        match self {
            Unit::Miles => "MILES",
            Unit::Yards => "YARDS",
            Unit::Feet => "FEET",
            Unit::Inches => "INCHES",
            Unit::Millimeters => "MILLIMETERS",
            Unit::Centimeters => "CENTIMETERS",
            Unit::Meters => "METERS",
            Unit::Kilometers => "KILOMETERS",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownUnit(pub String);

impl FromStr for Unit {
    type Err = UnknownUnit;

    /// Case-insensitive; accepts plural names and their singular forms.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unit = match s.trim().to_ascii_uppercase().as_str() {
            "MILES" | "MILE" => Unit::Miles,
            "YARDS" | "YARD" => Unit::Yards,
            "FEET" | "FOOT" => Unit::Feet,
            "INCHES" | "INCH" => Unit::Inches,
            "MILLIMETERS" | "MILLIMETER" => Unit::Millimeters,
            "CENTIMETERS" | "CENTIMETER" => Unit::Centimeters,
            "METERS" | "METER" => Unit::Meters,
            "KILOMETERS" | "KILOMETER" => Unit::Kilometers,
            _ => return Err(UnknownUnit(s.to_string())),
        };
        Ok(unit)
    }
}

const AUTHORED: [(Unit, Unit, f64); 19] = [
    (Unit::Inches, Unit::Centimeters, 2.54),
    (Unit::Inches, Unit::Meters, 0.0254),
    (Unit::Inches, Unit::Millimeters, 25.40),
    (Unit::Centimeters, Unit::Inches, 0.39),
    (Unit::Centimeters, Unit::Feet, 0.032808),
    (Unit::Centimeters, Unit::Meters, 0.01),
    (Unit::Meters, Unit::Centimeters, 100.0),
    (Unit::Meters, Unit::Inches, 39.37),
    (Unit::Meters, Unit::Feet, 3.28),
    (Unit::Meters, Unit::Yards, 1.09),
    (Unit::Meters, Unit::Kilometers, 0.001),
    (Unit::Millimeters, Unit::Inches, 0.039),
    (Unit::Kilometers, Unit::Feet, 3280.8),
    (Unit::Kilometers, Unit::Miles, 0.62),
    (Unit::Yards, Unit::Meters, 0.91),
    (Unit::Yards, Unit::Kilometers, 0.00091),
    (Unit::Miles, Unit::Kilometers, 1.61),
    (Unit::Feet, Unit::Meters, 0.30),
    (Unit::Feet, Unit::Kilometers, 0.0003048),
];

/// Read-only `(source, dest) -> factor` lookup, built once per process.
#[derive(Debug)]
pub struct ConversionTable {
    factors: HashMap<(Unit, Unit), f64>,
}

impl ConversionTable {
    pub fn global() -> &'static ConversionTable {
        static TABLE: OnceLock<ConversionTable> = OnceLock::new();
        TABLE.get_or_init(|| ConversionTable {
            factors: AUTHORED.iter().map(|&(from, to, f)| ((from, to), f)).collect(),
        })
    }

    /// `None` when no factor was authored for this direction.
    pub fn lookup(&self, source: Unit, dest: Unit) -> Option<f64> {
        self.factors.get(&(source, dest)).copied()
    }

    /// Authored entries in a stable order.
    pub fn entries(&self) -> impl Iterator<Item = (Unit, Unit, f64)> + '_ {
        AUTHORED.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }
}

//! Pure conversion strategies.
//!
//! Nothing here touches the catalog or the rate cache; the dispatcher in
//! [`crate::engine`] resolves units and rates, then calls into these.

use crate::error::ConversionError;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Input values
// ---------------------------------------------------------------------------

/// A value as a caller supplied it: already numeric, or free text from a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Number(v)
    }
}

impl From<i32> for RawValue {
    fn from(v: i32) -> Self {
        RawValue::Number(f64::from(v))
    }
}

impl From<&str> for RawValue {
    fn from(v: &str) -> Self {
        RawValue::Text(v.to_string())
    }
}

impl From<String> for RawValue {
    fn from(v: String) -> Self {
        RawValue::Text(v)
    }
}

/// Finite number or `InvalidValue`. Zero is valid.
pub fn parse_value(raw: &RawValue) -> Result<f64, ConversionError> {
    let value = match raw {
        RawValue::Number(n) => *n,
        RawValue::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Err(ConversionError::InvalidValue("empty value".into()));
            }
            s.parse::<f64>()
                .map_err(|_| ConversionError::InvalidValue(format!("not a number: {:?}", s)))?
        }
    };
    if !value.is_finite() {
        return Err(ConversionError::InvalidValue(format!(
            "not a finite number: {}",
            value
        )));
    }
    Ok(value)
}

/// Six decimal places.
pub fn format_result(value: f64) -> String {
    format!("{:.6}", value)
}

// ---------------------------------------------------------------------------
// Linear and rate-based
// ---------------------------------------------------------------------------

pub fn convert_linear(value: f64, from_factor: f64, to_factor: f64) -> f64 {
    (value * from_factor) / to_factor
}

/// Both rates are units per one base currency.
pub fn convert_rate(value: f64, from_rate: f64, to_rate: f64) -> f64 {
    (value / from_rate) * to_rate
}

// ---------------------------------------------------------------------------
// Temperature
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureScale {
    Celsius,
    Fahrenheit,
    Kelvin,
    Rankine,
}

impl TemperatureScale {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "celsius" => Some(Self::Celsius),
            "fahrenheit" => Some(Self::Fahrenheit),
            "kelvin" => Some(Self::Kelvin),
            "rankine" => Some(Self::Rankine),
            _ => None,
        }
    }

    fn to_celsius(self, v: f64) -> f64 {
        match self {
            Self::Celsius => v,
            Self::Fahrenheit => (v - 32.0) * 5.0 / 9.0,
            Self::Kelvin => v - 273.15,
            Self::Rankine => (v - 491.67) * 5.0 / 9.0,
        }
    }

    fn from_celsius(self, c: f64) -> f64 {
        match self {
            Self::Celsius => c,
            Self::Fahrenheit => c * 9.0 / 5.0 + 32.0,
            Self::Kelvin => c + 273.15,
            Self::Rankine => c * 9.0 / 5.0 + 491.67,
        }
    }
}

/// Pivots through Celsius.
pub fn convert_temperature(value: f64, from: TemperatureScale, to: TemperatureScale) -> f64 {
    to.from_celsius(from.to_celsius(value))
}

// ---------------------------------------------------------------------------
// Baking temperature
// ---------------------------------------------------------------------------

pub const GAS_MARK_MIN: u8 = 1;
pub const GAS_MARK_MAX: u8 = 9;

const GAS_MARK_1_F: f64 = 275.0;
const GAS_MARK_STEP_F: f64 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BakingUnit {
    Fahrenheit,
    Celsius,
    GasMark(u8),
}

impl BakingUnit {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "fahrenheit" => Some(Self::Fahrenheit),
            "celsius" => Some(Self::Celsius),
            _ => key
                .strip_prefix("gas_mark_")?
                .parse::<u8>()
                .ok()
                .filter(|n| (GAS_MARK_MIN..=GAS_MARK_MAX).contains(n))
                .map(Self::GasMark),
        }
    }

    /// A gas mark is a fixed temperature, so `v` is ignored for it.
    fn to_fahrenheit(self, v: f64) -> f64 {
        match self {
            Self::Fahrenheit => v,
            Self::Celsius => v * 9.0 / 5.0 + 32.0,
            Self::GasMark(n) => GAS_MARK_1_F + f64::from(n - 1) * GAS_MARK_STEP_F,
        }
    }

    fn from_fahrenheit(self, f: f64) -> f64 {
        match self {
            Self::Fahrenheit => f,
            Self::Celsius => (f - 32.0) * 5.0 / 9.0,
            Self::GasMark(_) => gas_mark_for(f),
        }
    }
}

/// Nearest gas mark (halves round up), clamped to 1..=9.
fn gas_mark_for(fahrenheit: f64) -> f64 {
    let steps = ((fahrenheit - GAS_MARK_1_F) / GAS_MARK_STEP_F + 0.5).floor();
    (steps + 1.0).clamp(f64::from(GAS_MARK_MIN), f64::from(GAS_MARK_MAX))
}

/// Pivots through Fahrenheit. Targeting a gas mark is lossy.
pub fn convert_baking(value: f64, from: BakingUnit, to: BakingUnit) -> f64 {
    to.from_fahrenheit(from.to_fahrenheit(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use TemperatureScale::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn parse_value_accepts_numbers_and_numeric_text() {
        assert_eq!(parse_value(&RawValue::Number(0.0)), Ok(0.0));
        assert_eq!(parse_value(&" 2.5 ".into()), Ok(2.5));
        assert_eq!(parse_value(&"-1e3".into()), Ok(-1000.0));
    }

    #[test]
    fn parse_value_rejects_garbage() {
        for bad in ["", "   ", "abc", "12abc", "NaN", "inf", "-infinity"] {
            let err = parse_value(&bad.into()).unwrap_err();
            assert!(
                matches!(err, ConversionError::InvalidValue(_)),
                "{:?} should be invalid",
                bad
            );
        }
        assert!(parse_value(&RawValue::Number(f64::NAN)).is_err());
        assert!(parse_value(&RawValue::Number(f64::INFINITY)).is_err());
    }

    #[test]
    fn raw_value_deserializes_both_shapes() {
        let n: RawValue = serde_json::from_str("12").unwrap();
        let t: RawValue = serde_json::from_str("\"12\"").unwrap();
        assert_eq!(n, RawValue::Number(12.0));
        assert_eq!(t, RawValue::Text("12".into()));
    }

    #[test]
    fn temperature_fixed_points() {
        assert_eq!(convert_temperature(0.0, Celsius, Fahrenheit), 32.0);
        assert_eq!(convert_temperature(100.0, Celsius, Fahrenheit), 212.0);
        assert_eq!(convert_temperature(25.0, Celsius, Fahrenheit), 77.0);
        assert!(approx(convert_temperature(0.0, Kelvin, Celsius), -273.15));
        assert!(approx(convert_temperature(491.67, Rankine, Celsius), 0.0));
        assert!(approx(convert_temperature(-40.0, Fahrenheit, Celsius), -40.0));
    }

    #[test]
    fn temperature_round_trips() {
        let scales = [Celsius, Fahrenheit, Kelvin, Rankine];
        for &a in &scales {
            for &b in &scales {
                let there = convert_temperature(37.5, a, b);
                assert!(approx(convert_temperature(there, b, a), 37.5), "{:?}->{:?}", a, b);
            }
        }
    }

    #[test]
    fn baking_unit_keys() {
        assert_eq!(BakingUnit::from_key("gas_mark_1"), Some(BakingUnit::GasMark(1)));
        assert_eq!(BakingUnit::from_key("gas_mark_9"), Some(BakingUnit::GasMark(9)));
        assert_eq!(BakingUnit::from_key("gas_mark_0"), None);
        assert_eq!(BakingUnit::from_key("gas_mark_10"), None);
        assert_eq!(BakingUnit::from_key("kelvin"), None);
    }

    #[test]
    fn gas_marks_to_fahrenheit_ignore_value() {
        use BakingUnit::*;
        assert_eq!(convert_baking(1.0, GasMark(1), Fahrenheit), 275.0);
        assert_eq!(convert_baking(123.0, GasMark(1), Fahrenheit), 275.0);
        assert_eq!(convert_baking(0.0, GasMark(9), Fahrenheit), 475.0);
        assert!(approx(convert_baking(0.0, GasMark(4), Celsius), 176.666_666_666_666_66));
    }

    #[test]
    fn fahrenheit_to_gas_mark_rounds_and_clamps() {
        use BakingUnit::*;
        assert_eq!(convert_baking(275.0, Fahrenheit, GasMark(1)), 1.0);
        assert_eq!(convert_baking(350.0, Fahrenheit, GasMark(1)), 4.0);
        // Halfway between mark 1 and 2 rounds up.
        assert_eq!(convert_baking(287.5, Fahrenheit, GasMark(1)), 2.0);
        assert_eq!(convert_baking(100.0, Fahrenheit, GasMark(1)), 1.0);
        assert_eq!(convert_baking(900.0, Fahrenheit, GasMark(1)), 9.0);
        assert_eq!(convert_baking(180.0, Celsius, GasMark(1)), 4.0);
    }

    #[test]
    fn linear_and_rate_formulas() {
        assert_eq!(convert_linear(1.0, 1000.0, 1.0), 1000.0);
        assert_eq!(convert_rate(10.0, 1.0, 0.5), 5.0);
        assert_eq!(convert_rate(10.0, 0.5, 1.0), 20.0);
    }

    #[test]
    fn format_result_uses_six_decimals() {
        assert_eq!(format_result(1.0), "1.000000");
        assert_eq!(format_result(2.204_622_621_8), "2.204623");
    }
}

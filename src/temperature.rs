// SPDX-License-Identifier: GPL-3.0-or-later
use std::fmt;

/// Offset between the Kelvin and Celsius scales.
const KELVIN_OFFSET: f64 = 273.15;
/// Offset between the Rankine and Fahrenheit scales.
const RANKINE_OFFSET: f64 = 459.67;

/// An absolute temperature in hundredths of a kelvin, the unit thermal sensors report in.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub(crate) struct Centikelvin(pub(crate) f64);

impl Centikelvin {
    /// Create a temperature from a value in degrees Celsius.
    pub(crate) fn from_celsius(celsius: f64) -> Self {
        Self((celsius + KELVIN_OFFSET) * 100.0)
    }

    /// The temperature in degrees Celsius.
    pub(crate) fn in_celsius(&self) -> f64 {
        (self.0 / 100.0) - KELVIN_OFFSET
    }

    /// The temperature in degrees Fahrenheit.
    pub(crate) fn in_fahrenheit(&self) -> f64 {
        // Centikelvin to Rankine in one step keeps whole-degree results exact.
        self.0 * 9.0 / 500.0 - RANKINE_OFFSET
    }

    /// Convert to a raw sample value, saturating at the limits of `u16`.
    pub(crate) fn as_sample(&self) -> u16 {
        // `as` casts from floats saturate (and map NaN to 0).
        self.0.round() as u16
    }
}

impl From<u16> for Centikelvin {
    fn from(sample: u16) -> Self {
        Self(f64::from(sample))
    }
}

impl fmt::Display for Centikelvin {
    /// Format the temperature as Fahrenheit followed by Celsius in parentheses, for example
    /// `80.33F (26.85C)`. Two decimal places are used unless a precision is given.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(2);
        write!(
            f,
            "{:.*}F ({:.*}C)",
            precision,
            self.in_fahrenheit(),
            precision,
            self.in_celsius()
        )
    }
}

// Copyright (C) 2026  jmxport contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
//! Sample value rendering.
//!
//! Values are written the way Go's `strconv.FormatFloat(v, 'g', -1, 64)`
//! writes them: the shortest digits that parse back to the same `f64`,
//! switching to exponent form when the decimal exponent is below -4 or at
//! least 6.

/// Smallest decimal exponent written without exponent form
const MIN_PLAIN_EXPONENT: i32 = -4;
/// Exponents from here up use exponent form
const MAX_PLAIN_EXPONENT: i32 = 6;

/// Render a sample value.
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "+Inf" } else { "-Inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // `{:e}` gives the shortest round-trip mantissa, e.g. `7.516192768e9`.
    let scientific = format!("{:e}", value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return format!("{}", value);
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return format!("{}", value);
    };

    if (MIN_PLAIN_EXPONENT..MAX_PLAIN_EXPONENT).contains(&exponent) {
        format!("{}", value)
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.unsigned_abs())
    }
}

/// Parse a sample value, accepting the literals [`format_value`] produces.
pub fn parse_value(raw: &str) -> Option<f64> {
    match raw {
        "NaN" => Some(f64::NAN),
        "+Inf" | "Inf" => Some(f64::INFINITY),
        "-Inf" => Some(f64::NEG_INFINITY),
        _ => raw.parse::<f64>().ok(),
    }
}

// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Report formatting of floating point values.

use std::fmt;

const PRECISION: i32 = 6;

/// Displays a value with six significant digits, dropping trailing zeros.
///
/// Values with an exponent below -4 or of at least six are written in
/// scientific notation with a signed, two digit exponent (`1.2e-10`).
/// Width and alignment flags apply to the whole value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Significant(pub f64);

fn trim_zeros(digits: &str) -> &str {
    if digits.contains('.') {
        digits.trim_end_matches('0').trim_end_matches('.')
    } else {
        digits
    }
}

impl fmt::Display for Significant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let value = self.0;
        if !value.is_finite() {
            return f.pad(&value.to_string().to_lowercase());
        }

        // Round to the final number of digits first so that the exponent
        // accounts for carries such as 999999.7 -> 1e+06
        let scientific = format!("{:.*e}", (PRECISION - 1) as usize, value);
        let (mantissa, exponent) = scientific
            .split_once('e')
            .unwrap_or((scientific.as_str(), "0"));
        let exponent: i32 = exponent.parse().unwrap_or(0);

        let text = if exponent < -4 || exponent >= PRECISION {
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{}e{sign}{:02}", trim_zeros(mantissa), exponent.abs())
        } else {
            let decimals = (PRECISION - 1 - exponent) as usize;
            trim_zeros(&format!("{value:.decimals$}")).to_string()
        };
        f.pad(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_notation() {
        assert_eq!(Significant(6.0).to_string(), "6");
        assert_eq!(Significant(-1.0).to_string(), "-1");
        assert_eq!(Significant(0.0).to_string(), "0");
        assert_eq!(Significant(0.015).to_string(), "0.015");
        assert_eq!(Significant(1.0 / 3.0).to_string(), "0.333333");
        assert_eq!(Significant(2.0 / 3.0).to_string(), "0.666667");
        assert_eq!(Significant(123456.4).to_string(), "123456");
        assert_eq!(Significant(0.0001234567).to_string(), "0.000123457");
    }

    #[test]
    fn scientific_notation() {
        assert_eq!(Significant(1.2e-10).to_string(), "1.2e-10");
        assert_eq!(Significant(6.2e-11).to_string(), "6.2e-11");
        assert_eq!(Significant(1234567.0).to_string(), "1.23457e+06");
        assert_eq!(Significant(999999.7).to_string(), "1e+06");
        assert_eq!(Significant(0.00001).to_string(), "1e-05");
        assert_eq!(Significant(f64::NAN).to_string(), "nan");
    }

    #[test]
    fn padding() {
        assert_eq!(format!("{:>10}", Significant(1.0 / 3.0)), "  0.333333");
        assert_eq!(format!("{:>6}", Significant(-1.0)), "    -1");
    }
}

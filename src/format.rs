use std::fmt;

const PRECISION: usize = 6;

/// Displays an `f64` the way C's `printf("%g")` does: six significant
/// digits, trailing zeros removed, exponent form for very large or small
/// magnitudes.
#[derive(Clone, Copy, Debug)]
pub struct G(pub f64);

impl fmt::Display for G {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.0;
        if v.is_nan() {
            return f.write_str("nan");
        }
        if v.is_infinite() {
            return f.write_str(if v > 0.0 { "inf" } else { "-inf" });
        }
        if v == 0.0 {
            return f.write_str(if v.is_sign_negative() { "-0" } else { "0" });
        }

        // The exponent is taken after rounding to the target precision, so
        // 999999.5 switches to exponent form like C does.
        let sci = format!("{:.*e}", PRECISION - 1, v);
        let (mantissa, exp) = match sci.split_once('e') {
            Some(parts) => parts,
            None => return f.write_str(&sci),
        };
        let exp: i32 = exp.parse().map_err(|_| fmt::Error)?;

        if exp < -4 || exp >= PRECISION as i32 {
            let sign = if exp < 0 { '-' } else { '+' };
            write!(f, "{}e{}{:02}", trim_zeros(mantissa), sign, exp.abs())
        } else {
            let decimals = (PRECISION as i32 - 1 - exp) as usize;
            let fixed = format!("{:.*}", decimals, v);
            f.write_str(trim_zeros(&fixed))
        }
    }
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

//! Exact rational arithmetic with SI-suffix parsing and rendering.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Rem, Sub};
use std::str::FromStr;

use thiserror::Error;

/// Error returned when a string does not parse as a [`Rational`].
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid rational literal: {0:?}")]
pub struct ParseRationalError(String);

/// An exact rational number, always stored in lowest terms with a positive
/// denominator.
#[derive(Clone, Copy)]
pub struct Rational {
    num: i64,
    den: i64,
}

/// SI suffixes accepted on input and considered when choosing a canonical
/// suffix for output, ordered by exponent.
const SI_TABLE: &[(char, i32)] = &[
    ('a', -18),
    ('f', -15),
    ('p', -12),
    ('n', -9),
    ('u', -6),
    ('m', -3),
    ('k', 3),
    ('M', 6),
    ('G', 9),
    ('T', 12),
];

fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

fn pow10(n: u32) -> i64 {
    10i64.pow(n)
}

impl Rational {
    /// Construct `num/den` in lowest terms. Panics if `den == 0`, mirroring
    /// the original source's `ZeroDivisionError`.
    pub fn new(num: i64, den: i64) -> Self {
        assert!(den != 0, "rational denominator must be nonzero");
        let sign = if den < 0 { -1 } else { 1 };
        let num = num * sign;
        let den = den * sign;
        let g = gcd(num, den).max(1);
        Rational {
            num: num / g,
            den: den / g,
        }
    }

    /// Construct from a plain integer.
    pub fn from_int(n: i64) -> Self {
        Rational { num: n, den: 1 }
    }

    pub fn numerator(&self) -> i64 {
        self.num
    }

    pub fn denominator(&self) -> i64 {
        self.den
    }

    pub fn is_zero(&self) -> bool {
        self.num == 0
    }

    /// `true` if `self`'s denominator divides some power of ten, i.e. the
    /// value has a terminating decimal expansion.
    pub fn decimal_fraction(&self) -> bool {
        let mut d = self.den;
        for p in [2, 5] {
            while d % p == 0 {
                d /= p;
            }
        }
        d == 1
    }

    fn to_f64(self) -> f64 {
        self.num as f64 / self.den as f64
    }

    /// Canonical string form: picks an SI suffix so the integer part of the
    /// scaled value lies in `[1, 1000)`, rendering as a decimal when the
    /// denominator divides a power of ten; otherwise falls back to the
    /// exact `f'num/den` literal form.
    pub fn canonical_str(&self) -> String {
        if self.num == 0 {
            return "0".to_string();
        }
        if self.decimal_fraction() {
            if let Some(s) = self.try_si_decimal() {
                return s;
            }
        }
        format!("f'{}/{}", self.num, self.den)
    }

    fn try_si_decimal(&self) -> Option<String> {
        // Exact, integer-only suffix selection: compare the scaled rational
        // directly rather than routing magnitude through `f64`, so the
        // round trip stays exact at any magnitude or mantissa length.
        let mag = if self.num < 0 { -*self } else { *self };
        let mut best: Option<(i32, char)> = None;
        for &(suffix, exp) in SI_TABLE {
            let scaled = mag / Self::pow10_ratio(exp);
            if scaled >= Rational::from_int(1) && scaled < Rational::from_int(1000) {
                best = Some((exp, suffix));
                break;
            }
        }
        let (exp, suffix) = best.unwrap_or((0, '\0'));
        let scale = Rational::pow10_ratio(exp);
        let scaled = *self / scale;
        let digits = Self::decimal_digits(scaled)?;
        if suffix == '\0' {
            Some(digits)
        } else {
            Some(format!("{digits}{suffix}"))
        }
    }

    fn pow10_ratio(exp: i32) -> Rational {
        if exp >= 0 {
            Rational::new(pow10(exp as u32), 1)
        } else {
            Rational::new(1, pow10((-exp) as u32))
        }
    }

    /// Render a terminating-decimal rational as `-?\d+(\.\d+)?`.
    fn decimal_digits(r: Rational) -> Option<String> {
        if !r.decimal_fraction() {
            return None;
        }
        let sign = if r.num < 0 { "-" } else { "" };
        let num = r.num.abs();
        let mut den = r.den;
        let mut scale = 1i64;
        while den % 10 == 0 {
            den /= 10;
            scale *= 10;
        }
        while den != 1 {
            den *= 10;
            scale *= 10;
        }
        let scaled_num = num * (scale / r.den.abs());
        let int_part = scaled_num / scale;
        let frac_part = scaled_num % scale;
        if frac_part == 0 {
            Some(format!("{sign}{int_part}"))
        } else {
            let width = scale.to_string().len() - 1;
            let frac_str = format!("{frac_part:0width$}");
            let frac_str = frac_str.trim_end_matches('0');
            Some(format!("{sign}{int_part}.{frac_str}"))
        }
    }

    /// Scientific-notation rendering, always lossy-safe (fixed exponent
    /// chosen so the mantissa has one leading digit), used where a
    /// consistent machine-parseable form is needed regardless of whether
    /// the fraction terminates.
    pub fn compat_str(&self) -> String {
        if self.num == 0 {
            return "0e0".to_string();
        }
        let mag = self.to_f64();
        let exp = mag.abs().log10().floor() as i32;
        let mantissa = mag / 10f64.powi(exp);
        format!("{mantissa}e{exp}")
    }

    fn checked_parse_si(s: &str) -> Option<(f64, i32)> {
        let s = s.trim();
        let (num_part, suffix) = match s.chars().last() {
            Some(c) if c.is_ascii_alphabetic() || c == '\u{b5}' => {
                (&s[..s.len() - c.len_utf8()], Some(c))
            }
            _ => (s, None),
        };
        let exp = match suffix {
            None => 0,
            Some('u') | Some('\u{b5}') => -6,
            Some(c) => SI_TABLE.iter().find(|(sc, _)| *sc == c)?.1,
        };
        let value: f64 = num_part.parse().ok()?;
        Some((value, exp))
    }
}

impl FromStr for Rational {
    type Err = ParseRationalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(rest) = s.strip_prefix("f'") {
            let (n, d) = rest
                .split_once('/')
                .ok_or_else(|| ParseRationalError(s.to_string()))?;
            let n: i64 = n.parse().map_err(|_| ParseRationalError(s.to_string()))?;
            let d: i64 = d.parse().map_err(|_| ParseRationalError(s.to_string()))?;
            return Ok(Rational::new(n, d));
        }
        if let Ok(n) = s.parse::<i64>() {
            return Ok(Rational::from_int(n));
        }
        let (value, exp) = Self::checked_parse_si(s).ok_or_else(|| ParseRationalError(s.to_string()))?;
        // Render the float through a decimal-string route so we stay exact
        // for the common case of a short literal like "1.5n".
        let text = format!("{value}");
        let (int_str, frac_str) = text.split_once('.').unwrap_or((text.as_str(), ""));
        let digits = format!("{int_str}{frac_str}");
        let n: i64 = digits.parse().map_err(|_| ParseRationalError(s.to_string()))?;
        let scale_down = frac_str.len() as i32;
        let total_exp = exp - scale_down;
        let r = if total_exp >= 0 {
            Rational::new(n * pow10(total_exp as u32), 1)
        } else {
            Rational::new(n, pow10((-total_exp) as u32))
        };
        Ok(r)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_str())
    }
}

impl fmt::Debug for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rational({}, {})", self.num, self.den)
    }
}

impl PartialEq for Rational {
    fn eq(&self, other: &Self) -> bool {
        self.num == other.num && self.den == other.den
    }
}
impl Eq for Rational {}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.num * other.den).cmp(&(other.num * self.den))
    }
}

impl std::hash::Hash for Rational {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.num.hash(state);
        self.den.hash(state);
    }
}

impl Add for Rational {
    type Output = Rational;
    fn add(self, rhs: Rational) -> Rational {
        Rational::new(self.num * rhs.den + rhs.num * self.den, self.den * rhs.den)
    }
}
impl Sub for Rational {
    type Output = Rational;
    fn sub(self, rhs: Rational) -> Rational {
        self + (-rhs)
    }
}
impl Neg for Rational {
    type Output = Rational;
    fn neg(self) -> Rational {
        Rational::new(-self.num, self.den)
    }
}
impl Mul for Rational {
    type Output = Rational;
    fn mul(self, rhs: Rational) -> Rational {
        Rational::new(self.num * rhs.num, self.den * rhs.den)
    }
}
impl Div for Rational {
    type Output = Rational;
    fn div(self, rhs: Rational) -> Rational {
        Rational::new(self.num * rhs.den, self.den * rhs.num)
    }
}
impl Rem for Rational {
    type Output = Rational;
    fn rem(self, rhs: Rational) -> Rational {
        let q = (self / rhs).floor_to_int();
        self - rhs * Rational::from_int(q)
    }
}

impl Rational {
    /// Floor division, as Python's `//`.
    pub fn floor_div(self, rhs: Rational) -> Rational {
        Rational::from_int((self / rhs).floor_to_int())
    }

    fn floor_to_int(self) -> i64 {
        self.num.div_euclid(self.den)
    }
}

impl From<i64> for Rational {
    fn from(n: i64) -> Self {
        Rational::from_int(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduces_to_lowest_terms() {
        let r = Rational::new(4, 8);
        assert_eq!((r.numerator(), r.denominator()), (1, 2));
    }

    #[test]
    fn negative_denominator_normalizes_sign() {
        let r = Rational::new(1, -2);
        assert_eq!((r.numerator(), r.denominator()), (-1, 2));
    }

    #[test]
    fn integer_round_trips() {
        let r: Rational = "42".parse().unwrap();
        assert_eq!(r.to_string(), "42");
    }

    #[test]
    fn decimal_round_trips() {
        let r: Rational = "1.5".parse().unwrap();
        assert_eq!(r.to_string(), "1.5");
    }

    #[test]
    fn si_suffix_parses_and_renders() {
        let r: Rational = "3.3k".parse().unwrap();
        assert_eq!(r, Rational::new(33, 10) * Rational::new(1000, 1));
        assert_eq!(r.to_string(), "3.3k");
    }

    #[test]
    fn non_terminating_fraction_falls_back_to_literal() {
        let r = Rational::new(1, 3);
        assert_eq!(r.to_string(), "f'1/3");
        let parsed: Rational = "f'1/3".parse().unwrap();
        assert_eq!(parsed, r);
    }

    #[test]
    fn arithmetic_matches_fraction_semantics() {
        let a = Rational::new(1, 3);
        let b = Rational::new(1, 6);
        assert_eq!(a + b, Rational::new(1, 2));
        assert_eq!(a - b, Rational::new(1, 6));
        assert_eq!(a * b, Rational::new(1, 18));
        assert_eq!(a / b, Rational::new(2, 1));
    }

    proptest::proptest! {
        #[test]
        fn gcd_always_reduces(n in -1000i64..1000, d in 1i64..1000) {
            let r = Rational::new(n, d);
            if r.numerator() == 0 {
                proptest::prop_assert_eq!(r.denominator(), 1);
            } else {
                proptest::prop_assert_eq!(gcd(r.numerator(), r.denominator()), 1);
            }
        }
    }
}

//! Side triples as supplied by callers.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use ndarray::{Array1, array};
use serde::{Deserialize, Serialize};

use crate::error::InputFormatError;

const FIELDS: [char; 3] = ['a', 'b', 'c'];

/// Three candidate side lengths.
///
/// Every value is finite. Values are not required to be positive: a zero or
/// negative side is a valid request that simply cannot form a triangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 3]", into = "[f64; 3]")]
pub struct SideTriple {
    sides: [f64; 3],
}

impl SideTriple {
    pub fn new(a: f64, b: f64, c: f64) -> Result<Self, InputFormatError> {
        let sides = [a, b, c];
        for (field, value) in FIELDS.iter().zip(sides) {
            if !value.is_finite() {
                return Err(InputFormatError::NotFinite {
                    field: *field,
                    value,
                });
            }
        }
        Ok(Self { sides })
    }

    /// Parses three text fields, as typed into a form or passed on a command line.
    pub fn parse(a: &str, b: &str, c: &str) -> Result<Self, InputFormatError> {
        let a = parse_field('a', a)?;
        let b = parse_field('b', b)?;
        let c = parse_field('c', c)?;
        Self::new(a, b, c)
    }

    pub fn a(&self) -> f64 {
        self.sides[0]
    }

    pub fn b(&self) -> f64 {
        self.sides[1]
    }

    pub fn c(&self) -> f64 {
        self.sides[2]
    }

    pub fn as_array(&self) -> [f64; 3] {
        self.sides
    }

    /// The same sides sorted ascending, so the longest side is last.
    pub fn normalized(&self) -> Self {
        let mut sides = self.sides;
        sides.sort_by(f64::total_cmp);
        Self { sides }
    }

    pub fn has_non_positive(&self) -> bool {
        self.sides.iter().any(|&s| s <= 0.0)
    }

    /// Feature vector in the order the sides are stored.
    pub fn features(&self) -> Array1<f64> {
        array![self.sides[0], self.sides[1], self.sides[2]]
    }
}

fn parse_field(field: char, text: &str) -> Result<f64, InputFormatError> {
    let trimmed = text.trim();
    let value: f64 = trimmed.parse().map_err(|_| InputFormatError::NotANumber {
        field,
        text: text.to_string(),
    })?;
    if !value.is_finite() {
        return Err(InputFormatError::NotFinite { field, value });
    }
    Ok(value)
}

impl TryFrom<[f64; 3]> for SideTriple {
    type Error = InputFormatError;

    fn try_from([a, b, c]: [f64; 3]) -> Result<Self, Self::Error> {
        Self::new(a, b, c)
    }
}

impl From<SideTriple> for [f64; 3] {
    fn from(triple: SideTriple) -> Self {
        triple.sides
    }
}

/// Accepts `"3 4 5"`, `"3,4,5"` and `"3, 4, 5"`.
impl FromStr for SideTriple {
    type Err = InputFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s
            .split(|ch: char| ch == ',' || ch.is_whitespace())
            .filter(|p| !p.is_empty())
            .collect();
        match parts.as_slice() {
            [a, b, c] => Self::parse(a, b, c),
            other => Err(InputFormatError::WrongCount(other.len())),
        }
    }
}

impl Display for SideTriple {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.sides[0], self.sides[1], self.sides[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_whitespace() {
        let t = SideTriple::parse(" 3", "4 ", "5.5").unwrap();
        assert_eq!(t.as_array(), [3.0, 4.0, 5.5]);
    }

    #[test]
    fn test_parse_names_offending_field() {
        let err = SideTriple::parse("3", "four", "5").unwrap_err();
        assert_eq!(
            err,
            InputFormatError::NotANumber {
                field: 'b',
                text: "four".to_string()
            }
        );
        assert!(matches!(
            SideTriple::parse("3", "4", "").unwrap_err(),
            InputFormatError::NotANumber { field: 'c', .. }
        ));
    }

    #[test]
    fn test_rejects_nan_and_infinity() {
        assert!(matches!(
            SideTriple::parse("NaN", "4", "5").unwrap_err(),
            InputFormatError::NotFinite { field: 'a', .. }
        ));
        assert!(matches!(
            SideTriple::new(3.0, f64::INFINITY, 5.0).unwrap_err(),
            InputFormatError::NotFinite { field: 'b', .. }
        ));
    }

    #[test]
    fn test_non_positive_is_accepted() {
        let t = SideTriple::new(0.0, 4.0, -5.0).unwrap();
        assert!(t.has_non_positive());
        assert!(!SideTriple::new(3.0, 4.0, 5.0).unwrap().has_non_positive());
    }

    #[test]
    fn test_normalized_sorts_ascending() {
        let t = SideTriple::new(5.0, 3.0, 4.0).unwrap().normalized();
        assert_eq!(t.as_array(), [3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_from_str_separators() {
        for input in ["3 4 5", "3,4,5", "3, 4, 5", "  3\t4  5 "] {
            let t: SideTriple = input.parse().unwrap();
            assert_eq!(t.as_array(), [3.0, 4.0, 5.0], "input {input:?}");
        }
        assert_eq!(
            "3 4".parse::<SideTriple>().unwrap_err(),
            InputFormatError::WrongCount(2)
        );
    }

    #[test]
    fn test_deserialize_rejects_non_finite() {
        let t: SideTriple = serde_json::from_str("[3.0, 4.0, 5.0]").unwrap();
        assert_eq!(t.c(), 5.0);
        assert!(serde_json::from_str::<SideTriple>("[3.0, 4.0]").is_err());
    }
}

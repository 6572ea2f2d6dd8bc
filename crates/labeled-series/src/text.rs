// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Vectorized string operations over object arrays.
//!
//! Elements that are not strings (missing values included) produce a
//! missing result rather than an error.

use crate::series::Series;
use labeled_core::{Kind, Result, Scalar, SeriesError, Values};

/// Elementwise string operations.
pub trait TextOps {
    /// Character count of every string.
    fn str_len(&self) -> Result<Series>;
    fn str_upper(&self) -> Result<Series>;
    fn str_lower(&self) -> Result<Series>;
    fn str_contains(&self, pattern: &str) -> Result<Series>;
    fn str_startswith(&self, prefix: &str) -> Result<Series>;
}

impl Series {
    fn text_strings(&self) -> Result<Vec<Option<&str>>> {
        let Values::Object(items) = &self.values else {
            return Err(SeriesError::not_supported(format!(
                "string operations on a {} array",
                self.kind()
            )));
        };
        Ok(items.iter().map(Scalar::as_str).collect())
    }

    fn map_text(&self, func: impl Fn(&str) -> Scalar) -> Result<Series> {
        let out: Vec<Scalar> = self
            .text_strings()?
            .into_iter()
            .map(|text| text.map_or(Scalar::Missing, &func))
            .collect();
        self.derive(Values::Object(out))
    }

    fn test_text(&self, predicate: impl Fn(&str) -> bool) -> Result<Series> {
        let out: Vec<Option<bool>> = self
            .text_strings()?
            .into_iter()
            .map(|text| text.map(&predicate))
            .collect();
        self.derive(Values::Bool(out))
    }
}

impl TextOps for Series {
    fn str_len(&self) -> Result<Series> {
        let lengths = self.map_text(|text| Scalar::Int(text.chars().count() as i64))?;
        if lengths.values.missing_count() == 0 {
            return lengths.astype(Kind::Int);
        }
        lengths.astype(Kind::Float)
    }

    fn str_upper(&self) -> Result<Series> {
        self.map_text(|text| Scalar::from(text.to_uppercase()))
    }

    fn str_lower(&self) -> Result<Series> {
        self.map_text(|text| Scalar::from(text.to_lowercase()))
    }

    fn str_contains(&self, pattern: &str) -> Result<Series> {
        self.test_text(|text| text.contains(pattern))
    }

    fn str_startswith(&self, prefix: &str) -> Result<Series> {
        self.test_text(|text| text.starts_with(prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::TextOps;
    use crate::series::Series;
    use labeled_core::{Kind, Scalar, SeriesError, Values};

    fn words() -> Series {
        Series::from_scalars(
            vec![Scalar::from("Apple"), Scalar::Missing, Scalar::from("bánana"), Scalar::Int(3)],
            None,
            None,
        )
        .expect("object")
    }

    #[test]
    fn case_mapping_keeps_non_strings_missing() {
        let upper = words().str_upper().expect("upper");
        assert_eq!(upper.iget(0).expect("first"), Scalar::from("APPLE"));
        assert!(upper.iget(1).expect("missing").is_missing());
        assert!(upper.iget(3).expect("int").is_missing());
        let lower = words().str_lower().expect("lower");
        assert_eq!(lower.iget(0).expect("first"), Scalar::from("apple"));
    }

    #[test]
    fn lengths_count_characters() {
        let lengths = words().str_len().expect("len");
        assert_eq!(lengths.kind(), Kind::Float);
        assert_eq!(lengths.iget(2).expect("third"), Scalar::Float(6.0));

        let clean = Series::new(vec!["ab", "c"]);
        assert!(clean.str_len().expect("len").values().equals(&Values::Int(vec![2, 1])));
    }

    #[test]
    fn predicates_return_optional_bools() {
        let contains = words().str_contains("an").expect("contains");
        assert!(contains.values().equals(&Values::Bool(vec![Some(false), None, Some(true), None])));
        let starts = words().str_startswith("App").expect("startswith");
        assert!(starts.values().equals(&Values::Bool(vec![Some(true), None, Some(false), None])));
    }

    #[test]
    fn numeric_arrays_reject_string_operations() {
        let err = Series::new(vec![1.0]).str_upper().expect_err("float array");
        assert!(matches!(err, SeriesError::NotSupported(_)));
    }
}

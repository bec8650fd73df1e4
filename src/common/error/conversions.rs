//! Error conversion implementations.
//!
//! This module contains From trait implementations to convert from the
//! module-local error types to the unified Error type.

#[cfg(any(feature = "formula", feature = "star"))]
use super::types::Error;

#[cfg(feature = "formula")]
impl From<crate::formula::starmath::ParseError> for Error {
    fn from(err: crate::formula::starmath::ParseError) -> Self {
        Error::Formula(err.to_string())
    }
}

#[cfg(feature = "star")]
impl From<crate::star::StarError> for Error {
    fn from(err: crate::star::StarError) -> Self {
        match err {
            crate::star::StarError::Io(e) => Error::Io(e),
            crate::star::StarError::BadMagic { .. } => Error::InvalidFormat(err.to_string()),
            other => Error::Record(other.to_string()),
        }
    }
}

#[cfg(all(test, feature = "star"))]
mod tests {
    use super::*;
    use crate::star::StarError;

    #[test]
    fn test_star_errors_fold_into_error() {
        let magic = StarError::BadMagic {
            expected: "DrMd".into(),
            found: "DrPg".into(),
            offset: 0,
        };
        assert!(matches!(Error::from(magic), Error::InvalidFormat(_)));
        let short = StarError::Truncated { offset: 8, needed: 4 };
        assert!(matches!(Error::from(short), Error::Record(_)));
    }
}

use crate::common::NO2;
use crate::errors::{ErrorKind, NitriteError, NitriteResult};
use crate::ID_GENERATOR;
use once_cell::sync::Lazy;
use std::fmt::{Debug, Display};

static ID_TOO_LARGE_ERROR: Lazy<NitriteError> = Lazy::new(|| {
    NitriteError::new(
        &format!("NitriteId validation error: id value must be less than 10^19 ({})", MAX_VALUE),
        ErrorKind::InvalidId,
    )
});

static ID_TOO_SMALL_ERROR: Lazy<NitriteError> = Lazy::new(|| {
    NitriteError::new(
        &format!(
            "NitriteId validation error: id value must be greater than or equal to 10^18 ({})",
            MIN_VALUE
        ),
        ErrorKind::InvalidId,
    )
});

const MAX_VALUE: u64 = 10_000_000_000_000_000_000;
const MIN_VALUE: u64 = 1_000_000_000_000_000_000;

/// The identity of a record in a collection.
///
/// Ids are 64 bit values in the range `[10^18, 10^19)` produced by a
/// process-wide Snowflake generator, so they are unique and roughly ordered
/// by creation time. They are stored under the `_id` field of a document.
#[derive(PartialEq, Eq, Ord, PartialOrd, Hash, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct NitriteId {
    id_value: u64,
}

impl NitriteId {
    /// Generates a new unique id.
    pub fn new() -> Self {
        NitriteId {
            id_value: ID_GENERATOR.get_id(),
        }
    }

    /// Creates an id from a known value.
    ///
    /// # Errors
    ///
    /// `InvalidId` when the value is outside `[10^18, 10^19)`.
    pub fn create_id(id_value: u64) -> NitriteResult<NitriteId> {
        NitriteId::valid_id(id_value)?;
        Ok(NitriteId { id_value })
    }

    pub fn id_value(&self) -> u64 {
        self.id_value
    }

    pub(crate) fn valid_id(id_value: u64) -> NitriteResult<()> {
        if id_value >= MAX_VALUE {
            log::error!("Id value {} is too large", id_value);
            return Err(ID_TOO_LARGE_ERROR.clone());
        }
        if id_value < MIN_VALUE {
            log::error!("Id value {} is too small", id_value);
            return Err(ID_TOO_SMALL_ERROR.clone());
        }
        Ok(())
    }
}

impl Default for NitriteId {
    fn default() -> Self {
        NitriteId::new()
    }
}

impl Debug for NitriteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]{}", self.id_value, NO2)
    }
}

impl Display for NitriteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]{}", self.id_value, NO2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_valid_and_unique() {
        let first = NitriteId::new();
        let second = NitriteId::new();
        assert_ne!(first, second);
        assert!(NitriteId::valid_id(first.id_value()).is_ok());
        assert!(first < second);
    }

    #[test]
    fn create_id_checks_range() {
        let id = NitriteId::create_id(1_000_000_000_000_000_001).unwrap();
        assert_eq!(id.id_value(), 1_000_000_000_000_000_001);

        let err = NitriteId::create_id(42).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidId);

        let err = NitriteId::create_id(u64::MAX).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidId);
    }

    #[test]
    fn boundaries() {
        assert!(NitriteId::create_id(MIN_VALUE).is_ok());
        assert!(NitriteId::create_id(MIN_VALUE - 1).is_err());
        assert!(NitriteId::create_id(MAX_VALUE - 1).is_ok());
        assert!(NitriteId::create_id(MAX_VALUE).is_err());
    }

    #[test]
    fn display_format() {
        let id = NitriteId::create_id(1_000_000_000_000_000_123).unwrap();
        assert_eq!(id.to_string(), "[1000000000000000123]NO\u{2082}");
        assert_eq!(format!("{:?}", id), "[1000000000000000123]NO\u{2082}");
    }
}

use crate::errors::{ErrorKind, NitriteError, NitriteResult};
use icu_collator::options::CollatorOptions;
use icu_collator::{Collator, CollatorBorrowed, CollatorPreferences};
use std::fmt::{Debug, Formatter};

/// Direction of a sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    /// Smallest to largest.
    Ascending,
    /// Largest to smallest.
    Descending,
}

impl SortOrder {
    /// The reverse flag an index scan uses for this direction.
    #[inline]
    pub fn is_reverse(&self) -> bool {
        matches!(self, SortOrder::Descending)
    }
}

/// Where null (or missing) sort keys are placed.
///
/// The placement does not depend on the sort direction: with
/// [NullOrder::First] nulls lead both an ascending and a descending sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NullOrder {
    First,
    Last,
    /// Same as [NullOrder::First].
    #[default]
    Default,
}

impl NullOrder {
    #[inline]
    pub fn nulls_first(&self) -> bool {
        !matches!(self, NullOrder::Last)
    }
}

/// Locale-aware string comparison settings for sorting.
#[derive(Clone, Copy, Default)]
pub struct Collation {
    preferences: CollatorPreferences,
    options: CollatorOptions,
}

impl Collation {
    pub fn new(preferences: CollatorPreferences, options: CollatorOptions) -> Self {
        Collation {
            preferences,
            options,
        }
    }

    pub fn preferences(&self) -> CollatorPreferences {
        self.preferences
    }

    pub fn options(&self) -> CollatorOptions {
        self.options
    }

    /// Builds the ICU collator for these settings.
    pub fn collator(&self) -> NitriteResult<CollatorBorrowed<'static>> {
        Collator::try_new(self.preferences, self.options).map_err(|err| {
            log::error!("Failed to create collator for sorting: {:?}", err);
            NitriteError::new(
                "Failed to create collator for sorting - check collator preferences and options",
                ErrorKind::InvalidOperation,
            )
        })
    }
}

impl From<CollatorOptions> for Collation {
    fn from(options: CollatorOptions) -> Self {
        Collation::new(CollatorPreferences::default(), options)
    }
}

impl Debug for Collation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collation")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

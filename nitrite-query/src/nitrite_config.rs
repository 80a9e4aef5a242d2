//! Configuration of collections.

use parking_lot::RwLock;

use crate::common::{NullOrder, ReadExecutor, WriteExecutor, DEFAULT_PLAN_CACHE_SIZE};
use crate::errors::{ErrorKind, NitriteError, NitriteResult};
use crate::FIELD_SEPARATOR;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Settings shared by the collections created from it.
///
/// The configuration can be changed until the first collection is built
/// from it; after that every setter fails with `InvalidOperation`.
///
/// The field separator is process-wide: setting it affects every document,
/// not only those of collections using this configuration.
///
/// # Examples
///
/// ```rust,ignore
/// use nitrite_query::nitrite_config::NitriteConfig;
/// use nitrite_query::common::NullOrder;
///
/// let config = NitriteConfig::new();
/// config.set_default_null_order(NullOrder::Last)?;
/// config.set_plan_cache_size(500)?;
/// let collection = NitriteCollection::with_store("users", config, store)?;
/// ```
#[derive(Clone, Default)]
pub struct NitriteConfig {
    inner: Arc<NitriteConfigInner>,
}

impl NitriteConfig {
    /// Creates a new configuration instance with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current field separator string for nested document access.
    pub fn field_separator(&self) -> String {
        FIELD_SEPARATOR.read_with(|it| it.clone())
    }

    /// Sets the field separator for nested document access.
    ///
    /// # Errors
    ///
    /// `InvalidOperation` if already initialized or if the separator is empty.
    pub fn set_field_separator(&self, separator: &str) -> NitriteResult<()> {
        self.check_not_configured("Field separator")?;
        if separator.is_empty() {
            log::error!("Field separator cannot be empty");
            return Err(NitriteError::new(
                "Field separator cannot be empty",
                ErrorKind::InvalidOperation,
            ));
        }

        FIELD_SEPARATOR.write_with(|it| *it = separator.to_string());
        Ok(())
    }

    /// Null placement used by queries that do not choose one.
    pub fn default_null_order(&self) -> NullOrder {
        *self.inner.default_null_order.read()
    }

    pub fn set_default_null_order(&self, null_order: NullOrder) -> NitriteResult<()> {
        self.check_not_configured("Default null order")?;
        *self.inner.default_null_order.write() = null_order;
        Ok(())
    }

    /// Maximum number of query plans a collection keeps cached.
    pub fn plan_cache_size(&self) -> usize {
        self.inner.plan_cache_size.load(Ordering::Acquire)
    }

    pub fn set_plan_cache_size(&self, size: usize) -> NitriteResult<()> {
        self.check_not_configured("Plan cache size")?;
        self.inner.plan_cache_size.store(size, Ordering::Release);
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.inner.configured.load(Ordering::Acquire)
    }

    /// Freezes the configuration.
    pub(crate) fn initialize(&self) {
        if !self.inner.configured.swap(true, Ordering::AcqRel) {
            log::debug!(
                "Configuration initialized with separator {:?}, null order {:?}, plan cache size {}",
                self.field_separator(),
                self.default_null_order(),
                self.plan_cache_size()
            );
        }
    }

    fn check_not_configured(&self, setting: &str) -> NitriteResult<()> {
        if self.is_configured() {
            log::error!("{} cannot be changed after initialization", setting);
            return Err(NitriteError::new(
                &format!("{} cannot be changed after initialization", setting),
                ErrorKind::InvalidOperation,
            ));
        }
        Ok(())
    }
}

struct NitriteConfigInner {
    configured: AtomicBool,
    default_null_order: RwLock<NullOrder>,
    plan_cache_size: AtomicUsize,
}

impl Default for NitriteConfigInner {
    fn default() -> Self {
        NitriteConfigInner {
            configured: AtomicBool::new(false),
            default_null_order: RwLock::new(NullOrder::Default),
            plan_cache_size: AtomicUsize::new(DEFAULT_PLAN_CACHE_SIZE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NitriteConfig::new();
        assert_eq!(config.default_null_order(), NullOrder::Default);
        assert_eq!(config.plan_cache_size(), DEFAULT_PLAN_CACHE_SIZE);
        assert!(!config.is_configured());
    }

    #[test]
    fn test_settings_before_initialize() {
        let config = NitriteConfig::new();
        config.set_default_null_order(NullOrder::Last).unwrap();
        config.set_plan_cache_size(5).unwrap();
        assert_eq!(config.default_null_order(), NullOrder::Last);
        assert_eq!(config.plan_cache_size(), 5);
    }

    #[test]
    fn test_settings_frozen_after_initialize() {
        let config = NitriteConfig::new();
        config.initialize();
        assert!(config.is_configured());

        let err = config.set_default_null_order(NullOrder::Last).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidOperation);
        let err = config.set_plan_cache_size(1).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidOperation);
        let err = config.set_field_separator(":").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidOperation);
    }

    #[test]
    fn test_empty_separator_is_rejected() {
        let config = NitriteConfig::new();
        let err = config.set_field_separator("").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidOperation);
    }

    #[test]
    #[cfg(feature = "custom_separator")]
    fn test_custom_separator() {
        use crate::collection::Document;
        use crate::common::Value;

        let config = NitriteConfig::new();
        config.set_field_separator("::").unwrap();
        assert_eq!(config.field_separator(), "::");

        let mut doc = Document::new();
        doc.put("a::b", 1).unwrap();
        doc.put("a::c::d", "deep").unwrap();
        doc.put("list", vec![Value::from(10), Value::from(20)]).unwrap();

        assert_eq!(doc.get("a::b").unwrap(), Value::I32(1));
        assert_eq!(doc.get("a::c::d").unwrap(), Value::from("deep"));
        assert_eq!(doc.get("list::1").unwrap(), Value::I32(20));
        assert!(doc.get("a").unwrap().is_document());
        assert_eq!(doc.get("a.b").unwrap(), Value::Null);
        assert_eq!(doc.get("a:b").unwrap(), Value::Null);

        let mut fields = doc.fields();
        fields.sort();
        assert_eq!(fields, vec!["a::b".to_string(), "a::c::d".to_string()]);

        doc.put("x.y", true).unwrap();
        assert_eq!(doc.get("x.y").unwrap(), Value::Bool(true));
        assert!(!doc.get("x").unwrap().is_document());

        doc.remove("a::c::d").unwrap();
        assert_eq!(doc.get("a::c").unwrap(), Value::Null);
        assert_eq!(doc.get("a::b").unwrap(), Value::I32(1));

        config.set_field_separator(".").unwrap();
    }
}

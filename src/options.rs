//! Import and export configuration.

use crate::{Error, Result};

/// Resource limits applied while decoding a package.
#[derive(Debug, Clone)]
pub struct ResourceLimits {
    /// Maximum number of archive entries.
    pub max_entries: usize,
    /// Maximum unpacked size of a single entry.
    pub max_entry_size: u64,
    /// Maximum unpacked size of the whole tar stream.
    pub max_total_size: u64,
}

impl Default for ResourceLimits {
    /// Creates resource limits with the following default values:
    ///
    /// | Limit | Default Value |
    /// |-------|---------------|
    /// | `max_entries` | 100,000 |
    /// | `max_entry_size` | 4 GiB |
    /// | `max_total_size` | 16 GiB |
    fn default() -> Self {
        Self {
            max_entries: 100_000,
            max_entry_size: 4 << 30,
            max_total_size: 16 << 30,
        }
    }
}

impl ResourceLimits {
    /// Creates new resource limits with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates resource limits with no restrictions.
    pub fn unlimited() -> Self {
        Self {
            max_entries: usize::MAX,
            max_entry_size: u64::MAX,
            max_total_size: u64::MAX,
        }
    }

    /// Sets the maximum number of entries.
    pub fn max_entries(mut self, max: usize) -> Self {
        self.max_entries = max;
        self
    }

    /// Sets the maximum size of a single entry.
    pub fn max_entry_size(mut self, max: u64) -> Self {
        self.max_entry_size = max;
        self
    }

    /// Sets the maximum total unpacked size.
    pub fn max_total_size(mut self, max: u64) -> Self {
        self.max_total_size = max;
        self
    }
}

/// Options for [`Package::import_with_options`](crate::Package::import_with_options).
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Limits enforced while decoding.
    pub limits: ResourceLimits,
}

impl ImportOptions {
    /// Creates default import options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the resource limits.
    pub fn limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = limits;
        self
    }
}

/// Options for [`Package::export_with_options`](crate::Package::export_with_options).
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Gzip compression level (0-9).
    pub level: u32,
    /// Modification time stamped on every tar header (seconds since epoch).
    pub mtime: u64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self { level: 6, mtime: 0 }
    }
}

impl ExportOptions {
    /// Creates default export options (level 6, mtime 0).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the gzip compression level.
    ///
    /// # Errors
    ///
    /// Returns an error if `level` is greater than 9.
    pub fn level(mut self, level: u32) -> Result<Self> {
        if level > 9 {
            return Err(Error::InvalidOption(format!(
                "compression level {} out of range 0-9",
                level
            )));
        }
        self.level = level;
        Ok(self)
    }

    /// Sets the tar header modification time.
    pub fn mtime(mut self, mtime: u64) -> Self {
        self.mtime = mtime;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_builder() {
        let limits = ResourceLimits::new()
            .max_entries(10)
            .max_entry_size(1024)
            .max_total_size(4096);
        assert_eq!(limits.max_entries, 10);
        assert_eq!(limits.max_entry_size, 1024);
        assert_eq!(limits.max_total_size, 4096);
    }

    #[test]
    fn test_unlimited() {
        let limits = ResourceLimits::unlimited();
        assert_eq!(limits.max_entries, usize::MAX);
        assert_eq!(limits.max_total_size, u64::MAX);
    }

    #[test]
    fn test_export_level_range() {
        assert_eq!(ExportOptions::new().level(9).unwrap().level, 9);
        assert!(ExportOptions::new().level(10).is_err());
    }

    #[test]
    fn test_export_defaults() {
        let opts = ExportOptions::default();
        assert_eq!(opts.level, 6);
        assert_eq!(opts.mtime, 0);
    }
}

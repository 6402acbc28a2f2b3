use crate::{BLOCK_SIZE, DEFAULT_MEMBERSHIP_ARRAY_THRESHOLD};

#[derive(Clone, Debug, Default)]
pub struct Configuration {
    /// Largest accepted block, in bytes (default: 8192)
    pub block_size: Option<usize>,
    /// Membership filters up to this many literals use a plain array (default: 8)
    pub membership_array_threshold: Option<usize>,
    /// Forces row-id sorting on or off regardless of the request flag
    pub sort_row_ids: Option<bool>
}

impl Configuration {
    pub fn block_size(&self) -> usize {
        self.block_size.unwrap_or(BLOCK_SIZE)
    }

    pub fn membership_array_threshold(&self) -> usize {
        self.membership_array_threshold.unwrap_or(DEFAULT_MEMBERSHIP_ARRAY_THRESHOLD)
    }

    pub fn sort_row_ids(&self, requested: bool) -> bool {
        self.sort_row_ids.unwrap_or(requested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Configuration::default();
        assert_eq!(config.block_size(), BLOCK_SIZE);
        assert_eq!(config.membership_array_threshold(), 8);
        assert!(config.sort_row_ids(true));
        assert!(!config.sort_row_ids(false));
    }

    #[test]
    fn test_overrides() {
        let config = Configuration {
            block_size: Some(1024),
            membership_array_threshold: Some(2),
            sort_row_ids: Some(false)
        };
        assert_eq!(config.block_size(), 1024);
        assert_eq!(config.membership_array_threshold(), 2);
        assert!(!config.sort_row_ids(true));
    }
}

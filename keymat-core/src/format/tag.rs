//! Persistence tags naming the supported sparse store backends
//!
//! Rehydration resolves a tag to a concrete backend; anything else is a
//! persistence error. The set is closed on purpose: there is no dynamic
//! backend registration.

/// Sparse store backends supported by the flattened form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum StoreTag {
    /// Ordered tree map keyed by linear index
    BTree = 0,
    /// Parallel sorted key/value vectors
    Paired = 1,
}

impl StoreTag {
    /// Convert from u8 representation
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(StoreTag::BTree),
            1 => Some(StoreTag::Paired),
            _ => None,
        }
    }

    /// Convert to u8 representation
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Stable textual name of the backend
    pub const fn as_str(self) -> &'static str {
        match self {
            StoreTag::BTree => "btree",
            StoreTag::Paired => "paired",
        }
    }

    /// Resolve a textual name back to a tag
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "btree" => Some(StoreTag::BTree),
            "paired" => Some(StoreTag::Paired),
            _ => None,
        }
    }
}

impl core::fmt::Display for StoreTag {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

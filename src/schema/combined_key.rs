//! The `(foreign key, primary key)` pair.

use std::fmt;

/// Key of the subscription store and of every record this stage emits.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CombinedKey<FK, PK> {
    /// Absent only for records carrying the propagate-null instruction.
    pub foreign_key: Option<FK>,
    pub primary_key: PK,
}

impl<FK, PK> CombinedKey<FK, PK> {
    pub fn new(foreign_key: Option<FK>, primary_key: PK) -> Self {
        Self {
            foreign_key,
            primary_key,
        }
    }

    /// Whether this key pairs with the given foreign key.
    pub fn matches_foreign_key(&self, foreign_key: &FK) -> bool
    where
        FK: PartialEq,
    {
        self.foreign_key.as_ref() == Some(foreign_key)
    }
}

impl<FK: fmt::Debug, PK: fmt::Debug> fmt::Debug for CombinedKey<FK, PK> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CombinedKey{{fk={:?}, pk={:?}}}",
            self.foreign_key, self.primary_key
        )
    }
}

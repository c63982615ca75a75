//! Combined-key encoding.
//!
//! Subscription state is indexed by `(foreign key, primary key)`. The byte
//! form puts a length-prefixed foreign key first, so every entry for one
//! foreign key lives in a single contiguous range of an ordered store:
//!
//! ```text
//! +----------------+------------------+------------------+
//! | fk len (u32 BE)| foreign key bytes| primary key bytes|
//! +----------------+------------------+------------------+
//! ```

mod combined_key;
mod key_schema;

pub use combined_key::CombinedKey;
pub use key_schema::{prefix_exclusive_end, CombinedKeySchema};

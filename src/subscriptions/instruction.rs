//! Subscription instructions and the store transitions they drive.

use crate::error::{JoinError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Directive carried by every subscription wrapper.
///
/// The set is closed: adding a variant changes the wire protocol and
/// requires bumping [`CURRENT_VERSION`](super::CURRENT_VERSION).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Instruction {
    /// Remove the subscription and propagate the removal downstream.
    DeleteKeyAndPropagate,
    /// Remove the subscription without propagating a result.
    DeleteKeyNoPropagate,
    /// Subscribe, and emit a null join result if the foreign key has no value.
    PropagateNullIfNoFkValAvailable,
    /// Subscribe, emitting only when the foreign key has a value.
    PropagateOnlyIfFkValAvailable,
}

/// What a processed record does to the subscription store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreEffect {
    /// Insert or overwrite the combined-key entry.
    Put,
    /// Remove the combined-key entry.
    Delete,
    /// Leave the store alone; there is no combined key to index by.
    Skip,
}

impl Instruction {
    pub const ALL: [Instruction; 4] = [
        Instruction::DeleteKeyAndPropagate,
        Instruction::DeleteKeyNoPropagate,
        Instruction::PropagateNullIfNoFkValAvailable,
        Instruction::PropagateOnlyIfFkValAvailable,
    ];

    /// Wire code.
    pub fn code(self) -> u8 {
        match self {
            Instruction::DeleteKeyAndPropagate => 0,
            Instruction::DeleteKeyNoPropagate => 1,
            Instruction::PropagateNullIfNoFkValAvailable => 2,
            Instruction::PropagateOnlyIfFkValAvailable => 3,
        }
    }

    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(Instruction::DeleteKeyAndPropagate),
            1 => Ok(Instruction::DeleteKeyNoPropagate),
            2 => Ok(Instruction::PropagateNullIfNoFkValAvailable),
            3 => Ok(Instruction::PropagateOnlyIfFkValAvailable),
            other => Err(JoinError::UnknownInstruction(other)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Instruction::DeleteKeyAndPropagate => "DELETE_KEY_AND_PROPAGATE",
            Instruction::DeleteKeyNoPropagate => "DELETE_KEY_NO_PROPAGATE",
            Instruction::PropagateNullIfNoFkValAvailable => "PROPAGATE_NULL_IF_NO_FK_VAL_AVAILABLE",
            Instruction::PropagateOnlyIfFkValAvailable => "PROPAGATE_ONLY_IF_FK_VAL_AVAILABLE",
        }
    }

    /// Whether a record with an absent foreign key is legitimate.
    pub fn allows_null_foreign_key(self) -> bool {
        self == Instruction::PropagateNullIfNoFkValAvailable
    }

    pub fn is_delete(self) -> bool {
        matches!(
            self,
            Instruction::DeleteKeyAndPropagate | Instruction::DeleteKeyNoPropagate
        )
    }

    /// Whether downstream stages should propagate the resulting change.
    pub fn propagates(self) -> bool {
        self != Instruction::DeleteKeyNoPropagate
    }

    /// Store transition for this instruction.
    ///
    /// Depends only on the instruction and whether a foreign key is present;
    /// the store itself holds all accumulated state.
    pub fn store_effect(self, has_foreign_key: bool) -> StoreEffect {
        if !has_foreign_key {
            return StoreEffect::Skip;
        }
        match self {
            Instruction::DeleteKeyAndPropagate | Instruction::DeleteKeyNoPropagate => {
                StoreEffect::Delete
            }
            Instruction::PropagateNullIfNoFkValAvailable
            | Instruction::PropagateOnlyIfFkValAvailable => StoreEffect::Put,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Instruction {
    type Err = JoinError;

    fn from_str(s: &str) -> Result<Self> {
        Instruction::ALL
            .into_iter()
            .find(|i| i.as_str() == s)
            .ok_or_else(|| JoinError::Deserialization(format!("unknown instruction: {}", s)))
    }
}

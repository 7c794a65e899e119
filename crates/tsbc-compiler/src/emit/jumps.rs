//! Forward jumps waiting for their label.
//!
//! Every short-circuit branch jumps forward to a label bound later in the
//! same expression. The manager remembers the operand offsets to patch.

use rustc_hash::FxHashMap;

use super::JumpLabel;
use crate::plan::Label;

#[derive(Debug, Default)]
pub struct JumpManager {
    pending: FxHashMap<Label, Vec<JumpLabel>>,
}

impl JumpManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a jump that lands on `label`.
    pub fn add(&mut self, label: Label, jump: JumpLabel) {
        self.pending.entry(label).or_default().push(jump);
    }

    /// Remove and return the jumps landing on `label`.
    pub fn take(&mut self, label: Label) -> Vec<JumpLabel> {
        self.pending.remove(&label).unwrap_or_default()
    }

    /// The lowest label that still has jumps waiting, if any.
    pub fn first_unresolved(&self) -> Option<Label> {
        self.pending.keys().min().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

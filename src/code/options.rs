//! Decode guardrails and validation switches.

use crate::code::opcode::MAXREPEAT;

/// Options for one decode call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecodeOptions {
    /// Largest accepted repeat maximum.
    pub max_repeat: u32,
    /// Maximum block nesting depth. Each level costs several stack frames, so
    /// the default stays well inside a 2 MiB thread stack in debug builds.
    pub max_depth: usize,
    /// Number of capture groups in the pattern, when known. Enables group
    /// range checks on `MARK`, `GROUPREF*` and `GROUPREF_EXISTS`.
    pub group_count: Option<u32>,
    /// Reject BIGCHARSET index tables that point past the block list.
    pub validate_block_indices: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_repeat: MAXREPEAT,
            max_depth: 64,
            group_count: None,
            validate_block_indices: true,
        }
    }
}

impl DecodeOptions {
    /// Returns options that also check group references against `groups`.
    pub fn with_group_count(mut self, groups: u32) -> Self {
        self.group_count = Some(groups);
        self
    }

    /// Returns options with a different nesting limit.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Returns options with a different repeat sentinel.
    pub fn with_max_repeat(mut self, max_repeat: u32) -> Self {
        self.max_repeat = max_repeat;
        self
    }
}

//! Rewrite prompt construction.

/// Instruction sent ahead of every chunk unless configured otherwise.
pub const DEFAULT_REWRITE_INSTRUCTION: &str = "I will give you a page of hardware documentation \
from an electric engineering manual. I want you to make some new documentation inspired by \
software documentation's simple and relatively easy to read layout.";

/// Build the prompt for one chunk piece: the instruction, a newline, the
/// piece.
pub fn build_rewrite_prompt(instruction: &str, piece: &str) -> String {
    format!("{}\n{}", instruction.trim_end(), piece)
}

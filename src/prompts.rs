//! Recognition instructions for formula OCR and animation captioning.
//!
//! Centralising every instruction here serves two purposes:
//!
//! 1. **Single source of truth** — changing the recognition behaviour
//!    (delimiter rules, caption framing) requires editing exactly one place.
//!
//! 2. **Testability** — unit tests can inspect instructions directly without
//!    spinning up a real recognition service.

/// Instruction sent with a formula image.
///
/// The delimiter rule mirrors common Markdown maths conventions: very short
/// expressions read better inline, anything longer gets display maths.
pub const FORMULA_INSTRUCTION: &str = "Convert the formula image to LaTeX. \
Rule: Use $...$ if the resulting formula is under 10 characters; otherwise, \
use $$...$$. Only output the LaTeX code without any explanation.";

/// Build the instruction sent with a three-frame animation composite.
///
/// `language` names the target language for the caption; `hint` is the
/// caller's free-text addition, appended verbatim when present.
pub fn animation_caption_instruction(language: &str, hint: Option<&str>) -> String {
    let mut instruction = format!(
        "This is a composite image showing three frames from an animation \
         (start, middle, end) arranged horizontally. Describe what this \
         animation shows and what motion or change occurs across these three \
         frames in {language}."
    );
    if let Some(extra) = hint {
        if !extra.is_empty() {
            instruction.push(' ');
            instruction.push_str(extra);
        }
    }
    instruction
}

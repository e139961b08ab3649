//! Placeholder resolution for the final Markdown text.
//!
//! Earlier stages emit two marker families instead of literal LaTeX, so
//! intermediate text transformations can never corrupt recognized
//! content:
//!
//! - **Balanced markers**: `![](LATEX_FORMULA:...)` wrapping raw LaTeX.
//!   LaTeX freely contains parentheses, so these are located with a
//!   depth-counting scan rather than a regex.
//! - **Encoded markers**: `⟨OMML:$:b64⟩` wrapping base64 LaTeX from
//!   native equation markup. The payload alphabet is regex-safe, so a
//!   regex finds these directly.
//!
//! [`resolve_placeholders`] is a pure string pass: run it exactly once,
//! after all other text processing, on the fully assembled document.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::warn;

/// Opening sequence of a balanced formula marker.
const BALANCED_MARKER_OPEN: &str = "![](LATEX_FORMULA:";

/// Encoded equation marker: delimiter group then base64 payload. The
/// payload may carry `\+` and `\/` escapes introduced to survive
/// intermediate escaping passes.
static EQUATION_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"⟨OMML:(\$+):([A-Za-z0-9+/=\\]+)⟩").expect("valid regex"));

/// Wrap recognized LaTeX in a balanced formula marker.
pub fn formula_marker(latex: &str) -> String {
    format!("{BALANCED_MARKER_OPEN}{latex})")
}

/// Wrap LaTeX from native equation markup in an encoded marker.
///
/// `display` selects block form (`$$`, rendered with a trailing
/// blank line) over inline form (`$`).
pub fn equation_marker(display: bool, latex: &str) -> String {
    let delim = if display { "$$" } else { "$" };
    format!("⟨OMML:{delim}:{}⟩", STANDARD.encode(latex))
}

/// Resolve every marker in `input` to its literal text.
///
/// Malformed markers (unterminated balanced markers, undecodable
/// encoded payloads) are left in place unchanged; a partial document
/// beats a silently dropped equation.
pub fn resolve_placeholders(input: &str) -> String {
    let resolved = resolve_equation_markers(input);
    resolve_formula_markers(&resolved)
}

fn resolve_equation_markers(input: &str) -> String {
    EQUATION_MARKER
        .replace_all(input, |caps: &Captures<'_>| {
            let delim = &caps[1];
            let payload = caps[2].replace(r"\+", "+").replace(r"\/", "/");
            let latex = match STANDARD.decode(&payload) {
                Ok(bytes) => match String::from_utf8(bytes) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!("Equation marker payload is not UTF-8: {e}");
                        return caps[0].to_string();
                    }
                },
                Err(e) => {
                    warn!("Equation marker payload is not valid base64: {e}");
                    return caps[0].to_string();
                }
            };
            if delim == "$$" {
                // Block equations need a following blank line to render
                // as their own paragraph.
                format!("$${latex}$$\n\n")
            } else {
                format!("${latex}$")
            }
        })
        .into_owned()
}

fn resolve_formula_markers(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find(BALANCED_MARKER_OPEN) {
        output.push_str(&rest[..start]);
        let body = &rest[start + BALANCED_MARKER_OPEN.len()..];

        match balanced_end(body) {
            Some(end) => {
                output.push_str(&body[..end]);
                rest = &body[end + 1..];
            }
            None => {
                // Unterminated marker: keep the text verbatim and stop.
                output.push_str(&rest[start..]);
                return output;
            }
        }
    }

    output.push_str(rest);
    output
}

/// Byte offset of the parenthesis that closes the marker opened just
/// before `body`, or `None` if the marker never closes.
fn balanced_end(body: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (i, c) in body.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formula_marker_round_trip() {
        let marker = formula_marker(r"$\frac{a}{b}(x)$");
        let text = format!("Before {marker} after");
        assert_eq!(
            resolve_placeholders(&text),
            r"Before $\frac{a}{b}(x)$ after"
        );
    }

    #[test]
    fn test_multiple_formula_markers() {
        let text = format!(
            "{} and {}",
            formula_marker("$a+b$"),
            formula_marker(r"$f(g(x))$")
        );
        assert_eq!(resolve_placeholders(&text), "$a+b$ and $f(g(x))$");
    }

    #[test]
    fn test_unterminated_marker_left_alone() {
        let text = "text ![](LATEX_FORMULA:$x + (y$ trailing";
        assert_eq!(resolve_placeholders(text), text);
    }

    #[test]
    fn test_inline_equation_marker() {
        let marker = equation_marker(false, r"E = mc^2");
        let resolved = resolve_placeholders(&marker);
        assert_eq!(resolved, "$E = mc^2$");
    }

    #[test]
    fn test_display_equation_gets_blank_line() {
        let marker = equation_marker(true, r"\sum_{i=0}^n i");
        let resolved = resolve_placeholders(&marker);
        assert_eq!(resolved, "$$\\sum_{i=0}^n i$$\n\n");
    }

    #[test]
    fn test_escaped_payload_characters() {
        // Simulate an intermediate escaping pass on the base64 payload.
        let marker = equation_marker(false, "a/b?c");
        let escaped = marker.replace('+', r"\+").replace('/', r"\/");
        assert_eq!(resolve_placeholders(&escaped), "$a/b?c$");
    }

    #[test]
    fn test_invalid_utf8_payload_left_alone() {
        // `/w==` decodes to the single byte 0xFF, which is not UTF-8.
        let text = "x ⟨OMML:$:/w==⟩ y";
        assert_eq!(resolve_placeholders(text), text);
    }

    #[test]
    fn test_plain_text_unchanged() {
        let text = "No markers here, just (parens) and $math$.";
        assert_eq!(resolve_placeholders(text), text);
    }

    #[test]
    fn test_mixed_marker_families() {
        let text = format!(
            "{}\n{}",
            equation_marker(false, "x^2"),
            formula_marker("$y^2$")
        );
        assert_eq!(resolve_placeholders(&text), "$x^2$\n$y^2$");
    }
}

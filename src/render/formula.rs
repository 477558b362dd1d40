//! Exponent/subscript mini-notation expansion.
//!
//! Fallback paragraphs may embed formulas in `{{...}}` slots, written in a
//! compact notation where `^` opens a superscript and `_` a subscript. The
//! open group runs until the next operator character, with parentheses
//! suspending the auto-close so grouped expressions stay inside one tag.

use regex::Regex;

/// Characters that close an open superscript/subscript group.
const CLOSERS: [char; 7] = ['+', '-', '=', ':', '*', '/', ')'];

/// Expand one formula body into nested `<sup>`/`<sub>` markup.
pub fn expand(formula: &str) -> String {
    let mut out = String::new();
    let mut sup = false;
    let mut sub = false;
    let mut union = false;

    for ch in formula.trim().chars() {
        match ch {
            '^' => {
                if sub {
                    out.push_str("</sub>");
                    sub = false;
                }
                out.push_str("<sup>");
                sup = true;
            }
            '_' => {
                if sup {
                    out.push_str("</sup>");
                    sup = false;
                }
                out.push_str("<sub>");
                sub = true;
            }
            _ if sup || sub => {
                let closed_before = CLOSERS.contains(&ch) && !union;
                if closed_before {
                    if sup {
                        out.push_str("</sup>");
                        sup = false;
                    } else {
                        out.push_str("</sub>");
                        sub = false;
                    }
                }
                out.push(ch);
                if ch == '(' {
                    union = true;
                } else if ch == ')' && !closed_before {
                    union = false;
                    if sup {
                        out.push_str("</sup>");
                        sup = false;
                    } else if sub {
                        out.push_str("</sub>");
                        sub = false;
                    }
                }
            }
            _ => out.push(ch),
        }
    }

    // A group still open at the end of the formula is closed, never left
    // dangling.
    if sup {
        out.push_str("</sup>");
    }
    if sub {
        out.push_str("</sub>");
    }

    out.replace("<sub> </sub>", "")
        .replace("<sup> </sup>", "")
        .replace(' ', "")
}

/// Expand every `{{...}}` slot embedded in already-rendered paragraph
/// text, wrapping each expansion in `<em>`.
pub fn expand_embedded(text: &str, slot_re: &Regex) -> String {
    slot_re
        .replace_all(text, |caps: &regex::Captures<'_>| {
            format!("<em>{}</em>", expand(&caps[1]))
        })
        .into_owned()
}

/// The `{{...}}` slot pattern, compiled once per conversion.
pub fn slot_regex() -> Regex {
    Regex::new(r"\{\{(.*?)\}\}").expect("formula slot pattern is valid")
}

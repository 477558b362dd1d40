//! Markup token vocabulary and normalization.
//!
//! The output dialect percent-encodes structural HTML (`%3Cstrong%3E` for
//! `<strong>`) so it survives a later encoding pass on the platform side.
//! This module owns the token constants, the `%` escape, the curly-quote
//! substitution, and the seam normalizer that collapses redundant
//! close/open pairs left behind by per-run style wrapping.

/// Percent-encoded justified paragraph open.
pub const P_OPEN: &str = "%3Cp%20style='text-align:%20justify;'%3E";
/// Percent-encoded paragraph close plus newline.
pub const P_CLOSE: &str = "%3C/p%3E%0A";
/// Percent-encoded unordered list open.
pub const UL_OPEN: &str = "%3Cul%3E%0A";
/// Percent-encoded unordered list close.
pub const UL_CLOSE: &str = "%3C/ul%3E";
/// Percent-encoded ordered list open.
pub const OL_OPEN: &str = "%3Col%3E%0A";
/// Percent-encoded ordered list close.
pub const OL_CLOSE: &str = "%3C/ol%3E";
/// Percent-encoded justified list item open.
pub const LI_OPEN: &str = "%3Cli%20style='text-align:%20justify;'%3E";
/// Percent-encoded list item close (double break included).
pub const LI_CLOSE: &str = "%3Cbr%20/%3E%3Cbr%20/%3E%3C/li%3E%0A";

/// Percent-encoded strong open/close.
pub const STRONG_OPEN: &str = "%3Cstrong%3E";
pub const STRONG_CLOSE: &str = "%3C/strong%3E";
/// Percent-encoded em open/close.
pub const EM_OPEN: &str = "%3Cem%3E";
pub const EM_CLOSE: &str = "%3C/em%3E";
/// Percent-encoded underline span open/close.
pub const SPAN_UNDERLINE_OPEN: &str = "%3Cspan%20style=%22text-decoration:%20underline;%22%3E";
pub const SPAN_UNDERLINE_CLOSE: &str = "%3C/span%3E";

/// Opening (left) curly double quote.
pub const LEFT_QUOTE: char = '\u{201C}';
/// Closing (right) curly double quote.
pub const RIGHT_QUOTE: char = '\u{201D}';

/// Escape percent signs so run text cannot corrupt the encoded tags
/// wrapped around it. Must run after quote substitution and before any
/// tag wrapping.
pub fn escape_percent(text: &str) -> String {
    text.replace('%', "%25")
}

/// Substitute literal double quotes with alternating curly glyphs.
///
/// `parity` is the block-scoped quote counter: even parity yields an
/// opening quote and increments, odd parity a closing quote and
/// decrements. All quotes within one run receive the same glyph; the
/// alternation is across runs, not per quote pair.
pub fn swap_quotes(text: &str, parity: &mut i32) -> String {
    if !text.contains('"') {
        return text.to_string();
    }
    if *parity % 2 == 0 {
        *parity += 1;
        text.replace('"', &LEFT_QUOTE.to_string())
    } else {
        *parity -= 1;
        text.replace('"', &RIGHT_QUOTE.to_string())
    }
}

/// Remove underline-span close/open seams between consecutive underlined
/// runs, leaving one continuous span.
pub fn collapse_underline_seams(text: &str) -> String {
    let seam = format!("{SPAN_UNDERLINE_CLOSE}{SPAN_UNDERLINE_OPEN}");
    text.replace(&seam, "")
}

/// Seam normalizer for strong/em markup.
///
/// Per-run wrapping produces redundant close/open pairs whenever two
/// adjacent runs carry the same style (`</strong><strong>`, possibly with
/// a single space between, and the four-tag bold-italic seam). The
/// normalizer tokenizes the input against one tag vocabulary and reduces
/// adjacent tokens on a stack until no rule applies, so normalizing
/// already-normalized markup is a no-op.
#[derive(Debug, Clone, Copy)]
pub struct SeamNormalizer {
    strong_open: &'static str,
    strong_close: &'static str,
    em_open: &'static str,
    em_close: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
enum Token<'a> {
    StrongOpen,
    StrongClose,
    EmOpen,
    EmClose,
    /// A text chunk that is exactly one space; participates in the
    /// space-separated seam rules.
    Space,
    Text(&'a str),
}

impl SeamNormalizer {
    /// Vocabulary for plain (non-encoded) markup.
    pub const PLAIN: Self = Self {
        strong_open: "<strong>",
        strong_close: "</strong>",
        em_open: "<em>",
        em_close: "</em>",
    };

    /// Vocabulary for percent-encoded markup.
    pub const ENCODED: Self = Self {
        strong_open: STRONG_OPEN,
        strong_close: STRONG_CLOSE,
        em_open: EM_OPEN,
        em_close: EM_CLOSE,
    };

    /// Normalize style seams in `input`.
    pub fn normalize(&self, input: &str) -> String {
        let tokens = self.tokenize(input);
        let reduced = Self::reduce(tokens);
        let mut out = String::with_capacity(input.len());
        for token in reduced {
            match token {
                Token::StrongOpen => out.push_str(self.strong_open),
                Token::StrongClose => out.push_str(self.strong_close),
                Token::EmOpen => out.push_str(self.em_open),
                Token::EmClose => out.push_str(self.em_close),
                Token::Space => out.push(' '),
                Token::Text(t) => out.push_str(t),
            }
        }
        out
    }

    fn tokenize<'a>(&self, input: &'a str) -> Vec<Token<'a>> {
        let mut tokens = Vec::new();
        let mut rest = input;
        while !rest.is_empty() {
            // Find the earliest tag occurrence.
            let candidates = [
                (rest.find(self.strong_open), Token::StrongOpen, self.strong_open.len()),
                (rest.find(self.strong_close), Token::StrongClose, self.strong_close.len()),
                (rest.find(self.em_open), Token::EmOpen, self.em_open.len()),
                (rest.find(self.em_close), Token::EmClose, self.em_close.len()),
            ];
            let next = candidates
                .iter()
                .filter_map(|(pos, tok, len)| pos.map(|p| (p, tok.clone(), *len)))
                .min_by_key(|(p, _, _)| *p);
            match next {
                Some((pos, token, len)) => {
                    if pos > 0 {
                        Self::push_text(&mut tokens, &rest[..pos]);
                    }
                    tokens.push(token);
                    rest = &rest[pos + len..];
                }
                None => {
                    Self::push_text(&mut tokens, rest);
                    break;
                }
            }
        }
        tokens
    }

    fn push_text<'a>(tokens: &mut Vec<Token<'a>>, chunk: &'a str) {
        if chunk == " " {
            tokens.push(Token::Space);
        } else {
            tokens.push(Token::Text(chunk));
        }
    }

    /// Stack reduction. Each push retries the rules at the stack top, so
    /// reductions cascade and the result is a fixpoint.
    fn reduce(tokens: Vec<Token<'_>>) -> Vec<Token<'_>> {
        let mut stack: Vec<Token<'_>> = Vec::with_capacity(tokens.len());
        for token in tokens {
            stack.push(token);
            loop {
                if !Self::reduce_top(&mut stack) {
                    break;
                }
            }
        }
        stack
    }

    fn reduce_top(stack: &mut Vec<Token<'_>>) -> bool {
        use Token::*;

        let n = stack.len();
        if n >= 2 {
            match (&stack[n - 2], &stack[n - 1]) {
                // Doubled opens/closes collapse to one.
                (StrongOpen, StrongOpen) | (StrongClose, StrongClose) => {
                    stack.pop();
                    return true;
                }
                (EmOpen, EmOpen) | (EmClose, EmClose) => {
                    stack.pop();
                    return true;
                }
                // A close immediately reopened is no seam at all.
                (StrongClose, StrongOpen) | (EmClose, EmOpen) => {
                    stack.truncate(n - 2);
                    return true;
                }
                _ => {}
            }
        }
        if n >= 3 {
            match (&stack[n - 3], &stack[n - 2], &stack[n - 1]) {
                // Space-separated seams keep the space.
                (StrongClose, Space, StrongOpen)
                | (EmClose, Space, EmOpen)
                | (EmClose, Space, EmClose) => {
                    stack.truncate(n - 3);
                    stack.push(Space);
                    return true;
                }
                _ => {}
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_percent() {
        assert_eq!(escape_percent("50% off"), "50%25 off");
        assert_eq!(escape_percent("no sign"), "no sign");
    }

    #[test]
    fn test_swap_quotes_alternates() {
        let mut parity = 0;
        let opened = swap_quotes("\"inicio", &mut parity);
        assert_eq!(opened, "\u{201C}inicio");
        assert_eq!(parity, 1);

        let closed = swap_quotes("fim\"", &mut parity);
        assert_eq!(closed, "fim\u{201D}");
        assert_eq!(parity, 0);
    }

    #[test]
    fn test_swap_quotes_no_quote_keeps_parity() {
        let mut parity = 1;
        assert_eq!(swap_quotes("sem aspas", &mut parity), "sem aspas");
        assert_eq!(parity, 1);
    }

    #[test]
    fn test_swap_quotes_same_glyph_within_run() {
        // All quotes in one run get the same glyph; alternation is across runs.
        let mut parity = 0;
        let out = swap_quotes("\"a\" e \"b\"", &mut parity);
        assert_eq!(out, "\u{201C}a\u{201C} e \u{201C}b\u{201C}");
        assert_eq!(parity, 1);
    }

    #[test]
    fn test_collapse_underline_seams() {
        let input = format!(
            "{SPAN_UNDERLINE_OPEN}um{SPAN_UNDERLINE_CLOSE}{SPAN_UNDERLINE_OPEN}dois{SPAN_UNDERLINE_CLOSE}"
        );
        let expected = format!("{SPAN_UNDERLINE_OPEN}umdois{SPAN_UNDERLINE_CLOSE}");
        assert_eq!(collapse_underline_seams(&input), expected);
    }

    #[test]
    fn test_normalize_adjacent_strong_runs() {
        let out = SeamNormalizer::PLAIN.normalize("<strong>a</strong><strong>b</strong>");
        assert_eq!(out, "<strong>ab</strong>");
    }

    #[test]
    fn test_normalize_space_separated_strong_runs() {
        let out = SeamNormalizer::PLAIN.normalize("<strong>a</strong> <strong>b</strong>");
        assert_eq!(out, "<strong>a b</strong>");
    }

    #[test]
    fn test_normalize_bold_italic_seam() {
        let out = SeamNormalizer::PLAIN
            .normalize("<em><strong>a</strong></em><em><strong>b</strong></em>");
        assert_eq!(out, "<em><strong>ab</strong></em>");
    }

    #[test]
    fn test_normalize_doubled_tags() {
        let out = SeamNormalizer::PLAIN.normalize("<em><em>x</em></em>");
        assert_eq!(out, "<em>x</em>");
    }

    #[test]
    fn test_normalize_encoded_vocabulary() {
        let input = format!("{STRONG_OPEN}a{STRONG_CLOSE}{STRONG_OPEN}b{STRONG_CLOSE}");
        let expected = format!("{STRONG_OPEN}ab{STRONG_CLOSE}");
        assert_eq!(SeamNormalizer::ENCODED.normalize(&input), expected);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            "<strong>a</strong><strong>b</strong>",
            "<em><strong>a</strong></em><em><strong>b</strong></em>",
            "<strong>a</strong> <strong>b</strong>",
            "plain text with <em>one</em> span",
            "<em>a</em> <em>b</em>",
        ];
        for input in inputs {
            let once = SeamNormalizer::PLAIN.normalize(input);
            let twice = SeamNormalizer::PLAIN.normalize(&once);
            assert_eq!(once, twice, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_normalize_leaves_unrelated_text_alone() {
        let input = "nothing to do here";
        assert_eq!(SeamNormalizer::PLAIN.normalize(input), input);
    }
}

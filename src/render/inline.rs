//! Inline run formatting.
//!
//! Three style tables share the run model. The block-level table produces
//! percent-encoded markup and threads the quote-parity counter across a
//! whole block; the styled table is its simpler percent-encoded variant
//! used by `useEstilo` blocks; the plain table emits bare HTML tags for
//! fallback paragraphs.

use crate::model::Run;
use crate::render::markup::{
    self, SeamNormalizer, EM_CLOSE, EM_OPEN, SPAN_UNDERLINE_CLOSE, SPAN_UNDERLINE_OPEN,
    STRONG_CLOSE, STRONG_OPEN,
};

/// Render a block member's runs into percent-encoded markup.
///
/// The quote-parity counter starts at zero here and is threaded across
/// every run of the paragraph; it never leaks into unrelated blocks.
pub fn format_block_runs(runs: &[Run]) -> String {
    let mut parity = 0i32;
    format_block_runs_with_parity(runs, &mut parity)
}

/// Like [`format_block_runs`], with the parity counter supplied by the
/// caller so list-style blocks can thread it across all members.
pub fn format_block_runs_with_parity(runs: &[Run], parity: &mut i32) -> String {
    let mut out = String::new();
    for run in runs {
        out.push_str(&format_block_run(run, parity));
    }
    markup::collapse_underline_seams(&out)
}

/// Style-priority table for one run. First matching row wins; rows whose
/// text is exactly one space never receive strong/em wrapping.
fn format_block_run(run: &Run, parity: &mut i32) -> String {
    let text = run.text.as_str();

    if run.bold && run.italic && run.underline {
        let t = markup::escape_percent(&markup::swap_quotes(text, parity));
        format!(
            "{SPAN_UNDERLINE_OPEN}{STRONG_OPEN}{EM_OPEN}{t}{EM_CLOSE}{STRONG_CLOSE}{SPAN_UNDERLINE_CLOSE}"
        )
    } else if run.bold && run.underline {
        let t = markup::escape_percent(&markup::swap_quotes(text, parity));
        format!("{SPAN_UNDERLINE_OPEN}{STRONG_OPEN}{t}{STRONG_CLOSE}{SPAN_UNDERLINE_CLOSE}")
    } else if run.bold && run.italic && text != " " {
        let t = markup::escape_percent(&markup::swap_quotes(text, parity));
        format!("{STRONG_OPEN}{EM_OPEN}{t}{EM_CLOSE}{STRONG_CLOSE}")
    } else if run.bold && text != " " {
        let t = markup::escape_percent(&markup::swap_quotes(text, parity));
        format!("{STRONG_OPEN}{t}{STRONG_CLOSE}")
    } else if run.italic && text != " " {
        let t = markup::escape_percent(&markup::swap_quotes(text, parity));
        format!("{EM_OPEN}{t}{EM_CLOSE}")
    } else if run.underline {
        let t = markup::escape_percent(&markup::swap_quotes(text, parity));
        format!("{SPAN_UNDERLINE_OPEN}{t}{SPAN_UNDERLINE_CLOSE}")
    } else if text.contains('"') || text.contains('%') {
        let t = markup::swap_quotes(text, parity);
        if t.contains('%') {
            markup::escape_percent(&t)
        } else {
            t
        }
    } else {
        text.to_string()
    }
}

/// Append one styled paragraph (the `useEstilo` table) to the accumulated
/// block content, then normalize strong/em seams over the whole
/// accumulation.
pub fn append_styled_paragraph(runs: &[Run], content: String) -> String {
    let mut body = String::new();
    for run in runs {
        let mut t = run.text.clone();
        if run.bold && t != " " {
            t = format!("{STRONG_OPEN}{t}{STRONG_CLOSE}");
        }
        if run.italic && t != " " {
            t = format!("{EM_OPEN}{t}{EM_CLOSE}");
        }
        body.push_str(&t);
    }
    let mut content = content;
    content.push_str(markup::P_OPEN);
    content.push_str(&body);
    content.push_str(markup::P_CLOSE);
    SeamNormalizer::ENCODED.normalize(&content)
}

/// Plain (non-encoded) style table for fallback paragraphs and title
/// wrapping. No quote balancing.
pub fn format_plain_runs(runs: &[Run]) -> String {
    let mut out = String::new();
    for run in runs {
        let mut t = run.text.clone();
        if run.bold && t != " " {
            t = format!("<strong>{t}</strong>");
        }
        if run.italic && t != " " {
            t = format!("<em>{t}</em>");
        }
        if run.underline {
            t = format!("<u>{t}</u>");
        }
        out.push_str(&t);
    }
    out
}

//! Tag matching and rendering.
//!
//! Rules are evaluated in configuration order against the trimmed
//! paragraph text; the first rule whose pattern matches wins and no later
//! rule is consulted. Each rule type renders through its own branch, and a
//! branch that does not apply returns `None` so the pipeline falls through
//! to plain-paragraph rendering.

use std::collections::VecDeque;

use log::debug;
use regex::Regex;

use crate::config::{
    BlockMode, BlockOptions, ImageOptions, SingleAction, TagMatcher, TitleStyle,
};
use crate::error::{Error, Result};
use crate::model::Document;
use crate::render::inline;
use crate::render::markup::{
    LI_CLOSE, LI_OPEN, OL_CLOSE, OL_OPEN, P_CLOSE, P_OPEN, STRONG_CLOSE, STRONG_OPEN, UL_CLOSE,
    UL_OPEN,
};

/// Placeholder image used when no extracted media asset remains.
pub const PLACEHOLDER_IMAGE: &str =
    "https://i.pinimg.com/736x/be/09/97/be0997e2d5732322bf552c6f2883c86e.jpg";

/// Match a candidate line against a rule pattern.
///
/// Returns the matched alternative (or the pattern itself) so single-type
/// extraction can strip it from the text.
pub fn match_pattern<'a>(matcher: &'a TagMatcher, candidate: &str) -> Option<&'a str> {
    let lower = candidate.to_lowercase();
    match matcher {
        TagMatcher::Alternatives(alternatives) => alternatives
            .iter()
            .find(|alt| lower.contains(&alt.to_lowercase()))
            .map(String::as_str),
        TagMatcher::Pattern { source, regex } => {
            regex.is_match(candidate).then_some(source.as_str())
        }
        TagMatcher::Substring(pattern) => lower
            .contains(&pattern.to_lowercase())
            .then_some(pattern.as_str()),
    }
}

/// Render a block-type rule from its member paragraphs.
pub fn render_block(
    options: &BlockOptions,
    template: &str,
    doc: &Document,
    members: &[usize],
    marker_lower: &str,
) -> String {
    let mut content = String::new();
    let mut link = String::new();

    match &options.mode {
        BlockMode::List => {
            let mut parity = 0i32;
            for (position, &index) in members.iter().enumerate() {
                let body =
                    inline::format_block_runs_with_parity(&doc.paragraphs[index].runs, &mut parity);
                if position == 0 {
                    content.push_str(P_OPEN);
                    content.push_str(&body);
                    content.push_str(P_CLOSE);
                    content.push_str(UL_OPEN);
                } else {
                    content.push_str(LI_OPEN);
                    content.push_str(&body);
                    content.push_str(LI_CLOSE);
                }
            }
            content.push_str(UL_CLOSE);
        }
        BlockMode::Glossary => {
            content.push_str(OL_OPEN);
            for &index in members {
                let body = inline::format_block_runs(&doc.paragraphs[index].runs)
                    .replacen(": ", &format!(": {STRONG_CLOSE}"), 1);
                content.push_str(LI_OPEN);
                content.push_str(STRONG_OPEN);
                content.push_str(&body);
                content.push_str(LI_CLOSE);
            }
            content.push_str(OL_CLOSE);
        }
        BlockMode::Styled => {
            for &index in members {
                let paragraph = &doc.paragraphs[index];
                content = inline::append_styled_paragraph(&paragraph.runs, content);
                if content.contains("<>")
                    && paragraph.text.contains('<')
                    && paragraph.text.contains('>')
                {
                    if let Some(url) = angle_delimited(&paragraph.text) {
                        let anchor = format!(
                            "%3Ca%20href='{url}'%20target='_blank'%20rel='noopener'%3E{url}%3C/a%3E"
                        );
                        content = content.replacen("<>", &anchor, 1);
                    }
                }
            }
        }
        BlockMode::SplitByColon { item_template } => {
            let mut items = String::new();
            for &index in members {
                let body = inline::format_block_runs(&doc.paragraphs[index].runs);
                let (title, rest) = match body.find(':') {
                    Some(at) => (&body[..at], &body[at + 1..]),
                    None => (body.as_str(), ""),
                };
                let item = item_template
                    .replace("{{titulo}}", title)
                    .replace("{{content}}", &format!("{P_OPEN}{rest}{P_CLOSE}"));
                items.push_str(&item);
                items.push('\n');
            }
            let items = items.strip_suffix('\n').unwrap_or(&items);
            // splitByColon substitutes only the items slot and returns.
            return template.replace("{{items}}", items);
        }
        BlockMode::LinkAside | BlockMode::VideoLink => {
            for &index in members {
                let paragraph = &doc.paragraphs[index];
                if paragraph.text.starts_with("http") {
                    link = paragraph.text.clone();
                } else {
                    content.push_str(P_OPEN);
                    content.push_str(&inline::format_block_runs(&paragraph.runs));
                    content.push_str(P_CLOSE);
                }
            }
        }
        BlockMode::Justified => {
            for &index in members {
                content.push_str(P_OPEN);
                content.push_str(&inline::format_block_runs(&doc.paragraphs[index].runs));
                content.push_str(P_CLOSE);
            }
        }
    }

    let mut output = template.to_string();
    if matches!(options.mode, BlockMode::LinkAside | BlockMode::VideoLink) {
        output = output.replace("{{link}}", &link);
    }
    // VideoLink substitutes the title unconditionally (empty when no
    // keyword matches); other modes only when a mapping is configured.
    if matches!(options.mode, BlockMode::VideoLink) || !options.dynamic_title.is_empty() {
        let title = dynamic_title(&options.dynamic_title, marker_lower);
        output = output.replace("{{titulo}}", title);
    }
    output.replace("{{content}}", &content)
}

/// Resolve `{{titulo}}` from dynamic-title pairs; the first keyword
/// contained in the lowercased marker text wins.
fn dynamic_title<'a>(pairs: &'a [(String, String)], marker_lower: &str) -> &'a str {
    pairs
        .iter()
        .find(|(keyword, _)| marker_lower.contains(keyword.as_str()))
        .map(|(_, title)| title.as_str())
        .unwrap_or("")
}

/// Extract the text between the first `<` and the following `>`.
fn angle_delimited(text: &str) -> Option<&str> {
    let after = &text[text.find('<')? + 1..];
    Some(&after[..after.find('>')?])
}

/// Render a single-type rule by stripping the matched pattern from the
/// paragraph and substituting the remainder.
pub fn render_single(
    action: Option<SingleAction>,
    template: &str,
    trimmed: &str,
    matched: &str,
) -> Result<Option<String>> {
    let Some(action) = action else {
        return Ok(None);
    };
    // The matched pattern is removed wherever it occurs, ignoring case.
    let stripper = Regex::new(&format!("(?i){matched}"))
        .map_err(|e| Error::Render(format!("pattern '{matched}' does not strip: {e}")))?;
    let value = stripper.replace_all(trimmed, "").trim().to_string();
    let slot = match action {
        SingleAction::ExtractLink => "{{link}}",
        SingleAction::ExtractWord => "{{palavra}}",
    };
    Ok(Some(template.replace(slot, &value)))
}

/// Render an image-type rule.
///
/// The current paragraph carries the title caption and the next one the
/// source caption (second `:`-separated segment each). The next media
/// asset is consumed FIFO when configured and available, otherwise the
/// fixed placeholder is used. Returns the rendered output plus the caption
/// paragraph's index for the consumed set; `None` when no paragraph
/// follows.
pub fn render_image(
    options: &ImageOptions,
    template: &str,
    doc: &Document,
    index: usize,
    media: &mut VecDeque<String>,
) -> Option<(String, usize)> {
    if index + 1 >= doc.paragraphs.len() {
        return None;
    }
    let title = caption_segment(&doc.paragraphs[index].text);
    let source = caption_segment(&doc.paragraphs[index + 1].text);
    let image = if options.extract_from_media {
        media.pop_front().unwrap_or_else(|| {
            debug!("media queue exhausted, using placeholder image");
            PLACEHOLDER_IMAGE.to_string()
        })
    } else {
        PLACEHOLDER_IMAGE.to_string()
    };

    let mut output = template
        .replace("{{titulo}}", title)
        .replace("{{fonte}}", source)
        .replace("{{imagem}}", &image);
    if let Some(table) = &options.default_table {
        output = output.replace("{{tabela}}", table);
    }
    Some((output, index + 1))
}

/// The caption text: second `:`-separated segment, trimmed.
fn caption_segment(text: &str) -> &str {
    text.split(':').nth(1).unwrap_or("").trim()
}

/// Render a title-type rule.
pub fn render_title(style: TitleStyle, template: &str, trimmed: &str) -> String {
    match style {
        TitleStyle::Uppercase => template.replace("{{text}}", &trimmed.to_uppercase()),
        TitleStyle::Numeric => match numeric_heading(trimmed) {
            Some(heading) => heading,
            None => template.replace("{{text}}", trimmed),
        },
        TitleStyle::Plain => template.replace("{{text}}", trimmed),
    }
}

/// Classify a numbered heading by its leading numbering token.
///
/// The token is the text up to the first whitespace; its digit count after
/// removing `.` separators selects the heading depth. Lines without a
/// whitespace-terminated token fall back to the plain substitution.
fn numeric_heading(trimmed: &str) -> Option<String> {
    let at = trimmed.find(char::is_whitespace)?;
    let token = &trimmed[..at];
    let rest = trimmed.replacen(&format!("{token} "), "", 1);
    let depth = token.replace('.', "").chars().count();
    Some(match depth {
        1 => format!("<h4 class=\"subtitlei-vg\">{rest}</h4>"),
        2 => format!("<p></p><h5 class=\"subtitleii-vg\">{rest}</h5>"),
        _ => format!("<p></p><h6 class=\"subtitleiii-vg\">{rest}</h6>"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{TagConfig, TagRule};
    use crate::model::{Paragraph, Run};

    fn rule(json: &str) -> TagRule {
        let config = TagConfig::from_json(&format!(r#"{{"tags":[{json}]}}"#)).unwrap();
        config.tags.into_iter().next().unwrap()
    }

    #[test]
    fn test_match_alternatives_first_wins() {
        let matcher = TagMatcher::Alternatives(vec!["#b#".to_string(), "#a#".to_string()]);
        // Both alternatives are contained; the earlier one wins.
        assert_eq!(match_pattern(&matcher, "x #a# y #b#"), Some("#b#"));
    }

    #[test]
    fn test_match_substring_case_insensitive() {
        let matcher = TagMatcher::Substring("#Dica#".to_string());
        assert_eq!(match_pattern(&matcher, "veja #DICA# aqui"), Some("#Dica#"));
        assert_eq!(match_pattern(&matcher, "nada"), None);
    }

    #[test]
    fn test_match_regex_case_sensitive() {
        let regex = Regex::new("^Figura").unwrap();
        let matcher = TagMatcher::Pattern {
            source: "^Figura".to_string(),
            regex,
        };
        assert_eq!(match_pattern(&matcher, "Figura 1: casa"), Some("^Figura"));
        assert_eq!(match_pattern(&matcher, "figura 1: casa"), None);
    }

    #[test]
    fn test_render_block_justified() {
        let doc = Document::from_paragraphs(vec![
            Paragraph::with_text("#Dica#"),
            Paragraph::with_text("corpo"),
        ]);
        let out = render_block(
            &BlockOptions {
                mode: BlockMode::Justified,
                dynamic_title: Vec::new(),
            },
            "[{{content}}]",
            &doc,
            &[1],
            "#dica#",
        );
        assert_eq!(out, format!("[{P_OPEN}corpo{P_CLOSE}]"));
    }

    #[test]
    fn test_render_block_list_lead_and_items() {
        let doc = Document::from_paragraphs(vec![
            Paragraph::with_text("#Caixa#"),
            Paragraph::with_text("lead"),
            Paragraph::with_text("item um"),
        ]);
        let out = render_block(
            &BlockOptions {
                mode: BlockMode::List,
                dynamic_title: Vec::new(),
            },
            "{{content}}",
            &doc,
            &[1, 2],
            "#caixa#",
        );
        assert!(out.starts_with(P_OPEN));
        assert!(out.contains(UL_OPEN));
        assert!(out.contains(&format!("{LI_OPEN}item um{LI_CLOSE}")));
        assert!(out.ends_with(UL_CLOSE));
    }

    #[test]
    fn test_render_block_glossary_bolds_term() {
        let doc = Document::from_paragraphs(vec![
            Paragraph::with_text("#Glossário#"),
            Paragraph::with_text("Termo: significado"),
        ]);
        let out = render_block(
            &BlockOptions {
                mode: BlockMode::Glossary,
                dynamic_title: Vec::new(),
            },
            "{{content}}",
            &doc,
            &[1],
            "#glossário#",
        );
        assert!(out.contains(&format!("%3Cstrong%3ETermo: {STRONG_CLOSE}significado")));
        assert!(out.starts_with(OL_OPEN));
        assert!(out.ends_with(OL_CLOSE));
    }

    #[test]
    fn test_render_block_split_by_colon() {
        let doc = Document::from_paragraphs(vec![
            Paragraph::with_text("#Infográfico#"),
            Paragraph::with_text("Um: primeiro"),
            Paragraph::with_text("Dois: segundo"),
        ]);
        let out = render_block(
            &BlockOptions {
                mode: BlockMode::SplitByColon {
                    item_template: "<{{titulo}}|{{content}}>".to_string(),
                },
                dynamic_title: Vec::new(),
            },
            "{{items}}",
            &doc,
            &[1, 2],
            "#infográfico#",
        );
        assert_eq!(
            out,
            format!("<Um|{P_OPEN} primeiro{P_CLOSE}>\n<Dois|{P_OPEN} segundo{P_CLOSE}>")
        );
    }

    #[test]
    fn test_render_block_link_aside() {
        let doc = Document::from_paragraphs(vec![
            Paragraph::with_text("#Saiba Mais#"),
            Paragraph::with_text("texto"),
            Paragraph::with_text("https://example.com/artigo"),
        ]);
        let out = render_block(
            &BlockOptions {
                mode: BlockMode::LinkAside,
                dynamic_title: Vec::new(),
            },
            "{{content}}|{{link}}",
            &doc,
            &[1, 2],
            "#saiba mais#",
        );
        assert_eq!(
            out,
            format!("{P_OPEN}texto{P_CLOSE}|https://example.com/artigo")
        );
    }

    #[test]
    fn test_render_block_video_link_dynamic_title() {
        let doc = Document::from_paragraphs(vec![
            Paragraph::with_text("#Na Web#"),
            Paragraph::with_text("https://example.com/video"),
        ]);
        let out = render_block(
            &BlockOptions {
                mode: BlockMode::VideoLink,
                dynamic_title: vec![
                    ("indicação de filme".to_string(), "Indicação de Filme".to_string()),
                    ("na web".to_string(), "Na Web".to_string()),
                ],
            },
            "{{titulo}}|{{link}}|{{content}}",
            &doc,
            &[1],
            "#na web#",
        );
        assert_eq!(out, "Na Web|https://example.com/video|");
    }

    #[test]
    fn test_render_block_styled_splices_link() {
        // Hyperlink content appears in the paragraph text but not in its
        // formatting runs, leaving a literal `<>` in the styled body.
        let member = Paragraph {
            text: "Disponível em: <https://example.com>".to_string(),
            runs: vec![Run::new("Disponível em: <"), Run::new(">")],
            style_name: String::new(),
        };
        let doc = Document::from_paragraphs(vec![Paragraph::with_text("#Referências#"), member]);

        let out = render_block(
            &BlockOptions {
                mode: BlockMode::Styled,
                dynamic_title: Vec::new(),
            },
            "{{content}}",
            &doc,
            &[1],
            "#referências#",
        );
        assert!(out.contains("%3Ca%20href='https://example.com'"));
        assert!(!out.contains("<>"));
    }

    #[test]
    fn test_render_single_extract_link() {
        let out = render_single(
            Some(SingleAction::ExtractLink),
            "[{{link}}]",
            "#Video# https://example.com/v",
            "#video#",
        )
        .unwrap()
        .unwrap();
        assert_eq!(out, "[https://example.com/v]");
    }

    #[test]
    fn test_render_single_extract_word() {
        let out = render_single(
            Some(SingleAction::ExtractWord),
            "[{{palavra}}]",
            "#Forca Paralelepípedo",
            "#forca",
        )
        .unwrap()
        .unwrap();
        assert_eq!(out, "[Paralelepípedo]");
    }

    #[test]
    fn test_render_single_without_action_falls_through() {
        let out = render_single(None, "x", "y", "z").unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn test_render_image_consumes_media_fifo() {
        let doc = Document::from_paragraphs(vec![
            Paragraph::with_text("Figura 1: uma casa"),
            Paragraph::with_text("Fonte: o autor"),
        ]);
        let mut media: VecDeque<String> =
            vec!["data:image/png;base64,AAA".to_string()].into();
        let options = ImageOptions {
            extract_from_media: true,
            default_table: None,
        };
        let (out, caption) = render_image(
            &options,
            "{{titulo}}|{{fonte}}|{{imagem}}",
            &doc,
            0,
            &mut media,
        )
        .unwrap();
        assert_eq!(out, "uma casa|o autor|data:image/png;base64,AAA");
        assert_eq!(caption, 1);
        assert!(media.is_empty());
    }

    #[test]
    fn test_render_image_placeholder_when_exhausted() {
        let doc = Document::from_paragraphs(vec![
            Paragraph::with_text("Figura 2: outra"),
            Paragraph::with_text("Fonte: idem"),
        ]);
        let mut media = VecDeque::new();
        let options = ImageOptions {
            extract_from_media: true,
            default_table: None,
        };
        let (out, _) =
            render_image(&options, "{{imagem}}", &doc, 0, &mut media).unwrap();
        assert_eq!(out, PLACEHOLDER_IMAGE);
    }

    #[test]
    fn test_render_image_requires_following_paragraph() {
        let doc = Document::from_paragraphs(vec![Paragraph::with_text("Figura 3: só")]);
        let mut media = VecDeque::new();
        let options = ImageOptions::default();
        assert!(render_image(&options, "{{imagem}}", &doc, 0, &mut media).is_none());
    }

    #[test]
    fn test_render_image_default_table() {
        let doc = Document::from_paragraphs(vec![
            Paragraph::with_text("Quadro 1: resumo"),
            Paragraph::with_text("Fonte: o autor"),
        ]);
        let mut media = VecDeque::new();
        let options = ImageOptions {
            extract_from_media: false,
            default_table: Some("TABELA".to_string()),
        };
        let (out, _) =
            render_image(&options, "{{tabela}}", &doc, 0, &mut media).unwrap();
        assert_eq!(out, "TABELA");
    }

    #[test]
    fn test_render_title_uppercase() {
        let out = render_title(TitleStyle::Uppercase, "<h2>{{text}}</h2>", "unidade 1");
        assert_eq!(out, "<h2>UNIDADE 1</h2>");
    }

    #[test]
    fn test_render_title_numeric_depths() {
        let h4 = render_title(TitleStyle::Numeric, "{{text}}", "1 Título");
        assert_eq!(h4, "<h4 class=\"subtitlei-vg\">Título</h4>");

        let h5 = render_title(TitleStyle::Numeric, "{{text}}", "1.2 Subtítulo");
        assert_eq!(h5, "<p></p><h5 class=\"subtitleii-vg\">Subtítulo</h5>");

        let h6 = render_title(TitleStyle::Numeric, "{{text}}", "1.2.3 X");
        assert_eq!(h6, "<p></p><h6 class=\"subtitleiii-vg\">X</h6>");
    }

    #[test]
    fn test_render_title_numeric_without_space_falls_back() {
        let out = render_title(TitleStyle::Numeric, "[{{text}}]", "123");
        assert_eq!(out, "[123]");
    }

    #[test]
    fn test_builtin_rule_parsing_smoke() {
        // The glossary rule from the builtin vocabulary lowers to Glossary.
        let r = rule(
            r##"{"id":"g","name":"g","pattern":"#glossário#","type":"block",
               "outputTemplate":"{{content}}","options":{"formatAsGlossary":true}}"##,
        );
        match &r.behavior {
            crate::config::TagBehavior::Block(opts) => {
                assert_eq!(opts.mode, BlockMode::Glossary);
            }
            other => panic!("unexpected behavior: {other:?}"),
        }
    }
}

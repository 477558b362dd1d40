//! Tag configuration: wire schema, validation, and lowering.
//!
//! Configuration arrives as a JSON document (`maxFileSizeMB` plus an ordered
//! `tags` list). Rules are validated and lowered at load time into typed
//! behavior variants so the rendering engine never sees a free-form option
//! map. Rule evaluation order equals configuration order; that ordering is
//! part of the external contract, not an artifact.

use regex::Regex;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::error::{Error, Result};

/// Default per-item template for `splitByColon` blocks.
const DEFAULT_ITEM_TEMPLATE: &str = "{{titulo}}: {{content}}";

/// Built-in tag vocabulary covering the platform's stock section types.
const BUILTIN_TAGS: &str = include_str!("builtin_tags.json");

/// Loaded conversion configuration.
#[derive(Debug, Clone)]
pub struct TagConfig {
    /// Upload size ceiling in megabytes. Informational to the engine;
    /// enforced at the caller boundary.
    pub max_file_size_mb: u32,

    /// Tag rules in evaluation order.
    pub tags: Vec<TagRule>,
}

impl TagConfig {
    /// Parse and validate a configuration document.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawConfig =
            serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        let mut tags = Vec::with_capacity(raw.tags.len());
        for tag in raw.tags {
            tags.push(TagRule::from_raw(tag)?);
        }
        Ok(Self {
            max_file_size_mb: raw.max_file_size_mb,
            tags,
        })
    }

    /// Configuration with no tag rules; every paragraph renders as plain
    /// content.
    pub fn empty() -> Self {
        Self {
            max_file_size_mb: default_max_file_size(),
            tags: Vec::new(),
        }
    }

    /// The built-in tag vocabulary.
    pub fn builtin() -> Self {
        Self::from_json(BUILTIN_TAGS).expect("builtin tag configuration is valid")
    }
}

impl Default for TagConfig {
    fn default() -> Self {
        Self::builtin()
    }
}

/// One validated pattern → output-template rule.
#[derive(Debug, Clone)]
pub struct TagRule {
    /// Stable identifier from the configuration document.
    pub id: String,

    /// Human-readable name, used in diagnostics.
    pub name: String,

    /// How candidate lines are matched.
    pub matcher: TagMatcher,

    /// Output template with `{{placeholder}}` slots.
    pub output_template: String,

    /// Rendering behavior, lowered from `type` + `options`.
    pub behavior: TagBehavior,
}

/// Matching strategy for a rule's pattern.
#[derive(Debug, Clone)]
pub enum TagMatcher {
    /// Ordered alternatives, matched case-insensitively by containment;
    /// the first contained alternative wins.
    Alternatives(Vec<String>),

    /// A `^`-prefixed pattern, compiled as a regular expression and
    /// tested as-is.
    Pattern {
        /// Pattern text as written in the configuration.
        source: String,
        /// Compiled form.
        regex: Regex,
    },

    /// Case-insensitive substring containment.
    Substring(String),
}

/// Rendering behavior by rule type.
#[derive(Debug, Clone)]
pub enum TagBehavior {
    /// Renders the member paragraphs of the block opened by a marker line.
    Block(BlockOptions),

    /// Extracts a value from the matched paragraph itself.
    Single(Option<SingleAction>),

    /// Renders an image figure; the following paragraph is its source
    /// caption.
    Image(ImageOptions),

    /// Renders the matched line as a heading.
    Title(TitleStyle),
}

/// Options for block-type rules.
#[derive(Debug, Clone)]
pub struct BlockOptions {
    /// Content-building mode for member paragraphs.
    pub mode: BlockMode,

    /// Keyword → title pairs scanned against the lowercased marker text;
    /// first contained keyword wins. Preserves configuration order.
    pub dynamic_title: Vec<(String, String)>,
}

/// Mutually exclusive content-building modes for block rules.
///
/// Lowered from the raw option flags in a fixed priority order; when a
/// configuration sets several flags, the earlier mode silently shadows the
/// later ones. That shadowing order is part of the contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockMode {
    /// Each member becomes a justified paragraph fragment (default).
    Justified,

    /// First member is a lead paragraph, the rest become list items
    /// (`formatAsList`).
    List,

    /// Ordered list; the text before the first `": "` is bolded as a term
    /// (`formatAsGlossary`).
    Glossary,

    /// Styled paragraphs with hyperlink splicing (`useEstilo`).
    Styled,

    /// Each member splits at its first colon into a per-item template
    /// (`splitByColon`).
    SplitByColon {
        /// Template applied to each title/content pair.
        item_template: String,
    },

    /// Members starting with `http` are extracted as `{{link}}`
    /// (`checkForLink`).
    LinkAside,

    /// Like `LinkAside`, with `{{titulo}}` resolved from the dynamic-title
    /// pairs (`extractVideoLink`).
    VideoLink,
}

/// Extraction action for single-type rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SingleAction {
    /// Strip the matched pattern, substitute the rest into `{{link}}`.
    ExtractLink,
    /// Strip the matched pattern, substitute the rest into `{{palavra}}`.
    ExtractWord,
}

/// Options for image-type rules.
#[derive(Debug, Clone, Default)]
pub struct ImageOptions {
    /// Consume the next extracted media asset instead of the placeholder
    /// image.
    pub extract_from_media: bool,

    /// Markup substituted into `{{tabela}}` when present.
    pub default_table: Option<String>,
}

/// Heading style for title-type rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TitleStyle {
    /// Uppercase the whole line into `{{text}}`.
    Uppercase,

    /// Classify by the leading numbering token (`1` → h4, `1.2` → h5,
    /// deeper → h6).
    Numeric,

    /// Substitute the raw line into `{{text}}`.
    #[default]
    Plain,
}

impl TagRule {
    fn from_raw(raw: RawTag) -> Result<Self> {
        let matcher = match raw.pattern {
            RawPattern::Many(alternatives) => {
                if alternatives.is_empty() || alternatives.iter().any(String::is_empty) {
                    return Err(Error::Config(format!(
                        "tag '{}' has an empty pattern alternative",
                        raw.name
                    )));
                }
                TagMatcher::Alternatives(alternatives)
            }
            RawPattern::One(pattern) if pattern.starts_with('^') => {
                let regex = Regex::new(&pattern).map_err(|e| {
                    Error::Config(format!("tag '{}' pattern does not compile: {}", raw.name, e))
                })?;
                TagMatcher::Pattern {
                    source: pattern,
                    regex,
                }
            }
            RawPattern::One(pattern) => {
                if pattern.is_empty() {
                    return Err(Error::Config(format!(
                        "tag '{}' has an empty pattern",
                        raw.name
                    )));
                }
                TagMatcher::Substring(pattern)
            }
        };

        let behavior = match raw.kind {
            RawKind::Block => TagBehavior::Block(BlockOptions::from_raw(&raw.options)),
            RawKind::Single => TagBehavior::Single(if raw.options.extract_link {
                Some(SingleAction::ExtractLink)
            } else if raw.options.extract_word {
                Some(SingleAction::ExtractWord)
            } else {
                None
            }),
            RawKind::Image => TagBehavior::Image(ImageOptions {
                extract_from_media: raw.options.extract_from_media,
                default_table: raw.options.default_table.clone(),
            }),
            RawKind::Title => TagBehavior::Title(if raw.options.uppercase {
                TitleStyle::Uppercase
            } else if raw.options.is_numeric {
                TitleStyle::Numeric
            } else {
                TitleStyle::Plain
            }),
        };

        Ok(Self {
            id: raw.id,
            name: raw.name,
            matcher,
            output_template: raw.output_template,
            behavior,
        })
    }
}

impl BlockOptions {
    fn from_raw(raw: &RawOptions) -> Self {
        let mode = if raw.format_as_list {
            BlockMode::List
        } else if raw.format_as_glossary {
            BlockMode::Glossary
        } else if raw.use_estilo {
            BlockMode::Styled
        } else if raw.split_by_colon {
            BlockMode::SplitByColon {
                item_template: raw
                    .item_template
                    .clone()
                    .unwrap_or_else(|| DEFAULT_ITEM_TEMPLATE.to_string()),
            }
        } else if raw.check_for_link {
            BlockMode::LinkAside
        } else if raw.extract_video_link {
            BlockMode::VideoLink
        } else {
            BlockMode::Justified
        };
        Self {
            mode,
            dynamic_title: raw.dynamic_title.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Wire schema
// ---------------------------------------------------------------------------

fn default_max_file_size() -> u32 {
    100
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    #[serde(default = "default_max_file_size")]
    max_file_size_mb: u32,

    #[serde(default)]
    tags: Vec<RawTag>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTag {
    #[serde(default)]
    id: String,

    #[serde(default)]
    name: String,

    pattern: RawPattern,

    #[serde(rename = "type")]
    kind: RawKind,

    #[serde(default)]
    output_template: String,

    #[serde(default)]
    options: RawOptions,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPattern {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum RawKind {
    Block,
    Single,
    Image,
    Title,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawOptions {
    format_as_list: bool,
    format_as_glossary: bool,
    use_estilo: bool,
    split_by_colon: bool,
    item_template: Option<String>,
    check_for_link: bool,
    extract_video_link: bool,
    #[serde(deserialize_with = "ordered_pairs")]
    dynamic_title: Vec<(String, String)>,
    extract_link: bool,
    extract_word: bool,
    extract_from_media: bool,
    default_table: Option<String>,
    uppercase: bool,
    is_numeric: bool,
}

/// Deserialize a JSON object into key/value pairs preserving document order.
fn ordered_pairs<'de, D>(deserializer: D) -> std::result::Result<Vec<(String, String)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct PairsVisitor;

    impl<'de> Visitor<'de> for PairsVisitor {
        type Value = Vec<(String, String)>;

        fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("a map of keyword to title")
        }

        fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut pairs = Vec::new();
            while let Some(entry) = map.next_entry::<String, String>()? {
                pairs.push(entry);
            }
            Ok(pairs)
        }
    }

    deserializer.deserialize_map(PairsVisitor)
}

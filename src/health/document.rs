//! Parsed HTML page for the SEO, accessibility and analytics probes.
//!
//! The page is scanned once with `tl`; only the facts the probes need are
//! kept, so the document owns no borrowed markup.

use std::collections::HashMap;

use super::platform::{PageDocument, ScriptGlobals};
use crate::error::{Result, SpyltError};

const FOCUSABLE_TAGS: &[&str] = &["button", "a", "input", "select", "textarea"];
const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// Summary of one rendered page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HtmlDocument {
    /// `name` / `property` → `content`; first occurrence wins
    meta: HashMap<String, Option<String>>,
    image_alts: Vec<Option<String>>,
    heading_count: usize,
    focusable_count: usize,
    inline_scripts: Vec<String>,
}

impl HtmlDocument {
    pub fn parse(html: &str) -> Result<Self> {
        let dom = tl::parse(html, tl::ParserOptions::default())
            .map_err(|e| SpyltError::HealthError(format!("Failed to parse HTML document: {e:?}")))?;
        let parser = dom.parser();

        let mut document = Self::default();
        for node in dom.nodes() {
            let tl::Node::Tag(tag) = node else {
                continue;
            };
            let name = tag.name().as_utf8_str().to_lowercase();
            let attributes: HashMap<String, Option<String>> = tag
                .attributes()
                .iter()
                .map(|(key, value)| (key.to_lowercase(), value.map(|v| v.to_string())))
                .collect();

            match name.as_str() {
                "meta" => {
                    let content = attributes.get("content").cloned().flatten();
                    for key in ["name", "property"] {
                        if let Some(Some(label)) = attributes.get(key) {
                            document
                                .meta
                                .entry(label.clone())
                                .or_insert_with(|| content.clone());
                        }
                    }
                }
                "img" => document
                    .image_alts
                    .push(attributes.get("alt").cloned().flatten()),
                "script" if !attributes.contains_key("src") => {
                    let text = tag.inner_text(parser);
                    if !text.trim().is_empty() {
                        document.inline_scripts.push(text.into_owned());
                    }
                }
                tag_name if HEADING_TAGS.contains(&tag_name) => document.heading_count += 1,
                tag_name if FOCUSABLE_TAGS.contains(&tag_name) => document.focusable_count += 1,
                _ => {}
            }
        }

        Ok(document)
    }

    pub fn image_count(&self) -> usize {
        self.image_alts.len()
    }
}

impl PageDocument for HtmlDocument {
    fn meta_content(&self, name: &str) -> Option<String> {
        self.meta.get(name).cloned().flatten()
    }

    fn image_alts(&self) -> Vec<Option<String>> {
        self.image_alts.clone()
    }

    fn heading_count(&self) -> usize {
        self.heading_count
    }

    fn focusable_count(&self) -> usize {
        self.focusable_count
    }
}

/// A global counts as defined when an inline script references it as a
/// standalone identifier.
impl ScriptGlobals for HtmlDocument {
    fn is_defined(&self, name: &str) -> bool {
        self.inline_scripts
            .iter()
            .any(|script| mentions_identifier(script, name))
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn mentions_identifier(source: &str, name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    source.match_indices(name).any(|(start, _)| {
        let before = source[..start].chars().next_back();
        let after = source[start + name.len()..].chars().next();
        !before.is_some_and(is_identifier_char) && !after.is_some_and(is_identifier_char)
    })
}

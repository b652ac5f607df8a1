// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Extraction of the dense classification array from `ucd.nounihan.grouped.xml`.

use std::ops::RangeInclusive;

use anyhow::{Context, bail};

use crate::props::{CharacterWidth, ClusterBreak, TrieType};

const UCD_NS: &str = "http://www.unicode.org/ns/2003/ucd/1.0";

/// Which join-rule flavor the tables are built for.
///
/// The two flavors also differ in a couple of literal range overrides,
/// which is why extraction needs to know about them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinModel {
    /// A single table. Regional Indicator pairs join unconditionally,
    /// InCB=Consonant is not tracked as its own category.
    Stateless,
    /// Two tables: "default" and "just matched a Regional Indicator pair".
    Stateful,
}

#[derive(Clone, Copy)]
pub struct ExtractOptions {
    pub model: JoinModel,
    /// Treat all ambiguous-width characters as narrow.
    pub no_ambiguous: bool,
}

#[derive(Debug)]
pub struct Ucd {
    pub description: String,
    pub values: Vec<TrieType>,
}

/// Turns the parsed UCD document into one classification value
/// per codepoint, 1114112 in total.
///
/// Any unrecognized property value aborts the run: a table that
/// silently mislabels codepoints is worse than no table.
pub fn extract(doc: &roxmltree::Document, opts: ExtractOptions) -> anyhow::Result<Ucd> {
    let ambiguous_value =
        if opts.no_ambiguous { CharacterWidth::Narrow } else { CharacterWidth::Ambiguous };

    let mut values = vec![TrieType::new(ClusterBreak::Other, CharacterWidth::Narrow); 1114112];

    let root = doc.root_element();
    let description = root
        .children()
        .find(|n| n.has_tag_name((UCD_NS, "description")))
        .context("missing ucd description")?
        .text()
        .unwrap_or_default()
        .to_string();
    let repertoire = root
        .children()
        .find(|n| n.has_tag_name((UCD_NS, "repertoire")))
        .context("missing ucd repertoire")?;

    for group in repertoire.children().filter(|n| n.is_element()) {
        const DEFAULT_ATTRIBUTES: UcdAttributes = UcdAttributes {
            general_category: "",
            grapheme_cluster_break: "",
            indic_conjunct_break: "",
            extended_pictographic: "",
            east_asian: "",
        };
        let group_attributes = extract_attributes(&group, &DEFAULT_ATTRIBUTES);

        // This covers the <char>, <reserved>, <surrogate> and
        // <noncharacter> tags, all of which carry the same attributes.
        for char in group.children().filter(|n| n.is_element()) {
            let attributes = extract_attributes(&char, &group_attributes);
            let range = extract_range(&char)?;

            let mut cb = match attributes.grapheme_cluster_break {
                "XX" => ClusterBreak::Other, // Anything else
                // We ignore GB3 which demands that CR × LF do not break apart, because
                // * these control characters won't normally reach our text storage
                // * otherwise we're in a raw write mode and store them in separate cells anyway
                "CR" | "LF" | "CN" => ClusterBreak::Control, // Carriage Return, Line Feed, Control
                "EX" | "SM" => ClusterBreak::Extend,         // Extend, SpacingMark
                "PP" => ClusterBreak::Prepend,               // Prepend
                "ZWJ" => ClusterBreak::ZWJ,                  // Zero Width Joiner
                "RI" => ClusterBreak::RI,                    // Regional Indicator
                "L" => ClusterBreak::HangulL,                // Hangul Syllable Type L
                "V" => ClusterBreak::HangulV,                // Hangul Syllable Type V
                "T" => ClusterBreak::HangulT,                // Hangul Syllable Type T
                "LV" => ClusterBreak::HangulLV,              // Hangul Syllable Type LV
                "LVT" => ClusterBreak::HangulLVT,            // Hangul Syllable Type LVT
                _ => bail!(
                    "Unrecognized GCB {:?} for U+{:04X} to U+{:04X}",
                    attributes.grapheme_cluster_break,
                    range.start(),
                    range.end()
                ),
            };

            if attributes.extended_pictographic == "Y" {
                // Currently every single Extended_Pictographic codepoint happens to be GCB=XX.
                // This is fantastic for us because it means we can stuff it into the ClusterBreak enum
                // and treat it as an alias of EXTEND, but with the special GB11 properties.
                if cb != ClusterBreak::Other {
                    bail!(
                        "Unexpected GCB {:?} with ExtPict=Y for U+{:04X} to U+{:04X}",
                        attributes.grapheme_cluster_break,
                        range.start(),
                        range.end()
                    );
                }
                cb = ClusterBreak::ExtPic;
            }

            cb = match attributes.indic_conjunct_break {
                "None" | "Extend" => cb,
                "Linker" => {
                    // Similar to ExtPict, an alias of EXTEND, but with the GB9c properties.
                    if cb != ClusterBreak::Extend {
                        bail!(
                            "Unexpected GCB {:?} with InCB=Linker for U+{:04X} to U+{:04X}",
                            attributes.grapheme_cluster_break,
                            range.start(),
                            range.end()
                        );
                    }
                    ClusterBreak::InCBLinker
                }
                "Consonant" if opts.model == JoinModel::Stateful => {
                    // ...and an alias of OTHER, but with the GB9c properties.
                    if cb != ClusterBreak::Other {
                        bail!(
                            "Unexpected GCB {:?} with InCB=Consonant for U+{:04X} to U+{:04X}",
                            attributes.grapheme_cluster_break,
                            range.start(),
                            range.end()
                        );
                    }
                    ClusterBreak::InCBConsonant
                }
                // The stateless tables only special-case the linker itself.
                "Consonant" => cb,
                _ => bail!(
                    "Unrecognized InCB {:?} for U+{:04X} to U+{:04X}",
                    attributes.indic_conjunct_break,
                    range.start(),
                    range.end()
                ),
            };

            let mut cw = match attributes.east_asian {
                "N" | "Na" | "H" => CharacterWidth::Narrow, // Neutral, Narrow, Half-width
                "F" | "W" => CharacterWidth::Wide,          // Full-width, Wide
                "A" => ambiguous_value,                     // Ambiguous
                _ => bail!(
                    "Unrecognized ea {:?} for U+{:04X} to U+{:04X}",
                    attributes.east_asian,
                    range.start(),
                    range.end()
                ),
            };

            // There's no "ea" attribute for "zero width" so we need to do that ourselves. This matches:
            //   Mc: Mark, spacing combining
            //   Me: Mark, enclosing
            //   Mn: Mark, non-spacing
            //   Cf: Control, format
            if attributes.general_category.starts_with('M') || attributes.general_category == "Cf" {
                cw = CharacterWidth::ZeroWidth;
            }

            values[range].fill(TrieType::new(cb, cw));
        }
    }

    // U+2500 to U+257F: Box Drawing block
    // U+2580 to U+259F: Block Elements block
    // Both are ambiguous according to their EastAsian attribute,
    // but by convention terminals always consider them to be narrow.
    values[0x2500..=0x259F].fill(TrieType::new(ClusterBreak::Other, CharacterWidth::Narrow));

    match opts.model {
        JoinModel::Stateless => {
            // U+4DC0 to U+4DFF: Yijing Hexagram Symbols, historically narrow.
            values[0x4DC0..=0x4DFF]
                .fill(TrieType::new(ClusterBreak::Other, CharacterWidth::Narrow));
            // U+FE20 to U+FE2F: Combining Half Marks. Narrow halves that
            // occupy 2 columns as a pair.
            values[0xFE20..=0xFE2F]
                .fill(TrieType::new(ClusterBreak::Other, CharacterWidth::Narrow));
        }
        JoinModel::Stateful => {
            // U+FE0F Variation Selector-16 is used to turn unqualified Emojis into
            // qualified ones. By convention, this also turns them from being
            // narrow by default into wide ones.
            values[0xFE0F] = TrieType::new(ClusterBreak::Extend, CharacterWidth::Wide);
        }
    }

    Ok(Ucd { description, values })
}

struct UcdAttributes<'a> {
    general_category: &'a str,
    grapheme_cluster_break: &'a str,
    indic_conjunct_break: &'a str,
    extended_pictographic: &'a str,
    east_asian: &'a str,
}

fn extract_attributes<'a>(
    node: &'a roxmltree::Node,
    default: &'a UcdAttributes,
) -> UcdAttributes<'a> {
    UcdAttributes {
        general_category: node.attribute("gc").unwrap_or(default.general_category),
        grapheme_cluster_break: node.attribute("GCB").unwrap_or(default.grapheme_cluster_break),
        indic_conjunct_break: node.attribute("InCB").unwrap_or(default.indic_conjunct_break),
        extended_pictographic: node.attribute("ExtPict").unwrap_or(default.extended_pictographic),
        east_asian: node.attribute("ea").unwrap_or(default.east_asian),
    }
}

fn extract_range(node: &roxmltree::Node) -> anyhow::Result<RangeInclusive<usize>> {
    let parse_cp = |attr: &'static str| -> anyhow::Result<usize> {
        let val = node.attribute(attr).unwrap_or("0");
        match usize::from_str_radix(val, 16) {
            Ok(cp) => Ok(cp),
            Err(_) => bail!("invalid {} attribute {:?}", attr, val),
        }
    };
    let (first, last) = match node.attribute("cp") {
        Some(_) => {
            let cp = parse_cp("cp")?;
            (cp, cp)
        }
        None => (parse_cp("first-cp")?, parse_cp("last-cp")?),
    };
    Ok(first..=last)
}

// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! End-to-end tests over a synthetic UCD document: extraction, trie
//! compression and cluster segmentation working together.

use std::sync::LazyLock;

use pretty_assertions::assert_eq;

use grapheme_tables::props::{CharacterWidth, ClusterBreak};
use grapheme_tables::segment::ClusterTables;
use grapheme_tables::trie::{Dedup, build_trie};
use grapheme_tables::ucd::{ExtractOptions, JoinModel, Ucd, extract};

/// A small stand-in for ucd.nounihan.grouped.xml. It only assigns the
/// codepoint ranges the tests below touch, everything else stays at the
/// {Other, Narrow} default, same as real extraction.
const FIXTURE: &str = r#"<ucd xmlns="http://www.unicode.org/ns/2003/ucd/1.0">
  <description>Synthetic UCD for testing</description>
  <repertoire>
    <group gc="Cc" GCB="CN" InCB="None" ExtPict="N" ea="N">
      <char first-cp="0000" last-cp="001F"/>
      <char first-cp="007F" last-cp="009F"/>
    </group>
    <group gc="Po" GCB="XX" InCB="None" ExtPict="N" ea="Na">
      <char first-cp="0020" last-cp="007E"/>
      <char cp="00A1" ea="A"/>
    </group>
    <group gc="Mn" GCB="EX" InCB="Extend" ExtPict="N" ea="N">
      <char first-cp="0300" last-cp="036F"/>
      <char cp="094D" InCB="Linker"/>
      <char cp="0ABC" ea="W"/>
      <char cp="FE0F" ea="A"/>
      <char first-cp="FE20" last-cp="FE2F"/>
    </group>
    <group gc="Lo" GCB="XX" InCB="Consonant" ExtPict="N" ea="N">
      <char cp="0915"/>
      <char cp="0924"/>
    </group>
    <group gc="Lo" GCB="XX" InCB="None" ExtPict="N" ea="W">
      <char first-cp="1100" last-cp="115F" GCB="L"/>
      <char first-cp="1160" last-cp="11A7" GCB="V" ea="N"/>
      <char first-cp="11A8" last-cp="11FF" GCB="T" ea="N"/>
      <char cp="AC00" GCB="LV"/>
      <char first-cp="AC01" last-cp="AC1B" GCB="LVT"/>
      <char first-cp="4E00" last-cp="9FFF"/>
    </group>
    <group gc="Cf" GCB="ZWJ" InCB="Extend" ExtPict="N" ea="N">
      <char cp="200D"/>
    </group>
    <group gc="So" GCB="XX" InCB="None" ExtPict="N" ea="A">
      <char first-cp="2500" last-cp="259F"/>
      <char first-cp="4DC0" last-cp="4DFF"/>
    </group>
    <group gc="So" GCB="RI" InCB="None" ExtPict="N" ea="N">
      <char first-cp="1F1E6" last-cp="1F1FF"/>
    </group>
    <group gc="So" GCB="XX" InCB="None" ExtPict="Y" ea="W">
      <char first-cp="1F300" last-cp="1F64F"/>
    </group>
  </repertoire>
</ucd>"#;

fn extract_fixture(model: JoinModel) -> Ucd {
    let doc = roxmltree::Document::parse(FIXTURE).unwrap();
    extract(&doc, ExtractOptions { model, no_ambiguous: false }).unwrap()
}

static UCD: LazyLock<Ucd> = LazyLock::new(|| extract_fixture(JoinModel::Stateful));
static TABLES: LazyLock<ClusterTables> = LazyLock::new(|| ClusterTables::from_ucd(&UCD));

fn cluster_lens(text: &str) -> Vec<usize> {
    TABLES.clusters(text).map(|c| c.range.len()).collect()
}

fn cluster_widths(text: &str) -> Vec<usize> {
    TABLES.clusters(text).map(|c| c.width).collect()
}

#[test]
fn trie_roundtrips_every_codepoint() {
    let trie = build_trie(UCD.values.clone(), &[4, 4, 4], Dedup::Overlapping);
    for (cp, expected) in UCD.values.iter().enumerate() {
        assert_eq!(trie.lookup(cp), expected.value(), "mismatch for U+{cp:04X}");
    }
}

#[test]
fn ascii_is_one_narrow_cluster_per_char() {
    assert_eq!(cluster_lens("abc"), [1, 1, 1]);
    assert_eq!(cluster_widths("abc"), [1, 1, 1]);
}

#[test]
fn combining_marks_extend_the_cluster() {
    // One 'a' with one mark, one 'e' with two marks, one 'i' with one mark.
    // Each mark is 2 bytes in UTF-8.
    let text = "a\u{0363}e\u{0364}\u{0364}i\u{0365}";
    assert_eq!(cluster_lens(text), [3, 5, 3]);
    assert_eq!(cluster_widths(text), [1, 1, 1]);
}

#[test]
fn devanagari_conjunct_is_one_cluster() {
    // Ka + Virama + Virama + Ta. The virama is InCB=Linker: the first one
    // joins as an extender, the second one joins the following consonant.
    let text = "\u{0915}\u{094D}\u{094D}\u{0924}";
    assert_eq!(cluster_lens(text), [12]);
    assert_eq!(cluster_widths(text), [2]);
}

#[test]
fn regional_indicators_join_in_pairs_only() {
    // Three RIs: the first two form a flag, the third stands alone.
    let text = "\u{1F1E6}\u{1F1E7}\u{1F1E6}";
    assert_eq!(cluster_lens(text), [8, 4]);
    assert_eq!(cluster_widths(text), [2, 1]);

    // Four RIs: two flags.
    let text = "\u{1F1E6}\u{1F1E7}\u{1F1E8}\u{1F1E9}";
    assert_eq!(cluster_lens(text), [8, 8]);
}

#[test]
fn zwj_emoji_sequence_is_one_cluster() {
    let text = "\u{1F469}\u{200D}\u{1F469}";
    assert_eq!(cluster_lens(text), [11]);
    assert_eq!(cluster_widths(text), [2]);
}

#[test]
fn controls_always_break() {
    // GB3 (CR × LF) is deliberately not honored, so CR and LF are
    // separate clusters.
    assert_eq!(cluster_lens("a\r\nb"), [1, 1, 1, 1]);
}

#[test]
fn hangul_syllable_is_one_cluster() {
    // L + V + T.
    let text = "\u{1100}\u{1161}\u{11A8}";
    assert_eq!(cluster_lens(text), [9]);
    assert_eq!(cluster_widths(text), [2]);

    // LVT + T joins, LV + V joins.
    assert_eq!(cluster_lens("\u{AC01}\u{11A8}"), [6]);
    assert_eq!(cluster_lens("\u{AC00}\u{1161}"), [6]);
    // T cannot start a join with V.
    assert_eq!(cluster_lens("\u{11A8}\u{1161}"), [3, 3]);
}

#[test]
fn backward_iteration_matches_forward() {
    // Deliberately includes an odd RI run, where a naive backward pair
    // scan would pick different boundaries than the forward scan.
    let text = "a\u{0363}\u{1F1E6}\u{1F1E7}\u{1F1E6}\u{1F469}\u{200D}\u{1F469}x\r\n\
                \u{0915}\u{094D}\u{0924}\u{1100}\u{1161}\u{11A8}";

    let forward: Vec<_> = TABLES.clusters(text).collect();

    let mut backward = Vec::new();
    let mut offset = text.len();
    while let Some(cluster) = TABLES.grapheme_prev(text, offset) {
        offset = cluster.range.start;
        backward.push(cluster);
    }
    backward.reverse();

    assert_eq!(forward, backward);
}

#[test]
fn cluster_width_is_clamped_to_a_cell() {
    // Two wide CJK characters joined by a ZWJ would sum to 4 columns.
    let text = "\u{4E00}\u{200D}\u{4E00}";
    assert_eq!(cluster_lens(text), [9]);
    assert_eq!(cluster_widths(text), [2]);
}

#[test]
fn width_overrides_apply() {
    // Mn forces zero width even for ea=W.
    assert_eq!(TABLES.width_of(TABLES.lookup('\u{0ABC}')), 0);
    // Box drawing is narrow despite ea=A.
    assert_eq!(TABLES.width_of(TABLES.lookup('\u{2500}')), 1);
    // VS-16 is wide and joins as an extender in the stateful tables.
    let props = TABLES.lookup('\u{FE0F}');
    assert_eq!(props & 15, ClusterBreak::Extend as usize);
    assert_eq!(TABLES.width_of(props), 2);
}

#[test]
fn ambiguous_width_is_configurable() {
    let narrow = ClusterTables::from_ucd(&UCD);
    let wide = ClusterTables::from_ucd(&UCD).with_ambiguous_width(2);
    assert_eq!(narrow.width_of(narrow.lookup('\u{00A1}')), 1);
    assert_eq!(wide.width_of(wide.lookup('\u{00A1}')), 2);
}

#[test]
fn vs16_makes_the_cluster_wide() {
    let text = "\u{00A1}\u{FE0F}";
    assert_eq!(cluster_lens(text), [5]);
    assert_eq!(cluster_widths(text), [2]);
}

#[test]
fn stateless_extraction_differs_in_the_documented_ranges() {
    let ucd = extract_fixture(JoinModel::Stateless);

    // Hexagrams and combining half marks are forced narrow.
    assert_eq!(ucd.values[0x4DC0].width(), CharacterWidth::Narrow as u32);
    assert_eq!(ucd.values[0xFE20].width(), CharacterWidth::Narrow as u32);
    assert_eq!(ucd.values[0xFE20].cluster_break(), ClusterBreak::Other as u32);
    // VS-16 is not special-cased.
    assert_eq!(ucd.values[0xFE0F].width(), CharacterWidth::ZeroWidth as u32);
    // InCB=Consonant is not tracked.
    assert_eq!(ucd.values[0x915].cluster_break(), ClusterBreak::Other as u32);

    // The stateful variant keeps all of those.
    assert_eq!(UCD.values[0x4DC0].width(), CharacterWidth::Ambiguous as u32);
    assert_eq!(UCD.values[0xFE20].cluster_break(), ClusterBreak::Extend as u32);
    assert_eq!(UCD.values[0x915].cluster_break(), ClusterBreak::InCBConsonant as u32);
}

#[test]
fn unknown_property_values_are_rejected() {
    let xml = FIXTURE.replace(r#"GCB="RI""#, r#"GCB="ZZ""#);
    let doc = roxmltree::Document::parse(&xml).unwrap();
    let err = extract(&doc, ExtractOptions { model: JoinModel::Stateful, no_ambiguous: false })
        .unwrap_err();
    let msg = format!("{err}");
    assert!(msg.contains("GCB \"ZZ\""), "{msg}");
    assert!(msg.contains("U+1F1E6"), "{msg}");
}

// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Runtime classification: codepoint lookup, join decisions and
//! grapheme cluster scans over the built tables.

use std::ops::Range;

use crate::props::{CLUSTER_BREAK_MASK, WIDTH_SHIFT};
use crate::rules::{BREAK, build_stateful_rules, pack_stateful_rules};
use crate::trie::{Dedup, Trie, build_trie};
use crate::ucd::Ucd;

/// One grapheme cluster: its byte range within the scanned text
/// and its width in terminal columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphemeCluster {
    pub range: Range<usize>,
    pub width: usize,
}

/// The built classification trie plus the packed two-state join rules.
///
/// This is what the generated C/Rust tables encode statically. Carrying
/// them as a value lets the builder verify its own output and lets tests
/// run against tables built from arbitrary UCD documents.
pub struct ClusterTables {
    trie: Trie,
    rules: Vec<Vec<u32>>,
    ambiguous_width: usize,
}

impl ClusterTables {
    pub fn new(trie: Trie, rules: Vec<Vec<u32>>) -> Self {
        Self { trie, rules, ambiguous_width: 1 }
    }

    /// Builds lookup-ready tables straight from extracted UCD values,
    /// with fixed shifts. Good enough when the smallest possible trie
    /// doesn't matter.
    pub fn from_ucd(ucd: &Ucd) -> Self {
        let trie = build_trie(ucd.values.clone(), &[4, 4, 4], Dedup::Overlapping);
        let rules = pack_stateful_rules(&build_stateful_rules());
        Self::new(trie, rules)
    }

    /// How many columns an ambiguous-width character occupies. Defaults to 1.
    pub fn with_ambiguous_width(mut self, ambiguous_width: usize) -> Self {
        self.ambiguous_width = ambiguous_width;
        self
    }

    /// The packed classification value for one codepoint.
    pub fn lookup(&self, ch: char) -> usize {
        let cp = ch as usize;
        if cp < 0x80 {
            // The leaf stage direct-maps ASCII.
            let leaf = &self.trie.stages[self.trie.stages.len() - 1];
            return leaf.values[cp] as usize;
        }
        self.trie.lookup(cp) as usize
    }

    /// Returns the next state, which doubles as the join verdict.
    /// Callers thread the state across a scan and stop at [`Self::joins_done`].
    pub fn joins(&self, state: u32, lead: usize, trail: usize) -> u32 {
        let row = self.rules[state as usize][lead & CLUSTER_BREAK_MASK];
        (row >> ((trail & CLUSTER_BREAK_MASK) * 2)) & 3
    }

    pub fn joins_done(&self, state: u32) -> bool {
        state == BREAK as u32
    }

    /// The column width of one codepoint, with ambiguous resolved.
    pub fn width_of(&self, props: usize) -> usize {
        let w = props >> WIDTH_SHIFT;
        if w > 2 { self.ambiguous_width } else { w }
    }

    /// Scans one grapheme cluster starting at `offset`, which must lie on
    /// a char boundary. Returns `None` at the end of the text.
    ///
    /// The cluster width is the sum of the member widths. The max. width
    /// of a terminal cell is 2, so it's clamped to that.
    pub fn grapheme_next(&self, text: &str, offset: usize) -> Option<GraphemeCluster> {
        let mut chars = text[offset..].char_indices();
        let (_, first) = chars.next()?;
        let mut lead = self.lookup(first);
        let mut width = self.width_of(lead);
        let mut end = offset + first.len_utf8();
        let mut state = 0;

        for (i, ch) in chars {
            let trail = self.lookup(ch);
            state = self.joins(state, lead, trail);
            if self.joins_done(state) {
                break;
            }
            width += self.width_of(trail);
            end = offset + i + ch.len_utf8();
            lead = trail;
        }

        Some(GraphemeCluster { range: offset..end, width: width.min(2) })
    }

    /// Scans the grapheme cluster ending at `offset`, which must lie on
    /// a char boundary. Returns `None` at the start of the text.
    ///
    /// The join rules are stateful, so a plain backward pair-walk would
    /// disagree with the forward scan around Regional Indicator runs.
    /// The two state tables only differ in the RI × RI cell though, which
    /// means any pair that breaks in the default table breaks in every
    /// state. We scan backward to the nearest such unconditional boundary
    /// and re-walk forward from there, so that backward iteration yields
    /// exactly the forward boundary set.
    pub fn grapheme_prev(&self, text: &str, offset: usize) -> Option<GraphemeCluster> {
        let mut iter = text[..offset].char_indices().rev();
        let (mut sync, ch) = iter.next()?;
        let mut trail = self.lookup(ch);

        for (i, ch) in iter {
            let lead = self.lookup(ch);
            if self.joins_done(self.joins(0, lead, trail)) {
                break;
            }
            trail = lead;
            sync = i;
        }

        let mut cluster = self.grapheme_next(text, sync)?;
        while cluster.range.end < offset {
            cluster = self.grapheme_next(text, cluster.range.end)?;
        }
        Some(cluster)
    }

    /// Iterates all clusters of `text` front to back.
    pub fn clusters<'a>(&'a self, text: &'a str) -> Clusters<'a> {
        Clusters { tables: self, text, offset: 0 }
    }
}

pub struct Clusters<'a> {
    tables: &'a ClusterTables,
    text: &'a str,
    offset: usize,
}

impl Iterator for Clusters<'_> {
    type Item = GraphemeCluster;

    fn next(&mut self) -> Option<GraphemeCluster> {
        let cluster = self.tables.grapheme_next(self.text, self.offset)?;
        self.offset = cluster.range.end;
        Some(cluster)
    }
}

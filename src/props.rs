// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The packed per-codepoint classification value.

/// Terminal column count of a codepoint. 2 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterWidth {
    ZeroWidth,
    Narrow,
    Wide,
    Ambiguous,
}

/// Grapheme cluster break category. 4 bits.
///
/// NOTE: The order of these items must match the rows/columns
/// of the tables built in [`crate::rules`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub enum ClusterBreak {
    Other,         // GB999
    Control,       // GB4, GB5 -- includes CR and LF, as GB3 is dropped
    Extend,        // GB9, GB9a -- includes SpacingMark
    RI,            // GB12, GB13
    Prepend,       // GB9b
    HangulL,       // GB6, GB7, GB8
    HangulV,       // GB6, GB7, GB8
    HangulT,       // GB6, GB7, GB8
    HangulLV,      // GB6, GB7, GB8
    HangulLVT,     // GB6, GB7, GB8
    InCBLinker,    // GB9c
    InCBConsonant, // GB9c
    ExtPic,        // GB11
    ZWJ,           // GB9, GB11
}

pub const CLUSTER_BREAK_COUNT: usize = 14;
pub const CLUSTER_BREAK_MASK: usize = 15;
pub const WIDTH_SHIFT: usize = 6;

/// One entry of the dense classification array and of the leaf trie stage.
#[repr(transparent)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrieType(u32);

impl TrieType {
    pub fn new(cb: ClusterBreak, cw: CharacterWidth) -> Self {
        Self(cb as u32 | (cw as u32) << WIDTH_SHIFT)
    }

    pub fn change_width(&mut self, cw: CharacterWidth) {
        self.0 = (self.0 & !(3 << WIDTH_SHIFT)) | (cw as u32) << WIDTH_SHIFT;
    }

    pub fn value(self) -> u32 {
        self.0
    }

    pub fn cluster_break(self) -> u32 {
        self.0 & CLUSTER_BREAK_MASK as u32
    }

    pub fn width(self) -> u32 {
        self.0 >> WIDTH_SHIFT
    }
}

// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Join-rule tables approximating UAX #29 grapheme cluster boundaries.
//!
//! UAX #29 states:
//! > Note: Testing two adjacent characters is insufficient for determining a boundary.
//!
//! I completely agree, however it makes the implementation complex and slow and it
//! only benefits what can be considered edge cases in the context of terminals.
//! By using a lookup table anyway this results in a >100MB/s throughput, before
//! adding any fast-passes whatsoever.
//!
//! This affects the following rules:
//! * GB9c: \p{InCB=Consonant} [\p{InCB=Extend}\p{InCB=Linker}]* \p{InCB=Linker} [\p{InCB=Extend}\p{InCB=Linker}]* × \p{InCB=Consonant}
//!   "Do not break within certain combinations with Indic_Conjunct_Break (InCB)=Linker."
//!   Our implementation does this:
//!                     × \p{InCB=Linker}
//!     \p{InCB=Linker} × \p{InCB=Consonant}
//!   In other words, it doesn't check for a leading \p{InCB=Consonant} or a series
//!   of Extenders/Linkers in between.
//! * GB11: \p{Extended_Pictographic} Extend* ZWJ × \p{Extended_Pictographic}
//!   "Do not break within emoji modifier sequences or emoji zwj sequences."
//!   Our implementation does this:
//!     ZWJ × \p{Extended_Pictographic}
//!   In other words, it doesn't check whether the ZWJ is led by another ExtPic.
//! * GB12: sot (RI RI)* RI × RI
//!   GB13: [^RI] (RI RI)* RI × RI
//!   "Do not break between regional indicator (RI) symbols if there is an odd
//!   number of RI characters before the break point."
//!   The stateful tables join any pair of RIs and then immediately abort further
//!   RI joins. The stateless table joins any pair of RIs unconditionally.
//!
//! This is a great reference for the resulting tables:
//! https://www.unicode.org/Public/UCD/latest/ucd/auxiliary/GraphemeBreakTest.html

use crate::props::{CLUSTER_BREAK_COUNT, ClusterBreak};

/// Joined. Also the next state: the default one.
pub const JOIN: u8 = 0;
/// Joined a Regional Indicator pair. Also the next state:
/// the one where further RI joins are forbidden.
pub const JOIN_RI_PAIR: u8 = 1;
/// What UAX #29 writes as "÷". Also the terminal state.
pub const BREAK: u8 = 3;

/// One lead category row of trail category verdicts.
pub type RuleRow = [u8; CLUSTER_BREAK_COUNT];
pub type RuleTable = [RuleRow; CLUSTER_BREAK_COUNT];

use ClusterBreak::*;

/// Builds the two-state rule tables: the base one, and the copy we switch to
/// once a Regional Indicator pair got joined.
///
/// NOTE: We build the tables in reverse, because rules with lower numbers take
/// priority. (This is primarily relevant for GB9b vs. GB4.)
pub fn build_stateful_rules() -> [RuleTable; 2] {
    // Otherwise, break everywhere.
    // GB999: Any ÷ Any
    let mut base = [[BREAK; CLUSTER_BREAK_COUNT]; CLUSTER_BREAK_COUNT];

    // Do not break within emoji flag sequences.
    // GB12: sot (RI RI)* RI × RI
    // GB13: [^RI] (RI RI)* RI × RI
    // The join doubles as the transition into the post-RI-pair state.
    base[RI as usize][RI as usize] = JOIN_RI_PAIR;

    // Do not break within emoji modifier sequences or emoji zwj sequences.
    // GB11: \p{Extended_Pictographic} Extend* ZWJ × \p{Extended_Pictographic}
    base[ZWJ as usize][ExtPic as usize] = JOIN;

    // Do not break within certain combinations with Indic_Conjunct_Break (InCB)=Linker.
    // GB9c, reinvented as the two pairs described above.
    for row in &mut base {
        row[InCBLinker as usize] = JOIN;
    }
    base[InCBLinker as usize][InCBConsonant as usize] = JOIN;

    // Do not break after Prepend characters.
    // GB9b: Prepend ×
    base[Prepend as usize] = [JOIN; CLUSTER_BREAK_COUNT];

    // Do not break before extending characters or ZWJ.
    // GB9: × (Extend | ZWJ)
    // Do not break before SpacingMarks.
    // GB9a: × SpacingMark
    // (SpacingMarks are extracted as Extend, since GB9a is identical to GB9.)
    for row in &mut base {
        row[Extend as usize] = JOIN;
        row[ZWJ as usize] = JOIN;
    }

    // Do not break Hangul syllable sequences.
    // GB6: L x (L | V | LV | LVT)
    base[HangulL as usize][HangulL as usize] = JOIN;
    base[HangulL as usize][HangulV as usize] = JOIN;
    base[HangulL as usize][HangulLV as usize] = JOIN;
    base[HangulL as usize][HangulLVT as usize] = JOIN;
    // GB7: (LV | V) x (V | T)
    base[HangulLV as usize][HangulV as usize] = JOIN;
    base[HangulLV as usize][HangulT as usize] = JOIN;
    base[HangulV as usize][HangulV as usize] = JOIN;
    base[HangulV as usize][HangulT as usize] = JOIN;
    // GB8: (LVT | T) x T
    base[HangulLVT as usize][HangulT as usize] = JOIN;
    base[HangulT as usize][HangulT as usize] = JOIN;

    // Break before and after controls. GB3 (CR × LF) is deliberately ignored,
    // CR and LF were already extracted as plain Control.
    // GB5: ÷ (Control | CR | LF)
    for row in &mut base {
        row[Control as usize] = BREAK;
    }
    // GB4: (Control | CR | LF) ÷
    base[Control as usize] = [BREAK; CLUSTER_BREAK_COUNT];

    // GB1 and GB2 (breaks at the start and end of text) are handled by the
    // scan loops, not by this table.

    // Once we have encountered a Regional Indicator pair we'll enter the
    // second table. It's a copy of the base table, but further Regional
    // Indicator joins are forbidden.
    let mut after_ri_pair = base;
    after_ri_pair[RI as usize][RI as usize] = BREAK;

    [base, after_ri_pair]
}

/// Builds the single-table variant: no RI state machinery (any pair of RIs
/// joins), and GB9c degrades further to "anything joins with a linker on
/// either side".
pub fn build_stateless_rules() -> [[bool; CLUSTER_BREAK_COUNT]; CLUSTER_BREAK_COUNT] {
    // GB999: Any ÷ Any
    let mut rules = [[false; CLUSTER_BREAK_COUNT]; CLUSTER_BREAK_COUNT];

    // GB12, GB13: any pair of RIs joins, odd counts be damned.
    rules[RI as usize][RI as usize] = true;

    // GB11: ZWJ × \p{Extended_Pictographic}
    rules[ZWJ as usize][ExtPic as usize] = true;

    // GB9c, reinvented: the linker joins in both directions.
    rules[InCBLinker as usize] = [true; CLUSTER_BREAK_COUNT];
    for row in &mut rules {
        row[InCBLinker as usize] = true;
    }

    // GB9b: Prepend ×
    rules[Prepend as usize] = [true; CLUSTER_BREAK_COUNT];

    // GB9, GB9a: × (Extend | ZWJ)
    for row in &mut rules {
        row[Extend as usize] = true;
        row[ZWJ as usize] = true;
    }

    // GB6: L x (L | V | LV | LVT)
    rules[HangulL as usize][HangulL as usize] = true;
    rules[HangulL as usize][HangulV as usize] = true;
    rules[HangulL as usize][HangulLV as usize] = true;
    rules[HangulL as usize][HangulLVT as usize] = true;
    // GB7: (LV | V) x (V | T)
    rules[HangulLV as usize][HangulV as usize] = true;
    rules[HangulLV as usize][HangulT as usize] = true;
    rules[HangulV as usize][HangulV as usize] = true;
    rules[HangulV as usize][HangulT as usize] = true;
    // GB8: (LVT | T) x T
    rules[HangulLVT as usize][HangulT as usize] = true;
    rules[HangulT as usize][HangulT as usize] = true;

    // GB5: ÷ (Control | CR | LF)
    for row in &mut rules {
        row[Control as usize] = false;
    }
    // GB4: (Control | CR | LF) ÷
    rules[Control as usize] = [false; CLUSTER_BREAK_COUNT];

    rules
}

/// Packs the two-state tables into one u32 per row, 2 bits per trail category.
pub fn pack_stateful_rules(tables: &[RuleTable; 2]) -> Vec<Vec<u32>> {
    tables
        .iter()
        .map(|table| {
            table
                .iter()
                .map(|row| {
                    row.iter()
                        .enumerate()
                        .fold(0u32, |acc, (trail, &value)| acc | (value as u32) << (trail * 2))
                })
                .collect()
        })
        .collect()
}

/// Packs the boolean table into one u16 per row, 1 bit per trail category.
pub fn pack_stateless_rules(
    table: &[[bool; CLUSTER_BREAK_COUNT]; CLUSTER_BREAK_COUNT],
) -> Vec<u16> {
    table
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .fold(0u16, |acc, (trail, &join)| acc | (join as u16) << trail)
        })
        .collect()
}

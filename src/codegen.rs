// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Emits the built tables and their lookup functions as C or Rust source text.

use std::fmt::Write as _;

use indoc::writedoc;

use crate::props::{CLUSTER_BREAK_MASK, WIDTH_SHIFT};
use crate::trie::Trie;
use crate::ucd::Ucd;

#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub enum Language {
    #[default]
    C,
    Rust,
}

/// The packed join-rule tables, in whichever flavor was requested.
pub enum Rules {
    /// Two tables, one u32 row per lead category, 2 bits per trail.
    Stateful(Vec<Vec<u32>>),
    /// One table, one u16 row per lead category, 1 bit per trail.
    Stateless(Vec<u16>),
}

impl Rules {
    fn size(&self) -> usize {
        match self {
            Rules::Stateful(tables) => tables.iter().map(|t| t.len() * 4).sum(),
            Rules::Stateless(rows) => rows.len() * 2,
        }
    }
}

pub struct Output {
    pub lang: Language,
    pub no_ambiguous: bool,

    pub ucd: Ucd,
    pub trie: Trie,
    pub rules: Rules,
    pub total_size: usize,
}

impl Output {
    pub fn new(lang: Language, no_ambiguous: bool, ucd: Ucd, trie: Trie, rules: Rules) -> Self {
        let total_size = trie.total_size + rules.size();
        Self { lang, no_ambiguous, ucd, trie, rules, total_size }
    }

    fn args(&self) -> String {
        let mut buf = String::new();
        match self.lang {
            Language::C => buf.push_str("--lang=c"),
            Language::Rust => buf.push_str("--lang=rust"),
        }
        if matches!(self.rules, Rules::Stateless(_)) {
            buf.push_str(" --stateless")
        }
        if self.no_ambiguous {
            buf.push_str(" --no-ambiguous")
        }
        buf
    }
}

pub fn generate(out: Output) -> String {
    match out.lang {
        Language::C => generate_c(out),
        Language::Rust => generate_rust(out),
    }
}

fn generate_c(out: Output) -> String {
    let mut buf = String::new();

    _ = writedoc!(
        buf,
        "
        // BEGIN: Generated by grapheme-tables on {}, from {}, with {}, {} bytes
        // clang-format off
        ",
        chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        out.ucd.description,
        out.args(),
        out.total_size,
    );

    for stage in &out.trie.stages {
        let mut width = 16;
        if stage.index != 0 {
            width = stage.mask + 1;
        }

        _ = write!(buf, "static const uint{}_t s_stage{}[] = {{", stage.bits, stage.index);
        for (j, &value) in stage.values.iter().enumerate() {
            if j % width == 0 {
                buf.push_str("\n   ");
            }
            _ = write!(buf, " 0x{:01$x},", value, stage.bits / 4);
        }
        buf.push_str("\n};\n");
    }

    match &out.rules {
        Rules::Stateful(tables) => {
            _ = writeln!(
                buf,
                "static const uint32_t s_grapheme_cluster_join_rules[{}][{}] = {{",
                tables.len(),
                tables[0].len()
            );
            for table in tables {
                buf.push_str("    {\n");
                for &r in table {
                    _ = writeln!(buf, "        0b{r:032b},");
                }
                buf.push_str("    },\n");
            }
            buf.push_str("};\n");
        }
        Rules::Stateless(rows) => {
            _ = writeln!(
                buf,
                "static const uint16_t s_grapheme_cluster_join_rules[{}] = {{",
                rows.len()
            );
            for &r in rows {
                _ = writeln!(buf, "    0b{r:016b},");
            }
            buf.push_str("};\n");
        }
    }

    _ = writedoc!(
        buf,
        "
        inline int ucd_grapheme_cluster_lookup(const uint32_t cp)
        {{
            if (cp < 0x80) {{
                return s_stage{}[cp];
            }}
        ",
        out.trie.stages.len() - 1,
    );
    for stage in &out.trie.stages {
        if stage.index == 0 {
            _ = writeln!(buf, "    const uint{}_t s0 = s_stage0[cp >> {}];", stage.bits, stage.shift);
        } else {
            _ = writeln!(
                buf,
                "    const uint{}_t s{} = s_stage{}[s{} + ((cp >> {}) & {})];",
                stage.bits,
                stage.index,
                stage.index,
                stage.index - 1,
                stage.shift,
                stage.mask,
            );
        }
    }
    _ = writedoc!(
        buf,
        "
                return s{};
        }}
        ",
        out.trie.stages.len() - 1,
    );

    match &out.rules {
        Rules::Stateful(_) => {
            _ = writedoc!(
                buf,
                "
                inline int ucd_grapheme_cluster_joins(const int state, const int lead, const int trail)
                {{
                    const int l = lead & {0};
                    const int t = trail & {0};
                    return (s_grapheme_cluster_join_rules[state][l] >> (t * 2)) & 3;
                }}
                inline bool ucd_grapheme_cluster_joins_done(const int state)
                {{
                    return state == 3;
                }}
                ",
                CLUSTER_BREAK_MASK,
            );
        }
        Rules::Stateless(_) => {
            _ = writedoc!(
                buf,
                "
                inline bool ucd_grapheme_cluster_joins(const int lead, const int trail)
                {{
                    const int l = lead & {0};
                    const int t = trail & {0};
                    return (s_grapheme_cluster_join_rules[l] >> t) & 1;
                }}
                ",
                CLUSTER_BREAK_MASK,
            );
        }
    }

    if out.no_ambiguous {
        _ = writedoc!(
            buf,
            "
            inline int ucd_grapheme_cluster_character_width(const int val)
            {{
                return val >> {};
            }}
            ",
            WIDTH_SHIFT,
        );
    } else {
        _ = writedoc!(
            buf,
            "
            inline int ucd_grapheme_cluster_character_width(const int val, int ambiguous_width)
            {{
                int w = val >> {};
                if (w == 3) {{
                    w = ambiguous_width;
                }}
                return w;
            }}
            ",
            WIDTH_SHIFT,
        );
    }

    buf.push_str("// clang-format on\n// END: Generated by grapheme-tables\n");
    buf
}

fn generate_rust(out: Output) -> String {
    let mut buf = String::new();

    _ = writeln!(
        buf,
        "// BEGIN: Generated by grapheme-tables on {}, from {}, with {}, {} bytes",
        chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        out.ucd.description,
        out.args(),
        out.total_size,
    );

    for stage in &out.trie.stages {
        let mut width = 16;
        if stage.index != 0 {
            width = stage.mask + 1;
        }

        _ = write!(
            buf,
            "#[rustfmt::skip]\nconst STAGE{}: [u{}; {}] = [",
            stage.index,
            stage.bits,
            stage.values.len(),
        );
        for (j, &value) in stage.values.iter().enumerate() {
            if j % width == 0 {
                buf.push_str("\n   ");
            }
            _ = write!(buf, " 0x{:01$x},", value, stage.bits / 4);
        }
        buf.push_str("\n];\n");
    }

    match &out.rules {
        Rules::Stateful(tables) => {
            _ = writeln!(
                buf,
                "#[rustfmt::skip]\nconst GRAPHEME_JOIN_RULES: [[u32; {}]; {}] = [",
                tables[0].len(),
                tables.len(),
            );
            for table in tables {
                buf.push_str("    [\n");
                for &r in table {
                    _ = writeln!(buf, "        0b{r:032b},");
                }
                buf.push_str("    ],\n");
            }
            buf.push_str("];\n");
        }
        Rules::Stateless(rows) => {
            _ = writeln!(
                buf,
                "#[rustfmt::skip]\nconst GRAPHEME_JOIN_RULES: [u16; {}] = [",
                rows.len(),
            );
            for &r in rows {
                _ = writeln!(buf, "    0b{r:016b},");
            }
            buf.push_str("];\n");
        }
    }

    _ = writedoc!(
        buf,
        "
        #[inline(always)]
        pub fn ucd_grapheme_cluster_lookup(cp: char) -> usize {{
            unsafe {{
                let cp = cp as usize;
                if cp < 0x80 {{
                    return STAGE{}[cp] as usize;
                }}
        ",
        out.trie.stages.len() - 1,
    );
    for stage in &out.trie.stages {
        if stage.index == 0 {
            _ = writeln!(
                buf,
                "        let s = *STAGE{}.get_unchecked(cp >> {}) as usize;",
                stage.index, stage.shift,
            );
        } else if stage.index != out.trie.stages.len() - 1 {
            _ = writeln!(
                buf,
                "        let s = *STAGE{}.get_unchecked(s + ((cp >> {}) & {})) as usize;",
                stage.index, stage.shift, stage.mask,
            );
        } else {
            _ = writeln!(
                buf,
                "        *STAGE{}.get_unchecked(s + (cp & {})) as usize",
                stage.index, stage.mask,
            );
        }
    }
    _ = writedoc!(
        buf,
        "
            }}
        }}
        ",
    );

    match &out.rules {
        Rules::Stateful(_) => {
            _ = writedoc!(
                buf,
                "
                #[inline(always)]
                pub fn ucd_grapheme_cluster_joins(state: u32, lead: usize, trail: usize) -> u32 {{
                    unsafe {{
                        let l = lead & {0};
                        let t = trail & {0};
                        let s = GRAPHEME_JOIN_RULES.get_unchecked(state as usize);
                        (s[l] >> (t * 2)) & 3
                    }}
                }}
                #[inline(always)]
                pub fn ucd_grapheme_cluster_joins_done(state: u32) -> bool {{
                    state == 3
                }}
                ",
                CLUSTER_BREAK_MASK,
            );
        }
        Rules::Stateless(_) => {
            _ = writedoc!(
                buf,
                "
                #[inline(always)]
                pub fn ucd_grapheme_cluster_joins(lead: usize, trail: usize) -> bool {{
                    unsafe {{
                        let l = lead & {0};
                        let t = trail & {0};
                        let s = *GRAPHEME_JOIN_RULES.get_unchecked(l);
                        ((s >> t) & 1) != 0
                    }}
                }}
                ",
                CLUSTER_BREAK_MASK,
            );
        }
    }

    if out.no_ambiguous {
        _ = writedoc!(
            buf,
            "
            #[inline(always)]
            pub fn ucd_grapheme_cluster_character_width(val: usize) -> usize {{
                val >> {}
            }}
            ",
            WIDTH_SHIFT,
        );
    } else {
        // `cold_path()` ensures that LLVM emits a branch instead of a conditional move.
        // This improves performance, as ambiguous characters are rare.
        // `> 2` is used instead of `== 3`, because this way the compiler can immediately
        // test whether `val > (2 << shift)` before shifting.
        _ = writedoc!(
            buf,
            "
            #[inline(always)]
            pub fn ucd_grapheme_cluster_character_width(val: usize, ambiguous_width: usize) -> usize {{
                let mut w = val >> {};
                if w > 2 {{
                    cold_path();
                    w = ambiguous_width;
                }}
                w
            }}
            ",
            WIDTH_SHIFT,
        );
        _ = writedoc!(
            buf,
            "
            #[cold]
            #[inline(always)]
            fn cold_path() {{}}
            "
        );
    }

    buf.push_str("// END: Generated by grapheme-tables\n");
    buf
}

// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::io::Write as _;
use std::path::PathBuf;

use anyhow::{Context, bail};

use grapheme_tables::codegen::{self, Language, Output, Rules};
use grapheme_tables::rules::{
    build_stateful_rules, build_stateless_rules, pack_stateful_rules, pack_stateless_rules,
};
use grapheme_tables::trie::{Dedup, build_best_trie, build_trie};
use grapheme_tables::ucd::{self, ExtractOptions, JoinModel};

const HELP: &str = "\
Usage: grapheme-tables [options...] <ucd.nounihan.grouped.xml>
  -h, --help            Prints help information
  --lang=<c|rust>       Output language (default: c)
  --stateless           Emit a single-state join table (joins any pair of
                        Regional Indicators, no post-pair state tracking)
  --no-ambiguous        Treat all ambiguous characters as narrow

Download ucd.nounihan.grouped.xml at:
  https://www.unicode.org/Public/UCD/latest/ucdxml/ucd.nounihan.grouped.zip
";

fn main() -> anyhow::Result<()> {
    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        eprint!("{HELP}");
        return Ok(());
    }

    let arg_lang = args
        .opt_value_from_fn("--lang", |arg| match arg {
            "c" => Ok(Language::C),
            "rust" => Ok(Language::Rust),
            l => bail!("invalid language: \"{}\"", l),
        })?
        .unwrap_or_default();
    let arg_stateless = args.contains("--stateless");
    let arg_no_ambiguous = args.contains("--no-ambiguous");
    let arg_input = args.free_from_os_str(|s| -> Result<PathBuf, &'static str> { Ok(s.into()) })?;
    let arg_remaining = args.finish();
    if !arg_remaining.is_empty() {
        bail!("unrecognized arguments: {:?}", arg_remaining);
    }

    let model = if arg_stateless { JoinModel::Stateless } else { JoinModel::Stateful };

    let input = std::fs::read_to_string(&arg_input)
        .with_context(|| format!("failed to read {}", arg_input.display()))?;
    let doc = roxmltree::Document::parse(&input)?;
    let ucd = ucd::extract(&doc, ExtractOptions { model, no_ambiguous: arg_no_ambiguous })?;

    let (trie, rules) = match model {
        JoinModel::Stateful => {
            // Find the best trie configuration over the given block sizes (2^2 - 2^8) and stages (4).
            // More stages = Less size. The trajectory roughly follows a+b*c^stages, where c < 1.
            // 4 still gives ~30% savings over 3 stages and going beyond 5 gives diminishing returns (<10%).
            let trie = build_best_trie(&ucd.values, 2, 8, 4);
            let rules = Rules::Stateful(pack_stateful_rules(&build_stateful_rules()));
            (trie, rules)
        }
        JoinModel::Stateless => {
            let trie = build_trie(ucd.values.clone(), &[4, 4, 4], Dedup::Overlapping);
            let rules = Rules::Stateless(pack_stateless_rules(&build_stateless_rules()));
            (trie, rules)
        }
    };

    // Run a quick sanity check to ensure that the trie works as expected.
    for (cp, expected) in ucd.values.iter().enumerate() {
        assert_eq!(expected.value(), trie.lookup(cp), "trie sanity check failed for U+{cp:04X}");
    }
    for (cp, &expected) in ucd.values[..0x80].iter().enumerate() {
        let last = &trie.stages[trie.stages.len() - 1];
        assert_eq!(
            expected.value(),
            last.values[cp],
            "trie sanity check failed for direct ASCII mapping of U+{cp:04X}"
        );
    }

    let out = Output::new(arg_lang, arg_no_ambiguous, ucd, trie, rules);
    let buf = codegen::generate(out);

    std::io::stdout().write_all(buf.as_bytes())?;
    Ok(())
}

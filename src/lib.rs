// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Compressed Unicode classification tables for terminals: a multi-stage
//! trie builder over the UCD, join-rule tables approximating UAX #29,
//! a C/Rust table generator, and the runtime classifier consuming them.

pub mod codegen;
pub mod props;
pub mod rules;
pub mod segment;
pub mod trie;
pub mod ucd;

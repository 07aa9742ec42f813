//! Fuzz target for download script parsing
//!
//! # Invariants
//!
//! - Parsing NEVER panics on arbitrary text or labels
//! - A parsed script is never empty
//! - Lines never contain `\n`
//! - A found section starts at its marker line

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use stxcom_core::{Script, Section, script::Selection};

#[derive(Debug, Clone, Arbitrary)]
struct Input {
    text: String,
    label: Option<String>,
}

fuzz_target!(|input: Input| {
    let section = match input.label {
        Some(label) => Section::Label(label),
        None => Section::Whole,
    };

    let Ok(script) = Script::parse(&input.text, &section) else {
        return;
    };

    assert!(!script.lines().is_empty());
    assert!(script.lines().iter().all(|line| !line.contains('\n')));
    if let (Selection::Section(label), Some(marker)) = (script.selection(), section.marker()) {
        if !label.contains('\n') {
            assert!(script.header().is_some_and(|header| header.starts_with(&marker)));
        }
    }
});

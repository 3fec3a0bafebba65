#![forbid(unsafe_code)]

//! `quill-ts`: command-line tooling over [`quill_i18n`].

pub mod cli;
pub mod commands;

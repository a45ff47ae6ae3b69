//! Pipeline stages for deck-to-notes generation.
//!
//! Each submodule implements exactly one transformation step, and each step
//! hands its output to the next by value.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ normalize ──▶ concepts ──▶ summary ──▶ crate::export
//! (path)   (lopdf/zip)   (regex)       (LLM)        (LLM)
//! ```
//!
//! 1. [`input`]     : check the path exists and map its extension to a format
//! 2. [`extract`]   : parse pages ([`lopdf`]) or slides ([`pptx`]); runs in
//!    `spawn_blocking` because both parsers are synchronous
//! 3. [`normalize`] : detect a topic line per slide
//! 4. [`concepts`]  : one structured LLM call over all slides
//! 5. [`summary`]   : one structured LLM call over all concepts
//!
//! [`llm`] holds the request/decoding helpers the two LLM stages share.

pub mod concepts;
pub mod extract;
pub mod input;
pub mod llm;
pub mod normalize;
pub mod pptx;
pub mod summary;

//! Pipeline stages for LaTeX-to-PDF conversion.
//!
//! Each submodule implements exactly one step, so each can be tested on its
//! own without a TeX installation.
//!
//! ## Data Flow
//!
//! ```text
//! workspace ──▶ compile ──▶ relocate
//! (temp dir)    (engine)    (move PDF)
//!                  │
//!                  └──▶ log (on failure)
//! ```
//!
//! 1. [`workspace`] — create the scoped directory and write `document.tex`
//! 2. [`compile`]   — run the engine in batch mode with stdio discarded,
//!    optionally under a wall-clock limit
//! 3. [`log`]       — pull `!` error lines out of `document.log` when the
//!    engine fails
//! 4. [`relocate`]  — move `document.pdf` to the destination, replacing it

pub mod compile;
pub mod log;
pub mod relocate;
pub mod workspace;

//! Output generation for posts and run reports.
//!
//! # Submodules
//!
//! - [`post`]: Renders and writes one Markdown post per accepted entry
//! - [`json`]: Writes the optional JSON summary of a run
//!
//! # Output Structure
//!
//! ```text
//! _posts/
//! ├── 2024-03-01-gpt-5-whats-new.md
//! └── 2024-03-01-another-headline.md
//!
//! report.json   # only with --report-json
//! ```

pub mod json;
pub mod post;

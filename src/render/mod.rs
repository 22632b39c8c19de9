//! Output rendering for reports.
//!
//! # Example
//!
//! ```no_run
//! use docxdiag::{analyze_file, render::*};
//!
//! let report = analyze_file("document.docx");
//! let json = to_json(&report, JsonFormat::Pretty)?;
//! println!("{}", json);
//! # Ok::<(), docxdiag::Error>(())
//! ```

mod json;

pub use json::{to_json, to_json_batch, JsonFormat};

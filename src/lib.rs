//! # shorten-maincode
//!
//! Rewrite one column of a CSV file from the 11-digit SA1 maincode format
//! to the 7-digit short code format.
//!
//! ## Overview
//!
//! - **Header passthrough**: the first record is copied unchanged
//! - **One column**: every later record has a single field rewritten
//! - **Streaming**: records are read, converted and written one at a time
//! - **Fail fast**: a record missing the column stops the run
//!
//! ## Example
//!
//! ```
//! use shorten_maincode::{ShortenColumn, execute};
//!
//! let input = "id,code,name\n1,12345678901,Alice\n";
//! let mut output = Vec::new();
//!
//! let summary = execute(input.as_bytes(), &mut output, &mut ShortenColumn::new(1)).unwrap();
//!
//! assert_eq!(String::from_utf8(output).unwrap(), "id,code,name\n1,1678901,Alice\n");
//! assert_eq!(summary.output_count, 2);
//! ```

pub mod error;
pub mod executor;
pub mod record_stage;
pub mod shortcode;
pub mod source;

pub use error::ShortenError;
pub use executor::{RunSummary, execute};
pub use record_stage::{RecordStage, ShortenColumn, record_line};
pub use shortcode::{SHORT_CODE_LEN, TAIL_LEN, shorten};
pub use source::open_input;

//! Files written at the end of a batch run.
//!
//! # Submodules
//!
//! - [`json`]: the batch manifest listing chapters, skipped and failed URLs
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── opinion/
//! │   ├── 2_some-column.html
//! │   └── 2_some-column.pdf
//! ├── explained/
//! ├── other/
//! ├── economist_epw/
//! └── 2021-02-01_manifest.json
//! ```

pub mod json;

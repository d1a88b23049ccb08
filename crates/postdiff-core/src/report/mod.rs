//! Posting diff report: counted-container transport and the builder that
//! drives it.
//!
//! Report shape:
//!
//! ```text
//! {"diffs": [
//!   {"token": {"id": 1, "value": "hello"},
//!    "remains": [{"record_id": 10, "section_id": 1, "position": 5}],
//!    "missings": []}
//! ]}
//! ```
//!
//! Every container declares its member count when it is opened; the
//! writers refuse to emit more or fewer members than declared.

pub mod builder;
pub mod json;
pub mod key;
pub mod writer;

pub use builder::{build_report, DiffReportBuilder, MissingKeyPolicy};
pub use json::{JsonStreamWriter, JsonTreeWriter};
pub use key::{render_key, KeyValue};
pub use writer::{ContainerStack, ReportWriter, Slot};

//! Service layer for the schedule scraper.
//!
//! This module contains the business logic for:
//! - Course page parsing (`ScheduleParser`)
//! - Faculty directory lookups (`DirectoryClient`)
//! - Cache-aside instructor enrichment (`InstructorEnricher`)
//! - Course page retrieval (`HttpPageSource`, `FilePageSource`)

mod directory;
mod enrichment;
mod pages;
mod parser;

pub use directory::{DirectoryApi, DirectoryClient};
pub use enrichment::InstructorEnricher;
pub use pages::{FilePageSource, HttpPageSource, PageSource};
pub use parser::{PageDraft, ScheduleParser, TableRole};

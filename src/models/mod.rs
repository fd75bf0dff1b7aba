// src/models/mod.rs

//! Domain models for the schedule scraper.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod batch;
mod config;
mod course;
mod directory;
mod table;

// Re-export all public types
pub use batch::BatchEntry;
pub use config::{
    CacheConfig, CachePolicy, Config, DirectoryConfig, HttpConfig, RetryConfig, ScheduleConfig,
    normalize_quarter,
};
pub use course::{Course, CourseInfo, GeneralEducation, Instructor, Meeting};
pub use directory::{Contact, DirectoryResponse, lookup_name};
pub use table::{Cell, Row, Table, clean_text};

// src/models/course.rs

//! Course, CourseInfo, Meeting and Instructor records.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// One scheduled occurrence of a course.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Meeting {
    /// Encoded day string (e.g. "MW", "TTh")
    pub days: String,

    /// Local start time ("HH:MM" with optional AM/PM suffix)
    pub start_time: String,

    /// Local end time
    pub end_time: String,

    pub room_building: String,

    pub room_number: String,
}

/// Course instructor, split from a "Last,First Middle" cell.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Instructor {
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

impl Instructor {
    /// Parse a "LAST,FIRST MIDDLE" formatted name.
    ///
    /// A name without a comma is taken as a last name only.
    pub fn from_cell_text(text: &str) -> Self {
        let (last, rest) = match text.split_once(',') {
            Some((last, rest)) => (last, rest),
            None => (text, ""),
        };

        let mut given = rest.split_whitespace();
        let first = given.next().unwrap_or_default();
        let middle = given.next().map(str::to_string);

        Self {
            first_name: first.to_string(),
            middle_name: middle,
            last_name: last.trim().to_string(),
            email: None,
            phone_number: None,
        }
    }

    /// Whether no name has been assigned.
    pub fn is_unset(&self) -> bool {
        self.first_name.is_empty() && self.last_name.is_empty()
    }

    /// Whether both a first and a last name are known.
    ///
    /// Placeholders such as `"STAFF"` carry no comma and resolve to a last
    /// name only.
    pub fn is_resolved(&self) -> bool {
        !self.first_name.is_empty() && !self.last_name.is_empty()
    }

    /// Display name in "First Last" order.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// General-education requirements a course satisfies.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub struct GeneralEducation {
    /// English composition
    pub c: bool,
    /// Additional writing
    pub w: bool,
    /// Quantitative and symbolic reasoning
    pub qsr: bool,
    /// Diversity
    pub div: bool,
    /// Visual, literary and performing arts
    pub vlpa: bool,
    /// Individuals and societies
    #[serde(rename = "I&S")]
    pub is: bool,
    /// Natural world
    pub nw: bool,
}

impl GeneralEducation {
    /// Parse the flags out of a gen-ed marker such as `"I&S, DIV"`.
    ///
    /// Unknown tokens are ignored.
    pub fn from_marker(marker: &str) -> Self {
        static TOKEN: OnceLock<Option<Regex>> = OnceLock::new();

        let mut flags = Self::default();
        let Some(token) = TOKEN.get_or_init(|| Regex::new(r"[A-Za-z&]+").ok()) else {
            return flags;
        };
        for m in token.find_iter(marker) {
            match m.as_str().to_ascii_uppercase().as_str() {
                "C" | "COMP" => flags.c = true,
                "W" => flags.w = true,
                "QSR" | "RSN" => flags.qsr = true,
                "DIV" => flags.div = true,
                "VLPA" => flags.vlpa = true,
                "I&S" | "IS" => flags.is = true,
                "NW" => flags.nw = true,
                _ => {}
            }
        }
        flags
    }

    /// Whether any flag is set.
    pub fn any(&self) -> bool {
        self.c || self.w || self.qsr || self.div || self.vlpa || self.is || self.nw
    }
}

/// Scheduling and administrative attributes of a section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CourseInfo {
    /// Schedule Line Number
    pub sln: String,
    pub section: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub current_size: Option<u32>,
    pub max_size: Option<u32>,
    pub lower_credits: String,
    pub upper_credits: String,
    #[serde(default)]
    pub add_code_required: bool,
    pub gen_ed_marker: String,
    #[serde(default)]
    pub general_education: GeneralEducation,
    pub description: String,
    #[serde(default)]
    pub meetings: Vec<Meeting>,
}

impl CourseInfo {
    /// Set credits from a cell like `"3"` or `"2-5"`.
    ///
    /// Values stay strings so fractional credits keep their exact text.
    pub fn set_credits(&mut self, text: &str) {
        let mut tokens = text.split('-').map(str::trim);
        let lower = tokens.next().unwrap_or_default();
        let upper = tokens.next().unwrap_or(lower);
        self.lower_credits = lower.to_string();
        self.upper_credits = upper.to_string();
    }

    /// Whether `lower_credits <= upper_credits` holds when both are numeric.
    pub fn credits_consistent(&self) -> bool {
        match (
            self.lower_credits.parse::<f64>(),
            self.upper_credits.parse::<f64>(),
        ) {
            (Ok(lower), Ok(upper)) => lower <= upper,
            _ => true,
        }
    }
}

/// A course offering with its section details attached.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Course {
    pub department: String,
    pub number: String,
    pub name: String,
    pub section: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub quarter: String,
    pub year: String,
    #[serde(default)]
    pub meetings: Vec<Meeting>,
    pub course_info: CourseInfo,
    pub instructor: Instructor,
}

impl Course {
    /// Key that uniquely identifies an offering.
    pub fn offering_key(&self) -> String {
        format!(
            "{} {} {} {} {}",
            self.department, self.number, self.section, self.quarter, self.year
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instructor_with_middle_name() {
        let instructor = Instructor::from_cell_text("ZANDER,CAROL ANN");
        assert_eq!(instructor.last_name, "ZANDER");
        assert_eq!(instructor.first_name, "CAROL");
        assert_eq!(instructor.middle_name.as_deref(), Some("ANN"));
    }

    #[test]
    fn test_instructor_without_middle_name() {
        let instructor = Instructor::from_cell_text("SMITH,JOHN");
        assert_eq!(instructor.last_name, "SMITH");
        assert_eq!(instructor.first_name, "JOHN");
        assert_eq!(instructor.middle_name, None);
        assert_eq!(instructor.full_name(), "JOHN SMITH");
    }

    #[test]
    fn test_instructor_without_comma() {
        let instructor = Instructor::from_cell_text("STAFF");
        assert_eq!(instructor.last_name, "STAFF");
        assert!(instructor.first_name.is_empty());
        assert!(!instructor.is_unset());
    }

    #[test]
    fn test_fixed_credits() {
        let mut info = CourseInfo::default();
        info.set_credits("3");
        assert_eq!(info.lower_credits, "3");
        assert_eq!(info.upper_credits, "3");
    }

    #[test]
    fn test_ranged_credits() {
        let mut info = CourseInfo::default();
        info.set_credits("2-5");
        assert_eq!(info.lower_credits, "2");
        assert_eq!(info.upper_credits, "5");
        assert!(info.credits_consistent());
    }

    #[test]
    fn test_fractional_credits_keep_text() {
        let mut info = CourseInfo::default();
        info.set_credits("2.5");
        assert_eq!(info.lower_credits, "2.5");
        assert_eq!(info.upper_credits, "2.5");
    }

    #[test]
    fn test_inverted_credits_inconsistent() {
        let mut info = CourseInfo::default();
        info.set_credits("5-2");
        assert!(!info.credits_consistent());
    }

    #[test]
    fn test_general_education_marker() {
        let flags = GeneralEducation::from_marker("I&S, DIV");
        assert!(flags.is);
        assert!(flags.div);
        assert!(!flags.nw);
        assert!(!GeneralEducation::from_marker("").any());
    }

    #[test]
    fn test_course_serializes_nested_records() {
        let course = Course {
            department: "CSE".to_string(),
            number: "142".to_string(),
            kind: "LC".to_string(),
            ..Course::default()
        };
        let json = serde_json::to_value(&course).unwrap();
        assert_eq!(json["type"], "LC");
        assert!(json["course_info"].is_object());
        assert!(json["instructor"]["email"].is_null());
    }
}

// src/services/parser.rs

//! Course page parser.
//!
//! A course page carries four tables whose role is fixed by position:
//!
//! ```text
//! 0  general info   SLN | DEPT NUM | section | type | ... | credits | title | gen-ed
//! 1  enrollment     current | max | ... | ... | "Entry Code required"
//! 2  meetings       days | times | rooms | instructor
//! 3  notes          free text
//! ```
//!
//! Only the first data row of each table is read. Cells in the meetings
//! row hold one line per meeting location, and the lines are zipped
//! together into individual meetings.

use scraper::Html;

use crate::error::{AppError, Result};
use crate::models::{
    Course, CourseInfo, GeneralEducation, Instructor, Meeting, Row, ScheduleConfig, Table,
};
use crate::services::InstructorEnricher;
use crate::utils::html::extract_tables;

const TO_BE_ARRANGED: &str = "To be arranged";
const ENTRY_CODE_REQUIRED: &str = "Entry Code required";

/// Semantic role of a table on a course page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableRole {
    GeneralInfo,
    Enrollment,
    Meetings,
    Notes,
}

impl TableRole {
    pub fn name(self) -> &'static str {
        match self {
            TableRole::GeneralInfo => "general info",
            TableRole::Enrollment => "enrollment",
            TableRole::Meetings => "meetings",
            TableRole::Notes => "notes",
        }
    }
}

type Decoder = fn(&Row, &mut PageDraft) -> Result<()>;

/// Page layout: table roles in page order with their decoders.
const LAYOUT: [(TableRole, Decoder); 4] = [
    (TableRole::GeneralInfo, decode_general_info),
    (TableRole::Enrollment, decode_enrollment),
    (TableRole::Meetings, decode_meetings),
    (TableRole::Notes, decode_notes),
];

/// Records accumulated while decoding one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageDraft {
    pub course: Course,
    pub info: CourseInfo,
    pub instructor: Instructor,
    pub meetings: Vec<Meeting>,
}

impl PageDraft {
    /// Attach the section details and instructor to the course.
    pub fn into_course(self, quarter: &str, year: &str) -> Course {
        let PageDraft {
            mut course,
            mut info,
            instructor,
            meetings,
        } = self;

        info.meetings = meetings.clone();
        course.meetings = meetings;
        course.quarter = quarter.to_string();
        course.year = year.to_string();
        course.course_info = info;
        course.instructor = instructor;
        course
    }
}

/// Turns course page tables into a [`Course`].
pub struct ScheduleParser<'a> {
    enricher: Option<&'a InstructorEnricher>,
}

impl<'a> ScheduleParser<'a> {
    /// Create a parser; without an enricher instructor contacts stay unset.
    pub fn new(enricher: Option<&'a InstructorEnricher>) -> Self {
        Self { enricher }
    }

    /// Decode the tables of one page without any network access.
    pub fn decode(tables: &[Table]) -> Result<PageDraft> {
        if tables.len() > LAYOUT.len() {
            log::debug!(
                "Ignoring {} tables past the {} expected",
                tables.len() - LAYOUT.len(),
                LAYOUT.len()
            );
        }

        let mut draft = PageDraft::default();
        for (idx, (role, decode)) in LAYOUT.iter().enumerate() {
            let table = tables.get(idx).ok_or_else(|| {
                AppError::malformed(
                    role.name(),
                    format!("expected table at index {}, found {} tables", idx, tables.len()),
                )
            })?;
            let row = table
                .first_data_row()
                .ok_or_else(|| AppError::malformed(role.name(), "table has no data rows"))?;
            decode(row, &mut draft)?;
        }

        if !draft.info.credits_consistent() {
            log::warn!(
                "SLN {}: lower credits {} exceed upper credits {}",
                draft.info.sln,
                draft.info.lower_credits,
                draft.info.upper_credits
            );
        }
        Ok(draft)
    }

    /// Decode a page and enrich its instructor.
    pub async fn parse(&self, tables: &[Table], quarter: &str, year: &str) -> Result<Course> {
        let mut draft = Self::decode(tables)?;

        if let Some(enricher) = self.enricher {
            enricher.enrich(&mut draft.instructor).await?;
        }

        Ok(draft.into_course(quarter, year))
    }

    /// Extract the tables from rendered HTML and parse them.
    pub async fn parse_html(
        &self,
        html: &str,
        schedule: &ScheduleConfig,
        quarter: &str,
        year: &str,
    ) -> Result<Course> {
        let tables = {
            let document = Html::parse_document(html);
            extract_tables(&document, schedule)?
        };
        self.parse(&tables, quarter, year).await
    }
}

fn decode_general_info(row: &Row, draft: &mut PageDraft) -> Result<()> {
    if let Some(sln) = row.first_text(0) {
        draft.info.sln = sln.to_string();
    }

    // "CSE 142", or "C LIT 240" where the department itself has a space.
    if let Some(cell) = row.cell(1) {
        let text = cell.joined();
        match text.trim().rsplit_once(char::is_whitespace) {
            Some((dept, number)) => {
                draft.course.department = dept.trim().to_string();
                draft.course.number = number.to_string();
            }
            None => draft.course.department = text.trim().to_string(),
        }
    }

    if let Some(section) = row.first_text(2) {
        draft.course.section = section.to_string();
        draft.info.section = section.to_string();
    }
    if let Some(kind) = row.first_text(3) {
        draft.course.kind = kind.to_string();
        draft.info.kind = kind.to_string();
    }

    let (credits_idx, name_idx, gen_ed_idx) = if row.len() >= 8 { (5, 6, 7) } else { (4, 5, 6) };

    if let Some(credits) = row.cell(credits_idx).filter(|c| !c.is_empty()) {
        draft.info.set_credits(&credits.joined());
    }
    if let Some(name) = row.cell(name_idx) {
        draft.course.name = name.joined();
    }
    if let Some(marker) = row.cell(gen_ed_idx) {
        draft.info.gen_ed_marker = marker.joined();
        draft.info.general_education = GeneralEducation::from_marker(&draft.info.gen_ed_marker);
        if !draft.info.gen_ed_marker.is_empty() && !draft.info.general_education.any() {
            log::debug!(
                "Unrecognized gen-ed marker '{}' for SLN {}",
                draft.info.gen_ed_marker,
                draft.info.sln
            );
        }
    }
    Ok(())
}

fn decode_enrollment(row: &Row, draft: &mut PageDraft) -> Result<()> {
    draft.info.current_size = row.first_text(0).and_then(parse_size);
    draft.info.max_size = row.first_text(1).and_then(parse_size);
    draft.info.add_code_required = row
        .cell(4)
        .is_some_and(|cell| cell.joined() == ENTRY_CODE_REQUIRED);
    Ok(())
}

fn parse_size(text: &str) -> Option<u32> {
    text.trim().parse().ok()
}

fn decode_meetings(row: &Row, draft: &mut PageDraft) -> Result<()> {
    let days = row.fragments(0);
    if days.first() == Some(&TO_BE_ARRANGED) {
        return Ok(());
    }

    let times = row.fragments(1);
    let rooms = row.fragments(2);
    for (column, values) in [("times", &times), ("rooms", &rooms)] {
        if values.len() != days.len() {
            return Err(AppError::malformed(
                TableRole::Meetings.name(),
                format!(
                    "{} days but {} {} for SLN {}",
                    days.len(),
                    values.len(),
                    column,
                    draft.info.sln
                ),
            ));
        }
    }

    draft.meetings = days
        .iter()
        .zip(&times)
        .zip(&rooms)
        .map(|((day, time), room)| {
            let (start_time, end_time) = split_time_range(time);
            let (room_building, room_number) = split_room(room);
            Meeting {
                days: day.to_string(),
                start_time,
                end_time,
                room_building,
                room_number,
            }
        })
        .collect();

    if let Some(name) = row.first_text(3) {
        draft.instructor = Instructor::from_cell_text(name);
    }
    Ok(())
}

/// Split `"1030-1120"` into start and end.
fn split_time_range(text: &str) -> (String, String) {
    match text.split_once('-') {
        Some((start, end)) => (start.trim().to_string(), end.trim().to_string()),
        None => (text.trim().to_string(), String::new()),
    }
}

/// Split `"MGH 241"` into building and room number.
fn split_room(text: &str) -> (String, String) {
    let mut parts = text.split_whitespace();
    let building = parts.next().unwrap_or_default().to_string();
    let number = parts.collect::<Vec<_>>().join(" ");
    (building, number)
}

fn decode_notes(row: &Row, draft: &mut PageDraft) -> Result<()> {
    if let Some(cell) = row.cell(0) {
        draft.info.description = cell.lines().join("\n");
    }
    Ok(())
}

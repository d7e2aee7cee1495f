//! Render models for the list, marker popovers, and the detail view.
//!
//! Every free-text field originates from backend data, so each one passes
//! through [`escape_html`] here, before any templating layer sees it.

use serde::Serialize;
use shelter_core::{GeoPoint, ShelterRecord};

use crate::directory::ShelterDirectory;
use crate::links::MapLinks;

const UNNAMED: &str = "Unnamed shelter";
const NO_ADDRESS: &str = "No address";
const UNKNOWN: &str = "Unknown";

/// Escapes `& < > " '` for safe embedding in HTML text or attributes.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

fn escaped_or(value: Option<&str>, placeholder: &str) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => escape_html(v),
        _ => placeholder.to_owned(),
    }
}

fn distance_label(record: &ShelterRecord) -> Option<String> {
    record.distance_from_user.map(|km| format!("{km:.2}km"))
}

fn capacity_label(record: &ShelterRecord) -> String {
    record
        .accommodation_capacity
        .map_or_else(|| UNKNOWN.to_owned(), |n| format!("{n} people"))
}

/// One row of the shelter list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListItem {
    pub index: usize,
    pub name: String,
    pub distance_label: Option<String>,
    pub address: String,
    pub capacity_label: String,
    pub contact: String,
}

impl ListItem {
    #[must_use]
    pub fn from_record(index: usize, record: &ShelterRecord) -> Self {
        Self {
            index,
            name: escaped_or(record.name.as_deref(), UNNAMED),
            distance_label: distance_label(record),
            address: escaped_or(record.address.as_deref(), NO_ADDRESS),
            capacity_label: capacity_label(record),
            contact: escaped_or(record.contact_number.as_deref(), UNKNOWN),
        }
    }
}

/// The whole list, with an explicit empty state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DirectoryView {
    Empty,
    Items { count: usize, items: Vec<ListItem> },
}

impl DirectoryView {
    #[must_use]
    pub fn from_directory(directory: &ShelterDirectory) -> Self {
        if directory.is_empty() {
            return DirectoryView::Empty;
        }
        let items: Vec<ListItem> = directory
            .iter()
            .map(|(index, record)| ListItem::from_record(index, record))
            .collect();
        DirectoryView::Items {
            count: items.len(),
            items,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            DirectoryView::Empty => 0,
            DirectoryView::Items { count, .. } => *count,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Content of the info panel attached to a shelter marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopoverContent {
    /// Directory index the detail button refers back to.
    pub index: usize,
    pub name: String,
    pub distance_label: Option<String>,
    pub capacity_label: String,
    pub map_link: Option<String>,
}

impl PopoverContent {
    #[must_use]
    pub fn from_record(
        index: usize,
        record: &ShelterRecord,
        links: &MapLinks,
        user: Option<GeoPoint>,
    ) -> Self {
        Self {
            index,
            name: escaped_or(record.name.as_deref(), "Shelter"),
            distance_label: distance_label(record),
            capacity_label: capacity_label(record),
            map_link: links.for_record(record, user),
        }
    }
}

/// Every field of one shelter, for the detail view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShelterDetail {
    pub index: usize,
    /// Plain title text; the view sets it as text, not markup.
    pub title: String,
    pub name: String,
    pub address: String,
    pub distance_label: Option<String>,
    pub capacity_label: String,
    pub facility_area: String,
    pub management_agency: String,
    pub contact: String,
    pub designation_date: String,
    pub directions_link: Option<String>,
}

impl ShelterDetail {
    #[must_use]
    pub fn from_record(
        index: usize,
        record: &ShelterRecord,
        links: &MapLinks,
        user: Option<GeoPoint>,
    ) -> Self {
        Self {
            index,
            title: record
                .name
                .clone()
                .unwrap_or_else(|| "Shelter information".to_owned()),
            name: escaped_or(record.name.as_deref(), UNKNOWN),
            address: escaped_or(record.address.as_deref(), UNKNOWN),
            distance_label: distance_label(record),
            capacity_label: capacity_label(record),
            facility_area: escaped_or(record.facility_area.as_deref(), UNKNOWN),
            management_agency: escaped_or(record.management_agency.as_deref(), UNKNOWN),
            contact: escaped_or(record.contact_number.as_deref(), UNKNOWN),
            designation_date: escaped_or(record.designation_date.as_deref(), UNKNOWN),
            directions_link: links.for_record(record, user),
        }
    }
}

use csv::{Reader, StringRecord, WriterBuilder};
use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{PlannerError, Result};
use crate::phone::normalize_phone;
use crate::seating::Unit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Meal {
    Vegan,
    #[default]
    Chicken,
    Allergy,
    Beef,
    #[serde(rename = "Kid-Friendly")]
    KidFriendly,
}

impl Meal {
    /// Parses a meal choice, falling back to chicken for anything unknown
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "Vegan" => Meal::Vegan,
            "Allergy" => Meal::Allergy,
            "Beef" => Meal::Beef,
            "Kid-Friendly" => Meal::KidFriendly,
            _ => Meal::Chicken,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Meal::Vegan => "Vegan",
            Meal::Chicken => "Chicken",
            Meal::Allergy => "Allergy",
            Meal::Beef => "Beef",
            Meal::KidFriendly => "Kid-Friendly",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guest {
    pub first_name: String,
    pub last_name: String,
    pub meal: Meal,
    pub allergies: String,
    pub age: u32,
}

/// One registration: a household attending together
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Family {
    pub email: String,
    pub phone: String,
    pub address: String,
    pub requests: String,
    pub submitted: NaiveDateTime,
    pub guests: Vec<Guest>,
}

impl Family {
    pub fn first_name(&self) -> &str {
        self.guests.first().map(|g| g.first_name.as_str()).unwrap_or("")
    }

    pub fn last_name(&self) -> &str {
        self.guests.first().map(|g| g.last_name.as_str()).unwrap_or("")
    }

    pub fn size(&self) -> u32 {
        self.guests.len() as u32
    }

    /// Seating unit for this family, keyed by email
    pub fn to_unit(&self) -> Unit {
        Unit::new(&self.email, self.first_name(), self.last_name(), self.size())
            .submitted_at(self.submitted)
    }
}

/// Parses a submission time written as ISO-8601 date-time or date
fn parse_submission_time(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Finds a column by exact header name, ignoring surrounding whitespace and a BOM
fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
}

fn required_column(headers: &StringRecord, name: &str) -> Result<usize> {
    find_column(headers, name).ok_or_else(|| PlannerError::MissingColumn(name.to_string(), "guest list"))
}

struct TicketColumns {
    first_name: Option<usize>,
    last_name: Option<usize>,
    age: Option<usize>,
    meal: Option<usize>,
    allergies: Option<usize>,
}

impl TicketColumns {
    fn find(headers: &StringRecord, ticket: usize) -> Self {
        let col = |label: &str| find_column(headers, &format!("{} (Ticket {})", label, ticket));
        Self {
            first_name: col("First Name"),
            last_name: col("Last Name"),
            age: col("Age"),
            meal: col("Meal Choice"),
            allergies: col("List Allergies"),
        }
    }
}

fn field<'r>(record: &'r StringRecord, col: Option<usize>) -> &'r str {
    col.and_then(|c| record.get(c)).unwrap_or("").trim()
}

/// Loads families from a guest list CSV file
pub fn load_families<P: AsRef<Path>>(csv_path: P) -> Result<Vec<Family>> {
    let file = std::fs::File::open(csv_path)?;
    load_families_from_reader(file)
}

/// Loads families from guest list CSV data.
///
/// A later submission from the same email replaces the earlier one. Rows
/// without tickets, guests, email or a readable submission time are skipped.
/// Families come back ordered by submission time.
pub fn load_families_from_reader<R: Read>(input: R) -> Result<Vec<Family>> {
    let mut reader = Reader::from_reader(input);
    let headers = reader.headers()?.clone();

    let tickets_col = required_column(&headers, "Tickets")?;
    let email_col = required_column(&headers, "Email")?;
    let submitted_col = required_column(&headers, "Submission time")?;
    let phone_col = find_column(&headers, "Phone");
    let address_col = find_column(&headers, "Mailing Address");
    let requests_col = find_column(&headers, "Additional Requests:");

    let mut ticket_columns: Vec<TicketColumns> = Vec::new();
    let mut families_map: HashMap<String, Family> = HashMap::new();

    for (row, result) in reader.records().enumerate() {
        let record = result?;
        let line = row + 2;

        let tickets: usize = match field(&record, Some(tickets_col)).parse() {
            Ok(n) => n,
            Err(_) => {
                warn!(line, "skipping row with unreadable ticket count");
                continue;
            }
        };
        if tickets == 0 {
            continue;
        }

        let email = field(&record, Some(email_col)).to_lowercase();
        if email.is_empty() {
            warn!(line, "skipping row without email");
            continue;
        }

        let Some(submitted) = parse_submission_time(field(&record, Some(submitted_col))) else {
            warn!(line, email = %email, "skipping row with unreadable submission time");
            continue;
        };

        while ticket_columns.len() < tickets {
            let ticket = ticket_columns.len() + 1;
            ticket_columns.push(TicketColumns::find(&headers, ticket));
        }

        let guests: Vec<Guest> = ticket_columns[..tickets]
            .iter()
            .filter_map(|cols| {
                let first_name = field(&record, cols.first_name);
                if first_name.is_empty() {
                    return None;
                }
                Some(Guest {
                    first_name: first_name.to_string(),
                    last_name: field(&record, cols.last_name).to_string(),
                    meal: Meal::parse(field(&record, cols.meal)),
                    allergies: field(&record, cols.allergies).to_string(),
                    age: field(&record, cols.age).parse().unwrap_or(0),
                })
            })
            .collect();

        if guests.is_empty() {
            warn!(line, email = %email, "skipping row without named guests");
            continue;
        }

        let family = Family {
            email: email.clone(),
            phone: normalize_phone(field(&record, phone_col)),
            address: field(&record, address_col).to_string(),
            requests: field(&record, requests_col).to_string(),
            submitted,
            guests,
        };

        match families_map.get(&email) {
            Some(existing) if existing.submitted > family.submitted => {
                debug!(email = %email, "keeping newer submission");
            }
            Some(_) => {
                debug!(email = %email, "resubmission replaces earlier entry");
                families_map.insert(email, family);
            }
            None => {
                families_map.insert(email, family);
            }
        }
    }

    let mut families: Vec<Family> = families_map.into_values().collect();
    sort_by_submission(&mut families);
    Ok(families)
}

/// Orders families by submission time, then email
pub fn sort_by_submission(families: &mut [Family]) {
    families.sort_by(|a, b| a.submitted.cmp(&b.submitted).then_with(|| a.email.cmp(&b.email)));
}

/// Drops duplicate registrations sharing a phone number or mailing address.
/// The earliest submission wins; empty values never count as duplicates.
pub fn unique_families(mut families: Vec<Family>) -> Vec<Family> {
    sort_by_submission(&mut families);
    let mut seen_phones: HashSet<String> = HashSet::new();
    let mut seen_addresses: HashSet<String> = HashSet::new();

    families
        .into_iter()
        .filter(|family| {
            let phone_seen = !family.phone.is_empty() && seen_phones.contains(&family.phone);
            let address_seen = !family.address.is_empty() && seen_addresses.contains(&family.address);
            if phone_seen || address_seen {
                warn!(email = %family.email, "dropping duplicate registration");
                return false;
            }
            if !family.phone.is_empty() {
                seen_phones.insert(family.phone.clone());
            }
            if !family.address.is_empty() {
                seen_addresses.insert(family.address.clone());
            }
            true
        })
        .collect()
}

/// Writes families to CSV, sorted by last name
pub fn write_families_csv<P: AsRef<Path>>(families: &[Family], path: P) -> Result<()> {
    let mut sorted: Vec<&Family> = families.iter().collect();
    sorted.sort_by(|a, b| a.last_name().cmp(b.last_name()).then_with(|| a.email.cmp(&b.email)));

    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.write_record(["Last Name", "First Name", "Email", "Phone", "Tickets", "Address"])?;
    for family in sorted {
        let tickets = family.size().to_string();
        wtr.write_record([
            family.last_name(),
            family.first_name(),
            family.email.as_str(),
            family.phone.as_str(),
            tickets.as_str(),
            family.address.as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

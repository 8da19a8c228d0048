use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use csv::WriterBuilder;
use tracing::warn;

use crate::error::Result;
use crate::parser::{Family, Guest, Meal};

use super::results::AreasDocument;

fn placeholder_guests(email: &str, size: u32) -> Vec<Guest> {
    (1..=size)
        .map(|i| Guest {
            first_name: format!("Guest{}", i),
            last_name: email.to_string(),
            meal: Meal::Chicken,
            allergies: String::new(),
            age: 0,
        })
        .collect()
}

/// Maps each table number to the guests seated there.
///
/// Parts of a split family take the family's guests in the order the parts
/// are met. Emails missing from `families` get placeholder guests.
pub fn expand_areas_to_guests(
    doc: &AreasDocument,
    families: &HashMap<String, Family>,
) -> BTreeMap<u32, Vec<Guest>> {
    let mut consumed: HashMap<&str, usize> = HashMap::new();
    let mut result: BTreeMap<u32, Vec<Guest>> = BTreeMap::new();

    for table in doc.tables() {
        let seated = result.entry(table.table).or_default();
        for unit in &table.units {
            match families.get(&unit.email) {
                Some(family) => {
                    let offset = consumed.entry(unit.email.as_str()).or_insert(0);
                    let guests: Vec<Guest> = family
                        .guests
                        .iter()
                        .skip(*offset)
                        .take(unit.size as usize)
                        .cloned()
                        .collect();
                    *offset += guests.len();
                    seated.extend(guests);
                }
                None => {
                    warn!(email = %unit.email, "no registration for seated unit; using placeholders");
                    seated.extend(placeholder_guests(&unit.email, unit.size));
                }
            }
        }
    }
    result
}

/// Writes one row per guest, tables in numeric order
pub fn write_guest_csv<P: AsRef<Path>>(tables: &BTreeMap<u32, Vec<Guest>>, path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.write_record(["table", "first_name", "last_name", "meal_choice", "allergies", "age"])?;
    for (table, guests) in tables {
        let table = table.to_string();
        for guest in guests {
            let age = guest.age.to_string();
            wtr.write_record([
                table.as_str(),
                guest.first_name.as_str(),
                guest.last_name.as_str(),
                guest.meal.as_str(),
                guest.allergies.as_str(),
                age.as_str(),
            ])?;
        }
    }
    wtr.flush()?;
    Ok(())
}

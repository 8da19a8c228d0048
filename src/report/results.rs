use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::display::write_layout_to_file;
use crate::error::Result;
use crate::seating::{numbered_tables, Area, Conflict, SeatingPlan, Unit};

pub const AREAS_FILE: &str = "areas.json";
pub const CONFLICTS_FILE: &str = "conflicts.json";
pub const LAYOUT_FILE: &str = "layout.txt";

fn is_zero(part: &u32) -> bool {
    *part == 0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitRecord {
    pub email: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub part: u32,
    #[serde(default)]
    pub first: String,
    #[serde(default)]
    pub last: String,
    pub size: u32,
}

impl From<&Unit> for UnitRecord {
    fn from(unit: &Unit) -> Self {
        Self {
            email: unit.key.email.clone(),
            part: unit.key.part,
            first: unit.first_name.clone(),
            last: unit.last_name.clone(),
            size: unit.size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRecord {
    pub table: u32,
    pub units: Vec<UnitRecord>,
}

impl TableRecord {
    pub fn seated(&self) -> u32 {
        self.units.iter().map(|u| u.size).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaRecord {
    pub area: usize,
    pub tables: Vec<TableRecord>,
}

/// Serialized form of the areas, with plan-wide table numbers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AreasDocument {
    pub areas: Vec<AreaRecord>,
}

impl AreasDocument {
    pub fn from_areas(areas: &[Area]) -> Self {
        let mut records: Vec<AreaRecord> = areas
            .iter()
            .enumerate()
            .map(|(area, _)| AreaRecord {
                area,
                tables: Vec::new(),
            })
            .collect();
        for (area_idx, number, table) in numbered_tables(areas) {
            records[area_idx].tables.push(TableRecord {
                table: number,
                units: table.units().iter().map(UnitRecord::from).collect(),
            });
        }
        Self { areas: records }
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableRecord> {
        self.areas.iter().flat_map(|a| a.tables.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictRecord {
    pub family: UnitRecord,
    pub requested: UnitRecord,
    pub reason: String,
}

pub fn conflict_records(conflicts: &[Conflict]) -> Vec<ConflictRecord> {
    conflicts
        .iter()
        .map(|c| ConflictRecord {
            family: UnitRecord::from(&c.requester),
            requested: UnitRecord::from(&c.requested),
            reason: c.reason.to_string(),
        })
        .collect()
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}

/// Writes areas.json, conflicts.json and layout.txt into `out_dir`
pub fn write_seating_results(plan: &SeatingPlan, out_dir: &Path) -> Result<()> {
    fs::create_dir_all(out_dir)?;

    write_json(&AreasDocument::from_areas(&plan.areas), &out_dir.join(AREAS_FILE))?;
    write_json(&conflict_records(&plan.conflicts), &out_dir.join(CONFLICTS_FILE))?;
    write_layout_to_file(plan, &out_dir.join(LAYOUT_FILE))?;

    info!(dir = %out_dir.display(), "seating results written");
    Ok(())
}

/// Reads an areas.json file back, including hand-edited ones
pub fn load_areas<P: AsRef<Path>>(path: P) -> Result<AreasDocument> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seating::testing::unit;
    use crate::seating::{create_seating_plan, RequestMap};

    fn sample_plan() -> SeatingPlan {
        let smith = unit("John", "Smith", 12);
        let jones = unit("Ava", "Jones", 2);
        let mut requests = RequestMap::new();
        requests.insert(jones.clone(), vec![smith.clone(), unit("Gone", "Missing", 1)]);
        create_seating_plan(&[smith, jones], &requests, 10)
    }

    #[test]
    fn test_areas_document_numbers_tables() {
        let plan = sample_plan();
        let doc = AreasDocument::from_areas(&plan.areas);

        let numbers: Vec<u32> = doc.tables().map(|t| t.table).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert_eq!(doc.tables().map(TableRecord::seated).sum::<u32>(), 14);
        assert_eq!(doc.areas[0].tables[0].units[0].part, 0);
        assert_eq!(doc.areas[0].tables[1].units[0].part, 1);
    }

    #[test]
    fn test_part_omitted_when_zero() {
        let record = UnitRecord::from(&unit("Ava", "Jones", 2));
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("part").is_none());
        assert_eq!(json["first"], "Ava");
    }

    #[test]
    fn test_write_and_load_results() {
        let dir = tempfile::tempdir().unwrap();
        let plan = sample_plan();

        write_seating_results(&plan, dir.path()).unwrap();

        let doc = load_areas(dir.path().join(AREAS_FILE)).unwrap();
        assert_eq!(doc, AreasDocument::from_areas(&plan.areas));

        let conflicts: Vec<ConflictRecord> =
            serde_json::from_str(&fs::read_to_string(dir.path().join(CONFLICTS_FILE)).unwrap()).unwrap();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].family.last, "Jones");
        assert_eq!(conflicts[0].reason, "Requested family not found");

        let layout = fs::read_to_string(dir.path().join(LAYOUT_FILE)).unwrap();
        assert!(layout.contains("Table 2"));
    }

    #[test]
    fn test_load_hand_edited_areas() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(AREAS_FILE);
        fs::write(
            &path,
            r#"{"areas":[{"area":0,"tables":[{"table":7,"units":[{"email":"x@example.com","size":3}]}]}]}"#,
        )
        .unwrap();

        let doc = load_areas(&path).unwrap();
        let table = doc.tables().next().unwrap();
        assert_eq!(table.table, 7);
        assert_eq!(table.units[0].last, "");
        assert_eq!(table.seated(), 3);
    }
}

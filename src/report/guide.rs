use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;

use super::results::AreasDocument;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuideEntry {
    pub last_name: String,
    pub initial: Option<char>,
    pub table: u32,
}

impl GuideEntry {
    pub fn line(&self) -> String {
        match self.initial {
            Some(initial) => format!("{}, {}. — Table {}", self.last_name, initial, self.table),
            None => format!("{} — Table {}", self.last_name, self.table),
        }
    }
}

/// Upper-cases the first letter of every word, lower-cases the rest.
/// Letters after an apostrophe or hyphen start a new word.
pub fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut start = true;
    for c in name.trim().chars() {
        if c.is_alphabetic() {
            if start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            start = false;
        } else {
            out.push(c);
            start = true;
        }
    }
    out
}

/// Alphabetical lookup of each seated family's table
pub fn build_seating_guide(doc: &AreasDocument) -> Vec<GuideEntry> {
    let mut entries: Vec<GuideEntry> = Vec::new();
    for table in doc.tables() {
        for unit in &table.units {
            let entry = GuideEntry {
                last_name: title_case(&unit.last),
                initial: unit
                    .first
                    .trim()
                    .chars()
                    .next()
                    .and_then(|c| c.to_uppercase().next()),
                table: table.table,
            };
            // parts of one family at the same table
            if !entries.contains(&entry) {
                entries.push(entry);
            }
        }
    }

    entries.sort_by(|a, b| {
        a.last_name
            .to_lowercase()
            .cmp(&b.last_name.to_lowercase())
            .then_with(|| a.initial.cmp(&b.initial))
            .then_with(|| a.table.cmp(&b.table))
    });
    entries
}

pub fn write_seating_guide<P: AsRef<Path>>(doc: &AreasDocument, path: P) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for entry in build_seating_guide(doc) {
        writeln!(writer, "{}", entry.line())?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::results::{AreaRecord, TableRecord, UnitRecord};

    fn record(first: &str, last: &str, part: u32) -> UnitRecord {
        UnitRecord {
            email: format!("{}@example.com", last.to_lowercase()),
            part,
            first: first.to_string(),
            last: last.to_string(),
            size: 2,
        }
    }

    fn doc() -> AreasDocument {
        AreasDocument {
            areas: vec![
                AreaRecord {
                    area: 0,
                    tables: vec![
                        TableRecord {
                            table: 1,
                            units: vec![record("john", "SMITH", 0), record("Ava", "o'neil", 0)],
                        },
                        TableRecord {
                            table: 2,
                            units: vec![record("john", "SMITH", 1), record("", "baker", 0)],
                        },
                    ],
                },
                AreaRecord {
                    area: 1,
                    tables: vec![TableRecord {
                        table: 3,
                        units: vec![record("Ann", "Smith", 0), record("Zed", "adams", 0)],
                    }],
                },
            ],
        }
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("SMITH"), "Smith");
        assert_eq!(title_case("o'neil"), "O'Neil");
        assert_eq!(title_case("van der berg-jones"), "Van Der Berg-Jones");
    }

    #[test]
    fn test_guide_sorted_by_last_then_initial() {
        let lines: Vec<String> = build_seating_guide(&doc()).iter().map(GuideEntry::line).collect();
        assert_eq!(
            lines,
            vec![
                "Adams, Z. — Table 3",
                "Baker — Table 2",
                "O'Neil, A. — Table 1",
                "Smith, A. — Table 3",
                "Smith, J. — Table 1",
                "Smith, J. — Table 2",
            ]
        );
    }

    #[test]
    fn test_write_seating_guide() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guide.txt");

        write_seating_guide(&doc(), &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 6);
        assert!(text.starts_with("Adams, Z. — Table 3\n"));
    }
}

use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::error::Result;

use super::results::AreasDocument;

/// Seated guests per table, grouped by count
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TableSizes {
    pub guests: u32,
    pub families: usize,
    /// Seated count -> table numbers, in layout order
    pub sizes: BTreeMap<u32, Vec<u32>>,
}

pub fn table_sizes(doc: &AreasDocument) -> TableSizes {
    let mut sizes: BTreeMap<u32, Vec<u32>> = BTreeMap::new();
    let mut emails: HashSet<&str> = HashSet::new();
    let mut guests = 0;

    for table in doc.tables() {
        let seated = table.seated();
        guests += seated;
        sizes.entry(seated).or_default().push(table.table);
        emails.extend(table.units.iter().map(|u| u.email.as_str()));
    }

    TableSizes {
        guests,
        families: emails.len(),
        sizes,
    }
}

impl TableSizes {
    pub fn render(&self) -> String {
        let mut lines = vec![format!("Guests: {}", self.guests), format!("Families: {}", self.families)];
        for (size, tables) in &self.sizes {
            lines.push(format!("{}:", size));
            lines.extend(tables.iter().map(|t| format!("  {}", t)));
        }
        lines.join("\n")
    }
}

pub fn write_table_sizes<P: AsRef<Path>>(sizes: &TableSizes, path: P) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "{}", sizes.render())?;
    writer.flush()?;
    Ok(())
}

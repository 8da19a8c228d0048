use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::seating::{numbered_tables, Area, SeatingPlan};

/// Formats a unit line: "First Last (size N)"
pub fn format_unit_line(name: &str, size: u32) -> String {
    format!("{} (size {})", name, size)
}

/// Renders areas, tables and seated units as a plain-text block.
///
/// Areas are numbered from 0, tables carry their plan-wide number from 1.
pub fn render_layout(areas: &[Area]) -> String {
    let mut lines = Vec::new();
    let mut current_area = None;

    for (area_idx, number, table) in numbered_tables(areas) {
        if current_area != Some(area_idx) {
            if current_area.is_some() {
                lines.push(String::new());
            }
            lines.push(format!("==================== AREA {} ====================", area_idx));
            current_area = Some(area_idx);
        }
        lines.push(format!("  Table {} ({}/{} seats):", number, table.used(), table.capacity()));
        for unit in table.units() {
            lines.push(format!("    - {}", format_unit_line(&unit.display_name(), unit.size)));
        }
    }

    lines.join("\n")
}

/// Writes the layout block to a file, with a header line
pub fn write_layout_to_file(plan: &SeatingPlan, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    writeln!(file, "** Seating Layout **")?;
    writeln!(file, "{}", plan.layout)?;
    Ok(())
}

/// Prints a seating plan summary, the conflicts and the layout
pub fn print_seating_plan(plan: &SeatingPlan) {
    println!("\n==================== SEATING LAYOUT ====================");
    println!(
        "Areas: {}  Tables: {}  Guests seated: {}",
        plan.areas.len(),
        plan.table_count(),
        plan.seated_guests()
    );

    if !plan.conflicts.is_empty() {
        println!("⚠️  Unmet requests ({}):", plan.conflicts.len());
        for conflict in &plan.conflicts {
            println!(
                "  - {} -> {}: {}",
                conflict.requester.display_name(),
                conflict.requested.display_name(),
                conflict.reason
            );
        }
    }

    println!("\n{}", plan.layout);
    println!("========================================================\n");
}

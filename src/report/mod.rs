//! Files produced from a finished seating plan: the saved areas and
//! conflicts, plus the guide, table size summary and placecards sheet that
//! are derived from a saved areas.json.

pub mod results;
pub mod guide;
pub mod sizes;
pub mod placecards;

pub use results::{conflict_records, load_areas, write_seating_results, AreasDocument};
pub use guide::write_seating_guide;
pub use sizes::{table_sizes, write_table_sizes};
pub use placecards::{expand_areas_to_guests, write_guest_csv};

mod config;
mod display;
mod error;
mod logging;
mod parser;
mod payment;
mod phone;
mod pipeline;
mod report;
mod seating;
mod web;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use config::SeatingArgs;
use display::print_seating_plan;
use parser::{load_families, unique_families, write_families_csv, Family};
use payment::{load_payments, match_families_with_payments};
use pipeline::plan_families;
use report::{
    expand_areas_to_guests, load_areas, table_sizes, write_guest_csv, write_seating_guide, write_seating_results,
    write_table_sizes,
};

#[derive(Debug, Parser)]
#[command(name = "seating-planner", version, about = "Seats event guests at tables, honouring who asked to sit with whom")]
struct Cli {
    /// Log level when SEATING_LOG / RUST_LOG are unset
    #[arg(long, global = true, env = "SEATING_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Shorthand for --log-level debug
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Seat everyone in a guest list and write areas.json, conflicts.json and layout.txt
    Assign {
        guests: PathBuf,

        /// Payment export; only families with a matching payment are seated
        #[arg(long)]
        payments: Option<PathBuf>,

        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,

        #[command(flatten)]
        seating: SeatingArgs,
    },
    /// Alphabetical "who sits where" list from areas.json
    Guide { areas: PathBuf, out: PathBuf },
    /// Tables grouped by how many guests they seat
    Sizes { areas: PathBuf, out: PathBuf },
    /// One CSV row per guest for printing placecards
    Placecards {
        areas: PathBuf,
        guests: PathBuf,
        out: PathBuf,
    },
    /// Serve the upload and layout API
    Web {
        #[arg(long, default_value_t = 8080)]
        port: u16,

        #[command(flatten)]
        seating: SeatingArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { cli.log_level.as_str() };
    logging::init_logger(level);

    match cli.command {
        Command::Assign {
            guests,
            payments,
            out,
            seating,
        } => assign(&guests, payments.as_deref(), &out, &seating),
        Command::Guide { areas, out } => {
            let doc = load_areas(&areas).with_context(|| format!("reading {}", areas.display()))?;
            write_seating_guide(&doc, &out).with_context(|| format!("writing {}", out.display()))?;
            info!(path = %out.display(), "seating guide written");
            Ok(())
        }
        Command::Sizes { areas, out } => {
            let doc = load_areas(&areas).with_context(|| format!("reading {}", areas.display()))?;
            let sizes = table_sizes(&doc);
            write_table_sizes(&sizes, &out).with_context(|| format!("writing {}", out.display()))?;
            info!(path = %out.display(), guests = sizes.guests, "table sizes written");
            Ok(())
        }
        Command::Placecards { areas, guests, out } => {
            let doc = load_areas(&areas).with_context(|| format!("reading {}", areas.display()))?;
            let lookup: HashMap<String, Family> = load_families(&guests)
                .with_context(|| format!("reading {}", guests.display()))?
                .into_iter()
                .map(|f| (f.email.clone(), f))
                .collect();
            let tables = expand_areas_to_guests(&doc, &lookup);
            write_guest_csv(&tables, &out).with_context(|| format!("writing {}", out.display()))?;
            info!(path = %out.display(), tables = tables.len(), "placecards written");
            Ok(())
        }
        Command::Web { port, seating } => {
            let config = seating.to_config()?;
            let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string());

            info!(port, "starting web server");
            println!("Access the site at http://localhost:{}", port);

            web::start_server(port, password, config).await?;
            Ok(())
        }
    }
}

fn assign(guests: &Path, payments: Option<&Path>, out: &Path, seating: &SeatingArgs) -> Result<()> {
    let config = seating.to_config()?;

    let families = load_families(guests).with_context(|| format!("reading {}", guests.display()))?;
    info!(families = families.len(), "loaded guest list (resubmissions merged)");
    let mut families = unique_families(families);

    if let Some(path) = payments {
        let payments = load_payments(path).with_context(|| format!("reading {}", path.display()))?;
        let (paid, used) = match_families_with_payments(&families, &payments);
        info!(payments = payments.len(), matched = used.len(), paid = paid.len(), "reconciled payments");

        for payment in payments.iter().filter(|p| !used.contains(p)) {
            let name = format!("{} {}", payment.first_name, payment.last_name);
            warn!(
                order = %payment.order_number,
                name = %name.trim(),
                email = %payment.email,
                "payment without a registration"
            );
        }

        let paid_emails: Vec<String> = paid.iter().map(|f| f.email.clone()).collect();
        let (paid, unpaid): (Vec<Family>, Vec<Family>) =
            families.into_iter().partition(|f| paid_emails.contains(&f.email));
        for family in &unpaid {
            warn!(email = %family.email, "registration without payment; not seated");
        }

        std::fs::create_dir_all(out).with_context(|| format!("creating {}", out.display()))?;
        let unpaid_path = out.join("unpaid.csv");
        write_families_csv(&unpaid, &unpaid_path).with_context(|| format!("writing {}", unpaid_path.display()))?;
        families = paid;
    }

    let plan = plan_families(&families, &config);
    print_seating_plan(&plan);

    for conflict in &plan.conflicts {
        warn!(
            family = %conflict.requester.key,
            requested = %conflict.requested.key,
            reason = %conflict.reason,
            "unmet seating request"
        );
    }

    write_seating_results(&plan, out).with_context(|| format!("writing results to {}", out.display()))?;
    println!("Results saved to {}", out.display());
    Ok(())
}

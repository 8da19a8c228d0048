use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `SEATING_LOG` or `RUST_LOG` override
/// `level` when set. Events go to stderr so printed layouts stay clean.
pub fn init_logger(level: &str) {
    let env_filter = EnvFilter::try_from_env("SEATING_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(format!("info,seating_planner={}", level)));

    // `log` records from actix middleware are forwarded through tracing-log
    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .try_init();

    if let Err(e) = installed {
        tracing::debug!(error = %e, "global subscriber already installed; keeping it");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_install_is_ignored() {
        init_logger("debug");
        init_logger("info");
        tracing::info!("logger still usable");
    }
}

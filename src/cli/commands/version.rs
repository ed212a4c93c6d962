//! Version command - print the version a run would produce

use crate::cli::args::VersionArgs;
use crate::error::{SlipwayError, SlipwayResult};
use crate::pipeline::RUN_NUMBER_VAR;
use crate::version::VersionResolver;
use chrono::Utc;

/// Execute the version command
pub async fn execute(args: VersionArgs) -> SlipwayResult<()> {
    let date = args.date.unwrap_or_else(|| Utc::now().date_naive());

    let ordinal = match args.ordinal {
        Some(ordinal) => ordinal,
        None => {
            let raw = std::env::var(RUN_NUMBER_VAR).map_err(|_| SlipwayError::EnvMissing {
                var: RUN_NUMBER_VAR.to_string(),
            })?;
            raw.trim().parse().map_err(|_| SlipwayError::EnvInvalid {
                var: RUN_NUMBER_VAR.to_string(),
                reason: format!("expected a positive integer, got {:?}", raw),
            })?
        }
    };

    println!("{}", VersionResolver::resolve(date, ordinal));
    Ok(())
}

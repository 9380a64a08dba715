use std::io::{self, BufRead, Write};

use vellum_core::rate_limit::{Identity, RateLimiter};
use vellum_core::VellumError;

use crate::cli::Cli;
use crate::config::RateLimitSection;
use crate::errors::CliError;

/// Feed one forwarded-for header value per stdin line through a limiter.
///
/// An empty line stands for a request with no header.
pub fn handle_throttle(
    cli: &Cli,
    section: &RateLimitSection,
    limit: Option<usize>,
    window_ms: Option<u64>,
) -> anyhow::Result<()> {
    let limiter = RateLimiter::new(section.limiter_config(limit, window_ms))?;
    tracing::debug!(?limiter, "throttle started");

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    let mut throttled: usize = 0;
    let mut total: usize = 0;

    for line in stdin.lock().lines() {
        let line = line?;
        let raw = if line.trim().is_empty() {
            None
        } else {
            Some(line.as_str())
        };
        let identity = Identity::from_forwarded(raw);
        total += 1;

        match limiter.check_identity(identity.clone()) {
            Ok(()) => {
                if !cli.quiet {
                    writeln!(stdout, "accepted {}", identity)?;
                }
            }
            Err(VellumError::RateLimitExceeded) => {
                throttled += 1;
                writeln!(stdout, "throttled {}", identity)?;
            }
            Err(err) => return Err(err.into()),
        }
    }
    stdout.flush()?;

    tracing::info!(total, throttled, identities = limiter.tracked_identities(), "throttle finished");
    if throttled > 0 {
        return Err(CliError::RateLimited(format!(
            "{} of {} requests throttled",
            throttled, total
        ))
        .into());
    }
    Ok(())
}

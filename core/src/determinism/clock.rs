use crate::error::CoreResult;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Source of RFC 3339 UTC timestamps for workflow records and audit events.
pub trait Clock: Send + Sync {
    fn now_rfc3339(&self) -> CoreResult<String>;

    /// Calendar date (`YYYY-MM-DD`) of `now_rfc3339`, used for batch expiry checks.
    fn today(&self) -> CoreResult<String> {
        let now = self.now_rfc3339()?;
        Ok(now.chars().take(10).collect())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_rfc3339(&self) -> CoreResult<String> {
        Ok(OffsetDateTime::now_utc().format(&Rfc3339)?)
    }
}

/// Always reports the same instant. Used by tests and deterministic replays.
#[derive(Debug, Clone)]
pub struct FixedClock(pub String);

impl Clock for FixedClock {
    fn now_rfc3339(&self) -> CoreResult<String> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_emits_parseable_utc() {
        let ts = SystemClock.now_rfc3339().unwrap();
        let parsed = OffsetDateTime::parse(&ts, &Rfc3339).unwrap();
        assert_eq!(parsed.offset(), time::UtcOffset::UTC);
    }

    #[test]
    fn fixed_clock_date_prefix() {
        let c = FixedClock("2026-03-01T09:30:00Z".to_string());
        assert_eq!(c.today().unwrap(), "2026-03-01");
    }
}

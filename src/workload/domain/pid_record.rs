//! On-disk record of a workload's supervising proxy process.

use super::WorkloadDomainError;
use chrono::{DateTime, Utc};
use mockable::Clock;
use uuid::Uuid;

/// Secondary identity written next to a PID.
///
/// Identifies the launch that wrote a PID record. Liveness checks do not
/// consult it; PID reuse is not detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityToken {
    nonce: Uuid,
    launched_at: DateTime<Utc>,
}

impl IdentityToken {
    /// Generates a fresh token stamped with the current time.
    #[must_use]
    pub fn generate(clock: &impl Clock) -> Self {
        Self {
            nonce: Uuid::new_v4(),
            launched_at: clock.utc(),
        }
    }

    /// Returns the random launch nonce.
    #[must_use]
    pub const fn nonce(&self) -> Uuid {
        self.nonce
    }

    /// Returns the launch timestamp.
    #[must_use]
    pub const fn launched_at(&self) -> DateTime<Utc> {
        self.launched_at
    }

    fn parse(line: &str) -> Option<Self> {
        let (nonce, launched_at) = line.trim().split_once(' ')?;
        Some(Self {
            nonce: Uuid::parse_str(nonce).ok()?,
            launched_at: DateTime::parse_from_rfc3339(launched_at.trim())
                .ok()?
                .with_timezone(&Utc),
        })
    }
}

/// Contents of a `<base>.pid` file.
///
/// The first line holds the decimal PID. An optional second line holds the
/// [`IdentityToken`] as `<nonce> <rfc3339 timestamp>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProxyProcessRecord {
    pid: u32,
    token: Option<IdentityToken>,
}

impl ProxyProcessRecord {
    /// Creates a record without an identity token.
    #[must_use]
    pub const fn new(pid: u32) -> Self {
        Self { pid, token: None }
    }

    /// Attaches an identity token.
    #[must_use]
    pub const fn with_token(mut self, token: IdentityToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Parses a PID file.
    ///
    /// An unreadable identity line is dropped. Records holding only the PID
    /// parse without a token.
    ///
    /// # Errors
    ///
    /// Returns [`WorkloadDomainError::MalformedPidRecord`] when the first
    /// line is not a decimal PID.
    pub fn parse(contents: &str) -> Result<Self, WorkloadDomainError> {
        let mut lines = contents.lines();
        let pid_line = lines.next().unwrap_or_default().trim();
        let pid = pid_line
            .parse::<u32>()
            .map_err(|_| WorkloadDomainError::MalformedPidRecord(pid_line.to_owned()))?;
        let token = lines.next().and_then(IdentityToken::parse);
        Ok(Self { pid, token })
    }

    /// Renders the record in its on-disk form.
    #[must_use]
    pub fn render(&self) -> String {
        match self.token {
            Some(token) => format!(
                "{}\n{} {}\n",
                self.pid,
                token.nonce,
                token.launched_at.to_rfc3339()
            ),
            None => format!("{}\n", self.pid),
        }
    }

    /// Returns the recorded PID.
    #[must_use]
    pub const fn pid(&self) -> u32 {
        self.pid
    }

    /// Returns the identity token, if one was recorded.
    #[must_use]
    pub const fn token(&self) -> Option<&IdentityToken> {
        self.token.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockable::DefaultClock;

    #[test]
    fn parses_bare_pid() {
        let record = ProxyProcessRecord::parse("12345").expect("record parses");
        assert_eq!(record.pid(), 12345);
        assert!(record.token().is_none());
    }

    #[test]
    fn parses_rendered_token() {
        let token = IdentityToken::generate(&DefaultClock);
        let rendered = ProxyProcessRecord::new(42).with_token(token).render();

        let record = ProxyProcessRecord::parse(&rendered).expect("record parses");

        let parsed = record.token().expect("token should survive");
        assert_eq!(parsed.nonce(), token.nonce());
        assert_eq!(parsed.launched_at(), token.launched_at());
    }

    #[test]
    fn garbage_token_line_is_ignored() {
        let record = ProxyProcessRecord::parse("7\nnot a token\n").expect("record parses");
        assert_eq!(record.pid(), 7);
        assert!(record.token().is_none());
    }

    #[test]
    fn non_numeric_pid_is_rejected() {
        assert_eq!(
            ProxyProcessRecord::parse("abc\n"),
            Err(WorkloadDomainError::MalformedPidRecord("abc".to_owned()))
        );
    }
}

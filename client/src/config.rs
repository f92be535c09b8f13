use std::{fmt, time::Duration};

use crate::error::Error;

pub const DEFAULT_BASE_URL: &str = "http://bitkozpont.mik.uni-pannon.hu/2024";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Opaque credential identifying a team to the server.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct TeamCode(String);

impl TeamCode {
    pub fn new(code: impl Into<String>) -> Self {
        TeamCode(code.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Fails with [`Error::MissingTeamCode`] when blank.
    pub fn require(&self) -> Result<&str, Error> {
        if self.is_blank() {
            return Err(Error::MissingTeamCode);
        }
        Ok(self.as_str())
    }
}

impl fmt::Debug for TeamCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TeamCode").field(&"..").finish()
    }
}

/// Everything an operation needs to talk to the server, resolved once at
/// startup and handed down explicitly.
#[derive(Debug, Clone)]
pub struct Session {
    pub base_url: String,
    pub team_code: TeamCode,
    pub poll_interval: Duration,
}

impl Session {
    pub fn new(base_url: &str, team_code: TeamCode) -> Self {
        Session {
            base_url: base_url.trim_end_matches('/').to_string(),
            team_code,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Resolve a session from explicit values, falling back to the stored
    /// team code and built-in defaults.
    pub fn resolve(
        base_url: Option<String>,
        team_code: Option<String>,
        poll_ms: Option<u64>,
        stored_team_code: Option<String>,
    ) -> Self {
        let base_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let team_code = team_code
            .filter(|code| !code.trim().is_empty())
            .or(stored_team_code)
            .map(TeamCode::new)
            .unwrap_or_default();
        let session = Session::new(&base_url, team_code);
        match poll_ms {
            Some(ms) => session.with_poll_interval(Duration::from_millis(ms)),
            None => session,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_team_code_is_rejected() {
        assert!(TeamCode::new("   ").is_blank());
        assert!(matches!(
            TeamCode::new("\t").require(),
            Err(Error::MissingTeamCode)
        ));
        assert_eq!(TeamCode::new(" ABC123 ").require().unwrap(), "ABC123");
    }

    #[test]
    fn explicit_team_code_beats_stored_one() {
        let session = Session::resolve(
            Some("http://localhost:3000/".to_string()),
            Some("FLAG".to_string()),
            None,
            Some("STORED".to_string()),
        );
        assert_eq!(session.base_url, "http://localhost:3000");
        assert_eq!(session.team_code.as_str(), "FLAG");
        assert_eq!(session.poll_interval, DEFAULT_POLL_INTERVAL);
    }

    #[test]
    fn stored_team_code_and_defaults() {
        let session = Session::resolve(None, Some(" ".to_string()), Some(250), Some("STORED".to_string()));
        assert_eq!(session.base_url, DEFAULT_BASE_URL);
        assert_eq!(session.team_code.as_str(), "STORED");
        assert_eq!(session.poll_interval, Duration::from_millis(250));

        let session = Session::resolve(None, None, None, None);
        assert!(session.team_code.is_blank());
    }
}

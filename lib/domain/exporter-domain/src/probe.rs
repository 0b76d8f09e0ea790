use std::fmt;
use std::time::Duration;

use crate::domain_key::DomainKey;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownReason {
    Status(u16),
    Timeout,
    Transport(String),
}

impl fmt::Display for DownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownReason::Status(code) => write!(f, "status code {code}"),
            DownReason::Timeout => f.write_str("timed out"),
            DownReason::Transport(msg) => write!(f, "transport error: {msg}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeStatus {
    Up,
    Down(DownReason),
}

impl ProbeStatus {
    /// Only an exact 200 counts as up.
    pub fn from_status_code(code: u16) -> Self {
        if code == 200 {
            ProbeStatus::Up
        } else {
            ProbeStatus::Down(DownReason::Status(code))
        }
    }

    pub fn gauge_value(&self) -> f64 {
        match self {
            ProbeStatus::Up => 1.0,
            ProbeStatus::Down(_) => 0.0,
        }
    }

    pub fn is_up(&self) -> bool {
        matches!(self, ProbeStatus::Up)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    pub domain: DomainKey,
    pub status: ProbeStatus,
    pub elapsed: Duration,
}

impl ProbeResult {
    pub fn new(domain: DomainKey, status: ProbeStatus, elapsed: Duration) -> Self {
        Self {
            domain,
            status,
            elapsed,
        }
    }

    pub fn timed_out(domain: DomainKey, elapsed: Duration) -> Self {
        Self::new(domain, ProbeStatus::Down(DownReason::Timeout), elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_status_is_up() {
        let status = ProbeStatus::from_status_code(200);
        assert!(status.is_up());
        assert_eq!(status.gauge_value(), 1.0);
    }

    #[test]
    fn other_statuses_are_down() {
        for code in [201, 204, 301, 404, 500, 503] {
            let status = ProbeStatus::from_status_code(code);
            assert_eq!(status, ProbeStatus::Down(DownReason::Status(code)));
            assert_eq!(status.gauge_value(), 0.0);
        }
    }

    #[test]
    fn timeout_and_transport_failures_are_down() {
        let timeout = ProbeResult::timed_out(DomainKey::new("a.example.com/"), Duration::ZERO);
        assert_eq!(timeout.status.gauge_value(), 0.0);
        let refused = ProbeStatus::Down(DownReason::Transport("connection refused".into()));
        assert_eq!(refused.gauge_value(), 0.0);
        assert!(!refused.is_up());
    }

    #[test]
    fn down_reasons_render_for_logs() {
        assert_eq!(DownReason::Status(404).to_string(), "status code 404");
        assert_eq!(DownReason::Timeout.to_string(), "timed out");
        assert_eq!(
            DownReason::Transport("dns error".into()).to_string(),
            "transport error: dns error"
        );
    }
}

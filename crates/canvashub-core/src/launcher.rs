//! Sequential opening of an envelope's selected team links.

use crate::envelope::{Envelope, EnvelopeId};
use crate::{Duration, Instant};
use std::collections::VecDeque;
use thiserror::Error;

/// Launcher errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LaunchError {
    #[error("No team members selected in envelope {0}")]
    NothingSelected(EnvelopeId),
}

/// Opens URLs outside the board (browser tab, system handler).
pub trait LinkOpener {
    fn open(&mut self, url: &str);
}

#[derive(Debug, Clone, PartialEq)]
struct PendingLaunch {
    due: Instant,
    url: String,
    envelope: EnvelopeId,
}

/// Queue of links waiting to be opened, spaced by the configured delay.
///
/// Deadlines are polled with an explicit clock so the host decides when time
/// advances.
#[derive(Debug, Clone, Default)]
pub struct LinkLauncher {
    pending: VecDeque<PendingLaunch>,
}

impl LinkLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue every checked member of `envelope`, the i-th due at `now + i * delay`.
    ///
    /// Returns the number of queued links.
    pub fn schedule(&mut self, envelope: &Envelope, now: Instant, delay: Duration) -> Result<usize, LaunchError> {
        let urls: Vec<&str> = envelope.checked_members().map(|m| m.url.as_str()).collect();
        if urls.is_empty() {
            return Err(LaunchError::NothingSelected(envelope.id.clone()));
        }

        let mut due = now;
        for url in &urls {
            self.pending.push_back(PendingLaunch {
                due,
                url: url.to_string(),
                envelope: envelope.id.clone(),
            });
            due += delay;
        }
        // Keep the queue ordered when batches from several envelopes overlap.
        self.pending.make_contiguous().sort_by_key(|p| p.due);
        log::debug!("Scheduled {} links from {}", urls.len(), envelope.id);
        Ok(urls.len())
    }

    /// Remove and return every URL whose deadline has passed, in order.
    pub fn poll(&mut self, now: Instant) -> Vec<String> {
        let mut due = Vec::new();
        while self.pending.front().is_some_and(|p| p.due <= now) {
            if let Some(launch) = self.pending.pop_front() {
                due.push(launch.url);
            }
        }
        due
    }

    /// Poll and hand due URLs to `opener`. Returns how many were opened.
    pub fn open_due(&mut self, now: Instant, opener: &mut dyn LinkOpener) -> usize {
        let urls = self.poll(now);
        for url in &urls {
            opener.open(url);
        }
        urls.len()
    }

    /// Drop pending launches of a deleted envelope.
    pub fn cancel_for(&mut self, envelope: &str) -> usize {
        let before = self.pending.len();
        self.pending.retain(|p| p.envelope != envelope);
        before - self.pending.len()
    }

    /// Number of links still waiting.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Earliest pending deadline, for hosts that arm a single timer.
    pub fn next_due(&self) -> Option<Instant> {
        self.pending.front().map(|p| p.due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::TeamMember;
    use kurbo::Point;

    fn envelope_with(id: &str, members: &[(&str, bool)]) -> Envelope {
        let mut env = Envelope::new(id, "Team", Point::ZERO);
        for (url, checked) in members {
            let mut m = TeamMember::new("X", "x", *url);
            m.checked = *checked;
            env.team.push(m);
        }
        env
    }

    #[derive(Default)]
    struct Recorder(Vec<String>);

    impl LinkOpener for Recorder {
        fn open(&mut self, url: &str) {
            self.0.push(url.to_string());
        }
    }

    #[test]
    fn test_nothing_selected() {
        let env = envelope_with("a", &[("https://one", false)]);
        let mut launcher = LinkLauncher::new();
        assert_eq!(
            launcher.schedule(&env, Instant::now(), Duration::from_millis(300)),
            Err(LaunchError::NothingSelected("a".to_string()))
        );
        assert_eq!(launcher.pending(), 0);
    }

    #[test]
    fn test_links_open_spaced_by_delay() {
        let env = envelope_with("a", &[("https://one", true), ("https://skip", false), ("https://two", true)]);
        let mut launcher = LinkLauncher::new();
        let start = Instant::now();
        let delay = Duration::from_millis(300);

        assert_eq!(launcher.schedule(&env, start, delay), Ok(2));
        assert_eq!(launcher.poll(start), vec!["https://one".to_string()]);
        assert!(launcher.poll(start + Duration::from_millis(299)).is_empty());
        assert_eq!(launcher.next_due(), Some(start + delay));

        let mut recorder = Recorder::default();
        assert_eq!(launcher.open_due(start + delay, &mut recorder), 1);
        assert_eq!(recorder.0, vec!["https://two".to_string()]);
        assert_eq!(launcher.pending(), 0);
    }

    #[test]
    fn test_zero_delay_opens_all_at_once() {
        let env = envelope_with("a", &[("https://one", true), ("https://two", true)]);
        let mut launcher = LinkLauncher::new();
        let start = Instant::now();
        launcher.schedule(&env, start, Duration::ZERO).unwrap();
        assert_eq!(launcher.poll(start).len(), 2);
    }

    #[test]
    fn test_cancel_for_deleted_envelope() {
        let a = envelope_with("a", &[("https://a1", true), ("https://a2", true)]);
        let b = envelope_with("b", &[("https://b1", true)]);
        let mut launcher = LinkLauncher::new();
        let start = Instant::now();
        let delay = Duration::from_millis(100);
        launcher.schedule(&a, start, delay).unwrap();
        launcher.schedule(&b, start, delay).unwrap();

        assert_eq!(launcher.cancel_for("a"), 2);
        assert_eq!(launcher.poll(start + delay * 10), vec!["https://b1".to_string()]);
    }
}

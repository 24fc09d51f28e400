use super::response::{ResponseStatus, tokens};

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

const DEFAULT_REASONS: [&str; 2] = ["unknown_key", "none_match"];

const DEFAULT_NEVER_RETRY: [&str; 2] = ["delete", "rename"];

// -----------------------------------------------------------------------------
// ----- FailoverPolicy --------------------------------------------------------

/// Decides whether a primary response sends the same request on to the secondary pool.
///
/// `none_match` is a trigger alongside `unknown_key` so key listings fall through
/// to the secondary when the primary has nothing. Commands in `never_retry`
/// mutate state and are never replayed against the read-only secondary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailoverPolicy {
    reasons: Vec<String>,
    never_retry: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailoverDecision<'a> {
    PassThrough,
    Retry { reason: &'a [u8] },
    Suppressed { command: &'a [u8] },
}

impl Default for FailoverPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_REASONS.iter().map(|s| s.to_string()).collect(),
            DEFAULT_NEVER_RETRY.iter().map(|s| s.to_string()).collect(),
        )
    }
}

// -----------------------------------------------------------------------------
// ----- FailoverPolicy: Public ------------------------------------------------

impl FailoverPolicy {
    pub fn new(reasons: Vec<String>, never_retry: Vec<String>) -> Self {
        Self {
            reasons,
            never_retry,
        }
    }

    pub fn reasons(&self) -> &[String] {
        &self.reasons
    }

    pub fn never_retry(&self) -> &[String] {
        &self.never_retry
    }

    pub fn decide<'a>(&self, request: &'a [u8], response: &'a [u8]) -> FailoverDecision<'a> {
        let Some(reason) = ResponseStatus::classify(response).err_reason() else {
            return FailoverDecision::PassThrough;
        };

        if !self.reasons.iter().any(|r| r.as_bytes() == reason) {
            return FailoverDecision::PassThrough;
        }

        if let Some(command) = tokens(request).next() {
            if self
                .never_retry
                .iter()
                .any(|c| c.as_bytes().eq_ignore_ascii_case(command))
            {
                return FailoverDecision::Suppressed { command };
            }
        }

        FailoverDecision::Retry { reason }
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------

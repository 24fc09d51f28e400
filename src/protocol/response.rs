// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

const STATUS_OK: &[u8] = b"OK";
const STATUS_ERR: &[u8] = b"ERR";

// -----------------------------------------------------------------------------
// ----- ResponseStatus --------------------------------------------------------

/// Routing view of a tracker response line: its first two whitespace tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus<'a> {
    Ok,
    Err { reason: &'a [u8] },
    /// `ERR` with no reason token.
    ErrBare,
    /// Empty line or an unrecognised status token.
    Unrecognized,
}

impl<'a> ResponseStatus<'a> {
    pub fn classify(line: &'a [u8]) -> Self {
        let mut tokens = tokens(line);

        match tokens.next() {
            Some(STATUS_OK) => ResponseStatus::Ok,
            Some(STATUS_ERR) => match tokens.next() {
                Some(reason) => ResponseStatus::Err { reason },
                None => ResponseStatus::ErrBare,
            },
            _ => ResponseStatus::Unrecognized,
        }
    }

    pub fn err_reason(&self) -> Option<&'a [u8]> {
        match *self {
            ResponseStatus::Err { reason } => Some(reason),
            _ => None,
        }
    }
}

// -----------------------------------------------------------------------------
// ----- Internal: Helpers -----------------------------------------------------

// ASCII whitespace plus the vertical tab, which `is_ascii_whitespace` excludes.
pub(crate) fn tokens(line: &[u8]) -> impl Iterator<Item = &[u8]> {
    line.split(|&b| is_separator(b)).filter(|t| !t.is_empty())
}

#[inline]
fn is_separator(b: u8) -> bool {
    b.is_ascii_whitespace() || b == b'\x0b'
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------

//! Line-oriented state machine locating merged pull request blocks.
//!
//! A block starts at the first line containing the configured marker,
//! waits for a blank separator, and then runs until the next blank line.
//! The same scanner drives both the ticket collection pass and the
//! rendering pass.

/// Position of the scanner relative to a pull request block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanState {
    /// Before the first marker, or after a block has closed.
    #[default]
    Outside,
    /// Marker seen, waiting for the blank separator.
    BlockStart,
    /// Emitting entry lines.
    InBlock,
}

/// What a scanned line means for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Copied verbatim to the output.
    PassThrough,
    /// A changelog entry inside a block.
    Entry,
    /// Marker, separator, or anything between them; never emitted.
    Delimiter,
}

/// Result of feeding one line to the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanStep {
    /// State after applying this line's transition.
    pub state: ScanState,
    /// True when this line closed a block.
    pub block_closed: bool,
}

impl ScanStep {
    /// Classify the line that produced this step.
    pub fn classify(&self, line: &str) -> LineKind {
        match self.state {
            ScanState::Outside => LineKind::PassThrough,
            ScanState::InBlock if !line.is_empty() => LineKind::Entry,
            _ => LineKind::Delimiter,
        }
    }
}

/// Finite-state scanner over changelog lines.
#[derive(Debug, Clone)]
pub struct BlockScanner {
    marker: String,
    state: ScanState,
}

impl BlockScanner {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            state: ScanState::Outside,
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Apply the transition for `line` and report the resulting state.
    pub fn advance(&mut self, line: &str) -> ScanStep {
        let mut block_closed = false;

        self.state = match self.state {
            ScanState::Outside if line.contains(&self.marker) => ScanState::BlockStart,
            ScanState::BlockStart if line.is_empty() => ScanState::InBlock,
            ScanState::InBlock if line.is_empty() => {
                block_closed = true;
                ScanState::Outside
            }
            state => state,
        };

        ScanStep {
            state: self.state,
            block_closed,
        }
    }

    /// Signal end of input.
    ///
    /// Returns true when a block was still open, which counts as an
    /// implicit close. The scanner is reset to `Outside` either way.
    pub fn finish(&mut self) -> bool {
        let was_open = self.state == ScanState::InBlock;
        self.state = ScanState::Outside;
        was_open
    }
}

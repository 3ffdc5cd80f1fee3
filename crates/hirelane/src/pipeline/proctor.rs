use tracing::warn;

/// Reason recorded when the visibility-loss limit forces disqualification.
pub const VISIBILITY_DISQUALIFICATION_REASON: &str =
    "proctoring violation: visibility-loss limit reached";

/// Outcome of one reported focus-loss event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProctorSignal {
    /// Strikes below the limit surface a warning to the operator layer but
    /// leave the application untouched.
    Warning { strikes: u8, limit: u8 },
    /// The limit was reached; exactly one of these fires per stage attempt.
    Disqualify { reason: &'static str },
    /// Monitor is cancelled or already fired; the event is dropped.
    Ignored,
}

/// Session-local strike counter for one timed stage attempt.
///
/// State is stage-scoped: `begin_stage` resets it, and it stops counting once
/// it has fired or been cancelled, so stale events from a finished stage can
/// never bleed into the next one.
#[derive(Debug, Clone)]
pub struct ProctorMonitor {
    strikes: u8,
    limit: u8,
    fired: bool,
    cancelled: bool,
    fullscreen_acquired: bool,
}

impl ProctorMonitor {
    pub fn new(limit: u8) -> Self {
        Self {
            strikes: 0,
            limit,
            fired: false,
            cancelled: false,
            fullscreen_acquired: false,
        }
    }

    /// Arm the monitor for a fresh stage attempt.
    pub fn begin_stage(&mut self) {
        self.strikes = 0;
        self.fired = false;
        self.cancelled = false;
    }

    /// Record the outcome of requesting exclusive foreground presentation.
    /// Denial is non-fatal and never counts as a strike.
    pub fn note_fullscreen(&mut self, acquired: bool) {
        self.fullscreen_acquired = acquired;
        if !acquired {
            warn!("fullscreen request denied; continuing without enforcement");
        }
    }

    /// Handle one visibility-loss event.
    pub fn record_focus_loss(&mut self) -> ProctorSignal {
        if self.cancelled || self.fired {
            return ProctorSignal::Ignored;
        }

        self.strikes = self.strikes.saturating_add(1);
        if self.strikes >= self.limit {
            self.fired = true;
            ProctorSignal::Disqualify {
                reason: VISIBILITY_DISQUALIFICATION_REASON,
            }
        } else {
            ProctorSignal::Warning {
                strikes: self.strikes,
                limit: self.limit,
            }
        }
    }

    /// Stop counting; called when the stage ends on submit or navigation.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn strikes(&self) -> u8 {
        self.strikes
    }

    pub fn is_active(&self) -> bool {
        !self.cancelled && !self.fired
    }
}

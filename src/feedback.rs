use std::io::{self, Write};

/// Cue channel for gameplay events. The controller emits through this seam
/// so a bell, a future audio backend, or a test double can plug in without
/// the game loop knowing which.
pub trait FeedbackSink {
    fn answer_correct(&mut self) {}
    fn answer_wrong(&mut self) {}
    fn countdown_tick(&mut self, _urgent: bool) {}
    fn record_broken(&mut self) {}
}

/// Discards every cue. Used under `--mute` and in headless tests.
#[derive(Debug, Default)]
pub struct SilentFeedback;

impl FeedbackSink for SilentFeedback {}

/// Rings the terminal bell on the cues that matter.
#[derive(Debug, Default)]
pub struct BellFeedback;

impl BellFeedback {
    fn ring(&self) {
        print!("\x07");
        let _ = io::stdout().flush();
    }
}

impl FeedbackSink for BellFeedback {
    fn answer_wrong(&mut self) {
        self.ring();
    }

    fn record_broken(&mut self) {
        self.ring();
    }
}

#[cfg(test)]
pub mod test_support {
    use super::FeedbackSink;

    /// Counts cues so tests can assert on what the loop emitted.
    #[derive(Debug, Default)]
    pub struct CountingFeedback {
        pub correct: usize,
        pub wrong: usize,
        pub ticks: usize,
        pub urgent_ticks: usize,
        pub records: usize,
    }

    impl FeedbackSink for CountingFeedback {
        fn answer_correct(&mut self) {
            self.correct += 1;
        }

        fn answer_wrong(&mut self) {
            self.wrong += 1;
        }

        fn countdown_tick(&mut self, urgent: bool) {
            self.ticks += 1;
            if urgent {
                self.urgent_ticks += 1;
            }
        }

        fn record_broken(&mut self) {
            self.records += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::CountingFeedback;
    use super::*;

    #[test]
    fn silent_sink_accepts_everything() {
        let mut sink = SilentFeedback;
        sink.answer_correct();
        sink.answer_wrong();
        sink.countdown_tick(true);
        sink.record_broken();
    }

    #[test]
    fn counting_sink_tracks_cues() {
        let mut sink = CountingFeedback::default();
        sink.answer_correct();
        sink.answer_correct();
        sink.answer_wrong();
        sink.countdown_tick(false);
        sink.countdown_tick(true);
        sink.record_broken();

        assert_eq!(sink.correct, 2);
        assert_eq!(sink.wrong, 1);
        assert_eq!(sink.ticks, 2);
        assert_eq!(sink.urgent_ticks, 1);
        assert_eq!(sink.records, 1);
    }
}

//! Outbound notifications for audio and HUD collaborators.
//!
//! Gameplay only announces what happened; nothing here feeds back into the
//! simulation.

use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SoundCue {
    Swing,
    Hit,
    ZombieDeath,
    PlayerHurt,
    Pickup,
    MapChanged,
}

pub(crate) trait PresentationHooks {
    fn play_cue(&mut self, cue: SoundCue);
    fn show_dialogue(&mut self, text: &str, duration_ms: u32);
    fn game_over(&mut self);
}

/// Desktop hooks: there is no mixer or HUD, so events are logged.
#[derive(Debug, Default)]
pub(crate) struct TracingPresentation;

impl PresentationHooks for TracingPresentation {
    fn play_cue(&mut self, cue: SoundCue) {
        debug!(cue = ?cue, "sound_cue");
    }

    fn show_dialogue(&mut self, text: &str, duration_ms: u32) {
        info!(text, duration_ms, "dialogue_shown");
    }

    fn game_over(&mut self) {
        info!("game_over");
    }
}

#[cfg(test)]
pub(crate) mod recording {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::{PresentationHooks, SoundCue};

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum PresentationEvent {
        Cue(SoundCue),
        Dialogue(String),
        GameOver,
    }

    /// Hooks that share their log with the test holding a clone.
    #[derive(Debug, Clone, Default)]
    pub(crate) struct RecordingPresentation {
        log: Rc<RefCell<Vec<PresentationEvent>>>,
    }

    impl RecordingPresentation {
        pub(crate) fn events(&self) -> Vec<PresentationEvent> {
            self.log.borrow().clone()
        }

        pub(crate) fn dialogues(&self) -> Vec<String> {
            self.events()
                .into_iter()
                .filter_map(|event| match event {
                    PresentationEvent::Dialogue(text) => Some(text),
                    _ => None,
                })
                .collect()
        }

        pub(crate) fn cue_count(&self, cue: SoundCue) -> usize {
            self.events()
                .iter()
                .filter(|event| **event == PresentationEvent::Cue(cue))
                .count()
        }
    }

    impl PresentationHooks for RecordingPresentation {
        fn play_cue(&mut self, cue: SoundCue) {
            self.log.borrow_mut().push(PresentationEvent::Cue(cue));
        }

        fn show_dialogue(&mut self, text: &str, _duration_ms: u32) {
            self.log
                .borrow_mut()
                .push(PresentationEvent::Dialogue(text.to_string()));
        }

        fn game_over(&mut self) {
            self.log.borrow_mut().push(PresentationEvent::GameOver);
        }
    }
}

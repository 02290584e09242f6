//! Non-blocking tone sequencer
//!
//! A melody is a constant table of on/off durations ending in [`Note::END`].
//! [`MelodySequencer::update`] is polled from the control loop and advances
//! at most one phase per call, so it never waits on the tone output.

use crate::drivers::ToneOutput;
use crate::os::Tick;

/// One beep: the tone sounds for `on_ms`, then stays silent for `off_ms`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Note {
    pub on_ms: u16,
    pub off_ms: u16,
}

impl Note {
    /// Terminator. Playback stops when it reaches a note with no on time.
    pub const END: Note = Note::new(0, 0);

    pub const fn new(on_ms: u16, off_ms: u16) -> Self {
        Self { on_ms, off_ms }
    }
}

pub mod tunes {
    use super::Note;

    /// Short march played while backing up.
    pub static REVERSE: [Note; 16] = [
        Note::new(150, 100),
        Note::new(150, 100),
        Note::new(150, 150),
        Note::new(100, 100),
        Note::new(150, 150),
        Note::new(50, 400),
        Note::new(42, 150),
        Note::new(42, 150),
        Note::new(42, 150),
        Note::new(42, 150),
        Note::new(47, 150),
        Note::new(50, 150),
        Note::new(47, 150),
        Note::new(45, 150),
        Note::new(42, 250),
        Note::END,
    ];

    /// Two short beeps.
    pub static ALERT: [Note; 3] = [Note::new(150, 200), Note::new(150, 100), Note::END];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    Idle,
    On,
    Off,
}

pub struct MelodySequencer<T> {
    tone: T,
    sequence: &'static [Note],
    index: usize,
    phase: Phase,
    phase_start: Tick,
}

impl<T: ToneOutput> MelodySequencer<T> {
    pub fn new(mut tone: T) -> Self {
        tone.set_tone(false);
        Self {
            tone,
            sequence: &[],
            index: 0,
            phase: Phase::Idle,
            phase_start: Tick::default(),
        }
    }

    /// Starts `sequence` from its first note, cutting off whatever was
    /// playing.
    pub fn play(&mut self, sequence: &'static [Note], now: Tick) {
        match sequence.first() {
            Some(note) if note.on_ms > 0 => {
                self.sequence = sequence;
                self.index = 0;
                self.enter(Phase::On, now);
            }
            _ => self.stop(),
        }
    }

    pub fn update(&mut self, now: Tick) {
        let elapsed = now.elapsed_since(self.phase_start);
        match self.phase {
            Phase::Idle => {}
            Phase::On => {
                if elapsed >= self.current().on_ms as u32 {
                    self.enter(Phase::Off, now);
                }
            }
            Phase::Off => {
                if elapsed >= self.current().off_ms as u32 {
                    self.index += 1;
                    match self.sequence.get(self.index) {
                        Some(note) if note.on_ms > 0 => self.enter(Phase::On, now),
                        _ => self.stop(),
                    }
                }
            }
        }
    }

    /// Silences the output at once and forgets the sequence.
    pub fn stop(&mut self) {
        self.tone.set_tone(false);
        self.sequence = &[];
        self.index = 0;
        self.phase = Phase::Idle;
    }

    pub fn is_playing(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn current(&self) -> Note {
        self.sequence.get(self.index).copied().unwrap_or(Note::END)
    }

    fn enter(&mut self, phase: Phase, now: Tick) {
        self.tone.set_tone(phase == Phase::On);
        self.phase = phase;
        self.phase_start = now;
    }

    pub fn release(self) -> T {
        self.tone
    }
}

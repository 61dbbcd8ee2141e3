use std::fmt;
use std::str::FromStr;

use crate::core::{ExplorerError, MAX_FREQUENCY, MIN_FREQUENCY};

/// The 12 chromatic note names, in order starting at C.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteName {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

pub const CHROMATIC: [NoteName; 12] = [
    NoteName::C,
    NoteName::CSharp,
    NoteName::D,
    NoteName::DSharp,
    NoteName::E,
    NoteName::F,
    NoteName::FSharp,
    NoteName::G,
    NoteName::GSharp,
    NoteName::A,
    NoteName::ASharp,
    NoteName::B,
];

impl NoteName {
    /// Base frequency at the reference octave 4.
    pub fn base_frequency(self) -> f32 {
        match self {
            NoteName::C => 261.63,
            NoteName::CSharp => 277.18,
            NoteName::D => 293.66,
            NoteName::DSharp => 311.13,
            NoteName::E => 329.63,
            NoteName::F => 349.23,
            NoteName::FSharp => 369.99,
            NoteName::G => 392.00,
            NoteName::GSharp => 415.30,
            NoteName::A => 440.00,
            NoteName::ASharp => 466.16,
            NoteName::B => 493.88,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NoteName::C => "C",
            NoteName::CSharp => "C#",
            NoteName::D => "D",
            NoteName::DSharp => "D#",
            NoteName::E => "E",
            NoteName::F => "F",
            NoteName::FSharp => "F#",
            NoteName::G => "G",
            NoteName::GSharp => "G#",
            NoteName::A => "A",
            NoteName::ASharp => "A#",
            NoteName::B => "B",
        }
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteName {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CHROMATIC
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| ExplorerError::InvalidNote(s.to_string()))
    }
}

/// A note name plus octave, the unit of pitch quantization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Note {
    pub name: NoteName,
    pub octave: i32,
}

impl Note {
    pub fn new(name: NoteName, octave: i32) -> Self {
        Note { name, octave }
    }

    /// Exact frequency of this note relative to the octave-4 base table.
    pub fn frequency(self) -> f32 {
        self.name.base_frequency() * 2.0f32.powi(self.octave - 4)
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.octave)
    }
}

/// Nearest note to an arbitrary frequency, counted in half-steps from
/// A4 = 440 Hz. The +9 offset aligns index 0 with C instead of A.
pub fn closest_note(frequency: f32) -> Note {
    let half_steps = (12.0 * (frequency / 440.0).log2()).round() as i32;
    let octave = 4 + (half_steps + 9).div_euclid(12);
    let index = (half_steps + 9).rem_euclid(12) as usize;
    Note::new(CHROMATIC[index], octave)
}

/// Logarithmic vertical axis: normalized_y is the fraction of the way up
/// from the bottom of the interaction field.
pub fn y_to_frequency(normalized_y: f32) -> f32 {
    MIN_FREQUENCY * (MAX_FREQUENCY / MIN_FREQUENCY).powf(normalized_y)
}

pub fn frequency_to_y(frequency: f32) -> f32 {
    (frequency / MIN_FREQUENCY).ln() / (MAX_FREQUENCY / MIN_FREQUENCY).ln()
}

/// A committed value from the typed entry overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Entry {
    Frequency(f32),
    Note(Note),
}

/// Parse typed input: a bare integer is a frequency in Hz, `[A-G](#)?[0-9]`
/// is a note (digit 0 means octave 10). Anything else is discarded.
pub fn parse_entry(input: &str) -> Option<Entry> {
    let input = input.trim();
    if input.is_empty() || !input.is_ascii() {
        return None;
    }

    if input.bytes().all(|b| b.is_ascii_digit()) {
        let hz: f32 = input.parse().ok()?;
        if (MIN_FREQUENCY..=MAX_FREQUENCY).contains(&hz) {
            return Some(Entry::Frequency(hz));
        }
        return None;
    }

    let upper = input.to_ascii_uppercase();
    if !(2..=3).contains(&upper.len()) {
        return None;
    }
    let (name_part, octave_part) = upper.split_at(upper.len() - 1);
    let digit = octave_part.chars().next()?;
    if !digit.is_ascii_digit() {
        return None;
    }
    let name = NoteName::from_str(name_part).ok()?;
    let octave = match digit {
        '0' => 10,
        d => d as i32 - '0' as i32,
    };
    Some(Entry::Note(Note::new(name, octave)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_frequencies() {
        assert_eq!(closest_note(440.0), Note::new(NoteName::A, 4));
        assert_eq!(closest_note(261.63), Note::new(NoteName::C, 4));
        // 450 Hz is 0.39 half-steps above A4; rounds back to A4.
        assert_eq!(closest_note(450.0), Note::new(NoteName::A, 4));
    }

    #[test]
    fn quantization_stable_at_exact_note_frequencies() {
        for name in CHROMATIC {
            for octave in 0..=9 {
                let note = Note::new(name, octave);
                assert_eq!(
                    closest_note(note.frequency()),
                    note,
                    "round trip failed for {note}"
                );
            }
        }
    }

    #[test]
    fn octave_doubles_frequency() {
        let a4 = Note::new(NoteName::A, 4).frequency();
        let a5 = Note::new(NoteName::A, 5).frequency();
        assert!((a5 - 2.0 * a4).abs() < 1e-3);
    }

    #[test]
    fn y_frequency_round_trips() {
        for i in 0..=10 {
            let ny = i as f32 / 10.0;
            let back = frequency_to_y(y_to_frequency(ny));
            assert!((back - ny).abs() < 1e-5, "normalized y {ny} came back {back}");
        }
        for hz in [20.0f32, 55.0, 440.0, 1234.5, 20000.0] {
            let back = y_to_frequency(frequency_to_y(hz));
            assert!(
                (back - hz).abs() / hz < 1e-4,
                "frequency {hz} came back {back}"
            );
        }
    }

    #[test]
    fn axis_endpoints() {
        assert!((y_to_frequency(0.0) - 20.0).abs() < 1e-3);
        assert!((y_to_frequency(1.0) - 20000.0).abs() < 1.0);
    }

    #[test]
    fn note_name_parsing() {
        assert_eq!("A#".parse::<NoteName>().unwrap(), NoteName::ASharp);
        assert!("H".parse::<NoteName>().is_err());
        assert!("Cb".parse::<NoteName>().is_err());
    }

    #[test]
    fn entry_parsing() {
        assert_eq!(parse_entry("440"), Some(Entry::Frequency(440.0)));
        assert_eq!(
            parse_entry("a#4"),
            Some(Entry::Note(Note::new(NoteName::ASharp, 4)))
        );
        // Digit 0 selects octave 10.
        assert_eq!(
            parse_entry("C0"),
            Some(Entry::Note(Note::new(NoteName::C, 10)))
        );
        assert_eq!(parse_entry("19"), None);
        assert_eq!(parse_entry("20001"), None);
        assert_eq!(parse_entry("H2"), None);
        assert_eq!(parse_entry(""), None);
        assert_eq!(parse_entry("A#"), None);
    }
}

//! Narrator persona detection and speech markup

use std::sync::LazyLock;

use fabula_core::choose;
use regex::Regex;

/// One or more narrator tags at the start of any line
static PERSONA_TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^\s*(?:(?:amy|matthew):\s*)+").expect("must be valid regex"));

/// Voice that narrates a story
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Persona {
    Amy,
    Matthew,
}

impl Persona {
    /// Detection order: the first persona whose tag appears wins
    pub const ALL: [Self; 2] = [Self::Amy, Self::Matthew];

    const fn tag(self) -> &'static str {
        match self {
            Self::Amy => "amy:",
            Self::Matthew => "matthew:",
        }
    }

    /// Persona tagged anywhere in `text`, case-insensitively
    pub fn detect(text: &str) -> Option<Self> {
        let lower = text.to_lowercase();
        Self::ALL.into_iter().find(|persona| lower.contains(persona.tag()))
    }

    /// A persona chosen uniformly at random
    pub fn random() -> Self {
        choose(&Self::ALL).copied().unwrap_or(Self::Amy)
    }
}

/// Generated text prepared for speaking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Narration {
    pub persona: Persona,
    /// Visible text with narrator tags removed
    pub text: String,
    /// Text wrapped in a voice element for the persona
    pub markup: String,
}

/// Remove narrator tags from the start of every line
///
/// Applying it twice yields the same text as applying it once.
pub fn strip_persona_tags(text: &str) -> String {
    PERSONA_TAGS.replace_all(text, "").into_owned()
}

/// Detect the narrator, strip its tags and wrap the text in voice markup
///
/// Falls back to a random persona when the text carries no tag.
pub fn narrate(raw: &str) -> Narration {
    let persona = Persona::detect(raw).unwrap_or_else(Persona::random);
    let text = strip_persona_tags(raw).trim().to_owned();
    let markup = format!("<voice name='{persona}'>{text}</voice>");

    Narration { persona, text, markup }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_tag_sets_voice_and_is_removed() {
        let narration = narrate("Amy: Once upon a time");

        assert_eq!(narration.persona, Persona::Amy);
        assert_eq!(narration.text, "Once upon a time");
        assert_eq!(narration.markup, "<voice name='Amy'>Once upon a time</voice>");
    }

    #[test]
    fn detection_is_case_insensitive_and_unanchored() {
        assert_eq!(Persona::detect("Title\nMATTHEW: hello"), Some(Persona::Matthew));
        assert_eq!(Persona::detect("said matthew: then amy: replied"), Some(Persona::Amy));
        assert_eq!(Persona::detect("no narrator here"), None);
    }

    #[test]
    fn every_line_start_tag_is_stripped() {
        let raw = "Matthew: The fox ran.\n  matthew: It stopped.\nThe end, said Amy: softly.";
        assert_eq!(
            strip_persona_tags(raw),
            "The fox ran.\nIt stopped.\nThe end, said Amy: softly."
        );
    }

    #[test]
    fn stripping_is_idempotent() {
        for raw in [
            "Amy: Once upon a time",
            "Amy: Amy: doubled",
            "Amy:\nMatthew: stacked",
            "plain text",
            "Matthew:   spaced\n\nAmy: second",
        ] {
            let once = strip_persona_tags(raw);
            assert_eq!(strip_persona_tags(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn untagged_text_gets_a_random_known_voice() {
        let narration = narrate("A quiet tale.");

        assert!(Persona::ALL.contains(&narration.persona));
        assert_eq!(narration.text, "A quiet tale.");
        assert!(narration.markup.starts_with("<voice name='"));
    }

    #[test]
    fn persona_parses_from_name() {
        assert_eq!("amy".parse::<Persona>().unwrap(), Persona::Amy);
        assert_eq!(Persona::Matthew.to_string(), "Matthew");
    }
}

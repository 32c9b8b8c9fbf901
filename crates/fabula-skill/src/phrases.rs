use fabula_core::{PhraseSet, with_article};

const GOODBYES: &[&str] = &[
    "Farewell for now!",
    "Until we meet again!",
    "Take care!",
    "See you later, alligator!",
    "Catch you later!",
    "Adios for now!",
    "Till next time!",
    "Bye-bye for now!",
    "So long!",
    "Until next time!",
    "Goodbye for now!",
    "Have a good one!",
    "Bye for now!",
    "Take it easy!",
    "Until later!",
];

const INTROS: &[&str] = &["Listening..."];

const ANIMALS: &[&str] = &[
    "cat", "dog", "bird", "fish", "cow", "pig", "horse", "sheep", "goat", "duck", "hen", "frog", "bee", "ant", "bat",
    "owl", "lion", "tiger", "bear", "wolf", "taco",
];

const ACTIONS: &[&str] = &[
    "dancing on clouds",
    "chasing moonbeams",
    "laughing with stars",
    "singing to flowers",
    "climbing rainbows",
    "dreaming of galaxies",
    "hugging a cloud",
    "talking to trees",
    "wishing on dandelions",
    "finding fairy dust",
    "following raindrops",
    "imagining dragons",
    "bouncing on the moon",
    "exploring magic",
];

/// Phrase pools the skill varies between turns
#[derive(Debug, Clone)]
pub struct SkillPhrases {
    goodbyes: PhraseSet,
    intros: PhraseSet,
    animals: PhraseSet,
    actions: PhraseSet,
}

impl SkillPhrases {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            goodbyes: set("goodbyes", GOODBYES)?,
            intros: set("intros", INTROS)?,
            animals: set("animals", ANIMALS)?,
            actions: set("actions", ACTIONS)?,
        })
    }

    pub fn goodbye(&self) -> &str {
        self.goodbyes.pick()
    }

    pub fn intro(&self) -> &str {
        self.intros.pick()
    }

    /// Example utterance suggesting a whimsical story
    pub fn launch_hint(&self) -> String {
        format!(
            "Try, \"Tell me a story about {} {}\"",
            with_article(self.animals.pick()),
            self.actions.pick()
        )
    }
}

fn set(name: &str, phrases: &[&str]) -> anyhow::Result<PhraseSet> {
    PhraseSet::new(phrases.iter().copied()).ok_or_else(|| anyhow::anyhow!("phrase set '{name}' is empty"))
}

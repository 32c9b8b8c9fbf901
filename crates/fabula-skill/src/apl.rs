//! Visual layout directives for screen devices

use std::sync::LazyLock;

use serde_json::{Value, json};
use url::Url;

const RENDER_DOCUMENT: &str = "Alexa.Presentation.APL.RenderDocument";

static INTRO_DOCUMENT: LazyLock<Value> = LazyLock::new(|| {
    serde_json::from_str(include_str!("../apl/intro.json")).expect("bundled intro document must be valid JSON")
});

static RESPONSE_DOCUMENT: LazyLock<Value> = LazyLock::new(|| {
    serde_json::from_str(include_str!("../apl/response.json")).expect("bundled response document must be valid JSON")
});

/// What to put on screen
#[derive(Debug, Clone, Copy)]
pub enum View<'a> {
    /// Headline with a spoken-phrase hint
    Intro { text: &'a str, hint: &'a str },
    /// Scrollable long text, optionally with its own speech markup
    Response { text: &'a str, speech: Option<&'a str> },
}

/// Renders views into layout directives with a fixed title and background
#[derive(Debug, Clone)]
pub struct Renderer {
    title: String,
    background_image_url: Url,
}

impl Renderer {
    pub const fn new(title: String, background_image_url: Url) -> Self {
        Self {
            title,
            background_image_url,
        }
    }

    /// Directive for `view`, or `None` when the device has no screen support
    pub fn render(&self, supports_apl: bool, view: View<'_>) -> Option<Value> {
        if !supports_apl {
            return None;
        }

        let background = json!({ "sources": [{ "url": self.background_image_url.as_str() }] });

        let directive = match view {
            View::Intro { text, hint } => json!({
                "type": RENDER_DOCUMENT,
                "token": "intro",
                "document": &*INTRO_DOCUMENT,
                "datasources": {
                    "headlineTemplateData": {
                        "type": "object",
                        "properties": {
                            "textContent": { "primaryText": { "text": intro_header(text) } },
                            "hintText": hint,
                            "backgroundImage": background,
                        }
                    }
                }
            }),
            View::Response { text, speech } => json!({
                "type": RENDER_DOCUMENT,
                "token": "response",
                "document": &*RESPONSE_DOCUMENT,
                "datasources": {
                    "longTextTemplateData": {
                        "type": "object",
                        "objectId": "responseDisplay",
                        "properties": {
                            "backgroundImage": background,
                            "title": self.title,
                            "textContent": { "primaryText": { "text": text } },
                            "speechText": speech.unwrap_or(text),
                        }
                    }
                }
            }),
        };

        Some(directive)
    }
}

/// Break a headline onto a second line after its first sentence
pub fn intro_header(text: &str) -> String {
    match text.find('.') {
        Some(index) => format!("{}<br />{}", &text[..=index], &text[index + 1..]),
        None => text.to_owned(),
    }
}

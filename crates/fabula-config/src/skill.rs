use serde::Deserialize;
use url::Url;

/// Presentation settings for the skill's spoken and visual replies
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SkillConfig {
    /// Title shown on response layouts
    #[serde(default = "default_title")]
    pub title: String,
    /// Background image used by every layout
    #[serde(default = "default_background_image_url")]
    pub background_image_url: Url,
}

impl Default for SkillConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            background_image_url: default_background_image_url(),
        }
    }
}

fn default_title() -> String {
    "Super AI".to_string()
}

#[allow(clippy::missing_panics_doc)]
fn default_background_image_url() -> Url {
    Url::parse("https://i.imgur.com/7622Qek.jpg").expect("valid default URL")
}

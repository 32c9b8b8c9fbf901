//! Elapsed-time phrasing for stories that are still being prepared

use std::time::Duration;

use fabula_config::{WaitTierConfig, parse_duration};
use fabula_core::PhraseSet;

/// Phrasing used once a story has been pending for at least `after`
#[derive(Debug, Clone)]
pub struct WaitTier {
    pub after: Duration,
    pub phrases: PhraseSet,
    pub reprompt: String,
}

/// Wait tiers ordered by strictly increasing threshold, the first at zero
#[derive(Debug, Clone)]
pub struct WaitTiers {
    tiers: Vec<WaitTier>,
}

impl WaitTiers {
    /// Build tiers from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a threshold cannot be parsed, the first tier does
    /// not start at zero, thresholds do not strictly increase, or a tier has
    /// no usable phrase
    pub fn from_config(configs: &[WaitTierConfig]) -> anyhow::Result<Self> {
        let mut tiers: Vec<WaitTier> = Vec::with_capacity(configs.len());

        for (index, config) in configs.iter().enumerate() {
            let after = parse_duration(&format!("story.wait_tiers[{index}].after"), &config.after)?;

            match tiers.last() {
                None if !after.is_zero() => anyhow::bail!("the first story wait tier must start at 0s"),
                Some(previous) if after <= previous.after => {
                    anyhow::bail!("story wait tiers must have strictly increasing 'after' values")
                }
                _ => {}
            }

            let phrases = PhraseSet::new(config.phrases.iter().cloned()).ok_or_else(|| {
                anyhow::anyhow!("story.wait_tiers[{index}] must have at least one non-empty phrase")
            })?;

            tiers.push(WaitTier {
                after,
                phrases,
                reprompt: config.reprompt.clone(),
            });
        }

        if tiers.is_empty() {
            anyhow::bail!("story.wait_tiers must define at least one tier");
        }

        Ok(Self { tiers })
    }

    /// Index and tier applying to a story pending for `elapsed`
    pub fn select(&self, elapsed: Duration) -> (usize, &WaitTier) {
        let index = self
            .tiers
            .iter()
            .rposition(|tier| tier.after <= elapsed)
            .unwrap_or(0);
        (index, &self.tiers[index])
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use fabula_config::StoryConfig;

    use super::*;

    fn tier(after: &str, phrase: &str) -> WaitTierConfig {
        WaitTierConfig {
            after: after.to_owned(),
            phrases: vec![phrase.to_owned()],
            reprompt: format!("{phrase}?"),
        }
    }

    #[test]
    fn default_tiers_follow_elapsed_time() {
        let tiers = WaitTiers::from_config(&StoryConfig::default().wait_tiers).unwrap();

        assert_eq!(tiers.len(), 3);
        assert_eq!(tiers.select(Duration::ZERO).0, 0);
        assert_eq!(tiers.select(Duration::from_secs(44)).0, 0);
        assert_eq!(tiers.select(Duration::from_secs(45)).0, 1);
        assert_eq!(tiers.select(Duration::from_secs(46)).0, 1);
        assert_eq!(tiers.select(Duration::from_secs(89)).0, 1);
        assert_eq!(tiers.select(Duration::from_secs(91)).0, 2);
        assert_eq!(tiers.select(Duration::from_secs(3600)).0, 2);
    }

    #[test]
    fn selected_phrase_comes_from_its_tier() {
        let tiers = WaitTiers::from_config(&[tier("0s", "short"), tier("10s", "long")]).unwrap();

        let (_, selected) = tiers.select(Duration::from_secs(12));
        assert_eq!(selected.phrases.pick(), "long");
        assert_eq!(selected.reprompt, "long?");
    }

    #[test]
    fn first_tier_must_start_at_zero() {
        let err = WaitTiers::from_config(&[tier("5s", "late")]).unwrap_err();
        assert!(err.to_string().contains("start at 0s"));
    }

    #[test]
    fn thresholds_must_increase() {
        let err = WaitTiers::from_config(&[tier("0s", "a"), tier("30s", "b"), tier("30s", "c")]).unwrap_err();
        assert!(err.to_string().contains("strictly increasing"));
    }

    #[test]
    fn empty_tiers_are_rejected() {
        assert!(WaitTiers::from_config(&[]).is_err());
        assert!(WaitTiers::from_config(&[tier("0s", "  ")]).is_err());
    }
}

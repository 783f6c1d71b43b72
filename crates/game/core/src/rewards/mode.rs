use super::RewardMetric;

/// Collection focus chosen when a session starts.
///
/// `Gather` favours gold and materials, `Combat` favours exp and the
/// enhancement currency, `Balanced` applies no bonus at all.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Default,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum CollectMode {
    Gather,
    Combat,
    #[default]
    Balanced,
}

impl CollectMode {
    /// Whether this mode boosts `metric`.
    pub const fn favours(self, metric: RewardMetric) -> bool {
        matches!(
            (self, metric),
            (Self::Gather, RewardMetric::Gold)
                | (Self::Gather, RewardMetric::Material)
                | (Self::Combat, RewardMetric::Exp)
                | (Self::Combat, RewardMetric::SpecialCurrency)
        )
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn balanced_never_boosts() {
        for metric in RewardMetric::iter() {
            assert!(!CollectMode::Balanced.favours(metric));
        }
    }

    #[test]
    fn gather_and_combat_split_the_metrics() {
        for metric in RewardMetric::iter() {
            let gather = CollectMode::Gather.favours(metric);
            let combat = CollectMode::Combat.favours(metric);
            assert!(gather ^ combat, "{metric} must be favoured by exactly one mode");
        }
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(CollectMode::from_str("gather"), Ok(CollectMode::Gather));
        assert_eq!(CollectMode::from_str("COMBAT"), Ok(CollectMode::Combat));
        assert!(CollectMode::from_str("idle").is_err());
        assert_eq!(CollectMode::Balanced.to_string(), "BALANCED");
    }
}

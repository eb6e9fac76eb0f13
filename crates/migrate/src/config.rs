//! Contains the persisted [ChainConfig] and the hard-fork rewrite applied at sealing.
//!
//! Only the fields the sealer touches are modeled; everything else in the stored JSON document
//! round-trips untouched through `extra`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The chain configuration stored in the backing store at the genesis hash.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChainConfig {
    /// London activation height.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub london_block: Option<u64>,
    /// Arrow Glacier activation height.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrow_glacier_block: Option<u64>,
    /// Gray Glacier activation height.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gray_glacier_block: Option<u64>,
    /// Merge netsplit activation height.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_netsplit_block: Option<u64>,
    /// The total difficulty at which the chain switches to proof of stake.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminal_total_difficulty: Option<u64>,
    /// Whether the terminal total difficulty has already been passed.
    pub terminal_total_difficulty_passed: bool,
    /// Bedrock activation height.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrock_block: Option<u64>,
    /// Regolith activation time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regolith_time: Option<u64>,
    /// The legacy fee-parameter block, replaced by `optimism` at sealing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kroma: Option<FeeParams>,
    /// The post-transition fee-parameter block.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimism: Option<FeeParams>,
    /// Every other field of the stored document, preserved verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// The EIP-1559 fee parameters embedded in the chain config. The legacy and post-transition
/// blocks share this shape; sealing copies the parameters field by field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeeParams {
    /// EIP-1559 base-fee change denominator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eip1559_denominator: Option<u64>,
    /// EIP-1559 gas-target elasticity multiplier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eip1559_elasticity: Option<u64>,
    /// Base-fee change denominator from the Canyon upgrade on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eip1559_denominator_canyon: Option<u64>,
}

impl ChainConfig {
    /// Rewrites the config so the chain transitions at block `number`: the pre-merge legacy
    /// forks and Bedrock all activate there, Regolith from time zero, the terminal total
    /// difficulty is zeroed and marked passed, and the legacy fee parameters move into their
    /// post-transition shape.
    pub fn activate_transition(&mut self, number: u64) {
        self.london_block = Some(number);
        self.arrow_glacier_block = Some(number);
        self.gray_glacier_block = Some(number);
        self.merge_netsplit_block = Some(number);
        self.terminal_total_difficulty = Some(0);
        self.terminal_total_difficulty_passed = true;

        self.bedrock_block = Some(number);
        self.regolith_time = Some(0);
        if let Some(legacy) = self.kroma.take() {
            self.optimism = Some(FeeParams {
                eip1559_denominator: legacy.eip1559_denominator,
                eip1559_elasticity: legacy.eip1559_elasticity,
                eip1559_denominator_canyon: legacy.eip1559_denominator_canyon,
            });
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const STORED_CONFIG: &str = r#"{
        "chainId": 7791,
        "homesteadBlock": 0,
        "berlinBlock": 0,
        "terminalTotalDifficultyPassed": false,
        "kroma": {
            "eip1559Denominator": 50,
            "eip1559Elasticity": 6,
            "eip1559DenominatorCanyon": 250
        }
    }"#;

    #[test]
    fn test_activation_rewrite() {
        let mut config: ChainConfig = serde_json::from_str(STORED_CONFIG).unwrap();
        config.activate_transition(4061224);

        assert_eq!(config.london_block, Some(4061224));
        assert_eq!(config.arrow_glacier_block, Some(4061224));
        assert_eq!(config.gray_glacier_block, Some(4061224));
        assert_eq!(config.merge_netsplit_block, Some(4061224));
        assert_eq!(config.bedrock_block, Some(4061224));
        assert_eq!(config.regolith_time, Some(0));
        assert_eq!(config.terminal_total_difficulty, Some(0));
        assert!(config.terminal_total_difficulty_passed);
    }

    #[test]
    fn test_fee_params_move_to_new_shape() {
        let mut config: ChainConfig = serde_json::from_str(STORED_CONFIG).unwrap();
        config.activate_transition(1);

        assert_eq!(config.kroma, None);
        let params = config.optimism.unwrap();
        assert_eq!(params.eip1559_denominator, Some(50));
        assert_eq!(params.eip1559_elasticity, Some(6));
        assert_eq!(params.eip1559_denominator_canyon, Some(250));
    }

    #[test]
    fn test_unmodeled_fields_roundtrip() {
        let mut config: ChainConfig = serde_json::from_str(STORED_CONFIG).unwrap();
        config.activate_transition(7);

        let encoded = serde_json::to_value(&config).unwrap();
        assert_eq!(encoded["chainId"], 7791);
        assert_eq!(encoded["homesteadBlock"], 0);
        assert_eq!(encoded["berlinBlock"], 0);
        assert_eq!(encoded["optimism"]["eip1559Elasticity"], 6);
        assert!(encoded.get("kroma").is_none());
    }
}

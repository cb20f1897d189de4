//! Session configuration: wire indicators and encode/decode options.

use crate::error::ValidationError;
use crate::limits::{DEFAULT_ID_INDICATOR, DEFAULT_INSTRUCTION_INDICATOR};

/// The two reserved prefixes that give plain JSON fields their roles.
///
/// Field names starting with `id` introduce records and values starting with
/// `id` are links. Field names starting with `instruction` carry
/// document-level instructions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indicators {
    id: String,
    instruction: String,
}

impl Indicators {
    /// Creates a validated pair of indicators.
    ///
    /// Both must be non-empty and neither may be a prefix of the other,
    /// otherwise a field could match both roles.
    pub fn new(
        id: impl Into<String>,
        instruction: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let id = id.into();
        let instruction = instruction.into();
        if id.is_empty() {
            return Err(ValidationError::EmptyIndicator { which: "id" });
        }
        if instruction.is_empty() {
            return Err(ValidationError::EmptyIndicator { which: "instruction" });
        }
        if id.starts_with(&instruction) || instruction.starts_with(&id) {
            return Err(ValidationError::IndicatorCollision { id, instruction });
        }
        Ok(Self { id, instruction })
    }

    /// Prefix of record identifiers.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Prefix of instruction field names.
    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    /// Returns true if `s` is shaped like a record identifier.
    #[inline]
    pub fn is_identifier(&self, s: &str) -> bool {
        s.starts_with(&self.id)
    }

    /// Returns true if `name` is an instruction field name.
    #[inline]
    pub fn is_instruction(&self, name: &str) -> bool {
        name.starts_with(&self.instruction)
    }
}

impl Default for Indicators {
    fn default() -> Self {
        Self {
            id: DEFAULT_ID_INDICATOR.to_string(),
            instruction: DEFAULT_INSTRUCTION_INDICATOR.to_string(),
        }
    }
}

/// How identifier suffixes are produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdStrategy {
    /// `<indicator>0`, `<indicator>1`, ... in assignment order.
    #[default]
    Sequential,
    /// `<indicator><uuid v4>`, checked against every identifier issued so far.
    Random,
}

/// What the decoder does when a record introduction is followed by
/// something other than an object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IntroductionPolicy {
    /// Fail with [`DecodeError::MalformedIntroduction`](crate::DecodeError::MalformedIntroduction).
    #[default]
    Reject,
    /// Drop the introduction, skip its value and keep decoding.
    Skip,
}

/// Options for encoding documents.
#[derive(Debug, Clone, Default)]
pub struct EncodeOptions {
    /// Wire indicators.
    pub indicators: Indicators,
    /// Identifier suffix strategy.
    pub id_strategy: IdStrategy,
    /// Skip the reserved-prefix check on attribute values and field names.
    ///
    /// Only safe when the caller already guarantees that no value starts with
    /// either indicator.
    pub skip_validation: bool,
}

impl EncodeOptions {
    /// Creates default encoding options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses the given indicators.
    pub fn with_indicators(mut self, indicators: Indicators) -> Self {
        self.indicators = indicators;
        self
    }

    /// Uses the given identifier strategy.
    pub fn with_id_strategy(mut self, strategy: IdStrategy) -> Self {
        self.id_strategy = strategy;
        self
    }
}

/// Options for decoding documents.
#[derive(Debug, Clone, Default)]
pub struct DecodeOptions {
    /// Wire indicators. Must match the ones used for encoding.
    pub indicators: Indicators,
    /// Handling of malformed record introductions.
    pub introductions: IntroductionPolicy,
}

impl DecodeOptions {
    /// Creates default decoding options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses the given indicators.
    pub fn with_indicators(mut self, indicators: Indicators) -> Self {
        self.indicators = indicators;
        self
    }

    /// Uses the given malformed-introduction policy.
    pub fn with_introductions(mut self, policy: IntroductionPolicy) -> Self {
        self.introductions = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_indicators() {
        let indicators = Indicators::default();
        assert_eq!(indicators.id(), "%ID:");
        assert_eq!(indicators.instruction(), "%CHECK:");
        assert!(indicators.is_identifier("%ID:12"));
        assert!(!indicators.is_identifier("ID:12"));
        assert!(indicators.is_instruction("%CHECK:0"));
    }

    #[test]
    fn test_rejects_empty_indicator() {
        assert_eq!(
            Indicators::new("", "!"),
            Err(ValidationError::EmptyIndicator { which: "id" })
        );
        assert_eq!(
            Indicators::new("#", ""),
            Err(ValidationError::EmptyIndicator { which: "instruction" })
        );
    }

    #[test]
    fn test_rejects_overlapping_indicators() {
        assert!(matches!(
            Indicators::new("%", "%CHECK:"),
            Err(ValidationError::IndicatorCollision { .. })
        ));
        assert!(matches!(
            Indicators::new("@ref:", "@"),
            Err(ValidationError::IndicatorCollision { .. })
        ));
        assert!(Indicators::new("@", "!").is_ok());
    }
}

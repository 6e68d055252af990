//! A single text-to-speech request

use super::voice::Voice;
use log::warn;

/// Identifies one utterance in logs and lifecycle events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UtteranceId(pub u64);

/// One pending or in-flight speech request
///
/// `rate` holds the speed control's value exactly as it was entered.
/// Backends turn it into a multiplier when they speak.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub id: UtteranceId,
    pub text: String,
    pub voice: Option<Voice>,
    pub rate: String,
}

impl Utterance {
    pub fn new(id: UtteranceId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            voice: None,
            rate: "1".to_string(),
        }
    }

    /// Rate as a speed multiplier (1.0 = normal)
    ///
    /// Unparseable or non-positive values fall back to normal speed.
    pub fn rate_multiplier(&self) -> f32 {
        match self.rate.trim().parse::<f32>() {
            Ok(rate) if rate.is_finite() && rate > 0.0 => rate,
            _ => {
                warn!("Invalid rate {:?}, using normal speed", self.rate);
                1.0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_multiplier() {
        let mut utterance = Utterance::new(UtteranceId(1), "Hello");
        assert_eq!(utterance.rate_multiplier(), 1.0);

        utterance.rate = "1.5".to_string();
        assert_eq!(utterance.rate_multiplier(), 1.5);

        utterance.rate = "fast".to_string();
        assert_eq!(utterance.rate_multiplier(), 1.0);

        utterance.rate = "0".to_string();
        assert_eq!(utterance.rate_multiplier(), 1.0);
    }
}

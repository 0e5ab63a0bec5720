use std::fmt;

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Shape;

/// Supplies new pieces, each drawn uniformly at random from the 7 presets.
///
/// Draws are independent; there is no bag or drought protection.
///
/// # Example
///
/// ```
/// use blockfall_engine::{PieceSeed, PieceSource};
///
/// let seed: PieceSeed = "000102030405060708090a0b0c0d0e0f".parse().unwrap();
/// let mut a = PieceSource::with_seed(seed);
/// let mut b = PieceSource::with_seed(seed);
///
/// for _ in 0..10 {
///     assert_eq!(a.draw().kind(), b.draw().kind());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct PieceSource {
    seed: PieceSeed,
    rng: Pcg32,
}

impl Default for PieceSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceSource {
    /// Creates a piece source with a random seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed for a reproducible sequence.
    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        Self {
            seed,
            rng: Pcg32::from_seed(seed.0),
        }
    }

    /// The seed this source was created with.
    #[must_use]
    pub fn seed(&self) -> PieceSeed {
        self.seed
    }

    /// Draws the next piece, positioned at the origin.
    pub fn draw(&mut self) -> Shape {
        Shape::random(&mut self.rng)
    }
}

/// Seed for deterministic piece generation.
///
/// A 128-bit seed. It serializes as, and parses from, a 32-character hex
/// string so it can be shown to the player and passed back on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceSeed([u8; 16]);

impl PieceSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn to_bytes(self) -> [u8; 16] {
        self.0
    }
}

impl fmt::Display for PieceSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid hex seed: {_0}")]
pub struct ParseSeedError(#[error(not(source))] String);

impl std::str::FromStr for PieceSeed {
    type Err = ParseSeedError;

    fn from_str(hex_str: &str) -> Result<Self, Self::Err> {
        if hex_str.len() != 32 {
            return Err(ParseSeedError(format!(
                "expected 32 characters, got {}",
                hex_str.len()
            )));
        }
        let num = u128::from_str_radix(hex_str, 16)
            .map_err(|e| ParseSeedError(format!("{hex_str} ({e})")))?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PieceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

/// Allows generating random `PieceSeed` values with `rng.random()`.
impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_is_32_char_hex_string() {
        let seed: PieceSeed = rand::rng().random();
        let serialized = serde_json::to_string(&seed).unwrap();
        let hex_str = serialized.trim_matches('"');
        assert_eq!(hex_str.len(), 32);
        assert!(hex_str.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_known_value_sequential_bytes() {
        let seed = PieceSeed::from_bytes([
            0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0xFE, 0xDC, 0xBA, 0x98, 0x76, 0x54,
            0x32, 0x10,
        ]);
        let serialized = serde_json::to_string(&seed).unwrap();
        assert_eq!(serialized, "\"0123456789abcdeffedcba9876543210\"");

        let deserialized: PieceSeed = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, seed);
    }

    #[test]
    fn test_parse_accepts_uppercase() {
        let seed: PieceSeed = "0123456789ABCDEFFEDCBA9876543210".parse().unwrap();
        assert_eq!(seed.to_string(), "0123456789abcdeffedcba9876543210");
    }

    #[test]
    fn test_parse_errors() {
        assert!("".parse::<PieceSeed>().is_err());
        assert!("0123456789abcdef0123456789abcde".parse::<PieceSeed>().is_err());
        assert!(
            "ghijklmnopqrstuvwxyzghijklmnopqr"
                .parse::<PieceSeed>()
                .is_err()
        );
        let err = serde_json::from_str::<PieceSeed>("\"abc\"").unwrap_err();
        assert!(err.to_string().contains("invalid hex seed"));
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let seed = PieceSeed::from_bytes([0x5A; 16]);
        let mut a = PieceSource::with_seed(seed);
        let mut b = PieceSource::with_seed(seed);
        for _ in 0..50 {
            assert_eq!(a.draw(), b.draw());
        }
        assert_eq!(a.seed(), seed);
    }

    #[test]
    fn test_draws_start_at_origin() {
        let mut source = PieceSource::with_seed(PieceSeed::from_bytes([1; 16]));
        for _ in 0..20 {
            assert_eq!(source.draw().position(), crate::Position::new(0, 0));
        }
    }
}

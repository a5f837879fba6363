use crate::error::GeneratorError;
use crate::Generator;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use linkhop_core::ShortCode;
use rand::rngs::OsRng;
use rand::TryRngCore;
use typed_builder::TypedBuilder;

pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Configures a [`RandomGenerator`].
#[derive(Debug, Clone, Copy, TypedBuilder)]
pub struct RandomGeneratorSettings {
    /// Number of characters in each generated code.
    #[builder(default = DEFAULT_CODE_LENGTH)]
    pub length: usize,
}

/// Generates codes from the operating system's CSPRNG.
///
/// `length` random bytes are encoded as unpadded URL-safe base64 and the
/// first `length` characters are kept. The encoding of `n` bytes has
/// `ceil(4n / 3)` characters, so the output is never short, and every
/// character is in `[A-Za-z0-9_-]`.
#[derive(Debug, Clone)]
pub struct RandomGenerator {
    length: usize,
}

impl RandomGenerator {
    pub fn new(settings: RandomGeneratorSettings) -> Result<Self, GeneratorError> {
        if settings.length == 0 {
            return Err(GeneratorError::InvalidLength(settings.length));
        }
        Ok(Self {
            length: settings.length,
        })
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl Generator for RandomGenerator {
    fn generate(&self) -> Result<ShortCode, GeneratorError> {
        let mut bytes = vec![0u8; self.length];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| GeneratorError::RandomSourceUnavailable(e.to_string()))?;

        let mut encoded = URL_SAFE_NO_PAD.encode(&bytes);
        encoded.truncate(self.length);
        Ok(ShortCode::generated(encoded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn generator(length: usize) -> RandomGenerator {
        RandomGenerator::new(RandomGeneratorSettings::builder().length(length).build()).unwrap()
    }

    #[test]
    fn default_length_is_six() {
        let generator = RandomGenerator::new(RandomGeneratorSettings::builder().build()).unwrap();
        let code = generator.generate().unwrap();
        assert_eq!(code.as_str().len(), 6);
        assert!(matches!(code, ShortCode::Generated(_)));
    }

    #[test]
    fn zero_length_is_rejected() {
        let err = RandomGenerator::new(RandomGeneratorSettings::builder().length(0).build())
            .unwrap_err();
        assert_eq!(err, GeneratorError::InvalidLength(0));
    }

    #[test]
    fn output_stays_inside_alias_alphabet_for_every_length() {
        for length in 1..=linkhop_core::MAX_SHORT_CODE_LEN {
            let generator = generator(length);
            for _ in 0..20 {
                let code = generator.generate().unwrap();
                assert_eq!(code.as_str().len(), length);
                assert!(
                    linkhop_core::validate_short_code(code.as_str()).is_ok(),
                    "generated code {code} is not a valid alias"
                );
            }
        }
    }

    #[test]
    fn codes_are_not_repeated() {
        let generator = generator(12);
        let codes: HashSet<String> = (0..1_000)
            .map(|_| generator.generate().unwrap().as_str().to_owned())
            .collect();
        assert_eq!(codes.len(), 1_000);
    }

    #[test]
    fn generator_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RandomGenerator>();
    }
}

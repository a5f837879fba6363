pub mod error;
pub mod random;

pub use error::GeneratorError;
pub use random::{RandomGenerator, RandomGeneratorSettings};

use linkhop_core::ShortCode;

/// Trait for generating short codes.
///
/// Implementations are pure generators that don't interact with storage.
/// They do not guarantee uniqueness; callers check the store and rely on its
/// uniqueness constraint.
pub trait Generator: Send + Sync + 'static {
    /// Produces a candidate code of the configured length.
    fn generate(&self) -> Result<ShortCode, GeneratorError>;
}

//! 非对称部分：用公钥“包裹”（wrap）对称密钥的两种方案。
pub mod systems;
pub mod traits;

pub use systems::post_quantum::{MlKemScheme, MlKemWrapMode};
pub use systems::traditional::RsaOaepScheme;
pub use traits::{KeyExchangeScheme, TimingSample, WrappedKey};

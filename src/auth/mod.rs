pub mod claims;
pub mod clock;
pub mod errors;
pub mod extractors;
pub mod issuer;
pub mod keys;
pub mod password;
pub mod verifier;

pub use claims::*;
pub use clock::*;
pub use errors::*;
pub use extractors::*;
pub use issuer::*;
pub use keys::*;
pub use verifier::*;

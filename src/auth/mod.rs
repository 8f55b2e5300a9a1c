pub mod jwt;
pub mod password;

mod extract;

pub use extract::{AuthUser, MaybeAuthUser};

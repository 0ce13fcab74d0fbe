//! Authentication state trait and macro.

use crate::issuer::TokenIssuer;

/// Trait for state types that can verify access tokens.
pub trait HasAuthBackend {
    fn issuer(&self) -> &TokenIssuer;
}

/// Macro to implement `HasAuthBackend` for state structs with the standard field.
///
/// The struct must have an `issuer: Arc<TokenIssuer>` field.
///
/// # Example
/// ```ignore
/// use crate::impl_has_auth_backend;
///
/// #[derive(Clone)]
/// pub struct MyState {
///     pub issuer: Arc<TokenIssuer>,
///     // ... other fields
/// }
///
/// impl_has_auth_backend!(MyState);
/// ```
#[macro_export]
macro_rules! impl_has_auth_backend {
    ($state_type:ty) => {
        impl $crate::auth::HasAuthBackend for $state_type {
            fn issuer(&self) -> &$crate::issuer::TokenIssuer {
                &self.issuer
            }
        }
    };
}

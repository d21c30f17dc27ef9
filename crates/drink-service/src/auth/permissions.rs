//! Permission enforcement against verified claims.

use crate::auth::claims::Claims;
use crate::auth::error::AuthError;

/// Check that `claims` grant `permission`.
///
/// Matching is exact membership in the `permissions` array.
///
/// # Errors
///
/// - `PermissionsClaimMissing` if the token has no `permissions` claim at all,
///   which points at issuer misconfiguration (RBAC disabled for the API)
/// - `PermissionDenied` if the claim exists but lacks `permission`
pub fn check_permissions(permission: &str, claims: &Claims) -> Result<bool, AuthError> {
    if claims.permissions_claim().is_none() {
        tracing::warn!(
            target: "drinks.auth.permissions",
            "Token has no permissions claim; check RBAC settings at the issuer"
        );
        return Err(AuthError::PermissionsClaimMissing);
    }

    if !claims.permissions().contains(&permission) {
        tracing::debug!(
            target: "drinks.auth.permissions",
            required = %permission,
            "Required permission not granted"
        );
        return Err(AuthError::PermissionDenied);
    }

    Ok(true)
}

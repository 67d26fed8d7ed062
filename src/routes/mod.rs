/// Router Module Index
///
/// Organizes the routing surface into security-segregated modules so the
/// access level of every endpoint is visible at the module level rather
/// than buried in individual handlers.

/// Routes accessible to all clients: health, auth entry points, and the
/// public blog reads.
pub mod public;

/// Routes protected by the `AuthUser` extractor middleware. Requires a
/// valid bearer token.
pub mod authenticated;

/// Routes whose handlers additionally require the ADMIN role through the
/// authorization policy.
pub mod admin;

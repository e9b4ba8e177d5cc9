//! Handler for the service root.

/// Plain-text banner confirming the service is up.
///
/// # Endpoint
///
/// `GET /`
pub async fn root_handler() -> &'static str {
    "Welcome to the user registry API"
}

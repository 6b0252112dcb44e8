//! Deep links into the requests area.
//!
//! Notifications and the copy-link affordance address a request by its
//! technical-responsibility number, not by its internal id. The link shape
//! is a pre-existing client convention and must stay stable.

/// Client-side route for the requests area.
pub const REQUESTS_AREA_PATH: &str = "/reformas";

/// Build the deep link for a request, keyed by its ART number.
pub fn request_link(art_number: &str) -> String {
    format!(
        "{REQUESTS_AREA_PATH}?art={}",
        urlencoding::encode(art_number)
    )
}

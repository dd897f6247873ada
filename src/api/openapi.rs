//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

use super::handlers::{rooms, stats, system};

/// Generated OpenAPI description of every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "roomcast",
        description = "Room-scoped WebSocket publish/subscribe hub. Clients connect to `/ws?room=<name>&clientId=<id>`; the REST endpoints below inspect and publish into rooms."
    ),
    paths(
        system::health_handler,
        stats::stats_handler,
        rooms::list_rooms,
        rooms::get_room,
        rooms::publish_message,
    ),
    tags(
        (name = "System", description = "Health and hub statistics"),
        (name = "Rooms", description = "Room membership and server-side publishing"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/v1/stats",
            "/api/v1/rooms",
            "/api/v1/rooms/{room}",
            "/api/v1/rooms/{room}/messages",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}

//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{bookings, health, items, requests, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Sharestead API",
        version = "0.1.0",
        description = "Peer-to-peer item sharing catalog REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    paths(
        // Health
        health::health_check,
        // Users
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        // Items
        items::create_item,
        items::update_item,
        items::get_item,
        items::list_own_items,
        items::search_items,
        items::add_comment,
        // Bookings
        bookings::create_booking,
        bookings::approve_booking,
        bookings::get_booking,
        bookings::list_by_booker,
        bookings::list_by_item_owner,
        // Requests
        requests::create_request,
        requests::list_own_requests,
        requests::list_other_requests,
        requests::get_request,
    ),
    components(
        schemas(
            // Users
            crate::models::user::User,
            crate::models::user::UserShort,
            crate::models::user::CreateUser,
            crate::models::user::UpdateUser,
            // Items
            crate::models::item::Item,
            crate::models::item::ItemShort,
            crate::models::item::ItemDetails,
            crate::models::item::CreateItem,
            crate::models::item::UpdateItem,
            // Bookings
            crate::models::booking::BookingStatus,
            crate::models::booking::BookingState,
            crate::models::booking::BookingDetails,
            crate::models::booking::BookingBrief,
            crate::models::booking::CreateBooking,
            // Comments
            crate::models::comment::CommentDetails,
            crate::models::comment::CreateComment,
            // Requests
            crate::models::request::ItemRequest,
            crate::models::request::RequestDetails,
            crate::models::request::CreateRequest,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "User management"),
        (name = "items", description = "Item catalog and comments"),
        (name = "bookings", description = "Booking lifecycle"),
        (name = "requests", description = "Item request bulletin board")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

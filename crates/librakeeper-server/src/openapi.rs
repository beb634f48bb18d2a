use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Librakeeper Search API",
        version = "0.1.0",
        description = "Asynchronous ISBN lookup across online bookshops."
    ),
    paths(crate::routes::search, crate::routes::health),
    components(schemas(
        crate::dto::SearchResponse,
        crate::dto::BookResponse,
        crate::dto::HealthResponse,
        crate::dto::ErrorResponse,
    )),
    tags(
        (name = "search", description = "ISBN search"),
        (name = "system", description = "Health and system status"),
    )
)]
pub struct ApiDoc;

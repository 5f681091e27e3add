use crate::AppState;
use crate::api::handlers::{chat, conversations, corpus, health, index, modes, search};
use axum::{
    Json, Router,
    response::Html,
    routing::{get, post},
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;

/// Largest accepted request body.
const MAX_BODY_BYTES: usize = 1024 * 1024;

const INDEX_HTML: &str = include_str!("static/index.html");

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Adalat API",
        description = "Question answering and search over the Bangladesh legal corpus"
    ),
    paths(
        health::health,
        chat::chat,
        search::search,
        conversations::get_conversation,
        conversations::delete_conversation,
        corpus::stats,
        corpus::recent,
        corpus::topics,
        corpus::topic,
        modes::list_modes,
        index::build_index,
    ),
    components(schemas(
        crate::types::ChatRequest,
        crate::types::ChatResponse,
        crate::types::SearchRequest,
        crate::types::SearchResponse,
        crate::types::SearchHit,
        crate::types::ChunkMetadata,
        crate::types::ChunkType,
        crate::types::HealthResponse,
        crate::types::BuildIndexResponse,
        crate::types::ChatMessage,
        crate::types::MessageRole,
        crate::rag::search::SearchFilters,
        crate::rag::search::YearRange,
        crate::rag::search::SearchStrategy,
        crate::rag::prompt::AssistantMode,
        crate::rag::prompt::ModeInfo,
        crate::corpus::CorpusStats,
        crate::corpus::stats::ActSummary,
        crate::corpus::topics::CategoryCount,
        crate::corpus::topics::CategoryActs,
        conversations::ConversationDetails,
    )),
    tags(
        (name = "chat", description = "Question answering"),
        (name = "search", description = "Retrieval"),
        (name = "conversations", description = "Conversation history"),
        (name = "corpus", description = "Corpus statistics and topics"),
        (name = "index", description = "Vector index management"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

async fn index_page() -> Html<&'static str> {
    Html(INDEX_HTML)
}

#[cfg(not(feature = "swagger-ui"))]
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/chat", post(chat::chat))
        .route("/search", post(search::search))
        .route(
            "/conversations/{id}",
            get(conversations::get_conversation).delete(conversations::delete_conversation),
        )
        .route("/stats", get(corpus::stats))
        .route("/acts/recent", get(corpus::recent))
        .route("/topics", get(corpus::topics))
        .route("/topics/{name}", get(corpus::topic))
        .route("/modes", get(modes::list_modes))
        .route("/index/build", post(index::build_index))
}

/// The full application: web page, `/api` routes, OpenAPI document and
/// middleware.
pub fn create_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/", get(index_page))
        .nest("/api", api_routes());

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui").url("/api/openapi.json", ApiDoc::openapi()),
    );
    #[cfg(not(feature = "swagger-ui"))]
    let router = router.route("/api/openapi.json", get(openapi_json));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

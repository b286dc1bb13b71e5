//! HTTP adapter: binds the GraphQL executor to axum.
//!
//! One endpoint, `/graphql`: POST executes GraphQL, GET serves the
//! Apollo Sandbox page, OPTIONS is answered by the CORS layer.

use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::State,
    http::HeaderMap,
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{self, JwtSecret};
use crate::graphql::AppSchema;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub schema: AppSchema,
    pub store: Store,
    pub jwt_secret: JwtSecret,
}

/// Executes a GraphQL request with the current user (if any) attached
/// as request data. User resolution is per request, never cached.
async fn graphql_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = req.into_inner();
    if let Some(user) = auth::authenticate(&state.store, &state.jwt_secret.0, &headers).await {
        request = request.data(user);
    }
    state.schema.execute(request).await.into()
}

async fn apollo_sandbox() -> impl IntoResponse {
    Html(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Hacker News Clone - Apollo Sandbox</title>
    <style>body { margin: 0; overflow: hidden; }</style>
</head>
<body>
    <div id="sandbox" style="width: 100vw; height: 100vh;"></div>
    <script src="https://embeddable-sandbox.cdn.apollographql.com/_latest/embeddable-sandbox.umd.production.min.js"></script>
    <script>
        new window.EmbeddedSandbox({
            target: '#sandbox',
            initialEndpoint: window.location.origin + '/graphql',
        });
    </script>
</body>
</html>"#,
    )
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/graphql", get(apollo_sandbox).post(graphql_handler))
        .route("/", get(apollo_sandbox))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

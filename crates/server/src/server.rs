use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use std::sync::Arc;

use crate::{badges, expenses, groups, transfers, user};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
}

async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(auth_header) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user: Option<user::Model> = user::Entity::find()
        .filter(user::Column::Username.eq(auth_header.username()))
        .filter(user::Column::Password.eq(auth_header.password()))
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let Some(user) = user else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/groups", post(groups::create))
        .route(
            "/groups/{id}/participants",
            get(groups::list_participants).post(groups::add_participant),
        )
        .route("/groups/{id}/balances", get(groups::balances))
        .route("/expenses", post(expenses::create))
        .route(
            "/expenses/{id}",
            get(expenses::get).patch(expenses::update),
        )
        .route("/groups/{id}/net", post(transfers::net))
        .route("/groups/{id}/transfers", get(transfers::list))
        .route("/transfers/{id}/complete", post(transfers::complete))
        .route("/badges", get(badges::catalog))
        .route("/groups/{id}/badges", get(badges::awards))
        .route("/groups/{id}/badges/recompute", post(badges::recompute))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run(engine: Engine, db: DatabaseConnection) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, db, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        db,
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, db, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request as HttpRequest, header};
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use http_body_util::BodyExt;
    use migration::MigratorTrait;
    use sea_orm::{ConnectionTrait, Database, Statement};
    use tower::ServiceExt;

    async fn test_router() -> Router {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        db.execute(Statement::from_sql_and_values(
            db.get_database_backend(),
            "INSERT INTO users (username, password) VALUES (?, ?)",
            vec!["alice".into(), "password".into()],
        ))
        .await
        .unwrap();
        let engine = Engine::builder().database(db.clone()).build();
        router(ServerState {
            engine: Arc::new(engine),
            db,
        })
    }

    fn basic(user: &str, pass: &str) -> String {
        format!("Basic {}", STANDARD.encode(format!("{user}:{pass}")))
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn missing_credentials_are_rejected() {
        let app = test_router().await;
        let res = app
            .oneshot(HttpRequest::get("/badges").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let app = test_router().await;
        let res = app
            .oneshot(
                HttpRequest::get("/badges")
                    .header(header::AUTHORIZATION, basic("alice", "nope"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn group_netting_flow_over_http() {
        let app = test_router().await;

        let res = app
            .clone()
            .oneshot(
                HttpRequest::post("/groups")
                    .header(header::AUTHORIZATION, basic("alice", "password"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"name":"Trip","members":["Bob"]}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let group = json_body(res).await;
        let group_id = group["id"].as_str().unwrap().to_string();

        let res = app
            .clone()
            .oneshot(
                HttpRequest::get(format!("/groups/{group_id}/participants"))
                    .header(header::AUTHORIZATION, basic("alice", "password"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let participants = json_body(res).await;
        let participants = participants["participants"].as_array().unwrap();
        assert_eq!(participants.len(), 2);
        let payer = participants
            .iter()
            .find(|p| p["user_id"] == "alice")
            .unwrap()["id"]
            .as_str()
            .unwrap()
            .to_string();
        let debtor = participants
            .iter()
            .find(|p| p["user_id"].is_null())
            .unwrap()["id"]
            .as_str()
            .unwrap()
            .to_string();

        let expense = serde_json::json!({
            "group_id": group_id,
            "payer_participant_id": payer,
            "title": "Dinner",
            "amount_minor": 2000,
            "split_policy": "equal",
            "shares": [
                { "participant_id": payer, "amount_minor": null, "ratio_bp": null },
                { "participant_id": debtor, "amount_minor": null, "ratio_bp": null }
            ],
            "occurred_at": null
        });
        let res = app
            .clone()
            .oneshot(
                HttpRequest::post("/expenses")
                    .header(header::AUTHORIZATION, basic("alice", "password"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(expense.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let res = app
            .clone()
            .oneshot(
                HttpRequest::post(format!("/groups/{group_id}/net"))
                    .header(header::AUTHORIZATION, basic("alice", "password"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let transfers = json_body(res).await;
        let transfers = transfers["transfers"].as_array().unwrap();
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0]["amount_minor"], 1000);
        assert_eq!(transfers[0]["debtor_participant_id"], debtor.as_str());
    }

    #[tokio::test]
    async fn unknown_expense_is_not_found() {
        let app = test_router().await;
        let res = app
            .oneshot(
                HttpRequest::get(format!("/expenses/{}", uuid::Uuid::new_v4()))
                    .header(header::AUTHORIZATION, basic("alice", "password"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}

//! End-to-end tests of the REST API through the axum router.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::NamedTempFile;
use tower::ServiceExt;

use word_guess::Rules;
use word_guess_server::{
    AdminService, AppState, AuthService, GameRepository, GameSessionManager, router,
};

struct TestApp {
    _db: NamedTempFile,
    repo: GameRepository,
    app: Router,
}

fn setup() -> TestApp {
    let db = NamedTempFile::new().expect("Failed to create temp file");
    let repo = GameRepository::new(db.path().to_str().expect("Invalid path").to_string())
        .expect("Failed to create repository");
    repo.run_migrations().expect("Migrations failed");
    repo.insert_word("TIGER").expect("Insert failed");

    let state = AppState::new(
        GameSessionManager::new(repo.clone(), Rules::default()),
        AuthService::new(repo.clone(), chrono::Duration::hours(24)).with_hash_cost(4),
        AdminService::new(repo.clone()),
    );
    TestApp {
        _db: db,
        repo,
        app: router(state),
    }
}

impl TestApp {
    async fn call(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .expect("Bad request");

        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Router failed");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Body failed")
            .to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, value)
    }

    async fn login(&self, username: &str, password: &str) -> String {
        let (status, body) = self
            .call(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "username": username, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        body["token"].as_str().expect("No token").to_string()
    }

    async fn player(&self, username: &str) -> String {
        let (status, body) = self
            .call(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({ "username": username, "password": "abc1$" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        self.login(username, "abc1$").await
    }
}

#[tokio::test]
async fn test_health() {
    let t = setup();
    let (status, body) = t.call("GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_unknown_route() {
    let t = setup();
    let (status, body) = t.call("GET", "/api/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Endpoint not found");
}

#[tokio::test]
async fn test_register_reports_validation_and_duplicates() {
    let t = setup();
    let (status, body) = t
        .call(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "username": "alice", "password": "abc1$" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Username must contain at least one uppercase letter"
    );

    t.player("Alice").await;
    let (status, body) = t
        .call(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "username": "Alice", "password": "abc1$" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username already exists");
}

#[tokio::test]
async fn test_bad_login_is_unauthorized() {
    let t = setup();
    t.player("Alice").await;
    let (status, body) = t
        .call(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "username": "Alice", "password": "wrong1$" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_game_routes_need_a_token() {
    let t = setup();
    let (status, body) = t.call("POST", "/api/game/start", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "No token provided");

    let (status, body) = t
        .call("GET", "/api/game/status", Some("not-a-token"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token");
}

#[tokio::test]
async fn test_full_game_over_http() {
    let t = setup();
    let token = t.player("Alice").await;

    let (status, body) = t.call("POST", "/api/game/start", Some(&token), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["guesses_remaining"], 5);
    let game_id = body["game_id"].as_i64().expect("No game id");

    // Lowercase input with whitespace is normalized at the edge
    let (status, body) = t
        .call(
            "POST",
            "/api/game/guess",
            Some(&token),
            Some(json!({ "game_id": game_id, "word": " storm " })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["guess"], "STORM");
    assert_eq!(
        body["feedback"],
        json!(["not_in_word", "wrong_position", "not_in_word", "wrong_position", "not_in_word"])
    );
    assert_eq!(body["won"], false);
    assert_eq!(body["guesses_remaining"], 4);
    assert!(body.get("target_word").is_none());

    let (status, body) = t
        .call(
            "POST",
            "/api/game/guess",
            Some(&token),
            Some(json!({ "game_id": game_id, "word": "TIGER" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["won"], true);
    assert_eq!(body["completed"], true);

    let (status, body) = t
        .call(
            "POST",
            "/api/game/guess",
            Some(&token),
            Some(json!({ "game_id": game_id, "word": "TIGER" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Game already completed");

    let (status, body) = t.call("GET", "/api/game/status", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["games_played_today"], 1);
    assert_eq!(body["remaining_games"], 2);
}

#[tokio::test]
async fn test_loss_reveals_target_word() {
    let t = setup();
    let token = t.player("Alice").await;
    let (_, body) = t.call("POST", "/api/game/start", Some(&token), None).await;
    let game_id = body["game_id"].as_i64().expect("No game id");

    let mut last = Value::Null;
    for _ in 0..5 {
        let (status, body) = t
            .call(
                "POST",
                "/api/game/guess",
                Some(&token),
                Some(json!({ "game_id": game_id, "word": "BREAD" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        last = body;
    }
    assert_eq!(last["completed"], true);
    assert_eq!(last["won"], false);
    assert_eq!(last["target_word"], "TIGER");
}

#[tokio::test]
async fn test_guess_error_statuses() {
    let t = setup();
    let alice = t.player("Alice").await;
    let bobby = t.player("Bobby").await;
    let (_, body) = t.call("POST", "/api/game/start", Some(&alice), None).await;
    let game_id = body["game_id"].as_i64().expect("No game id");

    let (status, body) = t
        .call(
            "POST",
            "/api/game/guess",
            Some(&alice),
            Some(json!({ "game_id": game_id, "word": "TIG3R" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Word must contain only uppercase letters");

    let (status, _) = t
        .call(
            "POST",
            "/api/game/guess",
            Some(&bobby),
            Some(json!({ "game_id": game_id, "word": "TIGER" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = t
        .call(
            "POST",
            "/api/game/guess",
            Some(&alice),
            Some(json!({ "game_id": game_id + 1000, "word": "TIGER" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Game not found");

    for body in [
        json!({ "word": "TIGER" }),
        json!({ "game_id": game_id }),
        json!({ "game_id": game_id, "word": "   " }),
    ] {
        let (status, body) = t
            .call("POST", "/api/game/guess", Some(&alice), Some(body))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Game ID and word are required");
    }
}

#[tokio::test]
async fn test_daily_quota_over_http() {
    let t = setup();
    let token = t.player("Alice").await;
    for _ in 0..3 {
        let (status, _) = t.call("POST", "/api/game/start", Some(&token), None).await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (status, body) = t.call("POST", "/api/game/start", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Daily limit reached. You can play maximum 3 games per day."
    );
}

#[tokio::test]
async fn test_admin_routes() {
    let t = setup();
    let player = t.player("Alice").await;
    let (status, body) = t
        .call("GET", "/api/admin/words", Some(&player), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Admin access required");

    // Role is checked before the query is read
    let (status, body) = t
        .call("GET", "/api/admin/daily-report?date=garbage", Some(&player), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Admin access required");

    AuthService::new(t.repo.clone(), chrono::Duration::hours(1))
        .with_hash_cost(4)
        .create_user("Admin", "admin1$", true)
        .expect("Create failed");
    let admin = t.login("Admin", "admin1$").await;

    let (status, body) = t
        .call(
            "POST",
            "/api/admin/add-word",
            Some(&admin),
            Some(json!({ "word": "apple" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Word \"APPLE\" added successfully");

    let (status, body) = t
        .call(
            "POST",
            "/api/admin/add-word",
            Some(&admin),
            Some(json!({ "word": "APPLE" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Word already exists in database");

    let (status, body) = t.call("GET", "/api/admin/words", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["words"], json!(["APPLE", "TIGER"]));

    let (status, body) = t
        .call("GET", "/api/admin/daily-report?date=2024-13-01", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Date must be in YYYY-MM-DD format");

    let (status, body) = t
        .call("GET", "/api/admin/daily-report", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_games"], 0);

    let (status, _) = t
        .call("GET", "/api/admin/user-report?username=Nobody", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = t
        .call("GET", "/api/admin/user-report?username=Alice", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "Alice");
    assert_eq!(body["total_games"], 0);
}

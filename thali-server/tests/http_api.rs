use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use thali_server::core::build_router;
use thali_server::core::config::BootstrapAdmin;
use thali_server::{Config, ServerState};
use tower::ServiceExt;

const ADMIN_EMAIL: &str = "root@thali.test";
const ADMIN_PASSWORD: &str = "root-password-1";

struct TestApp {
    _dir: TempDir,
    app: Router,
}

fn setup() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::new(dir.path().to_string_lossy().to_string());
    config.bootstrap_admin = Some(BootstrapAdmin {
        email: ADMIN_EMAIL.into(),
        password: ADMIN_PASSWORD.into(),
    });
    let state = ServerState::initialize(&config).unwrap();
    TestApp {
        _dir: dir,
        app: build_router(state),
    }
}

impl TestApp {
    async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }

    async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    async fn token(&self, email: &str, password: &str) -> String {
        let (status, body) = self.login(email, password).await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    async fn command(&self, token: &str, command_id: &str, payload: Value) -> Value {
        let (status, body) = self
            .post(
                "/api/orders/commands",
                token,
                json!({ "command_id": command_id, "payload": payload }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "command transport failed: {body}");
        body
    }
}

/// Franchise with two outlets, one table at the first, and an approved
/// staff member bound to it
struct Floor {
    admin: String,
    staff: String,
    location_id: i64,
    other_location_id: i64,
    table_id: i64,
}

async fn floor(app: &TestApp) -> Floor {
    let admin = app.token(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (status, franchise) = app
        .post("/api/franchises", &admin, json!({ "name": "Spice Route" }))
        .await;
    assert_eq!(status, StatusCode::OK, "{franchise}");
    let franchise_id = franchise["id"].as_i64().unwrap();

    let mut locations = Vec::new();
    for (name, prefix) in [("MG Road", "MGR"), ("Indiranagar", "IND")] {
        let (status, location) = app
            .post(
                "/api/locations",
                &admin,
                json!({
                    "franchise_id": franchise_id,
                    "name": name,
                    "order_prefix": prefix,
                    "cgst_percent": 2.5,
                    "sgst_percent": 2.5
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{location}");
        locations.push(location["id"].as_i64().unwrap());
    }

    let (status, table) = app
        .post(
            "/api/tables",
            &admin,
            json!({ "location_id": locations[0], "number": "T1", "capacity": 4 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{table}");

    let (status, staff) = app
        .send(
            Method::POST,
            "/api/auth/signup",
            None,
            Some(json!({
                "email": "ravi@thali.test",
                "password": "waiter-password",
                "display_name": "Ravi",
                "franchise_id": franchise_id,
                "location_id": locations[0]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{staff}");
    assert_eq!(staff["is_approved"], false);

    // Unapproved accounts cannot sign in
    let (status, _) = app.login("ravi@thali.test", "waiter-password").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, approved) = app
        .send(
            Method::PUT,
            &format!("/api/users/{}", staff["id"]),
            Some(&admin),
            Some(json!({ "is_approved": true })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{approved}");

    Floor {
        staff: app.token("ravi@thali.test", "waiter-password").await,
        admin,
        location_id: locations[0],
        other_location_id: locations[1],
        table_id: table["id"].as_i64().unwrap(),
    }
}

async fn table_status(app: &TestApp, token: &str, location_id: i64, table_id: i64) -> String {
    let (status, tables) = app
        .get(&format!("/api/tables?location_id={location_id}"), token)
        .await;
    assert_eq!(status, StatusCode::OK);
    tables
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["id"].as_i64() == Some(table_id))
        .map(|t| t["status"].as_str().unwrap().to_string())
        .unwrap()
}

#[tokio::test]
async fn test_health_is_public() {
    let app = setup();
    let (status, body) = app.send(Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["epoch"].as_str().is_some_and(|e| !e.is_empty()));
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = setup();
    let (status, _) = app.send(Method::GET, "/api/orders", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(Method::GET, "/api/orders", Some("not-a-token"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.login(ADMIN_EMAIL, "wrong-password").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_reports_permissions() {
    let app = setup();
    let floor = floor(&app).await;

    let (status, me) = app.get("/api/auth/me", &floor.staff).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["user"]["role"], "staff");
    let permissions: Vec<&str> = me["permissions"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|p| p.as_str())
        .collect();
    assert!(permissions.contains(&"orders:transfer"));
    assert!(!permissions.contains(&"orders:settle"));
}

#[tokio::test]
async fn test_dine_in_order_lifecycle() {
    let app = setup();
    let floor = floor(&app).await;

    // Staff opens a dine-in order on T1: Tea 20 x 2 at 2.5% + 2.5%
    let created = app
        .command(
            &floor.staff,
            "cmd-create-1",
            json!({
                "type": "CREATE_ORDER",
                "location_id": floor.location_id,
                "order_type": "dine_in",
                "table_ids": [floor.table_id],
                "items": [{ "name": "Tea", "unit_price": 20.0, "quantity": 2 }]
            }),
        )
        .await;
    assert_eq!(created["success"], true, "{created}");
    let order_id = created["order_id"].as_str().unwrap().to_string();

    let (status, order) = app.get(&format!("/api/orders/{order_id}"), &floor.staff).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["status"], "ongoing");
    assert_eq!(order["subtotal"], 40.0);
    assert_eq!(order["cgst"], 1.0);
    assert_eq!(order["sgst"], 1.0);
    assert_eq!(order["total"], 42.0);
    assert!(order["order_number"].as_str().unwrap().starts_with("MGR-"));
    assert_eq!(
        table_status(&app, &floor.staff, floor.location_id, floor.table_id).await,
        "occupied"
    );

    // Go for bill
    let transferred = app
        .command(&floor.staff, "cmd-transfer-1", json!({ "type": "TRANSFER_ORDER", "order_id": order_id }))
        .await;
    assert_eq!(transferred["success"], true, "{transferred}");

    let (_, pending) = app.get("/api/orders/pending", &floor.staff).await;
    let pending = pending.as_array().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["order_id"], order_id.as_str());
    assert_eq!(
        table_status(&app, &floor.staff, floor.location_id, floor.table_id).await,
        "occupied"
    );

    // Staff may not settle
    let denied = app
        .command(
            &floor.staff,
            "cmd-settle-staff",
            json!({ "type": "SETTLE_ORDER", "order_id": order_id, "method": "cash", "tendered": 50.0 }),
        )
        .await;
    assert_eq!(denied["success"], false);
    assert_eq!(denied["error"]["code"], "PERMISSION_DENIED");

    let accepted = app
        .command(&floor.admin, "cmd-accept-1", json!({ "type": "ACCEPT_ORDER", "order_id": order_id }))
        .await;
    assert_eq!(accepted["success"], true, "{accepted}");

    let settle = json!({ "type": "SETTLE_ORDER", "order_id": order_id, "method": "cash", "tendered": 50.0 });
    let settled = app.command(&floor.admin, "cmd-settle-1", settle.clone()).await;
    assert_eq!(settled["success"], true, "{settled}");

    let (_, order) = app.get(&format!("/api/orders/{order_id}"), &floor.admin).await;
    assert_eq!(order["status"], "settled");
    assert_eq!(
        table_status(&app, &floor.admin, floor.location_id, floor.table_id).await,
        "available"
    );
    let (_, pending) = app.get("/api/orders/pending", &floor.admin).await;
    assert!(pending.as_array().unwrap().is_empty());

    // Same command again is a no-op, a new settle is rejected
    let replayed = app.command(&floor.admin, "cmd-settle-1", settle.clone()).await;
    assert_eq!(replayed["success"], true);
    assert_eq!(replayed["duplicate"], true);

    let again = app.command(&floor.admin, "cmd-settle-2", settle).await;
    assert_eq!(again["success"], false);
    assert_eq!(again["error"]["code"], "ORDER_ALREADY_SETTLED");

    let (_, events) = app.get(&format!("/api/orders/{order_id}/events"), &floor.admin).await;
    // created, items added, transferred, accepted, settled
    assert_eq!(events.as_array().unwrap().len(), 5);

    // Report for today includes the sale
    let (status, report) = app.get("/api/reports/sales", &floor.admin).await;
    assert_eq!(status, StatusCode::OK, "{report}");
    assert_eq!(report["order_count"], 1);
    assert_eq!(report["total"], 42.0);
}

#[tokio::test]
async fn test_staff_confined_to_own_location() {
    let app = setup();
    let floor = floor(&app).await;

    let (status, _) = app
        .get(&format!("/api/orders?location_id={}", floor.other_location_id), &floor.staff)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let rejected = app
        .command(
            &floor.staff,
            "cmd-create-elsewhere",
            json!({
                "type": "CREATE_ORDER",
                "location_id": floor.other_location_id,
                "order_type": "delivery",
                "items": [{ "name": "Dosa", "unit_price": 90.0, "quantity": 1 }]
            }),
        )
        .await;
    assert_eq!(rejected["success"], false);
    assert_eq!(rejected["error"]["code"], "OUTSIDE_TENANT_SCOPE");

    let (status, _) = app.get("/api/reports/sales", &floor.staff).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .post(
            "/api/tables",
            &floor.staff,
            json!({ "location_id": floor.location_id, "number": "T9", "capacity": 2 }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_offline_journal_replay() {
    let app = setup();
    let floor = floor(&app).await;

    let (status, sync) = app.get("/api/sync?since=0", &floor.staff).await;
    assert_eq!(status, StatusCode::OK);
    let epoch = sync["epoch"].as_str().unwrap().to_string();

    let create = json!({
        "command_id": "journal-1",
        "timestamp": 1,
        "operator_id": 0,
        "operator_name": "offline",
        "operator_role": "staff",
        "payload": {
            "type": "CREATE_ORDER",
            "location_id": floor.location_id,
            "order_type": "delivery",
            "items": [{ "name": "Biryani", "unit_price": 180.0, "quantity": 1 }]
        }
    });
    let bogus = json!({
        "command_id": "journal-2",
        "timestamp": 2,
        "operator_id": 0,
        "operator_name": "offline",
        "operator_role": "staff",
        "payload": { "type": "CONFIRM_ORDER", "order_id": "missing" }
    });

    let (status, replay) = app
        .post("/api/sync/replay", &floor.staff, json!({ "commands": [create.clone(), bogus] }))
        .await;
    assert_eq!(status, StatusCode::OK, "{replay}");
    let results = replay["results"].as_array().unwrap();
    assert_eq!(results[0]["success"], true);
    assert_eq!(results[1]["success"], false);

    // Re-sending the journal is harmless
    let (_, replay) = app
        .post("/api/sync/replay", &floor.staff, json!({ "commands": [create] }))
        .await;
    assert_eq!(replay["results"][0]["duplicate"], true);

    let (_, sync) = app
        .get(&format!("/api/sync?since=0&epoch={epoch}"), &floor.staff)
        .await;
    assert_eq!(sync["requires_full_sync"], false);
    assert!(!sync["events"].as_array().unwrap().is_empty());

    let (_, sync) = app.get("/api/sync?since=0&epoch=stale", &floor.staff).await;
    assert_eq!(sync["requires_full_sync"], true);
    assert_eq!(sync["active_orders"].as_array().unwrap().len(), 1);
    assert_eq!(sync["active_orders"][0]["staff_name"], "Ravi");
}

#[tokio::test]
async fn test_receipt_print_falls_back_to_text() {
    let app = setup();
    let floor = floor(&app).await;

    let created = app
        .command(
            &floor.staff,
            "cmd-create-print",
            json!({
                "type": "CREATE_ORDER",
                "location_id": floor.location_id,
                "order_type": "delivery",
                "items": [{ "name": "Masala Dosa", "unit_price": 120.0, "quantity": 1 }]
            }),
        )
        .await;
    let order_id = created["order_id"].as_str().unwrap();

    // No printer configured for the outlet
    let (status, print) = app
        .post(&format!("/api/orders/{order_id}/print"), &floor.staff, json!({}))
        .await;
    assert_eq!(status, StatusCode::OK, "{print}");
    assert_eq!(print["printed"], false);
    assert!(print["text"].as_str().unwrap().contains("Masala Dosa"));
}

#[tokio::test]
async fn test_reconcile_is_admin_only() {
    let app = setup();
    let floor = floor(&app).await;

    let (status, report) = app.get("/api/admin/reconcile", &floor.admin).await;
    assert_eq!(status, StatusCode::OK);
    assert!(report["issues"].as_array().unwrap().is_empty());

    let (status, _) = app.get("/api/admin/reconcile", &floor.staff).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_sales_csv_export() {
    let app = setup();
    let floor = floor(&app).await;

    let request = Request::builder()
        .uri("/api/reports/sales.csv")
        .header(header::AUTHORIZATION, format!("Bearer {}", floor.admin))
        .body(Body::empty())
        .unwrap();
    let response = app.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.starts_with("order_number,settled_at,order_type,tables,items"));
}

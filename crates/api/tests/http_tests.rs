//! End-to-end tests for the router, backed by the in-memory store.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use api::AppState;
use service::{bootstrap, mock::MemoryStore, EmployeeService};

const BODY_LIMIT: usize = 1024 * 1024;

async fn app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    bootstrap::seed_if_empty(store.as_ref()).await.unwrap();
    let state = AppState::new(EmployeeService::new(store.clone()));
    (api::router(state, &["http://localhost:3000".to_string()]), store)
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), BODY_LIMIT).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn text_body(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), BODY_LIMIT).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn with_json(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn with_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn new_employee() -> Value {
    json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "email": "Ada.Lovelace@Example.com",
        "department": "Research",
        "position": "Analyst",
        "hireDate": "2020-01-15",
        "salary": 72000.5
    })
}

// ============================================================
// REST: create / read
// ============================================================

#[tokio::test]
async fn create_returns_201_with_normalised_employee() {
    let (app, _) = app().await;
    let response = send(&app, with_json("POST", "/api/employees", new_employee())).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = json_body(response).await;
    assert_eq!(body["message"], "Employee created successfully");
    assert_eq!(body["employee"]["email"], "ada.lovelace@example.com");
    assert_eq!(body["employee"]["fullName"], "Ada Lovelace");
    assert_eq!(body["employee"]["isActive"], true);
    assert_eq!(body["employee"]["salary"], json!(72000.5));
}

#[tokio::test]
async fn duplicate_email_is_a_field_level_400() {
    let (app, _) = app().await;
    let mut payload = new_employee();
    payload["email"] = json!("JOHN.DOE@company.com");

    let response = send(&app, with_json("POST", "/api/employees", payload)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["error"], "Email already exists");
    assert_eq!(body["errors"][0]["field"], "email");
}

#[tokio::test]
async fn validation_reports_every_failing_field() {
    let (app, store) = app().await;
    let payload = json!({ "firstName": "A", "email": "not-an-email", "salary": -1 });

    let response = send(&app, with_json("POST", "/api/employees", payload)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["error"], "Validation failed");
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    for expected in ["firstName", "lastName", "email", "department", "position", "hireDate", "salary"] {
        assert!(fields.contains(&expected), "missing {expected} in {fields:?}");
    }
    assert_eq!(store.rows().len(), 5);
}

#[tokio::test]
async fn malformed_json_is_400() {
    let (app, _) = app().await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/employees")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "Bad request");
}

#[tokio::test]
async fn missing_employee_is_404() {
    let (app, _) = app().await;
    let response = send(&app, get("/api/employees/9999")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"], "Employee not found");
}

// ============================================================
// REST: update / delete
// ============================================================

#[tokio::test]
async fn update_keeps_own_email_and_rejects_anothers() {
    let (app, store) = app().await;
    let john = store.rows().into_iter().find(|r| r.first_name == "John").unwrap();
    let uri = format!("/api/employees/{}", john.id);

    let mut same_email = new_employee();
    same_email["email"] = json!("john.doe@company.com");
    let response = send(&app, with_json("PUT", &uri, same_email)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["employee"]["firstName"], "Ada");
    assert_eq!(body["message"], "Employee updated successfully");

    let mut stolen = new_employee();
    stolen["email"] = json!("jane.smith@company.com");
    let response = send(&app, with_json("PUT", &uri, stolen)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_of_missing_id_is_404() {
    let (app, _) = app().await;
    let response = send(&app, with_json("PUT", "/api/employees/9999", new_employee())).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn soft_delete_hides_from_listing_but_not_from_lookup() {
    let (app, store) = app().await;
    let jane = store.rows().into_iter().find(|r| r.first_name == "Jane").unwrap();
    let uri = format!("/api/employees/{}", jane.id);

    let request = Request::builder().method("DELETE").uri(&uri).body(Body::empty()).unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["message"], "Employee deleted successfully");

    let body = json_body(send(&app, get(&uri)).await).await;
    assert_eq!(body["employee"]["isActive"], false);

    let list = json_body(send(&app, get("/api/employees")).await).await;
    assert_eq!(list["totalItems"], 4);

    let stats = json_body(send(&app, get("/api/employees/statistics")).await).await;
    assert_eq!(stats["totalEmployees"], 4);
    assert!(stats["departmentStats"].get("HR").is_none());
}

// ============================================================
// REST: listing
// ============================================================

#[tokio::test]
async fn listing_reports_paging_metadata() {
    let (app, _) = app().await;
    let body = json_body(send(&app, get("/api/employees?page=1&size=2&sortBy=lastName")).await).await;

    assert_eq!(body["page"], 1);
    assert_eq!(body["size"], 2);
    assert_eq!(body["totalItems"], 5);
    assert_eq!(body["totalPages"], 3);
    assert_eq!(body["hasNext"], true);
    assert_eq!(body["hasPrevious"], true);

    let names: Vec<&str> = body["employees"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["lastName"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Johnson", "Smith"]);
}

#[tokio::test]
async fn unknown_sort_field_is_400() {
    let (app, _) = app().await;
    let response = send(&app, get("/api/employees?sortBy=password")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["errors"][0]["field"], "sortBy");
}

#[tokio::test]
async fn search_wins_over_department() {
    let (app, _) = app().await;
    let body = json_body(send(&app, get("/api/employees?search=smith&department=Sales")).await).await;
    assert_eq!(body["totalItems"], 1);
    assert_eq!(body["employees"][0]["department"], "HR");

    let body = json_body(send(&app, get("/api/employees?department=Sales")).await).await;
    assert_eq!(body["totalItems"], 1);
    assert_eq!(body["employees"][0]["lastName"], "Johnson");
}

#[tokio::test]
async fn statistics_and_departments_cover_seed_data() {
    let (app, _) = app().await;
    let stats = json_body(send(&app, get("/api/employees/statistics")).await).await;
    assert_eq!(stats["totalEmployees"], 5);
    assert_eq!(stats["departmentStats"]["Engineering"], 1);

    let departments = json_body(send(&app, get("/api/employees/departments")).await).await;
    assert_eq!(departments, json!(["Engineering", "Finance", "HR", "Marketing", "Sales"]));
}

// ============================================================
// REST: health
// ============================================================

#[tokio::test]
async fn health_reports_up_then_down() {
    let (app, store) = app().await;

    let response = send(&app, get("/api/employees/health")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "UP");
    assert_eq!(body["employeeCount"], 5);
    assert_eq!(body["database"], "PostgreSQL");

    store.set_unavailable(true);
    let response = send(&app, get("/api/employees/health")).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(response).await["status"], "DOWN");
}

#[tokio::test]
async fn store_outage_is_a_generic_500() {
    let (app, store) = app().await;
    store.set_unavailable(true);

    let response = send(&app, get("/api/employees")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Database operation failed");
}

// ============================================================
// Web pages
// ============================================================

#[tokio::test]
async fn root_redirects_to_list() {
    let (app, _) = app().await;
    let response = send(&app, get("/")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/employees");
}

#[tokio::test]
async fn list_page_renders_employees_and_stats() {
    let (app, _) = app().await;
    let response = send(&app, get("/employees?sortBy=firstName&sortDirection=desc")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = text_body(response).await;
    assert!(html.contains("john.doe@company.com"));
    assert!(html.contains("5 active employees in 5 departments"));
}

#[tokio::test]
async fn add_form_post_redirects_with_flash() {
    let (app, store) = app().await;
    let form = "firstName=Ada&lastName=Lovelace&email=ada%40example.com&department=Research\
                &position=Analyst&hireDate=2020-01-15&salary=72000";

    let response = send(&app, with_form("/employees/add", form)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/employees");
    let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("flash=success:"));
    assert_eq!(store.rows().len(), 6);
}

#[tokio::test]
async fn invalid_form_rerenders_with_400() {
    let (app, store) = app().await;
    let form = "firstName=A&lastName=Lovelace&email=bad&department=Research\
                &position=Analyst&hireDate=soon&salary=";

    let response = send(&app, with_form("/employees/add", form)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let html = text_body(response).await;
    assert!(html.contains("First name must be between 2 and 50 characters"));
    assert!(html.contains("Please provide a valid email address"));
    assert!(html.contains("Please provide a valid date in YYYY-MM-DD format"));
    assert!(html.contains(r#"value="Lovelace""#));
    assert_eq!(store.rows().len(), 5);
}

#[tokio::test]
async fn duplicate_email_in_form_is_shown_on_the_field() {
    let (app, _) = app().await;
    let form = "firstName=Ada&lastName=Lovelace&email=john.doe%40company.com&department=Research\
                &position=Analyst&hireDate=2020-01-15";

    let response = send(&app, with_form("/employees/add", form)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(text_body(response).await.contains("Email already exists"));
}

#[tokio::test]
async fn flash_is_rendered_once_and_cleared() {
    let (app, _) = app().await;
    let request = Request::builder()
        .uri("/employees")
        .header(header::COOKIE, "flash=success:Saved%20it%21")
        .body(Body::empty())
        .unwrap();

    let response = send(&app, request).await;
    let cleared = response.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
    assert!(cleared.starts_with("flash=;"));
    assert!(cleared.contains("Max-Age=0"));
    assert!(text_body(response).await.contains("Saved it!"));

    let response = send(&app, get("/employees")).await;
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert!(!text_body(response).await.contains("Saved it!"));
}

#[tokio::test]
async fn missing_id_on_web_pages_redirects_with_error() {
    let (app, _) = app().await;
    for request in [
        get("/employees/view/9999"),
        get("/employees/edit/9999"),
        get("/employees/view/abc"),
        with_form("/employees/delete/9999", ""),
    ] {
        let response = send(&app, request).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("flash=error:"));
    }
}

#[tokio::test]
async fn web_delete_soft_deletes() {
    let (app, store) = app().await;
    let mike = store.rows().into_iter().find(|r| r.first_name == "Mike").unwrap();

    let response = send(&app, with_form(&format!("/employees/delete/{}", mike.id), "")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let row = store.rows().into_iter().find(|r| r.id == mike.id).unwrap();
    assert!(!row.is_active);
}

#[tokio::test]
async fn edit_page_is_prefilled_and_updates() {
    let (app, store) = app().await;
    let sarah = store.rows().into_iter().find(|r| r.first_name == "Sarah").unwrap();
    let uri = format!("/employees/edit/{}", sarah.id);

    let html = text_body(send(&app, get(&uri)).await).await;
    assert!(html.contains(r#"value="sarah.williams@company.com""#));

    let form = "firstName=Sarah&lastName=Williams&email=sarah.williams%40company.com\
                &department=Sales&position=Account%20Manager&hireDate=2022-09-20&salary=61000";
    let response = send(&app, with_form(&uri, form)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let row = store.rows().into_iter().find(|r| r.id == sarah.id).unwrap();
    assert_eq!(row.department, "Sales");
    assert_eq!(row.position, "Account Manager");
}

#[tokio::test]
async fn dashboard_lists_recent_employees() {
    let (app, _) = app().await;
    let response = send(&app, get("/dashboard")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = text_body(response).await;
    assert!(html.contains("Total active employees: 5"));
    assert!(html.contains("David Brown"));
}

//! HTML pages: list, add, edit, view, delete and dashboard.
//!
//! Successful submissions answer with a 303 redirect that leaves a flash
//! message behind. Invalid submissions re-render the form with status 400.
//! An unknown id sends the user back to the list with an error flash.

use axum::{
    extract::{
        rejection::{FormRejection, PathRejection, QueryRejection},
        Form, Path, Query, State,
    },
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::error;

use service::{ServiceError, ValidationErrors};

use super::AppState;
use crate::{
    dto::ListParams,
    flash::{self, Flash, IncomingFlash},
    form::EmployeeForm,
    views::{self, FormView, ListView},
};

const LIST_PATH: &str = "/employees";
const RECENT_LIMIT: u32 = 5;

// ---------------------------------------------------------------------------
// Errors and rendering
// ---------------------------------------------------------------------------

/// Failure of an HTML handler.
#[derive(Debug)]
pub enum PageError {
    NotFound,
    BadRequest(String),
    Internal(String),
}

impl From<ServiceError> for PageError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::NotFound(_) => Self::NotFound,
            ServiceError::Validation(errors) => Self::BadRequest(errors.to_string()),
            ServiceError::DuplicateEmail(email) => Self::BadRequest(format!("Email already exists: {email}")),
            ServiceError::Database(e) => Self::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound => flash::redirect(LIST_PATH, Flash::error("Employee not found!")),
            Self::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Html(views::error_page(&message))).into_response()
            }
            Self::Internal(detail) => {
                error!("Error rendering page: {detail}");
                let page = views::error_page("Something went wrong. Please try again later.");
                (StatusCode::INTERNAL_SERVER_ERROR, Html(page)).into_response()
            }
        }
    }
}

/// Render `body`, clearing the flash cookie if the request carried one.
fn render(status: StatusCode, incoming: &IncomingFlash, body: String) -> Response {
    let mut response = (status, Html(body)).into_response();
    if incoming.is_present() {
        if let Ok(value) = HeaderValue::from_str(&flash::clear_cookie()) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    response
}

fn path_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, PageError> {
    path.map(|Path(id)| id).map_err(|_| PageError::NotFound)
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

pub async fn home() -> Redirect {
    Redirect::to(LIST_PATH)
}

pub async fn list(
    State(state): State<AppState>,
    incoming: IncomingFlash,
    query: Result<Query<ListParams>, QueryRejection>,
) -> Result<Response, PageError> {
    let Query(params) = query.map_err(|e| PageError::BadRequest(e.body_text()))?;
    let request = params.page_request().map_err(|e| PageError::BadRequest(e.to_string()))?;

    let page = state.service.browse(&params.filter(), &request).await?;
    let stats = state.service.statistics().await?;

    let view = ListView { page: &page, params: &params, request: &request, stats: &stats };
    Ok(render(StatusCode::OK, &incoming, views::list_page(&view, incoming.message())))
}

pub async fn view(
    path: Result<Path<i64>, PathRejection>,
    State(state): State<AppState>,
    incoming: IncomingFlash,
) -> Result<Response, PageError> {
    let employee = state.service.get(path_id(path)?).await?;
    Ok(render(StatusCode::OK, &incoming, views::detail_page(&employee, incoming.message())))
}

pub async fn dashboard(
    State(state): State<AppState>,
    incoming: IncomingFlash,
) -> Result<Response, PageError> {
    let stats = state.service.statistics().await?;
    let recent = state.service.recent(RECENT_LIMIT).await?;
    Ok(render(StatusCode::OK, &incoming, views::dashboard_page(&stats, &recent, incoming.message())))
}

// ---------------------------------------------------------------------------
// Add / edit
// ---------------------------------------------------------------------------

/// Which form is being handled.
#[derive(Debug, Clone, Copy)]
enum Target {
    Add,
    Edit(i64),
}

impl Target {
    fn title(self) -> &'static str {
        match self {
            Self::Add     => "Add New Employee",
            Self::Edit(_) => "Edit Employee",
        }
    }

    fn action(self) -> String {
        match self {
            Self::Add      => "/employees/add".to_string(),
            Self::Edit(id) => format!("/employees/edit/{id}"),
        }
    }
}

async fn form_response(
    state: &AppState,
    target: Target,
    status: StatusCode,
    form: &EmployeeForm,
    errors: &ValidationErrors,
    message: Option<&str>,
) -> Response {
    let departments = state.service.departments().await.unwrap_or_default();
    let action = target.action();
    let page = views::form_page(&FormView {
        title: target.title(),
        action: &action,
        form,
        errors,
        departments: &departments,
        message,
    });
    (status, Html(page)).into_response()
}

async fn submit(state: &AppState, target: Target, form: &EmployeeForm) -> Result<Response, PageError> {
    let input = match form.bind() {
        Ok(input) => input,
        Err(errors) => {
            return Ok(form_response(state, target, StatusCode::BAD_REQUEST, form, &errors, None).await);
        }
    };

    let saved = match target {
        Target::Add      => state.service.create(&input).await,
        Target::Edit(id) => state.service.update(id, &input).await,
    };

    match saved {
        Ok(employee) => {
            let verb = match target {
                Target::Add     => "added",
                Target::Edit(_) => "updated",
            };
            let message = format!("Employee {} has been {verb} successfully!", employee.full_name());
            Ok(flash::redirect(LIST_PATH, Flash::success(message)))
        }
        Err(ServiceError::Validation(errors)) => {
            Ok(form_response(state, target, StatusCode::BAD_REQUEST, form, &errors, None).await)
        }
        Err(ServiceError::DuplicateEmail(_)) => {
            let mut errors = ValidationErrors::default();
            errors.push("email", "Email already exists");
            Ok(form_response(state, target, StatusCode::BAD_REQUEST, form, &errors, None).await)
        }
        Err(ServiceError::Database(e)) => {
            error!("Error saving employee: {e}");
            let message = match target {
                Target::Add     => "Error adding employee. Please try again.",
                Target::Edit(_) => "Error updating employee. Please try again.",
            };
            let errors = ValidationErrors::default();
            Ok(form_response(state, target, StatusCode::INTERNAL_SERVER_ERROR, form, &errors, Some(message)).await)
        }
        Err(e @ ServiceError::NotFound(_)) => Err(e.into()),
    }
}

pub async fn add_form(State(state): State<AppState>) -> Response {
    let errors = ValidationErrors::default();
    form_response(&state, Target::Add, StatusCode::OK, &EmployeeForm::default(), &errors, None).await
}

pub async fn add(
    State(state): State<AppState>,
    form: Result<Form<EmployeeForm>, FormRejection>,
) -> Result<Response, PageError> {
    let Form(form) = form.map_err(|e| PageError::BadRequest(e.body_text()))?;
    submit(&state, Target::Add, &form).await
}

pub async fn edit_form(
    path: Result<Path<i64>, PathRejection>,
    State(state): State<AppState>,
) -> Result<Response, PageError> {
    let id = path_id(path)?;
    let employee = state.service.get(id).await?;
    let errors = ValidationErrors::default();
    let form = EmployeeForm::from_employee(&employee);
    Ok(form_response(&state, Target::Edit(id), StatusCode::OK, &form, &errors, None).await)
}

pub async fn edit(
    path: Result<Path<i64>, PathRejection>,
    State(state): State<AppState>,
    form: Result<Form<EmployeeForm>, FormRejection>,
) -> Result<Response, PageError> {
    let id = path_id(path)?;
    let Form(form) = form.map_err(|e| PageError::BadRequest(e.body_text()))?;
    submit(&state, Target::Edit(id), &form).await
}

/// Soft delete, then back to the list.
pub async fn delete(
    path: Result<Path<i64>, PathRejection>,
    State(state): State<AppState>,
) -> Result<Response, PageError> {
    let id = path_id(path)?;
    let employee = state.service.get(id).await?;
    state.service.soft_delete(id).await?;

    let message = format!("Employee {} has been deleted successfully!", employee.full_name());
    Ok(flash::redirect(LIST_PATH, Flash::success(message)))
}

//! Server-rendered HTML pages.
//!
//! Pages are plain `String`s assembled with `format!`; every interpolated
//! value goes through [`escape`].

use std::fmt::Write as _;

use db::{Page, PageRequest, Sort, SortDirection, SortField};
use service::{Employee, Statistics, ValidationErrors};

use crate::{dto::ListParams, flash::Flash, form::EmployeeForm};

/// Departments offered in the form even before any employee uses them.
pub const SUGGESTED_DEPARTMENTS: &[&str] = &[
    "HR", "Engineering", "Marketing", "Sales", "Finance",
    "Operations", "IT", "Legal", "Customer Service", "Research & Development",
];

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&'  => out.push_str("&amp;"),
            '<'  => out.push_str("&lt;"),
            '>'  => out.push_str("&gt;"),
            '"'  => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c    => out.push(c),
        }
    }
    out
}

fn money(salary: Option<rust_decimal::Decimal>) -> String {
    salary.map(|s| format!("${s:.2}")).unwrap_or_else(|| "-".to_string())
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

pub fn layout(title: &str, flash: Option<&Flash>, body: &str) -> String {
    let banner = flash
        .map(|f| format!(r#"<div class="flash flash-{}">{}</div>"#, f.kind.as_str(), escape(&f.message)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <title>{title} | Employee Records</title>
  <style>
    body {{ font-family: sans-serif; margin: 2rem; }}
    table {{ border-collapse: collapse; width: 100%; }}
    th, td {{ border-bottom: 1px solid #ddd; padding: .4rem; text-align: left; }}
    .flash-success {{ background: #e6f4ea; padding: .6rem; }}
    .flash-error, .field-error {{ color: #b00020; }}
    .flash-error {{ background: #fdecea; padding: .6rem; }}
    nav a {{ margin-right: 1rem; }}
  </style>
</head>
<body>
  <nav><a href="/employees">Employees</a><a href="/employees/add">Add employee</a><a href="/dashboard">Dashboard</a></nav>
  <h1>{title}</h1>
  {banner}
  {body}
</body>
</html>"#,
        title = escape(title),
    )
}

pub fn error_page(message: &str) -> String {
    layout("Error", None, &format!("<p>{}</p>", escape(message)))
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

/// Everything the list page shows.
pub struct ListView<'a> {
    pub page: &'a Page<Employee>,
    pub params: &'a ListParams,
    pub request: &'a PageRequest,
    pub stats: &'a Statistics,
}

fn list_href(params: &ListParams, page: u32, size: u32, sort: Sort) -> String {
    let mut href = format!(
        "/employees?page={page}&size={size}&sortBy={}&sortDirection={}",
        sort.field, sort.direction
    );
    if let Some(search) = params.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let _ = write!(href, "&search={}", urlencoding::encode(search));
    }
    if let Some(department) = params.department.as_deref().filter(|s| !s.trim().is_empty()) {
        let _ = write!(href, "&department={}", urlencoding::encode(department));
    }
    href
}

fn sort_header(view: &ListView<'_>, field: SortField, label: &str) -> String {
    let current = view.request.sort;
    let (direction, marker) = match (current.field == field, current.direction) {
        (true, SortDirection::Asc)  => (SortDirection::Desc, " ▲"),
        (true, SortDirection::Desc) => (SortDirection::Asc, " ▼"),
        (false, _) => (SortDirection::Asc, ""),
    };
    let href = list_href(view.params, 0, view.request.size, Sort { field, direction });
    format!(r#"<th><a href="{}">{label}{marker}</a></th>"#, escape(&href))
}

pub fn list_page(view: &ListView<'_>, flash: Option<&Flash>) -> String {
    let mut body = String::new();

    let search = view.params.search.as_deref().unwrap_or("");
    let selected = view.params.department.as_deref().unwrap_or("");
    let mut options = String::from(r#"<option value="">All departments</option>"#);
    for d in &view.stats.departments {
        let sel = if d == selected { " selected" } else { "" };
        let _ = write!(options, r#"<option value="{0}"{sel}>{0}</option>"#, escape(d));
    }
    let _ = write!(
        body,
        r#"<form method="get" action="/employees">
  <input type="text" name="search" placeholder="Search employees" value="{}"/>
  <select name="department">{options}</select>
  <button type="submit">Filter</button>
</form>
<p>{} active employees in {} departments.</p>"#,
        escape(search),
        view.stats.total_employees,
        view.stats.departments.len(),
    );

    if view.page.items.is_empty() {
        body.push_str("<p>No employees found.</p>");
    } else {
        body.push_str("<table><thead><tr>");
        for (field, label) in [
            (SortField::Id, "ID"),
            (SortField::FirstName, "First name"),
            (SortField::LastName, "Last name"),
            (SortField::Email, "Email"),
            (SortField::Department, "Department"),
            (SortField::Position, "Position"),
            (SortField::HireDate, "Hire date"),
            (SortField::Salary, "Salary"),
        ] {
            body.push_str(&sort_header(view, field, label));
        }
        body.push_str("<th>Actions</th></tr></thead><tbody>");

        for e in &view.page.items {
            let _ = write!(
                body,
                r#"<tr><td>{id}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>
<td><a href="/employees/view/{id}">View</a> <a href="/employees/edit/{id}">Edit</a>
<form method="post" action="/employees/delete/{id}" style="display:inline"><button type="submit">Delete</button></form></td></tr>"#,
                escape(&e.first_name),
                escape(&e.last_name),
                escape(&e.email),
                escape(&e.department),
                escape(&e.position),
                e.hire_date,
                money(e.salary),
                id = e.id,
            );
        }
        body.push_str("</tbody></table>");
    }

    let page = view.page;
    let _ = write!(body, "<p>Page {} of {}", page.page + 1, page.total_pages().max(1));
    if page.has_previous() {
        let href = list_href(view.params, page.page - 1, page.size, view.request.sort);
        let _ = write!(body, r#" <a href="{}">Previous</a>"#, escape(&href));
    }
    if page.has_next() {
        let href = list_href(view.params, page.page + 1, page.size, view.request.sort);
        let _ = write!(body, r#" <a href="{}">Next</a>"#, escape(&href));
    }
    body.push_str("</p>");

    layout("Employees", flash, &body)
}

// ---------------------------------------------------------------------------
// Add / edit form
// ---------------------------------------------------------------------------

pub struct FormView<'a> {
    pub title: &'a str,
    pub action: &'a str,
    pub form: &'a EmployeeForm,
    pub errors: &'a ValidationErrors,
    pub departments: &'a [String],
    /// Page-level message shown above the form.
    pub message: Option<&'a str>,
}

fn input_row(view: &FormView<'_>, name: &str, label: &str, kind: &str, value: &str, extra: &str) -> String {
    let error = view
        .errors
        .message_for(name)
        .map(|m| format!(r#"<div class="field-error">{}</div>"#, escape(m)))
        .unwrap_or_default();
    format!(
        r#"<p><label for="{name}">{label}</label><br/><input id="{name}" name="{name}" type="{kind}" value="{}"{extra}/>{error}</p>"#,
        escape(value)
    )
}

pub fn form_page(view: &FormView<'_>) -> String {
    let form = view.form;
    let mut body = String::new();
    if let Some(message) = view.message {
        let _ = write!(body, r#"<div class="flash flash-error">{}</div>"#, escape(message));
    }

    let _ = write!(body, r#"<form method="post" action="{}">"#, escape(view.action));
    body.push_str(&input_row(view, "firstName", "First name", "text", &form.first_name, ""));
    body.push_str(&input_row(view, "lastName", "Last name", "text", &form.last_name, ""));
    body.push_str(&input_row(view, "email", "Email", "email", &form.email, ""));
    body.push_str(&input_row(view, "department", "Department", "text", &form.department, r#" list="departments""#));
    body.push_str(&input_row(view, "position", "Position", "text", &form.position, ""));
    body.push_str(&input_row(view, "hireDate", "Hire date", "date", &form.hire_date, ""));
    body.push_str(&input_row(view, "salary", "Salary", "text", &form.salary, ""));

    body.push_str(r#"<datalist id="departments">"#);
    let mut seen: Vec<&str> = SUGGESTED_DEPARTMENTS.to_vec();
    seen.extend(view.departments.iter().map(String::as_str).filter(|d| !SUGGESTED_DEPARTMENTS.contains(d)));
    for d in seen {
        let _ = write!(body, r#"<option value="{}"></option>"#, escape(d));
    }
    body.push_str(r#"</datalist><button type="submit">Save</button> <a href="/employees">Cancel</a></form>"#);

    layout(view.title, None, &body)
}

// ---------------------------------------------------------------------------
// Detail and dashboard
// ---------------------------------------------------------------------------

pub fn detail_page(e: &Employee, flash: Option<&Flash>) -> String {
    let status = if e.is_active { "Active" } else { "Inactive" };
    let body = format!(
        r#"<dl>
  <dt>Email</dt><dd>{}</dd>
  <dt>Department</dt><dd>{}</dd>
  <dt>Position</dt><dd>{}</dd>
  <dt>Hire date</dt><dd>{}</dd>
  <dt>Salary</dt><dd>{}</dd>
  <dt>Status</dt><dd>{status}</dd>
  <dt>Created</dt><dd>{}</dd>
  <dt>Updated</dt><dd>{}</dd>
</dl>
<p><a href="/employees/edit/{id}">Edit</a></p>
<form method="post" action="/employees/delete/{id}"><button type="submit">Delete</button></form>"#,
        escape(&e.email),
        escape(&e.department),
        escape(&e.position),
        e.hire_date,
        money(e.salary),
        e.created_at.format("%Y-%m-%d %H:%M"),
        e.updated_at.format("%Y-%m-%d %H:%M"),
        id = e.id,
    );
    layout(&e.full_name(), flash, &body)
}

pub fn dashboard_page(stats: &Statistics, recent: &[Employee], flash: Option<&Flash>) -> String {
    let mut body = format!("<p>Total active employees: {}</p>", stats.total_employees);

    body.push_str("<h2>By department</h2><table><thead><tr><th>Department</th><th>Employees</th></tr></thead><tbody>");
    for (department, count) in &stats.department_stats {
        let href = format!("/employees?department={}", urlencoding::encode(department));
        let _ = write!(
            body,
            r#"<tr><td><a href="{}">{}</a></td><td>{count}</td></tr>"#,
            escape(&href),
            escape(department),
        );
    }
    body.push_str("</tbody></table>");

    body.push_str("<h2>Recently added</h2><ul>");
    for e in recent {
        let _ = write!(
            body,
            r#"<li><a href="/employees/view/{}">{}</a> ({})</li>"#,
            e.id,
            escape(&e.full_name()),
            escape(&e.department),
        );
    }
    body.push_str("</ul>");

    layout("Dashboard", flash, &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(
            escape(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#39;y&#39;&lt;/script&gt;"
        );
    }

    #[test]
    fn list_links_keep_filters() {
        let params = ListParams {
            search: Some("r&d team".into()),
            department: Some("  ".into()),
            ..Default::default()
        };
        let href = list_href(&params, 2, 10, Sort { field: SortField::LastName, direction: SortDirection::Desc });
        assert_eq!(href, "/employees?page=2&size=10&sortBy=lastName&sortDirection=desc&search=r%26d%20team");
    }

    #[test]
    fn form_shows_field_errors_and_escapes_values() {
        let form = EmployeeForm { first_name: "<b>".into(), ..Default::default() };
        let mut errors = ValidationErrors::default();
        errors.push("firstName", "First name must be between 2 and 50 characters");
        let html = form_page(&FormView {
            title: "Add New Employee",
            action: "/employees/add",
            form: &form,
            errors: &errors,
            departments: &[],
            message: None,
        });
        assert!(html.contains("First name must be between 2 and 50 characters"));
        assert!(html.contains(r#"value="&lt;b&gt;""#));
        assert!(!html.contains("<b>"));
    }
}

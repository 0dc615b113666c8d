//! Paging and sorting primitives shared by every listing query.
//!
//! Sort columns are a closed set: user input is parsed into [`SortField`]
//! and only the enum's static column name ever reaches the SQL text.

use serde::{Deserialize, Serialize};

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: u32 = 100;

// ---------------------------------------------------------------------------
// SortField
// ---------------------------------------------------------------------------

/// Columns an employee listing may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortField {
    Id,
    FirstName,
    LastName,
    Email,
    Department,
    Position,
    HireDate,
    Salary,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    /// The `employees` column backing this field.
    pub fn column(self) -> &'static str {
        match self {
            Self::Id        => "id",
            Self::FirstName => "first_name",
            Self::LastName  => "last_name",
            Self::Email     => "email",
            Self::Department => "department",
            Self::Position  => "position",
            Self::HireDate  => "hire_date",
            Self::Salary    => "salary",
            Self::IsActive  => "is_active",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

impl std::fmt::Display for SortField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Id        => "id",
            Self::FirstName => "firstName",
            Self::LastName  => "lastName",
            Self::Email     => "email",
            Self::Department => "department",
            Self::Position  => "position",
            Self::HireDate  => "hireDate",
            Self::Salary    => "salary",
            Self::IsActive  => "isActive",
            Self::CreatedAt => "createdAt",
            Self::UpdatedAt => "updatedAt",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for SortField {
    type Err = String;

    /// Accepts the camelCase API name or the snake_case column name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "id"                         => Ok(Self::Id),
            "firstName" | "first_name"   => Ok(Self::FirstName),
            "lastName" | "last_name"     => Ok(Self::LastName),
            "email"                      => Ok(Self::Email),
            "department"                 => Ok(Self::Department),
            "position"                   => Ok(Self::Position),
            "hireDate" | "hire_date"     => Ok(Self::HireDate),
            "salary"                     => Ok(Self::Salary),
            "isActive" | "is_active"     => Ok(Self::IsActive),
            "createdAt" | "created_at"   => Ok(Self::CreatedAt),
            "updatedAt" | "updated_at"   => Ok(Self::UpdatedAt),
            other => Err(format!("unknown sort field: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// SortDirection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Asc  => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Asc  => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

impl std::str::FromStr for SortDirection {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc"  => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other  => Err(format!("unknown sort direction: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Sort / PageRequest
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for Sort {
    fn default() -> Self {
        Self { field: SortField::Id, direction: SortDirection::Asc }
    }
}

/// A zero-based page index, a page size and an ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort: Sort,
}

impl PageRequest {
    /// Build a request, rejecting sizes outside `1..=MAX_PAGE_SIZE`.
    pub fn new(page: u32, size: u32, sort: Sort) -> Result<Self, String> {
        if size == 0 || size > MAX_PAGE_SIZE {
            return Err(format!("page size must be between 1 and {MAX_PAGE_SIZE}"));
        }
        Ok(Self { page, size, sort })
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 0, size: 10, sort: Sort::default() }
    }
}

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

/// A bounded slice of results plus the total row count of the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_items: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: &PageRequest, total_items: i64) -> Self {
        Self { items, page: request.page, size: request.size, total_items }
    }

    pub fn total_pages(&self) -> i64 {
        if self.size == 0 {
            return 0;
        }
        let size = i64::from(self.size);
        (self.total_items + size - 1) / size
    }

    pub fn has_next(&self) -> bool {
        i64::from(self.page) + 1 < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 0
    }

    /// Convert the items while keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_items: self.total_items,
        }
    }
}

// src/pagination.rs
//! Page requests and page results shared by the store and the HTTP layer.

use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 2000;

/// Columns a product page may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortProperty {
    Id,
    Name,
    Description,
    Price,
    ImgUrl,
}

impl SortProperty {
    /// Column name in the `products` table.
    pub fn column(self) -> &'static str {
        match self {
            SortProperty::Id => "id",
            SortProperty::Name => "name",
            SortProperty::Description => "description",
            SortProperty::Price => "price",
            SortProperty::ImgUrl => "img_url",
        }
    }
}

impl FromStr for SortProperty {
    type Err = PageRequestError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "id" => Ok(SortProperty::Id),
            "name" => Ok(SortProperty::Name),
            "description" => Ok(SortProperty::Description),
            "price" => Ok(SortProperty::Price),
            "imgUrl" | "img_url" => Ok(SortProperty::ImgUrl),
            other => Err(PageRequestError::UnknownSortProperty(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn keyword(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("asc") {
            Some(Direction::Asc)
        } else if value.eq_ignore_ascii_case("desc") {
            Some(Direction::Desc)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub property: SortProperty,
    pub direction: Direction,
}

impl Order {
    pub fn asc(property: SortProperty) -> Self {
        Self { property, direction: Direction::Asc }
    }

    pub fn desc(property: SortProperty) -> Self {
        Self { property, direction: Direction::Desc }
    }
}

/// Ordering requested by the caller. An empty sort means insertion order
/// (by identifier).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sort {
    orders: Vec<Order>,
}

impl Sort {
    pub fn unsorted() -> Self {
        Self::default()
    }

    pub fn by(orders: Vec<Order>) -> Self {
        Self { orders }
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Appends `other`'s orders after this sort's own.
    pub fn then(mut self, other: Sort) -> Self {
        self.orders.extend(other.orders);
        self
    }

    /// The requested orders followed by `id ASC`, so that rows comparing
    /// equal on every requested column still land on a single page.
    pub fn with_id_tiebreak(&self) -> Vec<Order> {
        let mut orders = self.orders.clone();
        if !orders.iter().any(|o| o.property == SortProperty::Id) {
            orders.push(Order::asc(SortProperty::Id));
        }
        orders
    }

    /// `ORDER BY` clause body. Built only from known column names.
    pub fn to_sql(&self) -> String {
        self.with_id_tiebreak()
            .iter()
            .map(|o| format!("{} {}", o.property.column(), o.direction.keyword()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for Sort {
    type Err = PageRequestError;

    /// Parses `property[,property...][,asc|desc]`. The trailing direction,
    /// when present, applies to every listed property.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut tokens: Vec<&str> = value
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect();

        let direction = match tokens.last().and_then(|t| Direction::parse(t)) {
            Some(direction) => {
                tokens.pop();
                direction
            }
            None => Direction::Asc,
        };

        if tokens.is_empty() {
            return Err(PageRequestError::EmptySort);
        }

        let orders = tokens
            .into_iter()
            .map(|t| t.parse().map(|property| Order { property, direction }))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Sort { orders })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageRequestError {
    #[error("Page size must be greater than 0")]
    ZeroPageSize,
    #[error("Sort must name at least one property")]
    EmptySort,
    #[error("No sortable property '{0}'")]
    UnknownSortProperty(String),
}

/// Zero-based page index, page size and ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    size: u32,
    sort: Sort,
}

impl PageRequest {
    pub fn new(page: u32, size: u32, sort: Sort) -> Result<Self, PageRequestError> {
        if size == 0 {
            return Err(PageRequestError::ZeroPageSize);
        }
        Ok(Self { page, size, sort })
    }

    pub fn of(page: u32, size: u32) -> Result<Self, PageRequestError> {
        Self::new(page, size, Sort::unsorted())
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn sort(&self) -> &Sort {
        &self.sort
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort: Sort::unsorted(),
        }
    }
}

/// One slice of an ordered result set.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        Self {
            content,
            page: request.page(),
            size: request.size(),
            total_elements,
        }
    }

    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            return 0;
        }
        self.total_elements.div_ceil(u64::from(self.size))
    }

    pub fn is_first(&self) -> bool {
        self.page == 0
    }

    pub fn is_last(&self) -> bool {
        u64::from(self.page) + 1 >= self.total_pages()
    }

    /// Converts the content while keeping the page metadata untouched.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
        }
    }
}

/// Wire shape of a page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub content: Vec<T>,
    pub number: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
    pub number_of_elements: usize,
    pub first: bool,
    pub last: bool,
    pub empty: bool,
}

impl<T> From<Page<T>> for PageResponse<T> {
    fn from(page: Page<T>) -> Self {
        let total_pages = page.total_pages();
        let first = page.is_first();
        let last = page.is_last();
        let number_of_elements = page.content.len();
        Self {
            empty: page.content.is_empty(),
            content: page.content,
            number: page.page,
            size: page.size,
            total_elements: page.total_elements,
            total_pages,
            number_of_elements,
            first,
            last,
        }
    }
}

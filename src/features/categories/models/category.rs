use sqlx::FromRow;

/// Database model for category
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Category {
    pub id: i32,
    pub name: String,
    /// Free-form color string, only meaningful to the calendar UI
    pub color: String,
}

/// Data for creating a new category
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub color: String,
}

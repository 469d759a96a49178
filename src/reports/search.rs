//! Filter composition for report listing and search.

use serde::Deserialize;
use sqlx::{Postgres, QueryBuilder};

use crate::validate;

pub(crate) const REPORT_COLUMNS: &str = "r.id, r.user_id, r.title, r.description, r.category, \
     r.latitude, r.longitude, r.address, r.status, r.created_at";

/// Optional search criteria. Blank values are ignored; present ones are AND-ed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportFilter {
    /// Case-insensitive substring of title or description.
    #[serde(default)]
    pub q: Option<String>,
    /// Case-insensitive substring of the address.
    #[serde(default)]
    pub city: Option<String>,
    /// Exact category.
    #[serde(default)]
    pub category: Option<String>,
}

impl ReportFilter {
    pub fn text(text: &str) -> Self {
        Self {
            q: Some(text.to_string()),
            ..Self::default()
        }
    }

    fn normalized(&self) -> (Option<String>, Option<String>, Option<String>) {
        (
            validate::optional(self.q.clone()),
            validate::optional(self.city.clone()),
            validate::optional(self.category.clone()),
        )
    }
}

/// `%input%` with LIKE metacharacters escaped (backslash is the default escape).
pub(crate) fn contains_pattern(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 2);
    out.push('%');
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

/// SELECT over `reports r` with the filter applied, newest first.
pub(crate) fn select_reports(filter: &ReportFilter, limit: Option<i64>) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {REPORT_COLUMNS} FROM reports r"));
    let (text, city, category) = filter.normalized();
    let mut first = true;
    let mut clause = |qb: &mut QueryBuilder<'static, Postgres>| {
        qb.push(if first { " WHERE " } else { " AND " });
        first = false;
    };

    if let Some(text) = text {
        let pattern = contains_pattern(&text);
        clause(&mut qb);
        qb.push("(r.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR r.description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(city) = city {
        clause(&mut qb);
        qb.push("r.address ILIKE ").push_bind(contains_pattern(&city));
    }
    if let Some(category) = category {
        clause(&mut qb);
        qb.push("r.category = ").push_bind(category);
    }

    qb.push(" ORDER BY r.created_at DESC, r.id DESC");
    if let Some(limit) = limit {
        qb.push(" LIMIT ").push_bind(limit);
    }
    qb
}

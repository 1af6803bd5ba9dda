//! Entity kinds and the per-kind schemas that parameterize the list pipeline.
//!
//! Each admin screen runs the same filter → search → sort pipeline. The only
//! thing that changes between the book, user and credit package screens is
//! which fields are searched, which filters exist and how sort keys are typed.
//! That knowledge lives here.

use crate::domain::error::FolioError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The three record shapes managed by the admin screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Book,
    User,
    CreditPackage,
}

impl EntityKind {
    pub const ALL: [Self; 3] = [Self::Book, Self::User, Self::CreditPackage];

    /// Plural display label used in headers.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Book => "Books",
            Self::User => "Users",
            Self::CreditPackage => "Credit Packages",
        }
    }

    /// Singular noun used in notifications ("Book created").
    #[must_use]
    pub const fn noun(self) -> &'static str {
        match self {
            Self::Book => "Book",
            Self::User => "User",
            Self::CreditPackage => "Credit package",
        }
    }

    /// Stable collection name, used as the backing file stem by file services.
    #[must_use]
    pub const fn collection_name(self) -> &'static str {
        match self {
            Self::Book => "books",
            Self::User => "users",
            Self::CreditPackage => "credit_packages",
        }
    }

    /// Builds the schema for this kind.
    #[must_use]
    pub fn schema(self) -> EntitySchema {
        match self {
            Self::Book => EntitySchema::new(self, "title")
                .with_subtitle("author")
                .with_search_fields(&["title", "author", "category"])
                .with_filter("category", FilterSpec::equals("category"))
                .with_sort_key("title", SortField::text("title"))
                .with_sort_key("author", SortField::text("author"))
                .with_sort_key("category", SortField::text("category"))
                .with_sort_key("viewCount", SortField::number("viewCount"))
                .with_sort_key("rating", SortField::number("rating"))
                .with_sort_key("createdAt", SortField::text("createdAt")),
            Self::User => EntitySchema::new(self, "name")
                .with_subtitle("email")
                .with_search_fields(&["name", "email"])
                .with_filter("role", FilterSpec::equals("role.name"))
                .with_filter(
                    "status",
                    FilterSpec::choice()
                        .option("banned", &[("isBanned", Value::Bool(true))])
                        .option("suspended", &[("isSuspended", Value::Bool(true))])
                        .option("active", &[("isBanned", Value::Bool(false))])
                        .build(),
                )
                .with_sort_key("name", SortField::text("name"))
                .with_sort_key("email", SortField::text("email"))
                .with_sort_key("role", SortField::text("role.name"))
                .with_sort_key("credits", SortField::number("credits"))
                .with_sort_key("createdAt", SortField::text("createdAt")),
            Self::CreditPackage => EntitySchema::new(self, "name")
                .with_subtitle("description")
                .with_search_fields(&["name", "description"])
                .with_filter(
                    "status",
                    FilterSpec::choice()
                        .option("active", &[("isActive", Value::Bool(true))])
                        .option("inactive", &[("isActive", Value::Bool(false))])
                        .build(),
                )
                .with_sort_key("name", SortField::text("name"))
                .with_sort_key("credits", SortField::number("credits"))
                .with_sort_key("price", SortField::number("price"))
                .with_sort_key("createdAt", SortField::text("createdAt")),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection_name())
    }
}

impl FromStr for EntityKind {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "book" | "books" => Ok(Self::Book),
            "user" | "users" => Ok(Self::User),
            "credit_package" | "credit_packages" | "package" | "packages" => {
                Ok(Self::CreditPackage)
            }
            other => Err(FolioError::Config(format!("unknown entity kind: {other}"))),
        }
    }
}

/// How a sort key compares its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKind {
    /// Locale-aware lexicographic comparison; absent values sort as `""`.
    Text,
    /// Numeric comparison; absent or non-numeric values sort as `0`.
    Number,
}

/// A sortable column: the (possibly nested) field path and its comparison type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    pub path: String,
    pub kind: SortKind,
}

impl SortField {
    pub fn text(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: SortKind::Text,
        }
    }

    pub fn number(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: SortKind::Number,
        }
    }
}

/// A single `field == expected` requirement of a choice filter option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub field: String,
    pub expected: Value,
}

/// Predicate applied by a named filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterSpec {
    /// The field's textual form must equal the selected value.
    Equals { field: String },
    /// The selected value names an option whose conditions must all hold.
    /// Selecting an unlisted option excludes every record.
    Choice {
        options: BTreeMap<String, Vec<Condition>>,
    },
}

impl FilterSpec {
    pub fn equals(field: impl Into<String>) -> Self {
        Self::Equals {
            field: field.into(),
        }
    }

    #[must_use]
    pub fn choice() -> ChoiceBuilder {
        ChoiceBuilder::default()
    }
}

/// Builder for [`FilterSpec::Choice`].
#[derive(Debug, Default)]
pub struct ChoiceBuilder {
    options: BTreeMap<String, Vec<Condition>>,
}

impl ChoiceBuilder {
    #[must_use]
    pub fn option(mut self, value: &str, conditions: &[(&str, Value)]) -> Self {
        let conditions = conditions
            .iter()
            .map(|(field, expected)| Condition {
                field: (*field).to_string(),
                expected: expected.clone(),
            })
            .collect();
        self.options.insert(value.to_string(), conditions);
        self
    }

    #[must_use]
    pub fn build(self) -> FilterSpec {
        FilterSpec::Choice {
            options: self.options,
        }
    }
}

/// Field metadata for one entity kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySchema {
    pub kind: EntityKind,
    /// Fields scanned by the search stage.
    pub search_fields: Vec<String>,
    /// Named filters. Names missing here fall back to field equality.
    pub filters: BTreeMap<String, FilterSpec>,
    /// Named sort keys.
    pub sort_keys: BTreeMap<String, SortField>,
    /// Field shown as the primary text of a row.
    pub title_field: String,
    /// Field shown as the secondary text of a row.
    pub subtitle_field: Option<String>,
}

impl EntitySchema {
    pub fn new(kind: EntityKind, title_field: impl Into<String>) -> Self {
        Self {
            kind,
            search_fields: Vec::new(),
            filters: BTreeMap::new(),
            sort_keys: BTreeMap::new(),
            title_field: title_field.into(),
            subtitle_field: None,
        }
    }

    #[must_use]
    pub fn with_subtitle(mut self, field: impl Into<String>) -> Self {
        self.subtitle_field = Some(field.into());
        self
    }

    #[must_use]
    pub fn with_search_fields(mut self, fields: &[&str]) -> Self {
        self.search_fields = fields.iter().map(|f| (*f).to_string()).collect();
        self
    }

    #[must_use]
    pub fn with_filter(mut self, name: impl Into<String>, spec: FilterSpec) -> Self {
        self.filters.insert(name.into(), spec);
        self
    }

    #[must_use]
    pub fn with_sort_key(mut self, key: impl Into<String>, field: SortField) -> Self {
        self.sort_keys.insert(key.into(), field);
        self
    }

    /// Returns the predicate for a filter name, defaulting to equality on the
    /// field of the same name.
    #[must_use]
    pub fn filter_spec(&self, name: &str) -> Cow<'_, FilterSpec> {
        self.filters
            .get(name)
            .map_or_else(|| Cow::Owned(FilterSpec::equals(name)), Cow::Borrowed)
    }

    #[must_use]
    pub fn sort_field(&self, key: &str) -> Option<&SortField> {
        self.sort_keys.get(key)
    }
}

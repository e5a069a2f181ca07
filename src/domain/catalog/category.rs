//! Course category enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Subject area a course is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseCategory {
    It,
    Design,
    Business,
    Marketing,
}

impl CourseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseCategory::It => "it",
            CourseCategory::Design => "design",
            CourseCategory::Business => "business",
            CourseCategory::Marketing => "marketing",
        }
    }
}

impl fmt::Display for CourseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CourseCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "it" => Ok(CourseCategory::It),
            "design" => Ok(CourseCategory::Design),
            "business" => Ok(CourseCategory::Business),
            "marketing" => Ok(CourseCategory::Marketing),
            other => Err(ValidationError::invalid_format(
                "category",
                format!("unknown category '{}'", other),
            )),
        }
    }
}

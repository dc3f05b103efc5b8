//! Access control: the access type policy, the acting identity, and the
//! pure visibility/downloadability resolver.

pub mod actor;
pub mod resolver;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use actor::Actor;
pub use resolver::{can_download, can_view, AccessLists};

/// Policy governing who may view and download a file item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "access_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AccessType {
    /// Visible and downloadable by everyone.
    Public,
    /// Limited to the department allow-list, the user allow-list, or
    /// holders of the `file.download.restricted` capability.
    Restricted,
    /// Limited strictly to the department allow-list.
    DepartmentClosed,
}

impl AccessType {
    /// Return the access type as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Restricted => "restricted",
            Self::DepartmentClosed => "department_closed",
        }
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AccessType {
    type Err = doclib_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Self::Public),
            "restricted" => Ok(Self::Restricted),
            "department_closed" => Ok(Self::DepartmentClosed),
            _ => Err(doclib_core::AppError::validation(format!(
                "Invalid access type: '{s}'. Expected one of: public, restricted, department_closed"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_round_trip() {
        for at in [
            AccessType::Public,
            AccessType::Restricted,
            AccessType::DepartmentClosed,
        ] {
            assert_eq!(at.as_str().parse::<AccessType>().unwrap(), at);
        }
        assert!("open".parse::<AccessType>().is_err());
    }
}

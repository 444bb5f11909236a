use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::Id;

/// The simple name tables the admin panel manages alongside the pricing
/// matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MasterKind {
    Departments,
    Languages,
    Specializations,
}

impl MasterKind {
    pub fn table(&self) -> &'static str {
        match self {
            MasterKind::Departments => "departments",
            MasterKind::Languages => "languages",
            MasterKind::Specializations => "specializations",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MasterKind::Departments => "department",
            MasterKind::Languages => "language",
            MasterKind::Specializations => "specialization",
        }
    }
}

impl FromStr for MasterKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "departments" => Ok(MasterKind::Departments),
            "languages" => Ok(MasterKind::Languages),
            "specializations" => Ok(MasterKind::Specializations),
            _ => Err(()),
        }
    }
}

impl fmt::Display for MasterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasterRecord {
    pub id: Id,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

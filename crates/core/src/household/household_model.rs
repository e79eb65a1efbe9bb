//! Household domain models.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, ValidationError};

/// Relationship of a household member to the primary user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Relationship {
    Spouse,
    Child,
    Dependent,
    Parent,
    Other,
}

impl Relationship {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relationship::Spouse => "spouse",
            Relationship::Child => "child",
            Relationship::Dependent => "dependent",
            Relationship::Parent => "parent",
            Relationship::Other => "other",
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Relationship {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "spouse" => Ok(Relationship::Spouse),
            "child" => Ok(Relationship::Child),
            "dependent" => Ok(Relationship::Dependent),
            "parent" => Ok(Relationship::Parent),
            "other" => Ok(Relationship::Other),
            _ => Err(ValidationError::InvalidInput(format!("Unknown relationship: {}", s)).into()),
        }
    }
}

/// Domain model representing a household.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Household {
    pub id: String,
    pub primary_user_id: String,
    pub created_at: NaiveDateTime,
}

/// Domain model representing a household member.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdMember {
    pub id: String,
    pub household_id: String,
    pub first_name: String,
    pub last_name: String,
    pub relationship: Relationship,
    pub date_of_birth: Option<NaiveDate>,
    pub is_dependent: bool,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Household together with its members, as returned to clients and used in
/// admin notifications.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdWithMembers {
    pub household: Household,
    pub members: Vec<HouseholdMember>,
}

/// Input model for adding a household member
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewHouseholdMember {
    pub first_name: String,
    pub last_name: String,
    pub relationship: Relationship,
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub is_dependent: bool,
    pub notes: Option<String>,
}

impl NewHouseholdMember {
    pub fn validate(&self) -> Result<()> {
        validate_member_fields(&self.first_name, &self.last_name, self.date_of_birth)
    }
}

/// Input model for updating a household member. All fields are replaced.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdMemberUpdate {
    pub first_name: String,
    pub last_name: String,
    pub relationship: Relationship,
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub is_dependent: bool,
    pub notes: Option<String>,
}

impl HouseholdMemberUpdate {
    pub fn validate(&self) -> Result<()> {
        validate_member_fields(&self.first_name, &self.last_name, self.date_of_birth)
    }
}

fn validate_member_fields(
    first_name: &str,
    last_name: &str,
    date_of_birth: Option<NaiveDate>,
) -> Result<()> {
    if first_name.trim().is_empty() {
        return Err(ValidationError::MissingField("firstName".to_string()).into());
    }
    if last_name.trim().is_empty() {
        return Err(ValidationError::MissingField("lastName".to_string()).into());
    }
    if let Some(dob) = date_of_birth {
        if dob > Utc::now().date_naive() {
            return Err(ValidationError::InvalidInput(
                "Date of birth cannot be in the future".to_string(),
            )
            .into());
        }
    }
    Ok(())
}

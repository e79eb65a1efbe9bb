//! Tax profile domain models.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{Error, Result, ValidationError};

/// Named, independently-saved subdivision of a tax profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProfileSection {
    Personal,
    Spouse,
    Dependents,
    Income,
    SelfEmployed,
    Rental,
    Deductions,
    Household,
}

impl ProfileSection {
    pub const ALL: [ProfileSection; 8] = [
        ProfileSection::Personal,
        ProfileSection::Spouse,
        ProfileSection::Dependents,
        ProfileSection::Income,
        ProfileSection::SelfEmployed,
        ProfileSection::Rental,
        ProfileSection::Deductions,
        ProfileSection::Household,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileSection::Personal => "personal",
            ProfileSection::Spouse => "spouse",
            ProfileSection::Dependents => "dependents",
            ProfileSection::Income => "income",
            ProfileSection::SelfEmployed => "selfEmployed",
            ProfileSection::Rental => "rental",
            ProfileSection::Deductions => "deductions",
            ProfileSection::Household => "household",
        }
    }

    /// Human readable label used in admin notifications.
    pub fn label(&self) -> &'static str {
        match self {
            ProfileSection::Personal => "Personal information",
            ProfileSection::Spouse => "Spouse",
            ProfileSection::Dependents => "Dependents",
            ProfileSection::Income => "Income",
            ProfileSection::SelfEmployed => "Self-employment",
            ProfileSection::Rental => "Rental property",
            ProfileSection::Deductions => "Deductions",
            ProfileSection::Household => "Household members",
        }
    }
}

impl fmt::Display for ProfileSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileSection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ProfileSection::ALL
            .into_iter()
            .find(|section| section.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownSection(s.to_string()).into())
    }
}

/// Domain model representing a client's tax profile.
///
/// `tax_data` is a JSON object keyed by section name; each value is the
/// free-form document saved by that section's form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaxProfile {
    pub user_id: String,
    pub full_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub tax_data: Value,
    pub last_notified_batch_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TaxProfile {
    /// Returns the saved document for a section, if any.
    pub fn section(&self, section: ProfileSection) -> Option<&Value> {
        self.tax_data.get(section.as_str())
    }
}

/// Input model for updating the contact fields of a profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileContactUpdate {
    pub full_name: Option<String>,
    pub phone: Option<String>,
}

impl ProfileContactUpdate {
    /// Trims the fields, turning blank strings into `None`, and checks the phone number.
    pub fn normalized(self) -> Result<Self> {
        let full_name = non_blank(self.full_name);
        let phone = non_blank(self.phone);

        if let Some(ref value) = phone {
            let allowed = value
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | ' ' | '.'));
            let digits = value.chars().filter(char::is_ascii_digit).count();
            if !allowed || digits < 7 {
                return Err(
                    ValidationError::InvalidInput(format!("Invalid phone number: {}", value))
                        .into(),
                );
            }
        }

        Ok(Self { full_name, phone })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Result of atomically claiming a batch id on the idempotency marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchClaim {
    /// The marker already holds this batch id; nothing was written.
    AlreadyProcessed,
    /// The marker now holds the batch id; `previous` is the value it replaced.
    Claimed { previous: Option<String> },
}

//! # Lab Document Model
//!
//! One deployment holds exactly one [`Lab`]. Projects, staff, equipment,
//! alerts, and contacts are embedded in it; none of them has a lifecycle of
//! its own. Every mutation loads the whole document, edits one field, and
//! persists the whole document again.
//!
//! The JSON shape is `camelCase` to stay compatible with documents written
//! by the web frontend.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// The singleton laboratory record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lab {
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub assistants: Vec<Assistant>,
    #[serde(default)]
    pub equipments: Vec<Equipment>,
    #[serde(default)]
    pub alerts: Vec<Alert>,
    #[serde(default)]
    pub contacts: Contacts,
}

impl Lab {
    /// An empty lab with no embedded records.
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            projects: Vec::new(),
            assistants: Vec::new(),
            equipments: Vec::new(),
            alerts: Vec::new(),
            contacts: Contacts::default(),
        }
    }
}

/// A research project run in the lab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    pub bsl: Bsl,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub team_members: Vec<String>,
    #[serde(default)]
    pub aim: String,
    #[serde(default)]
    pub objectives: Vec<String>,
    #[serde(default)]
    pub methodology: String,
    /// Equipment referenced by name, not by identity.
    #[serde(default)]
    pub equipment: Vec<String>,
    #[serde(default)]
    pub results: Vec<String>,
}

impl Project {
    /// Whether the project starts on or before it ends. Not enforced on write.
    pub fn date_range_valid(&self) -> bool {
        self.start_date <= self.end_date
    }
}

/// Biosafety level, ordered from least to most containment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Bsl {
    #[serde(rename = "BSL-1")]
    Bsl1,
    #[serde(rename = "BSL-2")]
    Bsl2,
    #[serde(rename = "BSL-3")]
    Bsl3,
    #[serde(rename = "BSL-4")]
    Bsl4,
}

impl Bsl {
    pub fn level(self) -> u8 {
        match self {
            Bsl::Bsl1 => 1,
            Bsl::Bsl2 => 2,
            Bsl::Bsl3 => 3,
            Bsl::Bsl4 => 4,
        }
    }
}

impl fmt::Display for Bsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BSL-{}", self.level())
    }
}

/// A member of lab staff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assistant {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub photo_url: String,
    pub designation: Designation,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub specialization: String,
    /// Free text, e.g. "6 years".
    #[serde(default)]
    pub experience: String,
    #[serde(default)]
    pub qualification: Vec<Qualification>,
}

/// Title prefix for a staff member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Designation {
    Dr,
    Mr,
    Ms,
    Mrs,
    Prof,
    #[serde(rename = "Assoc Prof")]
    AssocProf,
    #[serde(rename = "Asst Prof")]
    AsstProf,
}

impl Designation {
    pub fn as_str(self) -> &'static str {
        match self {
            Designation::Dr => "Dr",
            Designation::Mr => "Mr",
            Designation::Ms => "Ms",
            Designation::Mrs => "Mrs",
            Designation::Prof => "Prof",
            Designation::AssocProf => "Assoc Prof",
            Designation::AsstProf => "Asst Prof",
        }
    }
}

impl fmt::Display for Designation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Qualification {
    pub degree: String,
    pub institution: String,
    pub year: i32,
}

/// A piece of lab equipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    pub name: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub manufacturer: String,
    pub year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, deserialize_with = "deserialize_specifications")]
    pub specifications: Vec<String>,
}

/// Specifications are plain strings, but older documents wrap each one
/// as `{ "specification": "..." }`. Accept both.
fn deserialize_specifications<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Spec {
        Plain(String),
        Wrapped { specification: String },
    }

    let specs: Vec<Spec> = Vec::deserialize(deserializer)?;
    Ok(specs
        .into_iter()
        .map(|s| match s {
            Spec::Plain(text) => text,
            Spec::Wrapped { specification } => specification,
        })
        .collect())
}

/// A hazard alert raised in the lab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub category: AlertCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Alert {
    /// One-line summary used as the alert mail body: `category: title - description`.
    pub fn message(&self) -> String {
        let mut msg = self.category.to_string();
        let title = self.title.as_deref().filter(|t| !t.trim().is_empty());
        let desc = self.description.as_deref().filter(|d| !d.trim().is_empty());
        match (title, desc) {
            (Some(t), Some(d)) => msg.push_str(&format!(": {} - {}", t, d)),
            (Some(t), None) => msg.push_str(&format!(": {}", t)),
            (None, Some(d)) => msg.push_str(&format!(": {}", d)),
            (None, None) => {}
        }
        msg
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertCategory {
    #[serde(rename = "Equipment Failure")]
    EquipmentFailure,
    #[serde(rename = "Chemical Spill")]
    ChemicalSpill,
    Fire,
    #[serde(rename = "Gas Leak")]
    GasLeak,
    Injury,
    #[serde(rename = "Power Outage")]
    PowerOutage,
    #[serde(rename = "Security Breach")]
    SecurityBreach,
}

impl fmt::Display for AlertCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AlertCategory::EquipmentFailure => "Equipment Failure",
            AlertCategory::ChemicalSpill => "Chemical Spill",
            AlertCategory::Fire => "Fire",
            AlertCategory::GasLeak => "Gas Leak",
            AlertCategory::Injury => "Injury",
            AlertCategory::PowerOutage => "Power Outage",
            AlertCategory::SecurityBreach => "Security Breach",
        };
        f.write_str(s)
    }
}

/// Emergency and neighbor contacts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contacts {
    #[serde(default)]
    pub neighborhood: Vec<Contact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_assistant: Option<Contact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical: Option<Contact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub electric: Option<Contact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<Contact>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lab_lists_default_to_empty() {
        let lab: Lab = serde_json::from_str(r#"{"name": "RVCE Bio Lab", "location": "Bengaluru"}"#)
            .unwrap();
        assert!(lab.projects.is_empty());
        assert!(lab.equipments.is_empty());
        assert!(lab.contacts.neighborhood.is_empty());
        assert!(lab.contacts.medical.is_none());
    }

    #[test]
    fn bsl_serializes_with_dash() {
        assert_eq!(serde_json::to_string(&Bsl::Bsl3).unwrap(), "\"BSL-3\"");
        let b: Bsl = serde_json::from_str("\"BSL-4\"").unwrap();
        assert_eq!(b, Bsl::Bsl4);
        assert!(Bsl::Bsl1 < Bsl::Bsl4);
        assert_eq!(b.to_string(), "BSL-4");
    }

    #[test]
    fn designation_with_space() {
        let d: Designation = serde_json::from_str("\"Assoc Prof\"").unwrap();
        assert_eq!(d, Designation::AssocProf);
        assert_eq!(d.to_string(), "Assoc Prof");
    }

    #[test]
    fn specifications_accept_wrapped_and_plain() {
        let eq: Equipment = serde_json::from_str(
            r#"{"name": "Centrifuge", "year": 2021,
                "specifications": ["15000 rpm", {"specification": "Refrigerated"}]}"#,
        )
        .unwrap();
        assert_eq!(eq.specifications, vec!["15000 rpm", "Refrigerated"]);
        assert!(eq.photo_url.is_none());
    }

    #[test]
    fn project_dates_parse_iso() {
        let p: Project = serde_json::from_str(
            r#"{"title": "T", "bsl": "BSL-2", "startDate": "2024-01-10", "endDate": "2023-12-01"}"#,
        )
        .unwrap();
        assert_eq!(p.start_date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert!(!p.date_range_valid());
        assert!(p.objectives.is_empty());
    }

    #[test]
    fn alert_message_omits_missing_parts() {
        let alert = Alert {
            title: Some("Bench 4".to_string()),
            category: AlertCategory::ChemicalSpill,
            description: None,
        };
        assert_eq!(alert.message(), "Chemical Spill: Bench 4");

        let bare = Alert {
            title: None,
            category: AlertCategory::Fire,
            description: Some("Smoke in corridor".to_string()),
        };
        assert_eq!(bare.message(), "Fire: Smoke in corridor");
    }

    #[test]
    fn alert_category_round_names() {
        let c: AlertCategory = serde_json::from_str("\"Gas Leak\"").unwrap();
        assert_eq!(c, AlertCategory::GasLeak);
        assert_eq!(c.to_string(), "Gas Leak");
    }
}

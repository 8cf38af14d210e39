use serde::{Deserialize, Serialize};

/// Three-band classification shared by the SDQ screen and the risk checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Normal,
    Risk,
    Problem,
}

/// EQ band. Wire values are the Thai labels the original records carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EqLevel {
    #[serde(rename = "ปรับปรุง")]
    NeedsImprovement,
    #[serde(rename = "ปกติ")]
    Normal,
    #[serde(rename = "สูงกว่าปกติ")]
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SdqResult {
    pub emotional: u32,
    pub conduct: u32,
    pub hyperactivity: u32,
    pub peer: u32,
    pub prosocial: u32,
    pub total_difficulties: u32,
    pub status: Status,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EqResult {
    pub good: u32,
    pub smart: u32,
    pub happy: u32,
    pub total: u32,
    pub level: EqLevel,
    pub updated_at: String,
}

/// Six-category screening checklist. Older records used a four-flag shape
/// whose `family` flag maps onto `protection`; the alias plus defaults let
/// those records deserialize into the canonical set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskFlags {
    #[serde(default)]
    pub academic: bool,
    #[serde(default)]
    pub health: bool,
    #[serde(default)]
    pub behavior: bool,
    #[serde(default)]
    pub economy: bool,
    #[serde(default, alias = "family")]
    pub protection: bool,
    #[serde(default)]
    pub other: bool,
}

impl RiskFlags {
    pub fn count_true(&self) -> u32 {
        [
            self.academic,
            self.health,
            self.behavior,
            self.economy,
            self.protection,
            self.other,
        ]
        .iter()
        .filter(|f| **f)
        .count() as u32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskResult {
    #[serde(flatten)]
    pub flags: RiskFlags,
    pub status: Status,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeVisit {
    pub date: String,
    pub condition: String,
    pub google_maps_link: String,
    pub needs_scholarship: bool,
    /// Base64-embedded photos, as the original stored them.
    #[serde(default)]
    pub photos: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounselingRecord {
    pub id: String,
    pub date: String,
    pub topic: String,
    pub detail: String,
    pub result: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub nickname: String,
    pub grade: String,
    pub room: String,
    /// Soft reference to Teacher.id; deleting a teacher does not cascade.
    pub teacher_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdq: Option<SdqResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eq: Option<EqResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk: Option<RiskResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_visit: Option<HomeVisit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counseling: Option<Vec<CounselingRecord>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: String,
    pub name: String,
    pub subject: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<String>,
}

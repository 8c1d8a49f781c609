//! UiConf objects as the service exchanges them
//!
//! Only the fields a player configuration needs to be created, read and
//! deleted are modelled. Read-only fields (`id`, `partner_id`, timestamps,
//! `version`) are filled by the server and skipped on the way out when unset.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a UiConf was authored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum UiConfCreationMode {
    Wizard,
    Advanced,
}

impl From<UiConfCreationMode> for i32 {
    fn from(value: UiConfCreationMode) -> Self {
        match value {
            UiConfCreationMode::Wizard => 2,
            UiConfCreationMode::Advanced => 3,
        }
    }
}

impl TryFrom<i32> for UiConfCreationMode {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(Self::Wizard),
            3 => Ok(Self::Advanced),
            other => Err(format!("unknown ui conf creation mode {other}")),
        }
    }
}

/// A player/UI configuration object
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "objectType", rename = "KalturaUiConf", rename_all = "camelCase")]
pub struct UiConf {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obj_type: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_params: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swf_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conf_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conf_vars: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_mode: Option<UiConfCreationMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(
        default,
        with = "chrono::serde::ts_seconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "chrono::serde::ts_seconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UiConf {
    /// Start a new configuration with just a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_dimensions(mut self, width: i32, height: i32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_creation_mode(mut self, mode: UiConfCreationMode) -> Self {
        self.creation_mode = Some(mode);
        self
    }

    pub fn with_conf_file(mut self, conf_file: impl Into<String>) -> Self {
        self.conf_file = Some(conf_file.into());
        self
    }

    /// Copy of this object with the server-owned fields cleared, suitable as
    /// the body of an add or update call
    pub fn without_read_only(&self) -> Self {
        Self {
            id: None,
            partner_id: None,
            version: None,
            created_at: None,
            updated_at: None,
            ..self.clone()
        }
    }
}

/// Filter for `uiConf.list`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(
    tag = "objectType",
    rename = "KalturaUiConfFilter",
    rename_all = "camelCase"
)]
pub struct UiConfFilter {
    /// Comma separated list of ids
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_in: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_like: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner_id_equal: Option<i64>,
}

impl UiConfFilter {
    pub fn ids(ids: &[i64]) -> Self {
        let joined = ids
            .iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        Self {
            id_in: Some(joined),
            ..Self::default()
        }
    }

    pub fn name_like(pattern: impl Into<String>) -> Self {
        Self {
            name_like: Some(pattern.into()),
            ..Self::default()
        }
    }

    /// Parsed `id_in` values; malformed entries are skipped
    pub fn id_in_values(&self) -> Vec<i64> {
        self.id_in
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .filter_map(|part| part.trim().parse::<i64>().ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether a UiConf passes this filter
    pub fn matches(&self, ui_conf: &UiConf) -> bool {
        if self.id_in.is_some() {
            let ids = self.id_in_values();
            if !ui_conf.id.is_some_and(|id| ids.contains(&id)) {
                return false;
            }
        }
        if let Some(pattern) = &self.name_like {
            let name = ui_conf.name.as_deref().unwrap_or_default();
            if !name.contains(pattern.as_str()) {
                return false;
            }
        }
        if let Some(partner_id) = self.partner_id_equal {
            if ui_conf.partner_id != Some(partner_id) {
                return false;
            }
        }
        true
    }
}

/// Page of UiConf objects returned by `uiConf.list`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(
    tag = "objectType",
    rename = "KalturaUiConfListResponse",
    rename_all = "camelCase"
)]
pub struct UiConfListResponse {
    #[serde(default)]
    pub objects: Vec<UiConf>,
    #[serde(default)]
    pub total_count: i64,
}

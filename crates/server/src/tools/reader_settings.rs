//! reader_settings tool implementation.
//!
//! Reads and updates birth year and reminder preference. Fields left out are
//! unchanged; the full current settings are always returned.

use refill_core::cohort::cohort_options;
use refill_core::{Error, ReminderSettings};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::ReaderState;

/// Birth years on either side of the reader's own offered for preview.
const PREVIEW_SPAN_YEARS: i32 = 10;

/// Parameters for the reader_settings tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ReaderSettingsParams {
    /// New birth year (1900-2100).
    #[serde(default)]
    pub birth_year: Option<i32>,

    /// Turn the daily reminder on or off.
    #[serde(default)]
    pub reminder_enabled: Option<bool>,

    /// Reminder time as HH:MM, 24-hour.
    #[serde(default)]
    pub reminder_time: Option<String>,
}

/// Output from the reader_settings tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderSettingsOutput {
    pub birth_year: Option<i32>,
    pub cohort: Option<String>,
    /// Cohorts near the reader's own, for preview.
    pub cohort_options: Vec<String>,
    pub reminder: ReminderSettings,
}

/// Implementation of the reader_settings tool.
pub async fn settings_impl(state: &ReaderState, params: ReaderSettingsParams) -> Result<CallToolResult, McpError> {
    let settings = &state.settings;

    if let Some(year) = params.birth_year {
        settings.set_birth_year(year).await?;
    }

    if params.reminder_enabled.is_some() || params.reminder_time.is_some() {
        let current = settings.reminder().await;
        let enabled = params.reminder_enabled.unwrap_or(current.enabled);
        let time = params.reminder_time.unwrap_or(current.time);
        settings.set_reminder(enabled, &time).await?;
    }

    let birth_year = settings.birth_year().await;
    let output = ReaderSettingsOutput {
        birth_year,
        cohort: settings.own_cohort().await,
        cohort_options: birth_year
            .map(|y| cohort_options(y, PREVIEW_SPAN_YEARS))
            .unwrap_or_default(),
        reminder: settings.reminder().await,
    };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::{fixture, output_json};

    async fn call(state: &ReaderState, params: ReaderSettingsParams) -> ReaderSettingsOutput {
        serde_json::from_value(output_json(&settings_impl(state, params).await.unwrap())).unwrap()
    }

    #[tokio::test]
    async fn test_settings_defaults() {
        let f = fixture();
        let out = call(&f.state, ReaderSettingsParams::default()).await;
        assert!(out.birth_year.is_none());
        assert!(out.cohort_options.is_empty());
        assert_eq!(out.reminder, ReminderSettings::default());
    }

    #[tokio::test]
    async fn test_settings_update_birth_year() {
        let f = fixture();
        let out = call(&f.state, ReaderSettingsParams { birth_year: Some(1994), ..Default::default() }).await;
        assert_eq!(out.cohort.as_deref(), Some("1990s"));
        assert_eq!(out.cohort_options, vec!["1980s", "1990s", "2000s"]);

        let err = settings_impl(&f.state, ReaderSettingsParams { birth_year: Some(3000), ..Default::default() }).await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn test_settings_partial_reminder_update() {
        let f = fixture();
        let out = call(&f.state, ReaderSettingsParams { reminder_enabled: Some(true), ..Default::default() }).await;
        assert_eq!(out.reminder, ReminderSettings { enabled: true, time: "21:00".into() });

        let out = call(&f.state, ReaderSettingsParams { reminder_time: Some("7:30".into()), ..Default::default() }).await;
        assert_eq!(out.reminder, ReminderSettings { enabled: true, time: "07:30".into() });
    }
}

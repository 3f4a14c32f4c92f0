use serde::Deserialize;

use crate::{
    ado::{
        client::{DEFAULT_BACKLOG_TOP, MAX_BACKLOG_TOP},
        wiql::WiqlOptions,
    },
    app_error::FieldError,
};

/// Raw query string of `GET /ado/backlog/:projectId`. Values stay strings
/// so each bad one can be reported by name.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacklogQuery {
    pub states: Option<String>,
    pub types: Option<String>,
    pub top: Option<String>,
    pub assigned_to_me: Option<String>,
    /// Older clients send `assignedToTeam=true` to mean "not only mine".
    pub assigned_to_team: Option<String>,
}

impl BacklogQuery {
    pub fn to_options(&self) -> Result<(WiqlOptions, usize), Vec<FieldError>> {
        let mut errors = Vec::new();
        let mut options = WiqlOptions::default();

        if let Some(states) = split_list(self.states.as_deref()) {
            options.states = states;
        }
        if let Some(types) = split_list(self.types.as_deref()) {
            options.work_item_types = types;
        }

        let top = match self.top.as_deref() {
            None => DEFAULT_BACKLOG_TOP,
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if (1..=MAX_BACKLOG_TOP).contains(&n) => n,
                _ => {
                    errors.push(FieldError::new("top", format!("top must be between 1 and {MAX_BACKLOG_TOP}")));
                    DEFAULT_BACKLOG_TOP
                }
            },
        };

        match (self.assigned_to_me.as_deref(), self.assigned_to_team.as_deref()) {
            (Some(raw), _) => match parse_bool(raw) {
                Some(mine) => options.assigned_to_me = mine,
                None => errors.push(FieldError::new("assignedToMe", "assignedToMe must be boolean")),
            },
            (None, Some(raw)) => match parse_bool(raw) {
                Some(team) => options.assigned_to_me = !team,
                None => errors.push(FieldError::new("assignedToTeam", "assignedToTeam must be boolean")),
            },
            (None, None) => {}
        }

        if errors.is_empty() {
            Ok((options, top))
        } else {
            Err(errors)
        }
    }
}

/// Comma list; absent or blank input keeps the backlog default.
fn split_list(raw: Option<&str>) -> Option<Vec<String>> {
    let values: Vec<String> = raw?
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();
    (!values.is_empty()).then_some(values)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

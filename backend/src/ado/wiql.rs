//! WIQL query construction.

use serde::Serialize;

use super::transform::fields;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderClause {
    pub field: &'static str,
    pub direction: SortDirection,
}

impl OrderClause {
    pub const fn asc(field: &'static str) -> Self {
        Self { field, direction: SortDirection::Asc }
    }

    pub const fn desc(field: &'static str) -> Self {
        Self { field, direction: SortDirection::Desc }
    }
}

/// Filters for a work-item query. `Default` gives the backlog view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WiqlOptions {
    pub assigned_to_me: bool,
    pub states: Vec<String>,
    pub work_item_types: Vec<String>,
    /// Only items changed within this many days (`@Today - N`).
    pub changed_within_days: Option<u32>,
    #[serde(skip)]
    pub order_by: Vec<OrderClause>,
}

pub const BACKLOG_STATES: &[&str] = &["Started", "Committed", "Proposed", "Active"];
pub const BACKLOG_TYPES: &[&str] = &["Scenario", "Deliverable", "Task", "Bug", "Task Group"];

const SELECT_FIELDS: &[&str] = &[
    fields::ID,
    fields::TITLE,
    fields::STATE,
    fields::ASSIGNED_TO,
    fields::WORK_ITEM_TYPE,
    fields::PRIORITY,
    fields::STORY_POINTS,
];

impl Default for WiqlOptions {
    fn default() -> Self {
        Self {
            assigned_to_me: true,
            states: BACKLOG_STATES.iter().map(|s| s.to_string()).collect(),
            work_item_types: BACKLOG_TYPES.iter().map(|s| s.to_string()).collect(),
            changed_within_days: None,
            order_by: vec![
                OrderClause::asc(fields::PRIORITY),
                OrderClause::desc(fields::STORY_POINTS),
                OrderClause::desc(fields::CHANGED_DATE),
            ],
        }
    }
}

/// Builds the WIQL text for `project_name` (a name, never a GUID).
pub fn build_query(project_name: &str, options: &WiqlOptions) -> String {
    let columns = SELECT_FIELDS
        .iter()
        .map(|f| format!("[{f}]"))
        .collect::<Vec<_>>()
        .join(", ");

    let mut query = format!(
        "SELECT {columns} FROM WorkItems WHERE [{}] = {}",
        fields::TEAM_PROJECT,
        quote(project_name)
    );

    if let Some(types) = in_list(&options.work_item_types) {
        query.push_str(&format!(" AND [{}] IN ({types})", fields::WORK_ITEM_TYPE));
    }
    if let Some(states) = in_list(&options.states) {
        query.push_str(&format!(" AND [{}] IN ({states})", fields::STATE));
    }
    if options.assigned_to_me {
        query.push_str(&format!(" AND [{}] = @Me", fields::ASSIGNED_TO));
    }
    if let Some(days) = options.changed_within_days {
        query.push_str(&format!(" AND [{}] >= @Today - {days}", fields::CHANGED_DATE));
    }

    query.push_str(" ORDER BY ");
    if options.order_by.is_empty() {
        query.push_str(&format!("[{}] DESC", fields::CHANGED_DATE));
    } else {
        let order = options
            .order_by
            .iter()
            .map(|o| {
                let dir = match o.direction {
                    SortDirection::Asc => "ASC",
                    SortDirection::Desc => "DESC",
                };
                format!("[{}] {dir}", o.field)
            })
            .collect::<Vec<_>>()
            .join(", ");
        query.push_str(&order);
    }

    query
}

/// WIQL string literal: single quotes, embedded quotes doubled.
fn quote(literal: &str) -> String {
    format!("'{}'", literal.replace('\'', "''"))
}

fn in_list(values: &[String]) -> Option<String> {
    let quoted: Vec<String> = values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(quote)
        .collect();
    (!quoted.is_empty()).then(|| quoted.join(", "))
}

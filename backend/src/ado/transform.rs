//! ADO work-item JSON ↔ normalized `WorkItem`.
//!
//! Upstream field reference names appear only in [`fields`]; schema drift on
//! the ADO side is absorbed here.

use std::sync::LazyLock;

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

pub mod fields {
    pub const ID: &str = "System.Id";
    pub const TITLE: &str = "System.Title";
    pub const DESCRIPTION: &str = "System.Description";
    pub const STATE: &str = "System.State";
    pub const WORK_ITEM_TYPE: &str = "System.WorkItemType";
    pub const ASSIGNED_TO: &str = "System.AssignedTo";
    pub const TEAM_PROJECT: &str = "System.TeamProject";
    pub const CREATED_DATE: &str = "System.CreatedDate";
    pub const CHANGED_DATE: &str = "System.ChangedDate";
    pub const TAGS: &str = "System.Tags";
    pub const PRIORITY: &str = "Microsoft.VSTS.Common.Priority";
    pub const SEVERITY: &str = "Microsoft.VSTS.Common.Severity";
    pub const BUSINESS_VALUE: &str = "Microsoft.VSTS.Common.BusinessValue";
    pub const STORY_POINTS: &str = "Microsoft.VSTS.Scheduling.StoryPoints";
    pub const EFFORT: &str = "Microsoft.VSTS.Scheduling.Effort";
    pub const DUE_DATE: &str = "Microsoft.VSTS.Scheduling.DueDate";
}

pub const DEFAULT_PRIORITY: u8 = 2;
pub const UNASSIGNED: &str = "Unassigned";

static GUID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .expect("GUID pattern is valid")
});

/// True when `value` is a canonical hyphenated GUID (project ids look like this).
pub fn is_guid(value: &str) -> bool {
    GUID_PATTERN.is_match(value)
}

// ── Raw (wire) shape ──────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawWorkItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default)]
    pub fields: Map<String, Value>,
    #[serde(rename = "_links", default, skip_serializing_if = "Option::is_none")]
    pub links: Option<RawLinks>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<RawHref>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawHref {
    pub href: String,
}

// ── Normalized shape ──────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedTo {
    pub display_name: String,
    pub email: Option<String>,
}

impl Default for AssignedTo {
    fn default() -> Self {
        Self { display_name: UNASSIGNED.to_string(), email: None }
    }
}

impl AssignedTo {
    pub fn is_unassigned(&self) -> bool {
        self.email.is_none() && self.display_name == UNASSIGNED
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub state: Option<String>,
    pub work_item_type: Option<String>,
    pub assigned_to: AssignedTo,
    pub created_date: Option<DateTime<Utc>>,
    pub changed_date: Option<DateTime<Utc>>,
    /// 1 (highest) .. 4 (lowest)
    pub priority: u8,
    pub severity: Option<String>,
    pub story_points: Option<f64>,
    pub effort: Option<f64>,
    pub business_value: Option<f64>,
    pub due_date: Option<DateTime<Utc>>,
    /// Semicolon separated, as ADO stores it.
    pub tags: String,
    pub url: Option<String>,
}

impl WorkItem {
    pub fn priority_label(&self) -> &'static str {
        match self.priority {
            1 => "High",
            3 => "Low",
            4 => "Lowest",
            _ => "Medium",
        }
    }

    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .split(';')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    }
}

/// Maps a raw ADO work item. Returns `None` when neither `id` nor
/// `System.Id` is present.
pub fn transform_work_item(raw: &RawWorkItem) -> Option<WorkItem> {
    let f = &raw.fields;
    let id = raw.id.or_else(|| f.get(fields::ID).and_then(Value::as_u64))?;

    Some(WorkItem {
        id,
        title: string_field(f, fields::TITLE).unwrap_or_default(),
        description: string_field(f, fields::DESCRIPTION).unwrap_or_default(),
        state: string_field(f, fields::STATE),
        work_item_type: string_field(f, fields::WORK_ITEM_TYPE),
        assigned_to: f.get(fields::ASSIGNED_TO).map(parse_identity).unwrap_or_default(),
        created_date: date_field(f, fields::CREATED_DATE),
        changed_date: date_field(f, fields::CHANGED_DATE),
        priority: f
            .get(fields::PRIORITY)
            .and_then(Value::as_u64)
            .filter(|p| (1..=4).contains(p))
            .map(|p| p as u8)
            .unwrap_or(DEFAULT_PRIORITY),
        severity: string_field(f, fields::SEVERITY),
        story_points: f.get(fields::STORY_POINTS).and_then(Value::as_f64),
        effort: f.get(fields::EFFORT).and_then(Value::as_f64),
        business_value: f.get(fields::BUSINESS_VALUE).and_then(Value::as_f64),
        due_date: date_field(f, fields::DUE_DATE),
        tags: string_field(f, fields::TAGS).unwrap_or_default(),
        url: raw
            .links
            .as_ref()
            .and_then(|l| l.html.as_ref())
            .map(|h| h.href.clone()),
    })
}

impl From<&WorkItem> for RawWorkItem {
    fn from(item: &WorkItem) -> Self {
        let mut f = Map::new();
        f.insert(fields::ID.into(), json!(item.id));
        f.insert(fields::TITLE.into(), json!(item.title));
        if !item.description.is_empty() {
            f.insert(fields::DESCRIPTION.into(), json!(item.description));
        }
        insert_opt(&mut f, fields::STATE, item.state.as_ref().map(|s| json!(s)));
        insert_opt(&mut f, fields::WORK_ITEM_TYPE, item.work_item_type.as_ref().map(|s| json!(s)));
        if !item.assigned_to.is_unassigned() {
            f.insert(
                fields::ASSIGNED_TO.into(),
                json!({
                    "displayName": item.assigned_to.display_name,
                    "uniqueName": item.assigned_to.email,
                }),
            );
        }
        insert_opt(&mut f, fields::CREATED_DATE, item.created_date.map(date_value));
        insert_opt(&mut f, fields::CHANGED_DATE, item.changed_date.map(date_value));
        f.insert(fields::PRIORITY.into(), json!(item.priority));
        insert_opt(&mut f, fields::SEVERITY, item.severity.as_ref().map(|s| json!(s)));
        insert_opt(&mut f, fields::STORY_POINTS, item.story_points.map(|v| json!(v)));
        insert_opt(&mut f, fields::EFFORT, item.effort.map(|v| json!(v)));
        insert_opt(&mut f, fields::BUSINESS_VALUE, item.business_value.map(|v| json!(v)));
        insert_opt(&mut f, fields::DUE_DATE, item.due_date.map(date_value));
        if !item.tags.is_empty() {
            f.insert(fields::TAGS.into(), json!(item.tags));
        }

        RawWorkItem {
            id: Some(item.id),
            fields: f,
            links: item.url.as_ref().map(|href| RawLinks {
                html: Some(RawHref { href: href.clone() }),
            }),
        }
    }
}

fn insert_opt(f: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(v) = value {
        f.insert(key.into(), v);
    }
}

fn date_value(d: DateTime<Utc>) -> Value {
    json!(d.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

fn string_field(f: &Map<String, Value>, key: &str) -> Option<String> {
    f.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn date_field(f: &Map<String, Value>, key: &str) -> Option<DateTime<Utc>> {
    f.get(key)
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|d| d.with_timezone(&Utc))
}

/// Identity fields come back as objects from api-version 5+, and as
/// `"Name <email>"` strings from older collections.
fn parse_identity(value: &Value) -> AssignedTo {
    match value {
        Value::Object(obj) => {
            let display_name = obj
                .get("displayName")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .unwrap_or(UNASSIGNED)
                .to_string();
            let email = obj
                .get("uniqueName")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string);
            AssignedTo { display_name, email }
        }
        Value::String(s) if !s.trim().is_empty() => match s.rsplit_once('<') {
            Some((name, rest)) if rest.ends_with('>') => {
                let name = name.trim();
                let email = rest.trim_end_matches('>').trim();
                AssignedTo {
                    display_name: if name.is_empty() { UNASSIGNED } else { name }.to_string(),
                    email: Some(email).filter(|e| !e.is_empty()).map(str::to_string),
                }
            }
            _ => AssignedTo { display_name: s.trim().to_string(), email: None },
        },
        _ => AssignedTo::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_raw() -> RawWorkItem {
        serde_json::from_value(json!({
            "id": 4711,
            "fields": {
                "System.Title": "Login fails on Safari",
                "System.Description": "<div>Repro steps</div>",
                "System.State": "Active",
                "System.WorkItemType": "Bug",
                "System.AssignedTo": {
                    "displayName": "Dana Reyes",
                    "uniqueName": "dana@contoso.com"
                },
                "System.CreatedDate": "2024-03-01T09:30:00.123Z",
                "System.ChangedDate": "2024-03-04T16:00:00Z",
                "Microsoft.VSTS.Common.Priority": 1,
                "Microsoft.VSTS.Common.Severity": "2 - High",
                "Microsoft.VSTS.Scheduling.StoryPoints": 3.0,
                "Microsoft.VSTS.Scheduling.Effort": 5.5,
                "Microsoft.VSTS.Common.BusinessValue": 40,
                "Microsoft.VSTS.Scheduling.DueDate": "2024-03-10T00:00:00Z",
                "System.Tags": "auth; safari"
            },
            "_links": { "html": { "href": "https://dev.azure.com/contoso/_workitems/edit/4711" } }
        }))
        .unwrap()
    }

    #[test]
    fn maps_every_documented_field() {
        let item = transform_work_item(&full_raw()).unwrap();
        assert_eq!(item.id, 4711);
        assert_eq!(item.title, "Login fails on Safari");
        assert_eq!(item.state.as_deref(), Some("Active"));
        assert_eq!(item.work_item_type.as_deref(), Some("Bug"));
        assert_eq!(item.assigned_to.display_name, "Dana Reyes");
        assert_eq!(item.assigned_to.email.as_deref(), Some("dana@contoso.com"));
        assert_eq!(item.priority, 1);
        assert_eq!(item.priority_label(), "High");
        assert_eq!(item.severity.as_deref(), Some("2 - High"));
        assert_eq!(item.story_points, Some(3.0));
        assert_eq!(item.effort, Some(5.5));
        assert_eq!(item.business_value, Some(40.0));
        assert_eq!(item.tag_list(), vec!["auth", "safari"]);
        assert_eq!(
            item.url.as_deref(),
            Some("https://dev.azure.com/contoso/_workitems/edit/4711")
        );
        assert!(item.created_date.is_some());
        assert!(item.due_date.is_some());
    }

    #[test]
    fn missing_optionals_fall_back() {
        let raw: RawWorkItem =
            serde_json::from_value(json!({ "id": 7, "fields": { "System.Title": "Bare" } })).unwrap();
        let item = transform_work_item(&raw).unwrap();
        assert_eq!(item.priority, DEFAULT_PRIORITY);
        assert_eq!(item.priority_label(), "Medium");
        assert_eq!(item.assigned_to.display_name, UNASSIGNED);
        assert_eq!(item.assigned_to.email, None);
        assert_eq!(item.tags, "");
        assert_eq!(item.description, "");
        assert!(item.url.is_none());
    }

    #[test]
    fn out_of_range_priority_uses_default() {
        let raw: RawWorkItem = serde_json::from_value(json!({
            "id": 7,
            "fields": { "System.Title": "x", "Microsoft.VSTS.Common.Priority": 0 }
        }))
        .unwrap();
        assert_eq!(transform_work_item(&raw).unwrap().priority, DEFAULT_PRIORITY);
    }

    #[test]
    fn id_may_come_from_fields() {
        let raw: RawWorkItem = serde_json::from_value(json!({
            "fields": { "System.Id": 99, "System.Title": "From fields" }
        }))
        .unwrap();
        assert_eq!(transform_work_item(&raw).unwrap().id, 99);
    }

    #[test]
    fn no_id_means_no_item() {
        let raw: RawWorkItem =
            serde_json::from_value(json!({ "fields": { "System.Title": "Ghost" } })).unwrap();
        assert!(transform_work_item(&raw).is_none());
    }

    #[test]
    fn legacy_identity_without_name_falls_back_to_unassigned() {
        let assigned = parse_identity(&json!("<dana@contoso.com>"));
        assert_eq!(assigned.display_name, UNASSIGNED);
        assert_eq!(assigned.email.as_deref(), Some("dana@contoso.com"));
        assert!(!assigned.is_unassigned());
    }

    #[test]
    fn legacy_identity_string_is_split() {
        let raw: RawWorkItem = serde_json::from_value(json!({
            "id": 1,
            "fields": { "System.Title": "t", "System.AssignedTo": "Dana Reyes <dana@contoso.com>" }
        }))
        .unwrap();
        let item = transform_work_item(&raw).unwrap();
        assert_eq!(item.assigned_to.display_name, "Dana Reyes");
        assert_eq!(item.assigned_to.email.as_deref(), Some("dana@contoso.com"));
    }

    #[test]
    fn transform_is_idempotent_through_raw_form() {
        for raw in [
            full_raw(),
            serde_json::from_value(json!({ "id": 3, "fields": { "System.Title": "Bare" } })).unwrap(),
            serde_json::from_value(json!({
                "id": 4,
                "fields": { "System.Title": "Legacy", "System.AssignedTo": "<dana@contoso.com>" }
            }))
            .unwrap(),
            serde_json::from_value(json!({
                "id": 5,
                "fields": { "System.Title": "Legacy", "System.AssignedTo": "Dana <>" }
            }))
            .unwrap(),
        ] {
            let once = transform_work_item(&raw).unwrap();
            let twice = transform_work_item(&RawWorkItem::from(&once)).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn guid_detection() {
        assert!(is_guid("6ce954b1-ce1f-45d1-b94d-e6bf2464ba2c"));
        assert!(is_guid("6CE954B1-CE1F-45D1-B94D-E6BF2464BA2C"));
        assert!(!is_guid("Contoso Web"));
        assert!(!is_guid("6ce954b1ce1f45d1b94de6bf2464ba2c"));
        assert!(!is_guid("{6ce954b1-ce1f-45d1-b94d-e6bf2464ba2c}"));
    }
}

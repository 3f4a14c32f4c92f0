use std::cmp::Ordering;

use serde::Deserialize;

use crate::{
    app_error::FieldError,
    task::Task,
    task_list_response::Pagination,
    task_priority::TaskPriority,
    task_status::TaskStatus,
};

pub const DEFAULT_LIMIT: usize = 50;
pub const MAX_LIMIT: usize = 100;

#[derive(Debug, Default, Deserialize)]
pub struct TaskListQuery {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortKey {
    CreatedAt,
    UpdatedAt,
    DueDate,
    Priority,
    Status,
    Title,
    AiPriorityScore,
}

impl SortKey {
    fn parse(value: &str) -> Option<Self> {
        Some(match value {
            "createdAt" => SortKey::CreatedAt,
            "updatedAt" => SortKey::UpdatedAt,
            "dueDate" => SortKey::DueDate,
            "priority" => SortKey::Priority,
            "status" => SortKey::Status,
            "title" => SortKey::Title,
            "aiPriorityScore" => SortKey::AiPriorityScore,
            _ => return None,
        })
    }

    fn compare(self, a: &Task, b: &Task) -> Ordering {
        match self {
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            SortKey::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortKey::DueDate => a.due_date.cmp(&b.due_date),
            SortKey::Priority => a.priority.cmp(&b.priority),
            SortKey::Status => a.status.cmp(&b.status),
            SortKey::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortKey::AiPriorityScore => a.ai_priority_score.total_cmp(&b.ai_priority_score),
        }
    }
}

impl TaskListQuery {
    /// Filters, sorts and pages one user's tasks.
    pub fn apply(&self, mut tasks: Vec<Task>) -> Result<(Vec<Task>, Pagination), Vec<FieldError>> {
        let mut errors = Vec::new();

        let sort_name = self.sort.as_deref().unwrap_or("createdAt");
        let sort = SortKey::parse(sort_name);
        if sort.is_none() {
            errors.push(FieldError::new("sort", format!("Cannot sort by {sort_name}")));
        }

        let descending = match self.order.as_deref().map(str::to_ascii_uppercase).as_deref() {
            None | Some("DESC") => true,
            Some("ASC") => false,
            Some(_) => {
                errors.push(FieldError::new("order", "order must be ASC or DESC"));
                true
            }
        };

        let limit = self.limit.unwrap_or(DEFAULT_LIMIT);
        if !(1..=MAX_LIMIT).contains(&limit) {
            errors.push(FieldError::new("limit", format!("limit must be between 1 and {MAX_LIMIT}")));
        }
        let offset = self.offset.unwrap_or(0);

        let Some(sort) = sort.filter(|_| errors.is_empty()) else {
            return Err(errors);
        };

        tasks.retain(|t| {
            self.status.map_or(true, |s| t.status == s) && self.priority.map_or(true, |p| t.priority == p)
        });
        tasks.sort_by(|a, b| {
            let ordering = sort.compare(a, b).then_with(|| a.id.cmp(&b.id));
            if descending { ordering.reverse() } else { ordering }
        });

        let total = tasks.len();
        let page = tasks.into_iter().skip(offset).take(limit).collect();
        Ok((
            page,
            Pagination {
                total,
                limit,
                offset,
                has_more: offset.saturating_add(limit) < total,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use crate::{create_task_request::CreateTaskRequest, task_complexity::TaskComplexity};

    fn tasks(n: usize) -> Vec<Task> {
        let start = Utc::now();
        (0..n)
            .map(|i| {
                let request = CreateTaskRequest {
                    title: format!("task {i}"),
                    description: None,
                    status: if i % 2 == 0 { TaskStatus::Todo } else { TaskStatus::Done },
                    priority: TaskPriority::Medium,
                    complexity: TaskComplexity::Medium,
                    estimated_hours: None,
                    due_date: None,
                };
                Task::new(Uuid::nil(), request, start + Duration::seconds(i as i64))
            })
            .collect()
    }

    #[test]
    fn defaults_to_newest_first() {
        let (page, pagination) = TaskListQuery::default().apply(tasks(3)).unwrap();
        let titles: Vec<_> = page.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["task 2", "task 1", "task 0"]);
        assert_eq!(pagination, Pagination { total: 3, limit: 50, offset: 0, has_more: false });
    }

    #[test]
    fn filters_before_paging() {
        let query = TaskListQuery {
            status: Some(TaskStatus::Todo),
            limit: Some(2),
            order: Some("asc".into()),
            ..Default::default()
        };
        let (page, pagination) = query.apply(tasks(7)).unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].title, "task 0");
        assert_eq!(pagination.total, 4);
        assert!(pagination.has_more);
    }

    #[test]
    fn offset_past_end_is_empty() {
        let query = TaskListQuery { offset: Some(10), ..Default::default() };
        let (page, pagination) = query.apply(tasks(3)).unwrap();
        assert!(page.is_empty());
        assert!(!pagination.has_more);
    }

    #[test]
    fn huge_offset_does_not_overflow() {
        let query = TaskListQuery { offset: Some(usize::MAX), ..Default::default() };
        let (page, pagination) = query.apply(tasks(3)).unwrap();
        assert!(page.is_empty());
        assert_eq!(pagination.offset, usize::MAX);
        assert!(!pagination.has_more);
    }

    #[test]
    fn unknown_sort_and_bad_limit_are_reported_together() {
        let query = TaskListQuery {
            sort: Some("password".into()),
            limit: Some(0),
            ..Default::default()
        };
        let errors = query.apply(tasks(1)).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["sort", "limit"]);
    }
}

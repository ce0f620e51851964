//! 세션 도구 (할 일 목록, 카운트다운).
//!
//! 런타임 세션이 소유하며 저장하지 않는다. 프로세스가 끝나면 사라진다.

use chrono::NaiveDate;
use perch_core::error::CoreError;
use serde::Serialize;
use uuid::Uuid;

fn required(field: &str, value: &str) -> Result<String, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation {
            field: field.to_string(),
            message: "비어 있을 수 없음".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

/// 할 일 항목
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodoItem {
    pub id: Uuid,
    pub text: String,
    pub done: bool,
}

/// 할 일 목록
#[derive(Debug, Clone, Default)]
pub struct TodoList {
    items: Vec<TodoItem>,
}

impl TodoList {
    pub fn new() -> Self {
        Self::default()
    }

    /// 항목 추가 (앞뒤 공백 제거, 빈 문자열 거부)
    pub fn add(&mut self, text: &str) -> Result<&TodoItem, CoreError> {
        let text = required("todo", text)?;
        self.items.push(TodoItem {
            id: Uuid::new_v4(),
            text,
            done: false,
        });
        self.items
            .last()
            .ok_or_else(|| CoreError::Internal("할 일 추가 직후 목록이 비어 있음".into()))
    }

    /// 완료 상태 전환. 항목이 없으면 None
    pub fn toggle(&mut self, id: Uuid) -> Option<bool> {
        let item = self.items.iter_mut().find(|t| t.id == id)?;
        item.done = !item.done;
        Some(item.done)
    }

    /// 제거. 제거되었으면 true
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.items.len();
        self.items.retain(|t| t.id != id);
        before != self.items.len()
    }

    /// 남은 항목 수
    pub fn remaining(&self) -> usize {
        self.items.iter().filter(|t| !t.done).count()
    }

    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// 카운트다운 항목
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountdownItem {
    pub id: Uuid,
    pub name: String,
    pub target: NaiveDate,
}

impl CountdownItem {
    /// 목표일까지 남은 날 수 (지났으면 음수)
    pub fn days_left(&self, today: NaiveDate) -> i64 {
        (self.target - today).num_days()
    }

    /// 표시용 라벨
    pub fn label(&self, today: NaiveDate) -> String {
        match self.days_left(today) {
            0 => "Today!".to_string(),
            n if n > 0 => format!("{n}d"),
            n => format!("{}d ago", -n),
        }
    }
}

/// 카운트다운 목록
#[derive(Debug, Clone, Default)]
pub struct CountdownList {
    items: Vec<CountdownItem>,
}

impl CountdownList {
    pub fn new() -> Self {
        Self::default()
    }

    /// 항목 추가 (이름 공백 제거, 빈 이름 거부)
    pub fn add(&mut self, name: &str, target: NaiveDate) -> Result<&CountdownItem, CoreError> {
        let name = required("countdown", name)?;
        self.items.push(CountdownItem {
            id: Uuid::new_v4(),
            name,
            target,
        });
        self.items
            .last()
            .ok_or_else(|| CoreError::Internal("카운트다운 추가 직후 목록이 비어 있음".into()))
    }

    /// 제거. 제거되었으면 true
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.items.len();
        self.items.retain(|c| c.id != id);
        before != self.items.len()
    }

    pub fn items(&self) -> &[CountdownItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

//! 독 목록과 숨김 집합.
//!
//! 둘 다 삽입 순서를 유지하는 중복 없는 패키지 ID 목록이다.
//! 두 집합이 겹치지 않도록 하는 것은 `Reconciler`의 책임이다.

use perch_core::error::CoreError;
use perch_core::models::preferences::dedupe_packages;

/// 고정 순서를 유지하는 독 목록 (최대 `capacity`개)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockList {
    items: Vec<String>,
    capacity: usize,
}

impl DockList {
    /// 빈 독
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// 저장된 목록으로 생성 (중복 제거 후 용량만큼 자름)
    pub fn from_packages(packages: Vec<String>, capacity: usize) -> Self {
        let mut items = dedupe_packages(packages);
        items.truncate(capacity);
        Self { items, capacity }
    }

    pub fn contains(&self, package_id: &str) -> bool {
        self.items.iter().any(|p| p == package_id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// 끝에 추가
    ///
    /// 이미 있으면 아무것도 하지 않는다. 가득 차 있으면 `DockFull`.
    pub fn push(&mut self, package_id: &str) -> Result<(), CoreError> {
        if self.contains(package_id) {
            return Ok(());
        }
        if self.is_full() {
            return Err(CoreError::DockFull {
                capacity: self.capacity,
            });
        }
        self.items.push(package_id.to_string());
        Ok(())
    }

    /// 제거. 제거되었으면 true
    pub fn remove(&mut self, package_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|p| p != package_id);
        before != self.items.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.items.clone()
    }
}

/// 숨긴 패키지 집합 (삽입 순서 유지)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HiddenSet {
    items: Vec<String>,
}

impl HiddenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 저장된 목록으로 생성 (중복 제거)
    pub fn from_packages(packages: Vec<String>) -> Self {
        Self {
            items: dedupe_packages(packages),
        }
    }

    pub fn contains(&self, package_id: &str) -> bool {
        self.items.iter().any(|p| p == package_id)
    }

    /// 추가. 새로 추가되었으면 true
    pub fn insert(&mut self, package_id: &str) -> bool {
        if self.contains(package_id) {
            return false;
        }
        self.items.push(package_id.to_string());
        true
    }

    /// 제거. 제거되었으면 true
    pub fn remove(&mut self, package_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|p| p != package_id);
        before != self.items.len()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.items.clone()
    }
}

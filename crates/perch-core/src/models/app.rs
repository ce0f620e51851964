//! 설치된 앱 모델.
//!
//! `AppRecord`는 한 번의 새로고침 주기 동안 불변이며,
//! 다음 새로고침이 `Catalog` 전체를 교체한다.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// 라벨이 비어 있을 때 사용하는 기본값
pub const DEFAULT_APP_LABEL: &str = "App";

/// 아이콘 참조 (플랫폼이 해석하는 불투명 핸들)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IconRef(pub String);

impl IconRef {
    /// 핸들 문자열
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for IconRef {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// 설치된 앱 한 개
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppRecord {
    /// 표시 이름
    pub label: String,
    /// 패키지 식별자 (카탈로그 내 유일)
    pub package_id: String,
    /// 아이콘 핸들
    pub icon: IconRef,
}

impl AppRecord {
    /// 새 레코드 생성 (빈 라벨은 기본값으로 대체)
    pub fn new(label: &str, package_id: &str, icon: impl Into<IconRef>) -> Self {
        let label = label.trim();
        Self {
            label: if label.is_empty() {
                DEFAULT_APP_LABEL.to_string()
            } else {
                label.to_string()
            },
            package_id: package_id.to_string(),
            icon: icon.into(),
        }
    }
}

/// 설치된 앱 스냅샷
///
/// 순서는 플랫폼 정렬 순서를 따르며 `package_id` 중복이 없다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    apps: Vec<AppRecord>,
}

impl Catalog {
    /// 플랫폼이 반환한 레코드로 스냅샷 생성
    ///
    /// 중복 `package_id`는 첫 번째 항목만 남긴다.
    pub fn from_records(records: Vec<AppRecord>) -> Self {
        let mut seen = HashSet::with_capacity(records.len());
        let mut apps = Vec::with_capacity(records.len());
        for record in records {
            if seen.insert(record.package_id.clone()) {
                apps.push(record);
            } else {
                debug!("중복 패키지 무시: {}", record.package_id);
            }
        }
        Self { apps }
    }

    /// 패키지 포함 여부
    pub fn contains(&self, package_id: &str) -> bool {
        self.apps.iter().any(|a| a.package_id == package_id)
    }

    /// 패키지로 레코드 조회
    pub fn get(&self, package_id: &str) -> Option<&AppRecord> {
        self.apps.iter().find(|a| a.package_id == package_id)
    }

    /// 패키지 제거. 제거되었으면 true
    pub fn remove(&mut self, package_id: &str) -> bool {
        let before = self.apps.len();
        self.apps.retain(|a| a.package_id != package_id);
        before != self.apps.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AppRecord> {
        self.apps.iter()
    }

    pub fn as_slice(&self) -> &[AppRecord] {
        &self.apps
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    /// 패키지 ID 집합 (순서 무관 비교용)
    pub fn package_ids(&self) -> HashSet<&str> {
        self.apps.iter().map(|a| a.package_id.as_str()).collect()
    }
}

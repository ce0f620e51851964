//! freedesktop `.desktop` 항목 기반 패키지 관리 어댑터.
//!
//! 패키지 ID는 파일 이름(확장자 제외)이다. 앞선 디렉토리의 항목이
//! 같은 ID의 뒤쪽 항목을 가린다 (XDG 데이터 디렉토리 우선순위).

use async_trait::async_trait;
use perch_core::config::MonitorConfig;
use perch_core::error::CoreError;
use perch_core::models::app::AppRecord;
use perch_core::ports::package_manager::PackageManager;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tracing::{debug, info, warn};

/// `.desktop` 확장자
pub const DESKTOP_EXTENSION: &str = "desktop";

/// 파싱된 `[Desktop Entry]` 그룹
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesktopEntry {
    /// 파일 이름에서 얻은 패키지 ID
    pub id: String,
    pub name: String,
    pub exec: Option<String>,
    pub icon: Option<String>,
    pub entry_type: Option<String>,
    pub no_display: bool,
    pub hidden: bool,
}

impl DesktopEntry {
    /// `.desktop` 파일 내용 파싱
    ///
    /// `[Desktop Entry]` 그룹만 읽고 지역화된 키(`Name[ko]`)는 무시한다.
    pub fn parse(id: &str, content: &str) -> Self {
        let mut entry = DesktopEntry {
            id: id.to_string(),
            ..Default::default()
        };
        let mut in_main_group = false;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if line.starts_with('[') {
                in_main_group = line == "[Desktop Entry]";
                continue;
            }
            if !in_main_group {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "Name" => entry.name = value.to_string(),
                "Exec" => entry.exec = Some(value.to_string()),
                "Icon" => entry.icon = Some(value.to_string()),
                "Type" => entry.entry_type = Some(value.to_string()),
                "NoDisplay" => entry.no_display = value == "true",
                "Hidden" => entry.hidden = value == "true",
                _ => {}
            }
        }
        entry
    }

    /// 런처에 표시할 항목인지
    pub fn is_listed(&self) -> bool {
        !self.no_display && !self.hidden && self.entry_type.as_deref() == Some("Application")
    }

    pub fn to_app_record(&self) -> AppRecord {
        AppRecord::new(&self.name, &self.id, self.icon.as_deref().unwrap_or_default())
    }
}

/// `Exec` 값을 인자 목록으로 분리하고 필드 코드(`%f`, `%U` 등) 제거
pub fn exec_args(exec: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;
    let mut chars = exec.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            '\\' if in_quotes => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    args.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }
    if has_token {
        args.push(current);
    }

    args.into_iter()
        .filter(|arg| !is_field_code(arg))
        .map(|arg| arg.replace("%%", "%"))
        .collect()
}

fn is_field_code(arg: &str) -> bool {
    let mut chars = arg.chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some('%'), Some(c), None) if c.is_ascii_alphabetic()
    )
}

/// XDG 기본 애플리케이션 디렉토리 (우선순위 순)
pub fn default_application_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Some(base) = directories::BaseDirs::new() {
        dirs.push(base.data_dir().join("applications"));
    }
    dirs.push(PathBuf::from("/usr/local/share/applications"));
    dirs.push(PathBuf::from("/usr/share/applications"));
    dirs
}

/// 디렉토리 안의 `.desktop` 파일 (이름 순)
pub(crate) async fn desktop_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut reader = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();
    while let Some(entry) = reader.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some(DESKTOP_EXTENSION) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn entry_id(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
}

/// `.desktop` 스캐너 (PackageManager 구현)
pub struct DesktopEntryScanner {
    dirs: Vec<PathBuf>,
}

impl DesktopEntryScanner {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    /// 설정의 디렉토리 사용 (비어 있으면 XDG 기본값)
    pub fn from_config(config: &MonitorConfig) -> Self {
        if config.application_dirs.is_empty() {
            Self::new(default_application_dirs())
        } else {
            Self::new(config.application_dirs.clone())
        }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// 모든 디렉토리를 스캔하여 표시 대상 항목 반환 (정렬 전)
    ///
    /// 읽을 수 있는 디렉토리가 하나도 없으면 `Enumeration` 에러.
    pub async fn scan(&self) -> Result<Vec<DesktopEntry>, CoreError> {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        let mut readable = 0usize;

        for dir in &self.dirs {
            let files = match desktop_files(dir).await {
                Ok(files) => files,
                Err(e) => {
                    debug!("앱 디렉토리 건너뜀: {}: {e}", dir.display());
                    continue;
                }
            };
            readable += 1;

            for path in files {
                let Some(id) = entry_id(&path) else {
                    continue;
                };
                // 숨겨진 항목도 뒤쪽 디렉토리의 같은 ID를 가린다
                if !seen.insert(id.clone()) {
                    continue;
                }
                match tokio::fs::read_to_string(&path).await {
                    Ok(content) => {
                        let entry = DesktopEntry::parse(&id, &content);
                        if entry.is_listed() {
                            entries.push(entry);
                        }
                    }
                    Err(e) => warn!("항목 읽기 실패: {}: {e}", path.display()),
                }
            }
        }

        if readable == 0 {
            return Err(CoreError::Enumeration(format!(
                "읽을 수 있는 앱 디렉토리 없음 ({}개 시도)",
                self.dirs.len()
            )));
        }
        Ok(entries)
    }

    /// ID로 표시 대상 항목 찾기
    async fn find(&self, package_id: &str) -> Result<DesktopEntry, CoreError> {
        self.scan()
            .await?
            .into_iter()
            .find(|e| e.id == package_id)
            .ok_or_else(|| CoreError::NotFound {
                resource_type: "App".to_string(),
                id: package_id.to_string(),
            })
    }
}

#[async_trait]
impl PackageManager for DesktopEntryScanner {
    async fn enumerate_installed_apps(&self) -> Result<Vec<AppRecord>, CoreError> {
        let mut records: Vec<AppRecord> = self
            .scan()
            .await?
            .iter()
            .map(DesktopEntry::to_app_record)
            .collect();
        records.sort_by_cached_key(|r| r.label.to_lowercase());
        debug!("설치된 앱 {}개 조회", records.len());
        Ok(records)
    }

    async fn launch_app(&self, package_id: &str) -> Result<(), CoreError> {
        let launch_error = |reason: String| CoreError::Launch {
            package_id: package_id.to_string(),
            reason,
        };

        let entry = self.find(package_id).await.map_err(|e| launch_error(e.to_string()))?;
        let exec = entry
            .exec
            .as_deref()
            .ok_or_else(|| launch_error("Exec 항목 없음".to_string()))?;
        let args = exec_args(exec);
        let (program, rest) = args
            .split_first()
            .ok_or_else(|| launch_error("빈 Exec 항목".to_string()))?;

        tokio::process::Command::new(program)
            .args(rest)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| launch_error(format!("{program}: {e}")))?;

        info!("앱 실행: {package_id} ({program})");
        Ok(())
    }

    fn request_uninstall(&self, package_id: &str) {
        // 데스크톱에는 OS 삭제 확인 창이 없다
        warn!("이 플랫폼은 앱 삭제를 지원하지 않음: {package_id}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_entry(dir: &Path, id: &str, body: &str) {
        std::fs::write(dir.join(format!("{id}.desktop")), body).unwrap();
    }

    fn app_entry(name: &str, exec: &str) -> String {
        format!("[Desktop Entry]\nType=Application\nName={name}\nExec={exec}\nIcon=app-icon\n")
    }

    #[test]
    fn parse_reads_main_group_only() {
        let entry = DesktopEntry::parse(
            "org.example.Mail",
            "# comment\n[Desktop Entry]\nType=Application\nName=Mail\nName[ko]=메일\nExec=mail %U\n\
             [Desktop Action Compose]\nName=Compose\nExec=mail --compose\n",
        );
        assert_eq!(entry.name, "Mail");
        assert_eq!(entry.exec.as_deref(), Some("mail %U"));
        assert!(entry.is_listed());
    }

    #[test]
    fn hidden_and_non_apps_are_not_listed() {
        let no_display =
            DesktopEntry::parse("a", "[Desktop Entry]\nType=Application\nName=A\nNoDisplay=true\n");
        let hidden = DesktopEntry::parse("b", "[Desktop Entry]\nType=Application\nName=B\nHidden=true\n");
        let link = DesktopEntry::parse("c", "[Desktop Entry]\nType=Link\nName=C\n");
        assert!(!no_display.is_listed());
        assert!(!hidden.is_listed());
        assert!(!link.is_listed());
    }

    #[test]
    fn exec_field_codes_are_stripped() {
        assert_eq!(exec_args("firefox %u"), vec!["firefox"]);
        assert_eq!(
            exec_args(r#""/opt/My App/run" --name "a \"b\"" %F"#),
            vec!["/opt/My App/run", "--name", "a \"b\""]
        );
        assert_eq!(exec_args("printf 100%%"), vec!["printf", "100%"]);
        assert!(exec_args("   ").is_empty());
    }

    #[tokio::test]
    async fn scan_sorts_by_label_and_skips_hidden() {
        let dir = TempDir::new().unwrap();
        write_entry(dir.path(), "zeta", &app_entry("zeta", "zeta"));
        write_entry(dir.path(), "alpha", &app_entry("Alpha", "alpha"));
        write_entry(dir.path(), "mid", &app_entry("Mid", "mid"));
        write_entry(
            dir.path(),
            "secret",
            "[Desktop Entry]\nType=Application\nName=Secret\nNoDisplay=true\n",
        );
        std::fs::write(dir.path().join("notes.txt"), "not an entry").unwrap();

        let scanner = DesktopEntryScanner::new(vec![dir.path().to_path_buf()]);
        let apps = scanner.enumerate_installed_apps().await.unwrap();
        let labels: Vec<&str> = apps.iter().map(|a| a.label.as_str()).collect();
        assert_eq!(labels, vec!["Alpha", "Mid", "zeta"]);
        assert_eq!(apps[0].package_id, "alpha");
        assert_eq!(apps[0].icon.as_str(), "app-icon");
    }

    #[tokio::test]
    async fn earlier_dirs_shadow_later() {
        let user = TempDir::new().unwrap();
        let system = TempDir::new().unwrap();
        write_entry(system.path(), "mail", &app_entry("System Mail", "mail"));
        write_entry(system.path(), "maps", &app_entry("Maps", "maps"));
        write_entry(user.path(), "mail", &app_entry("My Mail", "mail"));
        // 사용자 디렉토리에서 숨기면 시스템 항목도 숨겨진다
        write_entry(
            user.path(),
            "maps",
            "[Desktop Entry]\nType=Application\nName=Maps\nHidden=true\n",
        );

        let scanner =
            DesktopEntryScanner::new(vec![user.path().to_path_buf(), system.path().to_path_buf()]);
        let apps = scanner.enumerate_installed_apps().await.unwrap();
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].label, "My Mail");
    }

    #[tokio::test]
    async fn unreadable_dirs_are_skipped() {
        let dir = TempDir::new().unwrap();
        write_entry(dir.path(), "mail", &app_entry("Mail", "mail"));
        let scanner = DesktopEntryScanner::new(vec![
            dir.path().join("missing"),
            dir.path().to_path_buf(),
        ]);
        assert_eq!(scanner.enumerate_installed_apps().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn no_readable_dir_is_enumeration_error() {
        let dir = TempDir::new().unwrap();
        let scanner = DesktopEntryScanner::new(vec![dir.path().join("missing")]);
        assert!(matches!(
            scanner.enumerate_installed_apps().await,
            Err(CoreError::Enumeration(_))
        ));
    }

    #[tokio::test]
    async fn launch_unknown_package_is_launch_error() {
        let dir = TempDir::new().unwrap();
        let scanner = DesktopEntryScanner::new(vec![dir.path().to_path_buf()]);
        let err = scanner.launch_app("ghost").await.unwrap_err();
        assert!(matches!(err, CoreError::Launch { .. }));
        assert_eq!(err.user_message(), "Cannot Open");
    }

    #[tokio::test]
    async fn launch_missing_binary_is_launch_error() {
        let dir = TempDir::new().unwrap();
        write_entry(
            dir.path(),
            "broken",
            &app_entry("Broken", "/nonexistent/perch-test-binary %U"),
        );
        let scanner = DesktopEntryScanner::new(vec![dir.path().to_path_buf()]);
        assert!(matches!(
            scanner.launch_app("broken").await,
            Err(CoreError::Launch { .. })
        ));
    }

    #[test]
    fn config_dirs_override_defaults() {
        let config = MonitorConfig {
            application_dirs: vec![PathBuf::from("/tmp/apps")],
            ..Default::default()
        };
        assert_eq!(
            DesktopEntryScanner::from_config(&config).dirs(),
            &[PathBuf::from("/tmp/apps")]
        );
        assert!(!DesktopEntryScanner::from_config(&MonitorConfig::default())
            .dirs()
            .is_empty());
    }
}

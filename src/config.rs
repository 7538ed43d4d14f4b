use serde::{Deserialize, Serialize};

/// ## Structure
/// This module contains the data structures for the site configuration file.
///
/// ```text
/// SiteConfig
///   ├── meta: Option<Meta>
///   │   └── name: Option<String>
///   ├── diagram: DiagramConfig
///   │   ├── command: String            (default "qpic")
///   │   └── on_failure: FailureMode    (warn | error, default warn)
///   ├── output: String                 (default "_site")
///   └── pages: Vec<PageProfile>
///       ├── template: String
///       ├── output: String
///       └── data: Option<String>
/// ```

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Meta {
    pub name: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SiteConfig {
    pub meta: Option<Meta>,
    #[serde(default)]
    pub diagram: DiagramConfig,
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default)]
    pub pages: Vec<PageProfile>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            meta: None,
            diagram: DiagramConfig::default(),
            output: default_output(),
            pages: Vec::new(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PageProfile {
    pub template: String,
    pub output: String,
    pub data: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DiagramConfig {
    /// External rendering command, whitespace-split into program and leading
    /// arguments. Invoked as `<command> -o <name>.png` with the diagram
    /// source on stdin.
    #[serde(default = "default_command")]
    pub command: String,
    #[serde(default)]
    pub on_failure: FailureMode,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            on_failure: FailureMode::default(),
        }
    }
}

/// What to do when the external tool exits non-zero or produces no file.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FailureMode {
    /// Log exit status and stderr, keep the asset registration and img tag.
    #[default]
    Warn,
    /// Fail the page render.
    Error,
}

fn default_command() -> String {
    "qpic".to_string()
}

fn default_output() -> String {
    "_site".to_string()
}

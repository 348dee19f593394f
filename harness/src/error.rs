use std::path::PathBuf;

/// Failures while talking to the host or running external tools.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` failed ({}): {output}", status_text(.status))]
    ToolFailed {
        program: String,
        status: Option<i32>,
        output: String,
    },

    #[error("malformed {}: {message}", path.display())]
    Malformed { path: PathBuf, message: String },

    #[error("missing tools: {}", join(.0))]
    MissingTools(Vec<&'static str>),
}

fn status_text(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit status {code}"),
        None => "killed by signal".to_string(),
    }
}

fn join(tools: &[&str]) -> String {
    tools.join(", ")
}

impl HarnessError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HarnessError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        HarnessError::Malformed {
            path: path.into(),
            message: message.into(),
        }
    }
}

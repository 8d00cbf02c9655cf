use std::time::Duration;

/// Custom error type for report reading & the agent crew.
#[derive(Debug)]
pub enum Error {
    /// The report file could not be read from disk.
    Io(std::io::Error),

    /// The file is not a PDF the text extractor understands.
    PdfRead(String),

    /// The PDF parsed but has no extractable text (e.g. a scanned image).
    EmptyReport,

    /// Internal error: prompt substitution failed.
    PromptCreationFailure(subst::Error),

    /// Error calling the LLM API.
    LlmError(async_openai::error::OpenAIError),

    /// The LLM answered with no content. Holds who was asked.
    NoResponse(String),

    /// An agent exceeded its maximum execution time.
    AgentTimeout { role: String, limit: Duration },

    /// A crew needs at least one agent.
    EmptyCrew,

    /// A blocking task was cancelled or panicked.
    TaskFailure(String),

    /// An LLM provider failed for a reason of its own.
    ProviderFailure(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err) => write!(f, "Cannot read report file: {}", err),
            Error::PdfRead(msg) => write!(f, "Error reading PDF file: {}", msg),
            Error::EmptyReport => write!(f, "The PDF file contains no extractable text"),
            Error::PromptCreationFailure(err) => write!(f, "Failed to create prompt: {}", err),
            Error::LlmError(err) => write!(f, "Error calling the LLM: {}", err),
            Error::NoResponse(who) => write!(f, "No response from {}", who),
            Error::AgentTimeout { role, limit } => {
                write!(f, "{} did not finish within {} seconds", role, limit.as_secs())
            }
            Error::EmptyCrew => write!(f, "A crew needs at least one agent"),
            Error::TaskFailure(msg) => write!(f, "Background task failed: {}", msg),
            Error::ProviderFailure(msg) => write!(f, "LLM provider failure: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// io Errors occur when reading the uploaded report from disk.
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<pdf_extract::OutputError> for Error {
    fn from(err: pdf_extract::OutputError) -> Self {
        Error::PdfRead(err.to_string())
    }
}

impl From<subst::Error> for Error {
    fn from(err: subst::Error) -> Self {
        Error::PromptCreationFailure(err)
    }
}

impl From<async_openai::error::OpenAIError> for Error {
    fn from(err: async_openai::error::OpenAIError) -> Self {
        Error::LlmError(err)
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::TaskFailure(err.to_string())
    }
}

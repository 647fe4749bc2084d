//! Persona prompt construction
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.0.0: One builder shared by message styling and failure reports

/// Persona instructions sent ahead of every payload; `{character}` is substituted
pub const BASE_PROMPT: &str = "You are a tool to turn boring log messages into funny exchanges with an anime character.
You will pretend to be {character}.
Make sure to include all of the provided info.
Your output should be no more than a single paragraph.
Stay in character for the entire output.
Don't include any of the above information in the output.
";

/// What the completion is asked to do with the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Restyle a print or log message
    Message,
    /// Restyle a failure report (kind, value, traceback)
    Exception,
}

impl Task {
    pub fn instruction(&self) -> &'static str {
        match self {
            Task::Message => "Please summarize the following message:",
            Task::Exception => "Please summarize the following exception info:",
        }
    }
}

/// Builder for the single user message sent to the completion service
///
/// ```ignore
/// let prompt = PromptBuilder::new("tsundere")
///     .with_task(Task::Message)
///     .with_payload("disk almost full")
///     .build();
/// ```
pub struct PromptBuilder<'a> {
    character: &'a str,
    task: Task,
    payload: String,
}

impl<'a> PromptBuilder<'a> {
    pub fn new(character: &'a str) -> Self {
        Self {
            character,
            task: Task::Message,
            payload: String::new(),
        }
    }

    pub fn with_task(mut self, task: Task) -> Self {
        self.task = task;
        self
    }

    /// Payload is appended verbatim after the task instruction
    pub fn with_payload(mut self, payload: &str) -> Self {
        self.payload = payload.to_string();
        self
    }

    pub fn build(self) -> String {
        let mut prompt = BASE_PROMPT.replace("{character}", self.character);
        prompt.push_str(self.task.instruction());
        prompt.push('\n');
        prompt.push_str(&self.payload);
        prompt
    }
}

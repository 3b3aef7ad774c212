/// Front-end stages, in the order a run walks through them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Stage {
    /// Typing the project name.
    #[default]
    NamingProject,
    /// Typing the destination path.
    PathingProject,
    /// Picking a category (input format).
    SelectingInput,
    /// Picking a plugin (output format) within the category.
    SelectingOutput,
    /// Scaffold run in flight.
    Scaffolding,
    Done,
    Failed(String),
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Stage::NamingProject => "NAME",
            Stage::PathingProject => "PATH",
            Stage::SelectingInput => "INPUT",
            Stage::SelectingOutput => "OUTPUT",
            Stage::Scaffolding => "WORKING",
            Stage::Done => "DONE",
            Stage::Failed(_) => "FAILED",
        }
    }
}

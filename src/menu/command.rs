use std::fmt;

/// Everything the menu can do. Menu numbers are fixed, so scripts piping choices into the
/// tracker keep working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    ToggleVisualization,
    SaveData,
    PlotCounts,
    SetMinArea,
    SetMaxArea,
    Exit,
    ProcessFrames,
    LoadData,
}

impl Command {
    /// In menu order.
    pub const ALL: [Command; 8] = [
        Command::ToggleVisualization,
        Command::SaveData,
        Command::PlotCounts,
        Command::SetMinArea,
        Command::SetMaxArea,
        Command::Exit,
        Command::ProcessFrames,
        Command::LoadData,
    ];

    pub fn choice(self) -> u8 {
        match self {
            Command::ToggleVisualization => 1,
            Command::SaveData => 2,
            Command::PlotCounts => 3,
            Command::SetMinArea => 4,
            Command::SetMaxArea => 5,
            Command::Exit => 6,
            Command::ProcessFrames => 7,
            Command::LoadData => 8,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Command::ToggleVisualization => "Toggle Visualization",
            Command::SaveData => "Save Debris Data",
            Command::PlotCounts => "Plot Debris Counts",
            Command::SetMinArea => "Set Min Area",
            Command::SetMaxArea => "Set Max Area",
            Command::Exit => "Exit",
            Command::ProcessFrames => "Process Frames",
            Command::LoadData => "Load Debris Data",
        }
    }

    /// Parse a line typed at the menu prompt.
    pub fn from_choice(text: &str) -> Option<Self> {
        let choice = text.trim().parse::<u8>().ok()?;
        Self::ALL.into_iter().find(|cmd| cmd.choice() == choice)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.choice(), self.label())
    }
}

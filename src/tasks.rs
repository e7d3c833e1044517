use serde::Serialize;

/// One completable item of the daily checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaskDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub subtitle: &'static str,
    pub color: &'static str,
    pub icon: &'static str,
    /// Repetitions credited per completed day, when the task has a volume.
    pub reps: Option<u64>,
}

/// The fixed checklist, in display order.
pub const TASKS: &[TaskDefinition] = &[
    TaskDefinition {
        id: "pushup",
        name: "50 Pushups",
        subtitle: "Daily non-negotiable",
        color: "#00ff88",
        icon: "💪",
        reps: Some(50),
    },
    TaskDefinition {
        id: "journal",
        name: "Journaling",
        subtitle: "Reflect & plan",
        color: "#ff6b35",
        icon: "📓",
        reps: None,
    },
    TaskDefinition {
        id: "english",
        name: "English (FreeCodeCamp)",
        subtitle: "A2→B2 track",
        color: "#4d9fff",
        icon: "🌍",
        reps: None,
    },
    TaskDefinition {
        id: "linkedin",
        name: "LinkedIn Post",
        subtitle: "GeoAI forecasting, 3h study",
        color: "#c77dff",
        icon: "📡",
        reps: None,
    },
    TaskDefinition {
        id: "thesis",
        name: "Thesis / Research",
        subtitle: "Writing or analysis",
        color: "#ffd166",
        icon: "📖",
        reps: None,
    },
    TaskDefinition {
        id: "ml",
        name: "ML / DL / PyTorch",
        subtitle: "Coursera + practice",
        color: "#ff4d8d",
        icon: "🤖",
        reps: None,
    },
    TaskDefinition {
        id: "ts",
        name: "Time Series",
        subtitle: "R + Python + models",
        color: "#00e5ff",
        icon: "📈",
        reps: None,
    },
];

pub fn find_task(id: &str) -> Option<&'static TaskDefinition> {
    TASKS.iter().find(|task| task.id == id)
}

pub fn is_known_task(id: &str) -> bool {
    find_task(id).is_some()
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    EmailTemplate,
    Documents,
    Process,
    Dscr,
    General,
}

impl Intent {
    /// Keyword buckets in their default precedence. Drafting requests win over
    /// questions about documents: "what documents should I email the title
    /// agent" is a request for an email.
    pub const DEFAULT_PRIORITY: [Intent; 4] = [
        Intent::EmailTemplate,
        Intent::Documents,
        Intent::Process,
        Intent::Dscr,
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "email" | "email_template" => Some(Intent::EmailTemplate),
            "documents" | "docs" => Some(Intent::Documents),
            "process" => Some(Intent::Process),
            "dscr" => Some(Intent::Dscr),
            _ => None,
        }
    }

    fn keywords(self) -> &'static [&'static str] {
        match self {
            Intent::EmailTemplate => &["email", "draft", "write to", "reach out", "template"],
            Intent::Documents => &[
                "document",
                "docs",
                "missing",
                "checklist",
                "upload",
                "paperwork",
            ],
            Intent::Process => &[
                "next step",
                "process",
                "stage",
                "status",
                "timeline",
                "what's next",
                "what now",
            ],
            Intent::Dscr => &["dscr", "debt service", "coverage ratio"],
            Intent::General => &[],
        }
    }
}

/// Ordered keyword matcher; the first bucket with a matching keyword wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentClassifier {
    priority: Vec<Intent>,
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::with_priority(&Intent::DEFAULT_PRIORITY)
    }
}

impl IntentClassifier {
    /// Buckets missing from `priority` are appended in default order so every
    /// bucket stays reachable. `General` is the fallback and is ignored here.
    pub fn with_priority(priority: &[Intent]) -> Self {
        let mut ordered: Vec<Intent> = Vec::with_capacity(Intent::DEFAULT_PRIORITY.len());
        for intent in priority
            .iter()
            .chain(Intent::DEFAULT_PRIORITY.iter())
            .copied()
        {
            if intent != Intent::General && !ordered.contains(&intent) {
                ordered.push(intent);
            }
        }
        Self { priority: ordered }
    }

    pub fn priority(&self) -> &[Intent] {
        &self.priority
    }

    pub fn classify(&self, query: &str) -> Intent {
        let query = query.to_lowercase();
        self.priority
            .iter()
            .copied()
            .find(|intent| {
                intent
                    .keywords()
                    .iter()
                    .any(|keyword| query.contains(keyword))
            })
            .unwrap_or(Intent::General)
    }
}

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::CareerSelection;
use crate::session::credentials::SessionCredentials;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One message in a conversation. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl ChatTurn {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

/// The content tabs whose latest output is cached per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Career,
    Market,
    Colleges,
    Resume,
}

impl ReportKind {
    /// Reports generated from the session's career selection.
    pub fn follows_selection(&self) -> bool {
        !matches!(self, ReportKind::Resume)
    }
}

/// The selection-driven subset of [`ReportKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Career,
    Market,
    Colleges,
}

impl From<InsightKind> for ReportKind {
    fn from(kind: InsightKind) -> Self {
        match kind {
            InsightKind::Career => ReportKind::Career,
            InsightKind::Market => ReportKind::Market,
            InsightKind::Colleges => ReportKind::Colleges,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CachedReport {
    pub kind: ReportKind,
    pub markdown: String,
    /// Selection label (or target role for resume feedback) the report was built for.
    pub generated_for: String,
    pub generated_at: DateTime<Utc>,
}

/// Per-user conversation state: ordered turns, current selection, cached
/// reports and interactively supplied credentials.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    turns: Vec<ChatTurn>,
    selection: Option<CareerSelection>,
    reports: HashMap<ReportKind, CachedReport>,
    credentials: SessionCredentials,
    max_turns: usize,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl Session {
    pub fn new(max_turns: usize) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            turns: Vec::new(),
            selection: None,
            reports: HashMap::new(),
            credentials: SessionCredentials::default(),
            max_turns: max_turns.max(1),
            created_at: now,
            last_active: now,
        }
    }

    /// Appends a turn, dropping the oldest turns once the cap is exceeded.
    pub fn append_turn(&mut self, role: Role, text: impl Into<String>) {
        self.turns.push(ChatTurn::new(role, text));
        if self.turns.len() > self.max_turns {
            let excess = self.turns.len() - self.max_turns;
            self.turns.drain(..excess);
        }
    }

    pub fn history(&self) -> &[ChatTurn] {
        &self.turns
    }

    /// Resets everything the user accumulated. The session id stays valid.
    pub fn clear(&mut self) {
        self.turns.clear();
        self.selection = None;
        self.reports.clear();
        self.credentials = SessionCredentials::default();
    }

    pub fn selection(&self) -> Option<&CareerSelection> {
        self.selection.as_ref()
    }

    pub fn select(&mut self, selection: CareerSelection) {
        self.selection = Some(selection);
    }

    /// Caches a report, replacing the previous one of the same kind.
    pub fn store_report(
        &mut self,
        kind: ReportKind,
        markdown: String,
        generated_for: String,
    ) -> CachedReport {
        let report = CachedReport {
            kind,
            markdown,
            generated_for,
            generated_at: Utc::now(),
        };
        self.reports.insert(kind, report.clone());
        report
    }

    pub fn report(&self, kind: ReportKind) -> Option<&CachedReport> {
        self.reports.get(&kind)
    }

    pub fn reports(&self) -> impl Iterator<Item = &CachedReport> {
        self.reports.values()
    }

    /// A selection-driven report is stale once the selection moved on.
    pub fn is_stale(&self, report: &CachedReport) -> bool {
        if !report.kind.follows_selection() {
            return false;
        }
        match &self.selection {
            Some(selection) => selection.label() != report.generated_for,
            None => true,
        }
    }

    pub fn credentials(&self) -> &SessionCredentials {
        &self.credentials
    }

    pub fn credentials_mut(&mut self) -> &mut SessionCredentials {
        &mut self.credentials
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_active = now;
    }
}

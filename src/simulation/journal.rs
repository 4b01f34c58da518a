use std::collections::BTreeMap;

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::quests::QuestDef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestStatus {
    Active,
    Completed,
    Failed,
}

impl QuestStatus {
    pub fn is_finished(self) -> bool {
        !matches!(self, QuestStatus::Active)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    pub id: String,
    pub title: String,
    pub description: String,
    pub objectives: Vec<Objective>,
    pub status: QuestStatus,
}

impl Quest {
    pub fn from_def(def: &QuestDef) -> Self {
        Self {
            id: def.id.to_string(),
            title: def.title.to_string(),
            description: def.description.to_string(),
            objectives: def
                .objectives
                .iter()
                .map(|(id, text)| Objective {
                    id: id.to_string(),
                    text: text.to_string(),
                    done: false,
                })
                .collect(),
            status: QuestStatus::Active,
        }
    }

    pub fn progress(&self) -> (usize, usize) {
        let done = self.objectives.iter().filter(|o| o.done).count();
        (done, self.objectives.len())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub stamp: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JournalError {
    #[error("unknown quest {0}")]
    UnknownQuest(String),
    #[error("quest {0} is already finished")]
    QuestFinished(String),
    #[error("quest {0} has not been started")]
    QuestNotStarted(String),
    #[error("quest {quest} has no objective {objective}")]
    UnknownObjective { quest: String, objective: String },
}

/// Quest log plus free-form notes, stored as a world resource.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
    #[serde(default)]
    pub quests: BTreeMap<String, Quest>,
    #[serde(default)]
    pub entries: Vec<JournalEntry>,
}

impl Journal {
    /// Start a quest. Returns `Ok(false)` when it is already active.
    pub fn start_quest(&mut self, def: &QuestDef) -> Result<bool, JournalError> {
        if let Some(existing) = self.quests.get(def.id) {
            if existing.status.is_finished() {
                return Err(JournalError::QuestFinished(def.id.to_string()));
            }
            return Ok(false);
        }
        self.quests.insert(def.id.to_string(), Quest::from_def(def));
        Ok(true)
    }

    fn active_mut(&mut self, quest_id: &str) -> Result<&mut Quest, JournalError> {
        let quest = self
            .quests
            .get_mut(quest_id)
            .ok_or_else(|| JournalError::QuestNotStarted(quest_id.to_string()))?;
        if quest.status.is_finished() {
            return Err(JournalError::QuestFinished(quest_id.to_string()));
        }
        Ok(quest)
    }

    /// Tick off one objective. Returns true when every objective is now done.
    pub fn complete_objective(&mut self, quest_id: &str, objective_id: &str) -> Result<bool, JournalError> {
        let quest = self.active_mut(quest_id)?;
        let objective = quest
            .objectives
            .iter_mut()
            .find(|o| o.id == objective_id)
            .ok_or_else(|| JournalError::UnknownObjective {
                quest: quest_id.to_string(),
                objective: objective_id.to_string(),
            })?;
        objective.done = true;
        Ok(quest.objectives.iter().all(|o| o.done))
    }

    pub fn complete_quest(&mut self, quest_id: &str) -> Result<(), JournalError> {
        let quest = self.active_mut(quest_id)?;
        for objective in quest.objectives.iter_mut() {
            objective.done = true;
        }
        quest.status = QuestStatus::Completed;
        Ok(())
    }

    pub fn fail_quest(&mut self, quest_id: &str) -> Result<(), JournalError> {
        let quest = self.active_mut(quest_id)?;
        quest.status = QuestStatus::Failed;
        Ok(())
    }

    pub fn note(&mut self, stamp: impl Into<String>, text: impl Into<String>) {
        self.entries.push(JournalEntry {
            stamp: stamp.into(),
            text: text.into(),
        });
    }

    pub fn status(&self, quest_id: &str) -> Option<QuestStatus> {
        self.quests.get(quest_id).map(|q| q.status)
    }

    pub fn is_active(&self, quest_id: &str) -> bool {
        self.status(quest_id) == Some(QuestStatus::Active)
    }

    pub fn is_completed(&self, quest_id: &str) -> bool {
        self.status(quest_id) == Some(QuestStatus::Completed)
    }

    pub fn active_quests(&self) -> impl Iterator<Item = &Quest> {
        self.quests.values().filter(|q| q.status == QuestStatus::Active)
    }

    pub fn completed_quests(&self) -> impl Iterator<Item = &Quest> {
        self.quests.values().filter(|q| q.status == QuestStatus::Completed)
    }

    pub fn failed_quests(&self) -> impl Iterator<Item = &Quest> {
        self.quests.values().filter(|q| q.status == QuestStatus::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::quests::quest_def;

    #[test]
    fn start_is_idempotent_until_finished() {
        let mut journal = Journal::default();
        let def = quest_def("first_exorcism").expect("quest");
        assert_eq!(journal.start_quest(def), Ok(true));
        assert_eq!(journal.start_quest(def), Ok(false));
        journal.complete_quest(def.id).expect("complete");
        assert_eq!(
            journal.start_quest(def),
            Err(JournalError::QuestFinished(def.id.to_string()))
        );
        assert_eq!(journal.completed_quests().count(), 1);
        assert!(journal.quests[def.id].objectives.iter().all(|o| o.done));
    }

    #[test]
    fn objectives_report_when_all_done() {
        let mut journal = Journal::default();
        let def = quest_def("first_exorcism").expect("quest");
        journal.start_quest(def).expect("start");
        let ids: Vec<&str> = def.objectives.iter().map(|(id, _)| *id).collect();
        for (i, id) in ids.iter().enumerate() {
            let all_done = journal.complete_objective(def.id, id).expect("objective");
            assert_eq!(all_done, i + 1 == ids.len());
        }
        assert!(matches!(
            journal.complete_objective(def.id, "nope"),
            Err(JournalError::UnknownObjective { .. })
        ));
    }

    #[test]
    fn failing_requires_an_active_quest() {
        let mut journal = Journal::default();
        assert_eq!(
            journal.fail_quest("first_exorcism"),
            Err(JournalError::QuestNotStarted("first_exorcism".to_string()))
        );
        let def = quest_def("first_exorcism").expect("quest");
        journal.start_quest(def).expect("start");
        journal.fail_quest(def.id).expect("fail");
        assert_eq!(journal.failed_quests().count(), 1);
        assert!(!journal.is_active(def.id));
    }
}

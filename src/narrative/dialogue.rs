use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::narrative::consequence::Consequence;
use crate::narrative::requirement::{all_met, RequirementContext, Requirement};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueChoice {
    pub text: String,
    /// Node to move to; `None` ends the conversation.
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub requirements: Vec<Requirement>,
    #[serde(default)]
    pub consequences: Vec<Consequence>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueNode {
    pub id: String,
    pub speaker: String,
    pub text: String,
    #[serde(default)]
    pub choices: Vec<DialogueChoice>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueTree {
    pub id: String,
    pub npc_id: String,
    pub root: String,
    pub nodes: BTreeMap<String, DialogueNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DialogueError {
    #[error("unknown dialogue {0}")]
    UnknownTree(String),
    #[error("dialogue {tree} has no node {node}")]
    UnknownNode { tree: String, node: String },
    #[error("choice {0} is not on offer")]
    ChoiceOutOfRange(usize),
    #[error("the conversation is over")]
    Finished,
    #[error("nobody is talking to you")]
    NoConversation,
    #[error("{0} is not here")]
    NpcNotPresent(String),
    #[error("invalid dialogue: {0}")]
    Invalid(String),
}

impl DialogueTree {
    pub fn node(&self, id: &str) -> Option<&DialogueNode> {
        self.nodes.get(id)
    }

    /// Root exists, every `next` resolves, no node or choice is blank.
    pub fn validate(&self) -> Result<(), DialogueError> {
        if self.id.trim().is_empty() {
            return Err(DialogueError::Invalid("dialogue id cannot be empty".to_string()));
        }
        if !self.nodes.contains_key(&self.root) {
            return Err(DialogueError::UnknownNode {
                tree: self.id.clone(),
                node: self.root.clone(),
            });
        }
        for (key, node) in &self.nodes {
            if key != &node.id {
                return Err(DialogueError::Invalid(format!(
                    "{}: node stored under {} has id {}",
                    self.id, key, node.id
                )));
            }
            if node.text.trim().is_empty() {
                return Err(DialogueError::Invalid(format!("{}: node {} has no text", self.id, node.id)));
            }
            for choice in &node.choices {
                if choice.text.trim().is_empty() {
                    return Err(DialogueError::Invalid(format!(
                        "{}: node {} has a blank choice",
                        self.id, node.id
                    )));
                }
                if let Some(next) = &choice.next {
                    if !self.nodes.contains_key(next) {
                        return Err(DialogueError::UnknownNode {
                            tree: self.id.clone(),
                            node: next.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Node ids that can never be reached from the root.
    pub fn unreachable_nodes(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut stack = vec![self.root.clone()];
        while let Some(id) = stack.pop() {
            if !seen.insert(id.clone()) {
                continue;
            }
            if let Some(node) = self.nodes.get(&id) {
                stack.extend(node.choices.iter().filter_map(|c| c.next.clone()));
            }
        }
        self.nodes.keys().filter(|id| !seen.contains(*id)).cloned().collect()
    }
}

/// What a choice did to the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceResult {
    pub consequences: Vec<Consequence>,
    pub ended: bool,
}

/// A walk through one dialogue tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueSession {
    tree: DialogueTree,
    current: Option<String>,
}

impl DialogueSession {
    pub fn new(tree: DialogueTree) -> Self {
        let current = Some(tree.root.clone());
        Self { tree, current }
    }

    pub fn tree(&self) -> &DialogueTree {
        &self.tree
    }

    pub fn npc_id(&self) -> &str {
        &self.tree.npc_id
    }

    pub fn is_finished(&self) -> bool {
        self.current.is_none()
    }

    pub fn current_node(&self) -> Option<&DialogueNode> {
        self.current.as_deref().and_then(|id| self.tree.node(id))
    }

    /// Choices whose requirements hold, with their index in the node.
    pub fn available_choices(&self, ctx: &RequirementContext) -> Vec<(usize, &DialogueChoice)> {
        self.current_node()
            .map(|node| {
                node.choices
                    .iter()
                    .enumerate()
                    .filter(|(_, choice)| all_met(&choice.requirements, ctx))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Pick the `index`-th available choice (0-based). A node with no choices
    /// accepts index 0 as "end conversation".
    pub fn choose(&mut self, index: usize, ctx: &RequirementContext) -> Result<ChoiceResult, DialogueError> {
        let node = self.current_node().ok_or(DialogueError::Finished)?;
        if node.choices.is_empty() {
            if index != 0 {
                return Err(DialogueError::ChoiceOutOfRange(index));
            }
            self.current = None;
            return Ok(ChoiceResult {
                consequences: Vec::new(),
                ended: true,
            });
        }

        let (consequences, next) = {
            let available = self.available_choices(ctx);
            let (_, choice) = available
                .get(index)
                .ok_or(DialogueError::ChoiceOutOfRange(index))?;
            (choice.consequences.clone(), choice.next.clone())
        };
        self.current = next;
        Ok(ChoiceResult {
            consequences,
            ended: self.current.is_none(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::character::Character;
    use crate::components::inventory::Inventory;
    use crate::rules::traits::TraitKind;
    use crate::simulation::flags::StoryFlags;
    use crate::simulation::journal::Journal;
    use crate::simulation::relationships::RelationshipBook;

    fn tree() -> DialogueTree {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            "start".to_string(),
            DialogueNode {
                id: "start".into(),
                speaker: "Rin".into(),
                text: "Spar with me?".into(),
                choices: vec![
                    DialogueChoice {
                        text: "Only if you go all out.".into(),
                        next: Some("brave".into()),
                        requirements: vec![Requirement::TraitAtLeast {
                            kind: TraitKind::Courage,
                            value: 70,
                        }],
                        consequences: vec![Consequence::set_flag("brave_answer")],
                    },
                    DialogueChoice {
                        text: "Maybe later.".into(),
                        next: None,
                        requirements: vec![],
                        consequences: vec![Consequence::AdjustRelationship {
                            npc: "rival".into(),
                            delta: -5,
                        }],
                    },
                ],
            },
        );
        nodes.insert(
            "brave".to_string(),
            DialogueNode {
                id: "brave".into(),
                speaker: "Rin".into(),
                text: "Ha. Don't cry afterwards.".into(),
                choices: vec![],
            },
        );
        DialogueTree {
            id: "rival_test".into(),
            npc_id: "rival".into(),
            root: "start".into(),
            nodes,
        }
    }

    fn with_ctx<T>(courage: u8, f: impl FnOnce(&RequirementContext) -> T) -> T {
        let mut character = Character::new("Test", 100, 50, 10, 10, 10);
        character.traits.set(TraitKind::Courage, courage);
        let flags = StoryFlags::default();
        let inventory = Inventory::default();
        let relationships = RelationshipBook::default();
        let journal = Journal::default();
        let ctx = RequirementContext {
            flags: &flags,
            character: &character,
            inventory: &inventory,
            relationships: &relationships,
            journal: &journal,
        };
        f(&ctx)
    }

    #[test]
    fn locked_choices_are_hidden() {
        let session = DialogueSession::new(tree());
        with_ctx(50, |ctx| {
            let choices = session.available_choices(ctx);
            assert_eq!(choices.len(), 1);
            assert_eq!(choices[0].0, 1);
        });
        with_ctx(80, |ctx| assert_eq!(session.available_choices(ctx).len(), 2));
    }

    #[test]
    fn choosing_walks_to_the_end() {
        let mut session = DialogueSession::new(tree());
        with_ctx(80, |ctx| {
            let result = session.choose(0, ctx).expect("choice");
            assert_eq!(result.consequences, vec![Consequence::set_flag("brave_answer")]);
            assert!(!result.ended);
            assert_eq!(session.current_node().map(|n| n.id.as_str()), Some("brave"));
            assert_eq!(session.choose(1, ctx), Err(DialogueError::ChoiceOutOfRange(1)));
            assert!(session.choose(0, ctx).expect("leave").ended);
            assert_eq!(session.choose(0, ctx), Err(DialogueError::Finished));
        });
    }

    #[test]
    fn index_counts_only_available_choices() {
        let mut session = DialogueSession::new(tree());
        with_ctx(10, |ctx| {
            let result = session.choose(0, ctx).expect("only choice");
            assert!(result.ended);
            assert!(matches!(result.consequences[0], Consequence::AdjustRelationship { delta: -5, .. }));
        });
    }

    #[test]
    fn validation_catches_dangling_links() {
        let mut broken = tree();
        assert!(broken.validate().is_ok());
        assert!(broken.unreachable_nodes().is_empty());
        if let Some(node) = broken.nodes.get_mut("start") {
            node.choices[0].next = Some("missing".into());
        }
        assert_eq!(
            broken.validate(),
            Err(DialogueError::UnknownNode {
                tree: "rival_test".into(),
                node: "missing".into()
            })
        );
        broken.root = "nowhere".into();
        assert!(broken.validate().is_err());
    }
}

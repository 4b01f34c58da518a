use std::collections::BTreeMap;

use bevy_ecs::prelude::*;
use tracing::warn;

use crate::data::arcs::builtin_arcs;
use crate::data::cutscenes::builtin_cutscenes;
use crate::data::dialogues::builtin_dialogues;
use crate::narrative::arcs::StoryArc;
use crate::narrative::cutscene::Cutscene;
use crate::narrative::dialogue::DialogueTree;

/// Static story content available to the running game.
#[derive(Resource, Debug, Clone)]
pub struct StoryLibrary {
    pub dialogues: BTreeMap<String, DialogueTree>,
    pub arcs: Vec<StoryArc>,
    pub cutscenes: Vec<Cutscene>,
}

impl Default for StoryLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}

impl StoryLibrary {
    pub fn builtin() -> Self {
        Self {
            dialogues: builtin_dialogues().into_iter().map(|t| (t.id.clone(), t)).collect(),
            arcs: builtin_arcs(),
            cutscenes: builtin_cutscenes(),
        }
    }

    /// Add loaded trees; a tree with a built-in id replaces the built-in one.
    pub fn extend_dialogues(&mut self, trees: impl IntoIterator<Item = DialogueTree>) {
        for tree in trees {
            if self.dialogues.contains_key(&tree.id) {
                warn!(id = %tree.id, "loaded dialogue overrides built-in tree");
            }
            self.dialogues.insert(tree.id.clone(), tree);
        }
    }

    pub fn dialogue(&self, id: &str) -> Option<&DialogueTree> {
        self.dialogues.get(id)
    }

    pub fn arc(&self, id: &str) -> Option<&StoryArc> {
        self.arcs.iter().find(|arc| arc.id == id)
    }

    pub fn cutscene(&self, id: &str) -> Option<&Cutscene> {
        self.cutscenes.iter().find(|scene| scene.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loaded_trees_override_builtins() {
        let mut library = StoryLibrary::builtin();
        let mut replacement = library.dialogue("medic_checkup").cloned().expect("medic");
        replacement.root = "tired".into();
        let count = library.dialogues.len();
        library.extend_dialogues(vec![replacement]);
        assert_eq!(library.dialogues.len(), count);
        assert_eq!(library.dialogue("medic_checkup").map(|t| t.root.as_str()), Some("tired"));
        assert!(library.arc("prologue").is_some());
        assert!(library.cutscene("rooftop_talk").is_some());
    }
}

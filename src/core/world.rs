use std::path::Path;

use bevy_ecs::prelude::*;
use tracing::{info, warn};

use crate::components::character::Character;
use crate::components::identity::Appearance;
use crate::components::inventory::{EquipSlot, Inventory, InventoryError};
use crate::components::stamina::StaminaPool;
use crate::components::world::Player;
use crate::core::ecs::{create_schedule, create_world};
use crate::core::serialization::{
    apply_state_to_world, extract_state_from_world, load_state_from_path, save_state_to_path, SaveState,
};
use crate::data::enemies::enemy_template;
use crate::data::items::{item_def, item_name, recipe, ConsumableEffect, ItemKind};
use crate::data::locations::STARTING_LOCATION;
use crate::data::npcs::npc;
use crate::data::quests::exorcism_objectives;
use crate::error::{GameError, GameResult, StoryError};
use crate::narrative::arcs::{cleared_flag, complete_chapter, next_chapter, ArcProgress, ChapterCompletion};
use crate::narrative::consequence::{Consequence, ConsequenceOutcome};
use crate::narrative::cutscene::Cutscene;
use crate::narrative::dialogue::{DialogueError, DialogueSession, DialogueTree};
use crate::narrative::requirement::RequirementContext;
use crate::rules::grade::Grade;
use crate::rules::status::cleanse;
use crate::simulation::activity::ActivityLog;
use crate::simulation::combat::{CombatAction, CombatEnd, CombatState, RoundReport};
use crate::simulation::flags::StoryFlags;
use crate::simulation::journal::Journal;
use crate::simulation::library::StoryLibrary;
use crate::simulation::location::{CurrentLocation, PendingEncounter};
use crate::simulation::modes::{partial_heal, Difficulty, GameMode, ModeProgress, SURVIVAL_WAVE_HEAL};
use crate::simulation::origin::CharacterBlueprint;
use crate::simulation::relationships::RelationshipBook;
use crate::simulation::rng::GameRng;
use crate::simulation::time::GameTime;
use crate::systems::combat_loop::{combat_round, start_combat, CombatError};
use crate::systems::consequences::{apply_consequence, apply_consequences, award_xp};
use crate::systems::overworld::{ActionIntent, ActionQueue};
use crate::world::repository::SaveRepository;
use crate::world::sqlite::{PersistenceError, SlotSummary};

const STARTING_ITEMS: &[(&str, u32)] = &[("healing_talisman", 2), ("energy_vial", 1)];
/// Share of max HP the infirmary gives back after a lost fight.
const INFIRMARY_RECOVERY: f32 = 0.25;

/// Data snapshot returned to the UI layer after each tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub time: String,
    pub player_name: String,
    pub level: u32,
    pub grade: Grade,
    pub hp: (i32, i32),
    pub energy: (i32, i32),
    pub stamina: (i32, i32),
    pub location: String,
    pub log: Vec<String>,
    /// Name of the enemy if the tick ended in an ambush.
    pub encounter: Option<String>,
}

/// The node the player is looking at, with the choices currently on offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueView {
    pub tree: String,
    pub speaker: String,
    pub text: String,
    pub choices: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOutcome {
    pub outcomes: Vec<ConsequenceOutcome>,
    pub next: Option<DialogueView>,
    /// Enemy name when the choice started a fight.
    pub encounter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoryStep {
    Encounter {
        chapter: String,
        title: String,
        intro: String,
        enemy: String,
    },
    Completed {
        chapter: String,
        title: String,
        intro: String,
        outcomes: Vec<ConsequenceOutcome>,
        dialogue: Option<DialogueView>,
        arc_finished: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArcSummary {
    pub id: String,
    pub title: String,
    pub current_chapter: Option<String>,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CutsceneViewing {
    pub cutscene: Cutscene,
    pub outcomes: Vec<ConsequenceOutcome>,
}

/// One combat round plus whatever followed the fight's end.
#[derive(Debug, Clone, PartialEq)]
pub struct CombatTurn {
    pub report: RoundReport,
    pub aftermath: Vec<String>,
    pub dialogue: Option<DialogueView>,
}

/// A story fight: winning it clears the chapter it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
struct StoryEncounter {
    arc: String,
    chapter: String,
    enemy: String,
}

/// Wrapper around the ECS world and schedule, plus the fight and
/// conversation in progress.
pub struct Game {
    world: World,
    schedule: Schedule,
    player: Entity,
    seed: u64,
    combat: Option<CombatState>,
    dialogue: Option<DialogueSession>,
    story_encounter: Option<StoryEncounter>,
}

fn requirement_context(world: &World, player: Entity) -> GameResult<RequirementContext<'_>> {
    Ok(RequirementContext {
        flags: world.resource::<StoryFlags>(),
        character: world.get::<Character>(player).ok_or(GameError::MissingPlayer("character"))?,
        inventory: world.get::<Inventory>(player).ok_or(GameError::MissingPlayer("inventory"))?,
        relationships: world.resource::<RelationshipBook>(),
        journal: world.resource::<Journal>(),
    })
}

fn view_of(session: &DialogueSession, ctx: &RequirementContext) -> Option<DialogueView> {
    let node = session.current_node()?;
    Some(DialogueView {
        tree: session.tree().id.clone(),
        speaker: node.speaker.clone(),
        text: node.text.clone(),
        choices: session
            .available_choices(ctx)
            .into_iter()
            .map(|(_, choice)| choice.text.clone())
            .collect(),
    })
}

impl Game {
    /// Create a fresh world around the sorcerer described by `blueprint`.
    pub fn new(seed: u64, blueprint: &CharacterBlueprint) -> GameResult<Self> {
        let character = blueprint.build()?;
        let mut world = create_world(seed);

        let mut inventory = Inventory::default();
        for (item, quantity) in STARTING_ITEMS {
            inventory.add(item, *quantity);
        }
        info!(seed, name = %character.name, background = %blueprint.background, "new game");
        let player = world
            .spawn((
                Player,
                character,
                inventory,
                StaminaPool::default(),
                blueprint.appearance.clone(),
            ))
            .id();

        Ok(Self {
            world,
            schedule: create_schedule(),
            player,
            seed,
            combat: None,
            dialogue: None,
            story_encounter: None,
        })
    }

    pub fn set_rules(&mut self, mode: GameMode, difficulty: Difficulty) {
        let mut modes = self.world.resource_mut::<ModeProgress>();
        modes.mode = mode;
        modes.difficulty = difficulty;
    }

    /// Run one overworld tick. Walking away ends any conversation, and an
    /// ambush rolled during the tick starts straight away.
    pub fn tick(&mut self, intents: Vec<ActionIntent>) -> GameResult<Snapshot> {
        self.ensure_no_combat()?;
        self.dialogue = None;
        self.world.resource_mut::<ActionQueue>().0 = intents;
        self.schedule.run(&mut self.world);

        let mut encounter = None;
        let pending = self.world.resource_mut::<PendingEncounter>().take();
        if let Some(enemy_id) = pending {
            let state = self.start_encounter(&enemy_id)?;
            encounter = Some(state.enemy.name().to_string());
        }
        let mut snapshot = self.snapshot();
        snapshot.encounter = encounter;
        Ok(snapshot)
    }

    pub fn snapshot(&self) -> Snapshot {
        let character = self.character();
        let stamina = self.world.get::<StaminaPool>(self.player).copied().unwrap_or_default();
        let location = self.world.resource::<CurrentLocation>();
        let mut log = self.world.resource::<ActivityLog>().0.clone();
        if let Some(state) = &self.combat {
            log.extend(state.log.iter().cloned());
        }
        Snapshot {
            time: self.world.resource::<GameTime>().to_string(),
            player_name: character.map(|c| c.name.clone()).unwrap_or_else(|| "Unknown".to_string()),
            level: character.map(|c| c.level).unwrap_or(1),
            grade: character.map(|c| c.grade()).unwrap_or(Grade::Grade4),
            hp: character.map(|c| (c.hp, c.total_max_hp())).unwrap_or((0, 0)),
            energy: character.map(|c| (c.energy, c.max_energy)).unwrap_or((0, 0)),
            stamina: (stamina.current, stamina.max),
            location: location
                .def()
                .map(|def| def.name.to_string())
                .unwrap_or_else(|| location.0.clone()),
            log,
            encounter: None,
        }
    }

    fn ensure_no_combat(&self) -> GameResult<()> {
        if self.combat.is_some() {
            return Err(StoryError::EncounterInProgress.into());
        }
        Ok(())
    }

    // ---- combat ---------------------------------------------------------

    /// Start a fight against a template enemy, scaled for the difficulty and
    /// staged in the current location's environment.
    pub fn start_encounter(&mut self, enemy_id: &str) -> GameResult<&CombatState> {
        self.ensure_no_combat()?;
        let template = enemy_template(enemy_id).ok_or_else(|| StoryError::UnknownEnemy(enemy_id.to_string()))?;
        let multiplier = self.world.resource::<ModeProgress>().difficulty.enemy_multiplier();
        let mut enemy = template.spawn();
        if (multiplier - 1.0).abs() > f32::EPSILON {
            enemy.scale_stats(multiplier, multiplier);
        }
        self.begin_combat(enemy_id, enemy)
    }

    fn begin_combat(&mut self, enemy_id: &str, enemy: Character) -> GameResult<&CombatState> {
        let player = self.character().cloned().ok_or(GameError::MissingPlayer("character"))?;
        let fatigued = self
            .world
            .get::<StaminaPool>(self.player)
            .map(|stamina| stamina.is_fatigued())
            .unwrap_or(false);
        let environment = self
            .world
            .resource::<CurrentLocation>()
            .def()
            .map(|def| def.environment)
            .unwrap_or_default();
        let rules = self.world.resource::<ModeProgress>().rules();

        self.dialogue = None;
        let state = self.combat.insert(start_combat(player, enemy, enemy_id, environment, rules, fatigued));
        Ok(&*state)
    }

    /// Resolve one round. When the fight ends the player's character is
    /// written back and rewards, quests, chapters and challenge runs follow.
    pub fn combat_action(&mut self, action: CombatAction) -> GameResult<CombatTurn> {
        let report = {
            let state = self.combat.as_mut().ok_or(CombatError::NotActive)?;
            let mut inventory = self
                .world
                .get_mut::<Inventory>(self.player)
                .map(|mut inventory| std::mem::take(&mut *inventory))
                .ok_or(GameError::MissingPlayer("inventory"))?;
            let result = {
                let mut rng = self.world.resource_mut::<GameRng>();
                combat_round(state, action, &mut inventory, &mut rng.0)
            };
            if let Some(mut slot) = self.world.get_mut::<Inventory>(self.player) {
                *slot = inventory;
            }
            result?
        };

        let Some(end) = report.ended else {
            return Ok(CombatTurn {
                report,
                aftermath: Vec::new(),
                dialogue: None,
            });
        };
        let state = self.combat.take().ok_or(CombatError::NotActive)?;
        let aftermath = self.resolve_combat(state, end)?;
        let dialogue = self.dialogue_view()?;
        Ok(CombatTurn {
            report,
            aftermath,
            dialogue,
        })
    }

    fn store_character(&mut self, character: Character) -> GameResult<()> {
        let mut slot = self
            .world
            .get_mut::<Character>(self.player)
            .ok_or(GameError::MissingPlayer("character"))?;
        *slot = character;
        Ok(())
    }

    fn resolve_combat(&mut self, state: CombatState, end: CombatEnd) -> GameResult<Vec<String>> {
        let mut lines = Vec::new();
        let story = self.story_encounter.take();
        let enemy_id = state.enemy_id.clone();
        let enemy_level = state.enemy.character.level;
        let defeat_is_fatal = state.rules.defeat_is_fatal;
        let rewards = state.rewards.clone();
        let mut character = state.player.character;
        character.reset_after_combat();

        match end {
            CombatEnd::Victory => {
                if let Some(rewards) = rewards {
                    let gain = award_xp(&mut character, rewards.xp);
                    lines.push(format!("+{} XP", rewards.xp));
                    if gain.levels > 0 {
                        lines.push(format!(
                            "Level up! You are now level {} ({}).",
                            character.level,
                            character.grade().label()
                        ));
                    }
                    for id in gain.learned {
                        lines.push(format!("New technique: {}", id));
                    }
                    if let Some(mut inventory) = self.world.get_mut::<Inventory>(self.player) {
                        for (item, quantity) in &rewards.drops {
                            inventory.add(item, *quantity);
                            lines.push(format!("Found {} x{}", item_name(item), quantity));
                        }
                    }
                }
                self.store_character(character)?;
                {
                    let mut flags = self.world.resource_mut::<StoryFlags>();
                    flags.set(format!("defeated.{}", enemy_id), true);
                    flags.increment("exorcisms", 1);
                }
                lines.extend(self.tick_exorcism_objectives(&enemy_id)?);
                if let Some(story) = story.filter(|story| story.enemy == enemy_id) {
                    self.world
                        .resource_mut::<StoryFlags>()
                        .set(cleared_flag(&story.arc, &story.chapter), true);
                    match self.close_chapter(&story.arc) {
                        Ok((completion, outcomes)) => {
                            lines.push(format!("Chapter complete: {}", completion.chapter_id));
                            lines.extend(outcomes.iter().filter(|o| !o.is_quiet()).map(|o| o.to_string()));
                        }
                        Err(err) => warn!(arc = %story.arc, error = %err, "chapter did not close after its fight"),
                    }
                }
                lines.extend(self.continue_challenge(enemy_level)?);
            }
            CombatEnd::Defeat => {
                if defeat_is_fatal {
                    let hp = ((character.total_max_hp() as f32) * INFIRMARY_RECOVERY).round() as i32;
                    character.hp = hp.max(1);
                    self.store_character(character)?;
                    self.world.resource_mut::<CurrentLocation>().0 = STARTING_LOCATION.to_string();
                    lines.extend(self.end_challenge());
                    lines.push("You wake up in the academy infirmary.".to_string());
                } else {
                    self.store_character(character)?;
                    lines.push("The training ward catches you before the fall.".to_string());
                }
            }
            CombatEnd::Fled => {
                self.store_character(character)?;
                lines.extend(self.end_challenge());
                lines.push("You got away.".to_string());
            }
        }
        Ok(lines)
    }

    fn tick_exorcism_objectives(&mut self, enemy_id: &str) -> GameResult<Vec<String>> {
        let mut lines = Vec::new();
        for (quest, objective) in exorcism_objectives(enemy_id) {
            if !self.world.resource::<Journal>().is_active(quest) {
                continue;
            }
            let outcome = apply_consequence(
                &mut self.world,
                &Consequence::CompleteObjective {
                    quest: quest.to_string(),
                    objective: objective.to_string(),
                },
            )?;
            let ready = matches!(outcome, ConsequenceOutcome::ObjectiveCompleted { quest_ready: true, .. });
            lines.push(outcome.to_string());
            if ready {
                let done = apply_consequence(
                    &mut self.world,
                    &Consequence::CompleteQuest {
                        quest: quest.to_string(),
                    },
                )?;
                lines.push(done.to_string());
            }
        }
        Ok(lines)
    }

    fn continue_challenge(&mut self, enemy_level: u32) -> GameResult<Vec<String>> {
        let modes = self.world.resource::<ModeProgress>().clone();
        let mut lines = Vec::new();
        match modes.mode {
            GameMode::Survival if modes.survival.active => {
                let (wave, score, next) = {
                    let mut progress = self.world.resource_mut::<ModeProgress>();
                    let score = progress.survival.record_clear(enemy_level);
                    let next = progress.survival.next_enemy(modes.difficulty);
                    (progress.survival.wave, score, next)
                };
                lines.push(format!("Wave {} cleared. Score: {}.", wave, score));
                if let Some(mut character) = self.world.get_mut::<Character>(self.player) {
                    partial_heal(&mut character, SURVIVAL_WAVE_HEAL);
                }
                if let Some((id, enemy)) = next {
                    lines.push(format!("Wave {}: {} appears!", wave + 1, enemy.name));
                    self.begin_combat(&id, enemy)?;
                }
            }
            GameMode::BossRush if modes.boss_rush.active => {
                let (cleared, next) = {
                    let mut progress = self.world.resource_mut::<ModeProgress>();
                    let cleared = progress.boss_rush.record_clear();
                    (cleared, progress.boss_rush.next_boss())
                };
                if cleared {
                    self.world.resource_mut::<ModeProgress>().mode = GameMode::Story;
                    lines.push("Every boss has fallen. The boss rush is yours.".to_string());
                } else if let Some(boss) = next {
                    let state = self.start_encounter(boss)?;
                    lines.push(format!("Next challenger: {}!", state.enemy.name()));
                }
            }
            _ => {}
        }
        Ok(lines)
    }

    fn end_challenge(&mut self) -> Vec<String> {
        let mut modes = self.world.resource_mut::<ModeProgress>();
        let mut lines = Vec::new();
        let mode = modes.mode;
        match mode {
            GameMode::Survival if modes.survival.active => {
                lines.push(format!(
                    "Survival over at wave {} with {} points (best wave {}).",
                    modes.survival.wave, modes.survival.score, modes.survival.best_wave
                ));
                modes.survival.end();
                modes.mode = GameMode::Story;
            }
            GameMode::BossRush if modes.boss_rush.active => {
                lines.push(format!("Boss rush over after {} boss(es).", modes.boss_rush.index));
                modes.boss_rush.reset();
                modes.mode = GameMode::Story;
            }
            _ => {}
        }
        lines
    }

    /// Begin a survival run: endless waves, partial heal between them.
    pub fn start_survival(&mut self) -> GameResult<&CombatState> {
        self.ensure_no_combat()?;
        let next = {
            let mut modes = self.world.resource_mut::<ModeProgress>();
            modes.mode = GameMode::Survival;
            modes.survival.end();
            modes.survival.active = true;
            let difficulty = modes.difficulty;
            modes.survival.next_enemy(difficulty)
        };
        let (id, enemy) = next.ok_or_else(|| StoryError::UnknownEnemy("survival wave".to_string()))?;
        info!("survival run started");
        self.begin_combat(&id, enemy)
    }

    /// Begin a boss rush: every boss in order, no healing in between.
    pub fn start_boss_rush(&mut self) -> GameResult<&CombatState> {
        self.ensure_no_combat()?;
        let first = {
            let mut modes = self.world.resource_mut::<ModeProgress>();
            modes.mode = GameMode::BossRush;
            modes.boss_rush.reset();
            modes.boss_rush.active = true;
            modes.boss_rush.next_boss()
        };
        let boss = first.ok_or_else(|| StoryError::UnknownEnemy("boss rush".to_string()))?;
        info!("boss rush started");
        self.start_encounter(boss)
    }

    // ---- dialogue -------------------------------------------------------

    /// Open the dialogue of an NPC standing at the current location.
    pub fn talk(&mut self, npc_id: &str) -> GameResult<DialogueView> {
        self.ensure_no_combat()?;
        let npc = npc(npc_id).ok_or_else(|| DialogueError::NpcNotPresent(npc_id.to_string()))?;
        if self.world.resource::<CurrentLocation>().0 != npc.location {
            return Err(DialogueError::NpcNotPresent(npc.name.to_string()).into());
        }
        let tree = self
            .world
            .resource::<StoryLibrary>()
            .dialogue(npc.dialogue)
            .cloned()
            .ok_or_else(|| DialogueError::UnknownTree(npc.dialogue.to_string()))?;
        {
            let mut book = self.world.resource_mut::<RelationshipBook>();
            if book.meet(npc.id) {
                info!(npc = npc.id, "met npc");
            }
            book.record_conversation(npc.id);
        }
        self.open_dialogue(tree)
    }

    fn open_dialogue(&mut self, tree: DialogueTree) -> GameResult<DialogueView> {
        let session = DialogueSession::new(tree);
        let view = {
            let ctx = requirement_context(&self.world, self.player)?;
            view_of(&session, &ctx)
        };
        let view = view.ok_or(DialogueError::Finished)?;
        self.dialogue = Some(session);
        Ok(view)
    }

    pub fn dialogue_view(&self) -> GameResult<Option<DialogueView>> {
        let Some(session) = &self.dialogue else {
            return Ok(None);
        };
        let ctx = requirement_context(&self.world, self.player)?;
        Ok(view_of(session, &ctx))
    }

    /// Pick the `index`-th choice on offer (0-based) and apply its consequences.
    pub fn choose(&mut self, index: usize) -> GameResult<ChoiceOutcome> {
        let result = {
            let session = self.dialogue.as_mut().ok_or(DialogueError::NoConversation)?;
            let ctx = requirement_context(&self.world, self.player)?;
            session.choose(index, &ctx)?
        };
        let outcomes = apply_consequences(&mut self.world, &result.consequences)?;

        let mut next = None;
        if result.ended {
            self.dialogue = None;
        } else {
            next = self.dialogue_view()?;
        }

        let mut encounter = None;
        let pending = self.world.resource_mut::<PendingEncounter>().take();
        if let Some(enemy_id) = pending {
            let state = self.start_encounter(&enemy_id)?;
            encounter = Some(state.enemy.name().to_string());
            next = None;
        }
        Ok(ChoiceOutcome {
            outcomes,
            next,
            encounter,
        })
    }

    // ---- story ----------------------------------------------------------

    /// Push an arc forward: start the current chapter's fight if it still has
    /// one, otherwise close the chapter and hand out its rewards.
    pub fn advance_story(&mut self, arc_id: &str) -> GameResult<StoryStep> {
        self.ensure_no_combat()?;
        let arc = self
            .world
            .resource::<StoryLibrary>()
            .arc(arc_id)
            .cloned()
            .ok_or_else(|| StoryError::UnknownArc(arc_id.to_string()))?;
        let chapter = {
            let ctx = requirement_context(&self.world, self.player)?;
            next_chapter(&arc, self.world.resource::<ArcProgress>(), &ctx)?.clone()
        };

        if let Some(enemy) = chapter.pending_encounter(&arc.id, self.world.resource::<StoryFlags>()) {
            let enemy = enemy.to_string();
            self.start_encounter(&enemy)?;
            self.story_encounter = Some(StoryEncounter {
                arc: arc.id.clone(),
                chapter: chapter.id.clone(),
                enemy: enemy.clone(),
            });
            return Ok(StoryStep::Encounter {
                chapter: chapter.id,
                title: chapter.title,
                intro: chapter.intro,
                enemy,
            });
        }

        let (completion, outcomes) = self.close_chapter(arc_id)?;
        let dialogue = match &completion.dialogue {
            Some(tree_id) => {
                let tree = self
                    .world
                    .resource::<StoryLibrary>()
                    .dialogue(tree_id)
                    .cloned()
                    .ok_or_else(|| DialogueError::UnknownTree(tree_id.clone()))?;
                Some(self.open_dialogue(tree)?)
            }
            None => None,
        };
        Ok(StoryStep::Completed {
            chapter: chapter.id,
            title: chapter.title,
            intro: chapter.intro,
            outcomes,
            dialogue,
            arc_finished: completion.arc_finished,
        })
    }

    fn close_chapter(&mut self, arc_id: &str) -> GameResult<(ChapterCompletion, Vec<ConsequenceOutcome>)> {
        let arc = self
            .world
            .resource::<StoryLibrary>()
            .arc(arc_id)
            .cloned()
            .ok_or_else(|| StoryError::UnknownArc(arc_id.to_string()))?;
        let completion = self.world.resource_scope(|world, mut progress: Mut<ArcProgress>| {
            complete_chapter(&arc, &mut progress, world.resource::<StoryFlags>())
        })?;
        let outcomes = apply_consequences(&mut self.world, &completion.consequences)?;
        info!(arc = arc_id, chapter = %completion.chapter_id, finished = completion.arc_finished, "chapter complete");
        Ok((completion, outcomes))
    }

    pub fn arcs(&self) -> Vec<ArcSummary> {
        let progress = self.world.resource::<ArcProgress>();
        self.world
            .resource::<StoryLibrary>()
            .arcs
            .iter()
            .map(|arc| {
                let state = progress.state(&arc.id);
                ArcSummary {
                    id: arc.id.clone(),
                    title: arc.title.clone(),
                    current_chapter: arc.chapters.get(state.chapter).map(|c| c.title.clone()),
                    completed: state.completed,
                }
            })
            .collect()
    }

    // ---- cutscenes ------------------------------------------------------

    pub fn pending_cutscenes(&self) -> GameResult<Vec<Cutscene>> {
        let ctx = requirement_context(&self.world, self.player)?;
        Ok(self
            .world
            .resource::<StoryLibrary>()
            .cutscenes
            .iter()
            .filter(|scene| scene.is_pending(&ctx))
            .cloned()
            .collect())
    }

    /// Play a pending cutscene for the first time.
    pub fn watch(&mut self, cutscene_id: &str) -> GameResult<CutsceneViewing> {
        let cutscene = self
            .world
            .resource::<StoryLibrary>()
            .cutscene(cutscene_id)
            .cloned()
            .ok_or_else(|| StoryError::UnknownCutscene(cutscene_id.to_string()))?;
        let pending = {
            let ctx = requirement_context(&self.world, self.player)?;
            cutscene.is_pending(&ctx)
        };
        if !pending {
            return Err(StoryError::CutsceneLocked(cutscene_id.to_string()).into());
        }
        let outcomes = apply_consequences(&mut self.world, &cutscene.first_viewing())?;
        info!(cutscene = cutscene_id, emotional = cutscene.is_emotional_moment(), "cutscene played");
        Ok(CutsceneViewing { cutscene, outcomes })
    }

    /// Replay a cutscene that has already been seen. Nothing is applied again.
    pub fn replay(&self, cutscene_id: &str) -> GameResult<Cutscene> {
        let cutscene = self
            .world
            .resource::<StoryLibrary>()
            .cutscene(cutscene_id)
            .ok_or_else(|| StoryError::UnknownCutscene(cutscene_id.to_string()))?;
        if !cutscene.is_seen(self.world.resource::<StoryFlags>()) {
            return Err(StoryError::CutsceneLocked(cutscene_id.to_string()).into());
        }
        Ok(cutscene.clone())
    }

    // ---- inventory ------------------------------------------------------

    /// Equip an item, returning whatever it replaced.
    pub fn equip(&mut self, item_id: &str) -> GameResult<Option<String>> {
        self.ensure_no_combat()?;
        let mut query = self.world.query_filtered::<(&mut Inventory, &mut Character), With<Player>>();
        let (mut inventory, mut character) = query
            .get_mut(&mut self.world, self.player)
            .map_err(|_| GameError::MissingPlayer("inventory"))?;
        Ok(inventory.equip(&mut character, item_id)?)
    }

    pub fn unequip(&mut self, slot: EquipSlot) -> GameResult<String> {
        self.ensure_no_combat()?;
        let mut query = self.world.query_filtered::<(&mut Inventory, &mut Character), With<Player>>();
        let (mut inventory, mut character) = query
            .get_mut(&mut self.world, self.player)
            .map_err(|_| GameError::MissingPlayer("inventory"))?;
        Ok(inventory.unequip(&mut character, slot)?)
    }

    /// Craft a recipe, returning the name of what was made.
    pub fn craft(&mut self, recipe_id: &str) -> GameResult<String> {
        let recipe = recipe(recipe_id).ok_or_else(|| InventoryError::UnknownRecipe(recipe_id.to_string()))?;
        let mut inventory = self
            .world
            .get_mut::<Inventory>(self.player)
            .ok_or(GameError::MissingPlayer("inventory"))?;
        inventory.craft(recipe)?;
        info!(recipe = recipe_id, "crafted");
        Ok(format!("{} x{}", item_name(recipe.output), recipe.output_quantity))
    }

    /// Use a consumable outside of combat.
    pub fn use_item(&mut self, item_id: &str) -> GameResult<String> {
        self.ensure_no_combat()?;
        let def = item_def(item_id).ok_or_else(|| InventoryError::UnknownItem(item_id.to_string()))?;
        let ItemKind::Consumable(effect) = def.kind else {
            return Err(InventoryError::NotConsumable(def.name.to_string()).into());
        };
        let mut query = self
            .world
            .query_filtered::<(&mut Inventory, &mut Character, &mut StaminaPool), With<Player>>();
        let (mut inventory, mut character, mut stamina) = query
            .get_mut(&mut self.world, self.player)
            .map_err(|_| GameError::MissingPlayer("inventory"))?;
        inventory.remove(item_id, 1)?;
        let detail = match effect {
            ConsumableEffect::Heal(amount) => format!("+{} HP", character.heal(amount)),
            ConsumableEffect::RestoreEnergy(amount) => {
                format!("+{} cursed energy", character.restore_energy(amount))
            }
            ConsumableEffect::RestoreStamina(amount) => format!("+{} stamina", stamina.recover(amount)),
            ConsumableEffect::Cleanse => format!("{} affliction(s) purged", cleanse(&mut character.statuses)),
        };
        Ok(format!("{}: {}", def.name, detail))
    }

    /// Change one appearance field. Returns false for unknown fields.
    pub fn customize(&mut self, field: &str, value: &str) -> bool {
        self.world
            .get_mut::<Appearance>(self.player)
            .map(|mut appearance| appearance.set_field(field, value))
            .unwrap_or(false)
    }

    // ---- persistence ----------------------------------------------------

    pub fn save_state(&self) -> GameResult<SaveState> {
        if self.combat.is_some() {
            return Err(PersistenceError::CombatInProgress.into());
        }
        extract_state_from_world(&self.world, self.player, self.seed)
    }

    /// Replace the running game with a saved one. Any fight or conversation
    /// in progress is dropped.
    pub fn load_state(&mut self, state: SaveState) -> GameResult<()> {
        let seed = state.seed;
        apply_state_to_world(state, &mut self.world, self.player)?;
        self.seed = seed;
        self.combat = None;
        self.dialogue = None;
        self.story_encounter = None;
        self.world.resource_mut::<PendingEncounter>().0 = None;
        self.world.resource_mut::<ActivityLog>().0.clear();
        Ok(())
    }

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> GameResult<()> {
        let state = self.save_state()?;
        save_state_to_path(&state, path)?;
        Ok(())
    }

    pub fn load_from_path(&mut self, path: impl AsRef<Path>) -> GameResult<()> {
        let state = load_state_from_path(path)?;
        self.load_state(state)
    }

    pub fn save_slot(&self, repo: &mut impl SaveRepository, slot: &str) -> GameResult<()> {
        let state = self.save_state()?;
        repo.save_slot(slot, &state)?;
        Ok(())
    }

    pub fn load_slot(&mut self, repo: &impl SaveRepository, slot: &str) -> GameResult<()> {
        let state = repo.load_slot(slot)?;
        self.load_state(state)
    }

    pub fn list_slots(&self, repo: &impl SaveRepository) -> GameResult<Vec<SlotSummary>> {
        Ok(repo.list_slots()?)
    }

    // ---- accessors ------------------------------------------------------

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn player(&self) -> Entity {
        self.player
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Direct world access for tooling and tests.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn character(&self) -> Option<&Character> {
        self.world.get::<Character>(self.player)
    }

    pub fn inventory(&self) -> Option<&Inventory> {
        self.world.get::<Inventory>(self.player)
    }

    pub fn stamina(&self) -> Option<&StaminaPool> {
        self.world.get::<StaminaPool>(self.player)
    }

    pub fn appearance(&self) -> Option<&Appearance> {
        self.world.get::<Appearance>(self.player)
    }

    pub fn journal(&self) -> &Journal {
        self.world.resource::<Journal>()
    }

    pub fn flags(&self) -> &StoryFlags {
        self.world.resource::<StoryFlags>()
    }

    pub fn relationships(&self) -> &RelationshipBook {
        self.world.resource::<RelationshipBook>()
    }

    pub fn time(&self) -> &GameTime {
        self.world.resource::<GameTime>()
    }

    pub fn location(&self) -> &CurrentLocation {
        self.world.resource::<CurrentLocation>()
    }

    pub fn modes(&self) -> &ModeProgress {
        self.world.resource::<ModeProgress>()
    }

    pub fn combat(&self) -> Option<&CombatState> {
        self.combat.as_ref()
    }

    pub fn in_dialogue(&self) -> bool {
        self.dialogue.is_some()
    }

    /// Add dialogue trees loaded from disk.
    pub fn load_dialogues(&mut self, trees: Vec<DialogueTree>) {
        self.world.resource_mut::<StoryLibrary>().extend_dialogues(trees);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::origin::Background;

    fn game() -> Game {
        Game::new(42, &CharacterBlueprint::new("Yuji", Background::Vessel)).expect("new game")
    }

    fn make_unbeatable(game: &mut Game) {
        let player = game.player();
        if let Some(mut character) = game.world_mut().get_mut::<Character>(player) {
            character.attack = 900;
            character.max_hp = 5000;
            character.hp = 5000;
        }
    }

    fn fight_to_the_end(game: &mut Game) -> CombatTurn {
        for _ in 0..60 {
            let turn = game.combat_action(CombatAction::Attack).expect("round");
            if turn.report.ended.is_some() {
                return turn;
            }
        }
        panic!("fight never ended");
    }

    #[test]
    fn new_game_starts_at_the_academy_with_supplies() {
        let game = game();
        assert_eq!(game.location().0, STARTING_LOCATION);
        assert_eq!(game.inventory().map(|inv| inv.count("healing_talisman")), Some(2));
        assert!(Game::new(1, &CharacterBlueprint::new("  ", Background::Vessel)).is_err());
    }

    #[test]
    fn talking_requires_the_npc_to_be_present() {
        let mut game = game();
        assert!(matches!(
            game.talk("shrine_keeper"),
            Err(GameError::Dialogue(DialogueError::NpcNotPresent(_)))
        ));
        let view = game.talk("mentor").expect("mentor is at the academy");
        assert_eq!(view.tree, "mentor_intro");
        assert!(game.relationships().get("mentor").met);
    }

    #[test]
    fn mentor_hands_out_the_first_quest() {
        let mut game = game();
        game.talk("mentor").expect("talk");
        let first = game.choose(0).expect("mission");
        assert!(first.next.is_some());
        let second = game.choose(0).expect("understood");
        assert!(second.next.is_none());
        assert!(game.journal().is_active("first_exorcism"));
        assert!(!game.in_dialogue());
        assert_eq!(game.inventory().map(|inv| inv.count("healing_talisman")), Some(4));
    }

    #[test]
    fn leaving_mid_briefing_keeps_the_mission_on_offer() {
        let mut game = game();
        game.talk("mentor").expect("talk");
        game.choose(0).expect("mission");
        game.tick(vec![ActionIntent::Wait { hours: 1 }]).expect("walk away");
        assert!(!game.in_dialogue());

        let view = game.talk("mentor").expect("talk again");
        assert!(view.choices.iter().any(|c| c == "I'm ready for a real mission."));
        game.choose(0).expect("mission");
        game.choose(0).expect("understood");
        assert!(game.journal().is_active("first_exorcism"));
        assert!(matches!(game.advance_story("prologue"), Ok(StoryStep::Completed { .. })));
        assert!(matches!(game.advance_story("prologue"), Ok(StoryStep::Encounter { .. })));
    }

    #[test]
    fn the_briefing_is_not_offered_twice() {
        let mut game = game();
        game.talk("mentor").expect("talk");
        game.choose(0).expect("mission");
        game.choose(0).expect("understood");
        let view = game.talk("mentor").expect("talk again");
        assert!(!view.choices.iter().any(|c| c == "I'm ready for a real mission."));
    }

    #[test]
    fn story_fight_clears_quest_and_chapter() {
        let mut game = game();
        game.talk("mentor").expect("talk");
        game.choose(0).expect("mission");
        game.choose(0).expect("understood");

        assert!(matches!(game.advance_story("prologue"), Ok(StoryStep::Completed { .. })));
        let step = game.advance_story("prologue").expect("first blood");
        assert!(matches!(step, StoryStep::Encounter { ref enemy, .. } if enemy == "roadside_curse"));
        assert!(game.save_state().is_err());

        make_unbeatable(&mut game);
        let turn = fight_to_the_end(&mut game);
        assert_eq!(turn.report.ended, Some(CombatEnd::Victory));
        assert!(game.combat().is_none());
        assert!(game.journal().is_completed("first_exorcism"));
        assert!(game.flags().is_set("prologue.first_blood"));
        assert_eq!(game.flags().int("exorcisms"), 1);

        let debrief = game.advance_story("prologue").expect("debrief");
        assert!(matches!(debrief, StoryStep::Completed { arc_finished: true, .. }));
    }

    #[test]
    fn ticks_are_refused_mid_fight() {
        let mut game = game();
        game.start_encounter("training_dummy").expect("fight");
        assert!(matches!(
            game.tick(vec![ActionIntent::Rest]),
            Err(GameError::Story(StoryError::EncounterInProgress))
        ));
        assert!(matches!(
            game.start_encounter("fly_head"),
            Err(GameError::Story(StoryError::EncounterInProgress))
        ));
    }

    #[test]
    fn cutscenes_play_once_and_replay_after() {
        let mut game = game();
        assert!(game.replay("awakening").is_err());
        let pending = game.pending_cutscenes().expect("pending");
        assert!(pending.iter().any(|scene| scene.id == "awakening"));
        game.watch("awakening").expect("watch");
        assert!(game.watch("awakening").is_err());
        assert!(game.replay("awakening").is_ok());
    }

    #[test]
    fn survival_waves_keep_coming() {
        let mut game = game();
        make_unbeatable(&mut game);
        game.start_survival().expect("survival");
        let turn = fight_to_the_end(&mut game);
        assert_eq!(turn.report.ended, Some(CombatEnd::Victory));
        assert_eq!(game.modes().survival.wave, 1);
        assert!(game.combat().is_some(), "second wave should start");
    }

    #[test]
    fn out_of_combat_items_and_gear() {
        let mut game = game();
        let used = game.use_item("healing_talisman").expect("use");
        assert!(used.starts_with("Healing"));
        assert_eq!(game.inventory().map(|inv| inv.count("healing_talisman")), Some(1));
        assert!(game.use_item("academy_badge").is_err());

        let player = game.player();
        if let Some(mut inventory) = game.world_mut().get_mut::<Inventory>(player) {
            inventory.add("iron_staff", 1);
        }
        let attack = game.character().map(|c| c.effective_attack()).unwrap_or_default();
        assert_eq!(game.equip("iron_staff").expect("equip"), None);
        assert!(game.character().map(|c| c.effective_attack()).unwrap_or_default() > attack);
        assert!(game.customize("hair", "white"));
        assert!(!game.customize("tail", "long"));
    }
}

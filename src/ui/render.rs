use crate::components::character::Character;
use crate::components::identity::Appearance;
use crate::components::inventory::Inventory;
use crate::components::stamina::StaminaPool;
use crate::core::world::{DialogueView, Snapshot};
use crate::data::items::{item_def, item_name, ItemKind};
use crate::data::locations::location_def;
use crate::data::npcs::npcs_at;
use crate::narrative::cutscene::Cutscene;
use crate::rules::traits::TraitKind;
use crate::simulation::combat::{CombatState, Combatant, RoundReport, Stance};
use crate::simulation::journal::Journal;
use crate::simulation::relationships::RelationshipBook;
use crate::ui::effects::render_event;

const BAR_WIDTH: usize = 20;

/// Fixed-width meter, e.g. `[██████░░░░]`.
pub fn hp_bar(current: i32, max: i32, width: usize) -> String {
    let ratio = if max > 0 {
        (current.max(0) as f64 / max as f64).min(1.0)
    } else {
        0.0
    };
    let filled = (ratio * width as f64).round() as usize;
    let empty = width - filled;
    format!("[{}{}]", "\u{2588}".repeat(filled), "\u{2591}".repeat(empty))
}

pub fn render_status(snapshot: &Snapshot) -> String {
    let mut output = String::new();
    output.push_str(&format!("=== {} ===\n", snapshot.time));
    output.push_str(&format!(
        "{} (Lv {}, {})  at {}\n",
        snapshot.player_name,
        snapshot.level,
        snapshot.grade.label(),
        snapshot.location
    ));
    output.push_str(&format!(
        "  HP      {} {}/{}\n",
        hp_bar(snapshot.hp.0, snapshot.hp.1, BAR_WIDTH),
        snapshot.hp.0,
        snapshot.hp.1
    ));
    output.push_str(&format!(
        "  Energy  {} {}/{}\n",
        hp_bar(snapshot.energy.0, snapshot.energy.1, BAR_WIDTH),
        snapshot.energy.0,
        snapshot.energy.1
    ));
    output.push_str(&format!(
        "  Stamina {} {}/{}\n",
        hp_bar(snapshot.stamina.0, snapshot.stamina.1, BAR_WIDTH),
        snapshot.stamina.0,
        snapshot.stamina.1
    ));
    for line in &snapshot.log {
        output.push_str(&format!("  - {}\n", line));
    }
    if let Some(enemy) = &snapshot.encounter {
        output.push_str(&format!("!! {} blocks your path !!\n", enemy));
    }
    output
}

pub fn render_character(character: &Character, appearance: &Appearance, stamina: &StaminaPool) -> String {
    let mut output = String::new();
    output.push_str(&format!("=== {} ===\n", character.name));
    output.push_str(&format!(
        "Level {} {} ({} / {} xp)\n",
        character.level,
        character.grade().label(),
        character.xp,
        character.xp_to_next_level()
    ));
    output.push_str(&format!("{}\n", appearance.describe()));
    output.push_str(&format!(
        "HP {}/{}  Energy {}/{}  Stamina {}/{}\n",
        character.hp,
        character.total_max_hp(),
        character.energy,
        character.max_energy,
        stamina.current,
        stamina.max
    ));
    output.push_str(&format!(
        "ATK {}  DEF {}  SPD {}\n",
        character.effective_attack(),
        character.effective_defense(),
        character.effective_speed()
    ));

    output.push_str("Traits\n");
    for kind in TraitKind::ALL {
        output.push_str(&format!("  {:<13}{:>3}\n", kind.label(), character.traits.get(kind)));
    }

    output.push_str("Techniques\n");
    if character.techniques.is_empty() {
        output.push_str("  (none)\n");
    }
    for technique in &character.techniques {
        let cooldown = if technique.current_cooldown > 0 {
            format!(" [cooldown {}]", technique.current_cooldown)
        } else {
            String::new()
        };
        output.push_str(&format!(
            "  {} ({}): {} power, {} energy{}\n",
            technique.name, technique.id, technique.power, technique.energy_cost, cooldown
        ));
    }
    output
}

fn combatant_line(combatant: &Combatant) -> String {
    let character = &combatant.character;
    let mut line = format!(
        "{:<18} HP {} {}/{}  CE {}/{}",
        character.name,
        hp_bar(character.hp, character.total_max_hp(), BAR_WIDTH),
        character.hp,
        character.total_max_hp(),
        character.energy,
        character.max_energy
    );
    match combatant.stance {
        Stance::Guarding => line.push_str("  [guarding]"),
        Stance::Dodging => line.push_str("  [dodging]"),
        Stance::Neutral => {}
    }
    if let Some(active) = &character.transformation {
        line.push_str(&format!("  <{} {}>", active.kind.label(), active.remaining_turns));
    }
    for status in &character.statuses {
        line.push_str(&format!("  {}({})", status.kind.label(), status.remaining_turns));
    }
    line.push('\n');
    line
}

pub fn render_combat(state: &CombatState) -> String {
    let mut output = String::new();
    output.push_str(&format!("=== Round {} ===\n", state.round));
    output.push_str(&combatant_line(&state.enemy));
    output.push_str(&combatant_line(&state.player));
    let ready: Vec<_> = state
        .player
        .character
        .available_techniques()
        .map(|t| format!("{} ({} CE)", t.id, t.energy_cost))
        .collect();
    if !ready.is_empty() {
        output.push_str(&format!("Techniques: {}\n", ready.join(", ")));
    }
    output
}

/// Round events with their banners and sound cues.
pub fn render_round(report: &RoundReport) -> String {
    let mut output = String::new();
    for event in &report.events {
        for line in render_event(event) {
            output.push_str(&line);
            output.push('\n');
        }
    }
    if let Some(end) = report.ended {
        output.push_str(&format!("=== {} ===\n", end));
    }
    if let Some(rewards) = &report.rewards {
        output.push_str(&format!("+{} xp\n", rewards.xp));
        for (item, qty) in &rewards.drops {
            output.push_str(&format!("  found {} x{}\n", item_name(item), qty));
        }
    }
    output
}

pub fn render_inventory(inventory: &Inventory) -> String {
    let mut output = String::new();
    output.push_str("=== Inventory ===\n");
    output.push_str(&format!(
        "Weapon: {}\n",
        inventory.weapon.as_deref().map(item_name).unwrap_or("-")
    ));
    output.push_str(&format!(
        "Charm:  {}\n",
        inventory.charm.as_deref().map(item_name).unwrap_or("-")
    ));
    if inventory.items.is_empty() {
        output.push_str("  (empty)\n");
    }
    for (id, qty) in &inventory.items {
        let tag = match item_def(id).map(|def| def.kind) {
            Some(ItemKind::Consumable(_)) => "use",
            Some(ItemKind::Equipment { .. }) => "gear",
            Some(ItemKind::Material) => "material",
            Some(ItemKind::KeyItem) => "key",
            None => "?",
        };
        output.push_str(&format!("  {:<22} x{:<3} [{}] {}\n", item_name(id), qty, tag, id));
    }
    output
}

pub fn render_journal(journal: &Journal) -> String {
    let mut output = String::new();
    output.push_str("=== Journal ===\n");
    output.push_str("Active\n");
    let mut any = false;
    for quest in journal.active_quests() {
        any = true;
        let (done, total) = quest.progress();
        output.push_str(&format!("  {} ({}/{})\n", quest.title, done, total));
        for objective in &quest.objectives {
            let mark = if objective.done { "x" } else { " " };
            output.push_str(&format!("    [{}] {}\n", mark, objective.text));
        }
    }
    if !any {
        output.push_str("  (none)\n");
    }
    let completed: Vec<_> = journal.completed_quests().map(|q| q.title.as_str()).collect();
    if !completed.is_empty() {
        output.push_str(&format!("Completed: {}\n", completed.join(", ")));
    }
    let failed: Vec<_> = journal.failed_quests().map(|q| q.title.as_str()).collect();
    if !failed.is_empty() {
        output.push_str(&format!("Failed: {}\n", failed.join(", ")));
    }
    if !journal.entries.is_empty() {
        output.push_str("Notes\n");
        for entry in journal.entries.iter().rev().take(5) {
            output.push_str(&format!("  {}  {}\n", entry.stamp, entry.text));
        }
    }
    output
}

pub fn render_relationships(book: &RelationshipBook) -> String {
    let mut output = String::new();
    output.push_str("=== Bonds ===\n");
    let mut any = false;
    for (npc, rel) in book.entries.iter().filter(|(_, rel)| rel.met) {
        any = true;
        let name = crate::data::npcs::npc(npc).map(|n| n.name).unwrap_or(npc.as_str());
        output.push_str(&format!("  {:<18} {:>4}  {}\n", name, rel.affinity, rel.tier()));
    }
    if !any {
        output.push_str("  (nobody yet)\n");
    }
    output
}

pub fn render_location(location_id: &str) -> String {
    let Some(def) = location_def(location_id) else {
        return format!("=== {} ===\n", location_id);
    };
    let mut output = String::new();
    output.push_str(&format!("=== {} ===\n", def.name));
    output.push_str(&format!("{}\n", def.description));
    let people: Vec<_> = npcs_at(def.id).map(|n| format!("{} ({})", n.name, n.id)).collect();
    if !people.is_empty() {
        output.push_str(&format!("Here: {}\n", people.join(", ")));
    }
    let exits: Vec<_> = def
        .neighbors
        .iter()
        .map(|id| location_def(id).map(|l| format!("{} ({})", l.name, id)).unwrap_or_else(|| id.to_string()))
        .collect();
    output.push_str(&format!("Exits: {}\n", exits.join(", ")));
    if def.danger > 0 {
        output.push_str(&format!("Danger: {}\n", "!".repeat(def.danger as usize)));
    }
    output
}

/// Choices are numbered from 1 for the prompt.
pub fn render_dialogue(view: &DialogueView) -> String {
    let mut output = String::new();
    output.push_str(&format!("{}: \"{}\"\n", view.speaker, view.text));
    if view.choices.is_empty() {
        output.push_str("  (leave)\n");
    }
    for (i, choice) in view.choices.iter().enumerate() {
        output.push_str(&format!("  {}. {}\n", i + 1, choice));
    }
    output
}

pub fn render_cutscene(cutscene: &Cutscene) -> String {
    let mut output = String::new();
    output.push_str(&format!("=== {} ===\n", cutscene.title));
    output.push_str(&format!("({})\n", cutscene.mood.label()));
    for frame in &cutscene.frames {
        match &frame.speaker {
            Some(speaker) => output.push_str(&format!("{}: \"{}\"\n", speaker, frame.text)),
            None => output.push_str(&format!("{}\n", frame.text)),
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::cutscenes::builtin_cutscenes;

    #[test]
    fn bars_clamp_to_their_width() {
        assert_eq!(hp_bar(5, 10, 4), "[\u{2588}\u{2588}\u{2591}\u{2591}]");
        assert_eq!(hp_bar(-3, 10, 3), "[\u{2591}\u{2591}\u{2591}]");
        assert_eq!(hp_bar(50, 10, 2), "[\u{2588}\u{2588}]");
        assert_eq!(hp_bar(1, 0, 2), "[\u{2591}\u{2591}]");
    }

    #[test]
    fn dialogue_choices_are_numbered_from_one() {
        let view = DialogueView {
            tree: "t".into(),
            speaker: "Kaito".into(),
            text: "Ready?".into(),
            choices: vec!["Yes".into(), "No".into()],
        };
        let text = render_dialogue(&view);
        assert!(text.contains("  1. Yes\n"));
        assert!(text.contains("  2. No\n"));

        let end = DialogueView { choices: Vec::new(), ..view };
        assert!(render_dialogue(&end).contains("(leave)"));
    }

    #[test]
    fn inventory_lists_equipment_and_items() {
        let mut inventory = Inventory::default();
        inventory.add("healing_talisman", 2);
        let text = render_inventory(&inventory);
        assert!(text.starts_with("=== Inventory ===\n"));
        assert!(text.contains("Healing Talisman"));
        assert!(text.contains("Weapon: -"));
    }

    #[test]
    fn cutscenes_render_every_frame() {
        let scenes = builtin_cutscenes();
        let scene = scenes.iter().find(|c| c.id == "awakening").expect("awakening");
        let text = render_cutscene(scene);
        assert!(text.starts_with(&format!("=== {} ===", scene.title)));
        assert_eq!(text.lines().count(), scene.frames.len() + 2);
    }

    #[test]
    fn character_sheet_lists_traits() {
        let character = Character::new("Rin", 100, 50, 10, 10, 10);
        let text = render_character(&character, &Appearance::default(), &StaminaPool::default());
        assert!(text.contains("=== Rin ==="));
        assert!(text.contains(TraitKind::Courage.label()));
    }
}

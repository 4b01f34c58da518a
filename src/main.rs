use std::io::{self, Write};

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cursed_chronicles::components::inventory::EquipSlot;
use cursed_chronicles::config::{Cli, GameConfig};
use cursed_chronicles::data::catalog::load_content_dir;
use cursed_chronicles::simulation::modes::GameMode;
use cursed_chronicles::ui::render::{
    render_character, render_combat, render_cutscene, render_dialogue, render_inventory, render_journal,
    render_location, render_relationships, render_round, render_status,
};
use cursed_chronicles::world::SaveDb;
use cursed_chronicles::{
    ActionIntent, Background, CharacterBlueprint, CombatAction, CombatTurn, Game, GameResult, StoryStep,
};

const HELP: &str = "Commands:
  status | look | bonds | travel <loc> | explore | train | rest | wait [hours]
  talk <npc> | choose <n> | story [arc] | cutscenes | watch <id> | replay <id>
  fight <enemy> | attack | tech <id> | dodge | guard | transform <kind> | item <id> | flee
  inv | equip <id> | unequip <weapon|charm> | craft <recipe> | use <id> | journal
  save [slot] | load [slot] | slots | help | quit";

fn main() {
    let cli = Cli::parse();
    let config = match GameConfig::resolve(&cli, |key| std::env::var(key).ok()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Config error: {}", err);
            std::process::exit(1);
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let mut game = match start_game(&cli, &config) {
        Ok(game) => game,
        Err(err) => {
            eprintln!("Failed to start: {}", err);
            std::process::exit(1);
        }
    };

    println!("=== Cursed Chronicles ===");
    print!("{}", render_location(&game.location().0));
    if let Ok(scenes) = game.pending_cutscenes() {
        for scene in scenes {
            println!("(new scene available: watch {})", scene.id);
        }
    }
    if let Some(state) = game.combat() {
        print!("{}", render_combat(state));
    }
    println!("{}", HELP);

    loop {
        print!("> ");
        if io::stdout().flush().is_err() {
            break;
        }

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let trimmed = input.trim();
        if trimmed.is_empty() {
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        let cmd = parts.next().unwrap_or("").to_lowercase();
        let arg = parts.next();

        if cmd == "quit" || cmd == "exit" {
            break;
        }
        if let Err(err) = run_command(&mut game, &config, &cmd, arg) {
            eprintln!("{}", err);
        }
    }
    info!("session ended");
}

fn start_game(cli: &Cli, config: &GameConfig) -> GameResult<Game> {
    let background = match cli.background.as_deref() {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(background = raw, "unknown background, using prodigy");
            Background::Prodigy
        }),
        None => Background::Prodigy,
    };
    let name = cli.name.clone().unwrap_or_else(|| "Itadori".to_string());
    let seed = config.seed.unwrap_or_else(rand::random);

    let mut game = Game::new(seed, &CharacterBlueprint::new(name, background))?;
    game.set_rules(config.mode, config.difficulty);
    if let Some(dir) = &config.content_dir {
        game.load_dialogues(load_content_dir(dir)?);
    }
    match config.mode {
        GameMode::Survival => {
            game.start_survival()?;
        }
        GameMode::BossRush => {
            game.start_boss_rush()?;
        }
        GameMode::Story | GameMode::Training => {}
    }
    Ok(game)
}

fn run_command(game: &mut Game, config: &GameConfig, cmd: &str, arg: Option<&str>) -> GameResult<()> {
    match cmd {
        "help" => println!("{}", HELP),
        "status" => {
            print!("{}", render_status(&game.snapshot()));
            if let (Some(character), Some(appearance), Some(stamina)) =
                (game.character(), game.appearance(), game.stamina())
            {
                print!("{}", render_character(character, appearance, stamina));
            }
        }
        "look" => print!("{}", render_location(&game.location().0)),
        "bonds" => print!("{}", render_relationships(game.relationships())),
        "travel" => match arg {
            Some(to) => overworld(game, ActionIntent::Travel { to: to.to_string() })?,
            None => println!("Usage: travel <location_id>"),
        },
        "explore" => overworld(game, ActionIntent::Explore)?,
        "train" => overworld(game, ActionIntent::Train)?,
        "rest" => overworld(game, ActionIntent::Rest)?,
        "wait" => {
            let hours = arg.and_then(|raw| raw.parse().ok()).unwrap_or(1);
            overworld(game, ActionIntent::Wait { hours })?;
        }
        "talk" => match arg {
            Some(npc) => print!("{}", render_dialogue(&game.talk(npc)?)),
            None => println!("Usage: talk <npc_id>"),
        },
        "choose" => match arg.and_then(|raw| raw.parse::<usize>().ok()) {
            Some(n) if n >= 1 => {
                let outcome = game.choose(n - 1)?;
                for line in &outcome.outcomes {
                    println!("  * {}", line);
                }
                if let Some(view) = &outcome.next {
                    print!("{}", render_dialogue(view));
                }
                if let Some(enemy) = &outcome.encounter {
                    println!("!! {} attacks !!", enemy);
                    show_combat(game);
                }
            }
            _ => println!("Usage: choose <n>"),
        },
        "story" => match arg {
            Some(arc) => story(game, arc)?,
            None => {
                println!("=== Story ===");
                for arc in game.arcs() {
                    let status = if arc.completed {
                        "complete".to_string()
                    } else {
                        arc.current_chapter.unwrap_or_else(|| "-".to_string())
                    };
                    println!("  {} ({}): {}", arc.title, arc.id, status);
                }
            }
        },
        "cutscenes" => {
            let scenes = game.pending_cutscenes()?;
            if scenes.is_empty() {
                println!("Nothing new to watch.");
            }
            for scene in scenes {
                println!("  {} ({})", scene.title, scene.id);
            }
        }
        "watch" => match arg {
            Some(id) => {
                let viewing = game.watch(id)?;
                print!("{}", render_cutscene(&viewing.cutscene));
                for line in &viewing.outcomes {
                    println!("  * {}", line);
                }
            }
            None => println!("Usage: watch <cutscene_id>"),
        },
        "replay" => match arg {
            Some(id) => print!("{}", render_cutscene(&game.replay(id)?)),
            None => println!("Usage: replay <cutscene_id>"),
        },
        "fight" => match arg {
            Some(enemy) => {
                game.start_encounter(enemy)?;
                show_combat(game);
            }
            None => println!("Usage: fight <enemy_id>"),
        },
        "attack" => fight(game, CombatAction::Attack)?,
        "dodge" => fight(game, CombatAction::Dodge)?,
        "guard" => fight(game, CombatAction::Guard)?,
        "flee" => fight(game, CombatAction::Flee)?,
        "tech" => match arg {
            Some(id) => fight(game, CombatAction::Technique(id.to_string()))?,
            None => println!("Usage: tech <technique_id>"),
        },
        "transform" => match arg.map(str::parse) {
            Some(Ok(kind)) => fight(game, CombatAction::Transform(kind))?,
            _ => println!("Usage: transform <surge|reverse|domain>"),
        },
        "item" | "use" => match arg {
            Some(id) if game.combat().is_some() => fight(game, CombatAction::UseItem(id.to_string()))?,
            Some(id) => println!("{}", game.use_item(id)?),
            None => println!("Usage: item <item_id>"),
        },
        "inv" | "inventory" => {
            if let Some(inventory) = game.inventory() {
                print!("{}", render_inventory(inventory));
            }
        }
        "equip" => match arg {
            Some(id) => match game.equip(id)? {
                Some(previous) => println!("Equipped {} (put away {}).", id, previous),
                None => println!("Equipped {}.", id),
            },
            None => println!("Usage: equip <item_id>"),
        },
        "unequip" => {
            let slot = match arg {
                Some("weapon") => Some(EquipSlot::Weapon),
                Some("charm") => Some(EquipSlot::Charm),
                _ => None,
            };
            match slot {
                Some(slot) => println!("Put away {}.", game.unequip(slot)?),
                None => println!("Usage: unequip <weapon|charm>"),
            }
        }
        "craft" => match arg {
            Some(recipe) => println!("Crafted {}.", game.craft(recipe)?),
            None => println!("Usage: craft <recipe_id>"),
        },
        "journal" => print!("{}", render_journal(game.journal())),
        "save" => match arg {
            Some(slot) => {
                let mut db = SaveDb::open(&config.save_db_path)?;
                game.save_slot(&mut db, slot)?;
                println!("Saved to slot {}.", slot);
            }
            None => {
                game.save_to_path(&config.save_path)?;
                println!("Saved to {}.", config.save_path.display());
            }
        },
        "load" => {
            match arg {
                Some(slot) => {
                    let db = SaveDb::open(&config.save_db_path)?;
                    game.load_slot(&db, slot)?;
                }
                None => game.load_from_path(&config.save_path)?,
            }
            println!("Loaded.");
            print!("{}", render_status(&game.snapshot()));
        }
        "slots" => {
            let db = SaveDb::open(&config.save_db_path)?;
            let slots = game.list_slots(&db)?;
            if slots.is_empty() {
                println!("No saved slots in {}.", config.save_db_path.display());
            }
            for slot in slots {
                println!(
                    "  {:<12} {} Lv {} at {} (day {})",
                    slot.slot, slot.player_name, slot.level, slot.location, slot.day
                );
            }
        }
        "name" | "hair" | "eyes" | "outfit" | "title" => match arg {
            Some(value) if game.customize(cmd, value) => println!("Updated {}.", cmd),
            _ => println!("Usage: {} <value>", cmd),
        },
        _ => println!("Unknown command '{}'. Type help.", cmd),
    }
    Ok(())
}

fn overworld(game: &mut Game, intent: ActionIntent) -> GameResult<()> {
    let snapshot = game.tick(vec![intent])?;
    print!("{}", render_status(&snapshot));
    if snapshot.encounter.is_some() {
        show_combat(game);
    }
    Ok(())
}

fn story(game: &mut Game, arc: &str) -> GameResult<()> {
    match game.advance_story(arc)? {
        StoryStep::Encounter {
            title, intro, enemy, ..
        } => {
            println!("=== {} ===", title);
            println!("{}", intro);
            println!("!! {} stands in your way !!", enemy);
            show_combat(game);
        }
        StoryStep::Completed {
            title,
            intro,
            outcomes,
            dialogue,
            arc_finished,
            ..
        } => {
            println!("=== {} ===", title);
            println!("{}", intro);
            for line in &outcomes {
                println!("  * {}", line);
            }
            if let Some(view) = &dialogue {
                print!("{}", render_dialogue(view));
            }
            if arc_finished {
                println!("(arc complete)");
            }
        }
    }
    Ok(())
}

fn fight(game: &mut Game, action: CombatAction) -> GameResult<()> {
    let CombatTurn {
        report,
        aftermath,
        dialogue,
    } = game.combat_action(action)?;
    print!("{}", render_round(&report));
    for line in &aftermath {
        println!("  * {}", line);
    }
    if let Some(view) = &dialogue {
        print!("{}", render_dialogue(view));
    }
    show_combat(game);
    Ok(())
}

fn show_combat(game: &Game) {
    if let Some(state) = game.combat() {
        print!("{}", render_combat(state));
    }
}

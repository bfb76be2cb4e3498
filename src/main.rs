//! Demo driver: loads a level, walks the player along a path and follows
//! every level change the zones request.
//!
//! Usage: `game_world <effects.toml> <level.json> [<level.json> ...]`

use game_world::prelude::*;
use glam::Vec3;
use std::collections::HashMap;

struct Player {
    position: Vec3,
}

impl Intersector for Player {
    fn is_player(&self) -> bool {
        true
    }

    fn position(&self) -> Vec3 {
        self.position
    }
}

fn run() -> WorldResult<()> {
    let mut config = WorldConfig::load_or_default();
    config.apply_env_overrides();
    config.validate()?;
    init_logging(&config.logging);

    let mut args = std::env::args().skip(1);
    let Some(effects_path) = args.next() else {
        eprintln!("usage: game_world <effects.toml> <level.json> [<level.json> ...]");
        std::process::exit(2);
    };
    let registry = ParticleDeclRegistry::from_file(&effects_path)?;

    let mut levels = HashMap::new();
    let mut first = None;
    for path in args {
        let level = LevelData::from_file(&path)?;
        first.get_or_insert_with(|| level.name.clone());
        levels.insert(level.name.to_ascii_uppercase(), level);
    }
    let Some(first) = first else {
        eprintln!("no level given");
        std::process::exit(2);
    };

    let mut world = GameWorld::new(config, registry);
    let mut current = first;
    let mut visited = 0;
    while let Some(level) = levels.get(&current.to_ascii_uppercase()) {
        world.load_level(level)?;
        visited += 1;
        if visited > levels.len() {
            tracing::warn!(target: "world", "Level loop detected, stopping");
            break;
        }

        // 玩家沿每个触发区中心走一遍
        let mut change = None;
        for vob in &level.vobs {
            let Some(bbox) = vob.bbox else { continue };
            let center = (Vec3::from_array(bbox.min) + Vec3::from_array(bbox.max)) * 0.5;
            world.check_zones(&Player { position: center });
            world.tick(16);
            if let Some(request) = world.take_change_request() {
                change = Some(request);
                break;
            }
        }

        match change {
            Some(request) => {
                println!(
                    "{} -> {} (start {})",
                    level.name, request.level_name, request.start_vob_name
                );
                current = request.level_name;
            }
            None => break,
        }
    }
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("World failed: {}", e);
        std::process::exit(1);
    }
}

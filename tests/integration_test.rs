use game_world::prelude::*;
use game_world::render::particles::lock_bucket;
use game_world::world::BoundingBox;
use bevy_ecs::prelude::World;
use glam::Vec3;

const EFFECTS: &str = r#"
[[effect]]
name = "FIRE"
looped = true
lifetime_ms = 1200

[[effect]]
name = "MAGICBURST"
preffered_time_ms = 800
"#;

const OLDWORLD: &str = r#"{
    "name": "OLDWORLD.ZEN",
    "vobs": [
        {
            "name": "ZONE_NEWWORLD",
            "bbox": {"min": [100.0, 0.0, 100.0], "max": [110.0, 10.0, 110.0]},
            "kind": {"type": "ChangeLevel", "level_name": "NEWWORLD.ZEN", "start_vob_name": "START"}
        },
        {
            "name": "CAMPFIRE",
            "position": [5.0, 0.0, 5.0],
            "kind": {"type": "Pfx", "visual": "FIRE.PFX"}
        }
    ]
}"#;

struct Entity {
    player: bool,
    position: Vec3,
}

impl Intersector for Entity {
    fn is_player(&self) -> bool {
        self.player
    }

    fn position(&self) -> Vec3 {
        self.position
    }
}

fn world() -> GameWorld {
    let registry = ParticleDeclRegistry::from_toml_str(EFFECTS).unwrap();
    GameWorld::new(WorldConfig::default(), registry)
}

#[test]
fn test_player_crossing_zone_changes_world() {
    let mut world = world();
    world
        .load_level(&LevelData::from_json_str(OLDWORLD).unwrap())
        .unwrap();

    let wolf = Entity {
        player: false,
        position: Vec3::new(105.0, 1.0, 105.0),
    };
    world.check_zones(&wolf);
    assert!(world.pending_changes().is_empty());

    let hero = Entity {
        player: true,
        position: Vec3::new(105.0, 1.0, 105.0),
    };
    world.check_zones(&hero);
    assert_eq!(
        world.pending_changes(),
        &[ChangeWorldRequest {
            level_name: "NEWWORLD.ZEN".to_string(),
            start_vob_name: "START".to_string(),
        }]
    );
}

#[test]
fn test_zone_trigger_direct_dispatch() {
    let vob = VobDescriptor::new(
        "ZONE",
        VobKind::ChangeLevel {
            level_name: "NEWWORLD.ZEN".to_string(),
            start_vob_name: "START".to_string(),
        },
    )
    .with_bbox(BoundingBox::new(Vec3::ZERO, Vec3::ONE));
    let mut trigger = ZoneTrigger::from_vob(vob).unwrap();
    let mut world = world();

    trigger.on_intersect(
        &mut world,
        &Entity {
            player: true,
            position: Vec3::ZERO,
        },
    );
    assert_eq!(world.pending_changes().len(), 1);

    trigger.on_intersect(
        &mut world,
        &Entity {
            player: false,
            position: Vec3::ZERO,
        },
    );
    assert_eq!(world.pending_changes().len(), 1);
}

#[test]
fn test_emitter_lifecycle_against_world_bucket() {
    let world = world();

    let mut burst = PfxEmitter::from_name(&world, "magicburst");
    assert!(!burst.is_empty());
    assert_eq!(burst.effect_preffered_time(), 800);

    let missing = PfxEmitter::from_name(&world, "NO_SUCH_EFFECT");
    assert!(missing.is_empty());
    assert!(matches!(
        PfxEmitter::try_from_name(&world, "NO_SUCH_EFFECT"),
        Err(ParticleError::UnknownEffect(_))
    ));

    let moved = burst.take();
    assert!(burst.is_empty());
    assert_eq!(lock_bucket(world.bucket()).live_count(), 1);

    drop(moved);
    drop(burst);
    let bucket = lock_bucket(world.bucket());
    assert_eq!(bucket.live_count(), 0);
    assert_eq!(bucket.total_frees(), 1);
}

#[test]
fn test_emitter_as_component() {
    let game_world = world();
    let fire = PfxEmitter::from_name(&game_world, "FIRE");

    let mut ecs = World::default();
    let entity = ecs.spawn(fire).id();
    assert!(ecs.get::<PfxEmitter>(entity).is_some());
    assert_eq!(lock_bucket(game_world.bucket()).live_count(), 1);

    ecs.despawn(entity);
    assert_eq!(lock_bucket(game_world.bucket()).live_count(), 0);
}

#[test]
fn test_level_file_round_trip() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("oldworld.json");
    let level = LevelData::from_json_str(OLDWORLD)?;
    level.save_json(&path)?;

    let mut world = world();
    world.load_level(&LevelData::from_file(&path)?)?;
    assert_eq!(world.level_name(), Some("OLDWORLD.ZEN"));
    assert!(world.emitters()[0].is_active());
    Ok(())
}

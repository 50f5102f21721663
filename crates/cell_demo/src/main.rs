//! Cell core demo
//!
//! Builds a small world, walks an object into a wall, swings at a crowd and
//! logs what the cell core reports. Pass a `.toml` or `.ron` config path to
//! override the defaults.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_3};

use log::{info, warn};
use world_cells::physics::Aabb;
use world_cells::prelude::*;
use world_cells::spatial::{Portal, StoreError};

#[derive(thiserror::Error, Debug)]
enum DemoError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("archetypes: {0}")]
    Store(#[from] StoreError),

    #[error("cell {0} did not resolve")]
    Unresolved(CellId),

    #[error("object {0} was rejected by the registry")]
    Rejected(ObjectId),
}

const BLOCK: LandblockId = LandblockId::new(0xA9, 0xB4);
const HALL: CellId = BLOCK.env_cell(0x100);
const VAULT: CellId = BLOCK.env_cell(0x101);

fn load_config() -> Result<SpatialConfig, DemoError> {
    match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading config from {}", path);
            Ok(SpatialConfig::load_from_file(&path)?)
        }
        None => Ok(SpatialConfig::default()),
    }
}

fn archetypes(config: &SpatialConfig) -> Result<MemoryCellStore, DemoError> {
    if let Some(path) = &config.archetype_path {
        return Ok(MemoryCellStore::load_from_file(path, config.env_cell_namespace)?);
    }

    let hall_bounds = Aabb::new(Vec3::new(40.0, 40.0, 0.0), Vec3::new(60.0, 50.0, 5.0));
    let mut hall = EnvCellArchetype::new(HALL, hall_bounds);
    hall.portals.push(Portal {
        other_cell: Some(VAULT),
        opening: Aabb::new(Vec3::new(60.0, 43.0, 0.0), Vec3::new(60.0, 47.0, 4.0)),
    });
    hall.portals.push(Portal {
        other_cell: None,
        opening: Aabb::new(Vec3::new(48.0, 40.0, 0.0), Vec3::new(52.0, 40.0, 4.0)),
    });
    hall.visible_cells.push(VAULT);
    hall.seen_outside = true;

    let vault_bounds = Aabb::new(Vec3::new(60.0, 40.0, 0.0), Vec3::new(70.0, 50.0, 5.0));
    let mut vault = EnvCellArchetype::new(VAULT, vault_bounds);
    vault.visible_cells.push(HALL);

    let mut store = MemoryCellStore::new();
    store.insert(config.env_cell_namespace, hall);
    store.insert(config.env_cell_namespace, vault);
    Ok(store)
}

fn place(cache: &mut CellCache, objects: &mut ObjectRegistry, body: Body) -> Result<(), DemoError> {
    let id = body.id();
    let cell_id = body.position.cell;
    objects.insert(Box::new(body)).map_err(|_| DemoError::Rejected(id))?;

    let cell = cache.resolve(cell_id).ok_or(DemoError::Unresolved(cell_id))?;
    cell.add_object(id, objects);
    cell.add_shadow_object(ShadowProxy::new(id));
    Ok(())
}

fn run() -> Result<(), DemoError> {
    let config = load_config()?;
    let store = archetypes(&config)?;

    let mut landscape = Landscape::new();
    landscape.load_landblock(Landblock::flat(BLOCK, 0.0));
    let mut cache = CellCache::new(landscape, Box::new(store), config.clone());
    let loaded = cache.load_landblock_cells(BLOCK);
    info!("Landblock {} resident with {} outdoor cells", BLOCK, loaded);

    let mut objects = ObjectRegistry::new();
    let shape = Sphere::new(Vec3::new(0.0, 0.0, 0.6), 0.6);
    let guard = ObjectId::new(0x5000_0001);
    let player = ObjectId::new(0x5000_0002);

    // The guard watches the hall
    cache.resolve(HALL).ok_or(DemoError::Unresolved(HALL))?.add_voyeur(guard);
    for (id, x) in [(guard, 55.0), (player, 50.0)] {
        let body = Body::new(id, Position::new(HALL, Vec3::new(x, 45.0, 0.0))).with_sphere(shape);
        place(&mut cache, &mut objects, body)?;
    }

    let crate_id = ObjectId::new(0x7000_0001);
    let pillar = Body::new(crate_id, Position::new(HALL, Vec3::new(58.0, 45.0, 0.0)))
        .with_sphere(Sphere::new(Vec3::new(0.0, 0.0, 1.0), 1.0))
        .with_state(PhysicsState::STATIC);
    place(&mut cache, &mut objects, pillar)?;

    if let Some(watcher) = objects.get_as::<Body>(guard) {
        for event in watcher.detections() {
            info!("Guard saw {} ({:?})", event.subject(), event.kind());
        }
    }

    // Walk the player east toward the vault
    let mut cells = CellArray::with_load_cells(config.load_all_cells);
    let step = Position::new(HALL, Vec3::new(57.0, 45.0, 0.0));
    let mut sweep = SweepDescriptor::new(step, InsertType::Transition)
        .with_object(player)
        .with_local_sphere(shape);
    let current = cache.find_cell_list_for_path(&mut sweep, &mut cells);
    info!(
        "Sweep gathered {:?}, current cell {:?}, indoor: {}",
        cells.ids(),
        current,
        sweep.hits_interior_cell
    );
    match cache.find_collisions_in(&sweep, &cells, &objects) {
        TransitionState::Collided => info!("Player is blocked"),
        TransitionState::Ok => info!("Player moves freely"),
        TransitionState::Invalid => warn!("No collision model for the gathered cells"),
    }

    // Swing at everything in front of the player
    let facing_east = Frame::from_heading(Vec3::new(50.0, 45.0, 0.0), -FRAC_PI_2);
    let attacker_pos = Position::with_frame(HALL, facing_east);
    let mut reach = CellArray::with_load_cells(config.load_all_cells);
    cache.find_cell_list_sphere(&attacker_pos, &Sphere::new(Vec3::zeros(), 6.0), &mut reach);
    let cone = AttackCone::symmetric(FRAC_PI_3, 6.0, 2.0);
    let mut attack = AttackInfo::new(6.0);
    cache.check_attack_in(player, &attacker_pos, 1.0, &cone, &reach, &mut attack, &objects);
    for (object, location) in attack.hits() {
        info!("Attack hit {} at {:?}", object, location);
    }
    if attack.num_objects() == 0 {
        info!("Attack hit nothing");
    }

    let released = cache.unload_landblock(BLOCK, &mut objects);
    info!("Unloaded {} cells", released);
    Ok(())
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    if let Err(e) = run() {
        log::error!("cell_demo failed: {}", e);
        std::process::exit(1);
    }
}

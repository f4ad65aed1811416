use glam::Vec3;
use growth_core::particle::ParticleId;
use growth_core::system::DrawInstance;
use growth_core::variants::linked::ICOSAHEDRON_VERTICES;
use growth_core::{ParticleKind, ParticleSystem, SystemConfig, SystemError};

#[test]
fn test_draw_data_matches_particles() {
    let mut system = ParticleSystem::with_seed(ParticleKind::Linked, 0);
    system.split_random_particle().unwrap();

    let mut data = Vec::new();
    system.package_data_for_drawing(&mut data);
    assert_eq!(data.len(), system.size() * 4);
    for (chunk, p) in data.chunks_exact(4).zip(system.iter()) {
        assert_eq!(chunk[0], p.position.x);
        assert_eq!(chunk[1], p.position.y);
        assert_eq!(chunk[2], p.position.z);
        assert_eq!(chunk[3], p.size);
    }

    let instances = system.draw_instances();
    assert_eq!(std::mem::size_of::<DrawInstance>(), 16);
    assert_eq!(instances.len(), system.size());
    assert_eq!(instances[0], DrawInstance::from(system.particle_by_index(0).unwrap()));
}

#[test]
fn test_draw_buffers_are_reused() {
    let mut system = ParticleSystem::with_seed(ParticleKind::Linked, 0);
    let mut data = vec![9.0; 500];
    let mut links = vec![7; 3];
    system.package_data_for_drawing(&mut data);
    system.links_for_draw(&mut links);
    assert_eq!(data.len(), 48);
    assert_eq!(links.len(), 120);

    system.reset(ParticleKind::Growth);
    system.package_data_for_drawing(&mut data);
    system.links_for_draw(&mut links);
    assert_eq!(data.len(), 4);
    assert!(links.is_empty());
}

#[test]
fn test_ids_are_monotonic_and_reset() {
    let mut system = ParticleSystem::with_seed(ParticleKind::Linked, 5);
    let ids: Vec<u32> = system.iter().map(|p| p.id().0).collect();
    assert_eq!(ids, (0..12).collect::<Vec<_>>());

    let a = system.split_random_particle().unwrap();
    let b = system.split_random_particle().unwrap();
    assert_eq!(a, ParticleId(12));
    assert_eq!(b, ParticleId(13));

    system.delete_particles(&[0]).unwrap();
    let c = system.split_random_particle().unwrap();
    assert_eq!(c, ParticleId(14));

    system.reset(ParticleKind::Linked);
    let ids: Vec<u32> = system.iter().map(|p| p.id().0).collect();
    assert_eq!(ids, (0..12).collect::<Vec<_>>());
}

#[test]
fn test_no_splittable_particle_is_an_error() {
    let config = SystemConfig {
        child_threshold: 0,
        ..SystemConfig::default()
    };
    let mut system = ParticleSystem::with_config(ParticleKind::Growth, config, 0);
    assert_eq!(
        system.split_random_particle(),
        Err(SystemError::NoSplittableParticle { attempts: 1 })
    );
}

#[test]
fn test_every_candidate_is_tried_before_giving_up() {
    let config = SystemConfig {
        child_threshold: 0,
        ..SystemConfig::default()
    };
    let mut system = ParticleSystem::with_config(ParticleKind::Growth, config, 0);
    system.fill(4);
    assert_eq!(system.size(), 5);
    assert_eq!(
        system.split_random_particle(),
        Err(SystemError::NoSplittableParticle { attempts: 5 })
    );
}

#[test]
fn test_last_of_many_candidates_still_splits() {
    let config = SystemConfig {
        child_threshold: 0,
        ..SystemConfig::default()
    };
    let mut system = ParticleSystem::with_config(ParticleKind::Growth, config, 0);
    system.fill(299);
    system.set_nearest_particle_state(true);
    assert_eq!(system.size(), 300);

    // All roots share one position, so nearest-first visits them in order
    // and only the final one has room for a branch.
    if let Some(state) = system.particle_by_index_mut(299).unwrap().as_growth_mut() {
        state.child_threshold = 3;
    }
    let root = system.particle_by_index(299).unwrap().id();

    let child = system.split_random_particle().unwrap();
    assert_eq!(system.size(), 301);
    assert!(system.particle(child).unwrap().is_connected_to(root));
}

#[test]
fn test_empty_system_cannot_split() {
    let mut system = ParticleSystem::with_seed(ParticleKind::Linked, 0);
    let all: Vec<usize> = (0..system.size()).collect();
    system.delete_particles(&all).unwrap();
    assert_eq!(
        system.split_random_particle(),
        Err(SystemError::NoSplittableParticle { attempts: 0 })
    );
}

#[test]
fn test_automata_do_not_split() {
    let mut system = ParticleSystem::with_seed(ParticleKind::Automata, 0);
    let err = system.split_random_particle().unwrap_err();
    assert_eq!(
        err,
        SystemError::Unsupported {
            operation: "split",
            kind: ParticleKind::Automata
        }
    );
    assert!(system.split_particle(0).is_err());
    assert_eq!(system.size(), 1);
}

#[test]
fn test_nearest_particle_to_light_splits_first() {
    let mut system = ParticleSystem::with_seed(ParticleKind::Linked, 0);
    let target = ICOSAHEDRON_VERTICES[8];
    system.set_light_pos(target * 10.0);

    let candidates: Vec<usize> = (0..system.size()).collect();
    assert_eq!(system.nearest_particle(&candidates), Some(8));
    assert_eq!(system.nearest_particle(&candidates[9..]), Some(1));
    assert_eq!(system.nearest_particle(&[]), None);

    let child = system.split_random_particle().unwrap();
    assert!(system.particle(child).unwrap().is_connected_to(ParticleId(8)));
}

#[test]
fn test_nearest_ties_go_to_first_slot() {
    let system = ParticleSystem::with_seed(ParticleKind::Linked, 0);
    assert_eq!(system.nearest_particle(&[4, 4]), Some(0));
    assert_eq!(system.nearest_particle(&[5, 5, 5]), Some(0));
}

#[test]
fn test_lookup_errors() {
    let mut system = ParticleSystem::with_seed(ParticleKind::Linked, 0);
    assert_eq!(
        system.particle_by_index(99).unwrap_err(),
        SystemError::IndexOutOfBounds { index: 99, len: 12 }
    );
    assert_eq!(
        system.particle(ParticleId(999)).unwrap_err(),
        SystemError::UnknownParticle(ParticleId(999))
    );
    assert_eq!(
        system.split_particle(12).unwrap_err(),
        SystemError::IndexOutOfBounds { index: 12, len: 12 }
    );
    assert!(system.delete_particles(&[12]).is_err());
    assert_eq!(system.size(), 12);
}

#[test]
fn test_connection_helpers() {
    let mut system = ParticleSystem::with_seed(ParticleKind::Linked, 0);
    let (a, b) = (ParticleId(0), ParticleId(1));
    assert!(system.particle(a).unwrap().is_connected_to(b));
    system.delete_connection(a, b).unwrap();
    assert!(!system.particle(a).unwrap().is_connected_to(b));
    assert!(!system.particle(b).unwrap().is_connected_to(a));
    system.double_connect(a, b).unwrap();
    assert!(system.particle(b).unwrap().is_connected_to(a));
}

#[test]
fn test_setters_update_config() {
    let mut system = ParticleSystem::with_seed(ParticleKind::Linked, 0);
    system.set_cohesion(80);
    system.set_local_cohesion(60);
    system.set_automata_radius(6);
    system.set_automata_time(50);
    system.set_light_pos(Vec3::new(1.0, 2.0, 3.0));
    system.toggle_particle_death(true);
    system.set_nearest_particle_state(false);
    system.set_grow_to_light(false);
    system.set_particle_size(3.0);

    let config = system.config();
    assert_eq!(config.cohesion, 20);
    assert_eq!(config.local_cohesion, 40);
    assert_eq!(config.automata_radius, 6);
    assert_eq!(config.automata_time, 50);
    assert_eq!(config.light_pos, Vec3::new(1.0, 2.0, 3.0));
    assert!(config.particle_death);
    assert!(!config.nearest_particle);
    assert!(!config.grow_to_light);
    assert_eq!(config.particle_size, 3.0);
    assert!(system.iter().all(|p| p.size == 3.0));
}

#[test]
fn test_reset_applies_kind_preset() {
    let mut system = ParticleSystem::with_seed(ParticleKind::Linked, 0);
    system.set_cohesion(90);
    system.set_grow_to_light(false);
    system.toggle_particle_death(true);

    system.reset(ParticleKind::Linked);
    assert_eq!(system.config().cohesion, 30);
    assert!(system.config().grow_to_light);
    assert!(!system.config().particle_death);

    system.reset(ParticleKind::Growth);
    assert_eq!(system.kind(), ParticleKind::Growth);
    assert!(!system.config().nearest_particle);
    assert_eq!(system.size(), 1);

    system.reset(ParticleKind::Automata);
    assert_eq!(system.config().automata_radius, 4);
    assert_eq!(system.config().automata_time, 200);
}

#[test]
fn test_disabled_forces_freeze_everything() {
    let mut system = ParticleSystem::with_seed(ParticleKind::Linked, 0);
    system.toggle_forces(false);
    let before: Vec<Vec3> = system.iter().map(|p| p.position).collect();
    for _ in 0..10 {
        system.advance().unwrap();
    }
    let after: Vec<Vec3> = system.iter().map(|p| p.position).collect();
    assert_eq!(before, after);
}

#[test]
fn test_statistics() {
    let mut system = ParticleSystem::with_seed(ParticleKind::Linked, 0);
    let centre = system.calculate_particle_centre();
    assert!(centre.length() < 1e-5);
    assert_eq!(system.particle_centre(), centre);

    let avg = system.calculate_average_distance_from_centre();
    assert!(avg.min_element() > 0.0);
    assert!(avg.max_element() < 1.0);
    assert_eq!(system.average_distance(), avg);

    let all: Vec<usize> = (0..system.size()).collect();
    system.delete_particles(&all).unwrap();
    assert_eq!(system.calculate_particle_centre(), Vec3::ZERO);
    assert_eq!(system.calculate_average_distance_from_centre(), Vec3::ZERO);
}

#[test]
fn test_linked_simulation_stays_finite() {
    let mut system = ParticleSystem::with_seed(ParticleKind::Linked, 42);
    for step in 0..200 {
        system.advance().unwrap();
        if step % 20 == 0 {
            system.split_random_particle().unwrap();
        }
    }
    assert_eq!(system.size(), 22);
    assert!(system.iter().all(|p| p.position.is_finite() && p.velocity.is_finite()));
}

#[test]
fn test_seeded_systems_are_reproducible() {
    let run = |seed| {
        let mut system = ParticleSystem::with_seed(ParticleKind::Linked, seed);
        system.set_nearest_particle_state(false);
        for _ in 0..10 {
            system.split_random_particle().unwrap();
            system.advance().unwrap();
        }
        system.iter().map(|p| p.position).collect::<Vec<_>>()
    };
    assert_eq!(run(3), run(3));
}

#[test]
fn test_linked_split_runs_a_force_pass_without_moving() {
    let mut system = ParticleSystem::with_seed(ParticleKind::Linked, 0);
    assert!(system.iter().all(|p| p.velocity == Vec3::ZERO));
    let before: Vec<Vec3> = system.iter().map(|p| p.position).collect();

    system.split_random_particle().unwrap();

    for (p, &pos) in system.iter().zip(&before) {
        assert_eq!(p.position, pos);
    }
    assert!(system.iter().any(|p| p.velocity != Vec3::ZERO));
}

#[test]
fn test_growth_split_leaves_velocities_alone() {
    let mut system = ParticleSystem::with_seed(ParticleKind::Growth, 0);
    system.split_random_particle().unwrap();
    assert!(system.iter().all(|p| p.velocity == Vec3::ZERO));
}

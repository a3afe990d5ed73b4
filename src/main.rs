//! Gravshot headless runner
//!
//! Seeds a small skirmish, drives a scripted firing pattern through the
//! fixed-timestep loop and logs what happened.
//!
//! Usage: `gravshot [tuning.json] [seconds]`

#[cfg(not(target_arch = "wasm32"))]
mod skirmish {
    use std::path::Path;

    use glam::Vec2;

    use gravshot::Tuning;
    use gravshot::consts::*;
    use gravshot::sim::{
        BeamCommand, EntityId, FireCommand, GameState, HullClass, ProjectileKind, Side, SimEvent,
        TickInput, tick,
    };

    /// Presentation frame length fed to the accumulator
    const FRAME_SECS: f32 = 1.0 / 30.0;

    #[derive(Debug, Default)]
    struct Tally {
        hits: u32,
        absorbed: u32,
        detonations: u32,
        kills: u32,
        fragmentations: u32,
        rams: u32,
        consumed: u32,
        wells_expired: u32,
        beams_dry: u32,
    }

    impl Tally {
        fn record(&mut self, events: &[SimEvent]) {
            for event in events {
                match event {
                    SimEvent::ProjectileHit { .. } => self.hits += 1,
                    SimEvent::ProjectileAbsorbed { .. } => self.absorbed += 1,
                    SimEvent::ProjectileDetonated { .. } => self.detonations += 1,
                    SimEvent::ShipDestroyed { .. } => self.kills += 1,
                    SimEvent::PlayerDestroyed => {}
                    SimEvent::AsteroidRammed { .. } => self.rams += 1,
                    SimEvent::AsteroidFragmented { .. } => self.fragmentations += 1,
                    SimEvent::ConsumedByWell { .. } => self.consumed += 1,
                    SimEvent::WellExpired { .. } => self.wells_expired += 1,
                    SimEvent::BeamRanDry { .. } => self.beams_dry += 1,
                }
            }
        }
    }

    struct Skirmish {
        state: GameState,
        accumulator: f32,
        lancer: EntityId,
        tally: Tally,
    }

    impl Skirmish {
        fn new(seed: u64, tuning: Tuning) -> Self {
            let mut state = GameState::with_tuning(seed, tuning);
            let w = state.tuning.screen_width;
            state.spawn_hostile(HullClass::Fighter, Vec2::new(w * 0.2, 120.0));
            state.spawn_hostile(HullClass::Gunship, Vec2::new(w * 0.4, 160.0));
            state.spawn_hostile(HullClass::PlasmaShip, Vec2::new(w * 0.6, 140.0));
            let lancer = state.spawn_hostile(HullClass::Lancer, Vec2::new(w * 0.8, 110.0));
            for i in 0..4 {
                state.spawn_asteroid(Vec2::new(w * (0.15 + 0.23 * i as f32), -60.0), 1.0);
            }
            state.spawn_gravity_well();
            Self {
                state,
                accumulator: 0.0,
                lancer,
                tally: Tally::default(),
            }
        }

        /// Scripted decisions for the coming tick
        fn plan(&self) -> TickInput {
            let state = &self.state;
            let t = state.time_ticks;
            let mut input = TickInput::default();

            if state.player.vitals.alive {
                let muzzle = state.player.muzzle();
                let nearest = state.hostiles.iter().min_by(|a, b| {
                    a.pos
                        .distance_squared(muzzle)
                        .total_cmp(&b.pos.distance_squared(muzzle))
                });
                if t % 10 == 0 {
                    input.fire.push(FireCommand {
                        kind: ProjectileKind::Bolt,
                        side: Side::Player,
                        position: muzzle,
                        aim: None,
                    });
                }
                if t % 90 == 45 {
                    input.fire.push(FireCommand {
                        kind: ProjectileKind::Rocket,
                        side: Side::Player,
                        position: muzzle,
                        aim: nearest.map(|s| s.pos),
                    });
                }
                // Beam in bursts
                input.beams.push(BeamCommand {
                    owner: state.player.id,
                    active: (t / 120) % 2 == 0,
                });
            }

            let target = state.player.pos;
            for ship in state.hostiles.iter().filter(|s| !s.is_frozen(state.time_secs)) {
                let kind = match ship.hull {
                    HullClass::Gunship if t % 45 == 0 => ProjectileKind::HeavyBolt,
                    HullClass::PlasmaShip if t % 120 == 60 => ProjectileKind::Plasma,
                    HullClass::Fighter if t % 30 == 0 => ProjectileKind::Bolt,
                    HullClass::Fighter if t % 200 == 100 => ProjectileKind::FreezeBolt,
                    _ => continue,
                };
                input.fire.push(FireCommand {
                    kind,
                    side: Side::Hostile,
                    position: ship.muzzle(),
                    aim: kind.is_aimable().then_some(target),
                });
            }
            input.beams.push(BeamCommand {
                owner: self.lancer,
                active: true,
            });

            input
        }

        fn spawn_wave(&mut self) {
            let t = self.state.time_ticks;
            let w = self.state.tuning.screen_width;
            if t > 0 && t % 600 == 0 {
                self.state.spawn_gravity_well();
            }
            if t > 0 && t % 240 == 0 {
                let x = w * ((t / 240) % 5) as f32 / 5.0 + 100.0;
                self.state.spawn_asteroid(Vec2::new(x, -60.0), 1.0);
            }
        }

        /// Run simulation ticks for one presentation frame
        fn update(&mut self, dt: f32) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                self.spawn_wave();
                let input = self.plan();
                tick(&mut self.state, &input, SIM_DT);
                self.tally.record(&self.state.events);
                self.accumulator -= SIM_DT;
                substeps += 1;
            }
        }
    }

    pub fn run() {
        let mut args = std::env::args().skip(1);
        let tuning = match args.next() {
            Some(path) => Tuning::load(Path::new(&path)),
            None => Tuning::default(),
        };
        let seconds = args
            .next()
            .and_then(|s| s.parse::<f32>().ok())
            .unwrap_or(30.0);

        let mut skirmish = Skirmish::new(0x6772_6176, tuning);
        let frames = (seconds / FRAME_SECS).ceil() as u32;
        log::info!("Running {} frames ({:.1} s simulated)", frames, seconds);

        for _ in 0..frames {
            skirmish.update(FRAME_SECS);
            if !skirmish.state.player.vitals.alive {
                log::info!("Player down after {:.2} s", skirmish.state.time_secs);
                break;
            }
        }

        let state = &skirmish.state;
        log::info!(
            "Ticks: {}  Score: {}  Player health {:.0} shield {:.0}",
            state.time_ticks,
            state.score,
            state.player.vitals.health,
            state.player.vitals.shield
        );
        log::info!(
            "Live: {} hostiles, {} asteroids, {} projectiles, {} wells",
            state.hostiles.len(),
            state.asteroids.len(),
            state.projectiles.len(),
            state.wells.len()
        );
        let tally = &skirmish.tally;
        log::info!(
            "Hits {}  absorbed {}  detonations {}  kills {}  fragmentations {}",
            tally.hits,
            tally.absorbed,
            tally.detonations,
            tally.kills,
            tally.fragmentations
        );
        log::info!(
            "Rams {}  consumed by wells {}  wells expired {}  beams ran dry {}",
            tally.rams,
            tally.consumed,
            tally.wells_expired,
            tally.beams_dry
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Gravshot (headless) starting...");
    skirmish::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Library-only on wasm; the host drives `gravshot::sim::tick` directly
}

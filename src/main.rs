//! Startup Scheduler Demo
//!
//! Boots a small scene of units, runs a few frames, prints the pass report
//! and then verifies that registering the same units in reverse order
//! produces the same invocation order.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Context;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use startup_scheduler::{
    Bootstrap, FrameHook, InitError, InitOnce, Initializable,
    Priority, SchedulerConfig, VERSION,
};

/// Frames to run after startup.
const DEMO_FRAMES: u64 = 3;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    info!("Startup Scheduler v{}", VERSION);

    let config = match SchedulerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            warn!("{}, falling back to defaults", e);
            SchedulerConfig::default()
        }
    };
    info!(scope = %config.scope, tie_break = %config.tie_break, "configuration loaded");

    info!("=== Booting Scene ===");
    let baseline_order: Vec<usize> = (0..UNIT_COUNT).collect();
    let mut scene = Scene::build(config.clone(), &baseline_order);

    for _ in 0..DEMO_FRAMES {
        scene.host.tick();
    }

    let report = scene
        .host
        .report()
        .context("initialization pass did not run")?;
    println!(
        "{}",
        serde_json::to_string_pretty(report).context("failed to serialize pass report")?
    );
    let baseline = report.fingerprint;

    info!("=== Verifying Determinism ===");
    let reversed_order: Vec<usize> = baseline_order.iter().rev().copied().collect();
    debug!(?reversed_order, "registration order for replay");

    let mut replay = Scene::build(config, &reversed_order);
    let replay_fingerprint = replay
        .host
        .start()
        .map(|r| r.fingerprint)
        .context("replay pass did not run")?;

    info!("Baseline fingerprint: {}", hex::encode(baseline));
    info!("Replay fingerprint:   {}", hex::encode(replay_fingerprint));

    if baseline == replay_fingerprint {
        info!("DETERMINISM VERIFIED: fingerprints match");
    } else {
        warn!("DETERMINISM FAILURE: fingerprints differ");
    }

    Ok(())
}

// =============================================================================
// DEMO UNITS
// =============================================================================

const UNIT_COUNT: usize = 6;

/// Settings shared between units, filled by the config loader.
#[derive(Debug, Default)]
struct Settings {
    loaded: bool,
    target_fps: u32,
    oauth_client_id: String,
}

type SharedSettings = Rc<RefCell<Settings>>;

struct ConfigLoader {
    settings: SharedSettings,
    once: InitOnce,
}

impl Initializable for ConfigLoader {
    fn initialize(&mut self) -> Result<(), InitError> {
        let settings = &self.settings;
        self.once.run(|| {
            let mut s = settings.borrow_mut();
            s.target_fps = std::env::var("DEMO_TARGET_FPS")
                .ok()
                .map(|v| v.parse::<u32>())
                .transpose()
                .map_err(|e| InitError::invalid_config("DEMO_TARGET_FPS", e.to_string()))?
                .unwrap_or(60);
            s.oauth_client_id = std::env::var("DEMO_OAUTH_CLIENT_ID").unwrap_or_default();
            s.loaded = true;
            Ok(())
        })?;
        Ok(())
    }
}

struct QualityManager {
    settings: SharedSettings,
    frame_budget_micros: u32,
}

impl Initializable for QualityManager {
    fn initialize(&mut self) -> Result<(), InitError> {
        let settings = self.settings.borrow();
        if !settings.loaded {
            return Err(InitError::missing("ConfigLoader"));
        }
        if settings.target_fps == 0 {
            return Err(InitError::invalid_config("target_fps", "must be positive"));
        }
        self.frame_budget_micros = 1_000_000 / settings.target_fps;
        debug!(budget = self.frame_budget_micros, "frame budget set");
        Ok(())
    }
}

struct OAuthService {
    settings: SharedSettings,
}

impl Initializable for OAuthService {
    fn initialize(&mut self) -> Result<(), InitError> {
        if self.settings.borrow().oauth_client_id.is_empty() {
            return Err(InitError::invalid_config(
                "oauth_client_id",
                "not set (DEMO_OAUTH_CLIENT_ID)",
            ));
        }
        Ok(())
    }
}

struct CoinEffect {
    kind: &'static str,
    ready: bool,
    frames_seen: u64,
}

impl Initializable for CoinEffect {
    fn initialize(&mut self) -> Result<(), InitError> {
        self.ready = true;
        Ok(())
    }
}

impl FrameHook for CoinEffect {
    fn update(&mut self, frame: u64) {
        if self.ready {
            self.frames_seen += 1;
            debug!(effect = self.kind, frame, "coin effect updated");
        }
    }
}

struct GomokuBoard {
    cells: Vec<u8>,
}

impl Initializable for GomokuBoard {
    fn initialize(&mut self) -> Result<(), InitError> {
        self.cells = vec![0; 15 * 15];
        debug!(cells = self.cells.len(), "board cleared");
        Ok(())
    }
}

/// The demo scene: owns every unit and the bootstrap.
struct Scene {
    host: Bootstrap,
    _config_loader: Rc<RefCell<ConfigLoader>>,
    _quality: Rc<RefCell<QualityManager>>,
    _oauth: Rc<RefCell<OAuthService>>,
    _magnet: Rc<RefCell<CoinEffect>>,
    _spiral: Rc<RefCell<CoinEffect>>,
    _board: Rc<RefCell<GomokuBoard>>,
}

impl Scene {
    /// Build the scene, registering units in `order` (indices into the
    /// fixed unit list).
    fn build(config: SchedulerConfig, order: &[usize]) -> Self {
        let settings = SharedSettings::default();
        let config_loader = Rc::new(RefCell::new(ConfigLoader {
            settings: settings.clone(),
            once: InitOnce::new(),
        }));
        let quality = Rc::new(RefCell::new(QualityManager {
            settings: settings.clone(),
            frame_budget_micros: 0,
        }));
        let oauth = Rc::new(RefCell::new(OAuthService { settings }));
        let magnet = Rc::new(RefCell::new(CoinEffect {
            kind: "magnet",
            ready: false,
            frames_seen: 0,
        }));
        let spiral = Rc::new(RefCell::new(CoinEffect {
            kind: "spiral",
            ready: false,
            frames_seen: 0,
        }));
        let board = Rc::new(RefCell::new(GomokuBoard { cells: Vec::new() }));

        let mut host = Bootstrap::new(config);

        for &index in order {
            let registry = host.registry_mut();
            match index {
                0 => {
                    registry.register("ConfigLoader", Priority::FOUNDATION, &config_loader);
                }
                1 => {
                    registry.register("QualityManager", Priority::SYSTEM, &quality);
                }
                2 => {
                    registry.register("OAuthService", 10, &oauth);
                }
                3 => {
                    registry.register("CoinMagnetField", Priority::DEFAULT, &magnet);
                }
                4 => {
                    registry.register("CoinSpiralEffect", Priority::DEFAULT, &spiral);
                }
                _ => {
                    let handle = registry.register("GomokuBoard", Priority::DEFAULT, &board);
                    registry.set_active(handle, false);
                }
            }
        }

        host.add_frame_hook("CoinMagnetField", &magnet);
        host.add_frame_hook("CoinSpiralEffect", &spiral);

        Self {
            host,
            _config_loader: config_loader,
            _quality: quality,
            _oauth: oauth,
            _magnet: magnet,
            _spiral: spiral,
            _board: board,
        }
    }
}

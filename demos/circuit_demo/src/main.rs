//! Headless scripted playthrough of "The Circuit".
//!
//! Stands in for the real shell: feeds keyboard and touch input on a fixed
//! schedule, ticks the game at 60 Hz, and logs what the collaborators would
//! render, play, and display. Run with `RUST_LOG=debug` for the full trace.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;
use orbcore::{
    AudioSink, ElementState, Game, GameConfig, GameState, HudSink, KeyCode, LevelLayout,
    TouchPhase,
};

const DT: f32 = 1.0 / 60.0;
const MAX_SECONDS: f32 = 60.0;

struct LogAudio;

impl AudioSink for LogAudio {
    fn collectible_picked(&mut self) {
        log::info!("audio: collect chime");
    }
    fn level_completed(&mut self) {
        log::info!("audio: completion fanfare");
    }
}

struct LogHud;

impl HudSink for LogHud {
    fn set_score(&mut self, collected: u32, required: u32) {
        log::info!("hud: score {collected} / {required}");
    }
    fn show_message(&mut self, title: &str, subtitle: &str) {
        log::info!("hud: {title} ({subtitle})");
    }
    fn hide_message(&mut self) {
        log::debug!("hud: message hidden");
    }
}

/// Keys held during a window of the scripted run, in seconds.
struct Phase {
    from: f32,
    until: f32,
    key: KeyCode,
}

const SCRIPT: &[Phase] = &[
    // Across the start pad and the first bridge.
    Phase { from: 0.0, until: 4.2, key: KeyCode::KeyD },
    // Brake against the corner pad wall by steering back briefly.
    Phase { from: 4.2, until: 4.6, key: KeyCode::KeyA },
    // Down the narrow bridge toward the goal pad.
    Phase { from: 5.0, until: 9.5, key: KeyCode::KeyW },
];

fn main() -> Result<()> {
    env_logger::init();

    let layout = LevelLayout::from_json(include_str!("../level1.json"))?;
    log::info!("loaded level '{}'", layout.name);

    let mut game = Game::new(
        GameConfig::default(),
        Box::new(()),
        Rc::new(RefCell::new(LogAudio)),
        Rc::new(RefCell::new(LogHud)),
    );
    game.start_level(layout)?;

    let mut held: Option<KeyCode> = None;
    let mut flicked = false;
    let mut clock = 0.0f32;

    while game.state() == GameState::Playing && clock < MAX_SECONDS {
        let wanted = SCRIPT
            .iter()
            .find(|phase| clock >= phase.from && clock < phase.until)
            .map(|phase| phase.key);
        if wanted != held {
            let input = game.input_mut();
            if let Some(key) = held {
                input.handle_key(key, ElementState::Released);
            }
            if let Some(key) = wanted {
                input.handle_key(key, ElementState::Pressed);
            }
            held = wanted;
        }

        // Past the script, nudge toward the goal with one up-screen swipe.
        if clock >= 10.0 && !flicked {
            flicked = true;
            let base_ms = f64::from(clock) * 1000.0;
            let input = game.input_mut();
            input.handle_touch(TouchPhase::Started, 240.0, 700.0, base_ms);
            for step in 1..=6 {
                input.handle_touch(
                    TouchPhase::Moved,
                    240.0,
                    700.0 - step as f32 * 30.0,
                    base_ms + f64::from(step) * 10.0,
                );
            }
            input.handle_touch(TouchPhase::Ended, 240.0, 520.0, base_ms + 60.0);
            log::info!("swiped up-screen");
        }

        game.tick(DT)?;
        clock += DT;
    }

    let level = game.level().expect("level still present after the run");
    log::info!(
        "run over after {clock:.1}s: state {:?}, {} / {} collected, ball at {:?}",
        game.state(),
        level.collected_count(),
        level.required_count(),
        level.ball().position()
    );
    Ok(())
}

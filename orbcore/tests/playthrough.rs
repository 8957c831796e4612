//! End-to-end run of a small level: collect the only orb, settle on the
//! goal, and finish exactly once.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use orbcore::{
    AudioSink, CollectibleDef, Game, GameConfig, GameState, HudSink, LevelLayout, PlatformDef,
};

const DT: f32 = 1.0 / 60.0;

#[derive(Default)]
struct CountingAudio {
    collects: u32,
    completes: u32,
}

impl AudioSink for CountingAudio {
    fn collectible_picked(&mut self) {
        self.collects += 1;
    }
    fn level_completed(&mut self) {
        self.completes += 1;
    }
}

#[derive(Default)]
struct ScoreHud {
    score: (u32, u32),
    messages_shown: u32,
}

impl HudSink for ScoreHud {
    fn set_score(&mut self, collected: u32, required: u32) {
        self.score = (collected, required);
    }
    fn show_message(&mut self, _title: &str, _subtitle: &str) {
        self.messages_shown += 1;
    }
}

/// One pad, one orb at the spawn point, goal on the same pad.
fn tiny_level() -> LevelLayout {
    LevelLayout {
        name: "tiny".into(),
        start_position: Vec3::new(0.0, 1.5, 0.0),
        goal_position: Vec3::new(0.0, 0.25, 0.0),
        platforms: vec![PlatformDef {
            position: Vec3::ZERO,
            size: Vec3::new(6.0, 0.5, 6.0),
            rotation: None,
            color: None,
        }],
        collectibles: vec![CollectibleDef {
            position: Vec3::new(0.0, 1.5, 0.0),
        }],
        collectibles_required: 1,
    }
}

#[test]
fn collect_then_settle_then_complete_exactly_once() {
    let audio = Rc::new(RefCell::new(CountingAudio::default()));
    let hud = Rc::new(RefCell::new(ScoreHud::default()));

    let audio_sink: Rc<RefCell<dyn AudioSink>> = audio.clone();
    let hud_sink: Rc<RefCell<dyn HudSink>> = hud.clone();
    let mut game = Game::new(
        GameConfig::default(),
        Box::new(()),
        audio_sink,
        hud_sink,
    );

    assert_eq!(game.state(), GameState::Menu);
    game.start_level(tiny_level()).unwrap();
    assert_eq!(game.state(), GameState::Playing);

    // Drive until the run finishes; the orb sits at the spawn point and the
    // goal pad is directly below, so a settled ball completes quickly.
    let mut ticks = 0;
    while game.state() == GameState::Playing && ticks < 600 {
        game.tick(DT).unwrap();
        ticks += 1;
    }

    assert_eq!(game.state(), GameState::LevelComplete);
    assert_eq!(audio.borrow().collects, 1);
    assert_eq!(audio.borrow().completes, 1);
    assert_eq!(hud.borrow().score, (1, 1));
    assert_eq!(hud.borrow().messages_shown, 1);
    let level = game.level().unwrap();
    assert_eq!(level.collected_count(), 1);
    assert!(level.is_complete());

    // Ticking a finished game is a harmless no-op.
    let resting = level.ball().position();
    for _ in 0..60 {
        game.tick(DT).unwrap();
    }
    assert_eq!(game.level().unwrap().ball().position(), resting);
    assert_eq!(audio.borrow().completes, 1);
}

#[test]
fn flick_input_moves_the_ball_toward_the_goal() {
    use orbcore::TouchPhase;

    let audio = Rc::new(RefCell::new(CountingAudio::default()));
    let hud = Rc::new(RefCell::new(ScoreHud::default()));
    let audio_sink: Rc<RefCell<dyn AudioSink>> = audio.clone();
    let mut game = Game::new(GameConfig::default(), Box::new(()), audio_sink, hud);

    // A wide pad, no orbs required, goal far off to one side.
    let layout = LevelLayout {
        name: "runway".into(),
        start_position: Vec3::new(0.0, 1.5, 0.0),
        goal_position: Vec3::new(100.0, 0.25, 0.0),
        platforms: vec![PlatformDef {
            position: Vec3::ZERO,
            size: Vec3::new(40.0, 0.5, 8.0),
            rotation: None,
            color: None,
        }],
        collectibles: vec![],
        collectibles_required: 0,
    };
    game.start_level(layout).unwrap();

    // Let the ball settle, then swipe up-screen: the impulse follows the
    // camera's forward direction.
    for _ in 0..120 {
        game.tick(DT).unwrap();
    }
    let before = game.level().unwrap().ball().position();

    let input = game.input_mut();
    input.handle_touch(TouchPhase::Started, 200.0, 600.0, 0.0);
    for step in 1..=6 {
        let t = f64::from(step) * 10.0;
        input.handle_touch(TouchPhase::Moved, 200.0, 600.0 - step as f32 * 40.0, t);
    }
    input.handle_touch(TouchPhase::Ended, 200.0, 360.0, 60.0);

    for _ in 0..60 {
        game.tick(DT).unwrap();
    }
    let after = game.level().unwrap().ball().position();
    let travelled = (after - before).length();
    assert!(travelled > 1.0, "flick moved the ball only {travelled}");
}

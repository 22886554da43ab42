//=========================================================================
// Scene Lifecycle Scenarios
//
// End-to-end runs of scene trees against a headless frame buffer and
// scripted input.
//
//=========================================================================

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use space_battle::game;
use space_battle::game::controls::{pause_scene, PAUSE_KEY, QUIT_KEY};
use space_battle::prelude::*;

use tempfile::TempDir;

type Log = Rc<RefCell<Vec<String>>>;

//=== Fixtures ============================================================

fn fast_config(assets: &Path) -> GameConfig {
    let mut config = GameConfig::default();
    config.fps = 1000.0;
    config.players = 2;
    config.assets.dir = assets.to_path_buf();
    config
}

fn space() -> InputEvent {
    InputEvent::key_down(PAUSE_KEY)
}

fn ctrl_q() -> InputEvent {
    InputEvent::key_down(QUIT_KEY).with_modifiers(Modifiers::CTRL)
}

fn child_name(scene: &dyn SceneNode) -> Option<String> {
    scene.child().map(|c| c.name().to_owned())
}

/// Root that only hosts whatever it is given.
struct Host;

impl SceneBehavior for Host {
    fn name(&self) -> &str {
        "host"
    }
}

/// Scene that logs its lifecycle hooks and pauses on the pause key.
struct Level {
    log: Log,
}

impl SceneBehavior for Level {
    fn name(&self) -> &str {
        "level"
    }

    fn on_freeze(&mut self) {
        self.log.borrow_mut().push("freeze".into());
    }

    fn on_unfreeze(&mut self) {
        self.log.borrow_mut().push("unfreeze".into());
    }

    fn on_finish(&mut self) -> Result<ReturnValue, SceneError> {
        self.log.borrow_mut().push("finish".into());
        Ok(None)
    }
}

fn hosted_level(log: &Log) -> Scene<Host> {
    let mut controller = EventController::new();
    controller
        .on_key_down(PAUSE_KEY, Args::new(), |_: &mut Level, _: &Call<'_>| {
            Ok(Some(ControlSignal::swap_for(pause_scene(1000.0)?, false)))
        })
        .unwrap();
    controller
        .on_key_up(KeyCode::KeyW, Args::new(), |level: &mut Level, _: &Call<'_>| {
            level.log.borrow_mut().push("release W".into());
            Ok(None)
        })
        .unwrap();

    let level = Scene::new(Level { log: log.clone() }, controller);
    let mut host = Scene::new(Host, EventController::new());
    host.put(Box::new(level)).unwrap();
    host
}

//=== Pause / Resume ======================================================

#[test]
fn pause_freezes_and_resume_restores_with_zero_delta() {
    let log = Log::default();
    let mut host = hosted_level(&log);
    let mut surface = FrameBuffer::new(64, 48);
    let mut input = ScriptedInput::new();
    input.push_idle().push_frame([space()]).push_frame([space()]).push_idle();

    host.step(&mut surface, &mut input).unwrap();
    assert_eq!(child_name(&host).as_deref(), Some("level"));

    host.step(&mut surface, &mut input).unwrap();
    assert_eq!(child_name(&host).as_deref(), Some("pause"));
    assert_eq!(log.borrow().last().map(String::as_str), Some("freeze"));
    assert!(!log.borrow().iter().any(|e| e == "finish"));

    host.step(&mut surface, &mut input).unwrap();
    assert_eq!(child_name(&host).as_deref(), Some("level"));
    assert_eq!(log.borrow().last().map(String::as_str), Some("unfreeze"));

    std::thread::sleep(Duration::from_millis(5));
    let outcome = host.step(&mut surface, &mut input).unwrap();
    assert_eq!(outcome.delta, Some(Duration::ZERO));
}

#[test]
fn release_in_the_pausing_frame_reaches_the_level_after_resume() {
    let log = Log::default();
    let mut host = hosted_level(&log);
    let mut surface = FrameBuffer::new(64, 48);
    let mut input = ScriptedInput::new();
    input
        .push_idle()
        .push_frame([space(), InputEvent::key_up(KeyCode::KeyW)])
        .push_frame([space()])
        .push_idle();

    host.step(&mut surface, &mut input).unwrap();
    host.step(&mut surface, &mut input).unwrap();
    assert_eq!(child_name(&host).as_deref(), Some("pause"));
    assert!(!log.borrow().iter().any(|e| e == "release W"));

    host.step(&mut surface, &mut input).unwrap();
    assert_eq!(child_name(&host).as_deref(), Some("level"));

    host.step(&mut surface, &mut input).unwrap();
    assert_eq!(log.borrow().last().map(String::as_str), Some("release W"));
}

#[test]
fn quitting_while_paused_finishes_the_held_scene() {
    let log = Log::default();
    let mut host = hosted_level(&log);
    let mut surface = FrameBuffer::new(64, 48);
    let mut input = ScriptedInput::new();
    input.push_frame([space()]).push_frame([InputEvent::Quit]);

    host.step(&mut surface, &mut input).unwrap();
    assert_eq!(child_name(&host).as_deref(), Some("pause"));

    // The pause scene pops itself; the host finishes it.
    let outcome = host.step(&mut surface, &mut input).unwrap();
    assert!(outcome.signal.is_none());
    assert!(host.child().is_none());
    assert_eq!(log.borrow().last().map(String::as_str), Some("finish"));
}

#[test]
fn pause_draws_the_held_scene_dimmed() {
    struct Red;

    impl SceneBehavior for Red {
        fn name(&self) -> &str {
            "red"
        }

        fn draw(&self, surface: &mut dyn Surface) {
            surface.clear(Color::rgb(255, 0, 0));
        }
    }

    let mut controller = EventController::new();
    controller
        .on_key_down(PAUSE_KEY, Args::new(), |_: &mut Red, _: &Call<'_>| {
            Ok(Some(ControlSignal::swap_for(pause_scene(1000.0)?, false)))
        })
        .unwrap();
    let mut host = Scene::new(Host, EventController::new());
    host.put(Box::new(Scene::new(Red, controller))).unwrap();

    let mut surface = FrameBuffer::new(80, 80);
    let mut input = ScriptedInput::new();
    input.push_frame([space()]).push_idle();
    host.step(&mut surface, &mut input).unwrap();
    host.step(&mut surface, &mut input).unwrap();

    let corner = surface.pixel(0, 0).unwrap();
    assert!(corner.r > 0 && corner.r < 255);
    assert_eq!((corner.g, corner.b), (0, 0));
}

//=== Loading =============================================================

#[test]
fn abandoned_preload_skips_setup_for_good() {
    struct Staged;

    impl SceneBehavior for Staged {
        fn name(&self) -> &str {
            "staged"
        }

        fn on_preload(&mut self, _surface: &dyn Surface) -> LoadingSequence<Self> {
            LoadingSequence::new()
                .message("one")
                .message("two")
                .message("three")
        }
    }

    let mut scene = Scene::new(Staged, EventController::new());
    let surface = FrameBuffer::new(4, 4);

    let mut first = scene.preload(&surface);
    assert_eq!(first.total(), 3);
    assert!(scene.advance_loading(&mut first).is_some());
    drop(first);

    // The scene counted as started once preload was called.
    let second = scene.preload(&surface);
    assert_eq!(second.total(), 0);
    assert!(scene.state().started);
}

//=== Full Game ===========================================================

#[test]
fn full_session_loads_pauses_resumes_and_quits() {
    let assets = TempDir::new().unwrap();
    let config = fast_config(assets.path());
    let mut root = game::main_scene(&config).unwrap();
    let mut surface = FrameBuffer::new(640, 480);
    let mut input = ScriptedInput::new();

    let mut frames = 0;
    while child_name(&root).as_deref() != Some("game") {
        let outcome = root.step(&mut surface, &mut input).unwrap();
        assert!(outcome.signal.is_none());
        frames += 1;
        assert!(frames < 64, "game never finished loading");
    }
    let game = root.child().unwrap();
    assert_eq!(game.state().phase(), Phase::Running);

    input.push_frame([space()]);
    root.step(&mut surface, &mut input).unwrap();
    assert_eq!(child_name(&root).as_deref(), Some("pause"));

    input.push_frame([space()]);
    root.step(&mut surface, &mut input).unwrap();
    assert_eq!(child_name(&root).as_deref(), Some("game"));

    input.push_idle();
    let outcome = root.step(&mut surface, &mut input).unwrap();
    assert_eq!(outcome.delta, Some(Duration::ZERO));

    input.push_frame([ctrl_q()]);
    let outcome = root.step(&mut surface, &mut input).unwrap();
    assert!(matches!(outcome.signal, Some(ControlSignal::Pop)));
    assert!(root.child().is_none());
}

#[test]
fn window_close_during_loading_ends_the_session() {
    let assets = TempDir::new().unwrap();
    let mut root = game::main_scene(&fast_config(assets.path())).unwrap();
    let mut surface = FrameBuffer::new(320, 240);
    let mut input = ScriptedInput::new();
    input.push_idle().push_idle().push_frame([InputEvent::Quit]);

    root.step(&mut surface, &mut input).unwrap();
    root.step(&mut surface, &mut input).unwrap();
    assert_eq!(child_name(&root).as_deref(), Some("loading"));

    let outcome = root.step(&mut surface, &mut input).unwrap();
    assert!(matches!(outcome.signal, Some(ControlSignal::Pop)));
}

#[test]
fn invalid_player_count_is_rejected_up_front() {
    let assets = TempDir::new().unwrap();
    let mut config = fast_config(assets.path());
    config.players = 7;
    assert!(matches!(
        game::main_scene(&config),
        Err(SceneError::Configuration(_))
    ));
}

//=== Dispatch ============================================================

#[derive(Default)]
struct Tally {
    order: Vec<&'static str>,
    player: Option<i64>,
}

#[test]
fn ctrl_q_quits_but_plain_q_only_presses_a_key() {
    let mut controller = EventController::new();
    for mask in [ModMask::CTRL, ModMask::META] {
        controller
            .on_shortcut(mask, KeyCode::KeyQ, Args::new(), |t: &mut Tally, _: &Call<'_>| {
                t.order.push("quit");
                Ok(None)
            })
            .unwrap();
    }
    controller
        .on_key_down(KeyCode::KeyQ, Args::new(), |t: &mut Tally, _: &Call<'_>| {
            t.order.push("key");
            Ok(None)
        })
        .unwrap();

    let mut tally = Tally::default();
    controller.dispatch(&[ctrl_q()], &mut tally).unwrap();
    assert_eq!(tally.order, vec!["quit", "key"]);

    let mut tally = Tally::default();
    controller
        .dispatch(&[InputEvent::key_down(KeyCode::KeyQ)], &mut tally)
        .unwrap();
    assert_eq!(tally.order, vec!["key"]);
}

#[test]
fn explicit_arguments_override_bound_ones() {
    let mut controller = EventController::new();
    controller
        .on_key_down(
            KeyCode::KeyD,
            Args::new().with("player", 1),
            |t: &mut Tally, call: &Call<'_>| {
                t.player = Some(call.args.int("player")?);
                Ok(None)
            },
        )
        .unwrap();

    let handler = &controller.handlers(Trigger::KeyDown(KeyCode::KeyD))[0];
    let event = InputEvent::key_down(KeyCode::KeyD);
    let mut tally = Tally::default();

    handler.invoke(&mut tally, &event, &Args::new()).unwrap();
    assert_eq!(tally.player, Some(1));

    handler
        .invoke(&mut tally, &event, &Args::new().with("player", 2))
        .unwrap();
    assert_eq!(tally.player, Some(2));
}

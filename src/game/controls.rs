//=========================================================================
// Controls
//
// Input bindings of the game, pause and loading scenes.
//
// Key Layout:
// ```text
//   player   right   left    forwards   backwards
//     1        D       A        W           S
//     2        L       J        I           K
//     3        →       ←        ↑           ↓
//     4        H       F        T           G
//
//   Space           pause / resume
//   Ctrl/Meta/Alt+Q  quit (as does closing the window)
// ```
// One handler serves all players: each registration binds `player`,
// `direction` and, for key releases, `stop`.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{info, trace};

//=== Internal Dependencies ===============================================

use crate::core::clock::Clock;
use crate::core::error::SceneError;
use crate::core::input::{Args, Call, EventController, EventKind, InputEvent, KeyCode, ModMask, Trigger};
use crate::core::scene::{ControlSignal, Handled, PauseScene, Scene};
use crate::game::scenes::GameScene;
use crate::game::ship::{Rotation, Thrust};

//=== Key Tables ==========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerKeys {
    pub right: KeyCode,
    pub left: KeyCode,
    pub forwards: KeyCode,
    pub backwards: KeyCode,
}

pub const PLAYER_KEYS: [PlayerKeys; 4] = [
    PlayerKeys {
        right: KeyCode::KeyD,
        left: KeyCode::KeyA,
        forwards: KeyCode::KeyW,
        backwards: KeyCode::KeyS,
    },
    PlayerKeys {
        right: KeyCode::KeyL,
        left: KeyCode::KeyJ,
        forwards: KeyCode::KeyI,
        backwards: KeyCode::KeyK,
    },
    PlayerKeys {
        right: KeyCode::ArrowRight,
        left: KeyCode::ArrowLeft,
        forwards: KeyCode::ArrowUp,
        backwards: KeyCode::ArrowDown,
    },
    PlayerKeys {
        right: KeyCode::KeyH,
        left: KeyCode::KeyF,
        forwards: KeyCode::KeyT,
        backwards: KeyCode::KeyG,
    },
];

pub const PAUSE_KEY: KeyCode = KeyCode::Space;
pub const QUIT_KEY: KeyCode = KeyCode::KeyQ;
pub const QUIT_MASKS: [ModMask; 3] = [ModMask::CTRL, ModMask::META, ModMask::ALT];

//=== Controllers =========================================================

/// Binds quit to the window-close event and every quit shortcut.
pub fn bind_quit<C: 'static>(controller: &mut EventController<C>) -> Result<(), SceneError> {
    controller.on_quit(quit::<C>)?;
    for mask in QUIT_MASKS {
        controller.on_shortcut(mask, QUIT_KEY, Args::new(), quit::<C>)?;
    }
    Ok(())
}

/// Controller of the running game with ship controls for `players`
/// players.
pub fn game_controller(players: u8) -> Result<EventController<GameScene>, SceneError> {
    if !(1..=PLAYER_KEYS.len()).contains(&usize::from(players)) {
        return Err(SceneError::config(format!(
            "cannot bind controls for {} players",
            players
        )));
    }

    let mut controller = EventController::new();
    bind_quit(&mut controller)?;
    controller.on_key_down(PAUSE_KEY, Args::new(), pause)?;
    controller.on_generic(EventKind::KeyDown, Args::new(), trace_key)?;

    let mut steering = Vec::new();
    let mut engines = Vec::new();
    for (player, keys) in (1..=players).zip(PLAYER_KEYS.iter()) {
        steering.extend(press_and_release(player, keys.right, Rotation::Right as i64));
        steering.extend(press_and_release(player, keys.left, Rotation::Left as i64));
        engines.extend(press_and_release(player, keys.forwards, Thrust::Forwards as i64));
        engines.extend(press_and_release(player, keys.backwards, Thrust::Backwards as i64));
    }
    controller.bind_all(steer, steering)?;
    controller.bind_all(throttle, engines)?;

    info!(target: "game", "controls bound for {} players", players);
    Ok(controller)
}

/// Pause scene resumed by the pause key, quittable like the game.
pub fn pause_scene(fps: f64) -> Result<Scene<PauseScene>, SceneError> {
    let mut controller = PauseScene::controller(&[PAUSE_KEY])?;
    bind_quit(&mut controller)?;
    Ok(Scene::new(PauseScene::new(), controller).with_clock(Clock::with_fps(fps)))
}

fn press_and_release(player: u8, key: KeyCode, direction: i64) -> [(Trigger, Args); 2] {
    let args = Args::new().with("player", player).with("direction", direction);
    [
        (Trigger::KeyDown(key), args.clone()),
        (Trigger::KeyUp(key), args.with("stop", true)),
    ]
}

//=== Handlers ============================================================

fn quit<C>(_: &mut C, _: &Call<'_>) -> Handled {
    info!(target: "game", "quit requested");
    Ok(Some(ControlSignal::Pop))
}

fn pause(game: &mut GameScene, _: &Call<'_>) -> Handled {
    Ok(Some(ControlSignal::swap_for(pause_scene(game.fps())?, false)))
}

fn steer(game: &mut GameScene, call: &Call<'_>) -> Handled {
    let rotation = Rotation::try_from(call.args.int("direction")?)?;
    let stop = call.args.flag_or("stop", false)?;
    game.ship_mut(call.args.int("player")?)?.rotate(rotation, stop);
    Ok(None)
}

fn throttle(game: &mut GameScene, call: &Call<'_>) -> Handled {
    let thrust = Thrust::try_from(call.args.int("direction")?)?;
    let stop = call.args.flag_or("stop", false)?;
    game.ship_mut(call.args.int("player")?)?.set_thrust(thrust, stop);
    Ok(None)
}

fn trace_key<C>(_: &mut C, call: &Call<'_>) -> Handled {
    if let InputEvent::KeyDown { key, modifiers } = call.event {
        trace!(target: "game::keys", "{:?} pressed with {:?}", key, modifiers.mask());
    }
    Ok(None)
}

//=========================================================================
// Unit Tests
//=========================================================================

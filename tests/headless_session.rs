//! Full game loop driven through the headless backend

use flappy::Game;
use flappy::renderer::{HeadlessBackend, Viewport};
use flappy::sim::{FlapInput, GameEvent, GamePhase, autopilot_input, score_for_x};
use flappy::tuning::Tuning;

const DT: f32 = 1.0 / 60.0;
const SURFACE: (u32, u32) = (1280, 720);

fn start(seed: u64) -> Game<HeadlessBackend> {
    Game::start(HeadlessBackend::new(), seed, Tuning::default()).unwrap()
}

fn step(game: &mut Game<HeadlessBackend>, input: FlapInput) -> Vec<GameEvent> {
    let elapsed = game.frames() as f32 * DT;
    game.frame(&input, DT, SURFACE, elapsed).unwrap()
}

#[test]
fn autopilot_session_draws_every_frame() {
    let mut game = start(99);
    for _ in 0..1_200 {
        let input = autopilot_input(game.state());
        step(&mut game, input);

        let state = game.state();
        assert_eq!(state.score, score_for_x(state.bird_pos.x));

        let stats = game.backend().last_frame;
        // Background, at least the bird, and the score
        assert!(stats.sprites >= 7);
        assert_eq!(stats.texts, 1);
    }

    assert_eq!(game.backend().frames, 1_200);
    let backend = game.end();
    assert_eq!(backend.live_handles(), 0);
}

#[test]
fn same_seed_same_run() {
    let mut a = start(7);
    let mut b = start(7);
    for _ in 0..600 {
        let input = autopilot_input(a.state());
        assert_eq!(input, autopilot_input(b.state()));
        let events_a = step(&mut a, input);
        let events_b = step(&mut b, input);
        assert_eq!(events_a, events_b);
        assert_eq!(a.state().bird_pos, b.state().bird_pos);
        assert_eq!(a.state().pipes, b.state().pipes);
    }
}

#[test]
fn falling_bird_crashes_then_fresh_flap_restarts() {
    let mut game = start(1);
    step(&mut game, FlapInput::FLAP);

    let mut crashed = None;
    for _ in 0..300 {
        for event in step(&mut game, FlapInput::IDLE) {
            if let GameEvent::Crashed { score } = event {
                crashed = Some(score);
            }
        }
        if game.state().phase() == GamePhase::GameOver {
            break;
        }
    }
    assert_eq!(crashed, Some(0));
    assert_eq!(game.state().phase(), GamePhase::GameOver);

    let events = step(&mut game, FlapInput::FLAP);
    assert_eq!(
        events,
        vec![GameEvent::Reset, GameEvent::Started, GameEvent::Flapped]
    );
    assert_eq!(game.state().phase(), GamePhase::Playing);
    assert_eq!(game.state().score, 0);
}

#[test]
fn held_flap_restarts_after_crash() {
    let mut game = start(2);
    // One fresh flap, then keep the button down until the bird falls out
    for _ in 0..300 {
        step(&mut game, FlapInput::FLAP);
        if game.state().game_over {
            break;
        }
    }
    assert!(game.state().game_over);

    // The button never came up, yet the next frame starts a new round
    let events = step(&mut game, FlapInput::FLAP);
    assert_eq!(
        events,
        vec![GameEvent::Reset, GameEvent::Started, GameEvent::Flapped]
    );
    let state = game.state();
    assert_eq!(state.phase(), GamePhase::Playing);
    assert_eq!(state.bird_vel.y, state.tuning.flap_impulse);
    assert_eq!(state.score, 0);

    let events = step(&mut game, FlapInput::FLAP);
    assert!(events.is_empty());
    assert!(game.state().bird_vel.y < game.state().tuning.flap_impulse);
}

#[test]
fn tuning_json_changes_the_run() {
    let tuning = Tuning::from_json(r#"{ "forward_speed": 6.0 }"#).unwrap();
    tuning.validate().unwrap();
    let mut game = Game::start(HeadlessBackend::new(), 3, tuning).unwrap();

    step(&mut game, FlapInput::FLAP);
    let x0 = game.state().bird_pos.x;
    step(&mut game, FlapInput::IDLE);
    let moved = game.state().bird_pos.x - x0;
    assert!((moved - 6.0 * DT).abs() < 1e-5);
}

#[test]
fn wide_surface_is_pillarboxed() {
    let mut game = start(4);
    game.frame(&FlapInput::IDLE, DT, (2560, 720), 0.0).unwrap();
    assert_eq!(
        game.backend().last_viewport,
        Viewport {
            x: 640,
            y: 0,
            width: 1280,
            height: 720
        }
    );
}

use std::time::Duration;

use ladder_session::service::{FixedPuzzleService, LocalPuzzleService, PuzzleService};
use ladder_session::state::{
    evaluate, Board, EngineConfig, Jump, ManualClock, Outcome, Phase, SessionEngine,
    SessionError, Turn,
};
use pretty_assertions::assert_eq;

type Engine<S> = SessionEngine<S, ManualClock>;

fn fixed_engine(
    board: Board,
    answer: u32,
    choices: Vec<u32>,
    seed: u64,
) -> (Engine<FixedPuzzleService>, ManualClock) {
    let clock = ManualClock::default();
    let service = FixedPuzzleService::new(board, answer, choices);
    let config = EngineConfig::default().with_seed(seed);
    (SessionEngine::with_clock(service, clock.clone(), config), clock)
}

fn local_engine(seed: u64) -> (Engine<LocalPuzzleService>, ManualClock) {
    let clock = ManualClock::default();
    let config = EngineConfig::default().with_seed(seed);
    let service = LocalPuzzleService::from_config(&config);
    (SessionEngine::with_clock(service, clock.clone(), config), clock)
}

/// Fire every pending task, jumping the clock to each deadline.
fn drain<S: PuzzleService>(engine: &mut Engine<S>, clock: &ManualClock) {
    while let Some(due) = engine.next_due() {
        clock.set(due);
        engine.tick();
    }
}

/// Roll each face in order for the player, waiting out each reveal.
fn roll_faces<S: PuzzleService>(engine: &mut Engine<S>, clock: &ManualClock, faces: &[u8]) {
    for &face in faces {
        engine.dice_mut().load([face]).unwrap();
        assert!(engine.roll(), "roll refused before face {face}");
        drain(engine, clock);
    }
}

fn empty_board() -> Board {
    Board::new(10, vec![], vec![]).unwrap()
}

#[test]
fn test_scenario_plain_move() {
    let (mut engine, clock) = fixed_engine(empty_board(), 17, vec![16, 17, 18], 1);
    engine.start(10, "Ada", false).unwrap();
    engine.guess(17).unwrap();

    roll_faces(&mut engine, &clock, &[6]);
    let state = engine.state();
    assert_eq!(state.player_pos(), 7);
    assert_eq!(state.last_dice_value(), Some(6));
    assert_eq!(state.move_count(), 1);
    assert_eq!(state.message(), "Rolled 6: moved to 7.");
}

#[test]
fn test_scenario_snake_from_ninety_one() {
    let board = Board::new(10, vec![Jump::new(97, 3)], vec![]).unwrap();
    let (mut engine, clock) = fixed_engine(board, 17, vec![16, 17, 18], 1);
    engine.start(10, "Ada", false).unwrap();
    engine.guess(16).unwrap();

    roll_faces(&mut engine, &clock, &[6; 15]);
    assert_eq!(engine.state().player_pos(), 91);

    roll_faces(&mut engine, &clock, &[6]);
    let state = engine.state();
    assert_eq!(state.player_pos(), 3);
    assert_eq!(state.message(), "Rolled 6: slid down to 3.");
    let last = state.moves().last().unwrap();
    assert_eq!((last.from_cell, last.to_cell), (91, 3));
    assert!(last.transition_applied);
}

#[test]
fn test_jump_cycle_rests_before_repeat() {
    // 5 climbs to 20, 20 slides back to 5
    let board = Board::new(10, vec![Jump::new(20, 5)], vec![Jump::new(5, 20)]).unwrap();
    let (mut engine, clock) = fixed_engine(board, 17, vec![16, 17, 18], 1);
    engine.start(10, "Ada", false).unwrap();
    engine.guess(17).unwrap();

    roll_faces(&mut engine, &clock, &[4]);
    let state = engine.state();
    assert_eq!(state.player_pos(), 20);
    assert_eq!(state.phase(), Phase::Playing);
    assert_eq!(state.message(), "Rolled 4: climbed to 20.");
    let mv = state.moves()[0];
    assert_eq!((mv.from_cell, mv.to_cell), (1, 20));
    assert!(mv.transition_applied);

    // play continues from the resting cell
    roll_faces(&mut engine, &clock, &[3]);
    assert_eq!(engine.state().player_pos(), 23);
    assert_eq!(engine.state().move_count(), 2);
}

#[test]
fn test_scenario_draw() {
    assert_eq!(evaluate(4, 4, true, Some(4)), Outcome::Draw);

    // the computer's pick depends on the seed; find one where it matches
    let mut draws = 0;
    for seed in 0..64 {
        let (mut engine, _) = fixed_engine(empty_board(), 4, vec![3, 4, 5], seed);
        engine.start(10, "Ada", true).unwrap();
        let outcome = engine.guess(4).unwrap();

        let state = engine.state();
        let opponent = state.opponent_guess().unwrap();
        assert!([3, 4, 5].contains(&opponent));
        if opponent == 4 {
            draws += 1;
            assert_eq!(outcome, Outcome::Draw);
            assert_eq!(state.message(), "Draw! You and the computer both guessed 4.");
        } else {
            assert_eq!(outcome, Outcome::Win);
        }
    }
    assert!(draws > 0);
}

#[test]
fn test_scenario_overshoot_then_exact_finish() {
    let (mut engine, clock) = fixed_engine(empty_board(), 17, vec![16, 17, 18], 1);
    engine.start(10, "Ada", false).unwrap();
    engine.guess(17).unwrap();

    let mut faces = vec![6; 16];
    faces.push(2);
    roll_faces(&mut engine, &clock, &faces);
    assert_eq!(engine.state().player_pos(), 99);

    roll_faces(&mut engine, &clock, &[4]);
    let state = engine.state();
    assert_eq!(state.player_pos(), 99);
    assert_eq!(state.move_count(), 18);
    assert_eq!(state.message(), "Rolled 4: need exactly 1 to finish.");
    assert_eq!(state.phase(), Phase::Playing);

    roll_faces(&mut engine, &clock, &[1]);
    let state = engine.state();
    assert_eq!(state.player_pos(), 100);
    assert_eq!(
        state.phase(),
        Phase::Finished {
            outcome: Outcome::Win
        }
    );
    assert_eq!(state.message(), "Game Over! You reached the end in 19 moves.");
    assert!(state.finished_at().is_some());
    assert!(!engine.roll());
}

#[test]
fn test_scenario_restart_drops_opponent_task() {
    let (mut engine, clock) = fixed_engine(empty_board(), 17, vec![16, 17, 18], 1);
    engine.start(10, "Ada", true).unwrap();
    engine.guess(17).unwrap();

    engine.dice_mut().load([5]).unwrap();
    assert!(engine.roll());
    clock.advance(Duration::from_millis(600));
    assert_eq!(engine.tick(), 1);
    assert_eq!(engine.state().turn(), Turn::Computer);
    assert_eq!(engine.scheduler().pending(), 1);

    engine.restart().unwrap();
    engine.start(10, "Ada", true).unwrap();
    engine.guess(17).unwrap();
    let before = engine.snapshot();

    drain(&mut engine, &clock);
    assert_eq!(engine.snapshot(), before);
    let state = engine.state();
    assert_eq!(state.computer_pos(), 1);
    assert_eq!(state.player_pos(), 1);
    assert_eq!(state.turn(), Turn::Player);
    assert_eq!(state.player_name(), "Ada");
}

#[test]
fn test_computer_takes_its_turn() {
    let (mut engine, clock) = fixed_engine(empty_board(), 17, vec![16, 17, 18], 3);
    engine.start(10, "Ada", true).unwrap();
    engine.guess(16).unwrap();

    engine.dice_mut().load([3, 2]).unwrap();
    assert!(engine.roll());
    clock.advance(Duration::from_millis(600));
    engine.tick();
    assert_eq!(engine.state().message(), "Rolled 3: moved to 4. Computer is thinking...");
    assert!(!engine.roll());

    clock.advance(Duration::from_millis(700));
    engine.tick();
    assert_eq!(engine.state().message(), "Computer is rolling...");

    clock.advance(Duration::from_millis(500));
    engine.tick();
    assert!(engine.state().roll_in_progress());

    clock.advance(Duration::from_millis(600));
    engine.tick();
    let state = engine.state();
    assert_eq!(state.computer_pos(), 3);
    assert_eq!(state.turn(), Turn::Player);
    assert_eq!(state.move_count(), 1);
    assert_eq!(state.message(), "Computer: Rolled 2: moved to 3. Your turn.");
    assert_eq!(state.moves().len(), 2);
    assert!(engine.scheduler().is_empty());
}

#[test]
fn test_service_outage_then_retry() {
    let (mut engine, _) = fixed_engine(empty_board(), 17, vec![16, 17, 18], 1);
    engine.service_mut().fail_next(1);

    let err = engine.start(10, "Ada", false).unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(engine.state().phase(), Phase::Setup);
    assert_eq!(engine.state().message(), "Error starting game");

    engine.start(10, "Ada", false).unwrap();
    engine.service_mut().fail_next(1);
    assert!(engine.guess(17).is_err());
    assert_eq!(engine.state().phase(), Phase::Guessing);
    assert_eq!(engine.state().message(), "Error submitting guess");

    assert_eq!(engine.guess(17).unwrap(), Outcome::Win);
    assert_eq!(engine.service().guesses().len(), 1);
}

#[test]
fn test_guess_outside_choices() {
    let (mut engine, _) = fixed_engine(empty_board(), 17, vec![16, 17, 18], 1);
    engine.start(10, "Ada", false).unwrap();
    let err = engine.guess(40).unwrap_err();
    assert!(matches!(err, SessionError::InvalidGuess { guess: 40, .. }));
    assert!(!err.is_retryable());
    assert_eq!(engine.state().phase(), Phase::Guessing);
}

#[test]
fn test_configured_roll_delay() {
    let config = EngineConfig::from_json(r#"{"roll_delay_ms": 100, "seed": 9}"#).unwrap();
    let clock = ManualClock::default();
    let service = FixedPuzzleService::new(empty_board(), 17, vec![16, 17, 18]);
    let mut engine = SessionEngine::with_clock(service, clock.clone(), config);
    engine.start(10, "Ada", false).unwrap();
    engine.guess(17).unwrap();

    assert!(engine.roll());
    clock.advance(Duration::from_millis(99));
    assert_eq!(engine.tick(), 0);
    clock.advance(Duration::from_millis(1));
    assert_eq!(engine.tick(), 1);
}

#[test]
fn test_solo_game_on_generated_board() {
    let (mut engine, clock) = local_engine(21);
    engine.start(8, "Ada", false).unwrap();

    let actual = {
        let choices = engine.state().choices().to_vec();
        engine.guess(choices[0]).unwrap();
        engine.state().correct_answer().unwrap()
    };
    let path = engine.optimal_path();
    assert_eq!(path.len() as u32, actual);
    assert_eq!(path.last().map(|s| s.cell), Some(64));

    for _ in 0..10_000 {
        if engine.state().phase().is_terminal() {
            break;
        }
        assert!(engine.roll());
        drain(&mut engine, &clock);
    }

    let state = engine.state();
    assert_eq!(
        state.phase(),
        Phase::Finished {
            outcome: Outcome::Win
        }
    );
    assert_eq!(state.player_pos(), 64);
    assert!(state.move_count() >= actual);
    assert_eq!(state.moves().len() as u32, state.move_count());
}

#[test]
fn test_vs_computer_game_on_generated_board() {
    let (mut engine, clock) = local_engine(5);
    engine.start(6, "Ada", true).unwrap();
    let pick = engine.state().choices()[1];
    engine.guess(pick).unwrap();

    for _ in 0..10_000 {
        if engine.state().phase().is_terminal() {
            break;
        }
        if engine.state().can_roll() {
            engine.roll();
        }
        drain(&mut engine, &clock);
    }

    let state = engine.state();
    let last = state.board().unwrap().last_cell();
    match state.phase() {
        Phase::Finished {
            outcome: Outcome::Win,
        } => assert_eq!(state.player_pos(), last),
        Phase::Finished {
            outcome: Outcome::Lose,
        } => {
            assert_eq!(state.computer_pos(), last);
            assert_eq!(state.message(), "The computer reached the end first.");
        }
        other => panic!("session did not finish: {other}"),
    }
    assert!(engine.scheduler().is_empty());
}

#[test]
fn test_quit_resets_name() {
    let (mut engine, _) = local_engine(2);
    engine.start(6, "Ada", false).unwrap();
    engine.quit().unwrap();
    let state = engine.state();
    assert_eq!(state.phase(), Phase::Setup);
    assert_eq!(state.player_name(), "Player 1");
    assert!(state.game_id().is_none());
}

#[test]
fn test_snapshot_after_guess() {
    let board = Board::new(10, vec![], vec![Jump::new(2, 94)]).unwrap();
    let (mut engine, _) = fixed_engine(board, 2, vec![1, 2, 3], 1);
    engine.start(10, "Ada", false).unwrap();
    engine.guess(3).unwrap();

    let json = engine.snapshot();
    assert_eq!(json["phase"], "PLAYING");
    assert_eq!(json["gameId"], "fixed-1");
    assert_eq!(json["guessOutcome"], "LOSE");
    assert_eq!(json["correctAnswer"], 2);
    assert_eq!(json["message"], "Wrong! The correct answer was 2.");
    assert_eq!(json["optimalPath"][0]["cell"], 94);
    assert_eq!(json["optimalPath"][1]["diceRoll"], 6);
    assert_eq!(json["board"]["totalCells"], 100);
    assert!(json["computerPos"].is_null());
}

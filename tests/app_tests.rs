//! App tests - the driving loop state machine with real files in a temp dir

use crossterm::event::{KeyCode, KeyEvent};
use tempfile::{tempdir, TempDir};
use tui_2048::core::{Board, GameSnapshot, History, Stats};
use tui_2048::save::{encode_legacy, AutoSave, SaveStore};
use tui_2048::term::{FrameBuffer, GameView, Viewport};
use tui_2048::types::Direction;
use tui_2048::{App, AppConfig, Flow, Mode};

fn config(dir: &TempDir, size: Option<u8>) -> AppConfig {
    AppConfig {
        save_dir: dir.path().join("saves"),
        autosave_path: dir.path().join("auto.2048"),
        board_size: size,
        seed: Some(2024),
        log_path: None,
        autosave_enabled: true,
    }
}

fn open_app(cfg: &AppConfig) -> App {
    App::new(cfg, AutoSave::open(&cfg.autosave_path).unwrap())
}

fn press(app: &mut App, code: KeyCode) -> Flow {
    app.handle_key(KeyEvent::from(code))
}

fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        press(app, KeyCode::Char(c));
    }
}

/// Press arrows until one commits a slide
fn make_a_move(app: &mut App) {
    let before = app.game().unwrap().history().len();
    for code in [KeyCode::Left, KeyCode::Up, KeyCode::Right, KeyCode::Down] {
        press(app, code);
        if app.game().unwrap().history().len() > before {
            return;
        }
    }
    panic!("no direction moved");
}

#[test]
fn test_undo_redo_keys() {
    let dir = tempdir().unwrap();
    let mut app = open_app(&config(&dir, Some(4)));
    let opening = app.game().unwrap().snapshot();

    make_a_move(&mut app);
    assert_eq!(app.game().unwrap().history().undo_count(), 1);

    press(&mut app, KeyCode::Char('u'));
    assert_eq!(app.game().unwrap().board(), &opening.board);
    assert_eq!(app.status(), "Undo");

    press(&mut app, KeyCode::Char('u'));
    assert_eq!(app.status(), "Nothing to undo");

    press(&mut app, KeyCode::Char('y'));
    assert_eq!(app.status(), "Redo");
    assert_eq!(app.game().unwrap().history().redo_count(), 0);
}

#[test]
fn test_save_menu_writes_slot_with_description() {
    let dir = tempdir().unwrap();
    let cfg = config(&dir, Some(4));
    let mut app = open_app(&cfg);
    make_a_move(&mut app);

    press(&mut app, KeyCode::Char('s'));
    assert_eq!(app.mode(), &Mode::SaveSlot);
    press(&mut app, KeyCode::Char('3'));
    type_text(&mut app, "my runx");
    press(&mut app, KeyCode::Backspace);
    assert_eq!(
        app.mode(),
        &Mode::SaveDescription {
            slot: 3,
            text: "my run".to_string()
        }
    );
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.mode(), &Mode::Playing);
    assert_eq!(app.status(), "Saved to slot 3");

    let record = SaveStore::new(&cfg.save_dir).load_slot(3).unwrap();
    assert_eq!(record.description, "my run");
    assert_eq!(record.snapshot, app.game().unwrap().snapshot());
    assert_eq!(&record.history, app.game().unwrap().history());
}

#[test]
fn test_escape_leaves_menus() {
    let dir = tempdir().unwrap();
    let mut app = open_app(&config(&dir, Some(3)));
    press(&mut app, KeyCode::Char('g'));
    assert_eq!(app.mode(), &Mode::LoadSlot);
    press(&mut app, KeyCode::Esc);
    assert_eq!(app.mode(), &Mode::Playing);

    press(&mut app, KeyCode::Char('s'));
    press(&mut app, KeyCode::Char('1'));
    press(&mut app, KeyCode::Esc);
    assert_eq!(app.mode(), &Mode::Playing);
    assert!(!SaveStore::new(dir.path().join("saves")).slot_path(1).unwrap().exists());
}

#[test]
fn test_load_slot_switches_board_size() {
    let dir = tempdir().unwrap();
    let cfg = config(&dir, Some(4));

    let board = Board::from_rows(&[[1, 1, 0, 0, 0], [0; 5], [0; 5], [0; 5], [0, 0, 0, 0, 3]]).unwrap();
    let mut stats = Stats::new(5);
    stats.score = 300;
    let saved = GameSnapshot::new(board, stats);
    SaveStore::new(&cfg.save_dir)
        .save_slot(6, &saved, &History::new(), "big", std::time::Duration::from_secs(30))
        .unwrap();

    let mut app = open_app(&cfg);
    press(&mut app, KeyCode::Char('g'));
    press(&mut app, KeyCode::Char('6'));

    let game = app.game().unwrap();
    assert_eq!(game.size(), 5);
    assert_eq!(game.score(), 300);
    assert_eq!(game.play_time(), std::time::Duration::from_secs(30));
    assert_eq!(app.status(), "Loaded slot 6 (5x5 board)");
    assert!(game.stats().auto_save);

    // The empty log from the file is seeded, so the first move can be undone.
    press(&mut app, KeyCode::Left);
    assert!(app.game().unwrap().history().can_undo());
}

#[test]
fn test_failed_load_keeps_live_game() {
    let dir = tempdir().unwrap();
    let mut app = open_app(&config(&dir, Some(4)));
    make_a_move(&mut app);
    let live = app.game().unwrap().snapshot();

    press(&mut app, KeyCode::Char('g'));
    press(&mut app, KeyCode::Char('8'));
    assert!(app.status().starts_with("Load failed"));
    assert_eq!(app.game().unwrap().snapshot(), live);
    assert_eq!(app.mode(), &Mode::Playing);
}

#[test]
fn test_quick_save_and_load() {
    let dir = tempdir().unwrap();
    let mut app = open_app(&config(&dir, Some(4)));
    press(&mut app, KeyCode::F(5));
    assert_eq!(app.status(), "Quick saved");
    let saved = app.game().unwrap().snapshot();

    make_a_move(&mut app);
    press(&mut app, KeyCode::F(9));
    assert_eq!(app.status(), "Loaded quick save");
    assert_eq!(app.game().unwrap().board(), &saved.board);
}

#[test]
fn test_auto_save_round_trip_across_sessions() {
    let dir = tempdir().unwrap();
    let cfg = config(&dir, Some(4));

    let mut app = open_app(&cfg);
    make_a_move(&mut app);
    make_a_move(&mut app);
    let board = app.game().unwrap().snapshot().board;
    let log_len = app.game().unwrap().history().len();
    assert_eq!(press(&mut app, KeyCode::Char('q')), Flow::Quit);
    assert!(app.finish().unwrap());

    let resumed = open_app(&cfg);
    assert_eq!(resumed.status(), "Resumed from auto-save");
    let game = resumed.game().unwrap();
    assert_eq!(game.board(), &board);
    assert_eq!(game.history().len(), log_len);
    assert!(game.history().can_undo());
}

#[test]
fn test_auto_save_ignored_for_other_size() {
    let dir = tempdir().unwrap();
    let mut app = open_app(&config(&dir, Some(4)));
    make_a_move(&mut app);
    app.finish().unwrap();

    let app = open_app(&config(&dir, Some(3)));
    assert_eq!(app.game().unwrap().size(), 3);
    assert_eq!(app.status(), "");
}

#[test]
fn test_size_menu_then_legacy_auto_save() {
    let dir = tempdir().unwrap();
    let cfg = config(&dir, None);
    let board = Board::from_rows(&[[2, 0, 0], [0, 0, 0], [0, 0, 1]]).unwrap();
    let mut stats = Stats::new(3);
    stats.score = 12;
    stats.max_score = 40;
    std::fs::write(&cfg.autosave_path, encode_legacy(&GameSnapshot::new(board, stats))).unwrap();

    let mut app = open_app(&cfg);
    assert_eq!(app.mode(), &Mode::ChooseSize);
    press(&mut app, KeyCode::Char('3'));

    let game = app.game().unwrap();
    assert_eq!(game.board(), &board);
    assert_eq!(game.stats().max_score, 40);
    assert_eq!(game.history().len(), 1);
}

#[test]
fn test_finished_game_is_reset_in_auto_save() {
    let dir = tempdir().unwrap();
    let cfg = config(&dir, Some(3));
    let stuck = Board::from_rows(&[[1, 2, 1], [2, 1, 2], [1, 2, 1]]).unwrap();
    let mut stats = Stats::new(3);
    stats.score = 50;
    stats.max_score = 50;
    let mut history = History::new();
    history.save_state(GameSnapshot::new(stuck, stats));
    AutoSave::open(&cfg.autosave_path)
        .unwrap()
        .save_and_close(&GameSnapshot::new(stuck, stats), &history, Default::default())
        .unwrap();

    let mut app = open_app(&cfg);
    press(&mut app, KeyCode::Left);
    assert!(app.game().unwrap().game_over());
    assert_eq!(app.status(), "Game over! Press r to restart");
    app.finish().unwrap();

    let app = open_app(&cfg);
    let game = app.game().unwrap();
    assert!(!game.game_over());
    assert_eq!(game.score(), 0);
    assert_eq!(game.stats().max_score, 50);
    assert!(Direction::ALL.iter().any(|&d| game.board().slide(d).is_some()));
}

#[test]
fn test_disabled_auto_save_writes_nothing() {
    let dir = tempdir().unwrap();
    let cfg = config(&dir, Some(4));
    let app = App::new(&cfg, AutoSave::disabled(&cfg.autosave_path));
    assert!(!app.game().unwrap().stats().auto_save);
    assert!(!app.finish().unwrap());
    assert!(!cfg.autosave_path.exists());
}

#[test]
fn test_render_each_mode() {
    let dir = tempdir().unwrap();
    let mut app = open_app(&config(&dir, None));
    let view = GameView::default();
    let mut fb = FrameBuffer::new(0, 0);
    let viewport = Viewport::new(90, 32);

    app.render_into(&view, viewport, &mut fb);
    assert!(fb.contains_text("Choose a board size"));

    press(&mut app, KeyCode::Char('4'));
    app.render_into(&view, viewport, &mut fb);
    assert!(fb.contains_text("SCORE"));
    assert!(fb.contains_text("AUTO-SAVE"));

    press(&mut app, KeyCode::Char('g'));
    app.render_into(&view, viewport, &mut fb);
    assert!(fb.contains_text("Load which slot?"));
    assert!(fb.contains_text("9  (empty)"));

    press(&mut app, KeyCode::Esc);
    press(&mut app, KeyCode::Char('s'));
    press(&mut app, KeyCode::Char('2'));
    type_text(&mut app, "abc");
    app.render_into(&view, viewport, &mut fb);
    assert!(fb.contains_text("Description for slot 2"));
    assert!(fb.contains_text("> abc_"));
}

#[test]
fn test_second_app_does_not_take_over_auto_save() {
    let dir = tempdir().unwrap();
    let mut first = open_app(&config(&dir, Some(4)));
    let mut second = open_app(&config(&dir, Some(3)));
    assert!(first.game().unwrap().stats().auto_save);
    assert!(!second.game().unwrap().stats().auto_save);

    make_a_move(&mut first);
    make_a_move(&mut second);
    let board = first.game().unwrap().snapshot().board;
    assert!(first.finish().unwrap());
    assert!(!second.finish().unwrap());

    let resumed = open_app(&config(&dir, Some(4)));
    assert_eq!(resumed.status(), "Resumed from auto-save");
    assert_eq!(resumed.game().unwrap().board(), &board);
}

use canvas::camera::Size;
use canvas::input::InputState;

use super::*;

fn parse(line: &str) -> Command {
    line.parse().expect("valid command")
}

#[test]
fn parses_pointer_commands() {
    assert_eq!(parse("down left 10 20"), Command::Down { button: Button::Primary, at: Point::new(10.0, 20.0) });
    assert_eq!(parse("up right 1.5 -2"), Command::Up { button: Button::Secondary, at: Point::new(1.5, -2.0) });
    assert_eq!(parse("down middle 0 0"), Command::Down { button: Button::Middle, at: Point::new(0.0, 0.0) });
    assert_eq!(parse("  move   3 4 "), Command::Move(Point::new(3.0, 4.0)));
    assert_eq!(parse("wheel -120 5 6"), Command::Wheel { delta_y: -120.0, at: Point::new(5.0, 6.0) });
}

#[test]
fn parses_other_commands() {
    assert_eq!(parse("key Escape"), Command::Key(Key("Escape".into())));
    assert_eq!(parse("leave"), Command::Leave);
    assert_eq!(parse("resize 1280 720"), Command::Resize { width: 1280.0, height: 720.0 });
}

#[test]
fn rejects_malformed_lines() {
    assert!(matches!("jump 1 2".parse::<Command>(), Err(CommandError::UnknownCommand(c)) if c == "jump"));
    assert!(matches!("down thumb 1 2".parse::<Command>(), Err(CommandError::UnknownButton(_))));
    assert!(matches!("move 1".parse::<Command>(), Err(CommandError::MissingArgument("y"))));
    assert!(matches!("move 1 two".parse::<Command>(), Err(CommandError::InvalidNumber { .. })));
    assert!(matches!("leave now".parse::<Command>(), Err(CommandError::Trailing(_))));
    assert!(matches!("".parse::<Command>(), Err(CommandError::MissingArgument("command"))));
}

#[test]
fn apply_drives_the_engine() {
    let mut engine = EngineCore::new(Size::new(100.0, 100.0), false);
    parse("down left 10 10").apply(&mut engine);
    assert!(matches!(engine.input, InputState::Dragging { .. }));

    parse("key Escape").apply(&mut engine);
    assert!(engine.input.is_idle());
}

#[tokio::test]
async fn reader_skips_comments_and_bad_lines() {
    let input: &[u8] = b"# setup\n\ndown left 1 2\nbogus\nup left 30 2\n";
    let (tx, mut rx) = mpsc::channel(8);

    read_commands(input, tx).await;

    assert_eq!(rx.recv().await, Some(parse("down left 1 2")));
    assert_eq!(rx.recv().await, Some(parse("up left 30 2")));
    assert_eq!(rx.recv().await, None);
}

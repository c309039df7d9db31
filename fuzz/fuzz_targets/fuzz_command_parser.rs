#![no_main]

use carousel::command::{Action, Interpreter, TimerAction, parse_args};
use carousel::phase::Selector;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    for token in parse_args(text) {
        assert!(!token.is_empty());
    }

    let interpreter = Interpreter::new("!img", 5);
    match interpreter.interpret_message(text) {
        Some(Action::Trigger(Selector::Index(i))) => assert!(i < 5),
        Some(Action::Timer(TimerAction::Set(value))) => {
            assert!(value.minute < 60 && value.second < 60);
        }
        _ => {}
    }
});

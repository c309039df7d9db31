//! Command interpreter
//!
//! Boundary adapter between chat/button input and the trigger machinery.
//!
//! Text form: `<phrase> <arg0> [arg1...]`
//!
//! | `arg0`   | `arg1`                       | action                    |
//! |----------|------------------------------|---------------------------|
//! | `random` |                              | fire, random item         |
//! | `timer`  | `pause` / `resume` / `reset` | countdown control         |
//! | `timer`  | `[[H:]M:]S`                  | overwrite running countdown |
//! | other    |                              | fire, 1-based item index  |
//!
//! Buttons: `randomImgButton`, `pauseButton` (toggle), `resetButton`.

pub mod args;
pub mod interpreter;

pub use args::{parse_args, parse_index};
pub use interpreter::{Action, ButtonId, Interpreter, TimerAction};

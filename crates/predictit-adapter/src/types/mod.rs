/*
[INPUT]:  Wire codes and decoded feed payloads
[OUTPUT]: Typed Rust structs/enums with serialization support
[POS]:    Data layer - type definitions for feed events
[UPDATE]: When the event model changes or new types added
*/

pub mod enums;
pub mod events;

pub use enums::*;
pub use events::*;
